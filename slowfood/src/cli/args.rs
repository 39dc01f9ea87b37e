//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use slowfood::models::DietaryFlags;
use slowfood::session::Access;

/// SlowFood - recipes, cooks and an AI kitchen assistant from the terminal
#[derive(Parser, Debug)]
#[command(name = "slowfood")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Platform API base URL
    #[arg(long, env = "SLOWFOOD_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Directory holding the persisted session
    #[arg(long, env = "SLOWFOOD_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    pub timeout: u64,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from SLOWFOOD_PASSWORD when omitted
        #[arg(long, env = "SLOWFOOD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from SLOWFOOD_PASSWORD when omitted
        #[arg(long, env = "SLOWFOOD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Browse and manage recipes
    Recipes {
        #[command(subcommand)]
        action: RecipeAction,
    },

    /// Browse cooks and the follow graph
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage your own profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Read and write recipe comments
    Comments {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Talk to the cooking assistant (one message per line, /quit to leave)
    Chat,

    /// Ask the cooking assistant a single question
    Ask {
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },

    /// Ask the cooking assistant about one ingredient
    Ingredient { name: String },

    /// Ask the cooking assistant for recipes using what you have
    Suggest {
        /// Comma separated ingredients
        ingredients: String,
        #[command(flatten)]
        diet: DietArgs,
    },

    /// Show the application routes and whether the session may open them
    Routes {
        /// Check a single path instead, e.g. /recipes/abc123
        path: Option<String>,
    },
}

impl Commands {
    /// Who may run this command.
    pub const fn access(&self) -> Access {
        match self {
            Self::Signup { .. } | Self::Login { .. } => Access::AnonymousOnly,
            Self::Logout | Self::Whoami | Self::Routes { .. } => Access::Public,
            Self::Recipes { action } => action.access(),
            Self::Users { .. }
            | Self::Profile { .. }
            | Self::Comments { .. }
            | Self::Chat
            | Self::Ask { .. }
            | Self::Ingredient { .. }
            | Self::Suggest { .. } => Access::Private,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RecipeAction {
    /// List recipes, one page at a time
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "9")]
        limit: u32,
        #[command(flatten)]
        diet: DietArgs,
    },

    /// Show one recipe with its comments
    Show { id: String },

    /// Show a random recipe
    Random,

    /// List recipes by one author
    ByAuthor { user_id: String },

    /// Create a recipe
    Create {
        #[command(flatten)]
        fields: RecipeFields,
    },

    /// Update a recipe; omitted fields keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: RecipeFields,
    },

    /// Delete a recipe
    Delete { id: String },

    /// Like a recipe
    Like { id: String },

    /// Remove your like from a recipe
    Unlike { id: String },

    /// Upload an image and print its URL
    Upload { file: PathBuf },
}

impl RecipeAction {
    pub const fn access(&self) -> Access {
        match self {
            Self::List { .. } | Self::Random => Access::Public,
            _ => Access::Private,
        }
    }
}

/// Recipe fields shared by create and update.
#[derive(Args, Debug, Default)]
pub struct RecipeFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Comma separated
    #[arg(long)]
    pub ingredients: Option<String>,
    #[arg(long)]
    pub instructions: Option<String>,
    /// Preparation time in minutes
    #[arg(long)]
    pub time: Option<u32>,
    #[arg(long)]
    pub flavor: Option<String>,
    #[arg(long)]
    pub beverage_pairing: Option<String>,
    #[arg(long)]
    pub difficulty: Option<String>,
    /// Image URL
    #[arg(long, conflicts_with = "image_file")]
    pub image: Option<String>,
    /// Local image to upload first
    #[arg(long)]
    pub image_file: Option<PathBuf>,
    #[command(flatten)]
    pub diet: DietArgs,
}

/// Dietary flags as switches.
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct DietArgs {
    #[arg(long)]
    pub vegetarian: bool,
    #[arg(long)]
    pub vegan: bool,
    #[arg(long)]
    pub gluten_free: bool,
    #[arg(long)]
    pub lactose_free: bool,
}

impl From<DietArgs> for DietaryFlags {
    fn from(args: DietArgs) -> Self {
        Self {
            vegetarian: args.vegetarian,
            vegan: args.vegan,
            gluten_free: args.gluten_free,
            lactose_free: args.lactose_free,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// List cooks, optionally filtered by name or email
    List {
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a cook's profile and recipes
    Show { id: String },

    /// Follow a cook
    Follow { id: String },

    /// Stop following a cook
    Unfollow { id: String },

    /// Who follows a cook (yourself by default)
    Followers { id: Option<String> },

    /// Whom a cook follows (yourself by default)
    Following { id: Option<String> },

    /// Cooks worth following
    Discover,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Change name, bio or picture
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Image URL
        #[arg(long, conflicts_with = "image_file")]
        image: Option<String>,
        /// Local image to upload first
        #[arg(long)]
        image_file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CommentAction {
    /// Comments on a recipe
    List { recipe_id: String },

    /// Comment on a recipe
    Add {
        recipe_id: String,
        #[arg(trailing_var_arg = true, required = true)]
        content: Vec<String>,
    },

    /// Change one of your comments
    Edit {
        comment_id: String,
        #[arg(trailing_var_arg = true, required = true)]
        content: Vec<String>,
    },

    /// Delete one of your comments
    Delete { comment_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_access_levels() {
        let cli = Cli::parse_from(["slowfood", "recipes", "list", "--vegan"]);
        assert_eq!(cli.command.access(), Access::Public);

        let cli = Cli::parse_from(["slowfood", "recipes", "show", "r1"]);
        assert_eq!(cli.command.access(), Access::Private);

        let cli = Cli::parse_from(["slowfood", "login", "--email", "a@b.c", "--password", "x"]);
        assert_eq!(cli.command.access(), Access::AnonymousOnly);

        let cli = Cli::parse_from(["slowfood", "ask", "how", "long", "to", "boil", "an", "egg"]);
        assert_eq!(cli.command.access(), Access::Private);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "slowfood",
            "whoami",
            "--server-url",
            "http://example.com",
            "-vv",
        ]);
        assert_eq!(cli.server_url.as_deref(), Some("http://example.com"));
        assert_eq!(cli.verbose, 2);
    }
}
