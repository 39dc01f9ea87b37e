//! Command execution.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use slowfood::api::ApiClient;
use slowfood::chat::{ChatAssistant, CookingAssistant};
use slowfood::config::Config;
use slowfood::logging;
use slowfood::models::{
    Comment, Credentials, DietaryFlags, ProfileUpdate, Recipe, RecipeDraft, RecipeQuery, Signup,
    UserProfile,
};
use slowfood::session::{
    gate, route_for, AuthVerifier, FileTokenStore, Gate, Session, SessionManager, SessionPhase, TokenStore,
    LOGIN_PATH, ROUTES,
};
use slowfood::social::{visible_users, FollowTracker, LikeState};

use super::args::{
    Cli, CommentAction, Commands, ProfileAction, RecipeAction, RecipeFields, UserAction,
};

/// Everything a command needs once the session is settled.
struct App {
    api: Arc<ApiClient>,
    sessions: SessionManager,
    session: Session,
}

impl App {
    fn me(&self) -> Result<&UserProfile> {
        self.session.user.as_ref().context("Not logged in")
    }
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    logging::init(cli.verbose);

    let config = Config::new(cli.server_url.clone(), cli.data_dir.clone(), cli.timeout);
    debug!(server = %config.server_url, data_dir = %config.data_dir.display(), "config");

    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.session_path()));
    let api = Arc::new(
        ApiClient::new(&config, Arc::clone(&store)).context("Failed to build HTTP client")?,
    );
    let sessions = SessionManager::new(store, Arc::clone(&api) as Arc<dyn AuthVerifier>);
    let session = sessions.initialize().await;

    match gate(cli.command.access(), &session) {
        Gate::Render => {}
        Gate::Loading => bail!("Session is still being verified, try again"),
        Gate::Redirect(target) if target == LOGIN_PATH => {
            bail!("You need to log in first: slowfood login --email <email>")
        }
        Gate::Redirect(_) => {
            let name = session.user.as_ref().map_or("someone", |u| u.name.as_str());
            bail!("Already logged in as {name}. Run `slowfood logout` first.")
        }
    }

    let app = App {
        api,
        sessions,
        session,
    };

    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
        } => signup(&app, name, email, password).await,
        Commands::Login { email, password } => login(&app, email, password).await,
        Commands::Logout => {
            app.sessions.log_out();
            println!("✓ Logged out");
            Ok(())
        }
        Commands::Whoami => {
            whoami(&app.session);
            Ok(())
        }
        Commands::Recipes { action } => recipes(&app, action).await,
        Commands::Users { action } => users(&app, action).await,
        Commands::Profile { action } => profile(&app, action).await,
        Commands::Comments { action } => comments(&app, action).await,
        Commands::Chat => chat(&app).await,
        Commands::Ask { message } => {
            let mut assistant = assistant(&app);
            let reply = assistant.send(&message.join(" "), &app.session).await;
            print_reply(&assistant, reply)
        }
        Commands::Ingredient { name } => {
            let mut assistant = assistant(&app);
            let reply = assistant.ingredient_info(&name, &app.session).await;
            print_reply(&assistant, reply)
        }
        Commands::Suggest { ingredients, diet } => {
            let mut assistant = assistant(&app);
            let reply = assistant
                .suggest_recipes(&ingredients, &diet.into(), &app.session)
                .await;
            print_reply(&assistant, reply)
        }
        Commands::Routes { path } => match path {
            Some(path) => check_route(&app.session, &path),
            None => {
                list_routes(&app.session);
                Ok(())
            }
        },
    }
}

// === Account ===

async fn signup(app: &App, name: String, email: String, password: String) -> Result<()> {
    app.api
        .signup(&Signup {
            email,
            password,
            name,
        })
        .await
        .context("Failed to create account")?;
    println!("✓ Account created. Log in with `slowfood login`.");
    Ok(())
}

async fn login(app: &App, email: String, password: String) -> Result<()> {
    let token = app
        .api
        .login(&Credentials { email, password })
        .await
        .context("Failed to log in")?;
    app.sessions
        .log_in(&token)
        .context("Failed to store session")?;

    let session = app.sessions.initialize().await;
    match session.user {
        Some(user) if session.is_logged_in => {
            println!("✓ Logged in as {} <{}>", user.name, user.email);
            Ok(())
        }
        _ => bail!("The server issued a token it would not verify"),
    }
}

fn whoami(session: &Session) {
    match (session.phase(), &session.user) {
        (SessionPhase::Authenticated, Some(user)) => {
            println!("{} <{}>", user.name, user.email);
            println!("  id:  {}", user.id);
            if let Some(ref bio) = user.bio {
                println!("  bio: {bio}");
            }
        }
        _ => println!("Not logged in."),
    }
}

// === Recipes ===

async fn recipes(app: &App, action: RecipeAction) -> Result<()> {
    match action {
        RecipeAction::List { page, limit, diet } => {
            let query = RecipeQuery {
                page,
                limit,
                filters: diet.into(),
            };
            let listing = app
                .api
                .list_recipes(&query)
                .await
                .context("Failed to list recipes")?;
            print_recipe_table(&listing.recipes);
            println!("\nPage {} of {}", query.page.max(1), listing.total_pages);
        }
        RecipeAction::Show { id } => {
            let recipe = app.api.get_recipe(&id).await.context("Failed to get recipe")?;
            let comments = app
                .api
                .list_comments(&id)
                .await
                .context("Failed to get comments")?;
            print_recipe(&recipe, &app.session);
            print_comments(&comments);
        }
        RecipeAction::Random => {
            let recipe = app
                .api
                .random_recipe()
                .await
                .context("Failed to get a random recipe")?;
            print_recipe(&recipe, &app.session);
        }
        RecipeAction::ByAuthor { user_id } => {
            let list = app
                .api
                .recipes_by_author(&user_id)
                .await
                .context("Failed to list recipes")?;
            print_recipe_table(&list);
        }
        RecipeAction::Create { fields } => {
            let mut draft = RecipeDraft::default();
            apply_fields(app, &mut draft, fields).await?;
            let recipe = app
                .api
                .create_recipe(&draft)
                .await
                .context("Failed to create recipe")?;
            println!("✓ Created {} ({})", recipe.title, recipe.id);
        }
        RecipeAction::Update { id, fields } => {
            let current = owned_recipe(app, &id).await?;
            let mut draft = RecipeDraft::from(&current);
            apply_fields(app, &mut draft, fields).await?;
            let recipe = app
                .api
                .update_recipe(&id, &draft)
                .await
                .context("Failed to update recipe")?;
            println!("✓ Updated {}", recipe.title);
        }
        RecipeAction::Delete { id } => {
            let current = owned_recipe(app, &id).await?;
            app.api
                .delete_recipe(&id)
                .await
                .context("Failed to delete recipe")?;
            println!("✓ Deleted {}", current.title);
        }
        RecipeAction::Like { id } => set_like(app, &id, true).await?,
        RecipeAction::Unlike { id } => set_like(app, &id, false).await?,
        RecipeAction::Upload { file } => {
            let url = app
                .api
                .upload_image(&file)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            println!("{url}");
        }
    }
    Ok(())
}

/// Fetch a recipe the current user may change.
async fn owned_recipe(app: &App, id: &str) -> Result<Recipe> {
    let recipe = app.api.get_recipe(id).await.context("Failed to get recipe")?;
    if !recipe.is_authored_by(&app.me()?.id) {
        bail!("You can only change your own recipes");
    }
    Ok(recipe)
}

async fn apply_fields(app: &App, draft: &mut RecipeDraft, fields: RecipeFields) -> Result<()> {
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(list) = fields.ingredients {
        draft.ingredients = RecipeDraft::parse_ingredients(&list);
    }
    if let Some(instructions) = fields.instructions {
        draft.instructions = instructions;
    }
    if fields.time.is_some() {
        draft.time = fields.time;
    }
    if let Some(flavor) = fields.flavor {
        draft.flavor = flavor;
    }
    if let Some(pairing) = fields.beverage_pairing {
        draft.beverage_pairing = pairing;
    }
    if let Some(difficulty) = fields.difficulty {
        draft.difficulty = difficulty;
    }

    let diet = DietaryFlags::from(fields.diet);
    if diet.any() {
        draft.dietary = diet;
    }

    if let Some(file) = fields.image_file {
        draft.image = app
            .api
            .upload_image(&file)
            .await
            .with_context(|| format!("Failed to upload {}", file.display()))?;
    } else if let Some(image) = fields.image {
        draft.image = image;
    }
    Ok(())
}

async fn set_like(app: &App, id: &str, like: bool) -> Result<()> {
    let recipe = app.api.get_recipe(id).await.context("Failed to get recipe")?;
    let mut state = LikeState::for_recipe(&recipe, &app.session);

    if state.liked != like {
        state
            .toggle(app.api.as_ref(), &app.session, id)
            .await
            .context("Failed to update like")?;
    }

    let verb = if state.liked { "♥ Liked" } else { "Not liked" };
    println!("{verb}: {} ({} likes)", recipe.title, state.count);
    Ok(())
}

fn print_recipe_table(recipes: &[Recipe]) {
    if recipes.is_empty() {
        println!("No recipes found.");
        return;
    }

    println!(
        "{:<26} {:<30} {:<8} {:<6} {}",
        "ID", "TITLE", "TIME", "LIKES", "DIET"
    );
    println!("{}", "-".repeat(84));

    for recipe in recipes {
        let time = recipe.time.map_or_else(|| "-".to_string(), |t| format!("{t}m"));
        println!(
            "{:<26} {:<30} {:<8} {:<6} {}",
            recipe.id,
            truncate(&recipe.title, 28),
            time,
            recipe.likes.len(),
            recipe.dietary.enabled().join(","),
        );
    }
}

fn print_recipe(recipe: &Recipe, session: &Session) {
    let likes = LikeState::for_recipe(recipe, session);

    println!("{}", recipe.title);
    println!("{}", "=".repeat(recipe.title.chars().count()));
    if let Some(ref author) = recipe.author {
        println!("By {}", author.display_name());
    }
    let heart = if likes.liked { "♥" } else { "♡" };
    println!("{heart} {} likes", likes.count);

    let mut facts = Vec::new();
    if let Some(time) = recipe.time {
        facts.push(format!("{time} min"));
    }
    for value in [&recipe.difficulty, &recipe.flavor].into_iter().flatten() {
        facts.push(value.clone());
    }
    facts.extend(recipe.dietary.enabled().into_iter().map(String::from));
    if !facts.is_empty() {
        println!("{}", facts.join(" · "));
    }

    println!("\nIngredients:");
    for ingredient in &recipe.ingredients {
        println!("  - {ingredient}");
    }
    if !recipe.instructions.is_empty() {
        println!("\nInstructions:\n{}", recipe.instructions);
    }
    if let Some(ref pairing) = recipe.beverage_pairing {
        println!("\nPairs with: {pairing}");
    }
    if let Some(ref image) = recipe.image {
        println!("Image: {image}");
    }
}

// === Users ===

async fn users(app: &App, action: UserAction) -> Result<()> {
    let me = app.me()?.id.clone();

    match action {
        UserAction::List { search } => {
            let all = app.api.list_users().await.context("Failed to list users")?;
            let tracker = following_of(app, &me).await?;
            let shown = visible_users(&all, &app.session, search.as_deref());
            print_user_table(&shown, &tracker);
        }
        UserAction::Show { id } => {
            let user = app.api.get_user(&id).await.context("Failed to get user")?;
            let recipes = app
                .api
                .recipes_by_author(&id)
                .await
                .context("Failed to list recipes")?;
            let tracker = following_of(app, &me).await?;

            println!("{} <{}>", user.name, user.email);
            if let Some(ref bio) = user.bio {
                println!("{bio}");
            }
            if id != me {
                let state = if tracker.is_following(&id) {
                    "following"
                } else {
                    "not following"
                };
                println!("({state})");
            }
            println!();
            print_recipe_table(&recipes);
        }
        UserAction::Follow { id } => set_follow(app, &me, &id, true).await?,
        UserAction::Unfollow { id } => set_follow(app, &me, &id, false).await?,
        UserAction::Followers { id } => {
            let id = id.unwrap_or_else(|| me.clone());
            let list = app
                .api
                .followers(&id)
                .await
                .context("Failed to list followers")?;
            let tracker = following_of(app, &me).await?;
            print_user_table(&list.iter().collect::<Vec<_>>(), &tracker);
        }
        UserAction::Following { id } => {
            let id = id.unwrap_or_else(|| me.clone());
            let list = app
                .api
                .following(&id)
                .await
                .context("Failed to list following")?;
            let tracker = following_of(app, &me).await?;
            print_user_table(&list.iter().collect::<Vec<_>>(), &tracker);
        }
        UserAction::Discover => {
            let list = app
                .api
                .discover_users()
                .await
                .context("Failed to discover users")?;
            let shown = visible_users(&list, &app.session, None);
            print_user_table(&shown, &FollowTracker::default());
        }
    }
    Ok(())
}

async fn following_of(app: &App, user_id: &str) -> Result<FollowTracker> {
    let list = app
        .api
        .following(user_id)
        .await
        .context("Failed to list following")?;
    Ok(FollowTracker::from_users(&list))
}

async fn set_follow(app: &App, me: &str, target: &str, follow: bool) -> Result<()> {
    let mut tracker = following_of(app, me).await?;

    if tracker.is_following(target) == follow {
        let state = if follow { "Already following" } else { "Not following" };
        println!("{state} {target}");
        return Ok(());
    }

    let now = tracker
        .toggle(app.api.as_ref(), &app.session, target)
        .await
        .context("Failed to update follow")?;
    let verb = if now { "Following" } else { "Unfollowed" };
    println!("✓ {verb} {target}");
    Ok(())
}

fn print_user_table(users: &[&UserProfile], tracker: &FollowTracker) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!("{:<26} {:<24} {:<30} {}", "ID", "NAME", "EMAIL", "FOLLOWING");
    println!("{}", "-".repeat(92));

    for user in users {
        let mark = if tracker.is_following(&user.id) { "yes" } else { "" };
        println!(
            "{:<26} {:<24} {:<30} {}",
            user.id,
            truncate(&user.name, 22),
            truncate(&user.email, 28),
            mark,
        );
    }
}

// === Profile ===

async fn profile(app: &App, action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::Update {
            name,
            bio,
            image,
            image_file,
        } => {
            let profile_image = match image_file {
                Some(file) => Some(
                    app.api
                        .upload_image(&file)
                        .await
                        .with_context(|| format!("Failed to upload {}", file.display()))?,
                ),
                None => image,
            };
            let update = ProfileUpdate {
                name,
                bio,
                profile_image,
            };

            app.api
                .update_profile(&update)
                .await
                .context("Failed to update profile")?;
            app.sessions.update_user_fields(&update);

            // The server may normalise fields; show what it stored.
            let user = match app.sessions.refresh().await {
                Some(user) => user,
                None => app.sessions.snapshot().user.context("Session lost")?,
            };
            println!("✓ Profile updated");
            whoami(&Session::authenticated(user));
        }
    }
    Ok(())
}

// === Comments ===

async fn comments(app: &App, action: CommentAction) -> Result<()> {
    match action {
        CommentAction::List { recipe_id } => {
            let list = app
                .api
                .list_comments(&recipe_id)
                .await
                .context("Failed to get comments")?;
            print_comments(&list);
        }
        CommentAction::Add { recipe_id, content } => {
            let comment = app
                .api
                .add_comment(&recipe_id, &content.join(" "))
                .await
                .context("Failed to add comment")?;
            println!("✓ Comment {} added", comment.id);
        }
        CommentAction::Edit {
            comment_id,
            content,
        } => {
            app.api
                .edit_comment(&comment_id, &content.join(" "))
                .await
                .context("Failed to edit comment")?;
            println!("✓ Comment {comment_id} updated");
        }
        CommentAction::Delete { comment_id } => {
            app.api
                .delete_comment(&comment_id)
                .await
                .context("Failed to delete comment")?;
            println!("✓ Comment {comment_id} deleted");
        }
    }
    Ok(())
}

fn print_comments(comments: &[Comment]) {
    println!("\nComments ({}):", comments.len());
    for comment in comments {
        let author = comment
            .author
            .as_ref()
            .map_or("unknown", |a| a.display_name());
        let when = comment
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("  [{}] {author} {when}", comment.id);
        println!("    {}", comment.content);
    }
}

// === Assistant ===

fn assistant(app: &App) -> ChatAssistant {
    let backend: Arc<dyn CookingAssistant> = app.api.clone();
    ChatAssistant::new(backend)
}

fn print_reply(assistant: &ChatAssistant, reply: slowfood::Result<String>) -> Result<()> {
    match reply {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(err) => match assistant.error() {
            Some(visible) => bail!("{visible} ({err})"),
            None => Err(err.into()),
        },
    }
}

async fn chat(app: &App) -> Result<()> {
    let mut assistant = assistant(app);

    if let Some(welcome) = assistant.transcript().first() {
        println!("{}\n", welcome.content);
    }
    println!("Try asking:");
    for question in assistant.quick_questions() {
        println!("  - {question}");
    }
    println!("\nType /quit to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }

        match assistant.send(line, &app.session).await {
            Ok(reply) => println!("\n{reply}\n"),
            Err(err) => {
                debug!(error = %err, "chat turn failed");
                let visible = assistant.error().map_or_else(|| err.to_string(), String::from);
                println!("\n! {visible}\n");
            }
        }
    }
    Ok(())
}

// === Routes ===

fn describe(gate: Gate) -> String {
    match gate {
        Gate::Render => "open".to_string(),
        Gate::Loading => "verifying".to_string(),
        Gate::Redirect(target) => format!("-> {target}"),
    }
}

fn check_route(session: &Session, path: &str) -> Result<()> {
    let route = route_for(path).with_context(|| format!("No route matches {path}"))?;
    println!(
        "{path} ({}, {:?}): {}",
        route.pattern,
        route.access,
        describe(gate(route.access, session))
    );
    Ok(())
}

fn list_routes(session: &Session) {
    println!("{:<26} {:<15} {}", "ROUTE", "ACCESS", "FOR THIS SESSION");
    println!("{}", "-".repeat(60));
    for route in ROUTES {
        let outcome = describe(gate(route.access, session));
        println!(
            "{:<26} {:<15} {}",
            route.pattern,
            format!("{:?}", route.access),
            outcome
        );
    }
}

/// Cut `s` to `max` characters, marking the cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
