//! Recipe model and the request shapes around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserProfile;

/// Recipe author: the API returns either a bare id or a populated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Id(String),
    User(Box<UserProfile>),
}

impl AuthorRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::User(user) => &user.id,
        }
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        match self {
            Self::User(user) if !user.name.is_empty() => &user.name,
            _ => self.id(),
        }
    }
}

/// Dietary flags shared by recipes, list filters and AI preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietaryFlags {
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub gluten_free: bool,
    #[serde(default)]
    pub lactose_free: bool,
}

impl DietaryFlags {
    pub const fn any(&self) -> bool {
        self.vegetarian || self.vegan || self.gluten_free || self.lactose_free
    }

    /// Enabled flags as their wire names.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            (self.vegetarian, "vegetarian"),
            (self.vegan, "vegan"),
            (self.gluten_free, "glutenFree"),
            (self.lactose_free, "lactoseFree"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

/// A recipe as stored by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(flatten)]
    pub dietary: DietaryFlags,
    #[serde(default)]
    pub time: Option<u32>,
    #[serde(default)]
    pub flavor: Option<String>,
    #[serde(default)]
    pub beverage_pairing: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Recipe {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.as_ref().is_some_and(|a| a.id() == user_id)
    }
}

/// Writable recipe fields for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(flatten)]
    pub dietary: DietaryFlags,
    pub time: Option<u32>,
    pub flavor: String,
    pub beverage_pairing: String,
    pub difficulty: String,
    pub image: String,
}

impl RecipeDraft {
    /// Split a comma separated ingredient list, trimming entries and
    /// dropping blanks.
    pub fn parse_ingredients(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Reject drafts the server would refuse anyway.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::ClientError::Validation("Title is required".into()));
        }
        if self.ingredients.is_empty() {
            return Err(crate::ClientError::Validation(
                "At least one ingredient is required".into(),
            ));
        }
        Ok(())
    }
}

impl From<&Recipe> for RecipeDraft {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            dietary: recipe.dietary,
            time: recipe.time,
            flavor: recipe.flavor.clone().unwrap_or_default(),
            beverage_pairing: recipe.beverage_pairing.clone().unwrap_or_default(),
            difficulty: recipe.difficulty.clone().unwrap_or_default(),
            image: recipe.image.clone().unwrap_or_default(),
        }
    }
}

/// Paginated, filtered recipe listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub filters: DietaryFlags,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 9,
            filters: DietaryFlags::default(),
        }
    }
}

impl RecipeQuery {
    /// Query pairs; only enabled filters are sent.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.to_string()),
        ];
        pairs.extend(self.filters.enabled().into_iter().map(|f| (f, "true".to_string())));
        pairs
    }
}

/// One page of recipes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePage {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default = "one")]
    pub total_pages: u32,
}

const fn one() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipe_with_populated_author() {
        let json = r#"{
            "_id": "r1",
            "title": "Gazpacho",
            "ingredients": ["tomato", "cucumber"],
            "instructions": "Blend.",
            "vegan": true,
            "glutenFree": true,
            "time": 15,
            "author": {"_id": "u1", "name": "Ana", "email": "ana@example.com"},
            "likes": ["u2", "u3"],
            "createdAt": "2024-05-01T10:00:00.000Z"
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.dietary.vegan);
        assert!(!recipe.dietary.vegetarian);
        assert_eq!(recipe.author.as_ref().map(AuthorRef::id), Some("u1"));
        assert!(recipe.is_liked_by("u3"));
        assert!(recipe.is_authored_by("u1"));
        assert!(recipe.created_at.is_some());
    }

    #[test]
    fn test_parse_recipe_with_author_id() {
        let json = r#"{"_id":"r2","title":"Tortilla","author":"u9"}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.author, Some(AuthorRef::Id("u9".into())));
        assert!(recipe.likes.is_empty());
    }

    #[test]
    fn test_parse_ingredients() {
        assert_eq!(
            RecipeDraft::parse_ingredients(" rice, chicken ,, saffron "),
            vec!["rice", "chicken", "saffron"]
        );
    }

    #[test]
    fn test_draft_validation() {
        let draft = RecipeDraft {
            title: "Paella".into(),
            ..RecipeDraft::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_query_only_sends_enabled_filters() {
        let query = RecipeQuery {
            page: 2,
            filters: DietaryFlags {
                vegan: true,
                lactose_free: true,
                ..DietaryFlags::default()
            },
            ..RecipeQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "2".to_string()),
                ("limit", "9".to_string()),
                ("vegan", "true".to_string()),
                ("lactoseFree", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_draft_serializes_flat_flags() {
        let draft = RecipeDraft {
            title: "Salad".into(),
            ingredients: vec!["lettuce".into()],
            dietary: DietaryFlags {
                vegetarian: true,
                ..DietaryFlags::default()
            },
            ..RecipeDraft::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["vegetarian"], true);
        assert_eq!(json["beveragePairing"], "");
    }
}
