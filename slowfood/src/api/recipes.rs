//! Recipe endpoints and image upload.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use super::client::{segment, send, send_unit, ApiClient};
use crate::models::{Recipe, RecipeDraft, RecipePage, RecipeQuery};
use crate::social::LikeApi;
use crate::{ClientError, Result};

/// Multipart field the upload endpoint reads.
const UPLOAD_FIELD: &str = "imageUrl";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_url: String,
}

/// `GET /api/recipes` without a query: older servers answer with a bare
/// array, newer ones with the first page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeListing {
    Plain(Vec<Recipe>),
    Paged(RecipePage),
}

impl ApiClient {
    pub async fn all_recipes(&self) -> Result<Vec<Recipe>> {
        let listing: RecipeListing = send(self.request(Method::GET, "/api/recipes")).await?;
        Ok(match listing {
            RecipeListing::Plain(recipes) => recipes,
            RecipeListing::Paged(page) => page.recipes,
        })
    }

    pub async fn list_recipes(&self, query: &RecipeQuery) -> Result<RecipePage> {
        send(self.request(Method::GET, "/api/recipes").query(&query.to_pairs())).await
    }

    pub async fn get_recipe(&self, id: &str) -> Result<Recipe> {
        let path = format!("/api/recipes/{}", segment(id));
        send(self.request(Method::GET, &path)).await
    }

    pub async fn random_recipe(&self) -> Result<Recipe> {
        send(self.request(Method::GET, "/api/recipes/random")).await
    }

    pub async fn recipes_by_author(&self, author_id: &str) -> Result<Vec<Recipe>> {
        let path = format!("/api/recipes/author/{}", segment(author_id));
        send(self.request(Method::GET, &path)).await
    }

    pub async fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe> {
        draft.validate()?;
        let recipe: Recipe = send(self.request(Method::POST, "/api/recipes").json(draft)).await?;
        info!(id = %recipe.id, title = %recipe.title, "recipe created");
        Ok(recipe)
    }

    pub async fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<Recipe> {
        draft.validate()?;
        let path = format!("/api/recipes/{}", segment(id));
        send(self.request(Method::PUT, &path).json(draft)).await
    }

    pub async fn delete_recipe(&self, id: &str) -> Result<()> {
        let path = format!("/api/recipes/{}", segment(id));
        send_unit(self.request(Method::DELETE, &path)).await?;
        info!(id, "recipe deleted");
        Ok(())
    }

    /// Upload an image file and return the URL the server stored it under.
    pub async fn upload_image(&self, file: &Path) -> Result<String> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation(format!("not a file: {}", file.display())))?
            .to_string();

        let form = Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(file_name));
        let resp: UploadResponse = send(
            self.request(Method::POST, "/api/upload")
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .multipart(form),
        )
        .await?;
        Ok(resp.file_url)
    }
}

#[async_trait]
impl LikeApi for ApiClient {
    async fn like(&self, recipe_id: &str) -> Result<Recipe> {
        let path = format!("/api/recipes/{}/like", segment(recipe_id));
        send(self.request(Method::POST, &path)).await
    }

    async fn unlike(&self, recipe_id: &str) -> Result<Recipe> {
        let path = format!("/api/recipes/{}/unlike", segment(recipe_id));
        send(self.request(Method::POST, &path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_client;
    use crate::models::DietaryFlags;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn recipe_json(id: &str, likes: &[&str]) -> serde_json::Value {
        json!({
            "_id": id,
            "title": "Gazpacho",
            "ingredients": ["tomato", "cucumber"],
            "instructions": "Blend.",
            "vegan": true,
            "likes": likes,
            "author": {"_id": "u1", "name": "Ana", "email": "ana@example.com"}
        })
    }

    #[tokio::test]
    async fn test_list_recipes_sends_page_and_enabled_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/recipes"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "9"))
            .and(query_param("glutenFree", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recipes": [recipe_json("r1", &[])],
                "totalPages": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = test_client(&server, None);
        let page = api
            .list_recipes(&RecipeQuery {
                page: 2,
                filters: DietaryFlags {
                    gluten_free: true,
                    ..DietaryFlags::default()
                },
                ..RecipeQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.recipes[0].title, "Gazpacho");

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default();
        assert!(!query.contains("vegan"));
    }

    #[tokio::test]
    async fn test_all_recipes_accepts_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/recipes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                recipe_json("r1", &[]),
                recipe_json("r2", &["u1"])
            ])))
            .mount(&server)
            .await;

        let api = test_client(&server, None);
        let recipes = api.all_recipes().await.unwrap();

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[1].likes, vec!["u1"]);
    }

    #[tokio::test]
    async fn test_create_recipe_validates_before_sending() {
        let server = MockServer::start().await;
        let api = test_client(&server, Some("t"));

        let err = api
            .create_recipe(&RecipeDraft {
                title: "Soup".into(),
                ..RecipeDraft::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_recipe_posts_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/recipes"))
            .and(body_partial_json(json!({
                "title": "Gazpacho",
                "ingredients": ["tomato", "cucumber"],
                "vegan": true,
                "beveragePairing": "white wine"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(recipe_json("r9", &[])))
            .expect(1)
            .mount(&server)
            .await;

        let api = test_client(&server, Some("t"));
        let recipe = api
            .create_recipe(&RecipeDraft {
                title: "Gazpacho".into(),
                ingredients: RecipeDraft::parse_ingredients("tomato, cucumber"),
                dietary: DietaryFlags {
                    vegan: true,
                    ..DietaryFlags::default()
                },
                beverage_pairing: "white wine".into(),
                ..RecipeDraft::default()
            })
            .await
            .unwrap();

        assert_eq!(recipe.id, "r9");
    }

    #[tokio::test]
    async fn test_like_returns_updated_recipe() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/recipes/r1/like"))
            .respond_with(ResponseTemplate::new(200).set_body_json(recipe_json("r1", &["u2"])))
            .mount(&server)
            .await;

        let api = test_client(&server, Some("t"));
        let recipe = api.like("r1").await.unwrap();

        assert!(recipe.is_liked_by("u2"));
    }

    #[tokio::test]
    async fn test_missing_recipe_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/recipes/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Recipe not found"})))
            .mount(&server)
            .await;

        let api = test_client(&server, None);
        match api.get_recipe("nope").await.unwrap_err() {
            ClientError::Status { status, message } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(message, "Recipe not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_image_returns_file_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"fileUrl": "https://cdn.example.com/a.jpg"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jpg");
        std::fs::write(&file, b"jpeg bytes").unwrap();

        let api = test_client(&server, Some("t"));
        let url = api.upload_image(&file).await.unwrap();

        assert_eq!(url, "https://cdn.example.com/a.jpg");
        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"imageUrl\""));
        assert!(body.contains("jpeg bytes"));
    }
}
