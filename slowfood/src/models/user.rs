//! User profile and account payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A platform user as returned by `/auth/verify` and the user endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Fields this client does not model, kept so merges never drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Shallow-merge the fields present in `update`.
    pub fn merge(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(bio) = &update.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(image) = &update.profile_image {
            self.profile_image = Some(image.clone());
        }
    }

    /// Case-insensitive match on name or email.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.email.to_lowercase().contains(&term)
    }
}

/// Partial profile, used both for `PUT /api/users/profile` and for local
/// optimistic updates of the session user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl ProfileUpdate {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.profile_image.is_none()
    }
}

/// Login body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signup body.
#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chef() -> UserProfile {
        serde_json::from_str(
            r#"{"_id":"u1","name":"Ana","email":"ana@example.com","bio":"Baker","role":"admin"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_fields_kept() {
        let user = chef();
        assert_eq!(user.extra.get("role"), Some(&Value::String("admin".into())));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["_id"], "u1");
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut user = chef();
        user.merge(&ProfileUpdate {
            name: Some("Ana María".into()),
            ..ProfileUpdate::default()
        });
        assert_eq!(user.name, "Ana María");
        assert_eq!(user.bio.as_deref(), Some("Baker"));
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn test_matches_name_or_email() {
        let user = chef();
        assert!(user.matches("ANA"));
        assert!(user.matches("example.com"));
        assert!(!user.matches("luis"));
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            bio: Some("Hi".into()),
            ..ProfileUpdate::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"bio":"Hi"}"#);
    }
}
