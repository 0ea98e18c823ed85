use crate::models::{self, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What other users may see about an account.
#[derive(Debug, Serialize, Default)]
pub struct Public {
    pub id: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<models::User> for Public {
    fn from(user: models::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_view_hides_identities() {
        let user = models::User {
            id: 5,
            name: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            google_id: Some("g-1".to_string()),
            telegram_id: Some(42),
            ..Default::default()
        };

        let json = serde_json::to_value(Public::from(user)).unwrap();
        assert_eq!(json["id"], 5);
        assert!(json.get("email").is_none());
        assert!(json.get("google_id").is_none());
        assert!(json.get("telegram_id").is_none());
    }
}
