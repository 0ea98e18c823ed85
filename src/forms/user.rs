use crate::models::{self, Role};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(min_length = 1)]
    #[validate(max_length = 100)]
    pub name: Option<String>,
    #[validate(max_length = 1024)]
    pub avatar_url: Option<String>,
}

impl UpdateProfile {
    pub fn update(self, user: &mut models::User) {
        if let Some(name) = self.name {
            user.name = name.trim().to_string();
        }

        if let Some(avatar_url) = self.avatar_url {
            user.avatar_url = Some(avatar_url).filter(|url| !url.trim().is_empty());
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeRole {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ChangeActive {
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
}
