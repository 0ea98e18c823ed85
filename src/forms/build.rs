use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BuildForm {
    #[validate(min_length = 3)]
    #[validate(max_length = 100)]
    pub title: String,
    #[validate(max_length = 2000)]
    pub description: Option<String>,
    #[validate(min_items = 1)]
    #[validate(max_items = 30)]
    #[validate(unique_items)]
    pub component_ids: Vec<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuildSort {
    #[default]
    New,
    Rating,
    Views,
}

impl BuildSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            BuildSort::New => "b.created_at DESC, b.id DESC",
            BuildSort::Rating => "average_rating DESC, ratings_count DESC, b.id DESC",
            BuildSort::Views => "views_count DESC, b.id DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BuildFilter {
    pub author_id: Option<i32>,
    pub search: Option<String>,
    pub sort: Option<BuildSort>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 2000)]
    pub text: String,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EditComment {
    #[validate(min_length = 1)]
    #[validate(max_length = 2000)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_components_are_rejected() {
        let form = BuildForm {
            title: "Gaming rig".to_string(),
            description: None,
            component_ids: vec![1, 2, 2],
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn empty_build_is_rejected() {
        let form = BuildForm {
            title: "Gaming rig".to_string(),
            description: None,
            component_ids: vec![],
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn short_title_is_rejected() {
        let form = BuildForm {
            title: "PC".to_string(),
            description: None,
            component_ids: vec![1],
        };
        assert!(form.validate().is_err());
    }
}
