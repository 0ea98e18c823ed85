use crate::models::{self, FeedbackStatus, FeedbackType};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewFeedback {
    pub feedback_type: FeedbackType,
    #[validate(minimum = 1)]
    #[validate(maximum = 5)]
    pub rating: i32,
    #[validate(min_length = 1)]
    #[validate(max_length = 4000)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UserEditFeedback {
    pub feedback_type: Option<FeedbackType>,
    #[validate(minimum = 1)]
    #[validate(maximum = 5)]
    pub rating: Option<i32>,
    #[validate(min_length = 1)]
    #[validate(max_length = 4000)]
    pub text: Option<String>,
}

impl UserEditFeedback {
    pub fn update(self, feedback: &mut models::Feedback) {
        if let Some(feedback_type) = self.feedback_type {
            feedback.feedback_type = feedback_type;
        }

        if let Some(rating) = self.rating {
            feedback.rating = rating;
        }

        if let Some(text) = self.text {
            feedback.text = text;
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AdminEditFeedback {
    pub status: Option<FeedbackStatus>,
    #[validate(min_length = 1)]
    #[validate(max_length = 4000)]
    pub admin_response: Option<String>,
}

impl AdminEditFeedback {
    pub fn update(self, feedback: &mut models::Feedback) {
        if let Some(status) = self.status {
            feedback.status = status;
        }

        if let Some(admin_response) = self.admin_response {
            feedback.admin_response = Some(admin_response);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackFilter {
    pub status: Option<FeedbackStatus>,
    pub feedback_type: Option<FeedbackType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outside_one_to_five_is_invalid() {
        let form = NewFeedback {
            feedback_type: FeedbackType::Bug,
            rating: 6,
            text: "crash on save".to_string(),
        };
        assert!(form.validate().is_err());

        let form = NewFeedback {
            feedback_type: FeedbackType::Bug,
            rating: 5,
            text: "crash on save".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn user_edit_only_touches_given_fields() {
        let mut feedback = models::Feedback {
            rating: 2,
            text: "old".to_string(),
            feedback_type: FeedbackType::Other,
            ..Default::default()
        };

        UserEditFeedback {
            feedback_type: None,
            rating: Some(4),
            text: None,
        }
        .update(&mut feedback);

        assert_eq!(feedback.rating, 4);
        assert_eq!(feedback.text, "old");
        assert_eq!(feedback.feedback_type, FeedbackType::Other);
    }
}
