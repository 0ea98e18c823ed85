use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct RatingForm {
    #[validate(minimum = 1)]
    #[validate(maximum = 5)]
    pub rating: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(RatingForm { rating: 0 }.validate().is_err());
        assert!(RatingForm { rating: 1 }.validate().is_ok());
        assert!(RatingForm { rating: 5 }.validate().is_ok());
        assert!(RatingForm { rating: 6 }.validate().is_err());
    }
}
