use crate::models;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Detail {
    #[serde(flatten)]
    pub summary: models::BuildSummary,
    pub components: Vec<models::Component>,
    pub total_price: Decimal,
}

impl Detail {
    pub fn new(summary: models::BuildSummary, components: Vec<models::Component>) -> Self {
        let total_price = components.iter().map(|component| component.price).sum();
        Self {
            summary,
            components,
            total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_price_sums_components() {
        let components = vec![
            models::Component {
                price: dec!(15999.90),
                ..Default::default()
            },
            models::Component {
                price: dec!(4000.10),
                ..Default::default()
            },
        ];
        let detail = Detail::new(models::BuildSummary::default(), components);
        assert_eq!(detail.total_price, dec!(20000.00));
    }
}
