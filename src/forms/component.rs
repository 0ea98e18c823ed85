use crate::models::{self, ComponentCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewComponent {
    #[validate(min_length = 1)]
    #[validate(max_length = 512)]
    pub name: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 1024)]
    pub link: String,
    pub price: Decimal,
    #[validate(max_length = 1024)]
    pub image: Option<String>,
    pub category: ComponentCategory,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EditComponent {
    #[validate(min_length = 1)]
    #[validate(max_length = 512)]
    pub name: Option<String>,
    #[validate(min_length = 1)]
    #[validate(max_length = 1024)]
    pub link: Option<String>,
    pub price: Option<Decimal>,
    #[validate(max_length = 1024)]
    pub image: Option<String>,
    pub category: Option<ComponentCategory>,
}

impl EditComponent {
    pub fn update(self, component: &mut models::Component) {
        if let Some(name) = self.name {
            component.name = name;
        }

        if let Some(link) = self.link {
            component.link = link;
        }

        if let Some(price) = self.price {
            component.price = price;
        }

        if let Some(image) = self.image {
            component.image = Some(image).filter(|image| !image.is_empty());
        }

        if let Some(category) = self.category {
            component.category = category;
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSort {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl ComponentSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            ComponentSort::Name => "name ASC, id ASC",
            ComponentSort::PriceAsc => "price ASC, id ASC",
            ComponentSort::PriceDesc => "price DESC, id ASC",
            ComponentSort::Newest => "created_at DESC, id DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ComponentFilter {
    pub category: Option<ComponentCategory>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    pub sort: Option<ComponentSort>,
}
