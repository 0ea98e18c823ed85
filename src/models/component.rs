use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentCategory {
    #[default]
    Cpu,
    Gpu,
    Motherboard,
    Ram,
    Psu,
    Case,
    Cooler,
    Ssd,
    Hdd,
}

impl ComponentCategory {
    pub const ALL: [ComponentCategory; 9] = [
        ComponentCategory::Cpu,
        ComponentCategory::Gpu,
        ComponentCategory::Motherboard,
        ComponentCategory::Ram,
        ComponentCategory::Psu,
        ComponentCategory::Case,
        ComponentCategory::Cooler,
        ComponentCategory::Ssd,
        ComponentCategory::Hdd,
    ];

    /// Every build needs one of each of these, plus a storage device.
    pub const MANDATORY: [ComponentCategory; 7] = [
        ComponentCategory::Cpu,
        ComponentCategory::Gpu,
        ComponentCategory::Motherboard,
        ComponentCategory::Ram,
        ComponentCategory::Psu,
        ComponentCategory::Case,
        ComponentCategory::Cooler,
    ];

    pub fn is_storage(&self) -> bool {
        matches!(self, ComponentCategory::Ssd | ComponentCategory::Hdd)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Cpu => "CPU",
            ComponentCategory::Gpu => "GPU",
            ComponentCategory::Motherboard => "MOTHERBOARD",
            ComponentCategory::Ram => "RAM",
            ComponentCategory::Psu => "PSU",
            ComponentCategory::Case => "CASE",
            ComponentCategory::Cooler => "COOLER",
            ComponentCategory::Ssd => "SSD",
            ComponentCategory::Hdd => "HDD",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, sqlx::FromRow)]
pub struct Component {
    pub id: i32,
    pub name: String,
    pub link: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: ComponentCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product tile as parsed from a shop listing page, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedComponent {
    pub name: String,
    pub link: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: ComponentCategory,
}

#[derive(Debug, Clone, Serialize, Default, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: ComponentCategory,
    pub count: i64,
}
