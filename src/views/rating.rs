use serde::Serialize;

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct Summary {
    pub build_id: i32,
    pub average: f64,
    pub count: i64,
    pub my_rating: Option<i32>,
}
