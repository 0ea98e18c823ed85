use crate::helpers::PageMeta;
use serde::Deserialize;

/// `?page=&per_page=` query, extracted next to the endpoint's own filter query.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Pagination {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const MAX_PER_PAGE: u32 = 100;

    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.per_page() as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.per_page() as i64
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            page: self.page(),
            per_page: self.per_page(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.per_page(), 20);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let pagination = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.per_page(), 100);

        let pagination = Pagination {
            page: Some(3),
            per_page: Some(0),
        };
        assert_eq!(pagination.per_page(), 1);
        assert_eq!(pagination.offset(), 2);
    }

    #[test]
    fn offset_follows_page() {
        let pagination = Pagination::new(4, 25);
        assert_eq!(pagination.offset(), 75);
        assert_eq!(pagination.limit(), 25);
        assert_eq!(pagination.meta(101).total, 101);
    }
}
