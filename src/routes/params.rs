use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(12).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub country: Option<String>,
    /// Defaults to "active" for the public listing.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MyProductsQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewQuery {
    pub product_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_and_clamps() {
        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.normalize(), (1, 12, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));

        let p = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
    }
}
