use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
    pub pages: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
            pages: Some(pages),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
            pages: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_is_ceil_of_total_over_per_page() {
        assert_eq!(Meta::new(1, 12, 0).pages, Some(0));
        assert_eq!(Meta::new(1, 12, 1).pages, Some(1));
        assert_eq!(Meta::new(1, 12, 12).pages, Some(1));
        assert_eq!(Meta::new(1, 12, 13).pages, Some(2));
        assert_eq!(Meta::new(3, 5, 14).pages, Some(3));
    }
}
