use axum::http::{header, HeaderMap, Uri};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

pub const INVALID_PAGE: &str = "Invalid page.";

/// One page of a list response: `{count, next, previous, results}`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T: Serialize> {
    #[schema(example = 123)]
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Page number resolved against the total row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Resolve `?page=` (1-based, or `last`). An empty table still has page 1.
pub fn resolve_page(raw: Option<&str>, count: i64, page_size: u32) -> Result<PageWindow, ApiError> {
    let limit = i64::from(page_size.max(1));
    let num_pages = ((count + limit - 1) / limit).max(1);

    let number = match raw.map(str::trim) {
        None | Some("") => 1,
        Some("last") => num_pages,
        Some(s) => s.parse::<i64>().map_err(|_| ApiError::not_found(INVALID_PAGE))?,
    };

    if number < 1 || number > num_pages {
        return Err(ApiError::not_found(INVALID_PAGE));
    }

    Ok(PageWindow {
        number,
        num_pages,
        limit,
        offset: (number - 1) * limit,
    })
}

impl<T: Serialize> Page<T> {
    /// `base_url` is the list URL without a query string.
    pub fn new(results: Vec<T>, count: i64, window: PageWindow, base_url: &str) -> Self {
        let next = (window.number < window.num_pages).then(|| page_link(base_url, window.number + 1));
        let previous = (window.number > 1).then(|| page_link(base_url, window.number - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Page 1 is the bare list URL
fn page_link(base_url: &str, number: i64) -> String {
    if number == 1 {
        base_url.to_string()
    } else {
        format!("{}?page={}", base_url, number)
    }
}

/// Absolute URL of the current path when a Host header is present, else the bare path.
pub fn request_base_url(headers: &HeaderMap, uri: &Uri) -> String {
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, uri.path()),
        None => uri.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn resolves_page_numbers() {
        let window = resolve_page(None, 12, 5).unwrap();
        assert_eq!((window.number, window.num_pages, window.offset), (1, 3, 0));

        let window = resolve_page(Some("3"), 12, 5).unwrap();
        assert_eq!((window.limit, window.offset), (5, 10));

        assert_eq!(resolve_page(Some("last"), 12, 5).unwrap().number, 3);
        assert_eq!(resolve_page(None, 0, 5).unwrap().num_pages, 1);
    }

    #[test]
    fn out_of_range_pages_are_not_found() {
        for raw in ["0", "4", "-1", "two"] {
            let err = resolve_page(Some(raw), 12, 5).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(err.message(), INVALID_PAGE);
        }
    }

    #[test]
    fn page_links() {
        let base = "http://testserver/payment-debt/";
        let middle = Page::new(vec![1], 12, resolve_page(Some("2"), 12, 5).unwrap(), base);
        assert_eq!(middle.next.as_deref(), Some("http://testserver/payment-debt/?page=3"));
        assert_eq!(middle.previous.as_deref(), Some(base));

        let only = Page::new(vec![1], 1, resolve_page(None, 1, 5).unwrap(), base);
        assert_eq!(only.next, None);
        assert_eq!(only.previous, None);
    }
}
