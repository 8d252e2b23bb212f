//! Image search API types and the client seam.
//!
//! The controller only talks to [`ImageSearch`]; the production implementation
//! lives in [`curl`] and shells out to `curl` the same way the rest of the app
//! drives external tools.

pub mod curl;

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub use curl::CurlClient;

/// Unsplash photo search endpoint
pub const DEFAULT_API_URL: &str = "https://api.unsplash.com/search/photos";

/// Results requested per page
pub const PER_PAGE: u32 = 20;

/// One page request against the search endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32) -> Self {
        Self {
            query: query.into(),
            page,
            per_page: PER_PAGE,
        }
    }
}

/// A single image as shown in the result grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub id: String,
    pub thumbnail_url: String,
    pub alt_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ImageResult {
    /// Text to show for the image (falls back to the id)
    pub fn label(&self) -> &str {
        self.alt_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.id)
    }

    /// Best URL to hand to an external opener
    pub fn open_url(&self) -> &str {
        self.link.as_deref().unwrap_or(&self.thumbnail_url)
    }
}

/// Decoded result of one fetch cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub results: Vec<ImageResult>,
    pub total_pages: u32,
    pub total: u64,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no API access key configured")]
    MissingCredential,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("API responded with HTTP {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can answer a [`SearchRequest`]
pub trait ImageSearch {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchPage, FetchError>> + Send;
}

// Wire format of the search endpoint

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    total: u64,
    total_pages: u32,
    results: Vec<RawPhoto>,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    id: String,
    urls: RawUrls,
    alt_description: Option<String>,
    #[serde(default)]
    user: Option<RawUser>,
    #[serde(default)]
    links: Option<RawLinks>,
}

#[derive(Debug, Deserialize)]
struct RawUrls {
    small: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLinks {
    html: Option<String>,
}

impl From<RawPhoto> for ImageResult {
    fn from(raw: RawPhoto) -> Self {
        Self {
            id: raw.id,
            thumbnail_url: raw.urls.small,
            alt_description: raw.alt_description,
            author: raw.user.and_then(|u| u.name),
            link: raw.links.and_then(|l| l.html),
        }
    }
}

/// Decode a search response body
pub fn parse_search_page(body: &[u8]) -> Result<SearchPage, FetchError> {
    let raw: RawSearchResponse = serde_json::from_slice(body)?;
    Ok(SearchPage {
        results: raw.results.into_iter().map(ImageResult::from).collect(),
        total_pages: raw.total_pages,
        total: raw.total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "total": 133,
        "total_pages": 7,
        "results": [
            {
                "id": "eOLpJytrbsQ",
                "urls": { "raw": "https://images.unsplash.com/a?raw", "small": "https://images.unsplash.com/a?w=400" },
                "alt_description": "orange cat on a sofa",
                "user": { "name": "Jane Doe" },
                "links": { "html": "https://unsplash.com/photos/eOLpJytrbsQ" }
            },
            {
                "id": "Z9x8",
                "urls": { "small": "https://images.unsplash.com/b?w=400" },
                "alt_description": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_search_page() {
        let page = parse_search_page(SAMPLE.as_bytes()).unwrap();

        assert_eq!(page.total_pages, 7);
        assert_eq!(page.total, 133);
        assert_eq!(page.results.len(), 2);

        let first = &page.results[0];
        assert_eq!(first.id, "eOLpJytrbsQ");
        assert_eq!(first.thumbnail_url, "https://images.unsplash.com/a?w=400");
        assert_eq!(first.author.as_deref(), Some("Jane Doe"));
        assert_eq!(first.open_url(), "https://unsplash.com/photos/eOLpJytrbsQ");

        // Missing optional fields stay None
        let second = &page.results[1];
        assert_eq!(second.alt_description, None);
        assert_eq!(second.author, None);
        assert_eq!(second.open_url(), "https://images.unsplash.com/b?w=400");
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        let err = parse_search_page(b"<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));

        // total_pages is required
        let err = parse_search_page(br#"{"results": []}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let mut image = ImageResult {
            id: "abc".to_string(),
            thumbnail_url: "https://example.com/abc".to_string(),
            alt_description: Some("  ".to_string()),
            author: None,
            link: None,
        };
        assert_eq!(image.label(), "abc");

        image.alt_description = Some("a red fox".to_string());
        assert_eq!(image.label(), "a red fox");
    }

    #[test]
    fn test_request_uses_fixed_page_size() {
        let request = SearchRequest::new("ocean", 3);
        assert_eq!(request.per_page, 20);
        assert_eq!(request.page, 3);
    }
}
