//! Typed endpoint groups of the Planora backend API.
//!
//! Each group is a thin borrow over the authenticated pipeline; all retry
//! and refresh behavior lives in [`transport`](crate::transport).

pub mod auth;
pub mod documents;
pub mod mail;
pub mod phases;
pub mod projects;
pub mod stats;
pub mod users;

use serde::Deserialize;

/// Paged list envelope used by every listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a further page exists after this one.
    pub fn has_next(&self) -> bool {
        let seen = (self.page as u64).saturating_mul(self.size as u64) + self.items.len() as u64;
        seen < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_decodes_and_paginates() {
        let page: Page<String> = serde_json::from_value(serde_json::json!({
            "items": ["a", "b"],
            "total": 5,
            "page": 0,
            "size": 2,
        }))
        .unwrap();

        assert!(!page.is_empty());
        assert!(page.has_next());

        let last: Page<String> = serde_json::from_value(serde_json::json!({
            "items": ["e"],
            "total": 5,
            "page": 2,
            "size": 2,
        }))
        .unwrap();
        assert!(!last.has_next());
    }
}
