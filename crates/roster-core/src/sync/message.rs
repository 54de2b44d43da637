//! Remote directory message types
//!
//! JSON bodies returned by `GET /users?page=<n>`.

use serde::{Deserialize, Serialize};

use crate::models::Student;

/// The page requested by a sync
pub const FIRST_PAGE: u32 = 1;

/// One page of the remote directory listing
///
/// Unknown top-level fields (e.g. `support`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPage {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub total_pages: u32,
    pub data: Vec<Student>,
}

impl UserPage {
    /// Build a single page holding `data` (useful for tests and fixtures)
    pub fn single(data: Vec<Student>) -> Self {
        let len = data.len() as u32;
        Self {
            page: FIRST_PAGE,
            per_page: len,
            total: len,
            total_pages: 1,
            data,
        }
    }

    /// Decode a page from a response body
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Whether the directory has pages after this one
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}
