//! Pagination helpers for GitHub list endpoints
//!
//! GitHub pages are 1-indexed and capped at 100 items. List responses carry a
//! `total_count` next to the page of items.

use crate::client::models::{Environment, EnvironmentList, Secret, SecretList};

/// Maximum page size accepted by the GitHub REST API.
pub const MAX_PAGE_SIZE: usize = 100;

/// Pagination parameters for one list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// Items per page (max 100)
    pub per_page: usize,
    /// Page number, starting at 1
    pub page: usize,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            per_page: MAX_PAGE_SIZE,
            page: 1,
        }
    }
}

impl PaginationParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[cfg(test)]
    pub fn per_page(mut self, size: usize) -> Self {
        self.per_page = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Set the page number.
    #[cfg(test)]
    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Parameters for the page after this one.
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }

    /// Query string pairs in GitHub parameter names.
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}

/// A list response: one page of items plus the total across all pages.
pub trait Listing {
    type Item;

    fn total_count(&self) -> usize;

    fn into_items(self) -> Vec<Self::Item>;
}

impl Listing for SecretList {
    type Item = Secret;

    fn total_count(&self) -> usize {
        self.total_count
    }

    fn into_items(self) -> Vec<Secret> {
        self.secrets
    }
}

impl Listing for EnvironmentList {
    type Item = Environment;

    fn total_count(&self) -> usize {
        self.total_count
    }

    fn into_items(self) -> Vec<Environment> {
        self.environments
    }
}

/// Whether another page should be requested after receiving `page_len` items.
///
/// A short page ends the listing even when `total_count` claims more.
pub fn has_next_page(fetched: usize, total_count: usize, page_len: usize, per_page: usize) -> bool {
    page_len == per_page && fetched < total_count
}
