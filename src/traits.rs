//! Traits and layout configuration for site-agnostic catalog harvesting

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FieldKind;

/// Structural locators for one version of a site's page layout
#[derive(Debug, Clone)]
pub struct SiteLayout {
    /// Display name for the site
    pub name: String,
    /// Root URL that relative identifiers are appended to
    pub base_url: String,
    /// Listing URL pattern with `{query}` and `{page}` placeholders
    pub listing_url_pattern: String,
    /// Locator for the anchors of listing entries
    pub listing_entry: String,
    /// Attribute on a listing anchor that carries the identifier
    pub listing_entry_attr: String,
    /// Locator per product-page field
    pub fields: HashMap<FieldKind, String>,
}

impl SiteLayout {
    /// Builds the listing URL for a 1-based page number.
    pub fn listing_url(&self, query: &str, page: u32) -> String {
        let encoded = urlencoding::encode(query);
        self.listing_url_pattern
            .replace("{query}", &encoded)
            .replace("{page}", &page.to_string())
    }

    /// Resolves an identifier to the absolute URL of its product page.
    pub fn item_url(&self, identifier: &str) -> String {
        if identifier.starts_with("http") {
            identifier.to_string()
        } else {
            format!("{}{}", self.base_url, identifier)
        }
    }
}

/// Source of rendered page markup.
///
/// Implementations hold a single "current page"; callers navigate, then read
/// the markup, and may ask for more lazily loaded content on the same page.
#[async_trait]
pub trait PageSource: Send {
    /// Load `url` as the current page.
    ///
    /// # Errors
    /// * `CatalogError::EndOfCatalog` - nothing to navigate to at `url`
    /// * any other error is fatal to the run
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Rendered markup of the current page
    async fn current_markup(&mut self) -> Result<String>;

    /// Best-effort request for more content on the current page.
    ///
    /// No guarantee that the markup changes afterwards.
    async fn trigger_lazy_load(&mut self) -> Result<()>;
}
