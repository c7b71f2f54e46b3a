//! Listing page identifier discovery

use scraper::{Html, Selector};

use crate::error::Result;
use crate::extractor::compile_locator;
use crate::models::IdentifierSet;
use crate::traits::SiteLayout;

pub struct ListingWalker {
    entry: Selector,
    attr: String,
}

impl ListingWalker {
    pub fn new(layout: &SiteLayout) -> Result<Self> {
        Ok(Self {
            entry: compile_locator("listing entry", &layout.listing_entry)?,
            attr: layout.listing_entry_attr.clone(),
        })
    }

    /// Identifiers of every listing entry in `markup`, in document order.
    ///
    /// Anchors without the identifier attribute (or with an empty one) are ignored.
    pub fn collect_identifiers(&self, markup: &str) -> IdentifierSet {
        let document = Html::parse_document(markup);
        let mut ids = IdentifierSet::new();

        for anchor in document.select(&self.entry) {
            if let Some(href) = anchor.value().attr(&self.attr)
                && !href.trim().is_empty()
            {
                ids.insert(href.trim());
            }
        }

        ids
    }
}
