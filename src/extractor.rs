//! Product page to `ProductRecord` extraction

use std::collections::HashMap;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::models::{FieldKind, ProductRecord};
use crate::normalizer::{normalize_price, normalize_title, normalize_wishlist};
use crate::traits::SiteLayout;

/// Parses a configured locator, naming the offending field on failure.
pub(crate) fn compile_locator(field: &str, locator: &str) -> Result<Selector> {
    Selector::parse(locator).map_err(|_| CatalogError::InvalidLocator {
        field: field.to_string(),
        locator: locator.to_string(),
    })
}

/// Extracts one record per product page using precompiled field locators
pub struct RecordExtractor {
    locators: HashMap<FieldKind, Selector>,
}

impl RecordExtractor {
    /// Compiles every field locator in `layout`.
    ///
    /// # Errors
    /// * `CatalogError::InvalidLocator` - a locator is not a valid selector, or
    ///   a required field has no locator at all
    pub fn new(layout: &SiteLayout) -> Result<Self> {
        let mut locators = HashMap::new();

        for field in FieldKind::ALL {
            match layout.fields.get(&field) {
                Some(locator) => {
                    locators.insert(field, compile_locator(field.name(), locator)?);
                }
                None if field.is_required() => {
                    return Err(CatalogError::InvalidLocator {
                        field: field.name().to_string(),
                        locator: String::new(),
                    });
                }
                None => debug!("{} has no {} locator", layout.name, field),
            }
        }

        Ok(Self { locators })
    }

    /// Builds a record from the rendered markup of one product page.
    ///
    /// # Errors
    /// * `CatalogError::RequiredFieldMissing` - Title or Status not found
    /// * `CatalogError::MalformedField` - the title collapses to nothing
    pub fn extract(&self, markup: &str, source_url: &str) -> Result<ProductRecord> {
        let document = Html::parse_document(markup);

        let title = normalize_title(&self.required(&document, FieldKind::Title)?);
        if title.is_empty() {
            return Err(CatalogError::MalformedField {
                field: FieldKind::Title,
                text: title,
            });
        }
        let status = normalize_title(&self.required(&document, FieldKind::Status)?);

        Ok(ProductRecord {
            title,
            status,
            price: self.optional(&document, FieldKind::Price, source_url, normalize_price),
            wishlist: self.optional(&document, FieldKind::Wishlist, source_url, normalize_wishlist),
            character: self.optional_text(&document, FieldKind::Character),
            series: self.optional_text(&document, FieldKind::Series),
            category: self.optional_text(&document, FieldKind::Category),
            manufacturer: self.optional_text(&document, FieldKind::Manufacturer),
        })
    }

    /// Trimmed text of the first element matching the field's locator
    fn locate(&self, document: &Html, field: FieldKind) -> Option<String> {
        let selector = self.locators.get(&field)?;
        document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    fn required(&self, document: &Html, field: FieldKind) -> Result<String> {
        self.locate(document, field)
            .ok_or(CatalogError::RequiredFieldMissing { field })
    }

    fn optional<T>(
        &self,
        document: &Html,
        field: FieldKind,
        source_url: &str,
        normalize: impl Fn(&str) -> Result<T>,
    ) -> Option<T> {
        let text = self.locate(document, field)?;

        match normalize(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{}: {}, recording {} as absent", source_url, e, field);
                None
            }
        }
    }

    fn optional_text(&self, document: &Html, field: FieldKind) -> Option<String> {
        self.locate(document, field)
            .map(|text| normalize_title(&text))
            .filter(|text| !text.is_empty())
    }
}
