//! Data models for catalog records and their derived aggregates

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight fields a product page is mined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Title,
    Status,
    Price,
    Wishlist,
    Character,
    Series,
    Category,
    Manufacturer,
}

impl FieldKind {
    pub const ALL: [Self; 8] = [
        Self::Title,
        Self::Status,
        Self::Price,
        Self::Wishlist,
        Self::Character,
        Self::Series,
        Self::Category,
        Self::Manufacturer,
    ];

    /// Title and Status abort the item when missing; everything else degrades to absent.
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Title | Self::Status)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Status => "Status",
            Self::Price => "Price",
            Self::Wishlist => "Wishlist",
            Self::Character => "Character",
            Self::Series => "Series",
            Self::Category => "Category",
            Self::Manufacturer => "Manufacturer",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One catalog item as scraped from its product page.
///
/// Field order matches the interchange header
/// `Title,Status,Price,Wishlist,Character,Series,Category,Manufacturer`.
/// `None` means the page had no such location (or its text was unusable),
/// never a zero or empty default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Price")]
    pub price: Option<i64>,
    #[serde(rename = "Wishlist")]
    pub wishlist: Option<i64>,
    #[serde(rename = "Character")]
    pub character: Option<String>,
    #[serde(rename = "Series")]
    pub series: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Manufacturer")]
    pub manufacturer: Option<String>,
}

/// A row of `product_wishlists_series`, read back after ingest
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCharacterAggregate {
    pub series: String,
    pub character: String,
    pub wishlist_total: Option<i64>,
    pub average_wishlist: Option<f64>,
}

/// Insertion-ordered set of item identifiers.
///
/// Discovery order is preserved so extraction visits items in the order the
/// listing presented them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the identifier was not already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Merges `other` into `self`, returning how many identifiers were new.
    pub fn merge(&mut self, other: Self) -> usize {
        other
            .order
            .into_iter()
            .filter(|id| self.insert(id.as_str()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
