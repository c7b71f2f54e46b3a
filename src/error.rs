//! Error taxonomy for the catalog pipeline

use thiserror::Error;

use crate::models::FieldKind;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field's locator resolved to nothing
    #[error("required field {field} not found")]
    RequiredFieldMissing { field: FieldKind },

    /// Located text could not be normalized into the field's type
    #[error("malformed {field} text: {text:?}")]
    MalformedField { field: FieldKind, text: String },

    #[error("relational sink unavailable: {0}")]
    SinkUnavailable(#[from] sqlx::Error),

    /// The page source found no navigation target; the listing is exhausted
    #[error("no navigation target at {url}")]
    EndOfCatalog { url: String },

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("fetch of {url} returned {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("invalid locator for {field}: {locator:?}")]
    InvalidLocator { field: String, locator: String },

    #[error("interchange error: {0}")]
    Interchange(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Field-level failures the orchestrator skips past instead of aborting on.
    pub fn is_item_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequiredFieldMissing { .. } | Self::MalformedField { .. }
        )
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
