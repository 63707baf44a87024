// crates/tzfix-core/src/error.rs

use thiserror::Error;

/// Failures reported by a [`crate::catalog::Catalog`] implementation.
///
/// A failure while listing ends pagination for the batch; a failure while
/// updating is recorded against that single asset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode catalog response: {0}")]
    Decode(String),

    #[error("invalid catalog configuration: {0}")]
    Config(String),
}
