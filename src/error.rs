use thiserror::Error;

/// Failures the extraction pipelines distinguish between. Transport faults
/// are not here: they are absorbed at the fetch boundary and surface as an
/// absent response.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// An element the page layout guarantees was absent. Fatal for
    /// top-level structure, skippable for a lookup inside one row.
    #[error("expected element not found: `{selector}`")]
    StructuralMismatch { selector: String },

    #[error("invalid css selector: `{0}`")]
    BadSelector(String),

    #[error("\"All versions\" list not found in the sidebar")]
    VersionListNotFound,

    /// The static expected-status table has no entry for this preview
    /// code. The table is stale relative to the live site.
    #[error("no expected statuses configured for preview code {0:?}")]
    UnknownStatusCode(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
