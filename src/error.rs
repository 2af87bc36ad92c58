use thiserror::Error;

/// Errors raised while building feature contexts and serving recommendations.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog or user set was empty, so normalization bounds are undefined
    #[error("cannot build bounds from an empty {0}")]
    EmptyInput(&'static str),

    /// A product references a category or color the context never indexed
    #[error("product {product:?} has {field} {value:?} which is not in the context index")]
    UnknownCategoricalValue {
        field: &'static str,
        value: String,
        product: String,
    },

    /// Product names are the catalog key
    #[error("product name {0:?} appears more than once in the catalog")]
    DuplicateProduct(String),

    /// NaN or infinite price/age
    #[error("{field} must be finite, got {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("vector for {name:?} has {actual} dimensions, context expects {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("product vectors were already attached to this context")]
    VectorsAlreadyAttached,

    /// Recommendation requested before any training run completed
    #[error("no trained context has been published yet")]
    NoContext,

    #[error("product {0:?} is not in the catalog")]
    UnknownProduct(String),

    /// Failure reported back by a worker thread
    #[error("worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("worker channel disconnected")]
    WorkerDisconnected,
}

pub type Result<T> = std::result::Result<T, Error>;
