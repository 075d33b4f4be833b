use crate::shape::Shape;

/// All errors that can occur while preparing a dataset.
///
/// Configuration mistakes, bad indexes, inconsistent arrays and provider
/// failures all end up here. Every failure is fatal to the caller: nothing
/// in the workspace retries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `data` and `targets` disagree on the number of samples.
    #[error(
        "length mismatch: data holds {data} elements for item shape {shape}, targets hold {targets} labels"
    )]
    LengthMismatch {
        data: usize,
        shape: Shape,
        targets: usize,
    },

    /// A sample index outside `[0, len)`.
    #[error("index {index} out of range for dataset of {len} samples")]
    IndexOutOfRange { index: usize, len: usize },

    /// Asked to pick more samples than the pool holds.
    #[error("want to select {requested} indexes but only {available} samples are available")]
    NotEnoughSamples { requested: usize, available: usize },

    /// Substitutes requested from an empty pool (every sample is being replaced).
    #[error("no samples left to draw {requested} substitutes from")]
    EmptyPool { requested: usize },

    /// Item shapes of two arrays that must agree do not.
    #[error("item shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: Shape, got: Shape },

    /// A raw (unmarked) label was expected.
    #[error("negative label {label} at index {index}")]
    NegativeLabel { index: usize, label: i64 },

    /// Both a class list and an explicit index list were given.
    #[error("only one of `class_to_replace` and `indexes_to_replace` can be specified")]
    ClassAndIndexes,

    /// Confusion works on exactly one pair of classes.
    #[error("in the confusion mode, the number of classes should be 2, got {got}")]
    ConfuseNeedsTwoClasses { got: usize },

    /// Confusion mode needs to know how many samples to confuse.
    #[error("confusion mode requires `num_indexes_to_replace`")]
    MissingCount,

    /// `split` was neither `train` nor `forget`.
    #[error("invalid split {0:?}, expected \"train\" or \"forget\"")]
    InvalidSplit(String),

    /// Loaders need at least one sample per batch.
    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,

    /// No provider registered under that name.
    #[error("unknown dataset {name:?} (registered: {known})")]
    UnknownDataset { name: String, known: String },

    /// No data root given and no home directory to default to.
    #[error("no data root given and the home directory could not be determined")]
    NoDataRoot,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }
}

/// Convenience Result type used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Early return with a formatted error message.
/// Usage: `bail!("provider {} returned no classes", name)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}
