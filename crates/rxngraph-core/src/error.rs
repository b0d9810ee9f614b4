use crate::shape::Shape;

/// All errors that can occur within rxngraph.
///
/// Construction failures (missing artifacts, malformed slots, schema
/// violations) and access failures (index out of range) share one enum so
/// that loaders and datasets can propagate with `?` end to end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing artifact for a dataset is absent or unreadable.
    #[error("dataset artifact not found: {artifact} ({reason})")]
    DatasetNotFound { artifact: String, reason: String },

    /// A slot's packed arrays disagree with each other or with another slot.
    #[error("malformed slot {slot}: {reason}")]
    MalformedSlot { slot: String, reason: String },

    /// Example index outside `[0, len)`.
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// Slot index outside `[0, slot_count)`.
    #[error("slot {slot} out of range: store has {slot_count} slots")]
    SlotOutOfRange { slot: usize, slot_count: usize },

    /// The artifact is missing a key or holds an array of the wrong kind.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// Dataset identifier outside the known set.
    #[error("unknown dataset id {0}")]
    UnknownDatasetId(u32),

    /// DType mismatch between an array and the type it is read as.
    #[error("dtype mismatch: expected {expected:?}, got {got:?}")]
    DTypeMismatch {
        expected: crate::DType,
        got: crate::DType,
    },

    /// Element count mismatch when creating from a vec.
    #[error("element count mismatch: shape {shape} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Shorthand for [`Error::MalformedSlot`].
    pub fn malformed(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedSlot {
            slot: slot.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::IndexOutOfRange`] from an unsigned index.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Error::IndexOutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            len,
        }
    }
}

/// Convenience Result type used throughout rxngraph.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_index_out_of_range() {
        let e = Error::IndexOutOfRange { index: -1, len: 3 };
        assert_eq!(
            e.to_string(),
            "index -1 out of range for dataset of length 3"
        );
    }

    #[test]
    fn test_index_out_of_range_saturates() {
        match Error::index_out_of_range(usize::MAX, 4) {
            Error::IndexOutOfRange { index, len } => {
                assert_eq!(index, i64::MAX);
                assert_eq!(len, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_helper() {
        let e = Error::malformed("reactant[0]", "5 examples, expected 4");
        assert_eq!(e.to_string(), "malformed slot reactant[0]: 5 examples, expected 4");
    }

    fn bails() -> Result<()> {
        crate::bail!("bad value {}", 7);
    }

    #[test]
    fn test_bail_macro() {
        assert_eq!(bails().unwrap_err().to_string(), "bad value 7");
    }
}
