use thiserror::Error;

/// Failure of a local persistence layer.
///
/// `Unavailable` covers disabled storage, full disks and permission problems;
/// callers degrade (treat the slot as empty, show "re-upload") instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}
