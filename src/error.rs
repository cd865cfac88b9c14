use thiserror::Error;

/// Errors that stop the recovery run outright.
///
/// Everything the core treats as "keep going" (a node that doesn't classify,
/// a path that can't be resolved, a missing overflow entry) is reported as a
/// diagnostic on stderr instead of an `Err` here — see the error handling
/// notes in SPEC_FULL.md §7.
#[derive(Error, Debug)]
pub enum HfsRecoverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("incorrect signature for HFSPlus in both headers")]
    BothHeadersInvalid,

    #[error("image is too small to contain a volume header")]
    ImageTooSmall,
}

pub type Result<T> = std::result::Result<T, HfsRecoverError>;
