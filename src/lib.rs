//! Forensic recovery of files from damaged HFS+ (or HFSX) volumes.
//!
//! The core deliberately does not trust the volume header's B-tree root
//! pointers: it scavenges the raw image for Catalog and Extents Overflow
//! leaf nodes by shape, rebuilds the folder hierarchy from what it finds,
//! and extracts file contents byte-exact. See SPEC_FULL.md for the full
//! design and DESIGN.md for what each module is grounded on.

pub mod classifier;
pub mod decode;
pub mod defrag;
pub mod error;
pub mod extract;
pub mod header;
pub mod index;
pub mod paths;
pub mod records;
pub mod recover;
pub mod scanner;

pub use error::{HfsRecoverError, Result};
pub use header::{preflight, PreflightReport};
pub use index::{FileInfo, FolderInfo, Indexer};
pub use recover::{recover_image, RecoveryOptions, RecoveryStats};

/// Print a non-fatal diagnostic, matching the "Warning:" prefix of the
/// scavenger this core is modeled on.
pub(crate) fn warn(msg: impl std::fmt::Display) {
    eprintln!("Warning: {msg}");
}
