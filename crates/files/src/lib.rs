//! HCMS Attachment Storage
//!
//! This crate provides content-addressed storage for binary attachments in the
//! hospital clinical-management system, primarily lab result files uploaded by
//! lab technicians.
//!
//! ## Design Principles
//!
//! - Semantic meaning (which lab test a file belongs to) lives in the document
//!   store; this crate only stores and retrieves bytes
//! - Attachments are immutable once stored (new content creates a new blob)
//! - Identical content is stored once and shared by reference
//! - References held by documents are plain relative paths, valid even when the
//!   blob is later archived elsewhere
//!
//! ## Storage Layout
//!
//! All attachments live under one configured upload directory:
//!
//! ```text
//! <upload_dir>/
//! └── sha256/                 # content-addressed by SHA-256
//!     └── ab/                 # first two hex characters of the hash
//!         ├── ab3f9e…         # full hash as filename (the blob)
//!         └── ab3f9e….meta.yaml  # metadata sidecar
//! ```
//!
//! ## Security Model
//!
//! - The upload directory is validated and canonicalised at construction time
//! - Relative paths handed back in by callers are parsed strictly against the
//!   `sha256/<shard>/<hash>` shape; anything else is rejected, so a stored
//!   `fileUrl` can never be abused for directory traversal
//! - Media types are sniffed from content, never trusted from the client

mod attachments;
mod constants;
mod hash;

pub use attachments::{AttachmentStore, FileMetadata};
pub use constants::{HASH_FOLDER_NAME, METADATA_SUFFIX};
pub use hash::Sha256Hash;

/// Errors that can occur during attachment operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Upload root directory does not exist or is not a directory
    #[error("Invalid upload directory: {0}")]
    InvalidRootDirectory(String),

    /// Path validation failed (potential directory traversal or unsafe path)
    #[error("Invalid attachment path: {0}")]
    InvalidPath(String),

    /// Requested attachment is not present in storage
    #[error("Attachment not found: {0}")]
    NotFound(String),

    /// A hash string did not have the expected shape
    #[error("Invalid SHA-256 hash: {0}")]
    InvalidHash(String),

    /// The supplied original filename was unusable
    #[error("Invalid attachment filename: {0}")]
    InvalidName(#[from] hcms_types::TextError),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata sidecar could not be serialised or parsed
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_yaml::Error),
}
