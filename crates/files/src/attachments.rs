//! Upload-directory attachment store implementation.
//!
//! This module provides the core implementation of attachment storage through
//! the [`AttachmentStore`] type. Lab result files are written here once and
//! then referenced from LabTest documents by relative path.
//!
//! # Content Addressing
//!
//! Attachments are stored under their SHA-256 digest:
//!
//! - **Deduplication**: identical uploads share one blob
//! - **Integrity**: content can be verified against its name
//! - **Immutability**: a stored blob is never rewritten
//! - **Deterministic paths**: the same content always lands at the same path
//!
//! # Metadata Sidecars
//!
//! Each blob gets a YAML sidecar (`<hash>.meta.yaml`) recording the original
//! filename, sniffed media type, size and upload time. The sidecar carries no
//! patient or visit identifiers; ownership lives in the document store.

use crate::constants::{HASH_FOLDER_NAME, METADATA_SUFFIX};
use crate::{FilesError, Sha256Hash};
use chrono::{DateTime, Utc};
use hcms_types::NonEmptyText;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata for a stored attachment
///
/// Serialised to YAML and stored alongside the blob. Provides an auditable
/// record of the upload without referencing any clinical documents.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    /// Hashing algorithm used (always "sha256" for the current implementation)
    pub hash_algorithm: NonEmptyText,

    /// Hexadecimal digest of the attachment content
    pub hash: Sha256Hash,

    /// Path relative to the upload root where the blob is stored
    pub relative_path: NonEmptyText,

    /// Size of the attachment in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// Best-effort detection from content; not authoritative.
    pub media_type: Option<NonEmptyText>,

    /// Filename the client supplied at upload time
    pub original_filename: NonEmptyText,

    /// UTC timestamp when the attachment was stored
    pub stored_at: DateTime<Utc>,
}

/// Store for binary attachments under one upload directory.
///
/// # Design
///
/// - One flat store per deployment, scoped by the configured upload directory
/// - Immutable: blobs are never modified after creation
/// - Content-addressed: blobs are identified by their SHA-256 digest
/// - Defensive: caller-supplied relative paths are validated strictly
#[derive(Debug)]
pub struct AttachmentStore {
    /// Canonicalised upload root directory
    root: PathBuf,
}

impl AttachmentStore {
    /// Creates a new `AttachmentStore` over the given upload directory.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if the directory does not
    /// exist, is not a directory, or cannot be canonicalised.
    pub fn new(root: &Path) -> Result<Self, FilesError> {
        if !root.exists() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Directory does not exist: {}",
                root.display()
            )));
        }

        if !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        let root = root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { root })
    }

    /// Stores attachment bytes and returns the resulting metadata.
    ///
    /// If a blob with the same digest already exists the existing metadata is
    /// returned and nothing is rewritten, so repeated uploads of the same
    /// content are cheap and safe.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The attachment content
    /// * `original_filename` - The client-supplied filename (must be non-blank)
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the filename is blank, directory creation or
    /// the blob/sidecar write fails, or an existing sidecar cannot be parsed.
    pub fn store(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<FileMetadata, FilesError> {
        let original_filename = NonEmptyText::bounded(original_filename, 255)?;
        let hash = Sha256Hash::digest(bytes);
        let blob_path = self.blob_path(&hash);

        if blob_path.exists() {
            return self.metadata(&hash);
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create storage directory {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        fs::write(&blob_path, bytes).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write attachment to {}: {}", blob_path.display(), e),
            ))
        })?;

        let media_type = infer::get(bytes)
            .and_then(|kind| NonEmptyText::new(kind.mime_type()).ok());

        let metadata = FileMetadata {
            hash_algorithm: NonEmptyText::new("sha256")?,
            relative_path: NonEmptyText::new(Self::relative_path(&hash))?,
            hash,
            size_bytes: bytes.len() as u64,
            media_type,
            original_filename,
            stored_at: Utc::now(),
        };

        let sidecar = serde_yaml::to_string(&metadata)?;
        fs::write(self.sidecar_path(&metadata.hash), sidecar)?;

        Ok(metadata)
    }

    /// Reads an attachment back by its stored relative path.
    ///
    /// The relative path is parsed strictly against the
    /// `sha256/<shard>/<hash>` shape before any filesystem access, which makes
    /// traversal through a tampered `fileUrl` impossible.
    ///
    /// # Returns
    ///
    /// The blob bytes together with the stored metadata.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` for malformed paths and
    /// `FilesError::NotFound` when no blob exists at the derived location.
    pub fn read(&self, relative: &str) -> Result<(Vec<u8>, FileMetadata), FilesError> {
        let hash = Self::parse_relative(relative)?;
        let blob_path = self.blob_path(&hash);

        if !blob_path.is_file() {
            return Err(FilesError::NotFound(hash.to_string()));
        }

        let bytes = fs::read(&blob_path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to read attachment from {}: {}",
                    blob_path.display(),
                    e
                ),
            ))
        })?;
        let metadata = self.metadata(&hash)?;

        Ok((bytes, metadata))
    }

    /// Loads the metadata sidecar for a stored attachment.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::NotFound` when the sidecar is absent and
    /// `FilesError::Metadata` when it cannot be parsed.
    pub fn metadata(&self, hash: &Sha256Hash) -> Result<FileMetadata, FilesError> {
        let sidecar_path = self.sidecar_path(hash);
        if !sidecar_path.is_file() {
            return Err(FilesError::NotFound(hash.to_string()));
        }
        let raw = fs::read_to_string(&sidecar_path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Returns the storage path of a blob relative to the upload root.
    ///
    /// Example: a digest starting `ab3f9e…` produces `sha256/ab/ab3f9e…`.
    pub fn relative_path(hash: &Sha256Hash) -> String {
        format!("{}/{}/{}", HASH_FOLDER_NAME, hash.shard(), hash.as_str())
    }

    fn blob_path(&self, hash: &Sha256Hash) -> PathBuf {
        self.root
            .join(HASH_FOLDER_NAME)
            .join(hash.shard())
            .join(hash.as_str())
    }

    fn sidecar_path(&self, hash: &Sha256Hash) -> PathBuf {
        self.root
            .join(HASH_FOLDER_NAME)
            .join(hash.shard())
            .join(format!("{}{}", hash.as_str(), METADATA_SUFFIX))
    }

    /// Parses a stored relative path back into its digest.
    ///
    /// Accepts exactly `sha256/<shard>/<hash>` where `<shard>` matches the
    /// first two characters of a valid digest. Everything else is rejected.
    fn parse_relative(relative: &str) -> Result<Sha256Hash, FilesError> {
        let mut parts = relative.split('/');
        let (folder, shard, name) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(folder), Some(shard), Some(name), None) => (folder, shard, name),
            _ => {
                return Err(FilesError::InvalidPath(format!(
                    "expected {}/<shard>/<hash>, got {:?}",
                    HASH_FOLDER_NAME, relative
                )))
            }
        };

        if folder != HASH_FOLDER_NAME {
            return Err(FilesError::InvalidPath(format!(
                "unknown storage folder {:?}",
                folder
            )));
        }

        let hash = Sha256Hash::parse(name)
            .map_err(|_| FilesError::InvalidPath(format!("malformed digest {:?}", name)))?;

        if shard != hash.shard() {
            return Err(FilesError::InvalidPath(format!(
                "shard {:?} does not match digest prefix {:?}",
                shard,
                hash.shard()
            )));
        }

        Ok(hash)
    }
}
