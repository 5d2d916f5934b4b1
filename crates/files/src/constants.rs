//! Constants for the attachment storage layout.

/// Directory under the upload root holding content-addressed blobs.
pub const HASH_FOLDER_NAME: &str = "sha256";

/// Suffix appended to a blob's filename for its metadata sidecar.
pub const METADATA_SUFFIX: &str = ".meta.yaml";
