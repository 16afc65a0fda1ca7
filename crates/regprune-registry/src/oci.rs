//! Docker Registry v2 wire types.

use serde::{Deserialize, Serialize};

/// Media types used when talking to the registry.
#[derive(Debug, Clone, Copy)]
pub struct MediaType;

impl MediaType {
    /// Docker image manifest, schema 2.
    pub const DOCKER_MANIFEST_V2: &'static str =
        "application/vnd.docker.distribution.manifest.v2+json";

    /// Docker container image config blob.
    pub const DOCKER_CONTAINER_CONFIG: &'static str =
        "application/vnd.docker.container.image.v1+json";
}

/// Response header carrying the canonical manifest digest.
pub const CONTENT_DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Body of `GET /v2/<name>/tags/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList {
    /// Repository name.
    #[serde(default)]
    pub name: String,

    /// Tags in the repository. Registries send `null` once every tag of a
    /// repository has been deleted.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TagList {
    /// Consumes the list, treating `null` as empty.
    #[must_use]
    pub fn into_tags(self) -> Vec<String> {
        self.tags.unwrap_or_default()
    }
}

/// The parts of a schema 2 manifest needed to find a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestV2 {
    /// Schema version (always 2).
    #[serde(default)]
    pub schema_version: u32,

    /// Manifest media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Image config descriptor.
    pub config: ConfigDescriptor,
}

/// Descriptor of the image config blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDescriptor {
    /// Media type of the config blob.
    #[serde(default)]
    pub media_type: String,

    /// Size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Content digest (e.g., "sha256:...").
    #[serde(default)]
    pub digest: String,
}
