//! Registry API client.
//!
//! This module provides the [`Registry`] capability trait and its HTTP
//! implementation over the Docker Registry v2 API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Response;

use crate::config::{RegistryAuth, RegistryConfig};
use crate::error::RegistryError;
use crate::oci::{ManifestV2, MediaType, TagList, CONTENT_DIGEST_HEADER};

/// Operations the retention engine needs from a registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Lists all tags of a repository.
    ///
    /// A repository the registry does not know yields an empty list.
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError>;

    /// Resolves a tag to the digest used to delete its manifest.
    async fn get_digest(&self, repository: &str, tag: &str) -> Result<String, RegistryError>;

    /// Deletes a manifest by digest.
    ///
    /// Succeeds only on a 2xx response.
    async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<(), RegistryError>;
}

#[async_trait]
impl<T: Registry + ?Sized> Registry for Arc<T> {
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        (**self).list_tags(repository).await
    }

    async fn get_digest(&self, repository: &str, tag: &str) -> Result<String, RegistryError> {
        (**self).get_digest(repository, tag).await
    }

    async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<(), RegistryError> {
        (**self).delete_manifest(repository, digest).await
    }
}

/// HTTP client for a Docker Registry v2 compatible API.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a new registry client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL or the
    /// HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use regprune_registry::{RegistryClient, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("https://registry.example.com/v2");
    /// let client = RegistryClient::new(config)?;
    /// # Ok::<(), regprune_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        Self::validate_url(&config.url)?;
        let http = Self::build_http_client(&config)?;

        Ok(Self { config, http })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn validate_url(raw: &str) -> Result<(), RegistryError> {
        let invalid = || RegistryError::InvalidUrl {
            url: raw.to_string(),
        };

        let parsed = url::Url::parse(raw).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
            return Err(invalid());
        }

        Ok(())
    }

    /// Builds the HTTP client with proper configuration.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(Self::auth_headers(&config.auth)?);

        if config.insecure {
            tracing::warn!(url = %config.url, "using insecure HTTP client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(|e| RegistryError::ConnectionFailed {
            url: config.url.clone(),
            source: e,
        })
    }

    /// Creates authentication headers based on configuration.
    fn auth_headers(auth: &RegistryAuth) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();

        let mut value = match auth {
            RegistryAuth::None => return Ok(headers),
            RegistryAuth::Basic { username, password } => {
                let credentials = base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    format!("{username}:{password}"),
                );
                HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
                    RegistryError::AuthenticationFailed {
                        message: "Invalid credentials".to_string(),
                    }
                })?
            }
            RegistryAuth::Bearer { token } => HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| RegistryError::AuthenticationFailed {
                    message: "Invalid token".to_string(),
                })?,
        };

        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Turns a non-success response into an error, consuming its body.
    async fn rejection(response: Response) -> RegistryError {
        RegistryError::HttpError {
            status: response.status().as_u16(),
            message: response.text().await.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Registry for RegistryClient {
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let url = self.config.endpoint(repository, "tags/list");
        tracing::debug!(repository, %url, "listing tags");

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status().as_u16() == 404 {
                tracing::info!(repository, "repository not found, no tags to clean");
                return Ok(Vec::new());
            }
            return Err(Self::rejection(response).await);
        }

        let tag_list: TagList = response.json().await?;
        Ok(tag_list.into_tags())
    }

    async fn get_digest(&self, repository: &str, tag: &str) -> Result<String, RegistryError> {
        let url = self.config.endpoint(repository, &format!("manifests/{tag}"));
        tracing::debug!(repository, tag, %url, "resolving digest");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, MediaType::DOCKER_MANIFEST_V2)
            .send()
            .await?;

        if !response.status().is_success() {
            if response.status().as_u16() == 404 {
                return Err(RegistryError::NotFound {
                    repository: repository.to_string(),
                    reference: tag.to_string(),
                });
            }
            return Err(Self::rejection(response).await);
        }

        let header_digest = response
            .headers()
            .get(CONTENT_DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string);

        if let Some(digest) = header_digest {
            return Ok(digest);
        }

        let body = response.bytes().await?;
        let manifest: ManifestV2 = serde_json::from_slice(&body)?;
        if manifest.config.digest.is_empty() {
            return Err(RegistryError::InvalidResponse {
                message: format!("manifest for {repository}:{tag} carries no digest"),
            });
        }

        Ok(manifest.config.digest)
    }

    async fn delete_manifest(&self, repository: &str, digest: &str) -> Result<(), RegistryError> {
        let url = self.config.endpoint(repository, &format!("manifests/{digest}"));
        tracing::debug!(repository, digest, %url, "deleting manifest");

        let response = self.http.delete(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(())
    }
}
