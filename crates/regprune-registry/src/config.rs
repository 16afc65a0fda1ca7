//! Configuration types for the registry client.

use std::time::Duration;

/// Default request timeout, covering connect, send and body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry API root including the `/v2` segment
    /// (e.g., "<https://registry.example.com/v2>").
    pub url: String,

    /// Authentication configuration.
    pub auth: RegistryAuth,

    /// Request timeout.
    pub timeout: Duration,

    /// Connect timeout.
    pub connect_timeout: Duration,

    /// Whether to skip TLS certificate verification.
    pub insecure: bool,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given API root.
    ///
    /// # Examples
    ///
    /// ```
    /// use regprune_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://registry.example.com/v2/");
    /// assert_eq!(config.api_base(), "https://registry.example.com/v2");
    /// assert!(!config.insecure);
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: RegistryAuth::None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            insecure: false,
            user_agent: format!("regprune/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enables or disables insecure transport.
    ///
    /// # Warning
    ///
    /// Insecure mode accepts any certificate. Only use it against registries
    /// with self-signed certificates on trusted networks.
    #[must_use]
    pub const fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Returns the API root without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Returns the URL of a repository-relative API path.
    ///
    /// # Examples
    ///
    /// ```
    /// use regprune_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("http://localhost:5000/v2");
    /// assert_eq!(
    ///     config.endpoint("apps/web", "tags/list"),
    ///     "http://localhost:5000/v2/apps/web/tags/list"
    /// );
    /// ```
    #[must_use]
    pub fn endpoint(&self, repository: &str, path: &str) -> String {
        format!(
            "{}/{}/{path}",
            self.api_base(),
            repository.trim_matches('/')
        )
    }
}

/// Authentication methods for registry access.
#[derive(Debug, Clone, Default)]
pub enum RegistryAuth {
    /// No authentication.
    #[default]
    None,

    /// Basic authentication (username/password or username/token).
    Basic {
        /// Username.
        username: String,
        /// Password or token.
        password: String,
    },

    /// Bearer token authentication.
    Bearer {
        /// Token value.
        token: String,
    },
}

impl RegistryAuth {
    /// Creates basic authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use regprune_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::basic("user", "pass");
    /// ```
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }
}
