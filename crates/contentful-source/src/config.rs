//! Contentful source configuration.

use std::time::Duration;

/// Default Content Delivery API host.
pub const DEFAULT_BASE_URL: &str = "https://cdn.contentful.com";

/// Default locale used to read localized fields.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Default transport timeout per request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for talking to one Contentful space.
#[derive(Debug, Clone)]
pub struct ContentfulConfig {
    pub base_url: String,
    pub space_id: String,
    pub access_token: String,
    /// Environment id. `None` uses the space's master environment.
    pub environment: Option<String>,
    /// Content type id of product entries.
    pub content_type: String,
    pub locale: String,
    pub timeout: Duration,
}

impl ContentfulConfig {
    pub fn new(
        space_id: impl Into<String>,
        access_token: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            space_id: space_id.into(),
            access_token: access_token.into(),
            environment: None,
            content_type: content_type.into(),
            locale: DEFAULT_LOCALE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sync endpoint for this space and environment, without query.
    pub fn sync_endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.environment {
            Some(env) => format!(
                "{base}/spaces/{}/environments/{env}/sync",
                self.space_id
            ),
            None => format!("{base}/spaces/{}/sync", self.space_id),
        }
    }
}
