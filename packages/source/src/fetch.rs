//! Options page fetcher.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use option_chain_models::RawRow;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::document::{DocumentSelectors, decode_rows};
use crate::{DocumentSource, SourceError};

/// Default page location; `{symbol}` is replaced with the lower-cased
/// symbol.
pub const DEFAULT_URL_TEMPLATE: &str = "http://www.marketwatch.com/investing/index/{symbol}/options";

/// Request configuration for [`WebPageSource`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// URL template containing a `{symbol}` placeholder.
    pub url_template: String,
    /// Additional HTTP headers to include in requests.
    pub headers: BTreeMap<String, String>,
    /// Whole-request timeout.
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_owned(),
            headers: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl FetchConfig {
    /// Overrides the URL template.
    #[must_use]
    pub fn with_url_template(mut self, template: &str) -> Self {
        template.clone_into(&mut self.url_template);
        self
    }

    /// Adds an HTTP header to include in requests.
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured headers as a request header map.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] naming the first header whose name or
    /// value is not valid HTTP.
    pub fn header_map(&self) -> Result<HeaderMap, SourceError> {
        self.headers
            .iter()
            .map(|(key, value)| {
                let name = HeaderName::from_bytes(key.as_bytes())
                    .map_err(|e| SourceError::Parse(format!("invalid header name '{key}': {e}")))?;
                let value = HeaderValue::from_str(value).map_err(|e| {
                    SourceError::Parse(format!("invalid header value '{value}': {e}"))
                })?;
                Ok::<_, SourceError>((name, value))
            })
            .collect()
    }

    /// The page URL for a symbol.
    #[must_use]
    pub fn url_for(&self, symbol: &str) -> String {
        self.url_template
            .replace("{symbol}", &symbol.to_lowercase())
    }
}

/// Fetches the options page for a symbol over HTTP.
#[derive(Debug, Clone, Default)]
pub struct WebPageSource {
    config: FetchConfig,
    selectors: DocumentSelectors,
}

impl WebPageSource {
    /// Creates a source with the given request configuration and default
    /// selectors.
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            selectors: DocumentSelectors::default(),
        }
    }

    /// Overrides the selectors used to decode the page.
    #[must_use]
    pub fn with_selectors(mut self, selectors: DocumentSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Returns a reference to the request configuration.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Builds a [`reqwest::Client`] from the request configuration.
    fn build_client(&self) -> Result<reqwest::Client, SourceError> {
        let builder = reqwest::Client::builder().default_headers(self.config.header_map()?);
        match self.config.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
        .build()
        .map_err(SourceError::Http)
    }

    /// Downloads the raw page body for a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the request fails or returns a
    /// non-success status.
    pub async fn fetch_html(&self, symbol: &str) -> Result<String, SourceError> {
        let client = self.build_client()?;
        let url = self.config.url_for(symbol);

        log::info!("Loading webpage: {url}");
        let response = client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        log::debug!("Downloaded {} bytes from {url}", body.len());

        Ok(body)
    }
}

impl DocumentSource for WebPageSource {
    async fn load(&self, symbol: &str) -> Result<Vec<RawRow>, SourceError> {
        let body = self.fetch_html(symbol).await?;
        decode_rows(&body, &self.selectors)
    }

    fn kind(&self) -> &'static str {
        "web_page"
    }
}

/// Reads a previously saved options page from disk. The symbol is only
/// used for logging.
#[derive(Debug, Clone)]
pub struct SavedPageSource {
    path: PathBuf,
    selectors: DocumentSelectors,
}

impl SavedPageSource {
    /// Creates a source reading `path` with default selectors.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            selectors: DocumentSelectors::default(),
        }
    }

    /// Overrides the selectors used to decode the page.
    #[must_use]
    pub fn with_selectors(mut self, selectors: DocumentSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for SavedPageSource {
    async fn load(&self, symbol: &str) -> Result<Vec<RawRow>, SourceError> {
        log::info!("Reading saved {symbol} page from {}", self.path.display());
        let body = tokio::fs::read_to_string(&self.path).await?;
        decode_rows(&body, &self.selectors)
    }

    fn kind(&self) -> &'static str {
        "saved_page"
    }
}
