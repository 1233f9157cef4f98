//! Page loading from URLs, local files and raw HTML

use crate::document::extract_title;
use crate::{FetchConfig, OwlError, Page, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Loader for pages
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Create a new fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a new fetcher with custom configuration
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Load a page from a URL (anything with a scheme) or a file path
    pub async fn load(&self, source: &str) -> Result<Page> {
        if source.contains("://") {
            self.fetch(source).await
        } else {
            self.open_file(Path::new(source)).await
        }
    }

    /// Fetch a page by URL. `file://` URLs are read from disk.
    pub async fn fetch(&self, url: &str) -> Result<Page> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "http" | "https" => {
                info!("Fetching: {}", url);
                let html = self.fetch_with_http(&url).await?;
                Ok(page(url, html))
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| OwlError::Other(format!("Not a local path: {}", url)))?;
                self.open_file(&path).await
            }
            scheme => Err(OwlError::Other(format!("Unsupported scheme: {}", scheme))),
        }
    }

    /// Fetch using HTTP
    pub async fn fetch_with_http(&self, url: &Url) -> Result<String> {
        debug!("Fetching with HTTP: {}", url);
        let response = self.client.get(url.as_str()).send().await?;
        let html = response.error_for_status()?.text().await?;
        Ok(html)
    }

    /// Read a page from a local file
    pub async fn open_file(&self, path: &Path) -> Result<Page> {
        info!("Opening: {}", path.display());
        let html = tokio::fs::read_to_string(path).await?;
        let absolute = tokio::fs::canonicalize(path).await?;
        let url = Url::from_file_path(&absolute)
            .map_err(|_| OwlError::Other(format!("Not an absolute path: {}", absolute.display())))?;
        Ok(page(url, html))
    }

    /// Render HTML from a string (no fetching)
    pub fn render_html(&self, html: &str, base_url: Option<&str>) -> Result<Page> {
        let url = Url::parse(base_url.unwrap_or("about:blank"))?;
        Ok(page(url, html.to_string()))
    }
}

fn page(url: Url, html: String) -> Page {
    Page {
        url,
        title: extract_title(&html),
        html,
    }
}
