use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::traits::PageSource;

/// Page source over plain HTTP.
///
/// Serves the server-rendered HTML as-is, so lazy loading never adds content.
pub struct HttpPageSource {
    client: Client,
    current: String,
}

impl HttpPageSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            current: String::new(),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(CatalogError::EndOfCatalog {
                    url: url.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(CatalogError::FetchStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        self.current = response.text().await?;
        Ok(())
    }

    async fn current_markup(&mut self) -> Result<String> {
        Ok(self.current.clone())
    }

    async fn trigger_lazy_load(&mut self) -> Result<()> {
        Ok(())
    }
}
