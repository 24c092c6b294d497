use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;
use urlencoding::encode;
use crate::config::Config;
use crate::error::CleanupError;
use crate::json::{classify_recent_uploads, RecentUploads};

// BrowserStack App Live REST API: https://www.browserstack.com/app-live/rest-api
pub struct BrowserStackApi {
    client: Client,
    base_url: Url,
    user: String,
    key: String,
}

impl BrowserStackApi {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        BrowserStackApi {
            client,
            base_url: config.api_url.clone(),
            user: config.user.clone(),
            key: config.key.clone(),
        }
    }

    fn endpoint(&self, prefix: &str, id: &str) -> Result<Url> {
        let relative = format!("{}{}", prefix, encode(id));
        self.base_url
            .join(&relative)
            .with_context(|| format!("Failed to build URL for '{}' under {}", relative, self.base_url))
    }

    pub(crate) fn recent_apps_url(&self, custom_id: &str) -> Result<Url> {
        self.endpoint("recent_apps/", custom_id)
    }

    pub(crate) fn delete_app_url(&self, app_id: &str) -> Result<Url> {
        self.endpoint("app/delete/", app_id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.user, Some(&self.key))
    }

    pub async fn recent_uploads(&self, custom_id: &str) -> Result<RecentUploads> {
        let url = self.recent_apps_url(custom_id)?;
        let response = self.authorized(self.client.get(url.clone()))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;
        let response = ensure_success("GET", &url, response).await?;

        let response_text = response.text().await
            .with_context(|| format!("Failed to read response from {}", url))?;
        let payload: Value = serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse recent uploads as JSON. Raw response:\n{}", response_text))?;
        Ok(classify_recent_uploads(payload))
    }

    pub async fn delete_app(&self, app_id: &str) -> Result<()> {
        let url = self.delete_app_url(app_id)?;
        let response = self.authorized(self.client.delete(url.clone()))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;
        ensure_success("DELETE", &url, response).await?;
        Ok(())
    }
}

async fn ensure_success(method: &'static str, url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|_| "Could not read error body".to_string());
    Err(CleanupError::Http {
        method,
        url: url.to_string(),
        status,
        body,
    }.into())
}
