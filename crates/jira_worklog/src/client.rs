use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::JiraConfig;
use crate::error::{Result, WorklogError};
use crate::fetcher::WorklogFetcher;
use crate::models::QuickEditIssue;
use crate::pacer::RequestPacer;
use crate::response::RawResponse;

const PJAX_HEADER: &str = "x-pjax";

/// HTTP transport against a Jira instance; every request goes through a shared pacer.
#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    pacer: RequestPacer,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let pacer = RequestPacer::new(config.cooldown);
        Self::new_with_pacer(config, pacer)
    }

    pub fn new_with_pacer(config: JiraConfig, pacer: RequestPacer) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            pacer,
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// GETs a URL (absolute, or relative to the base URL) and keeps JSON and text bodies apart.
    pub async fn fetch_raw(&self, href: &str) -> Result<RawResponse> {
        let url = self.absolute_url(href)?;
        self.pacer.wait_turn().await;
        debug!(%url, "Fetching worklog resource");
        let response = self.http.get(url).send().await?;
        Self::read_body(response).await
    }

    /// Reads the quick-edit form, which carries the due date and original estimate.
    pub async fn get_quick_edit_issue(&self, issue_id: &str) -> Result<QuickEditIssue> {
        let url = self.config.quick_edit_url(issue_id);
        match self.fetch_raw(&url).await? {
            RawResponse::Json(value) => Ok(serde_json::from_value(value)?),
            RawResponse::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }

    fn absolute_url(&self, href: &str) -> Result<Url> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Url::parse(href).map_err(|err| WorklogError::Other(err.to_string()));
        }

        let base = format!("{}/", self.config.base());
        Url::parse(&base)
            .and_then(|url| url.join(href.trim_start_matches('/')))
            .map_err(|err| WorklogError::Other(err.to_string()))
    }

    async fn read_body(response: Response) -> Result<RawResponse> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(WorklogError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorklogError::http(status, body));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("json"))
            .unwrap_or(false);
        if is_json {
            let value = response.json::<Value>().await?;
            Ok(RawResponse::Json(value))
        } else {
            Ok(RawResponse::Text(response.text().await?))
        }
    }
}

#[async_trait]
impl WorklogFetcher for JiraClient {
    async fn fetch(&self, url: &str) -> Result<RawResponse> {
        self.fetch_raw(url).await
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/html;q=0.9, */*;q=0.8"),
    );
    if config.pjax {
        headers.insert(HeaderName::from_static(PJAX_HEADER), HeaderValue::from_static("true"));
    }

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| WorklogError::Other(err.to_string()))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| WorklogError::Other(err.to_string()))
}
