use crate::domain::ports::PageFetcher;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const SNPEDIA_ENDPOINT: &str = "https://bots.snpedia.com/api.php";
pub const USER_AGENT: &str = "snpedia-etl/0.1";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: SNPEDIA_ENDPOINT.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            retry_attempts: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Client for the MediaWiki `api.php` endpoint SNPedia exposes.
pub struct MediaWikiClient {
    client: Client,
    settings: FetchSettings,
}

fn fetch_error(accession: &str, message: impl Into<String>) -> EtlError {
    EtlError::FetchError {
        accession: accession.to_string(),
        message: message.into(),
    }
}

fn xml_error(e: impl std::fmt::Display) -> EtlError {
    EtlError::XmlError {
        message: e.to_string(),
    }
}

fn is_retryable(error: &EtlError) -> bool {
    match error {
        EtlError::ApiError(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|status| status.is_server_error())
        }
        _ => false,
    }
}

impl MediaWikiClient {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    async fn send(&self, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(params)
            .send()
            .await?;
        tracing::debug!("API response status: {}", response.status());

        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Makes one API call with `params` plus `format=json`, retrying
    /// transport failures and server errors.
    pub async fn call(&self, params: &[(&str, &str)]) -> Result<Value> {
        let mut query = params.to_vec();
        query.push(("format", "json"));

        let mut attempt = 0;
        loop {
            match self.send(&query).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.settings.retry_attempts && is_retryable(&e) => {
                    attempt += 1;
                    tracing::warn!(
                        "API call failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.settings.retry_attempts,
                        self.settings.retry_delay
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn query(&self, params: &[(&str, &str)]) -> Result<Value> {
        let mut query = vec![("action", "query")];
        query.extend_from_slice(params);
        self.call(&query).await
    }

    /// Page ID for an accession, or `None` when the wiki has no such page.
    pub async fn page_id(&self, accession: &str) -> Result<Option<String>> {
        let response = self.query(&[("titles", accession)]).await?;
        let pages = response
            .pointer("/query/pages")
            .and_then(Value::as_object)
            .ok_or_else(|| fetch_error(accession, "response has no query.pages object"))?;

        if pages.len() != 1 {
            return Err(fetch_error(
                accession,
                format!("expected a single page, found {}", pages.len()),
            ));
        }

        // missing titles are keyed with negative ids
        Ok(pages
            .keys()
            .next()
            .filter(|id| !id.starts_with('-'))
            .cloned())
    }

    /// Current markup of the page titled `accession`, read from the XML
    /// export.
    pub async fn page_text(&self, accession: &str) -> Result<String> {
        tracing::debug!("Requesting export for {} from {}", accession, self.endpoint());
        let response = self
            .query(&[("titles", accession), ("export", "")])
            .await?;
        let xml = response
            .pointer("/query/export/*")
            .and_then(Value::as_str)
            .ok_or_else(|| fetch_error(accession, "response has no query.export text"))?;

        let mut texts = export_texts(xml)?;
        if texts.len() != 1 {
            return Err(fetch_error(
                accession,
                format!("expected one text element, found {}", texts.len()),
            ));
        }
        Ok(texts.remove(0))
    }
}

#[async_trait]
impl PageFetcher for MediaWikiClient {
    async fn fetch(&self, accession: &str) -> Result<String> {
        self.page_text(accession).await
    }
}

/// Contents of every `<text>` element of a MediaWiki XML export, whatever
/// its namespace.
pub fn export_texts(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"text" => {
                current = Some(String::new());
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"text" => {
                texts.push(String::new());
            }
            Ok(Event::Text(e)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"text" => {
                if let Some(buf) = current.take() {
                    texts.push(buf);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(texts)
}
