//! HTTP backend for the Bookkeeper REST API

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{Category, FiscalMonth, Transaction, TransactionList, TransactionPatch};

use super::{query_date, FinanceApi};

const API_PREFIX: &str = "/api/v1";

/// reqwest-based client for a running Bookkeeper backend
#[derive(Clone)]
pub struct HttpBackend {
    http_client: Client,
    base_url: String,
}

/// Error body returned by the backend (`{"error": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpBackend {
    /// Create a backend with default client settings
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a backend honoring the configured timeout
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);
        let response = self.http_client.get(&url).query(query).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    fn interval(from: NaiveDate, to: NaiveDate) -> Vec<(&'static str, String)> {
        vec![("from", query_date(from)), ("to", query_date(to))]
    }
}

/// Turn non-2xx responses into `Error::Api`, preferring the backend's message
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    warn!("Backend returned {}: {}", status, message);
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

fn error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return Some(parsed.error);
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait]
impl FinanceApi for HttpBackend {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories: Option<Vec<Category>> = self.get_json("/categories", &[]).await?;
        Ok(categories.unwrap_or_default())
    }

    async fn list_transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        self.get_json("/transactions", &Self::interval(from, to))
            .await
    }

    async fn list_transactions_for_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        category_id: i64,
    ) -> Result<TransactionList> {
        let mut query = Self::interval(from, to);
        query.push(("category", category_id.to_string()));
        self.get_json("/transactions", &query).await
    }

    async fn list_unclassified(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        self.get_json("/transactions/unclassified", &Self::interval(from, to))
            .await
    }

    async fn list_hidden(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        self.get_json("/transactions/hidden", &Self::interval(from, to))
            .await
    }

    async fn get_transaction(&self, id: i64) -> Result<Transaction> {
        self.get_json(&format!("/transaction/{}", id), &[]).await
    }

    async fn patch_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        if patch.is_empty() {
            return Err(Error::InvalidData(
                "Patch must set a category or the hidden flag".into(),
            ));
        }

        let url = self.url(&format!("/transaction/{}", id));
        debug!("PATCH {} {:?}", url, patch);
        let response = self.http_client.patch(&url).json(patch).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn upload_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<()> {
        let url = self.url("/transactions/csv");
        debug!("POST {} ({} bytes)", url, contents.len());

        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self.http_client.post(&url).multipart(form).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn fiscal_month(
        &self,
        month: u32,
        year: i32,
        income_category_id: i64,
    ) -> Result<FiscalMonth> {
        let query = [
            ("month", month.to_string()),
            ("year", year.to_string()),
            ("income_category_id", income_category_id.to_string()),
        ];
        self.get_json("/interval/fiscal-month", &query).await
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.url("/categories"))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Health check failed: {}", e);
                false
            }
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
