use std::time::Duration;

use api_types::{
    catalog::Category,
    envelope::{ApiEnvelope, Health},
    summary::{CategorySummary, DashboardData, DateSummary},
    transaction::{ItemNew, TransactionCreated, TransactionNew, TransactionUpdate, TransactionView},
};
use engine::QueryParams;
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not authorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("rejected: {0}")]
    Validation(String),
    #[error("{0}")]
    Unsuccessful(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn message(self) -> Option<String> {
        self.error.or_else(|| {
            self.detail.map(|detail| match detail {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            })
        })
    }
}

/// Thin typed wrapper over the finance API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| AppError::Setting(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { base_url, http })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid endpoint {path}: {err}")))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&QueryParams>,
    ) -> ClientResult<Option<T>> {
        let mut request = self.http.get(self.endpoint(path)?);
        if let Some(params) = params {
            request = request.query(params.pairs());
        }
        tracing::debug!(path, query = %params.map(ToString::to_string).unwrap_or_default(), "GET");
        let res = request.send().await?;
        read_envelope(res).await
    }

    pub async fn health(&self) -> ClientResult<Health> {
        let res = self.http.get(self.endpoint("api/health")?).send().await?;
        if !res.status().is_success() {
            return Err(error_for(res).await);
        }
        Ok(res.json::<Health>().await?)
    }

    pub async fn dashboard(&self, params: &QueryParams) -> ClientResult<DashboardData> {
        Ok(self
            .get("api/dashboard", Some(params))
            .await?
            .unwrap_or_default())
    }

    pub async fn category_summary(&self, params: &QueryParams) -> ClientResult<Vec<CategorySummary>> {
        Ok(self
            .get("api/summary/category", Some(params))
            .await?
            .unwrap_or_default())
    }

    pub async fn date_summary(&self, params: &QueryParams) -> ClientResult<Vec<DateSummary>> {
        Ok(self
            .get("api/summary/date", Some(params))
            .await?
            .unwrap_or_default())
    }

    pub async fn transactions(&self, params: &QueryParams) -> ClientResult<Vec<TransactionView>> {
        Ok(self
            .get("api/transactions", Some(params))
            .await?
            .unwrap_or_default())
    }

    pub async fn transaction(&self, id: i64) -> ClientResult<TransactionView> {
        self.get(&format!("api/transactions/{id}"), None)
            .await?
            .ok_or(ClientError::NotFound)
    }

    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        Ok(self.get("api/categories", None).await?.unwrap_or_default())
    }

    pub async fn platforms(&self) -> ClientResult<Vec<String>> {
        Ok(self.get("api/platforms", None).await?.unwrap_or_default())
    }

    pub async fn create_transaction(&self, payload: &TransactionNew) -> ClientResult<i64> {
        let res = self
            .http
            .post(self.endpoint("api/transactions")?)
            .json(payload)
            .send()
            .await?;
        let created: Option<TransactionCreated> = read_envelope(res).await?;
        created
            .map(|created| created.id)
            .ok_or_else(|| ClientError::Unsuccessful("no id in response".to_string()))
    }

    pub async fn update_transaction(&self, id: i64, payload: &TransactionUpdate) -> ClientResult<()> {
        let res = self
            .http
            .put(self.endpoint(&format!("api/transactions/{id}"))?)
            .json(payload)
            .send()
            .await?;
        expect_ok(res).await
    }

    pub async fn delete_transaction(&self, id: i64) -> ClientResult<()> {
        let res = self
            .http
            .delete(self.endpoint(&format!("api/transactions/{id}"))?)
            .send()
            .await?;
        expect_ok(res).await
    }

    pub async fn add_item(&self, transaction_id: i64, item: &ItemNew) -> ClientResult<()> {
        let res = self
            .http
            .post(self.endpoint(&format!("api/transactions/{transaction_id}/items"))?)
            .json(item)
            .send()
            .await?;
        expect_ok(res).await
    }

    pub async fn delete_item(&self, transaction_id: i64, item_id: i64) -> ClientResult<()> {
        let res = self
            .http
            .delete(self.endpoint(&format!(
                "api/transactions/{transaction_id}/items/{item_id}"
            ))?)
            .send()
            .await?;
        expect_ok(res).await
    }
}

async fn read_envelope<T: DeserializeOwned>(res: Response) -> ClientResult<Option<T>> {
    if !res.status().is_success() {
        return Err(error_for(res).await);
    }
    let envelope = res.json::<ApiEnvelope<T>>().await?;
    if !envelope.success {
        return Err(ClientError::Unsuccessful(
            envelope
                .error
                .unwrap_or_else(|| "request was not successful".to_string()),
        ));
    }
    Ok(envelope.data)
}

/// Writes succeed on any 2xx unless the body says `"success": false`.
async fn expect_ok(res: Response) -> ClientResult<()> {
    if !res.status().is_success() {
        return Err(error_for(res).await);
    }
    let body = res.text().await?;
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body)
        && value.get("success") == Some(&serde_json::Value::Bool(false))
    {
        let message = value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("request was not successful");
        return Err(ClientError::Unsuccessful(message.to_string()));
    }
    Ok(())
}

async fn error_for(res: Response) -> ClientError {
    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(ErrorResponse::message)
        .unwrap_or_else(|| "unknown error".to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(body),
        _ => ClientError::Server(format!("{status}: {body}")),
    }
}
