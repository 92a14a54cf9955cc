use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::TransportError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct UnansweredRequest<'a> {
    question: &'a str,
}

/// Body of a successful `/chat` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub text: Option<String>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Error payloads the backend sends on failure.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub insurance_contract: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub icd10_code: String,
    pub icd10_name: String,
    pub tablet_name_mon: Option<String>,
    pub tablet_name_sales: Option<String>,
    pub unit_price: Option<f64>,
    pub unit_discount: Option<f64>,
}

/// Query parameters for `/api/medicines`; unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MedicineFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icd10_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tablet_name: Option<String>,
}

/// Outbound calls to the chat backend.
///
/// No call retries; a failure is reported once to the caller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<ChatReply, TransportError>;

    async fn report_unanswered(&self, question: &str) -> Result<(), TransportError>;

    async fn list_hospitals(&self) -> Result<Vec<Hospital>, TransportError>;

    async fn list_medicines(&self, filter: &MedicineFilter) -> Result<Vec<Medicine>, TransportError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    unanswered_path: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            unanswered_path: crate::config::DEFAULT_UNANSWERED_PATH.to_string(),
            timeout: Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut transport = Self::new(&config.base_url());
        transport.unanswered_path = config.unanswered_path().to_string();
        transport.timeout = Duration::from_secs(config.request_timeout_secs());
        transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, TransportError> {
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        check_status(path, response).await
    }

    async fn get<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> Result<Response, TransportError> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.timeout)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        check_status(path, response).await
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(&self, text: &str) -> Result<ChatReply, TransportError> {
        debug!(chars = text.chars().count(), "posting chat message");
        let response = self.post("/chat", &ChatRequest { message: text }).await?;
        decode(response).await
    }

    async fn report_unanswered(&self, question: &str) -> Result<(), TransportError> {
        self.post(&self.unanswered_path, &UnansweredRequest { question })
            .await?;
        Ok(())
    }

    async fn list_hospitals(&self) -> Result<Vec<Hospital>, TransportError> {
        let response = self.get("/api/hospitals", &[] as &[(&str, &str)]).await?;
        decode(response).await
    }

    async fn list_medicines(&self, filter: &MedicineFilter) -> Result<Vec<Medicine>, TransportError> {
        let response = self.get("/api/medicines", filter).await?;
        decode(response).await
    }
}

/// Turn a non-2xx response into its `TransportError` class.
async fn check_status(path: &str, response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty());

    warn!(%status, path, "backend request failed");
    Err(classify(path, status, message))
}

fn classify(path: &str, status: StatusCode, message: Option<String>) -> TransportError {
    if status.is_server_error() {
        TransportError::Server(status.as_u16())
    } else if message.is_some() {
        TransportError::Other {
            status: Some(status.as_u16()),
            message,
        }
    } else if status == StatusCode::NOT_FOUND {
        TransportError::NotFound(path.to_string())
    } else {
        TransportError::Other {
            status: Some(status.as_u16()),
            message: None,
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status().as_u16();
    response.json::<T>().await.map_err(|e| {
        warn!(error = %e, "undecodable backend response");
        TransportError::Other {
            status: Some(status),
            message: None,
        }
    })
}
