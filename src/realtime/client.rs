use std::future::Future;
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

use crate::location::{LocationReport, LocationStore, StoredLocation};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("server rejected the report ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Read side of the location store, as seen by a poller.
pub trait LocationSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<LocationReport, FetchError>> + Send;
}

/// Polls the location endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLocationSource {
    client: reqwest::Client,
    url: String,
}

impl HttpLocationSource {
    /// `timeout` bounds each request; a request that runs over surfaces as a
    /// failed tick.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl LocationSource for HttpLocationSource {
    async fn fetch(&self) -> Result<LocationReport, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.json::<LocationReport>().await?)
    }
}

/// In-process reads, for running the tracker next to the server.
impl LocationSource for LocationStore {
    async fn fetch(&self) -> Result<LocationReport, FetchError> {
        Ok(StoredLocation::from(self.read().await).into())
    }
}

/// Send one position report to the location endpoint and return the
/// server's acknowledgement body.
pub async fn post_location(
    client: &reqwest::Client,
    url: &str,
    lat: f64,
    lng: f64,
) -> Result<Value, FetchError> {
    let response = client
        .post(url)
        .json(&json!({ "lat": lat, "lng": lng }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("no error message")
            .to_string();
        return Err(FetchError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}
