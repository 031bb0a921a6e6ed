// JSON fetch helper: failures are logged, shown to the user once, and returned to the caller.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::models::NotificationKind;

use crate::error::PlatformError;
use crate::http::{HttpRequest, HttpTransport, Method};
use crate::notify::Notifier;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// Request with a JSON-encoded body and the matching content type.
    pub fn json<B: Serialize + ?Sized>(method: Method, body: &B) -> Result<Self, PlatformError> {
        Ok(Self {
            method,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(serde_json::to_string(body)?),
        })
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

pub struct FetchClient<T> {
    transport: T,
    notifier: Arc<dyn Notifier>,
    error_message: String,
}

impl<T: HttpTransport> FetchClient<T> {
    pub fn new(transport: T, notifier: Arc<dyn Notifier>, error_message: impl Into<String>) -> Self {
        Self {
            transport,
            notifier,
            error_message: error_message.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs the request and decodes the JSON body of a 2xx answer.
    ///
    /// Non-2xx answers become [`PlatformError::HttpStatus`]. Every failure raises exactly
    /// one error notification before it is returned.
    pub async fn fetch_json<R: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<R, PlatformError> {
        let result = self.try_fetch(url, options).await;
        if let Err(e) = &result {
            tracing::error!(url, error = %e, "Request failed");
            self.notifier.notify(&self.error_message, NotificationKind::Error);
        }
        result
    }

    /// Untyped variant of [`fetch_json`](Self::fetch_json).
    pub async fn fetch_value(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<serde_json::Value, PlatformError> {
        self.fetch_json(url, options).await
    }

    async fn try_fetch<R: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<R, PlatformError> {
        let request = HttpRequest {
            method: options.method,
            url: url.to_string(),
            headers: options.headers,
            body: options.body,
        };
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(PlatformError::HttpStatus {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}
