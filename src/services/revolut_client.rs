// src/services/revolut_client.rs
//! Authenticated client for the remote banking API.
//!
//! Every call is built as a `reqwest::Request`, passed through
//! [`RequestAuthenticator::authenticate`], then executed. Payloads are opaque
//! JSON and are forwarded unchanged in both directions.
//!
//! # Endpoints
//! - `GET /accounts`, `GET /accounts/{id}`, `GET /accounts/{id}/balance`
//! - `GET /transactions`, `GET /transactions/{id}`
//! - `POST /pay`
//! - `GET /counterparties`, `POST /counterparty`
//! - `GET /rate`

use crate::auth::request_authenticator::RequestAuthenticator;
use crate::settings::Settings;
use crate::errors::GatewayError;
use reqwest::{header, Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional filters for the transaction listing.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Serialize)]
struct ExchangeRateQuery<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<f64>,
}

/// Thread-safe remote API client.
#[derive(Clone)]
pub struct RevolutClient {
    http: Client,
    base_url: String,
    authenticator: Arc<RequestAuthenticator>,
}

impl RevolutClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Http`] if the HTTP client cannot be built
    /// (e.g. TLS backend initialization failure).
    pub fn new(
        base_url: impl Into<String>,
        authenticator: Arc<RequestAuthenticator>,
    ) -> Result<Self, GatewayError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(RevolutClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authenticator,
        })
    }

    pub fn from_settings(
        settings: &Settings,
        authenticator: Arc<RequestAuthenticator>,
    ) -> Result<Self, GatewayError> {
        Self::new(settings.revolut_api_url.clone(), authenticator)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    pub async fn get_accounts(&self) -> Result<Value, GatewayError> {
        self.send::<(), ()>(Method::GET, "/accounts", None, None).await
    }

    pub async fn get_account(&self, account_id: &str) -> Result<Value, GatewayError> {
        let path = format!("/accounts/{}", account_id);
        self.send::<(), ()>(Method::GET, &path, None, None).await
    }

    pub async fn get_account_balance(&self, account_id: &str) -> Result<Value, GatewayError> {
        let path = format!("/accounts/{}/balance", account_id);
        self.send::<(), ()>(Method::GET, &path, None, None).await
    }

    pub async fn get_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<Value, GatewayError> {
        self.send::<_, ()>(Method::GET, "/transactions", Some(filters), None)
            .await
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Value, GatewayError> {
        let path = format!("/transactions/{}", transaction_id);
        self.send::<(), ()>(Method::GET, &path, None, None).await
    }

    pub async fn create_payment(&self, payment: &Value) -> Result<Value, GatewayError> {
        self.send::<(), _>(Method::POST, "/pay", None, Some(payment)).await
    }

    pub async fn get_counterparties(&self) -> Result<Value, GatewayError> {
        self.send::<(), ()>(Method::GET, "/counterparties", None, None)
            .await
    }

    pub async fn create_counterparty(&self, counterparty: &Value) -> Result<Value, GatewayError> {
        self.send::<(), _>(Method::POST, "/counterparty", None, Some(counterparty))
            .await
    }

    /// Quotes an exchange rate; `amount` is omitted from the query when `None`.
    pub async fn get_exchange_rate(
        &self,
        from: &str,
        to: &str,
        amount: Option<f64>,
    ) -> Result<Value, GatewayError> {
        let query = ExchangeRateQuery { from, to, amount };
        self.send::<_, ()>(Method::GET, "/rate", Some(&query), None).await
    }

    /// Sends an authenticated request to `path` relative to the base URL.
    ///
    /// # Errors
    /// - [`GatewayError::Signing`] if a fresh assertion cannot be minted
    /// - [`GatewayError::Http`] on transport failure or a non-2xx status
    pub async fn send<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Value, GatewayError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method.clone(), &url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let request = self.authenticator.authenticate(builder.build()?)?;

        let result = async {
            let response = self.http.execute(request).await?.error_for_status()?;
            log::debug!(
                "Revolut API Response: {} {} - Status: {}",
                method,
                path,
                response.status()
            );
            response.json::<Value>().await
        }
        .await;

        result.map_err(|e| {
            log::error!("Revolut API Error: {} {} - {}", method, path, e);
            GatewayError::Http(e)
        })
    }
}
