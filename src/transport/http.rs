//! `reqwest`-backed transport.

use std::error::Error as _;

use async_trait::async_trait;

use crate::resilience::CallContext;
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// HTTP transport sharing one `reqwest` connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured `reqwest` client (proxies, TLS roots, pool limits).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        ctx: &CallContext,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let round_trip = async {
            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::Network(describe(&e)))?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Network(describe(&e)))?;

            Ok(TransportResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        };

        // Dropping the round trip aborts the underlying connection.
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(TransportError::Cancelled),
            result = round_trip => result,
        }
    }
}

/// Flatten a reqwest error and its source chain into one line.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
