//! # Request Mediator
//!
//! Turns `(operation, params)` into one authenticated HTTP round trip and
//! classifies the outcome. No retries: every failure surfaces to the caller.
//!
//! Batch operations with a declared [`BatchLimit`] are split into
//! consecutive requests of at most `max` items; results keep input order.

use std::sync::Arc;

use serde_json::Value;

use crate::catalog::{BatchLimit, EndpointCatalog, OperationDescriptor, Params};
use crate::config::{ApiKey, ClientConfig};
use crate::decoder::{decode, DecodedResponse};
use crate::errors::{ChemSpiderError, ChemSpiderResult};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, Timer};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "apikey";

/// Builds, sends and decodes requests for one client
pub struct RequestMediator {
    api_url: String,
    api_version: String,
    user_agent: String,
    api_key: ApiKey,
    catalog: Arc<EndpointCatalog>,
    transport: Arc<dyn Transport>,
    metrics: Arc<MetricsRegistry>,
}

impl RequestMediator {
    pub fn new(
        config: &ClientConfig,
        api_key: ApiKey,
        catalog: Arc<EndpointCatalog>,
        transport: Arc<dyn Transport>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_version: config.api_version.clone(),
            user_agent: config.user_agent(),
            api_key,
            catalog,
            transport,
            metrics,
        }
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Resolve, validate, send and decode
    ///
    /// Validation failures never reach the transport.
    pub fn invoke(&self, operation: &str, params: Params) -> ChemSpiderResult<DecodedResponse> {
        let descriptor = self.catalog.resolve(operation)?;
        descriptor.validate(&params)?;

        match descriptor.batch {
            Some(limit) => self.invoke_batched(descriptor, limit, params),
            None => self.dispatch(descriptor, &params),
        }
    }

    /// Build the outbound request without sending it
    pub fn build_request(
        &self,
        descriptor: &OperationDescriptor,
        params: &Params,
    ) -> ChemSpiderResult<HttpRequest> {
        Ok(HttpRequest {
            method: descriptor.method,
            url: descriptor.url(&self.api_url, &self.api_version, params)?,
            headers: vec![
                (API_KEY_HEADER.to_string(), self.api_key.as_str().to_string()),
                ("User-Agent".to_string(), self.user_agent.clone()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            query: descriptor.query_pairs(params),
            body: descriptor.body(params),
        })
    }

    fn invoke_batched(
        &self,
        descriptor: &OperationDescriptor,
        limit: BatchLimit,
        params: Params,
    ) -> ChemSpiderResult<DecodedResponse> {
        let items = match params.get(limit.param) {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(ChemSpiderError::Validation(format!(
                    "Parameter '{}' of {} must be a list",
                    limit.param, descriptor.name
                )))
            }
        };

        if items.is_empty() {
            return Ok(DecodedResponse::List(Vec::new()));
        }
        if items.len() <= limit.max {
            return self.dispatch(descriptor, &params);
        }

        let chunks: Vec<&[Value]> = items.chunks(limit.max).collect();
        let total = items.len().to_string();
        let chunk_count = chunks.len().to_string();
        log_event_with_fields(
            Event::BatchChunked,
            &[
                ("chunks", chunk_count.as_str()),
                ("items", total.as_str()),
                ("operation", descriptor.name),
            ],
        );
        self.metrics.add_batch_chunks(chunks.len() as u64);

        let mut combined = Vec::with_capacity(items.len());
        for chunk in chunks {
            let mut chunk_params = params.clone();
            chunk_params.insert(limit.param, Value::Array(chunk.to_vec()));
            match self.dispatch(descriptor, &chunk_params)? {
                DecodedResponse::List(records) => combined.extend(records),
                other => {
                    return Err(ChemSpiderError::Parse(format!(
                        "{} batch chunk did not decode to a list: {:?}",
                        descriptor.name, other
                    )))
                }
            }
        }
        Ok(DecodedResponse::List(combined))
    }

    fn dispatch(
        &self,
        descriptor: &OperationDescriptor,
        params: &Params,
    ) -> ChemSpiderResult<DecodedResponse> {
        let request = self.build_request(descriptor, params)?;
        let fields = [
            ("method", descriptor.method.as_str()),
            ("operation", descriptor.name),
            ("url", request.url.as_str()),
        ];
        log_event_with_fields(Event::RequestSent, &fields);
        self.metrics.increment_requests_sent();
        let timer = Timer::new();

        let outcome = self
            .transport
            .send(&request)
            .map_err(ChemSpiderError::from)
            .and_then(check_status)
            .and_then(|response| decode(descriptor, &response.body));

        let elapsed = timer.elapsed_ms();
        match outcome {
            Ok(decoded) => {
                log_event_with_fields(
                    Event::RequestComplete,
                    &[fields[0], fields[1], ("elapsed_ms", elapsed.as_str())],
                );
                Ok(decoded)
            }
            Err(err) => {
                self.metrics.increment_requests_failed();
                let reason = err.to_string();
                log_event_with_fields(
                    Event::RequestFailed,
                    &[
                        fields[0],
                        fields[1],
                        fields[2],
                        ("code", err.code()),
                        ("elapsed_ms", elapsed.as_str()),
                        ("reason", reason.as_str()),
                    ],
                );
                Err(err)
            }
        }
    }
}

/// Map non-2xx responses to errors before any decoding is attempted
fn check_status(response: HttpResponse) -> ChemSpiderResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let message = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if response.reason.is_empty() {
                format!("HTTP {}", response.status)
            } else {
                response.reason.clone()
            }
        });

    Err(ChemSpiderError::from_status(response.status, message))
}
