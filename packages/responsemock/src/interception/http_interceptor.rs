// packages/responsemock/src/interception/http_interceptor.rs
//! HTTP interceptor serving registered directives
//!
//! Runs as a forward proxy on a loopback port. Clients send absolute-form
//! requests (proxy mode) or origin-form requests with a `Host` header
//! (direct mode). Matching requests get the stubbed response, passthrough
//! requests are forwarded upstream, anything else is refused and recorded.

use crate::interception::routing_table::RoutingTable;
use crate::rules::Directive;
use crate::utils::config::EngineOptions;
use crate::utils::errors::{MockError, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, HOST};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioIo};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Headers that only make sense on a single hop
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "proxy-connection",
    "proxy-authorization",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// How an intercepted request was answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallOutcome {
    /// Served from a directive
    Stubbed { status: u16 },

    /// Forwarded to the real destination
    Passthrough,

    /// Matched nothing and was refused
    Unmatched,
}

impl CallOutcome {
    fn label(&self) -> &'static str {
        match self {
            CallOutcome::Stubbed { .. } => "stubbed",
            CallOutcome::Passthrough => "passthrough",
            CallOutcome::Unmatched => "unmatched",
        }
    }
}

/// Call history entry
#[derive(Debug, Clone, Serialize)]
pub struct Call {
    pub method: String,
    pub url: String,
    pub outcome: CallOutcome,
    pub at: DateTime<Utc>,
}

impl Call {
    pub fn is_unmatched(&self) -> bool {
        self.outcome == CallOutcome::Unmatched
    }
}

/// Shared call history
pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Routing decision for one request
#[derive(Debug, Clone)]
pub enum Dispatch {
    Stub(Directive),
    Passthrough,
    Unmatched,
}

/// Decide how to answer `method` + `url` and record the call.
/// Directives win over passthrough prefixes.
pub fn dispatch(
    routing_table: &Mutex<RoutingTable>,
    calls: &Mutex<Vec<Call>>,
    method: &str,
    url: &str,
) -> Dispatch {
    let dispatch = {
        let mut table = routing_table.lock();
        match table.lookup(method, url) {
            Some(directive) => Dispatch::Stub(directive),
            None if table.is_passthrough(url) => Dispatch::Passthrough,
            None => Dispatch::Unmatched,
        }
    };

    let outcome = match &dispatch {
        Dispatch::Stub(directive) => CallOutcome::Stubbed {
            status: directive.status,
        },
        Dispatch::Passthrough => CallOutcome::Passthrough,
        Dispatch::Unmatched => CallOutcome::Unmatched,
    };
    record_call(calls, method, url, outcome);

    dispatch
}

fn record_call(calls: &Mutex<Vec<Call>>, method: &str, url: &str, outcome: CallOutcome) {
    metrics::counter!("responsemock_requests_total", "outcome" => outcome.label()).increment(1);

    calls.lock().push(Call {
        method: method.to_string(),
        url: url.to_string(),
        outcome,
        at: Utc::now(),
    });
}

/// Full URL of a request, from the absolute-form target or the `Host` header
pub fn request_url<B>(req: &Request<B>) -> String {
    let uri = req.uri();
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    let host = req
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    format!("http://{}{}", host, path)
}

/// Build the response a directive describes
pub fn stub_response(directive: &Directive) -> Response<Full<Bytes>> {
    let Some(status) = StatusCode::from_u16(directive.status)
        .ok()
        .filter(|status| !status.is_informational())
    else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Invalid status in directive: {}", directive.status),
        );
    };

    let mut response = Response::new(Full::new(Bytes::copy_from_slice(directive.body.as_bytes())));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    match HeaderValue::from_bytes(directive.effective_content_type().as_bytes()) {
        Ok(value) => {
            headers.insert(CONTENT_TYPE, value);
        }
        Err(_) => warn!(
            "Skipping invalid content type: {}",
            directive.effective_content_type()
        ),
    }

    if let Some(extra) = &directive.headers {
        for (name, value) in extra {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping invalid header {}: {}", name, value),
            }
        }
    }

    response
}

/// Create error response
fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(message.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// HTTP interceptor
pub struct HttpInterceptor {
    options: EngineOptions,
    routing_table: Arc<Mutex<RoutingTable>>,
    calls: CallLog,
    http_client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpInterceptor {
    /// Create a new HTTP interceptor
    pub fn new(
        options: EngineOptions,
        routing_table: Arc<Mutex<RoutingTable>>,
        calls: CallLog,
    ) -> Self {
        let http_client = Client::builder(TokioExecutor::new()).build_http();

        Self {
            options,
            routing_table,
            calls,
            http_client,
        }
    }

    /// Accept connections until `shutdown` fires
    pub async fn serve(self: Arc<Self>, listener: TcpListener, mut shutdown: oneshot::Receiver<()>) {
        match listener.local_addr() {
            Ok(addr) => info!("HTTP interceptor listening on {}", addr),
            Err(e) => warn!("HTTP interceptor address unavailable: {}", e),
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("HTTP interceptor shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let interceptor = Arc::clone(&self);

                        tokio::spawn(async move {
                            debug!("Accepted connection from {}", addr);

                            let io = TokioIo::new(stream);

                            let service = service_fn(move |req| {
                                let interceptor = Arc::clone(&interceptor);
                                async move { interceptor.handle_request(req).await }
                            });

                            if let Err(e) = http1::Builder::new()
                                .serve_connection(io, service)
                                .with_upgrades()
                                .await
                            {
                                debug!("Connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
        }
    }

    /// Handle incoming HTTP request
    async fn handle_request(&self, req: Request<Incoming>) -> Result<Response<Full<Bytes>>> {
        if *req.method() == Method::CONNECT {
            return Ok(self.handle_connect(req));
        }

        let method = req.method().clone();
        let url = request_url(&req);

        if self.options.log_requests {
            self.log_request(&method, &url, req.headers());
        }

        let response = match dispatch(&self.routing_table, &self.calls, method.as_str(), &url) {
            Dispatch::Stub(directive) => stub_response(&directive),
            Dispatch::Passthrough => match self.forward_passthrough(req, &url).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Failed to forward request: {}", e);
                    error_response(StatusCode::BAD_GATEWAY, &e.to_string())
                }
            },
            Dispatch::Unmatched => {
                warn!("No rule matches {} {}", method, url);
                let refusal = MockError::Unmatched {
                    method: method.to_string(),
                    url,
                };
                error_response(StatusCode::NOT_IMPLEMENTED, &refusal.to_string())
            }
        };

        if self.options.log_responses {
            self.log_response(&response);
        }

        Ok(response)
    }

    /// Forward a passthrough request to its real destination
    async fn forward_passthrough(
        &self,
        req: Request<Incoming>,
        url: &str,
    ) -> Result<Response<Full<Bytes>>> {
        let (parts, body) = req.into_parts();

        let body_bytes = body
            .collect()
            .await
            .map_err(|e| MockError::InterceptionFailed(format!("Body read error: {}", e)))?
            .to_bytes();

        let uri: Uri = url.parse().map_err(|e| {
            MockError::InterceptionFailed(format!("Invalid passthrough URL {}: {}", url, e))
        })?;

        debug!("Passing {} {} through", parts.method, uri);

        let mut upstream = Request::new(Full::new(body_bytes));
        *upstream.method_mut() = parts.method;
        *upstream.uri_mut() = uri;
        *upstream.headers_mut() = parts.headers;
        strip_hop_by_hop(upstream.headers_mut());

        let response = self.http_client.request(upstream).await.map_err(|e| {
            MockError::InterceptionFailed(format!("Passthrough request failed: {}", e))
        })?;

        let (mut parts, body) = response.into_parts();
        let body_bytes = body
            .collect()
            .await
            .map_err(|e| {
                MockError::InterceptionFailed(format!("Response body error: {}", e))
            })?
            .to_bytes();
        strip_hop_by_hop(&mut parts.headers);

        Ok(Response::from_parts(parts, Full::new(body_bytes)))
    }

    /// Tunnel `CONNECT` to passthrough hosts, refuse everything else
    fn handle_connect(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
        let Some(authority) = req.uri().authority().cloned() else {
            return error_response(StatusCode::BAD_REQUEST, "CONNECT without authority");
        };

        let host = authority.host().to_string();
        let port = authority.port_u16().unwrap_or(443);
        let target = format!("https://{}", authority);

        let allowed = self
            .routing_table
            .lock()
            .is_passthrough_authority(&host, port);

        if !allowed {
            warn!("Refusing tunnel to {}", authority);
            record_call(&self.calls, "CONNECT", &target, CallOutcome::Unmatched);
            let refusal = MockError::Unmatched {
                method: "CONNECT".to_string(),
                url: target,
            };
            return error_response(StatusCode::NOT_IMPLEMENTED, &refusal.to_string());
        }

        record_call(&self.calls, "CONNECT", &target, CallOutcome::Passthrough);

        tokio::spawn(async move {
            let upgraded = match hyper::upgrade::on(req).await {
                Ok(upgraded) => upgraded,
                Err(e) => {
                    error!("Tunnel upgrade failed: {}", e);
                    return;
                }
            };

            let mut client = TokioIo::new(upgraded);
            match TcpStream::connect((host.as_str(), port)).await {
                Ok(mut server) => {
                    if let Err(e) = tokio::io::copy_bidirectional(&mut client, &mut server).await {
                        debug!("Tunnel to {}:{} closed: {}", host, port, e);
                    }
                }
                Err(e) => error!("Failed to open tunnel to {}:{}: {}", host, port, e),
            }
        });

        Response::new(Full::new(Bytes::new()))
    }

    /// Log HTTP request
    fn log_request(&self, method: &Method, url: &str, headers: &HeaderMap) {
        debug!("Request: {} {}", method, url);
        for (name, value) in headers {
            if let Ok(val_str) = value.to_str() {
                debug!("  {}: {}", name, val_str);
            }
        }
    }

    /// Log HTTP response
    fn log_response(&self, response: &Response<Full<Bytes>>) {
        debug!("Response: {}", response.status());
        for (name, value) in response.headers() {
            if let Ok(val_str) = value.to_str() {
                debug!("  {}: {}", name, val_str);
            }
        }
    }
}
