/* src/middleware.rs */

use axum::{
    body::Bytes,
    extract::{
        ConnectInfo, FromRequest, FromRequestParts, Request as HttpRequest,
        rejection::BytesRejection,
    },
    http::{Extensions, HeaderMap, Method, Uri, header::HOST, request::Parts},
    response::Response,
};
use futures_util::future::BoxFuture;
use std::{
    net::{IpAddr, SocketAddr},
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::network::TrustedNetworks;
use crate::request::Request;
use crate::resolver::IpOptions;

/// Extension that holds the resolved client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    /// The address as resolved, which may not be an IP literal when
    /// validation is off.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address parsed as an IP, if it is one.
    pub fn addr(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

/// Layer that resolves the client address of each request.
///
/// The result is stored as a [`ClientIp`] request extension for handlers.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use req::{ClientIp, ClientIpLayer, IpOptions};
///
/// async fn handler(ClientIp(ip): ClientIp) -> String {
///     ip
/// }
///
/// let options = IpOptions::new()
///     .prefer_forwarded_for(true)
///     .with_trusted_proxies(["10.0.0.0/8"]);
///
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(ClientIpLayer::with_options(options));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientIpLayer {
    options: IpOptions,
    trusted: TrustedNetworks,
}

impl ClientIpLayer {
    /// Create a layer with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer with a custom policy.
    ///
    /// Trusted proxy entries are parsed once here and shared by every
    /// service the layer builds.
    pub fn with_options(options: IpOptions) -> Self {
        let trusted = options.trusted_networks();
        Self { options, trusted }
    }

    /// Create a layer whose policy comes from `REQ_*` environment variables.
    pub fn from_env() -> Self {
        Self::with_options(IpOptions::from_env())
    }
}

impl<S> Layer<S> for ClientIpLayer {
    type Service = ClientIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientIpService {
            inner,
            options: self.options.clone(),
            trusted: self.trusted.clone(),
        }
    }
}

/// Service that resolves client addresses.
#[derive(Debug, Clone)]
pub struct ClientIpService<S> {
    inner: S,
    options: IpOptions,
    trusted: TrustedNetworks,
}

impl<S> Service<HttpRequest> for ClientIpService<S>
where
    S: Service<HttpRequest, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: HttpRequest) -> Self::Future {
        let snapshot = snapshot(req.method(), req.uri(), req.headers(), req.extensions());

        let ip = self.options.resolve_with(&self.trusted, &snapshot);
        if ip.is_empty() {
            tracing::debug!(uri = %req.uri(), "could not resolve client address");
        } else {
            req.extensions_mut().insert(ClientIp(ip));
        }

        let future = self.inner.call(req);
        Box::pin(async move { future.await })
    }
}

/// Build a body-less snapshot from the parts of an axum request.
fn snapshot(method: &Method, uri: &Uri, headers: &HeaderMap, extensions: &Extensions) -> Request {
    let mut snapshot = Request::new(method.as_str(), &uri.to_string());

    for (name, value) in headers.iter() {
        if let Ok(value) = value.to_str() {
            snapshot = snapshot.with_header(name.as_str(), value);
        }
    }

    if snapshot.host().is_empty() {
        if let Some(host) = headers.get(HOST).and_then(|host| host.to_str().ok()) {
            snapshot = snapshot.with_host(host);
        }
    }

    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        snapshot = snapshot.with_remote_addr(addr.to_string());
    }

    snapshot
}

/// Axum extractor for the client address.
///
/// Uses the value stored by [`ClientIpLayer`] when present, otherwise resolves
/// the request with the default policy.
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(client_ip) = parts.extensions.get::<ClientIp>() {
            return Ok(client_ip.clone());
        }

        let snapshot = snapshot(&parts.method, &parts.uri, &parts.headers, &parts.extensions);
        Ok(ClientIp(IpOptions::default().resolve(&snapshot)))
    }
}

/// Buffers the body so handlers can use the parameter accessors directly.
impl<S> FromRequest<S> for Request
where
    S: Send + Sync,
{
    type Rejection = BytesRejection;

    async fn from_request(req: HttpRequest, state: &S) -> Result<Self, Self::Rejection> {
        let snapshot = snapshot(req.method(), req.uri(), req.headers(), req.extensions());
        let body = Bytes::from_request(req, state).await?;
        Ok(snapshot.with_body(body.to_vec()))
    }
}
