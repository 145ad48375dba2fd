/* demos/axum.rs */

use axum::{Router, extract::ConnectInfo, response::Json, routing::get};
use req::{
    ClientIp, ClientIpLayer, IpOptions, Request, get_array, get_int_or, get_string_trimmed_or,
    is_private_ip, maps, subdomain,
};
use serde_json::json;
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("req=debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = create_app();
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    println!("Server starting on http://localhost:3000");
    println!("Test endpoints:");
    println!("  • GET /ip            - Client IP with the default policy");
    println!("  • GET /trusted       - Client IP behind trusted proxies (REQ_* env overrides)");
    println!("  • GET|POST /params   - Parameter accessors over query and form");
    println!();
    println!("Test with headers:");
    println!("  curl -H 'X-Real-IP: 203.0.113.42' http://localhost:3000/ip");
    println!("  curl -H 'X-Forwarded-For: 198.51.100.1, 10.0.0.1' http://localhost:3000/trusted");
    println!("  curl -d 'name=Alice&tags[]=a&tags[]=b' 'http://localhost:3000/params?page=2'");
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn create_app() -> Router {
    let default_router = Router::new()
        .route("/ip", get(ip_handler))
        .route("/params", get(params_handler).post(params_handler))
        .layer(ClientIpLayer::new());

    let mut trusted = IpOptions::from_env();
    if trusted.trusted_proxies.is_empty() {
        trusted = trusted
            .prefer_forwarded_for(true)
            .with_trusted_proxies(["10.0.0.0/8", "127.0.0.1"])
            .validate(true);
    }
    let trusted_router = Router::new()
        .route("/", get(ip_handler))
        .layer(ClientIpLayer::with_options(trusted));

    default_router.nest("/trusted", trusted_router)
}

/// Handler that returns the resolved client IP alongside the raw peer address
async fn ip_handler(
    client_ip: ClientIp,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Json<serde_json::Value> {
    Json(json!({
        "client_ip": client_ip.as_str(),
        "is_ip_literal": client_ip.addr().is_some(),
        "is_private": is_private_ip(client_ip.as_str()),
        "remote_addr": addr.to_string(),
    }))
}

/// Handler showing the parameter accessors
async fn params_handler(client_ip: ClientIp, req: Request) -> Json<serde_json::Value> {
    Json(json!({
        "client_ip": client_ip.as_str(),
        "subdomain": subdomain(&req),
        "name": get_string_trimmed_or(&req, "name", "anonymous"),
        "page": get_int_or(&req, "page", 1),
        "tags": get_array(&req, "tags", vec![]),
        "rows": maps(&req, "rows", vec![]),
    }))
}
