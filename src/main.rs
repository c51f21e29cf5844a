//! fileshelf server binary.
//!
//! Translates GET/PUT/DELETE requests into reads, writes and removals inside a
//! single served directory tree, answering any other verb with 405. The entry
//! point builds the Axum router around one verb-to-handler table, binds the
//! listener, and runs until shutdown.

mod config;
mod error;
mod files;
mod logging;
mod storage;

use axum::Router;
use axum::extract::{Extension, connect_info::ConnectInfo};
use axum::http::Request;
use axum::routing::get;
use axum_server::Handle;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, info_span};

use crate::config::Args;
use crate::storage::Storage;

/// Starts the fileshelf server and blocks until shutdown.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    logging::init_logging();

    let args = Args::parse();
    let storage = Arc::new(Storage::new(PathBuf::from(args.root_dir.clone())));
    storage.ensure_root().await?;

    // One immutable verb-to-handler table, shared by the root route and the
    // wildcard route so `GET /` lists the served directory itself.
    let entry_routes = get(files::get_entry)
        .put(files::put_entry)
        .delete(files::delete_entry)
        .fallback(files::method_not_allowed);

    let app = Router::new()
        .route("/", entry_routes.clone())
        .route("/{*path}", entry_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let client_ip = request
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ConnectInfo(addr)| addr.to_string())
                        .unwrap_or_else(|| "unknown".to_string());

                    info_span!(
                        env!("CARGO_CRATE_NAME"),
                        client_ip,
                        method = ?request.method(),
                        path = ?request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(Extension(storage.clone()));

    let host = args
        .host
        .parse::<IpAddr>()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;
    let http_addr = SocketAddr::new(host, args.port);
    let handle = Handle::new();

    info!(
        "🚀 Serving {} at {}",
        storage.root_path().display(),
        http_addr
    );

    let http_server = axum_server::bind(http_addr)
        .handle(handle.clone())
        .serve(app.into_make_service_with_connect_info::<SocketAddr>());

    tokio::select! {
        result = http_server => result?,
        _ = shutdown_signal(handle) => {}
    }

    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received termination signal shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
