//! Development server.
//!
//! Serves the output directory over HTTP and, with `watch` enabled, rebuilds
//! when sources change.

mod lifecycle;
mod path;
mod response;
mod watch;

pub use lifecycle::setup_shutdown_handler;

use crate::{
    cli::{Cli, build::build_and_log},
    config::ProjectConfig,
    debug, log,
};
use anyhow::Result;
use std::{path::Path, sync::Arc};
use tiny_http::{Method, Request, Server};

/// Build once, then serve until Ctrl+C.
pub fn serve_project(cli: &'static Cli, config: &ProjectConfig) -> Result<()> {
    build_and_log(config)?;

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server(Arc::clone(&server));
    log!("serve"; "http://{}", addr);

    let watcher = if config.serve.watch {
        Some(watch::spawn_watcher(cli, config)?)
    } else {
        None
    };

    run_request_loop(&server, &config.build.output);

    if let Some(handle) = watcher
        && handle.join().is_err()
    {
        log!("watch"; "watcher thread panicked");
    }
    Ok(())
}

fn run_request_loop(server: &Server, root: &Path) {
    for request in server.incoming_requests() {
        if lifecycle::is_shutdown() {
            break;
        }
        if let Err(e) = handle_request(request, root) {
            log!("serve"; "request error: {e}");
        }
    }
}

/// Handle a single HTTP request.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    match path::resolve_path(request.url(), root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}
