//! HTTP server lifecycle and graceful shutdown.
//!
//! A [`Server`] moves through `Constructed → Listening → ShuttingDown →
//! Stopped`, once, in that order:
//!
//! 1. [`Server::new`] checks the bind address; nothing is opened yet.
//! 2. [`Server::start`] spawns the accept loop and parks the caller on the
//!    stop future.
//! 3. When the stop future resolves, the listener is dropped (new
//!    connections are refused) and every open connection is asked to shut
//!    down: requests in flight finish, idle keep-alive connections close.
//! 4. `start` returns once all connections are gone, or with
//!    [`Error::ShutdownTimeout`] if that takes longer than the deadline.
//!
//! Kubernetes sends SIGTERM and waits `terminationGracePeriodSeconds`
//! (default 30 s) before SIGKILL, which is where [`SHUTDOWN_TIMEOUT`] comes
//! from.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::request::Request;
use crate::router::Router;
use crate::routes::not_found;

/// How long in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    addr: String,
    shutdown_timeout: Duration,
}

impl Server {
    /// Validates `addr` and returns a server ready to [`start`](Server::start).
    ///
    /// `addr` is anything [`TcpListener::bind`] resolves, e.g.
    /// `0.0.0.0:8080` or `localhost:8080`. It is not resolved here.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `addr` is empty.
    pub fn new(addr: &str) -> Result<Self, Error> {
        if addr.is_empty() {
            return Err(Error::Config("bind address cannot be blank".to_owned()));
        }
        Ok(Self {
            addr: addr.to_owned(),
            shutdown_timeout: SHUTDOWN_TIMEOUT,
        })
    }

    /// Replaces the [`SHUTDOWN_TIMEOUT`] deadline.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Serves `router` in the background until `stop` resolves, then shuts
    /// down gracefully.
    ///
    /// A listener that cannot be bound is fatal: the error is logged and the
    /// process exits with status 1.
    ///
    /// # Errors
    ///
    /// [`Error::ShutdownTimeout`] if connections are still open when the
    /// deadline passes; they are aborted. [`Error::Join`] if the accept
    /// task panicked.
    pub async fn start<F>(self, router: Router, stop: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let (drain_tx, drain_rx) = watch::channel(false);
        let mut accept = tokio::spawn(listen(self.addr, Arc::new(router), drain_rx));

        stop.await;

        info!(timeout = ?self.shutdown_timeout, "stopping server");
        // Fails only when the accept task has already exited.
        let _ = drain_tx.send(true);

        match tokio::time::timeout(self.shutdown_timeout, &mut accept).await {
            Ok(joined) => {
                joined?;
                info!("server stopped");
                Ok(())
            }
            Err(_) => {
                accept.abort();
                warn!(
                    timeout = ?self.shutdown_timeout,
                    "shutdown deadline exceeded, abandoning connections"
                );
                Err(Error::ShutdownTimeout(self.shutdown_timeout))
            }
        }
    }
}

// ── Accept loop ───────────────────────────────────────────────────────────────

async fn listen(addr: String, router: Arc<Router>, drain: watch::Receiver<bool>) {
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "listen: {e}");
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(local) => info!(%addr, %local, "starting server"),
        Err(_) => info!(%addr, "starting server"),
    }

    accept_loop(listener, router, drain).await;
}

async fn accept_loop(
    listener: TcpListener,
    router: Arc<Router>,
    mut drain: watch::Receiver<bool>,
) {
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            // Shutdown wins over a queued connection.
            biased;

            _ = drain.changed() => {
                info!(
                    in_flight = tasks.len(),
                    "no longer accepting connections, draining"
                );
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };
                tasks.spawn(connection(stream, peer, Arc::clone(&router), drain.clone()));
            }

            // Reap finished connections so the set stays small.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    drop(listener);
    while tasks.join_next().await.is_some() {}
}

async fn connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Arc<Router>,
    mut drain: watch::Receiver<bool>,
) {
    let svc = service_fn(move |req| {
        let router = Arc::clone(&router);
        async move { dispatch(&router, req).await }
    });

    let builder = ConnBuilder::new(TokioExecutor::new());
    let conn = builder.serve_connection(TokioIo::new(stream), svc);
    tokio::pin!(conn);

    let result = tokio::select! {
        res = conn.as_mut() => res,
        _ = drain.changed() => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    if let Err(e) = result {
        debug!(%peer, "connection error: {e}");
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request. Never fails: unknown paths become a 404 here.
async fn dispatch(
    router: &Router,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, _body) = req.into_parts();
    let req = Request::from_parts(parts);
    debug!(method = %req.method(), path = req.path(), "request");

    let response = match router.lookup(req.path()) {
        Some(handler) => handler.call(req).await,
        None => not_found(),
    };

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C only, off Unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
