//! # sccgate
//!
//! A small HTTP front door for a backend that is only reachable through a
//! forward proxy, such as an on-premise system behind a cloud connectivity
//! proxy.
//!
//! ## Routes
//!
//! | Path | Upstream `GET` |
//! |---|---|
//! | `/` | none, answers `Hello World` |
//! | `/hello` | `{backend}/` |
//! | `/account` | `{backend}/j` |
//! | `/metadata` | `{backend}/sap/opu/odata/sap/ERP_ISU_UMC/$metadata` |
//!
//! Any method is accepted and the request body is ignored. Proxied routes
//! always answer `200 OK` as `application/json` with the upstream body
//! copied verbatim. When the upstream call fails the body is empty and the
//! failure only shows up in the log.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sccgate::{Server, Upstream, routes, shutdown_signal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sccgate::Error> {
//!     let upstream = Upstream::new(
//!         "http://http-host:8001/".parse().unwrap(),
//!         "http://connectivity-proxy.kyma-system.svc.cluster.local:20003".parse().unwrap(),
//!     )?;
//!
//!     Server::new("0.0.0.0:8080")?
//!         .start(routes::router(Arc::new(upstream)), shutdown_signal())
//!         .await
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod proxy;
pub mod routes;

pub use error::Error;
pub use handler::Handler;
pub use proxy::{Fetched, RouteDescriptor, Upstream};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{SHUTDOWN_TIMEOUT, Server, shutdown_signal};
