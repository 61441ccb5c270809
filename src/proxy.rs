//! Forwarding of the fixed routes to the backend, through the forward proxy.
//!
//! Every proxied route does the same thing with a different upstream path:
//! send one `GET` with a fixed header set, copy the body back, and answer
//! `200 OK` as `application/json`. What the upstream said about status or
//! content type is not passed on.
//!
//! Upstream failures are logged and swallowed. The caller still gets a
//! `200`, with an empty body, and the log is the only trace of what went
//! wrong.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::HeaderMap;
use reqwest::{Client, Proxy, Url};
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::response::Response;

/// Header the connectivity proxy reads to pick a Cloud Connector location.
/// Always sent empty.
pub const LOCATION_ID_HEADER: &str = "sap-connectivity-scc-location_id";

/// Default backend base URL, as seen from the proxy.
pub const DEFAULT_BACKEND_URL: &str = "http://http-host:8001/";

/// Default forward proxy every outbound call goes through.
pub const DEFAULT_PROXY_URL: &str = "http://connectivity-proxy.kyma-system.svc.cluster.local:20003";

/// Maps an inbound path to the upstream path appended to the backend URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub suffix: &'static str,
}

pub const HELLO: RouteDescriptor = RouteDescriptor {
    path: "/hello",
    suffix: "",
};
pub const ACCOUNT: RouteDescriptor = RouteDescriptor {
    path: "/account",
    suffix: "/j",
};
pub const METADATA: RouteDescriptor = RouteDescriptor {
    path: "/metadata",
    suffix: "/sap/opu/odata/sap/ERP_ISU_UMC/$metadata",
};

/// All proxied routes, in registration order.
pub const ROUTES: [RouteDescriptor; 3] = [HELLO, ACCOUNT, METADATA];

/// Outcome of one upstream call.
#[derive(Debug, PartialEq, Eq)]
pub enum Fetched {
    Body(Bytes),
    /// The call failed before a body could be read.
    Empty,
}

impl Fetched {
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Body(b) => b,
            Self::Empty => Bytes::new(),
        }
    }
}

/// The fixed header set sent with every upstream request.
pub fn outbound_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(LOCATION_ID_HEADER),
        HeaderValue::from_static(""),
    );
    headers
}

/// The backend, and the one client used to reach it.
///
/// Built once at startup and shared behind an `Arc`; `reqwest::Client`
/// pools connections internally and needs no locking. No timeout is set,
/// so a stuck proxy holds its request until the server's shutdown
/// deadline reclaims it.
#[derive(Debug)]
pub struct Upstream {
    client: Client,
    backend: Url,
}

impl Upstream {
    pub fn new(backend: Url, proxy: Url) -> Result<Self, Error> {
        let client = Client::builder().proxy(Proxy::all(proxy)?).build()?;
        Ok(Self { client, backend })
    }

    /// Joins the backend base and the route suffix with exactly one `/`.
    pub fn target(&self, route: &RouteDescriptor) -> String {
        format!(
            "{}/{}",
            self.backend.as_str().trim_end_matches('/'),
            route.suffix.trim_start_matches('/'),
        )
    }

    /// Sends the upstream `GET` for `route`, logging any failure.
    ///
    /// A target that does not parse as a URL fails in `send`, like any
    /// other request error.
    pub async fn fetch(&self, route: &RouteDescriptor) -> Fetched {
        let target = self.target(route);

        let request = self.client.get(&target).headers(outbound_headers());
        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(route = route.path, %target, "upstream request failed: {e}");
                return Fetched::Empty;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            warn!(
                route = route.path,
                %target,
                status = status.as_u16(),
                "upstream returned non-success status"
            );
        }

        match resp.bytes().await {
            Ok(body) => {
                debug!(
                    route = route.path,
                    %target,
                    status = status.as_u16(),
                    len = body.len(),
                    "upstream responded"
                );
                Fetched::Body(body)
            }
            Err(e) => {
                error!(route = route.path, %target, "reading upstream body failed: {e}");
                Fetched::Empty
            }
        }
    }

    /// Fetches `route` and answers `200 OK` as JSON, whatever happened upstream.
    pub async fn forward(&self, route: &RouteDescriptor) -> Response {
        Response::json(self.fetch(route).await.into_bytes())
    }
}
