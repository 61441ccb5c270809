//! The application's route table.

use std::sync::Arc;

use http::StatusCode;

use crate::proxy::{ROUTES, Upstream};
use crate::{Request, Response, Router};

/// `/` answers directly; every [`ROUTES`] entry forwards through `upstream`.
pub fn router(upstream: Arc<Upstream>) -> Router {
    let mut router = Router::new().route("/", hello_world);

    for route in ROUTES {
        let upstream = Arc::clone(&upstream);
        router = router.route(route.path, move |_req: Request| {
            let upstream = Arc::clone(&upstream);
            async move { upstream.forward(&route).await }
        });
    }

    router
}

/// `200 OK`, body `Hello World`, for any method and query.
pub async fn hello_world(_req: Request) -> Response {
    Response::text("Hello World")
}

/// Answer for paths no route matches.
pub(crate) fn not_found() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .text("404 page not found\n")
}
