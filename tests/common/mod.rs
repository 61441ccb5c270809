//! Shared helpers: a recording mock forward proxy and a gateway launcher.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use sccgate::proxy::DEFAULT_BACKEND_URL;
use sccgate::{Error, Server, Upstream, routes};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// What the mock proxy received for one request.
#[derive(Clone, Debug)]
pub struct Seen {
    pub method: Method,
    /// Absolute-form target, e.g. `http://http-host:8001/j`.
    pub uri: String,
    pub headers: HeaderMap,
}

pub struct MockProxy {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockProxy {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Waits until at least `n` requests have arrived.
    pub async fn wait_for(&self, n: usize) {
        for _ in 0..200 {
            if self.seen.lock().unwrap().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("mock proxy never saw {n} request(s)");
    }
}

/// Starts a forward proxy stand-in that records each request and answers
/// it with `status` and `body` after `delay`.
pub async fn start_mock_proxy(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> MockProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let recorder = Arc::clone(&seen);
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };

            let recorder = Arc::clone(&recorder);
            tokio::spawn(async move {
                let svc = service_fn(move |req: hyper::Request<Incoming>| {
                    let recorder = Arc::clone(&recorder);
                    async move {
                        recorder.lock().unwrap().push(Seen {
                            method: req.method().clone(),
                            uri: req.uri().to_string(),
                            headers: req.headers().clone(),
                        });
                        tokio::time::sleep(delay).await;

                        let body = Full::new(Bytes::from_static(body.as_bytes()));
                        let mut res = hyper::Response::new(body);
                        *res.status_mut() = status;
                        res.headers_mut().insert("content-type", "text/xml".parse().unwrap());
                        Ok::<_, Infallible>(res)
                    }
                });
                let _ = http1::Builder::new().serve_connection(TokioIo::new(stream), svc).await;
            });
        }
    });

    MockProxy { addr, seen }
}

/// Starts a proxy stand-in that promises a 100-byte body, sends a few
/// bytes of it, and hangs up.
pub async fn start_truncating_proxy() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };

            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"partial\"")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// A loopback address nothing is listening on.
pub fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub struct Gateway {
    pub addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), Error>>,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Fires the stop signal and hands back the task running `start`.
    pub fn stop(self) -> JoinHandle<Result<(), Error>> {
        let _ = self.stop.send(());
        self.handle
    }
}

/// Runs the full route table against the default backend, forwarding
/// through `proxy_url`.
pub async fn start_gateway(proxy_url: &str, shutdown_timeout: Duration) -> Gateway {
    let addr = free_addr();
    let upstream = Upstream::new(
        DEFAULT_BACKEND_URL.parse().unwrap(),
        proxy_url.parse().unwrap(),
    )
    .unwrap();

    let server = Server::new(&addr.to_string())
        .unwrap()
        .with_shutdown_timeout(shutdown_timeout);
    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.start(routes::router(Arc::new(upstream)), async {
        let _ = stopped.await;
    }));

    wait_until_listening(addr).await;
    Gateway { addr, stop, handle }
}

async fn wait_until_listening(addr: SocketAddr) {
    for _ in 0..200 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("gateway never started listening on {addr}");
}

/// Inbound client that ignores any proxy settings in the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
