// packages/responsemock/tests/common/mod.rs
//! Shared helpers for integration tests

#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::convert::Infallible;
use std::io::Read;
use std::net::SocketAddr;
use std::thread::JoinHandle;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Stand-in for a real remote service: answers every request with
/// `302 Found`, an `x-real: yes` header and `real <METHOD> <PATH>`
pub struct RealServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl RealServer {
    pub fn start() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let listener = TcpListener::from_std(listener).unwrap();
                loop {
                    tokio::select! {
                        _ = &mut shutdown_rx => break,
                        accepted = listener.accept() => {
                            let Ok((stream, _)) = accepted else { continue };
                            tokio::spawn(async move {
                                let service = service_fn(|req: Request<Incoming>| async move {
                                    let body = format!("real {} {}", req.method(), req.uri().path());
                                    let mut response = Response::new(Full::new(Bytes::from(body)));
                                    *response.status_mut() = StatusCode::FOUND;
                                    response
                                        .headers_mut()
                                        .insert("x-real", HeaderValue::from_static("yes"));
                                    Ok::<_, Infallible>(response)
                                });
                                let _ = http1::Builder::new()
                                    .serve_connection(TokioIo::new(stream), service)
                                    .await;
                            });
                        }
                    }
                }
            });
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RealServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Client sending every request through `proxy_url`
pub fn proxied_client(proxy_url: &str) -> Client {
    Client::builder()
        .proxy(reqwest::Proxy::http(proxy_url).unwrap())
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// Client ignoring any proxy configuration
pub fn direct_client() -> Client {
    Client::builder()
        .no_proxy()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// Read an HTTP response head, up to and including the blank line
pub fn read_head(stream: &mut std::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if stream.read(&mut byte).unwrap() == 0 {
            break;
        }
        head.push(byte[0]);
    }
    String::from_utf8_lossy(&head).into_owned()
}
