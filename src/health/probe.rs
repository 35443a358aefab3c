// ABOUTME: Single-request HTTP probe used by the health gate.
// ABOUTME: HyperProbe speaks HTTP/1.1 over a plain tokio TCP connection.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::Uri;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid health url {0}")]
    InvalidUrl(String),

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
}

/// Issues one GET and reports the response status.
///
/// Implementations need not bound their own latency; the gate does that.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, url: &Uri) -> Result<u16, ProbeError>;
}

#[async_trait]
impl<T: HttpProbe + ?Sized> HttpProbe for &T {
    async fn get(&self, url: &Uri) -> Result<u16, ProbeError> {
        (**self).get(url).await
    }
}

/// Plain `http://` probe. A fresh connection per request, no redirects followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperProbe;

#[async_trait]
impl HttpProbe for HyperProbe {
    async fn get(&self, url: &Uri) -> Result<u16, ProbeError> {
        let host = url
            .host()
            .ok_or_else(|| ProbeError::InvalidUrl(url.to_string()))?;
        let port = url.port_u16().unwrap_or(80);
        let addr = format!("{host}:{port}");

        let stream = TcpStream::connect((host.trim_start_matches('[').trim_end_matches(']'), port))
            .await
            .map_err(|source| ProbeError::Connect {
                addr: addr.clone(),
                source,
            })?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("health probe connection error: {}", e);
            }
        });

        let path = url.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        let authority = url.authority().map(|a| a.as_str()).unwrap_or(host);

        let req = hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri(path)
            .header(hyper::header::HOST, authority)
            .header(hyper::header::USER_AGENT, concat!("hl/", env!("CARGO_PKG_VERSION")))
            .body(Empty::<Bytes>::new())?;

        let resp = sender.send_request(req).await?;
        let status = resp.status().as_u16();

        // Classification needs only the status line. A slow body must not
        // count against the request bound.
        let body = resp.into_body();
        tokio::spawn(async move {
            if let Err(e) = body.collect().await {
                tracing::debug!("health probe body error: {}", e);
            }
        });

        Ok(status)
    }
}
