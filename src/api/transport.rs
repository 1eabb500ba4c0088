//! HTTP transport to the runtime API
//!
//! Two modes: plain HTTP over TCP (reqwest), or HTTP/1.1 carried over a
//! local unix socket, which HTTP clients generally cannot dial, so the
//! exchange is performed directly on the stream.

use crate::api::ApiErrorBody;
use crate::config::{ClientConfig, Endpoint};
use crate::error::{Result, VolcpError};
use serde::de::DeserializeOwned;
#[cfg(unix)]
use std::path::PathBuf;

/// Connection to the runtime API
#[derive(Debug, Clone)]
pub enum Transport {
    /// HTTP over TCP
    Tcp {
        /// `protocol://host:port`
        base_url: String,
        /// Shared HTTP client
        client: reqwest::Client,
    },
    /// HTTP/1.1 over a local unix socket
    #[cfg(unix)]
    Socket {
        /// Socket path, e.g. /var/run/docker.sock
        path: PathBuf,
    },
}

impl Transport {
    /// Build a transport from a validated client configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        match &config.endpoint {
            Endpoint::Tcp {
                protocol,
                host,
                port,
            } => Ok(Self::Tcp {
                base_url: format!("{protocol}://{host}:{port}"),
                client: reqwest::Client::new(),
            }),
            #[cfg(unix)]
            Endpoint::Socket { path } => Ok(Self::Socket { path: path.clone() }),
            #[cfg(not(unix))]
            Endpoint::Socket { .. } => Err(VolcpError::UnsupportedPlatform(
                "unix socket endpoints require a unix host".to_string(),
            )),
        }
    }

    /// Issue a GET against `endpoint` (e.g. `/volumes/data`) and decode the
    /// JSON response. Non-success statuses are mapped to
    /// [`VolcpError::Api`] using the runtime's `{"message": …}` payload.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let (status, body) = self.get_raw(endpoint).await?;
        if status != 200 {
            let message = serde_json::from_slice::<ApiErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(VolcpError::api(status, message));
        }
        serde_json::from_slice(&body)
            .map_err(|e| VolcpError::api(status, format!("invalid response body: {e}")))
    }

    /// Check that the runtime answers on its health endpoint
    pub async fn ping(&self) -> Result<()> {
        let (status, body) = self.get_raw("/_ping").await?;
        if status == 200 {
            Ok(())
        } else {
            Err(VolcpError::api(
                status,
                String::from_utf8_lossy(&body).into_owned(),
            ))
        }
    }

    async fn get_raw(&self, endpoint: &str) -> Result<(u16, Vec<u8>)> {
        match self {
            Self::Tcp { base_url, client } => {
                let url = format!("{base_url}{endpoint}");
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| VolcpError::connection(base_url.clone(), e.to_string()))?;
                let status = response.status().as_u16();
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| VolcpError::connection(base_url.clone(), e.to_string()))?;
                Ok((status, body.to_vec()))
            }
            #[cfg(unix)]
            Self::Socket { path } => socket_get(path, endpoint).await,
        }
    }
}

#[cfg(unix)]
async fn socket_get(path: &std::path::Path, endpoint: &str) -> Result<(u16, Vec<u8>)> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let display = path.display().to_string();
    let mut stream = tokio::net::UnixStream::connect(path)
        .await
        .map_err(|e| VolcpError::connection(display.clone(), e.to_string()))?;

    let request = format!(
        "GET {endpoint} HTTP/1.1\r\nHost: localhost\r\nAccept: application/json\r\nConnection: close\r\n\r\n"
    );
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| VolcpError::connection(display.clone(), e.to_string()))?;

    let mut raw = Vec::new();
    stream
        .read_to_end(&mut raw)
        .await
        .map_err(|e| VolcpError::connection(display.clone(), e.to_string()))?;

    parse_response(&raw).map_err(|message| VolcpError::connection(display, message))
}

/// Parse a raw HTTP/1.1 response into (status, body), decoding a chunked
/// transfer encoding if the server used one.
fn parse_response(raw: &[u8]) -> std::result::Result<(u16, Vec<u8>), String> {
    let header_end = find_subsequence(raw, b"\r\n\r\n")
        .ok_or_else(|| "malformed response: missing header terminator".to_string())?;
    let head = std::str::from_utf8(&raw[..header_end])
        .map_err(|_| "malformed response: non-utf8 headers".to_string())?;
    let body = &raw[header_end + 4..];

    let mut lines = head.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| "malformed response: empty".to_string())?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| format!("malformed status line: {status_line}"))?;

    let chunked = lines.any(|line| {
        let lower = line.to_ascii_lowercase();
        lower.starts_with("transfer-encoding:") && lower.contains("chunked")
    });

    let body = if chunked {
        decode_chunked(body)?
    } else {
        body.to_vec()
    };
    Ok((status, body))
}

fn decode_chunked(mut body: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut decoded = Vec::new();
    loop {
        let line_end = find_subsequence(body, b"\r\n")
            .ok_or_else(|| "malformed chunk: missing size line".to_string())?;
        let size_str = std::str::from_utf8(&body[..line_end])
            .map_err(|_| "malformed chunk size".to_string())?;
        let size = usize::from_str_radix(size_str.trim(), 16)
            .map_err(|_| format!("malformed chunk size: {size_str}"))?;
        body = &body[line_end + 2..];
        if size == 0 {
            return Ok(decoded);
        }
        if body.len() < size + 2 {
            return Err("truncated chunk".to_string());
        }
        decoded.extend_from_slice(&body[..size]);
        body = &body[size + 2..];
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;

    #[test]
    fn test_parse_plain_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}";
        let (status, body) = parse_response(raw).unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, b"{}");
    }

    #[test]
    fn test_parse_chunked_response() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\n{\"a\r\n3\r\n\":1\r\n1\r\n}\r\n0\r\n\r\n";
        let (status, body) = parse_response(raw).unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, b"{\"a\":1}");
    }

    #[test]
    fn test_parse_error_status() {
        let raw = b"HTTP/1.1 404 Not Found\r\n\r\n{\"message\":\"no such volume\"}";
        let (status, body) = parse_response(raw).unwrap();
        assert_eq!(status, 404);
        assert!(std::str::from_utf8(&body).unwrap().contains("no such volume"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_response(b"not http at all").is_err());
        assert!(parse_response(b"HTTP/1.1 abc\r\n\r\n").is_err());
    }

    #[test]
    fn test_tcp_transport_from_config() {
        let config = ClientConfig::default();
        let transport = Transport::from_config(&config).unwrap();
        match transport {
            Transport::Tcp { base_url, .. } => assert_eq!(base_url, "http://localhost:2375"),
            #[cfg(unix)]
            Transport::Socket { .. } => panic!("expected tcp transport"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_socket_get_against_local_server() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let dir = tempfile::TempDir::new().unwrap();
        let sock = dir.path().join("api.sock");
        let listener = tokio::net::UnixListener::bind(&sock).unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let n = stream.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"ok\":true}",
                )
                .await
                .unwrap();
            request
        });

        let (status, body) = socket_get(&sock, "/volumes/data").await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, b"{\"ok\":true}");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /volumes/data HTTP/1.1\r\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_socket_connection_refused() {
        let config = ClientConfig {
            endpoint: crate::config::Endpoint::Socket {
                path: "/nonexistent/api.sock".into(),
            },
            platform: Some(Platform::Linux),
        };
        let transport = Transport::from_config(&config).unwrap();
        let err = transport
            .get_json::<serde_json::Value>("/volumes/x")
            .await
            .unwrap_err();
        assert!(matches!(err, VolcpError::Connection { .. }));
    }
}
