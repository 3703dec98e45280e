use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;
use url::Url;

use crate::error::FetchError;

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; G2ProductScraper/1.0)";

/// Where an input line points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl Source {
    /// http(s) URLs win; otherwise the string must name an existing file.
    pub fn resolve(raw: &str) -> Result<Self, FetchError> {
        if let Ok(url) = Url::parse(raw) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(Source::Remote(url));
            }
        }
        let path = Path::new(raw);
        if path.exists() {
            Ok(Source::Local(path.to_path_buf()))
        } else {
            Err(FetchError::Unresolvable(raw.to_string()))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }
}

pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, source: &Source) -> Result<String, FetchError> {
        match source {
            Source::Remote(url) => {
                let http_err = |source| FetchError::Http {
                    url: url.to_string(),
                    source,
                };
                let resp = self.client.get(url.clone()).send().await.map_err(http_err)?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                let body = resp.text().await.map_err(http_err)?;
                debug!("Fetched {} ({} bytes)", url, body.len());
                Ok(body)
            }
            Source::Local(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Local HTTP server: `/products/...` answers 200 with `page`, anything
    /// else 404. Returns the base URL and the user agents it has seen.
    pub(crate) async fn serve(page: String) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let agents = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&agents);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let agent = request.lines().find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("user-agent")
                        .then(|| value.trim().to_string())
                });
                seen.lock().unwrap().extend(agent);

                let (status, body) = if path.starts_with("/products/") {
                    ("200 OK", page.as_str())
                } else {
                    ("404 Not Found", "not found")
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (base, agents)
    }

    fn remote(url: &str) -> Source {
        Source::resolve(url).unwrap()
    }

    #[test]
    fn resolves_http_and_https() {
        for raw in ["http://www.g2.com/products/acme/reviews", "https://www.g2.com/x"] {
            assert!(Source::resolve(raw).unwrap().is_remote(), "{raw}");
        }
    }

    #[test]
    fn resolves_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let raw = file.path().to_str().unwrap();
        assert_eq!(
            Source::resolve(raw).unwrap(),
            Source::Local(file.path().to_path_buf())
        );
    }

    #[test]
    fn other_schemes_and_missing_paths_are_unresolvable() {
        for raw in ["ftp://example.com/page.html", "no/such/page.html"] {
            let err = Source::resolve(raw).unwrap_err();
            assert!(matches!(err, FetchError::Unresolvable(_)), "{raw}");
            assert!(err.to_string().contains("as URL or file path"));
        }
    }

    #[tokio::test]
    async fn reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<h1>Acme</h1>").unwrap();

        let fetcher = Fetcher::new(Duration::from_secs(1)).unwrap();
        let html = fetcher.fetch(&Source::Local(path)).await.unwrap();
        assert_eq!(html, "<h1>Acme</h1>");
    }

    #[tokio::test]
    async fn non_utf8_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let fetcher = Fetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch(&Source::Local(path)).await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn remote_fetch_sends_user_agent() {
        let (base, agents) = serve("<h1>Acme</h1>".to_string()).await;
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();

        let html = fetcher
            .fetch(&remote(&format!("{base}/products/acme/reviews")))
            .await
            .unwrap();
        assert_eq!(html, "<h1>Acme</h1>");
        assert_eq!(*agents.lock().unwrap(), [USER_AGENT]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _) = serve(String::new()).await;
        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();

        let err = fetcher
            .fetch(&remote(&format!("{base}/gone")))
            .await
            .unwrap_err();
        match err {
            FetchError::Status { url, status } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert!(url.ends_with("/gone"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
