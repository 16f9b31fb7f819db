//! Retrieval of the raw source document.
//!
//! A [`Source`] names where the document lives; [`Source::fetcher`] turns it
//! into something implementing [`Fetch`]. Fetching is a single blocking
//! operation with no retries.

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Something that can produce the raw bytes of a source document.
pub trait Fetch {
    /// Retrieves the document.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the document cannot be retrieved.
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

/// The location of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    /// An `http://` or `https://` URL.
    Url(String),

    /// A path on the local filesystem.
    Path(PathBuf),
}

impl Source {
    /// Builds the fetcher for this source.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be constructed.
    pub fn fetcher(&self) -> Result<Box<dyn Fetch>, FetchError> {
        Ok(match self {
            Self::Url(url) => Box::new(HttpFetcher::new(url.clone())?),
            Self::Path(path) => Box::new(FileFetcher::new(path.clone())),
        })
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches a document over HTTP(S).
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    /// Creates a fetcher for the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be constructed.
    pub fn new(url: String) -> Result<Self, FetchError> {
        let client = Client::builder().build().map_err(FetchError::Client)?;
        Ok(Self { client, url })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        info!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(
                USER_AGENT,
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .map_err(|source| FetchError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|source| FetchError::Transport {
            url: self.url.clone(),
            source,
        })?;
        debug!("Received {} bytes", bytes.len());

        Ok(bytes.to_vec())
    }
}

/// Reads a document from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    /// Creates a fetcher for the given path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path this fetcher reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        info!("Reading {}", self.path.display());

        std::fs::read(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Errors that can occur while retrieving the source document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("failed to construct HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request failed in transit.
    #[error("request to {url} failed")]
    Transport {
        /// The requested URL.
        url: String,
        /// The underlying transport error.
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The local file could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("http://nvd.nist.gov/controls.xml", true; "http")]
    #[test_case("https://nvd.nist.gov/controls.xml", true; "https")]
    #[test_case("/data/controls.xml", false; "absolute path")]
    #[test_case("controls.xml", false; "relative path")]
    fn source_kind(input: &str, is_url: bool) {
        assert_eq!(matches!(Source::from(input), Source::Url(_)), is_url);
        assert_eq!(Source::from(input).to_string(), input);
    }

    #[test]
    fn file_fetcher_reads_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("controls.xml");
        std::fs::write(&path, b"<controls/>").unwrap();

        let bytes = FileFetcher::new(path).fetch().unwrap();
        assert_eq!(bytes, b"<controls/>");
    }

    #[test]
    fn file_fetcher_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = FileFetcher::new(tmp.path().join("missing.xml"));

        let error = fetcher.fetch().unwrap_err();
        assert!(matches!(error, FetchError::Io { .. }));
    }

    #[test]
    fn path_source_builds_file_fetcher() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("controls.xml");
        std::fs::write(&path, b"bytes").unwrap();

        let fetcher = Source::Path(path).fetcher().unwrap();
        assert_eq!(fetcher.fetch().unwrap(), b"bytes");
    }

    /// Serves `response` to a single connection on a local port and returns
    /// the URL to request.
    fn serve_once(response: &'static str) -> (String, std::thread::JoinHandle<()>) {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });

        (format!("http://{addr}/800-53-controls.xml"), handle)
    }

    /// An HTTP fetcher that ignores any proxy configured in the environment.
    fn local_fetcher(url: String) -> HttpFetcher {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpFetcher { client, url }
    }

    #[test]
    fn http_fetcher_returns_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\n<controls/>",
        );

        let bytes = local_fetcher(url).fetch().unwrap();
        server.join().unwrap();

        assert_eq!(bytes, b"<controls/>");
    }

    #[test]
    fn http_fetcher_non_success_status_fails() {
        let (url, server) =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

        let error = local_fetcher(url.clone()).fetch().unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            error,
            FetchError::Status { url: ref u, status: 404 } if *u == url
        ));
    }
}
