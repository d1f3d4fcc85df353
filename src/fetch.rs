use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::FetchConfig;

/// Error taxonomy for the fetch stage. Callers branch on the kind instead of
/// parsing messages: a `Status` or `Transport` failure means the publish stage
/// must not run.
#[derive(Debug)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    Status { status: reqwest::StatusCode, url: String },
    /// DNS, connect, timeout, or any other transport-level failure.
    Transport(reqwest::Error),
    /// Writing the fetched body to disk failed.
    Io(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { status, url } => {
                write!(f, "fetch of {url} returned HTTP {status}")
            }
            FetchError::Transport(e) => write!(f, "fetch transport error: {e}"),
            FetchError::Io(e) => write!(f, "failed to save fetched page: {e}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Status { .. } => None,
            FetchError::Transport(e) => Some(e),
            FetchError::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}

/// What the fetch stage produced: the saved file and its size.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Fetches the configured URL and saves the body text to the configured path,
/// overwriting any prior content. On a non-success status nothing is written.
pub async fn fetch_page(config: &FetchConfig) -> Result<FetchReport, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(FetchError::Transport)?;

    info!(url = %config.url, "Fetching page");
    let response = client
        .get(&config.url)
        .send()
        .await
        .map_err(FetchError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        error!(status = %status, url = %config.url, "Fetch returned error status");
        return Err(FetchError::Status {
            status,
            url: config.url.clone(),
        });
    }

    // text() honors the response charset and falls back to lossy UTF-8,
    // matching the original workflow's text decoding.
    let body = response.text().await.map_err(FetchError::Transport)?;
    fs::write(&config.output_path, &body)?;

    info!(
        url = %config.url,
        path = %config.output_path.display(),
        bytes = body.len(),
        "Saved fetched page"
    );
    Ok(FetchReport {
        path: config.output_path.clone(),
        bytes: body.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use std::time::Duration;

    fn config_for(url: &str, output: &std::path::Path) -> FetchConfig {
        FetchConfig {
            url: url.to_string(),
            output_path: output.to_path_buf(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn invalid_url_is_a_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("index.html");
        let config = config_for("not a url", &out);

        let err = fetch_page(&config).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got: {err:?}");
        assert!(!out.exists(), "no file may be written on transport failure");
    }

    #[test]
    fn status_error_display_names_url_and_code() {
        let err = FetchError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            url: "https://example.com".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com"), "got: {msg}");
        assert!(msg.contains("404"), "got: {msg}");
    }

    #[test]
    fn io_error_converts_via_from() {
        let err: FetchError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
