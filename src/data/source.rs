use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Anything that can hand back the raw body of a named dataset file.
pub trait Fetch: Send + Sync {
    fn fetch(&self, file: &str) -> Result<String, FetchError>;
}

/// Where dataset files live: a static web root or a local directory.
pub enum DataSource {
    Http {
        base_url: String,
        client: reqwest::blocking::Client,
    },
    Directory(PathBuf),
}

impl DataSource {
    pub fn from_arg(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let client = reqwest::blocking::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .context("failed to build HTTP client")?;
            Ok(Self::Http {
                base_url: location.trim_end_matches('/').to_owned(),
                client,
            })
        } else {
            Ok(Self::Directory(PathBuf::from(location)))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http { base_url, .. } => base_url.clone(),
            Self::Directory(root) => root.display().to_string(),
        }
    }
}

impl Fetch for DataSource {
    fn fetch(&self, file: &str) -> Result<String, FetchError> {
        match self {
            Self::Http { base_url, client } => {
                let url = format!("{base_url}/{file}");
                let response = client.get(&url).send().map_err(|source| FetchError::Transport {
                    url: url.clone(),
                    source,
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }

                response
                    .text()
                    .map_err(|source| FetchError::Transport { url, source })
            }
            Self::Directory(root) => {
                let path = root.join(file);
                fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
            }
        }
    }
}
