use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::RegmapError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the datasheet lives: a local file or an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLocator {
    Path(PathBuf),
    Url(Url),
}

impl DocumentLocator {
    /// Read the whole document into memory.
    pub fn load(&self) -> Result<Vec<u8>, RegmapError> {
        match self {
            Self::Path(path) => {
                if !path.is_file() {
                    return Err(RegmapError::InputNotFound(path.display().to_string()));
                }
                debug!(path = %path.display(), "reading local document");
                Ok(std::fs::read(path)?)
            }
            Self::Url(url) => fetch_document(url),
        }
    }
}

impl FromStr for DocumentLocator {
    type Err = RegmapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RegmapError::InputNotFound(
                "empty document locator".to_string(),
            ));
        }

        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Url(url)),
            _ => Ok(Self::Path(PathBuf::from(value))),
        }
    }
}

impl Display for DocumentLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

fn fetch_document(url: &Url) -> Result<Vec<u8>, RegmapError> {
    debug!(%url, "fetching remote document");
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|error| RegmapError::Fetch(error.to_string()))?;

    let response = client.get(url.clone()).send().map_err(|error| {
        if error.is_connect() || error.is_timeout() {
            RegmapError::InputNotFound(format!("{url} is unreachable: {error}"))
        } else {
            RegmapError::Fetch(error.to_string())
        }
    })?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(RegmapError::Fetch(format!(
            "failed to fetch {url}: status {status}"
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|error| RegmapError::Fetch(error.to_string()))?;
    if bytes.is_empty() {
        return Err(RegmapError::InputNotFound(format!(
            "{url} returned an empty body"
        )));
    }
    Ok(bytes.to_vec())
}
