use crate::content::SaveId;
use thiserror::Error;

/// Errors produced by the extractor, the save store and the backends
#[derive(Debug, Error)]
pub enum Error {
    /// A required request field was missing or empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// No saved entry carries the requested id
    #[error("Content with id {0} not found")]
    NotFound(SaveId),

    /// The page could not be fetched
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The page was fetched but held nothing readable
    #[error("no readable content found at {0}")]
    NoContent(String),

    /// A server answered with an `{error}` body or a non-2xx status
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    /// A server answered with something that is not the expected JSON
    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Error::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status this error corresponds to on the wire
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingField(_) | Error::Url(_) => 400,
            Error::NotFound(_) => 404,
            Error::Fetch { .. } | Error::NoContent(_) | Error::Protocol(_) | Error::Http(_) => 502,
            Error::Api { status, .. } => *status,
            Error::Pattern(_) | Error::Io(_) | Error::Json(_) => 500,
        }
    }

    /// Body a server sends back for this error
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MissingField("URL").status_code(), 400);
        assert_eq!(Error::NotFound(SaveId(3)).status_code(), 404);
        assert_eq!(Error::fetch("https://a.example", "timeout").status_code(), 502);
        let api = Error::Api {
            status: 418,
            message: "teapot".into(),
        };
        assert_eq!(api.status_code(), 418);
    }

    #[test]
    fn test_error_body() {
        let body = Error::NotFound(SaveId(7)).to_body();
        assert_eq!(body["error"], "Content with id 7 not found");
        assert_eq!(Error::MissingField("URL").to_string(), "URL is required");
    }
}
