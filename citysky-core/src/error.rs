use serde::Deserialize;
use thiserror::Error;

/// Error object weatherstack embeds in an otherwise successful response,
/// e.g. `{"success": false, "error": {"code": 615, "type": "request_failed", "info": "..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.kind, &self.info) {
            (_, _, Some(info)) => f.write_str(info),
            (Some(code), Some(kind), None) => write!(f, "{kind} ({code})"),
            (None, Some(kind), None) => f.write_str(kind),
            (Some(code), None, None) => write!(f, "error code {code}"),
            (None, None, None) => f.write_str("unspecified provider error"),
        }
    }
}

/// Outcome of a failed lookup. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Explicit submit with an empty city name. Raised before any request is sent.
    #[error("Please enter a city name!")]
    Validation,

    /// The provider answered, but with an error indicator or without the
    /// location/current-conditions data.
    #[error("City not found or invalid response. Please try again!")]
    NotFoundOrInvalid(Option<ApiError>),

    /// Transport failure, non-2xx status or undecodable body.
    #[error("Unable to fetch weather. Please try again later.")]
    Network(#[source] anyhow::Error),
}

impl FetchError {
    /// Short machine-friendly name, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Validation => "validation",
            FetchError::NotFoundOrInvalid(_) => "not_found_or_invalid",
            FetchError::Network(_) => "network",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages() {
        assert_eq!(FetchError::Validation.to_string(), "Please enter a city name!");
        assert!(FetchError::NotFoundOrInvalid(None).to_string().contains("City not found"));
        let err = FetchError::Network(anyhow::anyhow!("connection refused"));
        assert!(err.to_string().contains("Unable to fetch weather"));
    }

    #[test]
    fn network_error_keeps_its_cause() {
        let err = FetchError::Network(anyhow::anyhow!("connection refused"));
        let source = std::error::Error::source(&err).expect("source must be kept");
        assert_eq!(source.to_string(), "connection refused");
    }

    #[test]
    fn api_error_prefers_info_text() {
        let err: ApiError = serde_json::from_str(
            r#"{"code": 615, "type": "request_failed", "info": "Your API request failed."}"#,
        )
        .unwrap();
        assert_eq!(err.code, Some(615));
        assert_eq!(err.to_string(), "Your API request failed.");

        let bare = ApiError { code: Some(101), kind: Some("invalid_access_key".into()), info: None };
        assert_eq!(bare.to_string(), "invalid_access_key (101)");
    }
}
