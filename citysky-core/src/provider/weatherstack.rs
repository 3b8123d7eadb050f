use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::{ApiError, FetchError},
    model::{CurrentConditions, Location, Units, WeatherResult},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct WeatherstackProvider {
    api_key: String,
    base_url: String,
    units: Units,
    http: Client,
}

impl WeatherstackProvider {
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            units: Units::default(),
            http: Client::new(),
        }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// One GET against `endpoint`, returning the body of a 2xx response.
    async fn get(
        &self,
        endpoint: &str,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(endpoint, query, "sending weatherstack request");

        let res = self
            .http
            .get(&url)
            .query(&[("access_key", self.api_key.as_str()), ("query", query)])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to weatherstack ({endpoint})"))
            .map_err(FetchError::Network)?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read weatherstack {endpoint} response body"))
            .map_err(FetchError::Network)?;

        if !status.is_success() {
            return Err(FetchError::Network(anyhow!(
                "weatherstack {endpoint} request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for WeatherstackProvider {
    async fn current(&self, city: &str) -> Result<WeatherResult, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::Validation);
        }

        let body = self.get("current", city, &[("units", self.units.as_query())]).await?;
        let weather = parse_current(&body)?;

        info!(
            location = %weather.location.name,
            description = weather.description().unwrap_or_default(),
            "received current weather"
        );
        Ok(weather)
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let body = self.get("autocomplete", query, &[]).await?;
        let suggestions = parse_suggestions(&body)?;

        debug!(query, count = suggestions.len(), "received suggestions");
        Ok(suggestions)
    }
}

#[derive(Debug, Deserialize)]
struct WsCurrentResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct WsPlace {
    name: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WsSuggestion {
    Name(String),
    Place(WsPlace),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WsSuggestions {
    List(Vec<WsSuggestion>),
    Envelope {
        #[serde(default)]
        results: Option<Vec<WsSuggestion>>,
    },
}

impl WsSuggestion {
    fn into_display(self) -> String {
        match self {
            WsSuggestion::Name(name) => name,
            WsSuggestion::Place(place) => [Some(place.name), place.region, place.country]
                .into_iter()
                .flatten()
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// A truthy `error` member, or `"success": false`, marks a failed lookup.
fn api_error(success: Option<bool>, error: Option<Value>) -> Option<ApiError> {
    match error.filter(is_truthy) {
        Some(value @ Value::Object(_)) => Some(serde_json::from_value(value).unwrap_or_default()),
        Some(Value::String(info)) => Some(ApiError { info: Some(info), ..ApiError::default() }),
        Some(_) => Some(ApiError::default()),
        None if success == Some(false) => Some(ApiError::default()),
        None => None,
    }
}

/// `null`, `false`, `0` and `""` do not count as an error.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_current(body: &str) -> Result<WeatherResult, FetchError> {
    let parsed: Option<WsCurrentResponse> = serde_json::from_str(body)
        .context("Failed to parse weatherstack current JSON")
        .map_err(FetchError::Network)?;

    let Some(parsed) = parsed else {
        return Err(FetchError::NotFoundOrInvalid(None));
    };

    if let Some(err) = api_error(parsed.success, parsed.error) {
        debug!(error = %err, "weatherstack reported an error");
        return Err(FetchError::NotFoundOrInvalid(Some(err)));
    }

    match (parsed.location, parsed.current) {
        (Some(location), Some(current)) => Ok(WeatherResult { location, current }),
        _ => Err(FetchError::NotFoundOrInvalid(None)),
    }
}

fn parse_suggestions(body: &str) -> Result<Vec<String>, FetchError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(body)
        .context("Failed to parse weatherstack autocomplete JSON")
        .map_err(FetchError::Network)?;

    if let Value::Object(map) = &value {
        let success = map.get("success").and_then(Value::as_bool);
        if let Some(err) = api_error(success, map.get("error").cloned()) {
            return Err(FetchError::NotFoundOrInvalid(Some(err)));
        }
    }

    let parsed: Option<WsSuggestions> = serde_json::from_value(value)
        .context("Unexpected weatherstack autocomplete shape")
        .map_err(FetchError::Network)?;

    let entries = match parsed {
        Some(WsSuggestions::List(entries)) => entries,
        Some(WsSuggestions::Envelope { results }) => results.unwrap_or_default(),
        None => Vec::new(),
    };

    Ok(entries.into_iter().map(WsSuggestion::into_display).collect())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
