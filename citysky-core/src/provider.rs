use crate::{Config, FetchError, WeatherResult, provider::weatherstack::WeatherstackProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherstack;

/// The two lookups the app performs against a weather data provider.
///
/// Both make at most one request per call and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`. An empty city is a [`FetchError::Validation`]
    /// and must not reach the network.
    async fn current(&self, city: &str) -> Result<WeatherResult, FetchError>;

    /// Display strings for cities matching `query`, in provider order.
    /// An empty query yields an empty list without a request.
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, FetchError>;
}

/// Construct the weatherstack provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.access_key()?;

    let provider = WeatherstackProvider::with_base_url(api_key.to_owned(), &config.base_url)
        .with_units(config.units);

    Ok(Arc::new(provider))
}
