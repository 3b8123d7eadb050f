//! State and transitions of the single lookup screen.
//!
//! A [`Session`] is owned by the view and mutated only through its methods. Suggestion
//! lookups run on a debounce timer and come back as [`SuggestionUpdate`] messages that
//! the view feeds to [`Session::apply_suggestions`] from its event loop.

use std::{sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::{
    FetchError, WeatherProvider, WeatherResult, animation::Animation, debounce::Debouncer,
};

/// Result of one settled suggestion lookup, tagged with the query it was made for.
#[derive(Debug)]
pub struct SuggestionUpdate {
    pub query: String,
    pub result: Result<Vec<String>, FetchError>,
}

/// Raises the loading flag for its lifetime, whichever way the fetch settles.
struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl<'a> LoadingGuard<'a> {
    fn raise(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

#[derive(Debug)]
pub struct Session {
    provider: Arc<dyn WeatherProvider>,
    query: String,
    suggestions: Vec<String>,
    weather: Option<WeatherResult>,
    loading: watch::Sender<bool>,
    debouncer: Debouncer,
    updates: mpsc::UnboundedSender<SuggestionUpdate>,
}

impl Session {
    /// Create a session and the receiving end for its suggestion updates.
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SuggestionUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let (loading, _) = watch::channel(false);

        let session = Self {
            provider,
            query: String::new(),
            suggestions: Vec::new(),
            weather: None,
            loading,
            debouncer: Debouncer::new(debounce),
            updates,
        };

        (session, rx)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn weather(&self) -> Option<&WeatherResult> {
        self.weather.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Observe the loading flag while a fetch borrows the session.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn animation(&self) -> Animation {
        Animation::for_weather(self.weather.as_ref())
    }

    pub fn has_pending_suggestions(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Record new query text and restart the suggestion timer.
    ///
    /// Blank text clears the suggestions and leaves nothing scheduled.
    pub fn on_query_change(&mut self, text: impl Into<String>) {
        self.query = text.into();

        if self.query.trim().is_empty() {
            self.debouncer.cancel();
            self.suggestions.clear();
            return;
        }

        let provider = Arc::clone(&self.provider);
        let updates = self.updates.clone();
        let query = self.query.clone();

        debug!(query = %query, delay = ?self.debouncer.delay(), "scheduling suggestion lookup");
        self.debouncer.schedule(async move {
            let result = provider.suggestions(&query).await;
            // The receiver is gone once the view has been discarded.
            let _ = updates.send(SuggestionUpdate { query, result });
        });
    }

    /// Apply a settled suggestion lookup. Failures are logged and otherwise ignored.
    pub fn apply_suggestions(&mut self, update: SuggestionUpdate) {
        if update.query != self.query {
            debug!(stale = %update.query, current = %self.query, "dropping stale suggestions");
            return;
        }

        match update.result {
            Ok(list) => self.suggestions = list,
            Err(err) => warn!(
                query = %update.query,
                kind = err.kind(),
                error = ?err,
                "suggestion lookup failed"
            ),
        }
    }

    /// Fetch current weather for the text typed so far.
    pub async fn submit(&mut self) -> Result<(), FetchError> {
        let city = self.query.clone();
        self.fetch_current(&city).await
    }

    /// Take `suggestion` as the query and fetch weather for it.
    pub async fn select_suggestion(&mut self, suggestion: &str) -> Result<(), FetchError> {
        self.debouncer.cancel();
        self.query = suggestion.to_string();
        self.suggestions.clear();

        self.fetch_current(suggestion).await
    }

    /// Fetch current weather for `city`, replacing the displayed result on success
    /// and clearing it on any fetch failure.
    pub async fn fetch_current(&mut self, city: &str) -> Result<(), FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::Validation);
        }

        info!(city, "fetching current weather");
        let outcome = {
            let _loading = LoadingGuard::raise(&self.loading);
            self.provider.current(city).await
        };

        match outcome {
            Ok(weather) => {
                self.weather = Some(weather);
                Ok(())
            }
            Err(err) => {
                warn!(city, kind = err.kind(), error = ?err, "current weather lookup failed");
                self.weather = None;
                Err(err)
            }
        }
    }
}
