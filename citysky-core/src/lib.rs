//! Core library for the `citysky` weather lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weatherstack provider behind the `WeatherProvider` seam
//! - Debounced suggestion lookups and the lookup-screen session state
//! - Shared domain models and the condition-to-animation mapping
//!
//! It is used by `citysky-cli`, but can also back other front ends.

pub mod animation;
pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod provider;
pub mod session;

pub use animation::Animation;
pub use config::Config;
pub use error::{ApiError, FetchError};
pub use model::{CurrentConditions, Location, Units, WeatherResult};
pub use provider::{WeatherProvider, provider_from_config, weatherstack::WeatherstackProvider};
pub use session::{Session, SuggestionUpdate};
