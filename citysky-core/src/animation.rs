//! Maps a weather description to the decorative animation shown next to the report.

use crate::model::WeatherResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animation {
    Sunny,
    Cloudy,
    Rain,
    Haze,
    Clear,
    Overcast,
    Unknown,
}

/// Substrings tested against the description, highest priority first.
const PRIORITY: &[(&str, Animation)] = &[
    ("sunny", Animation::Sunny),
    ("cloudy", Animation::Cloudy),
    ("rain", Animation::Rain),
    ("haze", Animation::Haze),
    ("clear", Animation::Clear),
    ("overcast", Animation::Overcast),
];

impl Animation {
    /// First substring hit in [`PRIORITY`] order wins, so "Clear, Overcast" is `Clear`.
    pub fn for_description(description: &str) -> Self {
        let description = description.to_lowercase();

        PRIORITY
            .iter()
            .find(|(needle, _)| description.contains(needle))
            .map(|(_, animation)| *animation)
            .unwrap_or(Animation::Unknown)
    }

    pub fn for_weather(weather: Option<&WeatherResult>) -> Self {
        weather
            .and_then(WeatherResult::description)
            .map(Self::for_description)
            .unwrap_or(Animation::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Animation::Sunny => "sunny",
            Animation::Cloudy => "cloudy",
            Animation::Rain => "rain",
            Animation::Haze => "haze",
            Animation::Clear => "clear",
            Animation::Overcast => "overcast",
            Animation::Unknown => "unknown",
        }
    }

    /// Lottie asset rendered for this condition.
    pub fn uri(&self) -> &'static str {
        match self {
            Animation::Sunny => {
                "https://lottie.host/3f79a6f8-8cb7-40f7-8320-d281fc4c5528/ZHKGzlc2iP.lottie"
            }
            Animation::Cloudy => {
                "https://lottie.host/79c6c9b9-8381-4657-ba9b-9601d424dadb/94lAfKZ6Mn.lottie"
            }
            Animation::Rain => {
                "https://lottie.host/240c1a45-c02f-457c-a7cf-50ab8e183fdf/nyPgKnjxwI.lottie"
            }
            Animation::Haze => {
                "https://lottie.host/5c524a2e-680c-4596-b818-f0dee4d8c690/GjrRCwqAIq.lottie"
            }
            Animation::Clear => {
                "https://lottie.host/47146ca7-47fd-4435-ad68-6314f616b50c/GcpqOMqyd8.lottie"
            }
            Animation::Overcast => {
                "https://lottie.host/a6987e47-96f7-4dbc-8eba-c23634ba4c23/yawL2IUOAP.lottie"
            }
            Animation::Unknown => "https://assets.lottiefiles.com/packages/lf20_default.json",
        }
    }
}

impl std::fmt::Display for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, Location};

    fn weather_with(descriptions: &[&str]) -> WeatherResult {
        WeatherResult {
            location: Location {
                name: "Oslo".into(),
                region: "Oslo".into(),
                localtime: "2024-01-10 09:00".into(),
                country: None,
                timezone_id: None,
            },
            current: CurrentConditions {
                temperature: -4.0,
                weather_descriptions: descriptions.iter().map(|d| d.to_string()).collect(),
                feelslike: -9.0,
                observation_time: "08:00 AM".into(),
                humidity: 80,
                weather_icons: vec![],
                wind_speed: None,
                wind_dir: None,
                pressure: None,
                uv_index: None,
                visibility: None,
            },
        }
    }

    #[test]
    fn substring_match_inside_a_phrase() {
        assert_eq!(Animation::for_description("Partly Cloudy"), Animation::Cloudy);
        assert_eq!(Animation::for_description("Light Rain Shower"), Animation::Rain);
        assert_eq!(Animation::for_description("Sunny"), Animation::Sunny);
    }

    #[test]
    fn unmatched_description_falls_back_to_unknown() {
        assert_eq!(Animation::for_description("Mist"), Animation::Unknown);
        assert_eq!(Animation::for_description(""), Animation::Unknown);
    }

    #[test]
    fn priority_order_decides_between_several_hits() {
        assert_eq!(Animation::for_description("Clear, Overcast"), Animation::Clear);
        assert_eq!(Animation::for_description("overcast then clear"), Animation::Clear);
        assert_eq!(Animation::for_description("Haze with rain"), Animation::Rain);
        assert_eq!(Animation::for_description("sunny but cloudy"), Animation::Sunny);
    }

    #[test]
    fn weather_uses_first_description() {
        let weather = weather_with(&["Overcast", "Sunny"]);
        assert_eq!(Animation::for_weather(Some(&weather)), Animation::Overcast);
    }

    #[test]
    fn no_weather_or_no_description_is_unknown() {
        assert_eq!(Animation::for_weather(None), Animation::Unknown);
        assert_eq!(Animation::for_weather(Some(&weather_with(&[]))), Animation::Unknown);
        assert!(Animation::Unknown.uri().ends_with("lf20_default.json"));
    }
}
