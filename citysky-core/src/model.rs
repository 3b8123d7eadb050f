use serde::{Deserialize, Serialize};

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Fahrenheit,
    Scientific,
}

impl Units {
    /// Value of weatherstack's `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "m",
            Units::Fahrenheit => "f",
            Units::Scientific => "s",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Fahrenheit => "°F",
            Units::Scientific => "K",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Fahrenheit => "fahrenheit",
            Units::Scientific => "scientific",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Fahrenheit, Units::Scientific]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" | "m" => Ok(Units::Metric),
            "fahrenheit" | "f" => Ok(Units::Fahrenheit),
            "scientific" | "s" => Ok(Units::Scientific),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, fahrenheit, scientific."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub localtime: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    #[serde(default)]
    pub weather_descriptions: Vec<String>,
    pub feelslike: f64,
    #[serde(default)]
    pub observation_time: String,
    pub humidity: u8,
    #[serde(default)]
    pub weather_icons: Vec<String>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_dir: Option<String>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
    #[serde(default)]
    pub visibility: Option<f64>,
}

/// A successful current-weather lookup. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub location: Location,
    pub current: CurrentConditions,
}

impl WeatherResult {
    /// The first condition description, which drives both the headline and the animation.
    pub fn description(&self) -> Option<&str> {
        self.current.weather_descriptions.first().map(String::as_str)
    }

    pub fn report(&self, units: Units) -> WeatherReport<'_> {
        WeatherReport { weather: self, units }
    }
}

/// Human-readable rendering of a [`WeatherResult`], one field per line.
#[derive(Debug, Clone, Copy)]
pub struct WeatherReport<'a> {
    weather: &'a WeatherResult,
    units: Units,
}

impl WeatherReport<'_> {
    pub fn lines(&self) -> Vec<String> {
        let WeatherResult { location, current } = self.weather;
        let unit = self.units.temperature_suffix();

        let mut lines = vec![
            format!("{}: {}{unit}", location.name, current.temperature),
            self.weather.description().unwrap_or("unknown").to_uppercase(),
            format!("Feelslike: {}{unit}", current.feelslike),
            format!("Last Checked Time: {}", current.observation_time),
            format!("Region: {}", location.region),
            format!("Humidity: {}", current.humidity),
            format!("Local Time: {}", location.localtime),
        ];

        if let Some(country) = &location.country {
            lines.push(format!("Country: {country}"));
        }
        if let Some(zone) = &location.timezone_id {
            lines.push(format!("Timezone: {zone}"));
        }
        if let Some(speed) = current.wind_speed {
            match &current.wind_dir {
                Some(dir) => lines.push(format!("Wind: {speed} {dir}")),
                None => lines.push(format!("Wind: {speed}")),
            }
        }
        if let Some(pressure) = current.pressure {
            lines.push(format!("Pressure: {pressure}"));
        }
        if let Some(uv) = current.uv_index {
            lines.push(format!("UV Index: {uv}"));
        }
        if let Some(visibility) = current.visibility {
            lines.push(format!("Visibility: {visibility}"));
        }
        if let Some(icon) = current.weather_icons.first() {
            lines.push(format!("Icon: {icon}"));
        }

        lines
    }
}

impl std::fmt::Display for WeatherReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> WeatherResult {
        serde_json::from_str(
            r#"{
                "location": {"name": "London", "region": "City of London, Greater London",
                             "country": "United Kingdom", "localtime": "2024-05-01 14:05"},
                "current": {"temperature": 13, "weather_descriptions": ["Partly cloudy"],
                            "feelslike": 12, "observation_time": "01:05 PM", "humidity": 72}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn report_matches_received_fields() {
        let report = london().report(Units::Metric).to_string();
        let expected = "London: 13°C\n\
                        PARTLY CLOUDY\n\
                        Feelslike: 12°C\n\
                        Last Checked Time: 01:05 PM\n\
                        Region: City of London, Greater London\n\
                        Humidity: 72\n\
                        Local Time: 2024-05-01 14:05\n\
                        Country: United Kingdom";
        assert_eq!(report, expected);
    }

    #[test]
    fn report_keeps_fractional_temperatures() {
        let mut weather = london();
        weather.current.temperature = -3.5;
        let lines = weather.report(Units::Fahrenheit).lines();
        assert_eq!(lines[0], "London: -3.5°F");
    }

    #[test]
    fn report_appends_optional_fields_when_present() {
        let mut weather = london();
        weather.location.timezone_id = Some("Europe/London".into());
        weather.current.wind_speed = Some(17.0);
        weather.current.wind_dir = Some("WSW".into());
        weather.current.pressure = Some(1012.0);
        weather.current.uv_index = Some(3.0);
        weather.current.visibility = Some(10.0);
        weather.current.weather_icons = vec!["https://cdn.example/partly_cloudy.png".into()];

        let lines = weather.report(Units::Metric).lines();
        assert_eq!(
            lines[7..],
            [
                "Country: United Kingdom",
                "Timezone: Europe/London",
                "Wind: 17 WSW",
                "Pressure: 1012",
                "UV Index: 3",
                "Visibility: 10",
                "Icon: https://cdn.example/partly_cloudy.png",
            ]
        );
    }

    #[test]
    fn report_skips_absent_optional_fields() {
        let mut weather = london();
        weather.location.country = None;
        assert_eq!(weather.report(Units::Metric).lines().len(), 7);
    }

    #[test]
    fn missing_description_is_reported_as_unknown() {
        let mut weather = london();
        weather.current.weather_descriptions.clear();
        assert_eq!(weather.description(), None);
        assert_eq!(weather.report(Units::Metric).lines()[1], "UNKNOWN");
    }

    #[test]
    fn units_parse_and_query_values() {
        for units in Units::all() {
            assert_eq!(Units::try_from(units.as_str()).unwrap(), *units);
        }
        assert_eq!(Units::try_from("F").unwrap(), Units::Fahrenheit);
        assert_eq!(Units::Scientific.as_query(), "s");
        assert!(Units::try_from("kelvin").unwrap_err().to_string().contains("Unknown units"));
    }
}
