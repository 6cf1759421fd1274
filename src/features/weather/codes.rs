//! WMO weather interpretation codes

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Showers,
    Thunderstorm,
}

impl WeatherCondition {
    /// Map a WMO code; unrecognized codes read as cloudy
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 => Self::Rain,
            71 | 73 | 75 | 77 => Self::Snow,
            80..=82 => Self::Showers,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Cloudy,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Showers => "Rain showers",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Cloudy | Self::Fog => "☁️",
            Self::Drizzle | Self::Rain | Self::Showers => "🌧️",
            Self::Snow => "❄️",
            Self::Thunderstorm => "⚡",
        }
    }
}

pub fn describe_weather_code(code: u16) -> &'static str {
    WeatherCondition::from_code(code).description()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_sky() {
        assert_eq!(describe_weather_code(0), "Clear sky");
    }

    #[test]
    fn test_thunderstorm_codes() {
        for code in [95, 96, 99] {
            assert_eq!(describe_weather_code(code), "Thunderstorm");
        }
    }

    #[test]
    fn test_each_group() {
        assert_eq!(describe_weather_code(2), "Cloudy");
        assert_eq!(describe_weather_code(48), "Fog");
        assert_eq!(describe_weather_code(56), "Drizzle");
        assert_eq!(describe_weather_code(65), "Rain");
        assert_eq!(describe_weather_code(77), "Snow");
        assert_eq!(describe_weather_code(81), "Rain showers");
    }

    #[test]
    fn test_unknown_codes_fall_back_to_cloudy() {
        for code in [4, 50, 60, 85, 97, 500] {
            assert_eq!(describe_weather_code(code), "Cloudy");
        }
    }
}
