use serde::{Deserialize, Serialize};

/// A forecast measurement channel. Each channel populates exactly one column
/// of the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    Temperature,
    ChanceRain,
    SnowAmount,
    WindDirection,
    WindSpeed,
    Visibility,
    RelativeHumidity,
}

impl Channel {
    /// Column order of the output table.
    pub const ALL: [Channel; 7] = [
        Channel::Temperature,
        Channel::ChanceRain,
        Channel::SnowAmount,
        Channel::WindDirection,
        Channel::WindSpeed,
        Channel::Visibility,
        Channel::RelativeHumidity,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            Channel::Temperature => "temp",
            Channel::ChanceRain => "chance_rain",
            Channel::SnowAmount => "snow_amt",
            Channel::WindDirection => "wind_dir",
            Channel::WindSpeed => "wind_spd",
            Channel::Visibility => "vis",
            Channel::RelativeHumidity => "rel_humid",
        }
    }

    /// NDFD product file published for this channel.
    pub fn product(&self) -> &'static str {
        match self {
            Channel::Temperature => "ds.temp.bin",
            Channel::ChanceRain => "ds.pop12.bin",
            Channel::SnowAmount => "ds.snow.bin",
            Channel::WindDirection => "ds.wdir.bin",
            Channel::WindSpeed => "ds.wspd.bin",
            Channel::Visibility => "ds.vis.bin",
            Channel::RelativeHumidity => "ds.maxrh.bin",
        }
    }

    /// Local file stem, e.g. `wind_dir` for `wind_dir_1_3.bin`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Channel::Temperature => "temp",
            Channel::ChanceRain => "chance_rain",
            Channel::SnowAmount => "snow",
            Channel::WindDirection => "wind_dir",
            Channel::WindSpeed => "wind_spd",
            Channel::Visibility => "vis",
            Channel::RelativeHumidity => "rel_humid",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Channel::Temperature => "Temp",
            Channel::ChanceRain => "Chance_rain",
            Channel::SnowAmount => "Snow_amt",
            Channel::WindDirection => "Wind_dir",
            Channel::WindSpeed => "Wind_speed",
            Channel::Visibility => "Visibility",
            Channel::RelativeHumidity => "Rel_Humid",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Forecast window of a published NDFD file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    /// Days 1-3.
    NearTerm,
    /// Days 4-7.
    MidTerm,
}

impl Horizon {
    /// Directory segment of the NDFD server layout.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Horizon::NearTerm => "VP.001-003",
            Horizon::MidTerm => "VP.004-007",
        }
    }

    pub fn file_suffix(&self) -> &'static str {
        match self {
            Horizon::NearTerm => "_1_3",
            Horizon::MidTerm => "_4_7",
        }
    }
}

/// One physical file of the forecast catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastFile {
    pub channel: Channel,
    pub horizon: Horizon,
    pub url: String,
    pub file_name: String,
}

impl ForecastFile {
    /// `split` is true when the channel is published for both horizons, in
    /// which case the local name carries the horizon suffix.
    pub fn new(base_url: &str, channel: Channel, horizon: Horizon, split: bool) -> Self {
        let suffix = if split { horizon.file_suffix() } else { "" };
        Self {
            channel,
            horizon,
            url: format!(
                "{}/{}/{}",
                base_url.trim_end_matches('/'),
                horizon.path_segment(),
                channel.product()
            ),
            file_name: format!("{}{}.bin", channel.file_stem(), suffix),
        }
    }

    pub fn field_name(&self) -> &'static str {
        self.channel.field_name()
    }
}

/// The fixed set of twelve files making up a forecast build, in download order.
pub fn forecast_catalog(base_url: &str) -> Vec<ForecastFile> {
    use Channel::*;
    use Horizon::*;

    let both = |channel| {
        [
            ForecastFile::new(base_url, channel, NearTerm, true),
            ForecastFile::new(base_url, channel, MidTerm, true),
        ]
    };

    let mut files = Vec::with_capacity(12);
    files.extend(both(Temperature));
    files.extend(both(ChanceRain));
    files.push(ForecastFile::new(base_url, SnowAmount, NearTerm, false));
    files.extend(both(WindDirection));
    files.extend(both(WindSpeed));
    files.push(ForecastFile::new(base_url, Visibility, NearTerm, false));
    files.extend(both(RelativeHumidity));
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::DEFAULT_BASE_URL;

    #[test]
    fn test_catalog_has_twelve_files_in_order() {
        let names: Vec<String> = forecast_catalog(DEFAULT_BASE_URL)
            .into_iter()
            .map(|f| f.file_name)
            .collect();

        assert_eq!(
            names,
            vec![
                "temp_1_3.bin",
                "temp_4_7.bin",
                "chance_rain_1_3.bin",
                "chance_rain_4_7.bin",
                "snow.bin",
                "wind_dir_1_3.bin",
                "wind_dir_4_7.bin",
                "wind_spd_1_3.bin",
                "wind_spd_4_7.bin",
                "vis.bin",
                "rel_humid_1_3.bin",
                "rel_humid_4_7.bin",
            ]
        );
    }

    #[test]
    fn test_both_horizons_share_field_name() {
        let catalog = forecast_catalog(DEFAULT_BASE_URL);

        assert_eq!(catalog[0].field_name(), "temp");
        assert_eq!(catalog[1].field_name(), "temp");
        assert_eq!(catalog[10].field_name(), "rel_humid");
        assert_eq!(catalog[11].field_name(), "rel_humid");
    }

    #[test]
    fn test_remote_urls() {
        let catalog = forecast_catalog("https://example.test/ndfd/");

        assert_eq!(catalog[1].url, "https://example.test/ndfd/VP.004-007/ds.temp.bin");
        assert_eq!(catalog[4].url, "https://example.test/ndfd/VP.001-003/ds.snow.bin");
        assert_eq!(catalog[10].url, "https://example.test/ndfd/VP.001-003/ds.maxrh.bin");
    }
}
