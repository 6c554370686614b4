use serde::{Deserialize, Serialize};

use crate::models::{Channel, CityRecord};

/// One row of the forecast table: a city's attributes joined with the
/// measurements valid at one forecast timestamp.
///
/// Measurement values are kept as the decoder printed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub city: String,
    pub state_name: String,
    pub lat: f64,
    pub lng: f64,
    pub population: Option<u64>,
    pub timezone: String,
    #[serde(rename = "validTime")]
    pub valid_time: String,
    pub temp: Option<String>,
    pub chance_rain: Option<String>,
    pub snow_amt: Option<String>,
    pub wind_dir: Option<String>,
    pub wind_spd: Option<String>,
    pub vis: Option<String>,
    pub rel_humid: Option<String>,
}

impl ForecastRow {
    /// Row for `city` at `valid_time` with a single measurement populated.
    pub fn from_measurement(
        city: &CityRecord,
        valid_time: impl Into<String>,
        channel: Channel,
        value: impl Into<String>,
    ) -> Self {
        let mut row = Self {
            city: city.city.clone(),
            state_name: city.state_name.clone(),
            lat: city.lat,
            lng: city.lng,
            population: city.population,
            timezone: city.timezone.clone(),
            valid_time: valid_time.into(),
            ..Default::default()
        };
        row.set_measurement(channel, value);
        row
    }

    pub fn measurement(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Temperature => self.temp.as_deref(),
            Channel::ChanceRain => self.chance_rain.as_deref(),
            Channel::SnowAmount => self.snow_amt.as_deref(),
            Channel::WindDirection => self.wind_dir.as_deref(),
            Channel::WindSpeed => self.wind_spd.as_deref(),
            Channel::Visibility => self.vis.as_deref(),
            Channel::RelativeHumidity => self.rel_humid.as_deref(),
        }
    }

    pub fn measurement_mut(&mut self, channel: Channel) -> &mut Option<String> {
        match channel {
            Channel::Temperature => &mut self.temp,
            Channel::ChanceRain => &mut self.chance_rain,
            Channel::SnowAmount => &mut self.snow_amt,
            Channel::WindDirection => &mut self.wind_dir,
            Channel::WindSpeed => &mut self.wind_spd,
            Channel::Visibility => &mut self.vis,
            Channel::RelativeHumidity => &mut self.rel_humid,
        }
    }

    pub fn set_measurement(&mut self, channel: Channel, value: impl Into<String>) {
        *self.measurement_mut(channel) = Some(value.into());
    }

    pub fn populated_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.measurement(*c).is_some())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        Channel::ALL.iter().all(|c| self.measurement(*c).is_some())
    }

    pub fn key(&self) -> String {
        format!("{},{}", self.city, self.state_name)
    }
}
