use serde::{Deserialize, Serialize};
use validator::Validate;

/// One city from the filtered gazetteer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CityRecord {
    #[validate(length(min = 1))]
    pub city: String,

    pub state_name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,

    pub population: Option<u64>,

    pub timezone: String,
}

impl CityRecord {
    pub fn new(
        city: String,
        state_name: String,
        lat: f64,
        lng: f64,
        population: Option<u64>,
        timezone: String,
    ) -> Self {
        Self {
            city,
            state_name,
            lat,
            lng,
            population,
            timezone,
        }
    }

    /// Lookup key used by the forecast index, e.g. `Denver,Colorado`.
    pub fn key(&self) -> String {
        format!("{},{}", self.city, self.state_name)
    }

    pub fn is_in_any_state(&self, states: &[String]) -> bool {
        state_matches(&self.state_name, states)
    }
}

/// Case-insensitive containment of any of `states` in `state_name`.
pub fn state_matches(state_name: &str, states: &[String]) -> bool {
    let state = state_name.to_lowercase();
    states
        .iter()
        .any(|excluded| state.contains(&excluded.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denver() -> CityRecord {
        CityRecord::new(
            "Denver".to_string(),
            "Colorado".to_string(),
            39.7621,
            -104.8759,
            Some(2_876_625),
            "America/Denver".to_string(),
        )
    }

    #[test]
    fn test_city_validation() {
        assert!(denver().validate().is_ok());

        let mut city = denver();
        city.lat = 91.0;
        assert!(city.validate().is_err());
    }

    #[test]
    fn test_state_matching_ignores_case() {
        let mut city = denver();
        city.state_name = "HAWAII".to_string();

        assert!(city.is_in_any_state(&["Hawaii".to_string()]));
        assert!(!denver().is_in_any_state(&["Hawaii".to_string(), "Alaska".to_string()]));
    }

    #[test]
    fn test_key() {
        assert_eq!(denver().key(), "Denver,Colorado");
    }
}
