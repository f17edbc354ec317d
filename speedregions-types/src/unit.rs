use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kilometres per mile, the only conversion factor between the two units.
pub const KM_PER_MILE: f64 = 1.60934;

/// Unit a speed rule's road-type speeds are expressed in.
///
/// Parsing is tolerant: names are matched case-insensitively after trimming,
/// the short forms `km`/`kmh`/`mph`/`miles` are accepted, and an empty string
/// falls back to the default (km/h).
///
/// # Examples
///
/// ```
/// use speedregions_types::unit::SpeedUnit;
///
/// let unit: SpeedUnit = " miles_per_hour ".parse().unwrap();
/// assert_eq!(unit, SpeedUnit::MilesPerHour);
///
/// let unit: SpeedUnit = "".parse().unwrap();
/// assert_eq!(unit, SpeedUnit::KmPerHour);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpeedUnit {
    MilesPerHour,
    #[default]
    KmPerHour,
}

impl SpeedUnit {
    /// Convert `value` expressed in `from` into `to`.
    pub fn convert(value: f64, from: SpeedUnit, to: SpeedUnit) -> f64 {
        match (from, to) {
            (SpeedUnit::MilesPerHour, SpeedUnit::KmPerHour) => value * KM_PER_MILE,
            (SpeedUnit::KmPerHour, SpeedUnit::MilesPerHour) => value / KM_PER_MILE,
            _ => value,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpeedUnit::MilesPerHour => "MILES_PER_HOUR",
            SpeedUnit::KmPerHour => "KM_PER_HOUR",
        }
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpeedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let std = s.trim().to_lowercase();
        match std.as_str() {
            "" => Ok(SpeedUnit::default()),
            "km_per_hour" | "km" | "kmh" | "km/h" | "kph" => Ok(SpeedUnit::KmPerHour),
            "miles_per_hour" | "miles" | "mph" => Ok(SpeedUnit::MilesPerHour),
            _ => Err(format!("Cannot identify speed unit type: {}", std)),
        }
    }
}

impl TryFrom<String> for SpeedUnit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpeedUnit> for String {
    fn from(unit: SpeedUnit) -> Self {
        unit.name().to_string()
    }
}
