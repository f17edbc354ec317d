//! Compiler configuration.
//!
//! The only tunable the core consumes is the minimum quadtree cell length.
//! Encoder names, region types and units are data, not configuration.
use serde::de::Error;

/// Default minimum cell side length, in metres.
pub const DEFAULT_MIN_CELL_LENGTH_METRES: f64 = 10.0;

/// Quadtree compiler configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// A cell is only split while both halves stay at least this long (metres)
    #[serde(default = "CompilerConfig::default_min_cell_length_metres")]
    pub min_cell_length_metres: f64,
}

impl CompilerConfig {
    const fn default_min_cell_length_metres() -> f64 {
        DEFAULT_MIN_CELL_LENGTH_METRES
    }

    pub fn with_min_cell_length_metres(mut self, metres: f64) -> Self {
        self.min_cell_length_metres = metres;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        let len = self.min_cell_length_metres;
        if !len.is_finite() || len <= 0.0 {
            return Err(format!(
                "Minimum cell length must be a positive finite number of metres, got: {}",
                len
            ));
        }

        if len < 0.01 {
            log::warn!(
                "Minimum cell length of {}m is very small; compiling may produce a huge tree",
                len
            );
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: CompilerConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: CompilerConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            min_cell_length_metres: Self::default_min_cell_length_metres(),
        }
    }
}
