use crate::unit::SpeedUnit;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which encoders and region types a speed rule applies to.
///
/// A rule applies to a road segment when the segment's region type is in
/// `region_types` and the routing profile's encoder (e.g. "car") is in
/// `flag_encoders`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchRule {
    pub flag_encoders: BTreeSet<String>,
    pub region_types: BTreeSet<String>,
}

impl MatchRule {
    pub fn new<E, R>(encoders: E, region_types: R) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            flag_encoders: encoders.into_iter().map(Into::into).collect(),
            region_types: region_types.into_iter().map(Into::into).collect(),
        }
    }
}

/// A raw speed rule as supplied by the user.
///
/// Rules may inherit from a parent through `parent_id`; inheritance is
/// resolved by the rule resolver, which never mutates these records.
///
/// # Examples
///
/// ```
/// use speedregions_types::rule::SpeedRule;
///
/// let rule = SpeedRule::new()
///     .with_id("urban")
///     .with_speed("motorway", 80.0)
///     .with_multiplier(0.9)
///     .matching(["car"], ["london"]);
/// assert_eq!(rule.multiplier, 0.9);
/// assert!(rule.match_rule.region_types.contains("london"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeedRule {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub speeds_by_road_type: BTreeMap<String, f32>,
    pub multiplier: f64,
    pub speed_unit: SpeedUnit,
    pub match_rule: MatchRule,
}

impl SpeedRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_speed(mut self, road_type: impl Into<String>, speed: f32) -> Self {
        self.speeds_by_road_type.insert(road_type.into(), speed);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_unit(mut self, unit: SpeedUnit) -> Self {
        self.speed_unit = unit;
        self
    }

    pub fn matching<E, R>(mut self, encoders: E, region_types: R) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        self.match_rule = MatchRule::new(encoders, region_types);
        self
    }
}

impl Default for SpeedRule {
    fn default() -> Self {
        Self {
            id: None,
            parent_id: None,
            speeds_by_road_type: BTreeMap::new(),
            multiplier: 1.0,
            speed_unit: SpeedUnit::default(),
            match_rule: MatchRule::default(),
        }
    }
}
