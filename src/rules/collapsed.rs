use crate::text::std_string;
use serde::{Deserialize, Serialize};
use speedregions_types::rule::{MatchRule, SpeedRule};
use speedregions_types::unit::SpeedUnit;
use std::collections::BTreeMap;

/// A speed rule with its whole parent chain folded in.
///
/// Road type keys are standardised, `multiplier` is the product of the
/// multipliers along the chain and inherited speeds are expressed in this
/// rule's unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapsedRule {
    pub id: Option<String>,
    pub speeds_by_road_type: BTreeMap<String, f32>,
    pub multiplier: f64,
    pub speed_unit: SpeedUnit,
    pub match_rule: MatchRule,
}

impl CollapsedRule {
    /// Copies `rule` without its parent link, standardising road type keys.
    pub(crate) fn from_rule(rule: &SpeedRule) -> Self {
        Self {
            id: rule.id.clone(),
            speeds_by_road_type: rule
                .speeds_by_road_type
                .iter()
                .map(|(road_type, speed)| (std_string(road_type), *speed))
                .collect(),
            multiplier: rule.multiplier,
            speed_unit: rule.speed_unit,
            match_rule: rule.match_rule.clone(),
        }
    }

    /// Folds an already collapsed parent into this rule.
    ///
    /// Road types missing here are taken from the parent, converted into
    /// this rule's unit and scaled by this rule's multiplier as it stands
    /// before the parent's multiplier is applied.
    pub(crate) fn inherit(&mut self, parent: &CollapsedRule) {
        for (road_type, speed) in &parent.speeds_by_road_type {
            if self.speeds_by_road_type.contains_key(road_type) {
                continue;
            }
            let converted = SpeedUnit::convert(f64::from(*speed), parent.speed_unit, self.speed_unit);
            self.speeds_by_road_type
                .insert(road_type.clone(), (converted * self.multiplier) as f32);
        }
        self.multiplier *= parent.multiplier;
    }

    /// Speed defined for `road_type`, in km/h.
    pub fn road_type_speed_kmh(&self, road_type: &str) -> Option<f64> {
        self.speeds_by_road_type
            .get(&std_string(road_type))
            .map(|speed| SpeedUnit::convert(f64::from(*speed), self.speed_unit, SpeedUnit::KmPerHour))
    }

    /// Final speed in km/h for a road segment.
    ///
    /// `base_speed_kmh` is the speed the router would otherwise use and
    /// `used_max_speed` says whether it came from a posted limit. A road type
    /// speed replaces the base speed unless the base came from a posted limit
    /// and the road type speed is not slower than the scaled base.
    pub fn apply_rule(&self, road_type: Option<&str>, base_speed_kmh: f64, used_max_speed: bool) -> f64 {
        let multiplied = base_speed_kmh * self.multiplier;
        match road_type.and_then(|r| self.road_type_speed_kmh(r)) {
            Some(speed) if !used_max_speed || speed < multiplied => speed,
            _ => multiplied,
        }
    }

    /// The collapsed rule as a plain speed rule with no parent.
    pub fn to_speed_rule(&self) -> SpeedRule {
        SpeedRule {
            id: self.id.clone(),
            parent_id: None,
            speeds_by_road_type: self.speeds_by_road_type.clone(),
            multiplier: self.multiplier,
            speed_unit: self.speed_unit,
            match_rule: self.match_rule.clone(),
        }
    }
}
