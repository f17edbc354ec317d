use super::CollapsedRule;
use crate::error::{Result, SpeedRegionsError};
use crate::text::std_string;
use std::collections::BTreeMap;

/// Collapsed rules indexed by encoder, then region type.
///
/// Both keys are standardised. A pair maps to at most one rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    rules: Vec<CollapsedRule>,
    table: BTreeMap<String, BTreeMap<String, usize>>,
}

impl RuleTable {
    pub fn from_collapsed(rules: Vec<CollapsedRule>) -> Result<Self> {
        let mut table: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            for encoder in &rule.match_rule.flag_encoders {
                let encoder = std_string(encoder);
                let by_region = table.entry(encoder.clone()).or_default();
                for region_type in &rule.match_rule.region_types {
                    let region_type = std_string(region_type);
                    match by_region.get(&region_type) {
                        // The same rule listed the key twice
                        Some(&existing) if existing == idx => {}
                        Some(_) => {
                            return Err(SpeedRegionsError::DuplicateRuleBinding {
                                encoder,
                                region_type,
                            });
                        }
                        None => {
                            by_region.insert(region_type, idx);
                        }
                    }
                }
            }
        }

        Ok(Self { rules, table })
    }

    /// Rule for an encoder and region type; `None` when either is unknown.
    pub fn rule_for(&self, encoder: &str, region_type: &str) -> Option<&CollapsedRule> {
        self.encoder_rules(encoder).rule_for(region_type)
    }

    /// View of the rules for one encoder. Unknown encoders give an empty view.
    pub fn encoder_rules(&self, encoder: &str) -> EncoderRules<'_> {
        EncoderRules {
            rules: &self.rules,
            by_region: self.table.get(&std_string(encoder)),
        }
    }

    pub fn encoders(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// All collapsed rules, in input order.
    pub fn rules(&self) -> &[CollapsedRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.table.values().all(BTreeMap::is_empty)
    }
}

/// The rules of a single encoder.
#[derive(Debug, Clone, Copy)]
pub struct EncoderRules<'a> {
    rules: &'a [CollapsedRule],
    by_region: Option<&'a BTreeMap<String, usize>>,
}

impl<'a> EncoderRules<'a> {
    pub fn rule_for(&self, region_type: &str) -> Option<&'a CollapsedRule> {
        let idx = self.by_region?.get(&std_string(region_type))?;
        self.rules.get(*idx)
    }

    pub fn region_types(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.by_region
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.by_region.is_none_or(BTreeMap::is_empty)
    }
}
