//! Validation and collapsing of parent/child speed rule chains.

use super::{CollapsedRule, RuleTable};
use crate::error::{Result, SpeedRegionsError};
use crate::text::std_string;
use rustc_hash::{FxHashMap, FxHashSet};
use speedregions_types::rule::SpeedRule;

fn std_id(id: Option<&str>) -> Option<String> {
    id.map(std_string).filter(|id| !id.is_empty())
}

/// Parent graph of a validated rule set.
///
/// Construction checks that ids are unique, every parent exists and no
/// parent chain loops back on itself.
#[derive(Debug)]
pub struct RuleInheritanceResolver<'a> {
    rules: &'a [SpeedRule],
    parents: Vec<Option<usize>>,
}

impl<'a> RuleInheritanceResolver<'a> {
    pub fn new(rules: &'a [SpeedRule]) -> Result<Self> {
        let mut by_id: FxHashMap<String, usize> = FxHashMap::default();
        for (idx, rule) in rules.iter().enumerate() {
            if let Some(id) = std_id(rule.id.as_deref()) {
                if by_id.insert(id.clone(), idx).is_some() {
                    return Err(SpeedRegionsError::DuplicateRuleId(id));
                }
            }
        }

        for rule in rules {
            let mut visited = FxHashSet::default();
            let mut next = std_id(rule.parent_id.as_deref());
            while let Some(id) = next {
                if !visited.insert(id.clone()) {
                    return Err(SpeedRegionsError::CircularRuleDependency(id));
                }
                let parent = by_id
                    .get(&id)
                    .ok_or_else(|| SpeedRegionsError::MissingParentRule(id.clone()))?;
                next = std_id(rules[*parent].parent_id.as_deref());
            }
        }

        let parents = rules
            .iter()
            .map(|rule| std_id(rule.parent_id.as_deref()).and_then(|id| by_id.get(&id).copied()))
            .collect();

        Ok(Self { rules, parents })
    }

    pub fn rules(&self) -> &'a [SpeedRule] {
        self.rules
    }

    /// Collapses every rule; the result is indexed like the input.
    pub fn collapse(&self) -> Vec<CollapsedRule> {
        let mut collapsed: Vec<Option<CollapsedRule>> = vec![None; self.rules.len()];
        for idx in 0..self.rules.len() {
            self.resolve(idx, &mut collapsed);
        }
        collapsed.into_iter().flatten().collect()
    }

    /// Ancestors are resolved before their children, so each chain is
    /// walked once.
    fn resolve(&self, idx: usize, collapsed: &mut [Option<CollapsedRule>]) {
        if collapsed[idx].is_some() {
            return;
        }

        let mut rule = CollapsedRule::from_rule(&self.rules[idx]);
        if let Some(parent) = self.parents[idx] {
            self.resolve(parent, collapsed);
            if let Some(parent) = &collapsed[parent] {
                rule.inherit(parent);
            }
        }
        collapsed[idx] = Some(rule);
    }

    pub fn build_lookup_table(&self) -> Result<RuleTable> {
        RuleTable::from_collapsed(self.collapse())
    }
}

/// Checks ids, parent links and encoder/region bindings of `rules`.
///
/// # Examples
///
/// ```
/// use speedregions::rules::validate;
/// use speedregions_types::rule::SpeedRule;
///
/// let rules = vec![
///     SpeedRule::new().with_id("a").with_parent("b"),
///     SpeedRule::new().with_id("b").with_parent("a"),
/// ];
/// assert!(validate(&rules).is_err());
/// ```
pub fn validate(rules: &[SpeedRule]) -> Result<()> {
    build_lookup_table(rules).map(|_| ())
}

/// Collapses every rule's parent chain. The result is indexed like `rules`.
pub fn collapse(rules: &[SpeedRule]) -> Result<Vec<CollapsedRule>> {
    Ok(RuleInheritanceResolver::new(rules)?.collapse())
}

/// Builds the encoder → region type → rule table.
pub fn build_lookup_table(rules: &[SpeedRule]) -> Result<RuleTable> {
    RuleInheritanceResolver::new(rules)?.build_lookup_table()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_ids_compare_standardised() {
        let rules = vec![SpeedRule::new().with_id("Urban"), SpeedRule::new().with_id(" urban ")];
        assert!(matches!(
            RuleInheritanceResolver::new(&rules),
            Err(SpeedRegionsError::DuplicateRuleId(id)) if id == "urban"
        ));
    }

    #[test]
    fn test_self_parent_is_circular() {
        let rules = vec![SpeedRule::new().with_id("a").with_parent("A")];
        assert!(matches!(
            RuleInheritanceResolver::new(&rules),
            Err(SpeedRegionsError::CircularRuleDependency(id)) if id == "a"
        ));
    }

    #[test]
    fn test_longer_cycle_detected_from_outside() {
        let rules = vec![
            SpeedRule::new().with_id("leaf").with_parent("x"),
            SpeedRule::new().with_id("x").with_parent("y"),
            SpeedRule::new().with_id("y").with_parent("z"),
            SpeedRule::new().with_id("z").with_parent("x"),
        ];
        assert!(matches!(
            RuleInheritanceResolver::new(&rules),
            Err(SpeedRegionsError::CircularRuleDependency(id)) if id == "x"
        ));
    }

    #[test]
    fn test_missing_parent() {
        let rules = vec![SpeedRule::new().with_id("a").with_parent("ghost")];
        assert!(matches!(
            RuleInheritanceResolver::new(&rules),
            Err(SpeedRegionsError::MissingParentRule(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_blank_parent_is_no_parent() {
        let rules = vec![SpeedRule::new().with_parent("  ")];
        assert!(RuleInheritanceResolver::new(&rules).is_ok());
    }

    #[test]
    fn test_three_level_chain() {
        let rules = vec![
            SpeedRule::new()
                .with_id("child")
                .with_parent("parent")
                .with_multiplier(0.5),
            SpeedRule::new()
                .with_id("parent")
                .with_parent("root")
                .with_speed("primary", 80.0)
                .with_multiplier(0.8),
            SpeedRule::new()
                .with_id("root")
                .with_speed("motorway", 100.0)
                .with_speed("primary", 1.0)
                .with_multiplier(0.5),
        ];

        let collapsed = collapse(&rules).unwrap();
        assert_eq!(collapsed.len(), 3);

        let child = &collapsed[0];
        assert!((child.multiplier - 0.2).abs() < 1e-12);
        // primary from the parent, scaled by the child multiplier
        assert!((child.speeds_by_road_type["primary"] - 40.0).abs() < 1e-4);
        // motorway from the root, scaled by child and parent multipliers
        assert!((child.speeds_by_road_type["motorway"] - 40.0).abs() < 1e-4);

        // input rules are untouched
        assert_eq!(rules[0].parent_id.as_deref(), Some("parent"));
        assert!(rules[0].speeds_by_road_type.is_empty());
    }
}
