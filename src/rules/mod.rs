//! Speed rule resolution.
//!
//! Raw [`SpeedRule`](speedregions_types::rule::SpeedRule)s may inherit from
//! a parent by id. The resolver validates the parent graph, folds every
//! chain into a self-contained [`CollapsedRule`] and indexes the result by
//! encoder and region type in a [`RuleTable`].

mod collapsed;
mod resolver;
mod table;

pub use collapsed::CollapsedRule;
pub use resolver::{RuleInheritanceResolver, build_lookup_table, collapse, validate};
pub use table::{EncoderRules, RuleTable};
