//! Business-rule evaluation over extracted contract facts.

pub mod evaluator;
pub mod rules;

pub use evaluator::RuleEvaluator;
pub use rules::{Finding, RULES, ResolvedDuration, Rule, RuleContext, evaluate_resolved};
