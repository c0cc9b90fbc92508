//! The rule table.
//!
//! Each [`Rule`] is an independent predicate plus issue factory over a
//! [`RuleContext`]. Rules run in table order and never short-circuit, so
//! the verdict's review reasons always read duration, jurisdiction, risk.

use pactum_core::duration::exceeds_limit;
use pactum_core::{ContractFacts, Issue, RuleConfig, Severity, ValidationVerdict};

/// Duration after normalization, computed before any rule runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedDuration {
    pub months: Option<u32>,
    pub has_extra_days: bool,
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub facts: &'a ContractFacts,
    pub duration: &'a ResolvedDuration,
}

/// What a rule reports when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    pub reasoning: Option<String>,
    pub review_reason: String,
}

pub struct Rule {
    pub id: &'static str,
    pub field: &'static str,
    pub severity: Severity,
    pub check: fn(&RuleContext<'_>, &RuleConfig) -> Option<Finding>,
}

impl Rule {
    fn issue(&self, finding: &Finding) -> Issue {
        Issue {
            field: self.field.to_string(),
            rule: self.id.to_string(),
            message: finding.message.clone(),
            severity: self.severity,
            reasoning: finding.reasoning.clone(),
        }
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        id: "duration_24_months",
        field: "contract_duration_months",
        severity: Severity::Warning,
        check: check_duration,
    },
    Rule {
        id: "jurisdiction_not_chile",
        field: "jurisdiction",
        severity: Severity::Warning,
        check: check_jurisdiction,
    },
    Rule {
        id: "high_risk_score",
        field: "risk_score",
        severity: Severity::Error,
        check: check_risk,
    },
];

/// Run every rule in [`RULES`] against `ctx`.
pub fn evaluate_resolved(ctx: &RuleContext<'_>, config: &RuleConfig) -> ValidationVerdict {
    let mut verdict = ValidationVerdict::default();
    for rule in RULES {
        if let Some(finding) = (rule.check)(ctx, config) {
            let issue = rule.issue(&finding);
            verdict.push(issue, finding.review_reason);
        }
    }
    verdict
}

fn check_duration(ctx: &RuleContext<'_>, config: &RuleConfig) -> Option<Finding> {
    let limit = config.max_duration_months;
    let ResolvedDuration {
        months,
        has_extra_days,
    } = *ctx.duration;
    if !exceeds_limit(months, has_extra_days, limit) {
        return None;
    }
    let months = months?;
    let extra = if has_extra_days { " (plus extra days)" } else { "" };
    let reasoning = ctx.facts.duration_raw().map(|raw| {
        format!("Original text: '{raw}' -> {months} months{extra}")
    });
    Some(Finding {
        message: format!("Contract duration of {months} months{extra} exceeds the {limit}-month limit"),
        reasoning,
        review_reason: format!("Duration exceeds {limit} months: {months} months{extra}"),
    })
}

fn check_jurisdiction(ctx: &RuleContext<'_>, config: &RuleConfig) -> Option<Finding> {
    let jurisdiction = ctx.facts.jurisdiction()?;
    if config.is_allowed_jurisdiction(jurisdiction) {
        return None;
    }
    let label = &config.jurisdiction_label;
    Some(Finding {
        message: format!("Jurisdiction '{jurisdiction}' is not {label}"),
        reasoning: Some("Contracts with foreign jurisdiction require special legal review".to_string()),
        review_reason: format!("Jurisdiction is not {label}: {jurisdiction}"),
    })
}

fn check_risk(ctx: &RuleContext<'_>, config: &RuleConfig) -> Option<Finding> {
    let score = ctx.facts.risk_score;
    if score <= config.risk_threshold {
        return None;
    }
    let headline = format!("High risk score: {score}/100");
    Some(Finding {
        message: headline.clone(),
        reasoning: Some("Aggressive language detected that requires legal review".to_string()),
        review_reason: headline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict_for(facts: &ContractFacts, duration: ResolvedDuration) -> ValidationVerdict {
        let ctx = RuleContext {
            facts,
            duration: &duration,
        };
        evaluate_resolved(&ctx, &RuleConfig::default())
    }

    fn months(m: u32, extra: bool) -> ResolvedDuration {
        ResolvedDuration {
            months: Some(m),
            has_extra_days: extra,
        }
    }

    fn rules_fired(verdict: &ValidationVerdict) -> Vec<&str> {
        verdict.issues.iter().map(|i| i.rule.as_str()).collect()
    }

    #[test]
    fn clean_facts_pass() {
        let facts = ContractFacts {
            jurisdiction: Some("Santiago, Chile".into()),
            ..Default::default()
        };
        let verdict = verdict_for(&facts, months(12, false));
        assert!(verdict.issues.is_empty());
        assert!(!verdict.requires_review);
    }

    #[test]
    fn duration_boundary() {
        let facts = ContractFacts::default();
        assert!(verdict_for(&facts, months(24, false)).issues.is_empty());
        assert_eq!(rules_fired(&verdict_for(&facts, months(24, true))), ["duration_24_months"]);
        assert_eq!(rules_fired(&verdict_for(&facts, months(25, false))), ["duration_24_months"]);
        assert!(verdict_for(&facts, months(23, true)).issues.is_empty());
        assert!(verdict_for(&facts, ResolvedDuration::default()).issues.is_empty());
    }

    #[test]
    fn duration_issue_wording() {
        let facts = ContractFacts {
            duration_raw: Some("two years and one day".into()),
            ..Default::default()
        };
        let verdict = verdict_for(&facts, months(24, true));
        let issue = &verdict.issues[0];
        assert_eq!(issue.field, "contract_duration_months");
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(
            issue.message,
            "Contract duration of 24 months (plus extra days) exceeds the 24-month limit"
        );
        assert_eq!(
            issue.reasoning.as_deref(),
            Some("Original text: 'two years and one day' -> 24 months (plus extra days)")
        );
        assert_eq!(verdict.review_reasons[0], "Duration exceeds 24 months: 24 months (plus extra days)");
    }

    #[test]
    fn chilean_jurisdictions_pass() {
        for j in ["Santiago, Chile", "Republic of CHILE", "Valparaiso", "Concepcion", "Chilean law", "Tribunales de Santiago"] {
            let facts = ContractFacts {
                jurisdiction: Some(j.into()),
                ..Default::default()
            };
            assert!(verdict_for(&facts, ResolvedDuration::default()).issues.is_empty(), "{j}");
        }
    }

    #[test]
    fn foreign_jurisdiction_fires_once() {
        let facts = ContractFacts {
            jurisdiction: Some("New York, USA".into()),
            ..Default::default()
        };
        let verdict = verdict_for(&facts, ResolvedDuration::default());
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.issues[0].field, "jurisdiction");
        assert_eq!(verdict.issues[0].severity, Severity::Warning);
        assert_eq!(verdict.issues[0].message, "Jurisdiction 'New York, USA' is not Chile");
        assert_eq!(verdict.review_reasons, ["Jurisdiction is not Chile: New York, USA"]);
    }

    #[test]
    fn absent_or_blank_jurisdiction_never_fires() {
        let absent = ContractFacts::default();
        let blank = ContractFacts {
            jurisdiction: Some("   ".into()),
            ..Default::default()
        };
        assert!(verdict_for(&absent, ResolvedDuration::default()).issues.is_empty());
        assert!(verdict_for(&blank, ResolvedDuration::default()).issues.is_empty());
    }

    #[test]
    fn risk_threshold_is_exclusive() {
        let at = ContractFacts::default().with_risk_score(70);
        let above = ContractFacts::default().with_risk_score(71);
        assert!(verdict_for(&at, ResolvedDuration::default()).issues.is_empty());

        let verdict = verdict_for(&above, ResolvedDuration::default());
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.issues[0].field, "risk_score");
        assert_eq!(verdict.issues[0].severity, Severity::Error);
        assert_eq!(verdict.review_reasons, ["High risk score: 71/100"]);
    }

    #[test]
    fn all_rules_fire_in_table_order() {
        let facts = ContractFacts {
            jurisdiction: Some("Delaware".into()),
            ..Default::default()
        }
        .with_risk_score(90);
        let verdict = verdict_for(&facts, months(36, false));
        assert_eq!(
            rules_fired(&verdict),
            ["duration_24_months", "jurisdiction_not_chile", "high_risk_score"]
        );
        assert_eq!(verdict.review_reasons.len(), verdict.issues.len());
        assert!(verdict.requires_review);
    }

    #[test]
    fn swapped_allow_list() {
        let config = RuleConfig::default().with_jurisdiction("Peru", ["peru", "lima"]);
        let facts = ContractFacts {
            jurisdiction: Some("Santiago, Chile".into()),
            ..Default::default()
        };
        let duration = ResolvedDuration::default();
        let ctx = RuleContext {
            facts: &facts,
            duration: &duration,
        };
        let verdict = evaluate_resolved(&ctx, &config);
        assert_eq!(verdict.issues[0].message, "Jurisdiction 'Santiago, Chile' is not Peru");
    }
}
