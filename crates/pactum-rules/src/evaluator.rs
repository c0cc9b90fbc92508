//! Asynchronous front end to the rule table.
//!
//! The duration is resolved first (the only step that may call the model),
//! then [`evaluate_resolved`] runs synchronously.

use pactum_ai::DurationNormalizer;
use pactum_core::{ContractFacts, RuleConfig, ValidationVerdict};
use tracing::{debug, info};

use crate::rules::{ResolvedDuration, RuleContext, evaluate_resolved};

pub struct RuleEvaluator {
    normalizer: DurationNormalizer,
    config: RuleConfig,
}

impl RuleEvaluator {
    pub fn new(normalizer: DurationNormalizer, config: RuleConfig) -> Self {
        Self { normalizer, config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Fill in months from the raw text when missing, and always take the
    /// extra-days flag from the raw text when there is one.
    pub async fn resolve_duration(&self, facts: &ContractFacts) -> ResolvedDuration {
        let Some(raw) = facts.duration_raw() else {
            return ResolvedDuration {
                months: facts.duration_months,
                has_extra_days: false,
            };
        };
        let parsed = self.normalizer.normalize(raw).await;
        let months = facts.duration_months.or(parsed.months);
        let resolved = ResolvedDuration {
            months,
            has_extra_days: months.is_some() && parsed.has_extra_days,
        };
        debug!(
            raw,
            extracted = ?facts.duration_months,
            normalized = ?parsed.months,
            has_extra_days = resolved.has_extra_days,
            reasoning = %parsed.reasoning,
            "duration resolved"
        );
        resolved
    }

    pub async fn evaluate(&self, facts: &ContractFacts) -> ValidationVerdict {
        let duration = self.resolve_duration(facts).await;
        let ctx = RuleContext {
            facts,
            duration: &duration,
        };
        let verdict = evaluate_resolved(&ctx, &self.config);
        info!(
            issues = verdict.issues.len(),
            requires_review = verdict.requires_review,
            "rules evaluated"
        );
        verdict
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pactum_ai::fake::ScriptedInference;

    use super::*;

    fn offline() -> RuleEvaluator {
        RuleEvaluator::new(
            DurationNormalizer::new(Arc::new(ScriptedInference::failing())),
            RuleConfig::default(),
        )
    }

    fn with_duration(months: Option<u32>, raw: Option<&str>) -> ContractFacts {
        ContractFacts {
            duration_months: months,
            duration_raw: raw.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn raw_text_fills_missing_months() {
        let evaluator = offline();
        let resolved = evaluator
            .resolve_duration(&with_duration(None, Some("twenty-five months")))
            .await;
        assert_eq!(resolved.months, Some(25));
        assert!(!resolved.has_extra_days);
    }

    #[tokio::test]
    async fn extracted_months_keep_extra_days_from_raw() {
        let evaluator = offline();
        let facts = with_duration(Some(24), Some("two years and one day"));
        let resolved = evaluator.resolve_duration(&facts).await;
        assert_eq!(resolved.months, Some(24));
        assert!(resolved.has_extra_days);

        let verdict = evaluator.evaluate(&facts).await;
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.issues[0].rule, "duration_24_months");
    }

    #[tokio::test]
    async fn twenty_four_months_flat_passes() {
        let evaluator = offline();
        let verdict = evaluator
            .evaluate(&with_duration(Some(24), Some("two years")))
            .await;
        assert!(verdict.issues.is_empty());
        let verdict = evaluator.evaluate(&with_duration(Some(24), None)).await;
        assert!(verdict.issues.is_empty());
    }

    #[tokio::test]
    async fn unparseable_raw_never_exceeds() {
        let evaluator = offline();
        let verdict = evaluator
            .evaluate(&with_duration(None, Some("until the works are complete")))
            .await;
        assert!(!verdict.requires_review);
    }

    #[tokio::test]
    async fn model_answer_is_preferred() {
        let fake = ScriptedInference::new()
            .respond(r#"{"months": 30, "has_extra_days": false, "reasoning": "two and a half years"}"#);
        let evaluator = RuleEvaluator::new(DurationNormalizer::new(Arc::new(fake)), RuleConfig::default());
        let verdict = evaluator
            .evaluate(&with_duration(None, Some("two and a half years")))
            .await;
        assert_eq!(verdict.review_reasons, ["Duration exceeds 24 months: 30 months"]);
    }

    #[tokio::test]
    async fn evaluation_is_idempotent() {
        let evaluator = offline();
        let facts = ContractFacts {
            duration_raw: Some("thirty-six months".into()),
            jurisdiction: Some("London, England".into()),
            ..Default::default()
        }
        .with_risk_score(88);
        let first = evaluator.evaluate(&facts).await;
        let second = evaluator.evaluate(&facts).await;
        assert_eq!(first, second);
        assert_eq!(first.issues.len(), 3);
    }

    #[tokio::test]
    async fn review_flag_tracks_issues() {
        let evaluator = offline();
        for score in [1, 50, 70, 71, 100] {
            let verdict = evaluator
                .evaluate(&ContractFacts::default().with_risk_score(score))
                .await;
            assert_eq!(verdict.requires_review, !verdict.issues.is_empty());
            assert_eq!(verdict.review_reasons.len(), verdict.issues.len());
        }
    }
}
