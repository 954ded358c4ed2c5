//! Trigger evaluation: is one resource eligible under a render context?

use crate::condition::ConditionEvaluator;
use crate::context::RenderContext;
use crate::resources::{Trigger, Triggered};

/// Trigger class an incoming event name maps to. Unknown events map to nothing.
pub fn canonical_trigger(event: &str) -> Option<Trigger> {
    match event {
        "conversation_start" => Some(Trigger::ConversationStart),
        "message_received" => Some(Trigger::MessageReceived),
        "survey_complete" => Some(Trigger::SurveyComplete),
        _ => None,
    }
}

/// Never panics; condition failures are logged and count as ineligible.
pub fn is_eligible<R: Triggered + ?Sized>(
    resource: &R,
    context: Option<&RenderContext>,
    conditions: &dyn ConditionEvaluator,
) -> bool {
    let event = context.and_then(|ctx| ctx.event.as_deref());

    if resource.trigger() == Trigger::Manual {
        return event.is_none();
    }

    if let Some(event) = event {
        if canonical_trigger(event) != Some(resource.trigger()) {
            return false;
        }
    }

    let condition = resource.condition().filter(|c| !c.trim().is_empty());
    match (condition, context) {
        (Some(condition), Some(ctx)) if ctx.data.is_some() => {
            match conditions.evaluate(condition, ctx) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(condition, error = %e, "condition evaluation failed");
                    false
                }
            }
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionError, PatternConditionEvaluator, UnrecognizedPolicy};
    use serde_json::Map;

    struct Stub {
        trigger: Trigger,
        condition: Option<&'static str>,
    }

    impl Triggered for Stub {
        fn trigger(&self) -> Trigger { self.trigger }
        fn condition(&self) -> Option<&str> { self.condition }
    }

    fn stub(trigger: Trigger) -> Stub {
        Stub { trigger, condition: None }
    }

    #[test]
    fn test_manual_only_without_event() {
        let eval = PatternConditionEvaluator::default();
        let manual = stub(Trigger::Manual);
        assert!(is_eligible(&manual, None, &eval));
        assert!(is_eligible(&manual, Some(&RenderContext::default()), &eval));
        assert!(!is_eligible(&manual, Some(&RenderContext::for_event("message_received")), &eval));
    }

    #[test]
    fn test_event_must_match_trigger() {
        let eval = PatternConditionEvaluator::default();
        let start = stub(Trigger::ConversationStart);
        assert!(is_eligible(&start, Some(&RenderContext::for_event("conversation_start")), &eval));
        assert!(!is_eligible(&start, Some(&RenderContext::for_event("message_received")), &eval));
        assert!(!is_eligible(&start, Some(&RenderContext::for_event("made_up")), &eval));
    }

    #[test]
    fn test_condition_needs_data() {
        let deny = PatternConditionEvaluator::new(UnrecognizedPolicy::Deny);
        let gated = Stub {
            trigger: Trigger::ConditionMet,
            condition: Some("score > 3"),
        };
        assert!(is_eligible(&gated, Some(&RenderContext::default()), &deny));
        let with_data = RenderContext::default().with_data(Map::new());
        assert!(!is_eligible(&gated, Some(&with_data), &deny));
    }

    #[test]
    fn test_condition_error_is_ineligible() {
        let failing = |condition: &str, _: &RenderContext| -> Result<bool, ConditionError> {
            Err(ConditionError::evaluation(condition, "backend unavailable"))
        };
        let gated = Stub {
            trigger: Trigger::MessageReceived,
            condition: Some("data.plan"),
        };
        let ctx = RenderContext::for_event("message_received").with_data(Map::new());
        assert!(!is_eligible(&gated, Some(&ctx), &failing));
    }

    #[test]
    fn test_unquoted_comparison_uses_policy() {
        let gated = Stub {
            trigger: Trigger::MessageReceived,
            condition: Some("surveyId === nothing"),
        };
        let ctx = RenderContext::for_event("message_received").with_data(Map::new());
        assert!(is_eligible(&gated, Some(&ctx), &PatternConditionEvaluator::default()));
        let deny = PatternConditionEvaluator::new(UnrecognizedPolicy::Deny);
        assert!(!is_eligible(&gated, Some(&ctx), &deny));
    }
}
