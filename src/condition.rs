//! Condition language.
//!
//! Only a handful of literal shapes are understood. Anything else parses to
//! [`Condition::Unrecognized`] and is decided by the evaluator's policy.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::context::RenderContext;

static SURVEY_ID_EQUALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"surveyId\s*===\s*['"]([^'"]+)['"]"#).unwrap());
static VISUALIZATION_ID_EQUALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"visualizationId\s*===\s*['"]([^'"]+)['"]"#).unwrap());
static MESSAGE_INCLUDES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"message\.(?:toLowerCase\(\)\.)?includes\(['"]([^'"]+)['"]\)"#).unwrap()
});
static DATA_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"data\.(\w+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    SurveyId,
    VisualizationId,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::SurveyId => "surveyId",
            Subject::VisualizationId => "visualizationId",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    IdEquals { subject: Subject, literal: String },
    /// Needle is stored lowercased; matching is case-insensitive.
    MessageIncludes(String),
    DataFieldDefined(String),
    Unrecognized(String),
}

/// Raised by evaluators that cannot decide a condition at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("cannot evaluate condition \"{condition}\": {reason}")]
    Evaluation { condition: String, reason: String },
}

impl ConditionError {
    pub fn evaluation(condition: impl Into<String>, reason: impl Into<String>) -> Self {
        ConditionError::Evaluation {
            condition: condition.into(),
            reason: reason.into(),
        }
    }
}

impl Condition {
    /// Id comparisons against anything but a quoted literal (a variable,
    /// an expression) are left to the policy as unrecognized.
    pub fn parse(text: &str) -> Self {
        for (subject, pattern) in [
            (Subject::SurveyId, &*SURVEY_ID_EQUALS),
            (Subject::VisualizationId, &*VISUALIZATION_ID_EQUALS),
        ] {
            if !text.contains(&format!("{} ===", subject.as_str())) {
                continue;
            }
            return match pattern.captures(text) {
                Some(caps) => Condition::IdEquals {
                    subject,
                    literal: caps[1].to_string(),
                },
                None => Condition::Unrecognized(text.to_string()),
            };
        }

        if let Some(caps) = MESSAGE_INCLUDES.captures(text) {
            return Condition::MessageIncludes(caps[1].to_lowercase());
        }
        if let Some(caps) = DATA_FIELD.captures(text) {
            return Condition::DataFieldDefined(caps[1].to_string());
        }
        Condition::Unrecognized(text.to_string())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::IdEquals { subject, literal } => write!(f, "{} === '{}'", subject.as_str(), literal),
            Condition::MessageIncludes(needle) => write!(f, "message.includes('{}')", needle),
            Condition::DataFieldDefined(field) => write!(f, "data.{}", field),
            Condition::Unrecognized(text) => f.write_str(text),
        }
    }
}

/// Outcome for conditions the evaluator cannot decide.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedPolicy {
    #[default]
    Allow,
    Deny,
}

impl UnrecognizedPolicy {
    fn outcome(&self) -> bool {
        matches!(self, UnrecognizedPolicy::Allow)
    }
}

/// Pluggable predicate over a condition string.
pub trait ConditionEvaluator: Send + Sync {
    fn evaluate(&self, condition: &str, context: &RenderContext) -> Result<bool, ConditionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternConditionEvaluator {
    pub unrecognized: UnrecognizedPolicy,
}

impl PatternConditionEvaluator {
    pub fn new(unrecognized: UnrecognizedPolicy) -> Self {
        Self { unrecognized }
    }

    pub fn evaluate_parsed(&self, condition: &Condition, context: &RenderContext) -> bool {
        let undecided = || {
            tracing::warn!(condition = %condition, policy = ?self.unrecognized, "condition not decidable, applying policy");
            self.unrecognized.outcome()
        };

        match condition {
            Condition::IdEquals { subject, literal } => {
                let actual = match subject {
                    Subject::SurveyId => context.survey_id.as_deref(),
                    Subject::VisualizationId => context.visualization_id.as_deref(),
                };
                match actual {
                    Some(actual) => actual == literal,
                    None => undecided(),
                }
            }
            Condition::MessageIncludes(needle) => match context.data_value("message") {
                Some(message) if !message.is_null() => message_text(message).to_lowercase().contains(needle.as_str()),
                _ => undecided(),
            },
            Condition::DataFieldDefined(field) => match &context.data {
                Some(data) => data.contains_key(field),
                None => undecided(),
            },
            Condition::Unrecognized(_) => undecided(),
        }
    }
}

fn message_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ConditionEvaluator for PatternConditionEvaluator {
    fn evaluate(&self, condition: &str, context: &RenderContext) -> Result<bool, ConditionError> {
        Ok(self.evaluate_parsed(&Condition::parse(condition), context))
    }
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&str, &RenderContext) -> Result<bool, ConditionError> + Send + Sync,
{
    fn evaluate(&self, condition: &str, context: &RenderContext) -> Result<bool, ConditionError> {
        self(condition, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!(
            Condition::parse("surveyId === 'feedback'"),
            Condition::IdEquals { subject: Subject::SurveyId, literal: "feedback".into() }
        );
        assert_eq!(
            Condition::parse("message.toLowerCase().includes('Help')"),
            Condition::MessageIncludes("help".into())
        );
        assert_eq!(
            Condition::parse("data.email"),
            Condition::DataFieldDefined("email".into())
        );
        assert!(matches!(Condition::parse("x > 3"), Condition::Unrecognized(_)));
    }

    #[test]
    fn test_unquoted_comparison_follows_policy() {
        assert_eq!(
            Condition::parse("surveyId === someVariable"),
            Condition::Unrecognized("surveyId === someVariable".into())
        );
        assert!(matches!(
            Condition::parse("visualizationId === data.current"),
            Condition::Unrecognized(_)
        ));

        let ctx = RenderContext::default().with_survey_id("s1");
        let allow = PatternConditionEvaluator::new(UnrecognizedPolicy::Allow);
        let deny = PatternConditionEvaluator::new(UnrecognizedPolicy::Deny);
        assert!(allow.evaluate("surveyId === currentSurvey", &ctx).unwrap());
        assert!(!deny.evaluate("surveyId === currentSurvey", &ctx).unwrap());
    }

    #[test]
    fn test_id_equals() {
        let evaluator = PatternConditionEvaluator::default();
        let ctx = RenderContext::default().with_survey_id("s1");
        assert!(evaluator.evaluate("surveyId === 's1'", &ctx).unwrap());
        assert!(!evaluator.evaluate("surveyId === \"s2\"", &ctx).unwrap());
    }

    #[test]
    fn test_message_case_insensitive() {
        let evaluator = PatternConditionEvaluator::default();
        let ctx = RenderContext::default().with_data(data(json!({"message": "I need HELP now"})));
        assert!(evaluator.evaluate("message.includes('help')", &ctx).unwrap());
        assert!(!evaluator.evaluate("message.includes('refund')", &ctx).unwrap());
    }

    #[test]
    fn test_data_field_defined() {
        let evaluator = PatternConditionEvaluator::default();
        let ctx = RenderContext::default().with_data(data(json!({"email": "a@b.c"})));
        assert!(evaluator.evaluate("data.email", &ctx).unwrap());
        assert!(!evaluator.evaluate("data.phone", &ctx).unwrap());
    }

    #[test]
    fn test_policy_for_unrecognized() {
        let ctx = RenderContext::default();
        let allow = PatternConditionEvaluator::new(UnrecognizedPolicy::Allow);
        let deny = PatternConditionEvaluator::new(UnrecognizedPolicy::Deny);
        assert!(allow.evaluate("score > 5", &ctx).unwrap());
        assert!(!deny.evaluate("score > 5", &ctx).unwrap());
        assert!(!deny.evaluate("surveyId === 's1'", &ctx).unwrap());
    }
}
