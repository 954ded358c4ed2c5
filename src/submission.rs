//! Survey Submission Payload - Transcript and Structured Results
//!
//! The rendered survey posts this text to the host as a prompt. The
//! structured tail is fenced JSON so the host side can parse it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::resources::{ChoiceOption, SurveyPage};

const JSON_FENCE: &str = "```json\n";
const CLOSING_FENCE: &str = "\n```";

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Payload has no fenced JSON block")]
    MissingBlock,

    #[error("Invalid structured data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageResponse {
    #[serde(rename_all = "camelCase")]
    TextInput { value: String },
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        option_ids: Vec<String>,
        #[serde(default)]
        follow_up_answers: BTreeMap<String, String>,
        #[serde(default)]
        custom_options: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Rating { value: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    pub completed_at: DateTime<Utc>,
    pub page_count: usize,
    /// Whole seconds.
    pub time_spent: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub survey_id: String,
    pub responses: BTreeMap<String, PageResponse>,
    pub metadata: SubmissionMetadata,
}

/// `"2 minutes 5 seconds"`, or just `"45 seconds"` under a minute.
pub fn format_time(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    match minutes {
        0 => format!("{} seconds", seconds),
        1 => format!("1 minute {} seconds", seconds),
        _ => format!("{} minutes {} seconds", minutes, seconds),
    }
}

impl SurveySubmission {
    /// Human-readable transcript followed by the fenced structured data.
    ///
    /// Pages without a response are omitted; numbering follows page position.
    pub fn to_payload(&self, pages: &[SurveyPage]) -> Result<String, serde_json::Error> {
        let mut text = format!(
            "Survey completed in {}\n\n=== Survey Responses ===\n\n",
            format_time(self.metadata.time_spent)
        );

        for (index, page) in pages.iter().enumerate() {
            let Some(response) = self.responses.get(page.id()) else {
                continue;
            };
            text.push_str(&format!("{}. {}\n", index + 1, page.title()));
            text.push_str(&response_block(page, response));
        }

        text.push_str("\n=== Structured Data ===\n");
        text.push_str(JSON_FENCE);
        text.push_str(&serde_json::to_string_pretty(self)?);
        text.push_str(CLOSING_FENCE);
        text.push('\n');
        Ok(text)
    }

    /// Parses the fenced JSON tail of a payload.
    pub fn from_payload(text: &str) -> Result<Self, SubmissionError> {
        let start = text.rfind(JSON_FENCE).ok_or(SubmissionError::MissingBlock)? + JSON_FENCE.len();
        let body = &text[start..];
        let end = body.rfind(CLOSING_FENCE).ok_or(SubmissionError::MissingBlock)?;
        Ok(serde_json::from_str(&body[..end])?)
    }
}

fn response_block(page: &SurveyPage, response: &PageResponse) -> String {
    match response {
        PageResponse::TextInput { value } => format!("   Answer: \"{}\"\n\n", value),
        PageResponse::MultipleChoice { option_ids, follow_up_answers, custom_options } => {
            let options: &[ChoiceOption] = match page {
                SurveyPage::MultipleChoice(p) => p.options.as_slice(),
                _ => &[],
            };
            let lines: Vec<String> = options
                .iter()
                .filter(|opt| option_ids.contains(&opt.id))
                .map(|opt| match follow_up_answers.get(&opt.id).filter(|a| !a.is_empty()) {
                    Some(answer) => format!("• {}\n     Follow-up: \"{}\"", opt.label, answer),
                    None => format!("• {}", opt.label),
                })
                .chain(custom_options.iter().map(|label| format!("• {}", label)))
                .collect();
            format!("   Selected:\n   {}\n\n", lines.join("\n   "))
        }
        PageResponse::Rating { value } => match page {
            SurveyPage::Rating(p) => format!("   Rating: {} / {}\n\n", value, p.max),
            _ => format!("   Rating: {}\n\n", value),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn pages() -> Vec<SurveyPage> {
        serde_json::from_value(json!([
            {"type": "textInput", "id": "name", "title": "Your name"},
            {"type": "multipleChoice", "id": "color", "title": "Colors",
             "options": [{"id": "r", "label": "Red", "followUpQuestion": "Why?"}, {"id": "g", "label": "Green"}]},
            {"type": "rating", "id": "score", "title": "Score", "max": 10}
        ]))
        .unwrap()
    }

    fn submission() -> SurveySubmission {
        let mut responses = BTreeMap::new();
        responses.insert("name".to_string(), PageResponse::TextInput { value: "Ann".into() });
        responses.insert(
            "color".to_string(),
            PageResponse::MultipleChoice {
                option_ids: vec!["g".into(), "r".into()],
                follow_up_answers: BTreeMap::from([("r".to_string(), "bold".to_string())]),
                custom_options: vec!["Teal".into()],
            },
        );
        SurveySubmission {
            survey_id: "s1".into(),
            responses,
            metadata: SubmissionMetadata {
                completed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                page_count: 3,
                time_spent: 65,
            },
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(45), "45 seconds");
        assert_eq!(format_time(65), "1 minute 5 seconds");
        assert_eq!(format_time(130), "2 minutes 10 seconds");
    }

    #[test]
    fn test_transcript_layout() {
        let payload = submission().to_payload(&pages()).unwrap();
        let expected_head = "Survey completed in 1 minute 5 seconds\n\n\
=== Survey Responses ===\n\n\
1. Your name\n   Answer: \"Ann\"\n\n\
2. Colors\n   Selected:\n   • Red\n     Follow-up: \"bold\"\n   • Green\n   • Teal\n\n\
\n=== Structured Data ===\n```json\n{\n  \"surveyId\": \"s1\",";
        assert!(payload.starts_with(expected_head), "{}", payload);
        assert!(!payload.contains("3. Score"));
        assert!(payload.ends_with("\n```\n"));
    }

    #[test]
    fn test_payload_parses_back() {
        let original = submission();
        let payload = original.to_payload(&pages()).unwrap();
        assert_eq!(SurveySubmission::from_payload(&payload).unwrap(), original);
    }

    #[test]
    fn test_client_shaped_json() {
        let text = "```json\n{\"surveyId\":\"s\",\"responses\":{\"score\":{\"type\":\"rating\",\"value\":4}},\
\"metadata\":{\"completedAt\":\"2024-05-01T12:00:00.000Z\",\"pageCount\":1,\"timeSpent\":3}}\n```\n";
        let parsed = SurveySubmission::from_payload(text).unwrap();
        assert_eq!(parsed.responses["score"], PageResponse::Rating { value: 4 });
        assert!(matches!(SurveySubmission::from_payload("no block"), Err(SubmissionError::MissingBlock)));
    }
}
