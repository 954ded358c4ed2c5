//! Rendering Tests
//!
//! Markup safety and per-kind document structure.

use proptest::prelude::*;
use serde_json::{json, Value};

use mcp_app_core::render::html::escape;
use mcp_app_core::{validate_config, AppConfig, Engine, RenderContext, ResourceContent, SurveySubmission};

fn config(raw: Value) -> AppConfig {
    validate_config(&raw).into_result().unwrap()
}

fn html_of(resource: Option<mcp_app_core::PackagedResource>) -> String {
    match resource.map(|r| r.content) {
        Some(ResourceContent::RawHtml { html_string }) => html_string,
        other => panic!("expected raw html, got {:?}", other),
    }
}

fn hostile_config(text: &str) -> AppConfig {
    config(json!({
        "surveys": {
            "s1": {
                "id": "s1", "title": text, "description": text, "trigger": "manual",
                "pages": [
                    {"type": "textInput", "id": "t", "title": text, "placeholder": text},
                    {"type": "multipleChoice", "id": "m", "title": text,
                     "options": [{"id": "o", "label": text, "followUpQuestion": text}]},
                    {"type": "rating", "id": "r", "title": text, "labels": {"min": text, "max": text}}
                ]
            }
        },
        "visualizations": {
            "v1": {"id": "v1", "title": text, "type": "table", "dataSource": "rows", "trigger": "manual"}
        },
        "productCards": {
            "p1": {"id": "p1", "title": text, "description": text, "brand": text,
                   "link": "https://e.com", "image_link": "https://e.com/i.png",
                   "price": "10.00 USD", "availability": "in_stock"}
        }
    }))
}

proptest! {
    #[test]
    fn escape_leaves_no_markup_characters(text in ".*") {
        let escaped = escape(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
        prop_assert!(!escaped.contains('\''));
    }

    #[test]
    fn hostile_text_never_opens_a_script(prefix in "[a-z ]{0,8}", suffix in "[<>/a-z'\"]{0,12}") {
        let text = format!("{}<script>{}", prefix, suffix);
        let config = hostile_config(&text);
        let engine = Engine::default();
        let rows = RenderContext::default().with_data(
            json!({"rows": [{"cell": text.clone()}]}).as_object().cloned().unwrap()
        );

        for html in [
            html_of(engine.render_survey(&config, "s1", None).unwrap()),
            html_of(engine.render_visualization(&config, "v1", Some(&rows)).unwrap()),
            html_of(engine.render_product_card(&config, "p1", None).unwrap()),
        ] {
            prop_assert!(!html.contains("<script>"));
        }
    }
}

#[test]
fn legacy_survey_renders_each_field_once() {
    let config = config(json!({
        "surveys": {
            "legacy": {
                "id": "legacy", "title": "Contact", "trigger": "manual",
                "fields": [
                    {"id": "email", "type": "email", "label": "Email", "required": true},
                    {"id": "topic", "type": "single_choice", "label": "Topic", "options": ["Sales", "Support"]}
                ]
            }
        }
    }));
    let html = html_of(Engine::default().render_survey(&config, "legacy", None).unwrap());
    assert_eq!(html.matches("name=\"email\"").count(), 1);
    assert!(html.contains("type=\"email\""));
    assert!(html.contains("Support"));
}

#[test]
fn paged_survey_shows_progress_and_first_page() {
    let config = config(json!({
        "surveys": {
            "s1": {
                "id": "s1", "title": "Onboarding", "trigger": "manual",
                "styling": {"theme": "gradient", "primaryColor": "#ff0000"},
                "pages": [
                    {"type": "textInput", "id": "name", "title": "Name?", "required": true},
                    {"type": "rating", "id": "nps", "title": "Recommend?", "min": 0, "max": 10}
                ]
            }
        }
    }));
    let html = html_of(Engine::default().render_survey(&config, "s1", None).unwrap());
    assert!(html.contains("progress"));
    assert!(html.contains("--primary: #ff0000"));
    assert!(html.contains("<span class=\"required\">*</span>"));
    assert!(html.contains("survey-complete"));
    assert_eq!(html.matches("class=\"rating-star\"").count(), 11);
}

#[test]
fn visualization_reads_rows_from_context() {
    let config = config(json!({
        "visualizations": {
            "kpi": {
                "id": "kpi", "title": "KPIs", "type": "metrics", "dataSource": "stats",
                "trigger": "survey_complete",
                "config": {"metrics": [
                    {"label": "Revenue", "field": "revenue", "format": "currency"},
                    {"label": "Churn", "field": "churn", "format": "percentage"}
                ]}
            }
        }
    }));
    let ctx = RenderContext::for_event("survey_complete")
        .with_data(json!({"stats": {"revenue": 1200, "churn": 0.05}}).as_object().cloned().unwrap());
    let html = html_of(Engine::default().render_visualization(&config, "kpi", Some(&ctx)).unwrap());
    assert!(html.contains("$1200.00"));
    assert!(html.contains("5%"));
}

#[test]
fn product_grid_is_one_document() {
    let card = |id: &str| {
        json!({"id": id, "title": id, "description": "d", "link": "https://e.com",
               "image_link": "https://e.com/i.png", "price": "5.00 EUR", "availability": "out_of_stock"})
    };
    let config = config(json!({"productCards": {"a": card("a"), "b": card("b")}}));
    let grid = Engine::default()
        .render_product_grid(&config, &["a".to_string(), "b".to_string()])
        .unwrap();
    let html = grid.html().unwrap();
    assert_eq!(html.matches("<!DOCTYPE html>").count(), 1);
    assert_eq!(html.matches("data-product-id=").count(), 2);
}

#[test]
fn submission_payload_is_parseable() {
    let text = "Survey completed in 3 seconds\n\n=== Survey Responses ===\n\n\
\n=== Structured Data ===\n```json\n{\n  \"surveyId\": \"s1\",\n  \"responses\": {},\n  \
\"metadata\": {\"completedAt\": \"2024-01-01T00:00:00.000Z\", \"pageCount\": 2, \"timeSpent\": 3}\n}\n```\n";
    let submission = SurveySubmission::from_payload(text).unwrap();
    assert_eq!(submission.survey_id, "s1");
    assert_eq!(submission.metadata.page_count, 2);
}
