//! Structural schema for raw configuration JSON.
//!
//! The shape of every resource is one JSON Schema (draft 2020-12) document,
//! compiled once. Each schema error is mapped back onto a path of object keys
//! and array indices with a Zod-style code and message, so one pass reports
//! every offending path.

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::Draft;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::price::{Price, PriceError};
use crate::validation::{ErrorCode, ValidationError};

pub const AVAILABILITY: &[&str] = &["in_stock", "out_of_stock", "preorder"];
pub const DISPLAY_MODES: &[&str] = &["card", "list", "compact"];
pub const PRODUCT_TRIGGERS: &[&str] = &["manual", "conversation_start", "message_received"];
pub const SURVEY_TRIGGERS: &[&str] = &["conversation_start", "message_received", "manual", "condition_met"];
pub const VISUALIZATION_TRIGGERS: &[&str] = &["survey_complete", "message_received", "manual", "condition_met"];
pub const PAGE_TYPES: &[&str] = &["textInput", "multipleChoice", "rating"];
pub const ACTION_KINDS: &[&str] = &[
    "show_survey",
    "show_visualization",
    "show_product_card",
    "send_message",
    "show_modal",
    "save_data",
    "trigger_mcp_tool",
    "conditional_branch",
    "delay_action",
];
pub const LIFECYCLE_EVENTS: &[&str] = &[
    "onConversationStart",
    "onMessageReceived",
    "onSurveyComplete",
    "onVisualizationShown",
];

/// Lowest allowed first step of a rating page.
pub const RATING_MIN_FLOOR: i64 = 0;
/// Highest allowed last step of a rating page.
pub const RATING_MAX_CEILING: i64 = 10;

fn text() -> Value {
    json!({"type": "string"})
}

fn text_max(max: u64) -> Value {
    json!({"type": "string", "maxLength": max})
}

fn exact(len: u64) -> Value {
    json!({"type": "string", "minLength": len, "maxLength": len})
}

fn url() -> Value {
    json!({"type": "string", "format": "url"})
}

fn flag() -> Value {
    json!({"type": "boolean"})
}

fn choice(options: &[&str]) -> Value {
    json!({"type": "string", "enum": options})
}

fn int_at_least(min: i64) -> Value {
    json!({"type": "integer", "minimum": min})
}

fn number_between(min: f64, max: f64) -> Value {
    json!({"type": "number", "minimum": min, "maximum": max})
}

fn text_list() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

fn product_card() -> Value {
    json!({
        "type": "object",
        "required": ["id", "title", "description", "link", "image_link", "price", "availability"],
        "properties": {
            "enable_search": flag(),
            "enable_checkout": flag(),
            "id": text_max(100),
            "title": text_max(150),
            "description": text_max(5000),
            "link": url(),
            "image_link": url(),
            "additional_image_link": {"type": "array", "items": url()},
            "video_link": url(),
            "model_3d_link": url(),
            "price": {"type": "string", "format": "price"},
            "currency": exact(3),
            "applicable_taxes_fees": text(),
            "sale_price": {"type": "string", "format": "price"},
            "sale_price_effective_date": text(),
            "pricing_trend": text_max(80),
            "availability": choice(AVAILABILITY),
            "availability_date": text(),
            "inventory_quantity": int_at_least(0),
            "gtin": {"type": "string", "pattern": "^[0-9]{8,14}$"},
            "mpn": text_max(70),
            "condition": choice(&["new", "refurbished", "used"]),
            "product_category": text(),
            "brand": text_max(70),
            "material": text_max(100),
            "dimensions": text(),
            "weight": text(),
            "age_group": choice(&["newborn", "infant", "toddler", "kids", "adult"]),
            "product_review_count": int_at_least(0),
            "product_review_rating": number_between(0.0, 5.0),
            "store_review_count": int_at_least(0),
            "store_review_rating": number_between(0.0, 5.0),
            "q_and_a": text(),
            "item_group_id": text_max(70),
            "item_group_title": text_max(150),
            "color": text_max(40),
            "size": text_max(20),
            "size_system": exact(2),
            "gender": choice(&["male", "female", "unisex"]),
            "offer_id": text(),
            "custom_variant1_category": text(),
            "custom_variant1_option": text(),
            "custom_variant2_category": text(),
            "custom_variant2_option": text(),
            "custom_variant3_category": text(),
            "custom_variant3_option": text(),
            "shipping": text(),
            "delivery_estimate": text(),
            "pickup_method": choice(&["in_store", "reserve", "not_supported"]),
            "pickup_sla": text(),
            "seller_name": text_max(70),
            "seller_url": url(),
            "seller_privacy_policy": url(),
            "seller_tos": url(),
            "return_policy": url(),
            "return_window": int_at_least(1),
            "popularity_score": {"type": "number"},
            "return_rate": number_between(0.0, 100.0),
            "warning": text(),
            "warning_url": url(),
            "age_restriction": int_at_least(1),
            "related_product_id": text(),
            "relationship_type": choice(&[
                "part_of_set",
                "required_part",
                "often_bought_with",
                "substitute",
                "different_brand",
                "accessory",
            ]),
            "display_mode": choice(DISPLAY_MODES),
            "trigger": choice(PRODUCT_TRIGGERS),
        }
    })
}

/// Text validation shared by legacy fields and text-input pages. `pattern`
/// is handed to the browser as-is, so any string is accepted here.
fn text_validation() -> Value {
    json!({
        "type": "object",
        "properties": {
            "minLength": int_at_least(0),
            "maxLength": int_at_least(0),
            "pattern": text(),
            "message": text(),
        }
    })
}

fn legacy_field() -> Value {
    json!({
        "type": "object",
        "required": ["id", "type", "label"],
        "properties": {
            "id": text(),
            "type": choice(&[
                "text",
                "textarea",
                "email",
                "number",
                "multiple_choice",
                "single_choice",
                "rating",
                "date",
                "file",
            ]),
            "label": text(),
            "description": text(),
            "required": flag(),
            "placeholder": text(),
            "options": text_list(),
            "min": {"type": "number"},
            "max": {"type": "number"},
            "maxSelections": int_at_least(1),
            "validation": text_validation(),
        }
    })
}

/// A page variant applies only when `type` names it.
fn page_variant(page_type: &str, properties: Value, required: &[&str]) -> Value {
    json!({
        "if": {"required": ["type"], "properties": {"type": {"const": page_type}}},
        "then": {"required": required, "properties": properties}
    })
}

fn page() -> Value {
    json!({
        "type": "object",
        "required": ["type", "id", "title"],
        "properties": {
            "type": {"enum": PAGE_TYPES},
            "id": text(),
            "title": text(),
            "description": text(),
            "required": flag(),
        },
        "allOf": [
            page_variant("textInput", json!({
                "placeholder": text(),
                "rows": {"type": "integer", "minimum": 1, "maximum": 20},
                "validation": text_validation(),
            }), &[]),
            page_variant("multipleChoice", json!({
                "allowMultiple": flag(),
                "allowUserOptions": flag(),
                "maxSelections": int_at_least(1),
                "options": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["id", "label"],
                        "properties": {"id": text(), "label": text(), "followUpQuestion": text()}
                    }
                },
            }), &["options"]),
            page_variant("rating", json!({
                "min": {"type": "integer", "minimum": RATING_MIN_FLOOR, "maximum": RATING_MAX_CEILING - 1},
                "max": {"type": "integer", "minimum": 2, "maximum": RATING_MAX_CEILING},
                "labels": {"type": "object", "properties": {"min": text(), "max": text()}},
            }), &[]),
        ]
    })
}

fn survey() -> Value {
    json!({
        "type": "object",
        "required": ["id", "title", "trigger"],
        "properties": {
            "id": text(),
            "title": text(),
            "description": text(),
            "trigger": choice(SURVEY_TRIGGERS),
            "condition": text(),
            "styling": {
                "type": "object",
                "properties": {
                    "theme": choice(&["default", "minimal", "gradient"]),
                    "primaryColor": text(),
                    "showProgress": flag(),
                }
            },
            "fields": {"type": "array", "items": legacy_field()},
            "pages": {"type": "array", "minItems": 1, "items": page()},
        }
    })
}

fn visualization() -> Value {
    json!({
        "type": "object",
        "required": ["id", "title", "type", "dataSource", "trigger"],
        "properties": {
            "id": text(),
            "title": text(),
            "description": text(),
            "type": choice(&["chart", "table", "metrics", "custom"]),
            "dataSource": text(),
            "trigger": choice(VISUALIZATION_TRIGGERS),
            "condition": text(),
            "config": {
                "type": "object",
                "properties": {
                    "chartType": choice(&["bar", "line", "pie", "scatter", "area"]),
                    "xAxis": text(),
                    "yAxis": text(),
                    "colors": text_list(),
                    "metrics": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["label", "field"],
                            "properties": {"label": text(), "field": text(), "format": text()}
                        }
                    },
                }
            },
        }
    })
}

fn actions() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["action"],
            "properties": {
                "action": choice(ACTION_KINDS),
                "surveyId": text(),
                "visualizationId": text(),
                "productCardId": text(),
                "message": text(),
                "mcpTool": text(),
                "condition": text(),
                "delay": {"type": "number", "minimum": 0},
                "data": {"type": "object"},
            }
        }
    })
}

fn lifecycle() -> Value {
    let mut events: serde_json::Map<String, Value> =
        LIFECYCLE_EVENTS.iter().map(|event| (event.to_string(), actions())).collect();
    events.insert(
        "onCustomEvent".to_string(),
        json!({"type": "object", "additionalProperties": actions()}),
    );
    json!({"type": "object", "properties": events})
}

fn collection() -> Value {
    json!({"type": "object", "additionalProperties": product_card()})
}

fn app_config() -> Value {
    json!({
        "type": "object",
        "properties": {
            "surveys": {"type": "object", "additionalProperties": survey()},
            "visualizations": {"type": "object", "additionalProperties": visualization()},
            "productCards": collection(),
            "lifecycle": lifecycle(),
        }
    })
}

fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

fn is_price(value: &str) -> bool {
    Price::parse(value).is_ok()
}

fn compile(schema: Value) -> jsonschema::Validator {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .should_validate_formats(true)
        .with_format("url", is_url)
        .with_format("price", is_price)
        .build(&schema)
        .expect("built-in schema compiles")
}

pub static PRODUCT_CARD_SCHEMA: Lazy<jsonschema::Validator> = Lazy::new(|| compile(product_card()));
pub static COLLECTION_SCHEMA: Lazy<jsonschema::Validator> = Lazy::new(|| compile(collection()));
pub static CONFIG_SCHEMA: Lazy<jsonschema::Validator> = Lazy::new(|| compile(app_config()));

/// Runs `schema` over `instance` and returns every violation.
pub fn check(schema: &jsonschema::Validator, instance: &Value) -> Vec<ValidationError> {
    schema.iter_errors(instance).map(|e| convert(&e)).collect()
}

pub fn child(path: &[String], key: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(key.to_string());
    next
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Splits a JSON pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// `surveys.<key>.pages.<index>`
fn is_page_path(path: &[String]) -> bool {
    path.len() == 4 && path[0] == "surveys" && path[2] == "pages"
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn quoted_options(options: &Value) -> String {
    options
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| format!("'{}'", literal(item)))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .unwrap_or_default()
}

fn discriminator_error(page_path: &[String]) -> ValidationError {
    ValidationError::new(
        child(page_path, "type"),
        ErrorCode::InvalidUnionDiscriminator,
        format!(
            "Invalid discriminator value. Expected {}",
            PAGE_TYPES.iter().map(|t| format!("'{}'", t)).collect::<Vec<_>>().join(" | ")
        ),
    )
}

fn convert(error: &jsonschema::ValidationError<'_>) -> ValidationError {
    let path = pointer_segments(&error.instance_path.to_string());
    let instance: &Value = &error.instance;

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let property = literal(property);
            if property == "type" && is_page_path(&path) {
                return discriminator_error(&path);
            }
            ValidationError::new(child(&path, &property), ErrorCode::InvalidType, "Required")
        }
        ValidationErrorKind::Type { kind } => {
            let expected = match kind {
                TypeKind::Single(primitive) => primitive.to_string(),
                TypeKind::Multiple(_) => "value".to_string(),
            };
            let received = match instance {
                Value::Number(n) if expected == "integer" && !n.is_i64() && !n.is_u64() => "float",
                other => type_name(other),
            };
            ValidationError::new(
                path,
                ErrorCode::InvalidType,
                format!("Expected {}, received {}", expected, received),
            )
        }
        ValidationErrorKind::Enum { options } => {
            let parent = &path[..path.len().saturating_sub(1)];
            if path.last().map(String::as_str) == Some("type") && is_page_path(parent) {
                return discriminator_error(parent);
            }
            ValidationError::new(
                path,
                ErrorCode::InvalidEnumValue,
                format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    quoted_options(options),
                    literal(instance)
                ),
            )
        }
        ValidationErrorKind::MinLength { limit } => {
            let message = length_message("at least", *limit, &path);
            ValidationError::new(path, ErrorCode::TooSmall, message)
        }
        ValidationErrorKind::MaxLength { limit } => {
            let message = length_message("at most", *limit, &path);
            ValidationError::new(path, ErrorCode::TooBig, message)
        }
        ValidationErrorKind::Minimum { limit } => ValidationError::new(
            path,
            ErrorCode::TooSmall,
            format!("Number must be greater than or equal to {}", limit),
        ),
        ValidationErrorKind::Maximum { limit } => ValidationError::new(
            path,
            ErrorCode::TooBig,
            format!("Number must be less than or equal to {}", limit),
        ),
        ValidationErrorKind::MinItems { limit } => ValidationError::new(
            path,
            ErrorCode::TooSmall,
            format!("Array must contain at least {} element(s)", limit),
        ),
        // gtin is the only patterned field.
        ValidationErrorKind::Pattern { .. } => {
            ValidationError::new(path, ErrorCode::InvalidString, "Must be 8 to 14 digits")
        }
        ValidationErrorKind::Format { format } if format == "price" => {
            match instance.as_str().map(Price::parse) {
                Some(Err(PriceError::OutOfRange)) => {
                    ValidationError::new(path, ErrorCode::Custom, PriceError::OutOfRange.to_string())
                }
                _ => ValidationError::new(path, ErrorCode::InvalidString, PriceError::Format.to_string()),
            }
        }
        ValidationErrorKind::Format { format } => {
            ValidationError::new(path, ErrorCode::InvalidString, format!("Invalid {}", format))
        }
        _ => ValidationError::new(path, ErrorCode::Custom, error.to_string()),
    }
}

/// Fixed-length fields (`currency`, `size_system`) read "exactly".
fn length_message(bound: &str, limit: u64, path: &[String]) -> String {
    let fixed = matches!(path.last().map(String::as_str), Some("currency") | Some("size_system"));
    if fixed {
        format!("String must contain exactly {} character(s)", limit)
    } else {
        format!("String must contain {} {} character(s)", bound, limit)
    }
}
