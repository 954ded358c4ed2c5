//! Validation System - Structure + Cross-Field Rules
//!
//! Structural checks (types, enums, bounds, formats) are the JSON Schema in `schema`.
//! Cross-field business rules are `ValidationRule` objects run by the `Validator`.
//! Validation is total: every offending path is collected before returning.

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::price::Price;
use crate::resources::{AppConfig, ProductCard};
use crate::schema::{self, child};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidType,
    InvalidString,
    InvalidEnumValue,
    InvalidUnionDiscriminator,
    TooSmall,
    TooBig,
    Custom,
}

/// One offending path. `path` segments are object keys or array indices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    pub path: Vec<String>,
    pub message: String,
    pub code: ErrorCode,
}

impl ValidationError {
    pub fn new(path: Vec<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code,
        }
    }

    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// True when `field` is one of the path segments.
    pub fn touches(&self, field: &str) -> bool {
        self.path.iter().any(|segment| segment == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dotted_path(), self.message)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid configuration: {}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

impl<T> ValidationResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: vec![],
        }
    }

    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self {
            success: false,
            data: None,
            errors,
        }
    }

    pub fn has_error_at(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.touches(field))
    }

    pub fn into_result(self) -> Result<T, ValidationErrors> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(ValidationErrors(self.errors)),
        }
    }
}

/// Cross-field rule over one raw JSON object.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, object: &Map<String, Value>, path: &[String]) -> Vec<ValidationError>;
}

// --- Product card rules ---

pub struct PreorderDateRule;

impl ValidationRule for PreorderDateRule {
    fn name(&self) -> &'static str { "preorder_date" }

    fn validate(&self, card: &Map<String, Value>, path: &[String]) -> Vec<ValidationError> {
        let preorder = card.get("availability").and_then(Value::as_str) == Some("preorder");
        let has_date = match card.get("availability_date") {
            Some(Value::String(date)) => !date.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };

        if preorder && !has_date {
            vec![ValidationError::new(
                child(path, "availability_date"),
                ErrorCode::Custom,
                "availability_date is required when availability is \"preorder\"",
            )]
        } else {
            vec![]
        }
    }
}

pub struct CheckoutRequiresSearchRule;

impl ValidationRule for CheckoutRequiresSearchRule {
    fn name(&self) -> &'static str { "checkout_requires_search" }

    fn validate(&self, card: &Map<String, Value>, path: &[String]) -> Vec<ValidationError> {
        let checkout = card.get("enable_checkout").and_then(Value::as_bool) == Some(true);
        let search = card.get("enable_search").and_then(Value::as_bool) == Some(true);

        if checkout && !search {
            vec![ValidationError::new(
                child(path, "enable_search"),
                ErrorCode::Custom,
                "enable_search must be true when enable_checkout is enabled",
            )]
        } else {
            vec![]
        }
    }
}

pub struct SalePriceRule;

impl ValidationRule for SalePriceRule {
    fn name(&self) -> &'static str { "sale_price" }

    fn validate(&self, card: &Map<String, Value>, path: &[String]) -> Vec<ValidationError> {
        let parse = |key: &str| {
            card.get(key)
                .and_then(Value::as_str)
                .and_then(|raw| Price::parse(raw).ok())
        };

        // Malformed prices are already reported by the schema pass.
        match (parse("price"), parse("sale_price")) {
            (Some(price), Some(sale)) if sale.minor_units() > price.minor_units() => {
                vec![ValidationError::new(
                    child(path, "sale_price"),
                    ErrorCode::Custom,
                    "sale_price must be less than or equal to price",
                )]
            }
            _ => vec![],
        }
    }
}

/// Product ids must be unique across one collection (id -> card map).
pub struct UniqueProductIdsRule;

impl ValidationRule for UniqueProductIdsRule {
    fn name(&self) -> &'static str { "unique_product_ids" }

    fn validate(&self, collection: &Map<String, Value>, path: &[String]) -> Vec<ValidationError> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        let mut violations = vec![];

        for (key, card) in collection {
            let Some(id) = card.get("id").and_then(Value::as_str) else {
                continue;
            };
            if let Some(first) = seen.insert(id, key) {
                seen.insert(id, first);
                violations.push(ValidationError::new(
                    child(&child(path, key), "id"),
                    ErrorCode::Custom,
                    format!("Product id \"{}\" is already used by \"{}\"", id, first),
                ));
            }
        }

        violations
    }
}

// --- Survey rules ---

pub struct FieldsXorPagesRule;

impl ValidationRule for FieldsXorPagesRule {
    fn name(&self) -> &'static str { "fields_xor_pages" }

    fn validate(&self, survey: &Map<String, Value>, path: &[String]) -> Vec<ValidationError> {
        let present = |key: &str| !matches!(survey.get(key), None | Some(Value::Null));

        if present("fields") == present("pages") {
            vec![ValidationError::new(
                path.to_vec(),
                ErrorCode::Custom,
                "Survey must have either \"fields\" or \"pages\", but not both",
            )]
        } else {
            vec![]
        }
    }
}

/// Page ids and option ids key the survey responses, so they must not repeat.
pub struct UniqueSurveyKeysRule;

impl ValidationRule for UniqueSurveyKeysRule {
    fn name(&self) -> &'static str { "unique_survey_keys" }

    fn validate(&self, survey: &Map<String, Value>, path: &[String]) -> Vec<ValidationError> {
        let Some(pages) = survey.get("pages").and_then(Value::as_array) else {
            return vec![];
        };

        let mut violations = vec![];
        let mut page_ids = HashMap::new();
        let pages_path = child(path, "pages");

        for (index, page) in pages.iter().enumerate() {
            let page_path = child(&pages_path, &index.to_string());

            if let Some(id) = page.get("id").and_then(Value::as_str) {
                if let Some(first) = page_ids.insert(id, index) {
                    page_ids.insert(id, first);
                    violations.push(ValidationError::new(
                        child(&page_path, "id"),
                        ErrorCode::Custom,
                        format!("Duplicate page id \"{}\" (first used by page {})", id, first),
                    ));
                }
            }

            let Some(options) = page.get("options").and_then(Value::as_array) else {
                continue;
            };
            let mut option_ids = HashMap::new();
            for (opt_index, option) in options.iter().enumerate() {
                if let Some(id) = option.get("id").and_then(Value::as_str) {
                    if option_ids.insert(id, opt_index).is_some() {
                        violations.push(ValidationError::new(
                            child(&child(&child(&page_path, "options"), &opt_index.to_string()), "id"),
                            ErrorCode::Custom,
                            format!("Duplicate option id \"{}\"", id),
                        ));
                    }
                }
            }
        }

        violations
    }
}

/// Rating scales must run upward; text length bounds must not cross.
pub struct PageBoundsRule;

impl ValidationRule for PageBoundsRule {
    fn name(&self) -> &'static str { "page_bounds" }

    fn validate(&self, survey: &Map<String, Value>, path: &[String]) -> Vec<ValidationError> {
        let Some(pages) = survey.get("pages").and_then(Value::as_array) else {
            return vec![];
        };

        let mut violations = vec![];
        for (index, page) in pages.iter().enumerate() {
            let page_path = child(&child(path, "pages"), &index.to_string());

            match page.get("type").and_then(Value::as_str) {
                Some("rating") => {
                    let min = page.get("min").and_then(Value::as_i64).unwrap_or(1);
                    let max = page.get("max").and_then(Value::as_i64).unwrap_or(5);
                    if min >= max {
                        violations.push(ValidationError::new(
                            child(&page_path, "min"),
                            ErrorCode::Custom,
                            format!("Rating min ({}) must be lower than max ({})", min, max),
                        ));
                    }
                }
                Some("textInput") => {
                    let Some(rules) = page.get("validation") else { continue };
                    let min = rules.get("minLength").and_then(Value::as_u64);
                    let max = rules.get("maxLength").and_then(Value::as_u64);
                    if let (Some(min), Some(max)) = (min, max) {
                        if min > max {
                            violations.push(ValidationError::new(
                                child(&child(&page_path, "validation"), "minLength"),
                                ErrorCode::Custom,
                                "minLength must not exceed maxLength",
                            ));
                        }
                    }
                }
                _ => {}
            }
        }

        violations
    }
}

/// Validator orchestrates the schema pass and the rule sets
pub struct Validator {
    product_rules: Vec<Box<dyn ValidationRule>>,
    collection_rules: Vec<Box<dyn ValidationRule>>,
    survey_rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            product_rules: vec![
                Box::new(PreorderDateRule),
                Box::new(CheckoutRequiresSearchRule),
                Box::new(SalePriceRule),
            ],
            collection_rules: vec![Box::new(UniqueProductIdsRule)],
            survey_rules: vec![
                Box::new(FieldsXorPagesRule),
                Box::new(UniqueSurveyKeysRule),
                Box::new(PageBoundsRule),
            ],
        }
    }

    /// Adds a caller-defined rule applied to every product card.
    pub fn with_product_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.product_rules.push(Box::new(rule));
        self
    }

    pub fn with_survey_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.survey_rules.push(Box::new(rule));
        self
    }

    pub fn validate_config(&self, raw: &Value) -> ValidationResult<AppConfig> {
        let mut errors = schema::check(&schema::CONFIG_SCHEMA, raw);

        if let Some(surveys) = section(raw, "surveys") {
            for (key, survey) in surveys {
                if let Some(obj) = survey.as_object() {
                    let path = vec!["surveys".to_string(), key.clone()];
                    run_rules(&self.survey_rules, obj, &path, &mut errors);
                }
            }
        }

        if let Some(cards) = section(raw, "productCards") {
            self.run_collection_rules(cards, &["productCards".to_string()], &mut errors);
        }

        debug!(errors = errors.len(), "config validation finished");
        finish(raw, errors)
    }

    pub fn validate_product_card(&self, raw: &Value) -> ValidationResult<ProductCard> {
        let mut errors = schema::check(&schema::PRODUCT_CARD_SCHEMA, raw);
        if let Some(card) = raw.as_object() {
            run_rules(&self.product_rules, card, &[], &mut errors);
        }
        finish(raw, errors)
    }

    pub fn validate_product_card_collection(
        &self,
        raw: &Value,
    ) -> ValidationResult<BTreeMap<String, ProductCard>> {
        let mut errors = schema::check(&schema::COLLECTION_SCHEMA, raw);
        if let Some(cards) = raw.as_object() {
            self.run_collection_rules(cards, &[], &mut errors);
        }
        finish(raw, errors)
    }

    /// Per-card rules, then rules spanning the whole collection.
    fn run_collection_rules(&self, cards: &Map<String, Value>, path: &[String], errors: &mut Vec<ValidationError>) {
        for (key, card) in cards {
            if let Some(card) = card.as_object() {
                run_rules(&self.product_rules, card, &child(path, key), errors);
            }
        }
        run_rules(&self.collection_rules, cards, path, errors);
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn section<'a>(raw: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    raw.get(key).and_then(Value::as_object)
}

fn run_rules(
    rules: &[Box<dyn ValidationRule>],
    object: &Map<String, Value>,
    path: &[String],
    errors: &mut Vec<ValidationError>,
) {
    for rule in rules {
        let violations = rule.validate(object, path);
        if !violations.is_empty() {
            debug!(rule = rule.name(), count = violations.len(), "rule violated");
        }
        errors.extend(violations);
    }
}

/// Converts a clean raw value into its typed form; any serde failure becomes a root error.
fn finish<T: DeserializeOwned>(raw: &Value, errors: Vec<ValidationError>) -> ValidationResult<T> {
    if !errors.is_empty() {
        return ValidationResult::failure(errors);
    }

    match serde_json::from_value(raw.clone()) {
        Ok(data) => ValidationResult::success(data),
        Err(e) => ValidationResult::failure(vec![ValidationError::new(
            vec![],
            ErrorCode::Custom,
            e.to_string(),
        )]),
    }
}

static DEFAULT_VALIDATOR: Lazy<Validator> = Lazy::new(Validator::new);

/// Validates a complete app configuration.
pub fn validate_config(raw: &Value) -> ValidationResult<AppConfig> {
    DEFAULT_VALIDATOR.validate_config(raw)
}

pub fn validate_product_card(raw: &Value) -> ValidationResult<ProductCard> {
    DEFAULT_VALIDATOR.validate_product_card(raw)
}

pub fn validate_product_card_collection(raw: &Value) -> ValidationResult<BTreeMap<String, ProductCard>> {
    DEFAULT_VALIDATOR.validate_product_card_collection(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card() -> Value {
        json!({
            "id": "PRODUCT-001",
            "title": "Test Product",
            "description": "A test product description",
            "link": "https://example.com/product",
            "image_link": "https://example.com/image.jpg",
            "price": "99.99 USD",
            "availability": "in_stock"
        })
    }

    #[test]
    fn test_minimal_card_valid() {
        let result = validate_product_card(&card());
        assert!(result.success, "{:?}", result.errors);
        let data = result.data.unwrap();
        assert_eq!(data.display_mode, crate::resources::DisplayMode::Card);
        assert_eq!(data.trigger, crate::resources::Trigger::Manual);
    }

    #[test]
    fn test_preorder_requires_date() {
        let mut raw = card();
        raw["availability"] = json!("preorder");
        let result = validate_product_card(&raw);
        assert!(!result.success);
        assert!(result.has_error_at("availability_date"));

        raw["availability_date"] = json!("2026-12-01");
        assert!(validate_product_card(&raw).success);
    }

    #[test]
    fn test_checkout_requires_search() {
        let mut raw = card();
        raw["enable_checkout"] = json!(true);
        raw["enable_search"] = json!(false);
        let result = validate_product_card(&raw);
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, vec!["enable_search"]);

        raw["enable_search"] = json!(true);
        assert!(validate_product_card(&raw).success);
    }

    #[test]
    fn test_sale_price_not_above_price() {
        let mut raw = card();
        raw["price"] = json!("100.00 USD");
        raw["sale_price"] = json!("120.00 USD");
        let result = validate_product_card(&raw);
        assert!(!result.success);
        assert!(result.has_error_at("sale_price"));

        raw["sale_price"] = json!("80.00 USD");
        assert!(validate_product_card(&raw).success);
    }

    #[test]
    fn test_duplicate_ids_in_collection() {
        let raw = json!({ "a": card(), "b": card() });
        let result = validate_product_card_collection(&raw);
        assert!(!result.success);
        assert_eq!(result.errors[0].path, vec!["b", "id"]);
    }

    #[test]
    fn test_errors_display_joined() {
        let mut raw = card();
        raw["price"] = json!("free");
        raw["link"] = json!("not a url");
        let err = validate_product_card(&raw).into_result().unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Invalid configuration: "));
        assert!(text.contains("price: "));
        assert!(text.contains("link: "));
    }
}
