//! Template Renderer - Resource Lookup, Eligibility, Markup, Packaging
//!
//! A missing id is a hard error. An ineligible resource is `Ok(None)`.

pub mod html;
pub mod product_card;
pub mod survey;
pub mod visualization;

use thiserror::Error;
use tracing::debug;

use crate::condition::ConditionEvaluator;
use crate::context::RenderContext;
use crate::hashing::content_digest;
use crate::packager::{PackagedResource, Packager};
use crate::resources::{AppConfig, DisplayMode};
use crate::settings::EngineSettings;
use crate::trigger::is_eligible;

pub const SURVEY_KIND: &str = "survey";
pub const VISUALIZATION_KIND: &str = "visualization";
pub const PRODUCT_CARD_KIND: &str = "productCard";

/// URI segments used when packaging each kind.
const SURVEY_URI: &str = "survey";
const VISUALIZATION_URI: &str = "visualization";
const PRODUCT_CARD_URI: &str = "product-card";
const PRODUCT_GRID_URI: &str = "product-cards";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{kind} with ID \"{id}\" not found in configuration")]
    NotFound { kind: &'static str, id: String },

    #[error("No renderer registered for resource kind \"{0}\"")]
    UnknownKind(String),

    #[error("No valid product cards found")]
    EmptySelection,

    #[error("Plugin \"{plugin}\" failed: {message}")]
    Plugin { plugin: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RenderError {
    fn not_found(kind: &'static str, id: &str) -> Self {
        RenderError::NotFound { kind, id: id.to_string() }
    }
}

/// Everything a renderer needs besides the configuration itself.
#[derive(Clone, Copy)]
pub struct RenderEnv<'a> {
    pub settings: &'a EngineSettings,
    pub packager: &'a Packager,
    pub conditions: &'a dyn ConditionEvaluator,
}

fn packaged(env: &RenderEnv<'_>, uri_kind: &str, id: &str, html: String) -> PackagedResource {
    debug!(kind = uri_kind, id, digest = %content_digest(&html), bytes = html.len(), "rendered resource");
    env.packager.package_html(uri_kind, id, html)
}

pub fn render_survey(
    config: &AppConfig,
    id: &str,
    context: Option<&RenderContext>,
    env: &RenderEnv<'_>,
) -> Result<Option<PackagedResource>, RenderError> {
    let survey = config
        .surveys
        .get(id)
        .ok_or_else(|| RenderError::not_found("Survey", id))?;

    if !is_eligible(survey, context, env.conditions) {
        debug!(id, "survey not eligible");
        return Ok(None);
    }

    let html = survey::render(survey, &env.settings.default_primary_color)?;
    Ok(Some(packaged(env, SURVEY_URI, id, html)))
}

pub fn render_visualization(
    config: &AppConfig,
    id: &str,
    context: Option<&RenderContext>,
    env: &RenderEnv<'_>,
) -> Result<Option<PackagedResource>, RenderError> {
    let viz = config
        .visualizations
        .get(id)
        .ok_or_else(|| RenderError::not_found("Visualization", id))?;

    if !is_eligible(viz, context, env.conditions) {
        debug!(id, "visualization not eligible");
        return Ok(None);
    }

    let rows = visualization::rows_from_context(viz, context);
    let html = visualization::render(viz, &rows, &env.settings.chart_library_url)?;
    Ok(Some(packaged(env, VISUALIZATION_URI, id, html)))
}

/// Renders in the card's own display mode unless `mode` overrides it.
pub fn render_product_card(
    config: &AppConfig,
    id: &str,
    context: Option<&RenderContext>,
    mode: Option<DisplayMode>,
    env: &RenderEnv<'_>,
) -> Result<Option<PackagedResource>, RenderError> {
    let card = config
        .product_cards
        .get(id)
        .ok_or_else(|| RenderError::not_found("Product card", id))?;

    if !is_eligible(card, context, env.conditions) {
        debug!(id, "product card not eligible");
        return Ok(None);
    }

    let html = product_card::render(card, mode.unwrap_or(card.display_mode));
    Ok(Some(packaged(env, PRODUCT_CARD_URI, id, html)))
}

/// One document for several cards. Unknown ids are skipped; an empty result is an error.
pub fn render_product_grid(
    config: &AppConfig,
    ids: &[String],
    env: &RenderEnv<'_>,
) -> Result<PackagedResource, RenderError> {
    let cards: Vec<_> = ids
        .iter()
        .filter_map(|id| {
            let card = config.product_cards.get(id);
            if card.is_none() {
                tracing::warn!(id = %id, "product card missing from grid selection");
            }
            card
        })
        .collect();

    if cards.is_empty() {
        return Err(RenderError::EmptySelection);
    }

    let html = product_card::render_grid(&cards);
    debug!(count = cards.len(), digest = %content_digest(&html), "rendered product grid");
    Ok(env.packager.package(
        PRODUCT_GRID_URI,
        crate::packager::ResourceContent::RawHtml { html_string: html },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::PatternConditionEvaluator;
    use serde_json::json;

    fn config() -> AppConfig {
        serde_json::from_value(json!({
            "surveys": {
                "s1": {"id": "s1", "title": "S", "trigger": "conversation_start",
                       "pages": [{"type": "rating", "id": "r", "title": "Rate"}]}
            },
            "productCards": {
                "p1": {"id": "p1", "title": "P", "description": "d", "link": "https://e.com",
                       "image_link": "https://e.com/i.png", "price": "10.00 USD", "availability": "in_stock"}
            }
        }))
        .unwrap()
    }

    fn with_env<T>(f: impl FnOnce(&RenderEnv<'_>) -> T) -> T {
        let settings = EngineSettings::default();
        let packager = Packager::default();
        let conditions = PatternConditionEvaluator::default();
        f(&RenderEnv { settings: &settings, packager: &packager, conditions: &conditions })
    }

    #[test]
    fn test_not_found_message() {
        let err = with_env(|env| render_survey(&config(), "nope", None, env)).unwrap_err();
        assert_eq!(err.to_string(), "Survey with ID \"nope\" not found in configuration");
    }

    #[test]
    fn test_ineligible_is_none() {
        let ctx = RenderContext::for_event("message_received");
        let result = with_env(|env| render_survey(&config(), "s1", Some(&ctx), env)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_uri_layout() {
        let resource = with_env(|env| render_product_card(&config(), "p1", None, None, env))
            .unwrap()
            .unwrap();
        assert!(resource.uri.starts_with("ui://product-card/p1/"));
        assert_eq!(resource.base_uri(), "ui://product-card/p1");
    }

    #[test]
    fn test_grid_skips_unknown() {
        let ids = vec!["p1".to_string(), "ghost".to_string()];
        let grid = with_env(|env| render_product_grid(&config(), &ids, env)).unwrap();
        assert!(grid.uri.starts_with("ui://product-cards/"));

        let none = with_env(|env| render_product_grid(&config(), &["ghost".to_string()], env));
        assert!(matches!(none, Err(RenderError::EmptySelection)));
    }
}
