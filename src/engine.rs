//! Engine - Single Entry Point
//!
//! Bundles settings, the renderer registry, the condition evaluator and the
//! packager. Every public operation goes through here; the engine is
//! `Send + Sync` and may be shared across threads once built.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::condition::{ConditionEvaluator, PatternConditionEvaluator};
use crate::context::{LifecycleContext, RenderContext};
use crate::hashing::config_digest;
use crate::lifecycle;
use crate::packager::{PackagedResource, Packager};
use crate::registry::RendererRegistry;
use crate::render::{self, RenderEnv, RenderError};
use crate::resources::{AppConfig, DisplayMode, LifecycleAction, ProductCard};
use crate::settings::EngineSettings;
use crate::validation::{ValidationResult, Validator};

pub struct Engine {
    settings: EngineSettings,
    registry: RendererRegistry,
    conditions: Box<dyn ConditionEvaluator>,
    packager: Packager,
    validator: Validator,
}

impl Engine {
    /// Built-in renderers, pattern conditions under the configured policy.
    pub fn new(settings: EngineSettings) -> Self {
        let conditions = PatternConditionEvaluator::new(settings.unrecognized_conditions);
        Self {
            packager: Packager::new(settings.uri_scheme.clone()),
            registry: RendererRegistry::with_builtins(),
            conditions: Box::new(conditions),
            validator: Validator::new(),
            settings,
        }
    }

    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_condition_evaluator(mut self, conditions: impl ConditionEvaluator + 'static) -> Self {
        self.conditions = Box::new(conditions);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Setup-time access for registering renderers and plugins.
    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    fn env(&self) -> RenderEnv<'_> {
        RenderEnv {
            settings: &self.settings,
            packager: &self.packager,
            conditions: self.conditions.as_ref(),
        }
    }

    /// Validates a raw configuration and notifies plugins when it passes.
    pub fn validate_config(&self, raw: &Value) -> ValidationResult<AppConfig> {
        let result = self.validator.validate_config(raw);
        match &result.data {
            Some(config) => {
                if let Ok(digest) = config_digest(config) {
                    info!(digest = %digest, surveys = config.surveys.len(), "configuration accepted");
                }
                self.registry.notify_config_load(config);
            }
            None => debug!(errors = result.errors.len(), "configuration rejected"),
        }
        result
    }

    pub fn validate_product_card(&self, raw: &Value) -> ValidationResult<ProductCard> {
        self.validator.validate_product_card(raw)
    }

    pub fn validate_product_card_collection(&self, raw: &Value) -> ValidationResult<BTreeMap<String, ProductCard>> {
        self.validator.validate_product_card_collection(raw)
    }

    pub fn render_survey(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        render::render_survey(config, id, context, &self.env())
    }

    pub fn render_visualization(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        render::render_visualization(config, id, context, &self.env())
    }

    pub fn render_product_card(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        render::render_product_card(config, id, context, None, &self.env())
    }

    pub fn render_product_card_as(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
        mode: DisplayMode,
    ) -> Result<Option<PackagedResource>, RenderError> {
        render::render_product_card(config, id, context, Some(mode), &self.env())
    }

    pub fn render_product_grid(&self, config: &AppConfig, ids: &[String]) -> Result<PackagedResource, RenderError> {
        render::render_product_grid(config, ids, &self.env())
    }

    /// Renders through the registry. A plugin may answer first.
    ///
    /// Render failures are reported to plugins before being returned.
    pub fn render(
        &self,
        kind: &str,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        if let Some(resource) = self.registry.notify_render(kind, id, context) {
            debug!(kind, id, uri = %resource.uri, "plugin supplied resource");
            return Ok(Some(resource));
        }

        let renderer = self
            .registry
            .get_renderer(kind)
            .ok_or_else(|| RenderError::UnknownKind(kind.to_string()))?;

        renderer.render(config, id, context, &self.env()).map_err(|e| {
            self.registry.notify_error(&e);
            e
        })
    }

    pub fn dispatch_lifecycle(&self, config: &AppConfig, context: &LifecycleContext) -> Vec<LifecycleAction> {
        lifecycle::dispatch(config, context, self.conditions.as_ref())
    }

    /// Iframe resource for the hosted app page of `kind`.
    pub fn external_app_resource(&self, kind: &str, resource_id: &str) -> PackagedResource {
        self.packager.external_app(kind, resource_id, &self.settings.app_base_url)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionError;
    use serde_json::json;

    fn config() -> AppConfig {
        let raw = json!({
            "surveys": {
                "s1": {"id": "s1", "title": "Welcome", "trigger": "conversation_start",
                       "condition": "data.firstVisit",
                       "pages": [{"type": "textInput", "id": "q", "title": "Hi?"}]}
            }
        });
        Engine::default().validate_config(&raw).into_result().unwrap()
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_render_through_registry() {
        let engine = Engine::default();
        let ctx = RenderContext::for_event("conversation_start")
            .with_data(json!({"firstVisit": true}).as_object().cloned().unwrap());
        let resource = engine.render("survey", &config(), "s1", Some(&ctx)).unwrap().unwrap();
        assert!(resource.uri.starts_with("ui://survey/s1/"));

        let err = engine.render("chart", &config(), "s1", None).unwrap_err();
        assert!(matches!(err, RenderError::UnknownKind(_)));
    }

    #[test]
    fn test_custom_evaluator() {
        let engine = Engine::default().with_condition_evaluator(
            |_condition: &str, _ctx: &RenderContext| -> Result<bool, ConditionError> { Ok(false) },
        );
        let ctx = RenderContext::for_event("conversation_start")
            .with_data(json!({"firstVisit": true}).as_object().cloned().unwrap());
        assert!(engine.render_survey(&config(), "s1", Some(&ctx)).unwrap().is_none());
    }

    #[test]
    fn test_scheme_and_external_app() {
        let settings = EngineSettings {
            uri_scheme: "app".into(),
            ..EngineSettings::default()
        };
        let engine = Engine::new(settings);
        let resource = engine.external_app_resource("survey", "s1");
        assert_eq!(resource.uri, "app://survey/s1");
    }
}
