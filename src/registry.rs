//! Renderer Registry - Resource Kind to Renderer Mapping
//!
//! Caller-owned. Written during setup, read-only while serving.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::context::RenderContext;
use crate::packager::PackagedResource;
use crate::render::{
    render_product_card, render_survey, render_visualization, RenderEnv, RenderError, PRODUCT_CARD_KIND,
    SURVEY_KIND, VISUALIZATION_KIND,
};
use crate::resources::AppConfig;

pub trait ResourceRenderer: Send + Sync {
    fn render(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
        env: &RenderEnv<'_>,
    ) -> Result<Option<PackagedResource>, RenderError>;
}

impl<F> ResourceRenderer for F
where
    F: Fn(&AppConfig, &str, Option<&RenderContext>, &RenderEnv<'_>) -> Result<Option<PackagedResource>, RenderError>
        + Send
        + Sync,
{
    fn render(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
        env: &RenderEnv<'_>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        self(config, id, context, env)
    }
}

pub struct SurveyRenderer;

impl ResourceRenderer for SurveyRenderer {
    fn render(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
        env: &RenderEnv<'_>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        render_survey(config, id, context, env)
    }
}

pub struct VisualizationRenderer;

impl ResourceRenderer for VisualizationRenderer {
    fn render(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
        env: &RenderEnv<'_>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        render_visualization(config, id, context, env)
    }
}

/// Renders in each card's configured display mode.
pub struct ProductCardRenderer;

impl ResourceRenderer for ProductCardRenderer {
    fn render(
        &self,
        config: &AppConfig,
        id: &str,
        context: Option<&RenderContext>,
        env: &RenderEnv<'_>,
    ) -> Result<Option<PackagedResource>, RenderError> {
        render_product_card(config, id, context, None, env)
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct PluginError {
    pub message: String,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Extension hooks. Every hook has a no-op default.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Called once on registration; may register renderers.
    fn on_init(&self, _registry: &mut RendererRegistry) -> Result<(), PluginError> {
        Ok(())
    }

    fn on_config_load(&self, _config: &AppConfig) -> Result<(), PluginError> {
        Ok(())
    }

    /// A `Some` result short-circuits the registered renderer.
    fn on_render(
        &self,
        _kind: &str,
        _id: &str,
        _context: Option<&RenderContext>,
    ) -> Result<Option<PackagedResource>, PluginError> {
        Ok(None)
    }

    fn on_error(&self, _error: &(dyn std::error::Error + 'static)) -> Result<(), PluginError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn ResourceRenderer>>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `survey`, `visualization` and `productCard`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SURVEY_KIND, SurveyRenderer);
        registry.register(VISUALIZATION_KIND, VisualizationRenderer);
        registry.register(PRODUCT_CARD_KIND, ProductCardRenderer);
        registry
    }

    /// Replaces any renderer already registered for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, renderer: impl ResourceRenderer + 'static) {
        let kind = kind.into();
        if self.renderers.contains_key(&kind) {
            warn!(kind = %kind, "renderer already registered, overwriting");
        }
        self.renderers.insert(kind, Arc::new(renderer));
    }

    pub fn get_renderer(&self, kind: &str) -> Option<Arc<dyn ResourceRenderer>> {
        self.renderers.get(kind).cloned()
    }

    pub fn has_renderer(&self, kind: &str) -> bool {
        self.renderers.contains_key(kind)
    }

    /// Sorted for stable output.
    pub fn registered_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        info!(plugin = plugin.name(), version = plugin.version(), "registering plugin");
        self.plugins.push(Arc::clone(&plugin));
        if let Err(e) = plugin.on_init(self) {
            Self::report(plugin.as_ref(), "on_init", &e);
        }
    }

    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    pub fn notify_config_load(&self, config: &AppConfig) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_config_load(config) {
                Self::report(plugin.as_ref(), "on_config_load", &e);
            }
        }
    }

    /// First plugin returning a resource wins. Failing plugins are skipped.
    pub fn notify_render(&self, kind: &str, id: &str, context: Option<&RenderContext>) -> Option<PackagedResource> {
        for plugin in &self.plugins {
            match plugin.on_render(kind, id, context) {
                Ok(Some(resource)) => return Some(resource),
                Ok(None) => {}
                Err(e) => Self::report(plugin.as_ref(), "on_render", &e),
            }
        }
        None
    }

    pub fn notify_error(&self, err: &(dyn std::error::Error + 'static)) {
        for plugin in &self.plugins {
            if let Err(e) = plugin.on_error(err) {
                error!(plugin = plugin.name(), error = %e, "plugin on_error hook failed");
            }
        }
    }

    fn report(plugin: &dyn Plugin, hook: &str, err: &PluginError) {
        error!(plugin = plugin.name(), hook, error = %err, "plugin hook failed");
        if let Err(e) = plugin.on_error(err) {
            error!(plugin = plugin.name(), error = %e, "plugin on_error hook failed");
        }
    }
}
