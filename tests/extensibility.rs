//! Extensibility and Sharing Tests
//!
//! Custom renderers, plugins, settings files and concurrent use.

use std::io::Write;
use std::sync::Arc;
use std::thread;

use serde_json::json;

use mcp_app_core::{
    validate_config, AppConfig, Engine, EngineSettings, PackagedResource, Plugin, PluginError, RenderContext,
    RenderEnv, RenderError, RendererRegistry, ResourceContent, UnrecognizedPolicy,
};

fn config() -> AppConfig {
    validate_config(&json!({
        "surveys": {
            "s1": {"id": "s1", "title": "Hello", "trigger": "message_received",
                   "condition": "custom rule nobody parses",
                   "pages": [{"type": "textInput", "id": "q", "title": "Say hi"}]}
        },
        "productCards": {
            "p1": {"id": "p1", "title": "Mug", "description": "Ceramic", "link": "https://e.com/mug",
                   "image_link": "https://e.com/mug.png", "price": "12.00 USD", "availability": "in_stock"}
        }
    }))
    .into_result()
    .unwrap()
}

fn banner(
    _config: &AppConfig,
    id: &str,
    _context: Option<&RenderContext>,
    env: &RenderEnv<'_>,
) -> Result<Option<PackagedResource>, RenderError> {
    Ok(Some(env.packager.package_html("banner", id, format!("<p>{}</p>", id))))
}

#[test]
fn custom_kind_renders_without_touching_core() {
    let mut registry = RendererRegistry::with_builtins();
    registry.register("banner", banner);
    let engine = Engine::default().with_registry(registry);

    let resource = engine.render("banner", &config(), "promo", None).unwrap().unwrap();
    assert!(resource.uri.starts_with("ui://banner/promo/"));
    assert_eq!(resource.html(), Some("<p>promo</p>"));
    assert!(engine.registry().has_renderer("survey"));
}

struct Override;

impl Plugin for Override {
    fn name(&self) -> &str {
        "override"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn on_render(
        &self,
        kind: &str,
        id: &str,
        _context: Option<&RenderContext>,
    ) -> Result<Option<PackagedResource>, PluginError> {
        match kind {
            "productCard" => Ok(Some(PackagedResource {
                uri: format!("ui://productCard/{}", id),
                content: ResourceContent::ExternalUrl { iframe_url: "https://cdn.example/card".into() },
                encoding: "text".into(),
            })),
            "survey" => Err(PluginError::new("not today")),
            _ => Ok(None),
        }
    }
}

#[test]
fn plugin_can_answer_or_fail_in_isolation() {
    let mut engine = Engine::default();
    engine.registry_mut().register_plugin(Arc::new(Override));

    let card = engine.render("productCard", &config(), "p1", None).unwrap().unwrap();
    assert_eq!(card.uri, "ui://productCard/p1");

    let ctx = RenderContext::for_event("message_received").with_data(serde_json::Map::new());
    let survey = engine.render("survey", &config(), "s1", Some(&ctx)).unwrap();
    assert!(survey.is_some());
}

#[test]
fn deny_policy_from_settings_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", json!({"unrecognizedConditions": "deny", "uriScheme": "mcp"})).unwrap();
    let settings = EngineSettings::load_from_file(file.path()).unwrap();
    assert_eq!(settings.unrecognized_conditions, UnrecognizedPolicy::Deny);

    let engine = Engine::new(settings);
    let ctx = RenderContext::for_event("message_received").with_data(serde_json::Map::new());
    assert!(engine.render_survey(&config(), "s1", Some(&ctx)).unwrap().is_none());

    let allow = Engine::default();
    let resource = allow.render_survey(&config(), "s1", Some(&ctx)).unwrap().unwrap();
    assert!(resource.uri.starts_with("ui://survey/s1/"));
}

#[test]
fn engine_shared_across_threads() {
    let engine = Arc::new(Engine::default());
    let config = Arc::new(config());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let config = Arc::clone(&config);
            thread::spawn(move || {
                (0..25)
                    .map(|_| engine.render_product_card(&config, "p1", None).unwrap().unwrap().uri)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut uris: Vec<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    let total = uris.len();
    uris.sort();
    uris.dedup();
    assert_eq!(uris.len(), total);
}
