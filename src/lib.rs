#![recursion_limit = "256"]
//! MCP-APP Core - Interactive Resources for Conversational Hosts
//!
//! Validates declarative app configurations (product cards, surveys,
//! visualizations, lifecycle rules), decides which resources are eligible
//! for a runtime event and renders them as self-contained HTML documents
//! addressed by URI.
//!
//! # Ground Rules
//! 1. Validation is total and never raises
//! 2. Rendering never trusts configuration text
//! 3. Ineligible is not an error
//! 4. Every render gets a fresh instance URI

pub mod price;
pub mod resources;
pub mod schema;
pub mod validation;
pub mod context;
pub mod condition;
pub mod trigger;
pub mod render;
pub mod packager;
pub mod registry;
pub mod lifecycle;
pub mod submission;
pub mod settings;
pub mod hashing;
pub mod engine;

pub use price::{Price, PriceError};
pub use resources::{AppConfig, DisplayMode, LifecycleAction, ProductCard, Survey, SurveyPage, Trigger, Visualization};
pub use validation::{validate_config, validate_product_card, validate_product_card_collection};
pub use validation::{ValidationError, ValidationErrors, ValidationResult, ValidationRule, Validator};
pub use context::{LifecycleContext, RenderContext};
pub use condition::{Condition, ConditionError, ConditionEvaluator, PatternConditionEvaluator, UnrecognizedPolicy};
pub use trigger::is_eligible;
pub use render::{RenderEnv, RenderError};
pub use packager::{PackagedResource, Packager, ResourceContent};
pub use registry::{Plugin, PluginError, RendererRegistry, ResourceRenderer};
pub use submission::{PageResponse, SurveySubmission};
pub use settings::{EngineSettings, SettingsError};
pub use hashing::{config_digest, content_digest};
pub use engine::Engine;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
