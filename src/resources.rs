//! Resource Model - Validated App Configuration
//!
//! Typed view of a configuration that already passed `validation`.
//! Deserializing these types directly skips the cross-field rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::price::Price;

pub type ResourceId = String;

/// Runtime event class that makes a resource eligible to render automatically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Manual,
    ConversationStart,
    MessageReceived,
    SurveyComplete,
    ConditionMet,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Manual => "manual",
            Trigger::ConversationStart => "conversation_start",
            Trigger::MessageReceived => "message_received",
            Trigger::SurveyComplete => "survey_complete",
            Trigger::ConditionMet => "condition_met",
        }
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::Manual
    }
}

/// Anything the trigger evaluator can gate.
pub trait Triggered {
    fn trigger(&self) -> Trigger;
    fn condition(&self) -> Option<&str>;
}

// --- Product cards ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Preorder,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Card,
    List,
    Compact,
}

impl DisplayMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "card" => Some(Self::Card),
            "list" => Some(Self::List),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    New,
    Refurbished,
    Used,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Newborn,
    Infant,
    Toddler,
    Kids,
    Adult,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unisex,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PickupMethod {
    InStore,
    Reserve,
    NotSupported,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    PartOfSet,
    RequiredPart,
    OftenBoughtWith,
    Substitute,
    DifferentBrand,
    Accessory,
}

/// One sellable item, following the product feed attribute names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_search: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_checkout: Option<bool>,

    pub id: ResourceId,
    pub title: String,
    pub description: String,
    pub link: String,

    pub image_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_image_link: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_3d_link: Option<String>,

    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable_taxes_fees: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price_effective_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_trend: Option<String>,

    pub availability: Availability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_quantity: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ItemCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_review_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_review_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q_and_a: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_group_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variant1_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variant1_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variant2_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variant2_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variant3_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variant3_option: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_estimate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_method: Option<PickupMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_sla: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_privacy_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_tos: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_window: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_restriction: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,

    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub trigger: Trigger,
}

impl ProductCard {
    /// Sale price, only when it actually undercuts the regular price.
    pub fn effective_sale_price(&self) -> Option<&Price> {
        self.sale_price
            .as_ref()
            .filter(|sale| sale.minor_units() < self.price.minor_units())
    }

    pub fn discount_percent(&self) -> Option<u32> {
        self.sale_price
            .as_ref()
            .and_then(|sale| self.price.discount_percent(sale))
    }
}

impl Triggered for ProductCard {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn condition(&self) -> Option<&str> {
        None
    }
}

// --- Surveys ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub id: ResourceId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub body: SurveyBody,
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<SurveyStyling>,
}

impl Survey {
    pub fn pages(&self) -> Option<&[SurveyPage]> {
        match &self.body {
            SurveyBody::Pages(pages) => Some(pages),
            SurveyBody::Fields(_) => None,
        }
    }

    pub fn is_multi_page(&self) -> bool {
        matches!(&self.body, SurveyBody::Pages(pages) if !pages.is_empty())
    }
}

impl Triggered for Survey {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

/// Exactly one of the legacy flat field list or the paginated form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyBody {
    Fields(Vec<SurveyField>),
    Pages(Vec<SurveyPage>),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SurveyTheme {
    #[default]
    Default,
    Minimal,
    Gradient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStyling {
    #[serde(default)]
    pub theme: SurveyTheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Number,
    MultipleChoice,
    SingleChoice,
    Rating,
    Date,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Legacy single-form field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<TextValidation>,
}

/// One question per page, tagged on `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurveyPage {
    TextInput(TextInputPage),
    MultipleChoice(MultipleChoicePage),
    Rating(RatingPage),
}

impl SurveyPage {
    pub fn id(&self) -> &str {
        match self {
            SurveyPage::TextInput(p) => &p.id,
            SurveyPage::MultipleChoice(p) => &p.id,
            SurveyPage::Rating(p) => &p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SurveyPage::TextInput(p) => &p.title,
            SurveyPage::MultipleChoice(p) => &p.title,
            SurveyPage::Rating(p) => &p.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SurveyPage::TextInput(p) => p.description.as_deref(),
            SurveyPage::MultipleChoice(p) => p.description.as_deref(),
            SurveyPage::Rating(p) => p.description.as_deref(),
        }
    }

    pub fn required(&self) -> bool {
        match self {
            SurveyPage::TextInput(p) => p.required,
            SurveyPage::MultipleChoice(p) => p.required,
            SurveyPage::Rating(p) => p.required,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInputPage {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<TextValidation>,
}

fn default_rows() -> u32 { 3 }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_question: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoicePage {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub options: Vec<ChoiceOption>,
    #[serde(default = "default_true")]
    pub allow_multiple: bool,
    #[serde(default)]
    pub allow_user_options: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPage {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_rating_min")]
    pub min: i64,
    #[serde(default = "default_rating_max")]
    pub max: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<RatingLabels>,
}

fn default_rating_min() -> i64 { 1 }
fn default_rating_max() -> i64 { 5 }

// --- Visualizations ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationKind {
    Chart,
    Table,
    Metrics,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
}

impl ChartType {
    /// Chart.js type name; area charts are filled line charts.
    pub fn library_type(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line | ChartType::Area => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSpec {
    pub label: String,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<MetricSpec>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub id: ResourceId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: VisualizationKind,
    pub data_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<VisualizationOptions>,
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Triggered for Visualization {
    fn trigger(&self) -> Trigger {
        self.trigger
    }

    fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

// --- Lifecycle ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ShowSurvey,
    ShowVisualization,
    ShowProductCard,
    SendMessage,
    ShowModal,
    SaveData,
    TriggerMcpTool,
    ConditionalBranch,
    DelayAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleAction {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_card_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_conversation_start: Option<Vec<LifecycleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_message_received: Option<Vec<LifecycleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_survey_complete: Option<Vec<LifecycleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_visualization_shown: Option<Vec<LifecycleAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_custom_event: Option<BTreeMap<String, Vec<LifecycleAction>>>,
}

/// The unit of validation: every resource plus lifecycle rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub surveys: BTreeMap<ResourceId, Survey>,
    #[serde(default)]
    pub visualizations: BTreeMap<ResourceId, Visualization>,
    #[serde(default)]
    pub product_cards: BTreeMap<ResourceId, ProductCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
}
