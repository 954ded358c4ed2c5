//! Runtime contexts supplied per render or dispatch call. Never persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_id: Option<String>,
}

impl RenderContext {
    pub fn for_event(event: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_survey_id(mut self, id: impl Into<String>) -> Self {
        self.survey_id = Some(id.into());
        self
    }

    pub fn with_visualization_id(mut self, id: impl Into<String>) -> Self {
        self.visualization_id = Some(id.into());
        self
    }

    pub fn data_value(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }
}

/// Same shape as [`RenderContext`] with a mandatory event name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleContext {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_id: Option<String>,
}

impl LifecycleContext {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: None,
            survey_id: None,
            visualization_id: None,
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_survey_id(mut self, id: impl Into<String>) -> Self {
        self.survey_id = Some(id.into());
        self
    }

    pub fn with_visualization_id(mut self, id: impl Into<String>) -> Self {
        self.visualization_id = Some(id.into());
        self
    }

    /// Condition scope for action filtering; `data` defaults to an empty map.
    pub fn to_render_context(&self) -> RenderContext {
        RenderContext {
            event: Some(self.event.clone()),
            data: Some(self.data.clone().unwrap_or_default()),
            survey_id: self.survey_id.clone(),
            visualization_id: self.visualization_id.clone(),
        }
    }
}
