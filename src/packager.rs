//! Resource Packager - Addressed Envelopes
//!
//! Wraps rendered content as `{uri, content, encoding}` without inspecting it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ResourceContent {
    #[serde(rename = "rawHtml")]
    RawHtml {
        #[serde(rename = "htmlString")]
        html_string: String,
    },
    #[serde(rename = "externalUrl")]
    ExternalUrl {
        #[serde(rename = "iframeUrl")]
        iframe_url: String,
    },
}

impl ResourceContent {
    pub fn html(&self) -> Option<&str> {
        match self {
            ResourceContent::RawHtml { html_string } => Some(html_string),
            ResourceContent::ExternalUrl { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackagedResource {
    pub uri: String,
    pub content: ResourceContent,
    pub encoding: String,
}

impl PackagedResource {
    pub fn html(&self) -> Option<&str> {
        self.content.html()
    }

    /// URI without its last segment, which is the instance id for rendered resources.
    pub fn base_uri(&self) -> &str {
        self.uri.rsplit_once('/').map_or(self.uri.as_str(), |(base, _)| base)
    }
}

/// `<unix-millis>-<process sequence><random suffix>`.
///
/// The sequence makes back-to-back ids distinct within one process even when
/// the clock has not advanced.
pub fn instance_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}{}", millis, seq, &random[..9])
}

#[derive(Debug, Clone)]
pub struct Packager {
    scheme: String,
}

impl Packager {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self { scheme: scheme.into() }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Caller-supplied ids are used verbatim; otherwise a fresh instance id is generated.
    pub fn package(&self, kind: &str, content: ResourceContent, contextual_id: Option<&str>) -> PackagedResource {
        let identifier = match contextual_id {
            Some(id) => id.to_string(),
            None => instance_id(),
        };
        PackagedResource {
            uri: format!("{}://{}/{}", self.scheme, kind, identifier),
            content,
            encoding: "text".to_string(),
        }
    }

    /// Rendered HTML addressed as `<kind>/<resource id>/<instance id>`.
    pub fn package_html(&self, kind: &str, resource_id: &str, html: String) -> PackagedResource {
        let contextual = format!("{}/{}", resource_id, instance_id());
        self.package(kind, ResourceContent::RawHtml { html_string: html }, Some(&contextual))
    }

    /// Iframe resource pointing at the hosted app page `<base url>/<kind>`.
    pub fn external_app(&self, kind: &str, resource_id: &str, app_base_url: &str) -> PackagedResource {
        let iframe_url = format!("{}/{}", app_base_url.trim_end_matches('/'), kind);
        self.package(kind, ResourceContent::ExternalUrl { iframe_url }, Some(resource_id))
    }
}

impl Default for Packager {
    fn default() -> Self {
        Self::new("ui")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wire_shape() {
        let packager = Packager::default();
        let resource = packager.package(
            "survey",
            ResourceContent::RawHtml { html_string: "<p>x</p>".into() },
            Some("s1"),
        );
        let wire = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "uri": "ui://survey/s1",
                "content": {"type": "rawHtml", "htmlString": "<p>x</p>"},
                "encoding": "text"
            })
        );
    }

    #[test]
    fn test_instance_ids_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| instance_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_external_app() {
        let resource = Packager::default().external_app("survey", "s1", "http://localhost:3000/");
        assert_eq!(resource.uri, "ui://survey/s1");
        assert_eq!(
            resource.content,
            ResourceContent::ExternalUrl { iframe_url: "http://localhost:3000/survey".into() }
        );
    }
}
