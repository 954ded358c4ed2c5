//! Markup helpers shared by every renderer.
//!
//! Every user-controlled string reaches markup through [`escape`] or, inside
//! scripts, through [`script_json`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SAFE_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#[0-9a-fA-F]{3,8}|[a-zA-Z]{1,20}|rgba?\(\s*[0-9.%]+\s*(?:,\s*[0-9.%]+\s*){2,3}\))$").unwrap()
});

/// Escapes `& < > " '`.
pub fn escape(text: &str) -> String {
    htmlescape::encode_minimal(text).replace('\'', "&#x27;")
}

/// JSON safe to embed inside a script element: `<`, `>` and `&` never appear literally.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let raw = serde_json::to_string(value)?;
    Ok(raw
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}

/// Accepts hex, named and rgb()/rgba() colors; anything else becomes `fallback`.
pub fn sanitize_color<'a>(raw: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = raw.trim();
    if SAFE_COLOR.is_match(trimmed) {
        trimmed
    } else {
        fallback
    }
}

/// Escaped href for http(s) URLs only; other schemes collapse to `#`.
pub fn safe_href(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => escape(raw),
        _ => "#".to_string(),
    }
}

/// Cuts to `max` characters and appends `...`. Apply before escaping.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn script_tag(body: &str) -> String {
    format!("<script type=\"text/javascript\">\n{}\n</script>", body)
}

pub fn external_script_tag(src: &str) -> String {
    format!("<script type=\"text/javascript\" src=\"{}\"></script>", escape(src))
}

/// A complete standalone document.
pub struct Document<'a> {
    pub title: &'a str,
    pub styles: &'a str,
    pub head_extra: String,
    pub body: String,
    pub script: Option<String>,
}

impl<'a> Document<'a> {
    pub fn new(title: &'a str, styles: &'a str, body: String) -> Self {
        Self {
            title,
            styles,
            head_extra: String::new(),
            body,
            script: None,
        }
    }

    pub fn with_head(mut self, extra: String) -> Self {
        self.head_extra = extra;
        self
    }

    pub fn with_script(mut self, script: String) -> Self {
        self.script = Some(script);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.styles.len() + self.body.len() + 512);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("  <meta charset=\"UTF-8\">\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        out.push_str(&format!("  <title>{}</title>\n", escape(self.title)));
        if !self.head_extra.is_empty() {
            out.push_str(&self.head_extra);
            out.push('\n');
        }
        out.push_str("  <style>\n");
        out.push_str(self.styles);
        out.push_str("\n  </style>\n</head>\n<body>\n");
        out.push_str(&self.body);
        out.push('\n');
        if let Some(script) = &self.script {
            out.push_str(&script_tag(script));
            out.push('\n');
        }
        out.push_str("</body>\n</html>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_five() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }

    #[test]
    fn test_script_json_breaks_out_of_nothing() {
        let json = script_json(&serde_json::json!({"t": "</script><script>alert(1)"})).unwrap();
        assert!(!json.contains('<'));
        assert!(!json.contains('>'));
    }

    #[test]
    fn test_sanitize_color() {
        assert_eq!(sanitize_color("#667eea", "#007bff"), "#667eea");
        assert_eq!(sanitize_color("rgb(1, 2, 3)", "#007bff"), "rgb(1, 2, 3)");
        assert_eq!(sanitize_color("red;}</style>", "#007bff"), "#007bff");
    }

    #[test]
    fn test_safe_href() {
        assert_eq!(safe_href("https://example.com/a?b=1&c=2"), "https://example.com/a?b=1&amp;c=2");
        assert_eq!(safe_href("javascript:alert(1)"), "#");
    }

    #[test]
    fn test_truncate_on_chars() {
        assert_eq!(truncate("héllo world", 5), "héllo...");
        assert_eq!(truncate("short", 10), "short");
    }
}
