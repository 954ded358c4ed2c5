//! Visualization documents: chart, metrics grid, table and the custom placeholder.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::RenderContext;
use crate::render::html::{escape, external_script_tag, sanitize_color, script_json, Document};
use crate::resources::{ChartType, MetricSpec, Visualization, VisualizationKind};

pub const DEFAULT_COLORS: [&str; 5] = ["#3498db", "#e74c3c", "#f39c12", "#2ecc71", "#9b59b6"];
const MISSING: &str = "—";

pub type Row = Map<String, Value>;

/// Rows for `visualization.data_source`: an array of objects or one object in the context data.
pub fn rows_from_context(visualization: &Visualization, context: Option<&RenderContext>) -> Vec<Row> {
    match context.and_then(|ctx| ctx.data_value(&visualization.data_source)) {
        Some(Value::Array(items)) => items.iter().filter_map(|i| i.as_object().cloned()).collect(),
        Some(Value::Object(row)) => vec![row.clone()],
        _ => vec![],
    }
}

pub fn render(visualization: &Visualization, rows: &[Row], chart_library_url: &str) -> Result<String, serde_json::Error> {
    let description = visualization
        .description
        .as_deref()
        .map(|d| format!("<p class=\"description\">{}</p>", escape(d)))
        .unwrap_or_default();
    let heading = format!("<h1>{}</h1>\n{}", escape(&visualization.title), description);

    let document = match visualization.kind {
        VisualizationKind::Chart => {
            let script = chart_script(visualization, rows)?;
            let empty = if rows.is_empty() {
                "<p class=\"empty-state\">No data available yet.</p>"
            } else {
                ""
            };
            let body = container(&heading, &format!("{}<canvas id=\"chart\"></canvas>", empty));
            Document::new(&visualization.title, STYLES, body)
                .with_head(format!("  {}", external_script_tag(chart_library_url)))
                .with_script(script)
        }
        VisualizationKind::Metrics => {
            let specs = visualization
                .config
                .as_ref()
                .and_then(|c| c.metrics.as_deref())
                .unwrap_or(&[]);
            let body = container(&heading, &metrics_grid(specs, rows.first()));
            Document::new(&visualization.title, STYLES, body)
        }
        VisualizationKind::Table => {
            let body = container(&heading, &table(rows));
            Document::new(&visualization.title, STYLES, body)
        }
        VisualizationKind::Custom => {
            let body = container(
                &heading,
                &format!(
                    "<div class=\"custom-placeholder\" data-visualization-id=\"{}\">Custom visualization coming soon</div>",
                    escape(&visualization.id)
                ),
            );
            Document::new(&visualization.title, STYLES, body)
        }
    };

    Ok(document.render())
}

fn container(heading: &str, content: &str) -> String {
    format!("<div class=\"visualization-container\">\n{}\n{}\n</div>", heading, content)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartDataset {
    label: String,
    data: Vec<Value>,
    background_color: Vec<String>,
    border_color: Vec<String>,
    border_width: u32,
    fill: bool,
}

#[derive(Serialize)]
struct ChartSpec {
    #[serde(rename = "type")]
    chart_type: &'static str,
    labels: Vec<String>,
    datasets: Vec<ChartDataset>,
    legend: bool,
}

fn chart_script(visualization: &Visualization, rows: &[Row]) -> Result<String, serde_json::Error> {
    let config = visualization.config.clone().unwrap_or_default();
    let chart_type = config.chart_type.unwrap_or_default();

    let colors: Vec<String> = match config.colors.as_deref() {
        Some(colors) if !colors.is_empty() => colors
            .iter()
            .zip(DEFAULT_COLORS.iter().cycle())
            .map(|(c, fallback)| sanitize_color(c, fallback).to_string())
            .collect(),
        _ => DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
    };

    let labels = rows
        .iter()
        .enumerate()
        .map(|(i, row)| match config.x_axis.as_deref().and_then(|x| row.get(x)) {
            Some(value) => literal(value),
            None => format!("{}", i + 1),
        })
        .collect();
    let data = rows
        .iter()
        .map(|row| {
            config
                .y_axis
                .as_deref()
                .and_then(|y| row.get(y))
                .filter(|v| v.is_number())
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect();

    let spec = ChartSpec {
        chart_type: chart_type.library_type(),
        labels,
        datasets: vec![ChartDataset {
            label: config.y_axis.clone().unwrap_or_else(|| visualization.title.clone()),
            data,
            background_color: colors.clone(),
            border_color: colors,
            border_width: 1,
            fill: chart_type == ChartType::Area,
        }],
        legend: chart_type == ChartType::Pie,
    };

    Ok(format!("const CHART = {};\n{}", script_json(&spec)?, CHART_BEHAVIOR))
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Formats one metric value. Unknown formats and non-numeric values pass through literally.
pub fn format_metric(value: Option<&Value>, format: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return MISSING.to_string();
    };
    let Some(n) = value.as_f64() else {
        return literal(value);
    };
    match format {
        Some("currency") => format!("${:.2}", n),
        Some("percentage") => format!("{:.0}%", n * 100.0),
        Some("rating") => format!("{:.1} ★", n),
        Some("number") => format!("{}", n.floor() as i64),
        _ => literal(value),
    }
}

fn metrics_grid(specs: &[MetricSpec], row: Option<&Row>) -> String {
    let cards = specs
        .iter()
        .map(|metric| {
            let value = format_metric(row.and_then(|r| r.get(&metric.field)), metric.format.as_deref());
            format!(
                "<div class=\"metric-card\"><div class=\"metric-value\">{}</div><div class=\"metric-label\">{}</div></div>",
                escape(&value),
                escape(&metric.label)
            )
        })
        .collect::<String>();
    format!("<div class=\"metrics-grid\">{}</div>", cards)
}

fn table(rows: &[Row]) -> String {
    let mut headers: Vec<&str> = vec![];
    for row in rows {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    if headers.is_empty() {
        return "<p class=\"empty-state\">No data available yet.</p>".to_string();
    }

    let head = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect::<String>();
    let body = rows
        .iter()
        .map(|row| {
            let cells = headers
                .iter()
                .map(|h| format!("<td>{}</td>", escape(&row.get(*h).map(literal).unwrap_or_default())))
                .collect::<String>();
            format!("<tr>{}</tr>", cells)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("<table>\n<thead><tr>{}</tr></thead>\n<tbody>\n{}\n</tbody>\n</table>", head, body)
}

const CHART_BEHAVIOR: &str = r#"(function () {
  var canvas = document.getElementById('chart');
  if (typeof Chart === 'undefined' || !canvas) { return; }
  new Chart(canvas.getContext('2d'), {
    type: CHART.type,
    data: { labels: CHART.labels, datasets: CHART.datasets },
    options: {
      responsive: true,
      maintainAspectRatio: true,
      plugins: { legend: { display: CHART.legend } }
    }
  });
})();"#;

const STYLES: &str = r#"    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 1000px; margin: 0 auto; padding: 20px; background: #f5f5f5; }
    .visualization-container { background: white; border-radius: 8px; padding: 24px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
    h1 { margin: 0 0 8px 0; font-size: 24px; color: #333; }
    .description { color: #666; margin-bottom: 24px; }
    canvas { max-height: 400px; }
    .empty-state { color: #999; font-style: italic; }
    .metrics-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; }
    .metric-card { background: #f8f9fa; border-radius: 8px; padding: 20px; text-align: center; }
    .metric-value { font-size: 36px; font-weight: bold; color: #3498db; margin-bottom: 8px; }
    .metric-label { font-size: 14px; color: #666; text-transform: uppercase; letter-spacing: 0.5px; }
    table { width: 100%; border-collapse: collapse; }
    th, td { padding: 12px; text-align: left; border-bottom: 1px solid #eee; }
    th { background: #f8f9fa; font-weight: 600; color: #333; }
    .custom-placeholder { padding: 40px; text-align: center; color: #999; border: 2px dashed #ddd; border-radius: 8px; }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn viz(raw: Value) -> Visualization {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_metric_formats() {
        assert_eq!(format_metric(Some(&json!(1234.5)), Some("currency")), "$1234.50");
        assert_eq!(format_metric(Some(&json!(0.42)), Some("percentage")), "42%");
        assert_eq!(format_metric(Some(&json!(4.26)), Some("rating")), "4.3 ★");
        assert_eq!(format_metric(Some(&json!(17.9)), Some("number")), "17");
        assert_eq!(format_metric(Some(&json!("n/a")), Some("currency")), "n/a");
        assert_eq!(format_metric(None, None), "—");
    }

    #[test]
    fn test_chart_uses_axes() {
        let v = viz(json!({
            "id": "v1", "title": "Scores", "type": "chart", "dataSource": "scores",
            "trigger": "manual",
            "config": {"chartType": "area", "xAxis": "name", "yAxis": "score", "colors": ["#111111", "bad;color"]}
        }));
        let rows = vec![
            json!({"name": "Ann", "score": 3}).as_object().cloned().unwrap(),
            json!({"name": "Bo", "score": 5}).as_object().cloned().unwrap(),
        ];
        let html = render(&v, &rows, "https://cdn.example/chart.js").unwrap();
        assert!(html.contains(r#""labels":["Ann","Bo"]"#));
        assert!(html.contains(r#""data":[3,5]"#));
        assert!(html.contains(r#""type":"line""#));
        assert!(html.contains(r#""fill":true"#));
        assert!(!html.contains("bad;color"));
        assert!(html.contains("src=\"https://cdn.example/chart.js\""));
    }

    #[test]
    fn test_table_escapes_cells() {
        let v = viz(json!({"id": "t", "title": "T", "type": "table", "dataSource": "rows", "trigger": "manual"}));
        let rows = vec![json!({"name": "<b>x</b>"}).as_object().cloned().unwrap()];
        let html = render(&v, &rows, "").unwrap();
        assert!(html.contains("<th>name</th>"));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn test_rows_from_context() {
        let v = viz(json!({"id": "t", "title": "T", "type": "table", "dataSource": "stats", "trigger": "manual"}));
        let ctx = RenderContext::default().with_data(json!({"stats": {"a": 1}}).as_object().cloned().unwrap());
        assert_eq!(rows_from_context(&v, Some(&ctx)).len(), 1);
        assert!(rows_from_context(&v, None).is_empty());
    }
}
