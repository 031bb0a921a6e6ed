// Horizontal bar chart rendered as plain markup.
//
// Bars are scaled against the largest value, so the largest bar is always 100% wide.
// When no value is positive every bar is drawn at 0%.

use std::fmt::Write as _;
use std::sync::Arc;

use shared::calculator::Calculator;
use shared::models::ChartDatum;

use crate::dom::{escape_html, Document};

pub struct BarChartRenderer {
    document: Arc<dyn Document>,
}

impl BarChartRenderer {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self { document }
    }

    /// Replaces the content of `container_id` with the chart. Returns false, touching
    /// nothing, when the container does not exist.
    pub fn render(&self, data: &[ChartDatum], container_id: &str) -> bool {
        let Some(container) = self.document.get_element_by_id(container_id) else {
            tracing::debug!(container_id, "Chart container not found");
            return false;
        };
        match self.document.set_inner_html(container, &Self::markup(data)) {
            Ok(()) => {
                tracing::debug!(container_id, bars = data.len(), "Chart rendered");
                true
            }
            Err(e) => {
                tracing::warn!(container_id, error = %e, "Could not render chart");
                false
            }
        }
    }

    pub fn markup(data: &[ChartDatum]) -> String {
        let widths = bar_widths(data);
        let mut html = String::from(r#"<div class="simple-chart">"#);
        for (item, width) in data.iter().zip(widths) {
            let _ = write!(
                html,
                concat!(
                    r#"<div class="chart-bar">"#,
                    r#"<div class="chart-label">{}</div>"#,
                    r#"<div class="chart-bar-container">"#,
                    r#"<div class="chart-bar-fill" style="width: {}%"></div>"#,
                    r#"</div>"#,
                    r#"<div class="chart-value">{}</div>"#,
                    r#"</div>"#
                ),
                escape_html(&item.label),
                width,
                item.value
            );
        }
        html.push_str("</div>");
        html
    }
}

/// Width of each bar in percent of the largest value, rounded to two decimals.
pub fn bar_widths(data: &[ChartDatum]) -> Vec<f64> {
    let max = data
        .iter()
        .map(|d| d.value)
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    data.iter()
        .map(|d| {
            if max <= 0.0 || !d.value.is_finite() {
                return 0.0;
            }
            Calculator::round2(d.value / max * 100.0).clamp(0.0, 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    fn data(values: &[(&str, f64)]) -> Vec<ChartDatum> {
        values.iter().map(|(l, v)| ChartDatum::new(*l, *v)).collect()
    }

    #[test]
    fn test_widths_scale_to_max() {
        let widths = bar_widths(&data(&[("A", 50.0), ("B", 150.0), ("C", 100.0)]));
        assert_eq!(widths, vec![33.33, 100.0, 66.67]);
    }

    #[test]
    fn test_widths_without_positive_max() {
        assert_eq!(bar_widths(&data(&[("A", 0.0), ("B", 0.0)])), vec![0.0, 0.0]);
        assert_eq!(bar_widths(&data(&[("A", -5.0), ("B", -1.0)])), vec![0.0, 0.0]);
        assert!(bar_widths(&[]).is_empty());
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        assert_eq!(bar_widths(&data(&[("A", -10.0), ("B", 20.0)])), vec![0.0, 100.0]);
    }

    #[test]
    fn test_markup_escapes_labels() {
        let html = BarChartRenderer::markup(&data(&[("<b>Área</b>", 10.0)]));
        assert!(html.starts_with(r#"<div class="simple-chart"><div class="chart-bar">"#));
        assert!(html.contains(r#"<div class="chart-label">&lt;b&gt;Área&lt;/b&gt;</div>"#));
        assert!(html.contains(r#"style="width: 100%""#));
        assert!(html.contains(r#"<div class="chart-value">10</div>"#));
        assert!(html.ends_with("</div></div>"));
    }

    #[test]
    fn test_empty_data_renders_wrapper() {
        assert_eq!(BarChartRenderer::markup(&[]), r#"<div class="simple-chart"></div>"#);
    }

    #[test]
    fn test_render_into_container() {
        let doc = Arc::new(MemoryDocument::new());
        let container = doc.append_element(doc.body(), "div", Some("grafico")).unwrap();
        let renderer = BarChartRenderer::new(doc.clone());
        let items = data(&[("Consultoría", 1200.5), ("Auditoría", 800.0)]);

        assert!(renderer.render(&items, "grafico"));
        assert_eq!(doc.inner_html(container), BarChartRenderer::markup(&items));
        assert!(doc.inner_html(container).contains("width: 66.64%"));
    }

    #[test]
    fn test_render_missing_container_is_noop() {
        let doc = Arc::new(MemoryDocument::new());
        let renderer = BarChartRenderer::new(doc.clone());
        assert!(!renderer.render(&data(&[("A", 1.0)]), "nope"));
        assert!(doc.descendants(doc.body()).is_empty());
    }
}
