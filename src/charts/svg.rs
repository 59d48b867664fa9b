//! SVG markup for the bar and pie charts.

use std::f64::consts::PI;
use std::fmt::Write as _;

use super::ChartSeries;

/// Bar fill colour; drawn with [`BAR_FILL_OPACITY`].
pub const BAR_FILL: &str = "#4BC0C0";
pub const BAR_FILL_OPACITY: f64 = 0.6;
pub const BAR_BORDER: &str = "#4BC0C0";

/// Wedge colours, cycled per category.
pub const PIE_PALETTE: [&str; 6] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40",
];

const GRID_COLOR: &str = "#E5E5E5";
const TEXT_COLOR: &str = "#666666";
const FONT_FAMILY: &str = "sans-serif";
const AXIS_TICKS: f64 = 5.0;

/// Logical size of a chart before rasterization scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartCanvas {
    pub width: f64,
    pub height: f64,
}

impl Default for ChartCanvas {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
        }
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn open_svg(canvas: ChartCanvas) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
         <rect width=\"{w}\" height=\"{h}\" fill=\"#FFFFFF\"/>\n",
        w = canvas.width,
        h = canvas.height
    )
}

/// Rounds `max` up to a readable axis limit with five ticks.
pub fn axis_limit(max: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 1.0;
    }
    let raw_step = max / AXIS_TICKS;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    let step = nice * magnitude;
    (max / step).ceil() * step
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value.round())
    } else {
        format!("{:.1}", value)
    }
}

/// Renders `series` as a vertical bar chart with a legend above the plot.
pub fn bar_chart(series: &ChartSeries, canvas: ChartCanvas) -> String {
    let mut svg = open_svg(canvas);

    let legend_y = 14.0;
    let legend_x = canvas.width / 2.0 - 40.0;
    let _ = writeln!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"30\" height=\"10\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\"/>",
        legend_x,
        legend_y - 8.0,
        BAR_FILL,
        BAR_FILL_OPACITY,
        BAR_BORDER
    );
    let _ = writeln!(
        svg,
        "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"10\" fill=\"{}\">{}</text>",
        legend_x + 36.0,
        legend_y,
        FONT_FAMILY,
        TEXT_COLOR,
        escape_xml(series.label())
    );

    let left = 40.0;
    let right = canvas.width - 10.0;
    let top = 30.0;
    let bottom = canvas.height - 80.0;
    let plot_height = bottom - top;
    let plot_width = right - left;

    let max = series
        .values()
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0, f64::max);
    let limit = axis_limit(max);

    for tick in 0..=(AXIS_TICKS as usize) {
        let value = limit * tick as f64 / AXIS_TICKS;
        let y = bottom - plot_height * tick as f64 / AXIS_TICKS;
        let _ = writeln!(
            svg,
            "<line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"{}\" stroke-width=\"1\"/>",
            left,
            right,
            GRID_COLOR
        );
        let _ = writeln!(
            svg,
            "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"9\" fill=\"{}\" text-anchor=\"end\">{}</text>",
            left - 4.0,
            y + 3.0,
            FONT_FAMILY,
            TEXT_COLOR,
            format_tick(value)
        );
    }

    if !series.is_empty() {
        let slot = plot_width / series.len() as f64;
        let bar_width = slot * 0.8;
        for (index, (label, value)) in series.iter().enumerate() {
            let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
            let height = plot_height * value / limit;
            let x = left + slot * index as f64 + slot * 0.1;
            let _ = writeln!(
                svg,
                "<rect class=\"bar\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                x,
                bottom - height,
                bar_width,
                height,
                BAR_FILL,
                BAR_FILL_OPACITY,
                BAR_BORDER
            );
            let label_x = x + bar_width / 2.0;
            let label_y = bottom + 8.0;
            let _ = writeln!(
                svg,
                "<text x=\"{lx:.2}\" y=\"{ly:.2}\" font-family=\"{}\" font-size=\"7\" fill=\"{}\" text-anchor=\"end\" transform=\"rotate(-45 {lx:.2} {ly:.2})\">{}</text>",
                FONT_FAMILY,
                TEXT_COLOR,
                escape_xml(label),
                lx = label_x,
                ly = label_y
            );
        }
    }

    let _ = writeln!(
        svg,
        "<line x1=\"{left}\" y1=\"{bottom}\" x2=\"{right}\" y2=\"{bottom}\" stroke=\"{}\" stroke-width=\"1\"/>",
        TEXT_COLOR
    );
    svg.push_str("</svg>\n");
    svg
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Renders `series` as a pie chart with the legend on the right, vertically centred.
pub fn pie_chart(series: &ChartSeries, canvas: ChartCanvas) -> String {
    let mut svg = open_svg(canvas);

    let legend_width = canvas.width * 0.38;
    let pie_width = canvas.width - legend_width;
    let cx = pie_width / 2.0;
    let cy = canvas.height / 2.0;
    let radius = (pie_width.min(canvas.height) / 2.0 - 10.0).max(1.0);

    let total: f64 = series
        .values()
        .iter()
        .copied()
        .filter(|value| value.is_finite() && *value > 0.0)
        .sum();

    if total > 0.0 {
        let mut angle = -PI / 2.0;
        for (index, value) in series.values().iter().copied().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                continue;
            }
            let color = PIE_PALETTE[index % PIE_PALETTE.len()];
            let sweep = value / total * 2.0 * PI;
            if sweep >= 2.0 * PI - 1e-9 {
                let _ = writeln!(
                    svg,
                    "<circle class=\"wedge\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{radius:.2}\" fill=\"{color}\" stroke=\"#FFFFFF\" stroke-width=\"2\"/>"
                );
            } else {
                let (x0, y0) = polar(cx, cy, radius, angle);
                let (x1, y1) = polar(cx, cy, radius, angle + sweep);
                let large_arc = u8::from(sweep > PI);
                let _ = writeln!(
                    svg,
                    "<path class=\"wedge\" d=\"M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {radius:.2} {radius:.2} 0 {large_arc} 1 {x1:.2} {y1:.2} Z\" fill=\"{color}\" stroke=\"#FFFFFF\" stroke-width=\"2\"/>"
                );
            }
            angle += sweep;
        }
    }

    let row_height = 14.0;
    let legend_height = row_height * series.len() as f64;
    let legend_x = pie_width + 6.0;
    let mut y = (canvas.height - legend_height) / 2.0;
    for (index, label) in series.labels().iter().enumerate() {
        let color = PIE_PALETTE[index % PIE_PALETTE.len()];
        let _ = writeln!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"24\" height=\"9\" fill=\"{}\"/>",
            legend_x, y, color
        );
        let _ = writeln!(
            svg,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"9\" fill=\"{}\">{}</text>",
            legend_x + 30.0,
            y + 8.0,
            FONT_FAMILY,
            TEXT_COLOR,
            escape_xml(label)
        );
        y += row_height;
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn axis_limit_rounds_up_to_nice_steps() {
        assert_eq!(axis_limit(0.0), 1.0);
        assert_eq!(axis_limit(9.0), 10.0);
        assert_eq!(axis_limit(1899.99), 2000.0);
        assert_eq!(axis_limit(43.0), 50.0);
    }

    #[test]
    fn bar_chart_draws_one_bar_per_entry() {
        let series = ChartSeries::from_pairs(
            "Product Price",
            vec![("Widget", 4.0), ("Widget", 8.0), ("Gadget", 2.5)],
        );
        let svg = bar_chart(&series, ChartCanvas::default());
        assert_eq!(count(&svg, "class=\"bar\""), 3);
        assert_eq!(count(&svg, ">Widget</text>"), 2);
        assert!(svg.contains(">Product Price</text>"));
    }

    #[test]
    fn bar_chart_escapes_labels() {
        let series = ChartSeries::from_pairs("Product Price", vec![("Salt & <Pepper>", 1.0)]);
        let svg = bar_chart(&series, ChartCanvas::default());
        assert!(svg.contains("Salt &amp; &lt;Pepper&gt;"));
    }

    #[test]
    fn pie_chart_skips_empty_wedges_but_keeps_legend() {
        let series = ChartSeries::from_pairs(
            "Product Categories",
            vec![("beauty", 10.0), ("free", 0.0), ("furniture", 30.0)],
        );
        let svg = pie_chart(&series, ChartCanvas::default());
        assert_eq!(count(&svg, "class=\"wedge\""), 2);
        assert!(svg.contains(">free</text>"));
        assert!(svg.contains(PIE_PALETTE[2]));
    }

    #[test]
    fn single_category_is_a_full_circle() {
        let series = ChartSeries::from_pairs("Product Categories", vec![("beauty", 10.0)]);
        let svg = pie_chart(&series, ChartCanvas::default());
        assert!(svg.contains("<circle class=\"wedge\""));
    }

    #[test]
    fn empty_series_render_frames_only() {
        let empty = ChartSeries::default();
        assert_eq!(count(&bar_chart(&empty, ChartCanvas::default()), "class=\"bar\""), 0);
        assert_eq!(count(&pie_chart(&empty, ChartCanvas::default()), "class=\"wedge\""), 0);
    }
}
