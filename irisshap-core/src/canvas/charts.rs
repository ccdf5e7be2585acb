//! Dashboard panels built from query results.

use super::components::{
    BarPolarTrace, BoxTrace, ChartSpec, IndicatorMode, IndicatorTrace, ScatterTrace,
    SplomDimension, SplomTrace, TraceSpec,
};
use crate::query::{ClassDistribution, PairwiseData, RecordComparison};
use crate::schema::{Feature, FEATURE_COUNT};
use crate::table::{round_to, DISPLAY_DECIMALS};

/// Bar and gauge colour of each feature, in [`Feature::ALL`] order.
pub const FEATURE_COLORS: [&str; FEATURE_COUNT] = ["#E4FF87", "#70DDFF", "#709BFF", "#FFAA70"];
/// Angular position of each feature's bar on the polar charts.
pub const POLAR_THETA: [f64; FEATURE_COUNT] = [45.0, 135.0, 225.0, 270.0];
/// Fixed radial range of the polar charts.
pub const POLAR_RADIAL_RANGE: [f64; 2] = [0.0, 7.0];
/// Axis range of every gauge.
pub const GAUGE_RANGE: [f64; 2] = [-4.0, 4.0];
/// Bubble diameter per unit of normalized attribution.
pub const BUBBLE_SCALE: f64 = 10.0;

const ATTRIBUTE_AXIS: &str = "Sepal and Petal attributes";

fn feature_labels() -> Vec<String> {
    Feature::ALL.iter().map(|f| f.short_name().to_string()).collect()
}

fn display_means(means: &[f64; FEATURE_COUNT]) -> Vec<f64> {
    means.iter().map(|m| round_to(*m, DISPLAY_DECIMALS)).collect()
}

/// Distribution of raw attributions per feature for one class.
pub fn box_plot(dist: &ClassDistribution) -> ChartSpec {
    ChartSpec::new()
        .title("Class-specific Comparison between Attributes (Box Plot)")
        .y_axis(ATTRIBUTE_AXIS)
        .traces(dist.features.iter().map(|f| {
            TraceSpec::Box(BoxTrace {
                name: f.name.clone(),
                values: f.raw.clone(),
                show_points: true,
            })
        }))
}

/// Raw attribution against shift, marker size proportional to the
/// normalized attribution.
pub fn bubble_chart(dist: &ClassDistribution) -> ChartSpec {
    ChartSpec::new()
        .title("Class-specific Comparison between Attributes (Bubble Chart)")
        .x_axis("Shift")
        .y_axis(ATTRIBUTE_AXIS)
        .traces(dist.features.iter().map(|f| {
            TraceSpec::Scatter(ScatterTrace {
                name: f.name.clone(),
                x: dist.shift.clone(),
                y: f.raw.clone(),
                sizes: Some(f.normalized.iter().map(|v| v * BUBBLE_SCALE).collect()),
                opacity: Some(0.7),
                hover_text: Some(format!("shift, {}", f.name)),
            })
        }))
}

/// Title of the per-record polar comparison.
pub fn polar_title(cmp: &RecordComparison) -> String {
    format!(
        "Comparison of Record \"{}\" Vs \"{}\" Average",
        cmp.row, cmp.class_name
    )
}

/// Normalized attributions of one record next to its class average.
pub fn polar_comparison(cmp: &RecordComparison) -> ChartSpec {
    let bars = |r: Vec<f64>, subplot: usize| {
        TraceSpec::BarPolar(BarPolarTrace {
            r,
            theta: POLAR_THETA.to_vec(),
            colors: FEATURE_COLORS.iter().map(|c| c.to_string()).collect(),
            labels: feature_labels(),
            opacity: Some(0.8),
            subplot,
        })
    };

    ChartSpec::new()
        .title(polar_title(cmp))
        .grid(1, 2)
        .subplot_titles(["Selected Record", "Represented Class"])
        .radial_range(POLAR_RADIAL_RANGE[0], POLAR_RADIAL_RANGE[1])
        .height(500)
        .hide_legend()
        .trace(bars(cmp.record_normalized.to_vec(), 1))
        .trace(bars(display_means(&cmp.class_mean_normalized), 2))
}

/// Raw attributions of one record (top row, with delta against the class
/// mean) and the raw class means (bottom row).
pub fn gauge_comparison(cmp: &RecordComparison) -> ChartSpec {
    let means = display_means(&cmp.class_mean_raw);
    let titles = Feature::ALL
        .iter()
        .map(|f| format!("{}-record", f.short_name()))
        .chain(Feature::ALL.iter().map(|f| format!("{}-class", f.short_name())));

    let record_row = Feature::ALL.iter().map(|f| {
        let i = f.index();
        TraceSpec::Indicator(IndicatorTrace {
            mode: IndicatorMode::GaugeNumberDelta,
            value: cmp.record_raw[i],
            reference: Some(means[i]),
            color: FEATURE_COLORS[i].to_string(),
            range: GAUGE_RANGE,
            row: 1,
            col: i + 1,
        })
    });
    let class_row = Feature::ALL.iter().map(|f| {
        let i = f.index();
        TraceSpec::Indicator(IndicatorTrace {
            mode: IndicatorMode::GaugeNumber,
            value: means[i],
            reference: None,
            color: FEATURE_COLORS[i].to_string(),
            range: GAUGE_RANGE,
            row: 2,
            col: i + 1,
        })
    });

    ChartSpec::new()
        .grid(2, FEATURE_COUNT)
        .subplot_titles(titles)
        .hide_legend()
        .traces(record_row)
        .traces(class_row)
}

/// Lower-triangle scatter-plot matrix of the raw attributions, coloured by
/// class.
pub fn pairwise_matrix(data: &PairwiseData) -> ChartSpec {
    ChartSpec::new()
        .size(700, 600)
        .trace(TraceSpec::Splom(SplomTrace {
            dimensions: data
                .dimensions
                .iter()
                .map(|d| SplomDimension {
                    label: d.label.clone(),
                    values: d.values.clone(),
                })
                .collect(),
            colors: data.targets.iter().map(|t| t.value() as f64).collect(),
            show_upper_half: false,
        }))
}

/// Label shown under the record picker.
pub fn class_display(cmp: &RecordComparison) -> String {
    format!("Class of selected record: \"{}\"", cmp.class_name)
}
