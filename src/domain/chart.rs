use crate::domain::aggregation::{bucket, DateOrder};
use crate::domain::interval::DaySegment;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_LABEL: &str = "Unknown";

pub const PALETTE: [&str; 30] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#AA6384", "#2CA21B", "#FD6A02", "#965AA2", "#D982B5",
    "#2C3E50", "#3498DB", "#F39C12", "#16A085", "#2980B9", "#D35400", "#8E44AD", "#27AE60",
    "#C0392B", "#7D3C98", "#2E4053", "#1ABC9C", "#5499C7", "#AF7AC5", "#48C9B0", "#A569BD",
    "#45B39D", "#7D3C98", "#D5DBDB", "#283747", "#1B4F72", "#641E16",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartLabel {
    pub id: i64,
    pub display_name: String,
}

impl ChartLabel {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<f64>,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub axis_labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// One series per owner, one value per day.
    #[default]
    ByEntity,
    /// One series per day, one value per declared label.
    ByDate,
}

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

pub fn assemble(
    labels: &[ChartLabel],
    segments: &[DaySegment],
    mode: ChartMode,
    order: DateOrder,
) -> ChartData {
    let buckets = bucket(segments);
    let axis = buckets.axis(order);
    let axis_labels = axis
        .iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>();

    let series = match mode {
        ChartMode::ByEntity => buckets
            .owners()
            .iter()
            .enumerate()
            .map(|(index, owner_id)| ChartSeries {
                label: labels
                    .iter()
                    .find(|label| label.id == *owner_id)
                    .map(|label| label.display_name.clone())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                values: buckets.row(*owner_id, &axis),
                color: palette_color(index).to_string(),
            })
            .collect(),
        ChartMode::ByDate => {
            // Color index is chronological regardless of `order`.
            let ascending = buckets.axis(DateOrder::Ascending);
            axis.iter()
                .zip(axis_labels.iter())
                .map(|(date, axis_label)| {
                    let color_index = ascending
                        .iter()
                        .position(|candidate| candidate == date)
                        .unwrap_or_default();
                    ChartSeries {
                        label: axis_label.clone(),
                        values: labels
                            .iter()
                            .map(|label| buckets.hours(label.id, *date))
                            .collect(),
                        color: palette_color(color_index).to_string(),
                    }
                })
                .collect()
        }
    };

    ChartData {
        axis_labels,
        series,
    }
}
