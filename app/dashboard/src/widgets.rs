//! FILENAME: app/dashboard/src/widgets.rs
//! PURPOSE: Widget catalogue and the serialisable views they render to.

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ============================================================================
// WIDGET CATALOGUE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    CountrySelector,
    VarietySelector,
    PointsSelector,
    PriceSelector,
    CountryCount,
    CountryDistribution,
    AveragePoints,
    PointsDistribution,
    NationalVariety,
    PriceToPoints,
}

impl WidgetKind {
    /// Page order.
    pub const ALL: [WidgetKind; 10] = [
        WidgetKind::CountrySelector,
        WidgetKind::VarietySelector,
        WidgetKind::PointsSelector,
        WidgetKind::PriceSelector,
        WidgetKind::CountryCount,
        WidgetKind::CountryDistribution,
        WidgetKind::AveragePoints,
        WidgetKind::PointsDistribution,
        WidgetKind::NationalVariety,
        WidgetKind::PriceToPoints,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::CountrySelector => "country-selector",
            WidgetKind::VarietySelector => "variety-selector",
            WidgetKind::PointsSelector => "points-selector",
            WidgetKind::PriceSelector => "price-selector",
            WidgetKind::CountryCount => "country-count",
            WidgetKind::CountryDistribution => "country-distribution",
            WidgetKind::AveragePoints => "average-points",
            WidgetKind::PointsDistribution => "points-distribution",
            WidgetKind::NationalVariety => "national-variety",
            WidgetKind::PriceToPoints => "price-to-points",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WidgetKind::CountrySelector => "Country",
            WidgetKind::VarietySelector => "Variety",
            WidgetKind::PointsSelector => "Points",
            WidgetKind::PriceSelector => "Price",
            WidgetKind::CountryCount => "Wine Bottles per Country",
            WidgetKind::CountryDistribution => "Country Distribution",
            WidgetKind::AveragePoints => "Average Points",
            WidgetKind::PointsDistribution => "Points Distribution",
            WidgetKind::NationalVariety => "Variety % per Country",
            WidgetKind::PriceToPoints => "Price to Points",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, DashboardError> {
        let wanted = name.trim();
        WidgetKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| DashboardError::UnknownWidget(wanted.to_string()))
    }

    /// Whether selecting on the widget filters the others. The scatter plot
    /// is display only.
    pub fn is_brushable(self) -> bool {
        !matches!(self, WidgetKind::PriceToPoints)
    }
}

/// Parses a `WIDGET=LABEL` filter argument.
pub fn parse_filter_arg(arg: &str) -> Result<(WidgetKind, String), DashboardError> {
    let (widget, label) = arg
        .split_once('=')
        .ok_or_else(|| DashboardError::InvalidArgument(arg.to_string()))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(DashboardError::InvalidArgument(arg.to_string()));
    }
    Ok((WidgetKind::from_name(widget)?, label.to_string()))
}

// ============================================================================
// VIEWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub widget: WidgetKind,
    pub title: String,
    /// Labels currently selected on this widget's dimension.
    pub selected: Vec<String>,
    pub body: ViewBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewBody {
    /// Select menu; options with nothing behind them are hidden.
    Options { options: Vec<OptionRow> },
    Bars { axis: String, bars: Vec<Bar> },
    Pie { slices: Vec<Slice> },
    Stacked {
        series: Vec<String>,
        rows: Vec<StackedRow>,
    },
    Scatter {
        /// Price axis, from the cheapest and dearest priced wine.
        x_domain: Option<(i64, i64)>,
        points: Vec<ScatterPoint>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionRow {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: u64,
    /// Percentage of the pie, one decimal.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedRow {
    pub label: String,
    /// One percentage per series, same order as the series.
    pub percents: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub price: i64,
    pub points: i64,
    /// Wines sharing this exact price and score.
    pub count: u64,
    pub title: String,
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
