//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for dashboard integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dashboard_lib::{Dashboard, DashboardConfig, ViewBody, WidgetKind, WidgetView};
use records::{RecordStore, WineReview};

/// Test harness owning a dashboard built over fixture records.
pub struct TestHarness {
    pub dashboard: Dashboard,
}

impl TestHarness {
    /// Dashboard over the sample cellar with the default configuration.
    pub fn with_sample_data() -> Self {
        Self::with_config(&DashboardConfig::default())
    }

    /// Dashboard over the sample cellar stacking only the given varieties.
    pub fn with_varieties(varieties: &[&str]) -> Self {
        let config = DashboardConfig {
            varieties: varieties.iter().map(|v| v.to_string()).collect(),
            ..DashboardConfig::default()
        };
        Self::with_config(&config)
    }

    pub fn with_config(config: &DashboardConfig) -> Self {
        let store = RecordStore::from_records(WineFixture::records());
        TestHarness {
            dashboard: Dashboard::build(store, config).unwrap(),
        }
    }

    pub fn select(&mut self, kind: WidgetKind, labels: &[&str]) {
        self.dashboard.select(kind, labels).unwrap();
    }

    pub fn view(&self, kind: WidgetKind) -> WidgetView {
        self.dashboard.view(kind).unwrap()
    }

    /// (label, count) rows of a selector.
    pub fn options(&self, kind: WidgetKind) -> Vec<(String, u64)> {
        match self.view(kind).body {
            ViewBody::Options { options } => options.into_iter().map(|o| (o.label, o.count)).collect(),
            other => panic!("{} is not a selector: {:?}", kind.name(), other),
        }
    }

    /// (label, value) rows of a bar chart.
    pub fn bars(&self, kind: WidgetKind) -> Vec<(String, f64)> {
        match self.view(kind).body {
            ViewBody::Bars { bars, .. } => bars.into_iter().map(|b| (b.label, b.value)).collect(),
            other => panic!("{} is not a bar chart: {:?}", kind.name(), other),
        }
    }

    pub fn visible(&self) -> usize {
        self.dashboard.data_count().selected
    }
}

/// Twelve reviews spread over five countries.
pub struct WineFixture;

impl WineFixture {
    pub fn rows() -> Vec<(&'static str, &'static str, i64, Option<i64>)> {
        vec![
            ("US", "Cabernet Sauvignon", 96, Some(235)),
            ("Spain", "Tinta de Toro", 96, Some(110)),
            ("US", "Sauvignon Blanc", 96, None),
            ("US", "Pinot Noir", 96, Some(65)),
            ("France", "Provence red blend", 95, Some(66)),
            ("Spain", "Tinta de Toro", 95, Some(73)),
            ("Spain", "Tinta de Toro", 95, Some(65)),
            ("Spain", "Tinta de Toro", 95, Some(110)),
            ("France", "Bordeaux-style Red Blend", 95, Some(15)),
            ("US", "Pinot Noir", 95, Some(65)),
            ("Italy", "Sangiovese", 82, Some(12)),
            ("Chile", "Malbec", 86, Some(22)),
        ]
    }

    pub fn records() -> Vec<WineReview> {
        Self::rows()
            .into_iter()
            .map(|(country, variety, points, price)| WineReview::new(country, variety, points, price))
            .collect()
    }

    /// The fixture as a CSV export, with an index column and a description
    /// column the loader ignores, and prices widened to decimals.
    pub fn csv() -> String {
        let mut text = String::from(",country,description,points,price,variety\n");
        for (i, (country, variety, points, price)) in Self::rows().into_iter().enumerate() {
            let price = price.map(|p| format!("{}.0", p)).unwrap_or_default();
            text.push_str(&format!(
                "{},{},\"Notes, tasting\",{},{},{}\n",
                i, country, points, price, variety
            ));
        }
        text
    }

    pub fn write_csv(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("winedata.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }
}
