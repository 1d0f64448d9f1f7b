//! FILENAME: tests/test_dashboard.rs
//! Integration tests for the linked dashboard widgets.

mod common;

use common::TestHarness;
use dashboard_lib::{render_json, render_text, DashboardError, ScatterPoint, Slice, ViewBody, WidgetKind};
use pretty_assertions::assert_eq;

fn rows<V: Copy>(pairs: &[(&str, V)]) -> Vec<(String, V)> {
    pairs.iter().map(|(label, v)| (label.to_string(), *v)).collect()
}

// ============================================================================
// SELECTORS
// ============================================================================

#[test]
fn test_initial_state() {
    let harness = TestHarness::with_sample_data();
    assert_eq!(harness.visible(), 12);
    assert_eq!(
        harness.options(WidgetKind::CountrySelector),
        rows(&[("Chile", 1), ("France", 2), ("Italy", 1), ("Spain", 4), ("US", 4)])
    );
    assert_eq!(
        harness.options(WidgetKind::PriceSelector),
        rows(&[
            ("$1 to $25", 3),
            ("$50 to $75", 5),
            ("Above $100", 3),
            ("Unknown", 1),
        ])
    );
    for kind in WidgetKind::ALL {
        assert!(harness.view(kind).selected.is_empty());
    }
}

#[test]
fn test_selector_keeps_its_own_options_and_filters_the_rest() {
    let mut harness = TestHarness::with_sample_data();
    harness.select(WidgetKind::CountrySelector, &["Spain"]);

    assert_eq!(harness.visible(), 4);
    assert_eq!(harness.view(WidgetKind::CountrySelector).selected, vec!["Spain".to_string()]);

    // The selector still offers every country with its full count.
    assert_eq!(
        harness.options(WidgetKind::CountrySelector),
        rows(&[("Chile", 1), ("France", 2), ("Italy", 1), ("Spain", 4), ("US", 4)])
    );

    // A chart on the same field has its own dimension, so it is filtered.
    assert_eq!(
        harness.bars(WidgetKind::CountryCount),
        rows(&[("Chile", 0.0), ("France", 0.0), ("Italy", 0.0), ("Spain", 4.0), ("US", 0.0)])
    );
    assert!(harness.view(WidgetKind::CountryCount).selected.is_empty());

    assert_eq!(
        harness.options(WidgetKind::VarietySelector),
        rows(&[("Tinta de Toro", 4)])
    );
}

#[test]
fn test_selectors_combine() {
    let mut harness = TestHarness::with_sample_data();
    harness.select(WidgetKind::PointsSelector, &["Excellent: Above 95"]);
    harness.select(WidgetKind::VarietySelector, &["Pinot Noir"]);

    assert_eq!(harness.visible(), 1);
    // Variety options only see the points filter.
    assert_eq!(
        harness.options(WidgetKind::VarietySelector),
        rows(&[("Cabernet Sauvignon", 1), ("Pinot Noir", 1), ("Sauvignon Blanc", 1), ("Tinta de Toro", 1)])
    );
    // Points options only see the variety filter.
    assert_eq!(
        harness.options(WidgetKind::PointsSelector),
        rows(&[("Very Good: 92 to 95", 1), ("Excellent: Above 95", 1)])
    );
}

#[test]
fn test_multi_select() {
    let mut harness = TestHarness::with_sample_data();
    harness.select(WidgetKind::CountrySelector, &["US", "France"]);

    assert_eq!(harness.visible(), 6);
    assert_eq!(
        harness.view(WidgetKind::CountrySelector).selected,
        vec!["US".to_string(), "France".to_string()]
    );

    // Selecting nothing clears the widget.
    let empty: [&str; 0] = [];
    harness.select(WidgetKind::CountrySelector, &empty);
    assert_eq!(harness.visible(), 12);
}

#[test]
fn test_bucket_labels() {
    let mut harness = TestHarness::with_sample_data();

    // A fixed label with no wines behind it is still a valid choice.
    harness.select(WidgetKind::PointsSelector, &["Good: 88 to 91"]);
    assert_eq!(harness.visible(), 0);

    harness.select(WidgetKind::PointsSelector, &[]);
    harness.select(WidgetKind::PriceSelector, &["Unknown"]);
    assert_eq!(harness.visible(), 1);
    assert_eq!(
        harness.options(WidgetKind::VarietySelector),
        rows(&[("Sauvignon Blanc", 1)])
    );
}

#[test]
fn test_unknown_labels_are_rejected() {
    let mut harness = TestHarness::with_sample_data();

    let err = harness
        .dashboard
        .select(WidgetKind::PointsSelector, &["Great: 90+"])
        .unwrap_err();
    assert!(matches!(
        err,
        DashboardError::UnknownLabel { ref widget, ref label }
            if widget == "points-selector" && label == "Great: 90+"
    ));

    assert!(matches!(
        harness.dashboard.select(WidgetKind::CountrySelector, &["Frnace"]),
        Err(DashboardError::UnknownLabel { .. })
    ));

    // A rejected selection leaves the previous state alone.
    assert_eq!(harness.visible(), 12);
}

#[test]
fn test_scatter_does_not_accept_selections() {
    let mut harness = TestHarness::with_sample_data();

    let err = harness
        .dashboard
        .select(WidgetKind::PriceToPoints, &["Price: $65 & Points: 95"])
        .unwrap_err();
    assert!(matches!(err, DashboardError::NotSelectable(ref widget) if widget == "price-to-points"));
    assert_eq!(harness.visible(), 12);
    assert!(harness.view(WidgetKind::PriceToPoints).selected.is_empty());
}

// ============================================================================
// CHARTS
// ============================================================================

#[test]
fn test_average_points_rounded_to_one_decimal() {
    let mut harness = TestHarness::with_sample_data();
    assert_eq!(
        harness.bars(WidgetKind::AveragePoints),
        rows(&[("Chile", 86.0), ("France", 95.0), ("Italy", 82.0), ("Spain", 95.3), ("US", 95.8)])
    );

    // Removing every wine of a country drops its average back to zero.
    harness.select(WidgetKind::VarietySelector, &["Tinta de Toro"]);
    assert_eq!(
        harness.bars(WidgetKind::AveragePoints),
        rows(&[("Chile", 0.0), ("France", 0.0), ("Italy", 0.0), ("Spain", 95.3), ("US", 0.0)])
    );
}

#[test]
fn test_points_distribution_pie() {
    let mut harness = TestHarness::with_sample_data();
    harness.select(WidgetKind::CountrySelector, &["Spain"]);

    match harness.view(WidgetKind::PointsDistribution).body {
        ViewBody::Pie { slices } => assert_eq!(
            slices,
            vec![
                Slice { label: "Very Good: 92 to 95".to_string(), count: 3, share: 75.0 },
                Slice { label: "Excellent: Above 95".to_string(), count: 1, share: 25.0 },
            ]
        ),
        other => panic!("expected a pie, got {:?}", other),
    }
}

#[test]
fn test_national_variety_percentages() {
    let mut harness = TestHarness::with_varieties(&["Malbec", "Pinot Noir"]);

    let stacked = |harness: &TestHarness| match harness.view(WidgetKind::NationalVariety).body {
        ViewBody::Stacked { series, rows } => (
            series,
            rows.into_iter().map(|r| (r.label, r.percents)).collect::<Vec<_>>(),
        ),
        other => panic!("expected stacked bars, got {:?}", other),
    };

    let (series, initial) = stacked(&harness);
    assert_eq!(series, vec!["Malbec".to_string(), "Pinot Noir".to_string()]);
    assert_eq!(initial[0], ("Chile".to_string(), vec![100.0, 0.0]));
    assert_eq!(initial[4], ("US".to_string(), vec![0.0, 50.0]));

    harness.select(WidgetKind::PointsSelector, &["Excellent: Above 95"]);
    let (_, filtered) = stacked(&harness);
    assert_eq!(filtered[0], ("Chile".to_string(), vec![0.0, 0.0]));
    assert_eq!(filtered[4], ("US".to_string(), vec![0.0, 33.3]));
}

#[test]
fn test_price_to_points_scatter() {
    let harness = TestHarness::with_sample_data();
    assert_eq!(harness.dashboard.price_domain(), Some((12, 235)));

    match harness.view(WidgetKind::PriceToPoints).body {
        ViewBody::Scatter { x_domain, points } => {
            assert_eq!(x_domain, Some((12, 235)));
            // Twelve wines, one without a price, two sharing ($65, 95).
            assert_eq!(points.len(), 10);
            assert_eq!(points.iter().map(|p| p.count).sum::<u64>(), 11);
            assert!(points.contains(&ScatterPoint {
                price: 65,
                points: 95,
                count: 2,
                title: "Price: $65 & Points: 95".to_string(),
            }));
        }
        other => panic!("expected a scatter plot, got {:?}", other),
    }
}

// ============================================================================
// STATE
// ============================================================================

#[test]
fn test_clear_all_restores_every_view() {
    let mut harness = TestHarness::with_sample_data();
    let initial = harness.dashboard.views().unwrap();

    harness.select(WidgetKind::CountrySelector, &["US", "Spain"]);
    harness.select(WidgetKind::PriceSelector, &["$50 to $75"]);
    harness.select(WidgetKind::PointsDistribution, &["Very Good: 92 to 95"]);
    assert_eq!(harness.visible(), 3);

    harness.dashboard.clear(WidgetKind::PriceSelector).unwrap();
    assert_eq!(harness.visible(), 4);

    harness.dashboard.clear_all().unwrap();
    assert_eq!(harness.dashboard.views().unwrap(), initial);
}

#[test]
fn test_widgets_match_full_recompute() {
    let mut harness = TestHarness::with_sample_data();
    harness.select(WidgetKind::VarietySelector, &["Tinta de Toro", "Pinot Noir"]);
    harness.select(WidgetKind::PointsSelector, &["Very Good: 92 to 95"]);
    harness.select(WidgetKind::CountrySelector, &["US"]);
    harness.select(WidgetKind::VarietySelector, &[]);

    assert!(harness.dashboard.verify().unwrap().is_empty());
}

#[test]
fn test_rendering_every_widget() {
    let mut harness = TestHarness::with_sample_data();
    harness.select(WidgetKind::CountrySelector, &["Italy"]);
    let views = harness.dashboard.views().unwrap();
    assert_eq!(views.len(), WidgetKind::ALL.len());

    let text = render_text(harness.dashboard.data_count(), &views);
    assert!(text.starts_with("1 selected out of 12 records\n"));
    assert!(text.contains("== Country [country-selector] ==\nselected: Italy\n"));
    assert!(text.contains("Price: $12 & Points: 82  x1"));

    let json = render_json(harness.dashboard.data_count(), &views).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["data_count"]["selected"], 1);
    assert_eq!(value["widgets"].as_array().map(Vec::len), Some(10));
    assert_eq!(value["widgets"][9]["body"]["type"], "scatter");
}
