//! FILENAME: app/dashboard/src/dashboard.rs
//! PURPOSE: The linked widgets of the wine page, built over one cross-filter index.
//! CONTEXT: Every widget owns its own dimension, so a widget's selection filters
//! every other widget (including ones keyed on the same field) but never its
//! own list. Widgets read group snapshots and write dimension filters; the
//! index does everything else.

use crossfilter_engine::{
    pluck, pluck_bucketed, points_buckets, price_buckets, Buckets, Count, Crossfilter, DimensionId,
    Filter, FilterChange, GroupEntry, GroupHandle, Key, KeyError, MatchRatio, Reducer,
    RunningAverage,
};
use records::{RecordStore, WineReview, COUNTRY, POINTS, PRICE, VARIETY};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::widgets::{
    round1, Bar, OptionRow, ScatterPoint, Slice, StackedRow, ViewBody, WidgetKind, WidgetView,
};
use crate::{log_enter, log_exit, log_info};

/// Records passing every filter, out of all records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataCount {
    pub selected: usize,
    pub total: usize,
}

fn points(r: &WineReview) -> i64 {
    r.points
}

fn variety(r: &WineReview) -> &str {
    &r.variety
}

fn price_and_points(r: &WineReview) -> Result<Key, KeyError> {
    Ok(Key::pair(r.price, r.points))
}

// ============================================================================
// WIDGET STATE
// ============================================================================

enum WidgetGroup {
    Options(GroupHandle<Count>),
    Bars(GroupHandle<Count>),
    Pie(GroupHandle<Count>),
    Average(GroupHandle<RunningAverage<WineReview>>),
    Stacked(Vec<(String, GroupHandle<MatchRatio<WineReview>>)>),
    Scatter(GroupHandle<Count>),
}

struct Widget {
    kind: WidgetKind,
    dimension: DimensionId,
    /// Fixed option list of bucketed widgets.
    buckets: Option<Buckets>,
    group: WidgetGroup,
}

pub struct Dashboard {
    index: Crossfilter<WineReview>,
    widgets: Vec<Widget>,
    /// Scatter x-axis, fixed when the page is built.
    price_domain: Option<(i64, i64)>,
}

impl Dashboard {
    /// Builds every widget over a loaded store.
    pub fn build(store: RecordStore<WineReview>, config: &DashboardConfig) -> Result<Self, DashboardError> {
        log_enter!("DASH", "build", "records={}", store.size());
        let mut index = Crossfilter::new(store);

        let mut widgets = Vec::with_capacity(WidgetKind::ALL.len());
        for kind in WidgetKind::ALL {
            widgets.push(Self::build_widget(&mut index, kind, config)?);
        }

        let price = index.add_dimension("price", pluck::<WineReview>(PRICE))?;
        let cheapest = index.bottom(price, 1)?.first().and_then(|r| r.price);
        let dearest = index.top(price, 1)?.first().and_then(|r| r.price);
        let price_domain = cheapest.zip(dearest);

        index.subscribe(|event, _queue| {
            log::debug!(
                target: "FILTER",
                "dimension {} now {}: {} entered, {} left",
                event.dimension.index(),
                event.filter,
                event.change.entered,
                event.change.left
            );
        });

        log_exit!("DASH", "build", "widgets={} dimensions={}", widgets.len(), index.dimensions().len());
        Ok(Dashboard {
            index,
            widgets,
            price_domain,
        })
    }

    fn build_widget(
        index: &mut Crossfilter<WineReview>,
        kind: WidgetKind,
        config: &DashboardConfig,
    ) -> Result<Widget, DashboardError> {
        let name = kind.name();
        let (dimension, buckets) = match kind {
            WidgetKind::CountrySelector
            | WidgetKind::CountryCount
            | WidgetKind::CountryDistribution
            | WidgetKind::AveragePoints
            | WidgetKind::NationalVariety => (index.add_dimension(name, pluck::<WineReview>(COUNTRY))?, None),
            WidgetKind::VarietySelector => (index.add_dimension(name, pluck::<WineReview>(VARIETY))?, None),
            WidgetKind::PointsSelector | WidgetKind::PointsDistribution => {
                let buckets = points_buckets();
                let id = index.add_dimension(name, pluck_bucketed::<WineReview>(POINTS, buckets.clone()))?;
                (id, Some(buckets))
            }
            WidgetKind::PriceSelector => {
                let buckets = price_buckets();
                let id = index.add_dimension(name, pluck_bucketed::<WineReview>(PRICE, buckets.clone()))?;
                (id, Some(buckets))
            }
            WidgetKind::PriceToPoints => (index.add_dimension(name, price_and_points)?, None),
        };

        let group = match kind {
            WidgetKind::CountrySelector
            | WidgetKind::VarietySelector
            | WidgetKind::PointsSelector
            | WidgetKind::PriceSelector => WidgetGroup::Options(index.add_group(dimension, Count)?),
            WidgetKind::CountryCount => WidgetGroup::Bars(index.add_group(dimension, Count)?),
            WidgetKind::CountryDistribution | WidgetKind::PointsDistribution => {
                WidgetGroup::Pie(index.add_group(dimension, Count)?)
            }
            WidgetKind::AveragePoints => {
                WidgetGroup::Average(index.add_group(dimension, RunningAverage::new(points))?)
            }
            WidgetKind::NationalVariety => {
                let mut series = Vec::with_capacity(config.varieties.len());
                for target in &config.varieties {
                    let handle = index.add_group(dimension, MatchRatio::new(target.as_str(), variety))?;
                    series.push((target.clone(), handle));
                }
                WidgetGroup::Stacked(series)
            }
            WidgetKind::PriceToPoints => WidgetGroup::Scatter(index.add_group(dimension, Count)?),
        };

        Ok(Widget {
            kind,
            dimension,
            buckets,
            group,
        })
    }

    pub fn index(&self) -> &Crossfilter<WineReview> {
        &self.index
    }

    pub fn data_count(&self) -> DataCount {
        DataCount {
            selected: self.index.visible_count(),
            total: self.index.size(),
        }
    }

    pub fn price_domain(&self) -> Option<(i64, i64)> {
        self.price_domain
    }

    fn widget(&self, kind: WidgetKind) -> Result<&Widget, DashboardError> {
        self.widgets
            .iter()
            .find(|w| w.kind == kind)
            .ok_or_else(|| DashboardError::UnknownWidget(kind.name().to_string()))
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Maps a label shown by a widget back to the key its dimension uses.
    /// Bucketed widgets accept their fixed label list plus "Unknown"; the
    /// others accept the labels of keys present in the data.
    pub fn key_for_label(&self, kind: WidgetKind, label: &str) -> Result<Key, DashboardError> {
        let widget = self.widget(kind)?;
        let found = match &widget.buckets {
            Some(buckets) => buckets.key_for_label(label),
            None => self
                .index
                .dimension(widget.dimension)?
                .keys()
                .into_iter()
                .find(|key| key.to_string() == label)
                .cloned(),
        };
        found.ok_or_else(|| DashboardError::UnknownLabel {
            widget: kind.name().to_string(),
            label: label.to_string(),
        })
    }

    /// Selects labels on a widget: none clears it, one is an exact match,
    /// several are a multi-select.
    pub fn select<S: AsRef<str>>(&mut self, kind: WidgetKind, labels: &[S]) -> Result<FilterChange, DashboardError> {
        if !kind.is_brushable() {
            return Err(DashboardError::NotSelectable(kind.name().to_string()));
        }
        let mut keys = labels
            .iter()
            .map(|label| self.key_for_label(kind, label.as_ref()))
            .collect::<Result<Vec<Key>, DashboardError>>()?;

        let filter = match keys.len() {
            0 => Filter::All,
            1 => Filter::Exact(keys.remove(0)),
            _ => Filter::any_of(keys),
        };
        let dimension = self.widget(kind)?.dimension;
        let change = self.index.set_filter(dimension, filter)?;
        log_info!(
            "DASH",
            "{} selection {:?}: {} of {} records shown",
            kind.name(),
            labels.iter().map(|l| l.as_ref()).collect::<Vec<_>>(),
            self.index.visible_count(),
            self.index.size()
        );
        Ok(change)
    }

    pub fn clear(&mut self, kind: WidgetKind) -> Result<FilterChange, DashboardError> {
        let dimension = self.widget(kind)?.dimension;
        Ok(self.index.clear_filter(dimension)?)
    }

    pub fn clear_all(&mut self) -> Result<(), DashboardError> {
        self.index.clear_all_filters()?;
        log_info!("DASH", "all selections cleared");
        Ok(())
    }

    /// Labels currently selected on a widget.
    pub fn selected(&self, kind: WidgetKind) -> Result<Vec<String>, DashboardError> {
        let widget = self.widget(kind)?;
        Ok(match self.index.dimension(widget.dimension)?.filter() {
            Filter::All => Vec::new(),
            Filter::Exact(key) => vec![key.to_string()],
            Filter::In(keys) => keys.iter().map(Key::to_string).collect(),
            other => vec![other.to_string()],
        })
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn views(&self) -> Result<Vec<WidgetView>, DashboardError> {
        WidgetKind::ALL.iter().map(|&kind| self.view(kind)).collect()
    }

    pub fn view(&self, kind: WidgetKind) -> Result<WidgetView, DashboardError> {
        let widget = self.widget(kind)?;
        let body = match &widget.group {
            WidgetGroup::Options(handle) => ViewBody::Options {
                options: self
                    .index
                    .snapshot(handle)?
                    .into_iter()
                    .filter(|entry| entry.value > 0)
                    .map(|entry| OptionRow {
                        label: entry.key.to_string(),
                        count: entry.value,
                    })
                    .collect(),
            },
            WidgetGroup::Bars(handle) => ViewBody::Bars {
                axis: "Wine Bottles".to_string(),
                bars: self
                    .index
                    .snapshot(handle)?
                    .into_iter()
                    .map(|entry| Bar {
                        label: entry.key.to_string(),
                        value: entry.value as f64,
                    })
                    .collect(),
            },
            WidgetGroup::Pie(handle) => ViewBody::Pie {
                slices: pie_slices(&self.index.snapshot(handle)?),
            },
            WidgetGroup::Average(handle) => ViewBody::Bars {
                axis: "Average Points".to_string(),
                bars: self
                    .index
                    .snapshot(handle)?
                    .into_iter()
                    .map(|entry| Bar {
                        label: entry.key.to_string(),
                        value: round1(entry.value.average),
                    })
                    .collect(),
            },
            WidgetGroup::Stacked(series) => self.stacked_body(widget, series)?,
            WidgetGroup::Scatter(handle) => ViewBody::Scatter {
                x_domain: self.price_domain,
                points: scatter_points(&self.index.snapshot(handle)?),
            },
        };

        Ok(WidgetView {
            widget: kind,
            title: kind.title().to_string(),
            selected: self.selected(kind)?,
            body,
        })
    }

    fn stacked_body(
        &self,
        widget: &Widget,
        series: &[(String, GroupHandle<MatchRatio<WineReview>>)],
    ) -> Result<ViewBody, DashboardError> {
        let snapshots = series
            .iter()
            .map(|(_, handle)| self.index.snapshot(handle))
            .collect::<Result<Vec<_>, _>>()?;

        // Every series shares the widget's dimension, hence its key order.
        let keys = self.index.dimension(widget.dimension)?.keys();
        let rows = keys
            .iter()
            .enumerate()
            .map(|(position, key)| StackedRow {
                label: key.to_string(),
                percents: snapshots
                    .iter()
                    .map(|snapshot| {
                        snapshot
                            .get(position)
                            .map_or(0.0, |entry| round1(entry.value.percent()))
                    })
                    .collect(),
            })
            .collect();

        Ok(ViewBody::Stacked {
            series: series.iter().map(|(name, _)| name.clone()).collect(),
            rows,
        })
    }

    // ------------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------------

    /// Recomputes every widget's group from scratch and compares it with the
    /// incrementally maintained one. Returns the widgets that disagree.
    pub fn verify(&self) -> Result<Vec<WidgetKind>, DashboardError> {
        let mut mismatched = Vec::new();
        for widget in &self.widgets {
            let consistent = match &widget.group {
                WidgetGroup::Options(h) | WidgetGroup::Bars(h) | WidgetGroup::Pie(h) | WidgetGroup::Scatter(h) => {
                    self.group_consistent(h)?
                }
                WidgetGroup::Average(h) => self.group_consistent(h)?,
                WidgetGroup::Stacked(series) => {
                    let mut all = true;
                    for (_, h) in series {
                        all &= self.group_consistent(h)?;
                    }
                    all
                }
            };
            if !consistent {
                log::error!("widget {} drifted from a full recompute", widget.kind.name());
                mismatched.push(widget.kind);
            }
        }
        Ok(mismatched)
    }

    fn group_consistent<R>(&self, handle: &GroupHandle<R>) -> Result<bool, DashboardError>
    where
        R: Reducer<WineReview> + 'static,
        R::Value: 'static,
    {
        Ok(self.index.snapshot(handle)? == self.index.rebuild_snapshot(handle)?)
    }
}

fn pie_slices(entries: &[GroupEntry<u64>]) -> Vec<Slice> {
    let total: u64 = entries.iter().map(|e| e.value).sum();
    entries
        .iter()
        .filter(|e| e.value > 0)
        .map(|e| Slice {
            label: e.key.to_string(),
            count: e.value,
            share: round1(e.value as f64 * 100.0 / total as f64),
        })
        .collect()
}

/// Plottable points: a known price and at least one wine behind them.
fn scatter_points(entries: &[GroupEntry<u64>]) -> Vec<ScatterPoint> {
    entries
        .iter()
        .filter(|e| e.value > 0)
        .filter_map(|e| match &e.key {
            Key::Tuple(parts) => match parts.as_slice() {
                [Key::Number(price), Key::Number(points)] => Some(ScatterPoint {
                    price: *price,
                    points: *points,
                    count: e.value,
                    title: format!("Price: ${} & Points: {}", price, points),
                }),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pie_slices_skip_empty_keys() {
        let entries = vec![
            GroupEntry { key: Key::text("France"), value: 1 },
            GroupEntry { key: Key::text("Italy"), value: 0 },
            GroupEntry { key: Key::text("US"), value: 2 },
        ];
        let slices = pie_slices(&entries);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].share, 33.3);
        assert_eq!(slices[1].share, 66.7);
    }

    #[test]
    fn test_scatter_points_need_a_price() {
        let entries = vec![
            GroupEntry { key: Key::pair(Some(30i64), 90i64), value: 2 },
            GroupEntry { key: Key::pair(None::<i64>, 88i64), value: 1 },
            GroupEntry { key: Key::pair(Some(12i64), 85i64), value: 0 },
        ];
        let points = scatter_points(&entries);
        assert_eq!(
            points,
            vec![ScatterPoint {
                price: 30,
                points: 90,
                count: 2,
                title: "Price: $30 & Points: 90".to_string(),
            }]
        );
    }
}
