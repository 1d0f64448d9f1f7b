//! FILENAME: app/dashboard/src/cli.rs
// PURPOSE: Command-line arguments and the load, select, render run.
// CONTEXT: `main.rs` only parses arguments and prints what `run` returns.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use records::ParsePolicy;

use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::error::DashboardError;
use crate::loader::load_dataset;
use crate::logging;
use crate::render::{render_json, render_text};
use crate::widgets::{parse_filter_arg, WidgetKind};
use crate::{log_error, log_info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "wine-explorer", about = "Cross-filter dashboard over a wine review dataset.")]
pub struct Args {
    /// CSV dataset. Overrides `data_path` from the config file.
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Select a label on a widget (repeatable; repeating a widget multi-selects).
    #[arg(long = "filter", value_name = "WIDGET=LABEL")]
    pub filters: Vec<String>,

    /// Only render these widgets (repeatable). Default: every widget.
    #[arg(long = "widget", value_name = "WIDGET")]
    pub widgets: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip unparseable rows instead of failing the load.
    #[arg(long)]
    pub skip_bad_rows: bool,

    /// Cross-check every widget against a full recompute before rendering.
    #[arg(long)]
    pub verify: bool,

    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LevelFilter>,

    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// The config file (or defaults) with command-line flags applied on top.
pub fn resolve_config(args: &Args) -> Result<DashboardConfig, DashboardError> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(path) = &args.data {
        config.data_path = path.clone();
    }
    if args.skip_bad_rows {
        config.parse_policy = ParsePolicy::Skip;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(path) = &args.log_file {
        config.log_file = Some(path.clone());
    }
    Ok(config)
}

/// Groups `WIDGET=LABEL` arguments per widget, in page order, keeping the
/// label order within a widget.
pub fn group_selections(filters: &[String]) -> Result<Vec<(WidgetKind, Vec<String>)>, DashboardError> {
    let mut selections: BTreeMap<WidgetKind, Vec<String>> = BTreeMap::new();
    for arg in filters {
        let (kind, label) = parse_filter_arg(arg)?;
        selections.entry(kind).or_default().push(label);
    }
    Ok(selections.into_iter().collect())
}

/// Loads the data, applies the selections and returns the rendered output.
pub async fn run(args: &Args) -> Result<String, DashboardError> {
    let config = resolve_config(args)?;
    logging::init(config.log_level, config.log_file.as_deref())?;
    log_info!("APP", "starting with data {}", config.data_path.display());

    // Bad arguments fail before the load.
    let selections = group_selections(&args.filters)?;
    let shown = args
        .widgets
        .iter()
        .map(|name| WidgetKind::from_name(name))
        .collect::<Result<Vec<_>, _>>()?;

    // Everything below needs the data; nothing is built if the load fails.
    let (store, _report) = load_dataset(&config.data_path, config.parse_policy).await?;
    let mut dashboard = Dashboard::build(store, &config)?;

    for (kind, labels) in &selections {
        dashboard.select(*kind, labels.as_slice())?;
    }

    if args.verify {
        let drifted = dashboard.verify()?;
        if drifted.is_empty() {
            log_info!("APP", "all widgets match a full recompute");
        } else {
            log_error!("APP", "{} widgets drifted", drifted.len());
        }
    }

    let views = if shown.is_empty() {
        dashboard.views()?
    } else {
        shown
            .into_iter()
            .map(|kind| dashboard.view(kind))
            .collect::<Result<Vec<_>, _>>()?
    };

    match args.format {
        OutputFormat::Text => Ok(render_text(dashboard.data_count(), &views)),
        OutputFormat::Json => render_json(dashboard.data_count(), &views),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("wine-explorer").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(resolve_config(&args).unwrap(), DashboardConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(
            &path,
            r#"{ "data_path": "from-file.csv", "log_level": "warn", "varieties": ["Malbec"] }"#,
        )
        .unwrap();
        let config_arg = path.to_string_lossy().into_owned();

        let file_only = resolve_config(&parse(&["--config", config_arg.as_str()])).unwrap();
        assert_eq!(file_only.data_path, Path::new("from-file.csv"));
        assert_eq!(file_only.log_level, LevelFilter::Warn);
        assert_eq!(file_only.parse_policy, ParsePolicy::Reject);

        let overridden = resolve_config(&parse(&[
            "--config",
            config_arg.as_str(),
            "--data",
            "cli.csv",
            "--skip-bad-rows",
            "--log-level",
            "debug",
            "--log-file",
            "run.log",
        ]))
        .unwrap();
        assert_eq!(overridden.data_path, Path::new("cli.csv"));
        assert_eq!(overridden.parse_policy, ParsePolicy::Skip);
        assert_eq!(overridden.log_level, LevelFilter::Debug);
        assert_eq!(overridden.log_file.as_deref(), Some(Path::new("run.log")));
        // Untouched settings keep the file's value.
        assert_eq!(overridden.varieties, vec!["Malbec".to_string()]);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse(&["--log-level", "TRACE"]).log_level, Some(LevelFilter::Trace));
        assert!(Args::try_parse_from(["wine-explorer", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_repeated_filters_group_per_widget() {
        let args = parse(&[
            "--filter",
            "price-selector=$50 to $75",
            "--filter",
            "country-selector=US",
            "--filter",
            "country-selector=France",
        ]);
        assert_eq!(
            group_selections(&args.filters).unwrap(),
            vec![
                (WidgetKind::CountrySelector, vec!["US".to_string(), "France".to_string()]),
                (WidgetKind::PriceSelector, vec!["$50 to $75".to_string()]),
            ]
        );
        assert!(matches!(
            group_selections(&["no-such-widget=US".to_string()]),
            Err(DashboardError::UnknownWidget(_))
        ));
    }
}
