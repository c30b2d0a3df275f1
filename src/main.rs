//! fpc-stackup: browse the FPC material catalog and analyse layer stackups.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;

use fpc_stackup::catalog::{Catalog, SecondaryProperty, ThicknessUnit};
use fpc_stackup::config::{self, Config};
use fpc_stackup::error::{CatalogError, ExportError};
use fpc_stackup::finder::{
    default_export_file_name, project_fields, select_categories, sort_by, CsvExport, FieldValue,
    MaterialField, Row, SortDirection,
};
use fpc_stackup::stackup::{LayerStack, Resolver, StackupError};

/// Material selection and layer stackup composition for flexible printed
/// circuits.
#[derive(Parser, Debug)]
#[command(name = "fpc-stackup")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog materials as a table or CSV
    Materials {
        /// Category key to include (repeatable; all categories if omitted)
        #[arg(short = 'c', long = "category", value_name = "KEY")]
        categories: Vec<String>,

        /// Field to show (repeatable; a default set if omitted)
        #[arg(short = 'f', long = "field", value_name = "FIELD")]
        fields: Vec<String>,

        /// Field to sort by
        #[arg(long, value_name = "FIELD")]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Write CSV to PATH ("-" for stdout, dated file name if no PATH)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        csv: Option<Option<PathBuf>>,
    },

    /// List reference stackups
    Templates {
        /// Only show stackups whose name, category or description contains TERM
        #[arg(long, value_name = "TERM")]
        search: Option<String>,
    },

    /// Resolve every reference stackup and report missing properties
    Validate,

    /// Build a stack and print its derived properties
    Analyze {
        /// Start from this reference stackup
        #[arg(long, value_name = "ID")]
        template: Option<String>,

        /// Layer to add (repeatable). Appended after the template's layers;
        /// without a template the first one replaces the default layer.
        #[arg(long = "layer", value_name = "CATEGORY=MATERIAL")]
        layers: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Failures surfaced to the user by a subcommand.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Stackup(#[from] StackupError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialise output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the fpc-stackup CLI.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config_or_default(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    debug!(version = env!("CARGO_PKG_VERSION"), "Starting fpc-stackup");

    let catalog = match load_catalog(&cfg) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Catalog error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args.command, &cfg, &catalog) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_catalog(cfg: &Config) -> Result<Catalog, CatalogError> {
    match &cfg.catalog_path {
        Some(path) => Catalog::load(path),
        None => Catalog::builtin(),
    }
}

/// Runs a subcommand. `Ok(false)` means it ran but found problems.
fn run(command: Command, cfg: &Config, catalog: &Catalog) -> Result<bool, CliError> {
    match command {
        Command::Materials {
            categories,
            fields,
            sort,
            desc,
            csv,
        } => {
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            list_materials(
                cfg,
                catalog,
                &categories,
                &fields,
                sort.as_deref().map(|s| (s, direction)),
                csv,
            )?;
            Ok(true)
        }
        Command::Templates { search } => {
            list_templates(catalog, search.as_deref().unwrap_or(""))?;
            Ok(true)
        }
        Command::Validate => validate_templates(catalog),
        Command::Analyze {
            template,
            layers,
            json,
        } => {
            analyze(cfg, catalog, template.as_deref(), &layers, json)?;
            Ok(true)
        }
    }
}

fn list_materials(
    cfg: &Config,
    catalog: &Catalog,
    categories: &[String],
    field_keys: &[String],
    sort: Option<(&str, SortDirection)>,
    csv: Option<Option<PathBuf>>,
) -> Result<(), CliError> {
    let unit = cfg.thickness_unit();

    let keys: Vec<&str> = if categories.is_empty() {
        catalog.materials().keys().collect()
    } else {
        categories.iter().map(String::as_str).collect()
    };
    for key in &keys {
        if catalog.materials().category(key).is_none() {
            warn!(category = %key, "Ignoring unknown category");
        }
    }

    let mut fields: Vec<MaterialField> = Vec::new();
    for key in field_keys {
        match MaterialField::from_str_loose(key) {
            Some(field) if !fields.contains(&field) => fields.push(field),
            Some(_) => {}
            None => warn!(field = %key, "Ignoring unknown field"),
        }
    }
    if fields.is_empty() {
        fields = MaterialField::DEFAULT_COLUMNS.to_vec();
    }

    let entries = select_categories(catalog.materials(), &keys);
    let mut rows = project_fields(&entries, &fields);
    for row in &mut rows {
        convert_thickness(row, unit);
    }
    if let Some((key, direction)) = sort {
        sort_by(&mut rows, key, direction);
    }

    let labels: Vec<String> = fields.iter().map(|&f| column_label(f, unit)).collect();

    match csv {
        None => print_table(&labels, &rows, cfg.display.decimals)?,
        Some(target) => {
            let export = CsvExport::new().with_byte_order_mark(cfg.export.byte_order_mark);
            let path = target.unwrap_or_else(|| PathBuf::from(default_export_file_name()));
            if path.as_os_str() == "-" {
                export.write(io::stdout().lock(), &labels, &rows)?;
            } else {
                export.write_to_path(&path, &labels, &rows)?;
                info!(path = %path.display(), rows = rows.len(), "Exported materials");
                eprintln!("Wrote {} row(s) to {}", rows.len(), path.display());
            }
        }
    }

    Ok(())
}

fn list_templates(catalog: &Catalog, term: &str) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    for template in catalog.search_templates(term) {
        writeln!(
            out,
            "{:<22} {:<28} {:<12} {} layer(s)",
            template.id,
            template.name,
            template.category,
            template.layers.len()
        )?;
        if !template.description.is_empty() {
            writeln!(out, "    {}", template.description)?;
        }
    }
    Ok(())
}

fn validate_templates(catalog: &Catalog) -> Result<bool, CliError> {
    let resolver = Resolver::new(catalog.materials());
    let mut out = io::stdout().lock();
    let mut valid = true;
    let mut warnings = 0;

    for template in catalog.templates() {
        let result = resolver.validate_template(template);
        let status = if result.is_valid() { "ok" } else { "FAILED" };
        writeln!(out, "{}: {status}", template.id)?;
        for error in &result.errors {
            writeln!(out, "  error: {error}")?;
        }
        for warning in &result.warnings {
            writeln!(out, "  warning: {warning}")?;
        }
        valid &= result.is_valid();
        warnings += result.warnings.len();
    }

    writeln!(
        out,
        "{} template(s) checked, {warnings} warning(s)",
        catalog.templates().len()
    )?;
    Ok(valid)
}

fn analyze(
    cfg: &Config,
    catalog: &Catalog,
    template: Option<&str>,
    layer_args: &[String],
    json: bool,
) -> Result<(), CliError> {
    let materials = catalog.shared_materials();

    let mut stack = match (template, &cfg.default_category) {
        (Some(id), _) => {
            let template = catalog
                .template(id)
                .ok_or_else(|| CliError::Usage(format!("unknown stackup template '{id}'")))?;
            LayerStack::from_template(materials, template)?
        }
        (None, Some(category)) => LayerStack::with_default_category(materials, category)?,
        (None, None) => LayerStack::new(materials)?,
    };

    for (i, arg) in layer_args.iter().enumerate() {
        let (category, material) = arg.split_once('=').ok_or_else(|| {
            CliError::Usage(format!("layer '{arg}' is not of the form CATEGORY=MATERIAL"))
        })?;
        let index = if i == 0 && template.is_none() {
            0
        } else {
            stack.add_layer(Some(category))?
        };
        stack.set_layer(index, category, material)?;
    }

    let snapshot = stack.snapshot()?;
    let props = stack.derived_properties()?;
    let unit = cfg.thickness_unit();

    if json {
        let doc = serde_json::json!({
            "thickness_unit": "um",
            "layers": snapshot,
            "properties": props,
        });
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &doc)?;
        writeln!(out)?;
        return Ok(());
    }

    let decimals = cfg.display.decimals;
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{:>3}  {:<16} {:<32} {:>12} {:>8} {:>8}",
        "#",
        "Material type",
        "Model",
        format!("Thickness ({unit})"),
        "Dk",
        "Df"
    )?;
    for layer in &snapshot {
        writeln!(
            out,
            "{:>3}  {:<16} {:<32} {:>12.decimals$} {:>8.decimals$} {:>8.decimals$}",
            layer.index + 1,
            layer.category_name,
            layer.material.name,
            unit.from_micrometres(layer.material.thickness),
            layer.material.dk,
            layer.material.df,
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Total thickness: {:.decimals$} {unit}",
        unit.from_micrometres(props.total_thickness)
    )?;
    writeln!(out, "Effective Dk:    {:.decimals$}", props.effective_dk)?;
    writeln!(out, "Effective Df:    {:.decimals$}", props.effective_df)?;
    for property in SecondaryProperty::ALL {
        let shown = props
            .secondary(property)
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.decimals$}"));
        writeln!(
            out,
            "{}: {shown}",
            column_label(property.into(), ThicknessUnit::Micrometre)
        )?;
    }

    Ok(())
}

/// Rewrites a projected thickness cell from micrometres into `unit`.
fn convert_thickness(row: &mut Row, unit: ThicknessUnit) {
    if let Some(FieldValue::Number(value)) = row.get_mut(MaterialField::Thickness.key()) {
        *value = unit.from_micrometres(*value);
    }
}

/// Column heading with unit suffix.
fn column_label(field: MaterialField, unit: ThicknessUnit) -> String {
    let suffix = match field {
        MaterialField::Thickness => Some(unit.symbol()),
        _ => field.unit(),
    };
    suffix.map_or_else(
        || field.label().to_string(),
        |s| format!("{} ({s})", field.label()),
    )
}

fn print_table(labels: &[String], rows: &[Row], decimals: usize) -> io::Result<()> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.values()
                .map(|value| match value {
                    FieldValue::Number(n) => format!("{n:.decimals$}"),
                    FieldValue::Null => "-".to_string(),
                    FieldValue::Text(_) => value.to_string(),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = io::stdout().lock();
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    writeln!(out, "{}", line(labels).trim_end())?;
    for row in &cells {
        writeln!(out, "{}", line(row).trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn log_level_flags_override_config() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "info"), Level::INFO);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
    }

    #[test]
    fn thickness_label_follows_display_unit() {
        assert_eq!(
            column_label(MaterialField::Thickness, ThicknessUnit::Millimetre),
            "Thickness (mm)"
        );
        assert_eq!(column_label(MaterialField::Dk, ThicknessUnit::Millimetre), "Dk");
    }

    #[test]
    fn convert_thickness_rewrites_only_thickness() {
        let mut row = Row::new();
        row.insert("thickness".into(), FieldValue::Number(35.0));
        row.insert("dk".into(), FieldValue::Number(3.0));
        convert_thickness(&mut row, ThicknessUnit::Millimetre);
        assert_eq!(row["thickness"], FieldValue::Number(0.035));
        assert_eq!(row["dk"], FieldValue::Number(3.0));
    }
}
