use anyhow::{anyhow, Context, Result};
use crossterm::style::Stylize;
use report_viewer::config::Config;
use report_viewer::data::data_exporter::DataExporter;
use report_viewer::data::data_view::{DataView, PageSize};
use report_viewer::data::file_parser::parse_file;
use report_viewer::data::report_loader::{
    file_listing_dataset, list_report_files, resolve_report_path,
};
use report_viewer::session::ReportSession;
use report_viewer::utils::logging::init_tracing;
use std::path::PathBuf;
use tracing::{debug, warn};

mod table_display;

use table_display::{display_view, ViewKind};

/// Number of log lines printed by `--show-log`
const SHOWN_LOG_ENTRIES: usize = 50;

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    report: Option<String>,
    file: Option<String>,
    filters: Vec<(String, String)>,
    sorts: Vec<String>,
    page: Option<i64>,
    page_size: Option<PageSize>,
    strict: bool,
    export: Option<String>,
    config: Option<PathBuf>,
    generate_config: bool,
    show_log: bool,
    verbose: bool,
    help: bool,
}

fn print_help() {
    println!(
        "{}",
        "Report Viewer - browse, filter and export report files"
            .blue()
            .bold()
    );
    println!();
    println!("{}", "Usage:".yellow());
    println!("  report-viewer [OPTIONS] <REPORT_DIR> [FILE]");
    println!();
    println!("  Without FILE the report's file list is shown; with FILE its rows are.");
    println!();
    println!("{}", "Options:".yellow());
    println!(
        "  {}  - Keep rows whose column contains text (repeatable)",
        "--filter <col=text>".green()
    );
    println!(
        "  {}        - Sort by column; repeating it toggles direction",
        "--sort <col>".green()
    );
    println!("  {}          - Page to show (clamped)", "--page <N>".green());
    println!(
        "  {}  - Rows per page, or 'all'",
        "--page-size <N|all>".green()
    );
    println!(
        "  {}            - Reject unknown filter/sort columns",
        "--strict".green()
    );
    println!(
        "  {}     - Export every filtered row to CSV ('-' for stdout)",
        "--export <PATH>".green()
    );
    println!(
        "  {}     - Read configuration from PATH",
        "--config <PATH>".green()
    );
    println!(
        "  {}   - Write a commented default config file",
        "--generate-config".green()
    );
    println!(
        "  {}          - Print recent log entries after the table",
        "--show-log".green()
    );
    println!(
        "  {}           - Echo log output to stderr",
        "--verbose".green()
    );
    println!("  {}              - Show this help", "--help".green());
    println!();
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} requires a value", flag))
        };

        match arg.as_str() {
            "--help" | "-h" => cli.help = true,
            "--strict" => cli.strict = true,
            "--generate-config" => cli.generate_config = true,
            "--show-log" => cli.show_log = true,
            "--verbose" | "-v" => cli.verbose = true,
            "--filter" => {
                let value = value_for("--filter")?;
                let (column, text) = value
                    .split_once('=')
                    .ok_or_else(|| format!("--filter expects col=text, got '{}'", value))?;
                cli.filters.push((column.to_string(), text.to_string()));
            }
            "--sort" => cli.sorts.push(value_for("--sort")?),
            "--page" => {
                let value = value_for("--page")?;
                let page = value
                    .parse::<i64>()
                    .map_err(|_| format!("--page expects a number, got '{}'", value))?;
                cli.page = Some(page);
            }
            "--page-size" => {
                let value = value_for("--page-size")?;
                cli.page_size = Some(value.parse::<PageSize>().map_err(|e| e.to_string())?);
            }
            "--export" => cli.export = Some(value_for("--export")?),
            "--config" => cli.config = Some(PathBuf::from(value_for("--config")?)),
            other if other.starts_with("--") => {
                return Err(format!("Unknown option '{}'", other));
            }
            positional => {
                if cli.report.is_none() {
                    cli.report = Some(positional.to_string());
                } else if cli.file.is_none() {
                    cli.file = Some(positional.to_string());
                } else {
                    return Err(format!("Unexpected argument '{}'", positional));
                }
            }
        }
    }

    Ok(cli)
}

fn load_config(cli: &CliArgs) -> Config {
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {}", e);
        Config::default()
    })
}

/// Filters, sorts and paging from the command line, in that order
fn apply_view_args(view: &mut DataView, cli: &CliArgs) -> Result<()> {
    for (column, text) in &cli.filters {
        view.set_filter(column, text)?;
    }
    for column in &cli.sorts {
        view.set_sort(column)?;
    }
    if let Some(page_size) = cli.page_size {
        view.set_page_size(page_size);
    }
    if let Some(page) = cli.page {
        view.go_to_page(page);
    }
    Ok(())
}

fn export_view(view: &DataView, target: &str, config: &Config) -> Result<()> {
    let export = view.get_export_set();

    if target == "-" {
        println!("{}", DataExporter::encode_export_set(&export)?);
        return Ok(());
    }

    let path = if target.is_empty() {
        let name = DataExporter::default_file_name(&view.source().name);
        match &config.export.directory {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    } else {
        PathBuf::from(target)
    };

    let count = DataExporter::export_to_file(&export, &path)?;
    println!(
        "{}",
        format!("Exported {} rows to {}", count, path.display()).green()
    );
    Ok(())
}

fn report_directory(report: &str, config: &Config) -> Result<PathBuf> {
    match &config.reports.base_path {
        Some(base) => Ok(resolve_report_path(base, report)?),
        None => Ok(PathBuf::from(report)),
    }
}

fn run(cli: CliArgs) -> Result<()> {
    if cli.generate_config {
        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::get_config_path()?,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, Config::create_default_with_comments())
            .with_context(|| format!("Could not write {}", config_path.display()))?;
        println!(
            "{}",
            format!("Configuration written to {}", config_path.display()).green()
        );
        return Ok(());
    }

    let log_buffer = init_tracing(cli.verbose);
    let config = load_config(&cli);

    let mut options = config.view.view_options()?;
    options.strict_columns |= cli.strict;

    let report = cli
        .report
        .as_deref()
        .ok_or_else(|| anyhow!("Missing <REPORT_DIR>. Run with --help for usage."))?;
    let report_dir = report_directory(report, &config)?;
    debug!("Report directory: {}", report_dir.display());

    let files = list_report_files(&report_dir, &config.reports.allowed_extensions)?;
    let mut session = ReportSession::new(options);
    session.open_report(file_listing_dataset(report, &files));

    let kind = match &cli.file {
        Some(file) => {
            let path = resolve_report_path(&report_dir, file)?;
            session.open_file(parse_file(&path)?);
            ViewKind::DataRows
        }
        None => ViewKind::FileList,
    };

    let view = match kind {
        ViewKind::FileList => session.file_list_mut(),
        ViewKind::DataRows => session.data_rows_mut(),
    };
    apply_view_args(view, &cli)?;

    let title = match session.file() {
        Some(file) => format!("{} / {}", report, file),
        None => report.to_string(),
    };
    let view = match kind {
        ViewKind::FileList => session.file_list(),
        ViewKind::DataRows => session.data_rows(),
    };

    match cli.export.as_deref() {
        Some(target) => export_view(view, target, &config)?,
        None => display_view(&title, view, kind),
    }

    if cli.show_log {
        println!();
        println!("{}", "Recent log entries:".yellow());
        for entry in log_buffer.get_recent(SHOWN_LOG_ENTRIES) {
            println!("  {}", entry.format_for_display());
        }
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if cli.help || (cli.report.is_none() && !cli.generate_config) {
        print_help();
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_positionals_and_flags() {
        let cli = parse_args(&args(&[
            "finance/q1",
            "sales.csv",
            "--filter",
            "region=north",
            "--filter",
            "name=",
            "--sort",
            "amount",
            "--sort",
            "amount",
            "--page",
            "-3",
            "--page-size",
            "all",
            "--strict",
        ]))
        .unwrap();

        assert_eq!(cli.report.as_deref(), Some("finance/q1"));
        assert_eq!(cli.file.as_deref(), Some("sales.csv"));
        assert_eq!(
            cli.filters,
            vec![
                ("region".to_string(), "north".to_string()),
                ("name".to_string(), String::new()),
            ]
        );
        assert_eq!(cli.sorts, vec!["amount", "amount"]);
        assert_eq!(cli.page, Some(-3));
        assert_eq!(cli.page_size, Some(PageSize::All));
        assert!(cli.strict);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(&args(&["--filter", "novalue"])).is_err());
        assert!(parse_args(&args(&["--page-size", "0"])).is_err());
        assert!(parse_args(&args(&["--page"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["a", "b", "c"])).is_err());
    }

    #[test]
    fn test_apply_view_args_toggles_repeated_sort() {
        use report_viewer::data::data_view::SortDirection;
        use report_viewer::data::datatable::{ColumnDescriptor, DataRow, Dataset};
        use std::sync::Arc;

        let dataset = Dataset::new("t")
            .with_columns([ColumnDescriptor::new("n")])
            .with_rows((0..10).map(|i| DataRow::new().with("n", i as i64)));
        let mut view = DataView::new(Arc::new(dataset));
        let cli = parse_args(&args(&["r", "--sort", "n", "--sort", "n", "--page", "99"])).unwrap();

        apply_view_args(&mut view, &cli).unwrap();

        assert_eq!(view.view_state().sort_direction, SortDirection::Descending);
        assert_eq!(view.current_page(), 1);
    }
}
