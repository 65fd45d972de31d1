use std::path::{Path, PathBuf};

use chart_adapter::PlottersChartRenderer;
use clap::Parser;
use csv_adapter::CsvDatasetRepository;
use enroll_core::application::ReportServiceImpl;
use enroll_core::config::ReportSettings;
use enroll_core::domain::{Artifact, ArtifactStore, ReportKind};
use enroll_core::ports::{ChartRenderer, DatasetRepository, TableRenderer};
use html_adapter::{HtmlTableAdapter, ReportPageAdapter};
use sqlite_adapter::SqliteDatasetRepository;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// CLI tool to render course-enrollment charts and frequency tables
#[derive(Parser, Debug)]
#[command(name = "enrollviz")]
#[command(about = "Generates charts, word clouds and frequency tables from a course enrollment dataset")]
struct Cli {
    /// Dataset to read: a .csv file, otherwise a SQLite database
    #[arg(short = 'i', long = "input", required = true)]
    input: PathBuf,

    /// SQLite table holding the enrollments
    #[arg(long = "table", default_value = SqliteDatasetRepository::DEFAULT_TABLE)]
    table: String,

    /// Artifact store root; images land in <store>/visuals
    #[arg(short = 's', long = "store", default_value = "app/static")]
    store: PathBuf,

    /// Report to generate (repeatable); all reports when omitted
    #[arg(short = 'r', long = "report")]
    reports: Vec<ReportKind>,

    /// Entries shown in the top-N bar charts
    #[arg(long = "top-n", default_value_t = ReportSettings::default().chart_top_n)]
    top_n: usize,

    /// Rows shown in the HTML frequency tables
    #[arg(long = "table-top-n", default_value_t = ReportSettings::default().table_top_n)]
    table_top_n: usize,

    /// TrueType font used for chart text
    #[arg(long = "font")]
    font: Option<PathBuf>,

    /// Also write <store>/index.html embedding every generated report
    #[arg(long = "page")]
    page: bool,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> ReportSettings {
        ReportSettings {
            chart_top_n: self.top_n,
            table_top_n: self.table_top_n,
            font_path: self.font.clone(),
            ..ReportSettings::default()
        }
    }

    fn kinds(&self) -> Vec<ReportKind> {
        if self.reports.is_empty() {
            ReportKind::ALL.to_vec()
        } else {
            self.reports.clone()
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = cli.settings();

    // Instantiate concrete implementations of secondary adapters
    let data_repository: Box<dyn DatasetRepository> = if is_csv(&cli.input) {
        Box::new(CsvDatasetRepository::new(&cli.input))
    } else {
        Box::new(
            SqliteDatasetRepository::new(cli.input.to_string_lossy().into_owned())
                .with_table(cli.table.clone()),
        )
    };

    let chart_renderer: Box<dyn ChartRenderer> =
        Box::new(PlottersChartRenderer::new(settings.font_path.as_deref()));
    let table_renderer: Box<dyn TableRenderer> = Box::new(HtmlTableAdapter::new());

    // Instantiate the core business service with dependency injection
    let service = ReportServiceImpl::new(
        data_repository,
        chart_renderer,
        table_renderer,
        ArtifactStore::new(&cli.store),
        settings,
    );

    let kinds = cli.kinds();
    let outcome = if cli.page {
        service.execute_with_page(&kinds, &ReportPageAdapter::new("Course Insights"))
    } else {
        service.execute(&kinds)
    };

    match outcome {
        Ok(artifacts) => {
            for generated in &artifacts {
                match &generated.artifact {
                    Artifact::Image { path } => println!("{}: {}", generated.kind, path),
                    Artifact::Html(html) => {
                        if !cli.page {
                            println!("{}:\n{}", generated.kind, html);
                        }
                    }
                }
            }
            if cli.page {
                let page = service.store().root().join("index.html");
                println!("Report page written to {}", page.display());
            }
        }
        Err(e) => {
            error!("report generation failed: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["enrollviz", "-i", "courses.db"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("app/static"));
        assert_eq!(cli.table, "enrollments");
        assert_eq!(cli.kinds(), ReportKind::ALL.to_vec());
        assert_eq!(cli.settings(), ReportSettings::default());
        assert!(!cli.page);
    }

    #[test]
    fn test_cli_parses_reports_and_limits() {
        let cli = Cli::try_parse_from([
            "enrollviz", "-i", "data.csv", "-r", "top-tags", "-r", "tag-table", "--top-n", "5",
            "--table-top-n", "8", "--page",
        ])
        .unwrap();
        assert_eq!(cli.kinds(), vec![ReportKind::TopTags, ReportKind::TagTable]);
        let settings = cli.settings();
        assert_eq!(settings.chart_top_n, 5);
        assert_eq!(settings.table_top_n, 8);
        assert!(cli.page);
    }

    #[test]
    fn test_cli_rejects_unknown_report() {
        assert!(Cli::try_parse_from(["enrollviz", "-i", "x.db", "-r", "pie-chart"]).is_err());
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["enrollviz"]).is_err());
    }

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Path::new("data/enrollments.CSV")));
        assert!(!is_csv(Path::new("courses.db")));
        assert!(!is_csv(Path::new("csv")));
    }
}
