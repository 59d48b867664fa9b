use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use product_report::config::{ReportConfig, DEFAULT_LOGO_PATH};
use product_report::export::ReportAssembler;
use product_report::source::{CatalogStore, HttpProductSource, DEFAULT_ENDPOINT};
use product_report::table::render_text_table;

/// Fetches the product catalog and prints or exports it.
///
/// Fonts must be present under `assets/fonts` or provided via the `PRODUCT_REPORT_FONTS_DIR`
/// environment variable before exporting; otherwise a system family is used when available.
#[derive(Parser)]
#[command(author, version, about = "Product catalog report generator")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Catalog endpoint returning a JSON body with a `products` array.
    #[arg(long, global = true, env = "PRODUCT_REPORT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the product table to stdout.
    Table,

    /// Write the PDF report (`full-report.pdf`).
    Export {
        /// Logo image shown in the header band of every page.
        #[arg(long, default_value = DEFAULT_LOGO_PATH)]
        logo: PathBuf,

        /// Directory the report is written to.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Skip chart rasterization; the chart page is left empty.
        #[arg(long)]
        no_charts: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = ReportConfig {
        endpoint: cli.source.endpoint,
        ..ReportConfig::default()
    };
    let source = HttpProductSource::new(config.endpoint.clone())?;
    let mut store = CatalogStore::new();
    store.refresh(&source);

    match cli.command {
        Commands::Table => {
            print!("{}", render_text_table(store.products()));
        }
        Commands::Export {
            logo,
            output_dir,
            no_charts,
        } => {
            config.logo_path = logo;
            config.output_dir = output_dir;
            config.render_charts = !no_charts;

            let summary =
                ReportAssembler::new(config).export(store.products(), &chrono::Local::now())?;
            println!(
                "Saved {} ({} pages)",
                summary.path.display(),
                summary.pages
            );
        }
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
