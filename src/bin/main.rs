use sales_analysis::args::Args;
use sales_analysis::charts::render_charts;
use sales_analysis::pipeline;
use sales_analysis::profile::enriched_preview;
use sales_analysis::report::summary_tables;
use std::process;
use tracing_subscriber::EnvFilter;

const RULE: &str = "============================================================";

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    setup_logging();
    let config = Args::parse().into_config();

    let analysis = match pipeline::run(&config) {
        Ok(analysis) => analysis,
        Err(err) => {
            tracing::error!("{}", err);
            process::exit(1);
        }
    };

    println!("{}", RULE);
    println!("DATA OVERVIEW");
    println!("{}", RULE);
    println!("{}", analysis.profile);
    println!("Prepared data (first 3 rows):");
    println!("{}", enriched_preview(&analysis.enriched.records, 3));
    println!("{}", RULE);
    println!("{}", summary_tables(&analysis.aggregates));

    let mut failed = false;
    if config.render_charts {
        if let Err(err) = render_charts(&analysis.aggregates, &config.output_dir) {
            tracing::error!("failed to render charts: {}", err);
            failed = true;
        }
    }

    println!("{}", analysis.report);

    if failed {
        process::exit(1);
    }
}
