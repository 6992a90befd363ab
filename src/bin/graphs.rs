//! Render comparison charts from the summary csv
use clap::Parser;
use gem5_stats::{
    Config, SummaryTable, comparison_charts, get_plot_dir, get_summary_path, save_charts,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file, defaults are used if not given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to summary csv, defaults to {results_dir}/summary.csv
    #[arg(short, long)]
    summary_path: Option<PathBuf>,

    /// Directory for the charts, defaults to {results_dir}/plots
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Cli::parse();

    let config = Config::load_or_default(args.config.as_deref())?;
    let summary_path = args.summary_path.unwrap_or_else(|| get_summary_path(&config));
    let output_dir = args.output_dir.unwrap_or_else(|| get_plot_dir(&config));

    println!("Loading summary from {}", summary_path.display());
    let table = SummaryTable::read_csv(&summary_path)?;
    println!("Got {} runs", table.len());

    let charts = comparison_charts(&table);
    if charts.is_empty() {
        println!("Nothing to plot");
        return Ok(());
    }

    let saved = save_charts(&charts, &config, &output_dir)?;
    for path in &saved {
        println!("- {}", path.display());
    }
    println!(
        "Saved {} of {} charts to {}/",
        saved.len(),
        charts.len(),
        output_dir.display()
    );

    Ok(())
}
