//! Summarise gem5 runs into a csv table
use anyhow::Context;
use clap::Parser;
use cli_table::{Cell, Table, print_stdout};
use gem5_stats::{
    Config, Extractor, ReadFailurePolicy, SummaryTable, collect_runs, discover_runs,
    format_metric, get_plot_dir, get_summary_path, overview_charts, run_progress_bar, save_charts,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file, defaults are used if not given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with one sub-directory per run
    #[arg(short, long)]
    results_dir: Option<PathBuf>,

    /// Name of the stats file in each run directory
    #[arg(short, long)]
    stats_file: Option<String>,

    /// Path to summary csv, defaults to {results_dir}/summary.csv
    #[arg(short, long)]
    output_path: Option<PathBuf>,

    /// Directory for the overview plots, defaults to {results_dir}/plots
    #[arg(short, long)]
    plot_dir: Option<PathBuf>,

    /// Do not render the overview plots
    #[arg(long)]
    no_plots: bool,

    /// Abort on the first unreadable stats file instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Also dump every run with all raw counters as json
    #[arg(long)]
    raw_output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Cli::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(results_dir) = args.results_dir {
        config.results_dir = results_dir;
    }
    if let Some(stats_file) = args.stats_file {
        config.stats_file = stats_file;
    }
    let output_path = args.output_path.unwrap_or_else(|| get_summary_path(&config));
    let plot_dir = args.plot_dir.unwrap_or_else(|| get_plot_dir(&config));
    let policy = if args.strict {
        ReadFailurePolicy::Abort
    } else {
        ReadFailurePolicy::Skip
    };

    let paths = discover_runs(&config.results_dir, &config.stats_file)?;
    println!(
        "Found {} runs in {}",
        paths.len(),
        config.results_dir.display()
    );

    let extractor = Extractor::new()?;
    let pbar = run_progress_bar(paths.len());
    let collected = collect_runs(&extractor, &paths, policy, &pbar)?;
    if !collected.skipped.is_empty() {
        println!("Skipped {} unreadable runs:", collected.skipped.len());
        for path in &collected.skipped {
            println!("- {}", path.display());
        }
    }

    let table = SummaryTable::from_records(&collected.records);
    let written = table.write_csv(&output_path)?;
    println!("Wrote {}  ({} runs)", output_path.display(), written);

    if let Some(raw_output) = &args.raw_output {
        let mut records = collected.records;
        records.sort_by(|left, right| left.label.cmp(&right.label));
        std::fs::write(raw_output, serde_json::to_vec_pretty(&records)?)
            .with_context(|| format!("Unable to write {}", raw_output.display()))?;
        println!("Raw counters written to {}", raw_output.display());
    }

    let mut rows = vec![];
    for row in &table.rows {
        rows.push(vec![
            row.label.clone().cell(),
            row.benchmark.map_or("-".to_string(), |b| b.to_string()).cell(),
            row.cpu_type.map_or("-".to_string(), |c| c.to_string()).cell(),
            row.branch_predictor.cell(),
            format_metric(row.ipc0, 3).cell(),
            format_metric(row.ipc1, 3).cell(),
            format_metric(row.l1_mpki0, 2).cell(),
        ]);
    }
    let rows = rows.table().title(vec![
        "Label".cell(),
        "Benchmark".cell(),
        "CPU".cell(),
        "Branch Predictor".cell(),
        "IPC0".cell(),
        "IPC1".cell(),
        "L1 MPKI0".cell(),
    ]);
    print_stdout(rows)?;

    if args.no_plots {
        return Ok(());
    }
    let charts = overview_charts(&table);
    if charts.is_empty() {
        println!("No IPC or MPKI values, plots skipped.");
        return Ok(());
    }
    // a plot failure never fails the run
    match save_charts(&charts, &config, &plot_dir) {
        Ok(saved) if saved.is_empty() => println!("CSV written, plots skipped."),
        Ok(saved) if saved.len() < charts.len() => println!(
            "Saved {} of {} plots to {}/",
            saved.len(),
            charts.len(),
            plot_dir.display()
        ),
        Ok(_) => println!("Saved plots to {}/", plot_dir.display()),
        Err(err) => {
            log::warn!("{err:#}");
            println!("CSV written, plots skipped.");
        }
    }

    Ok(())
}
