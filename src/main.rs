// Entry point and high-level CLI flow.
//
// - With `--export` the summary is built once, written, and the program exits.
// - Otherwise a numbered menu lets the user build the summary, preview it,
//   look at the potential ranking and export, reusing one explicit cache.
use anyhow::{Context, Result};
use clap::Parser;
use county_report::cache::SummaryCache;
use county_report::cli::Args;
use county_report::config::{Config, SourceSpec, DEFAULT_CONFIG_FILE};
use county_report::output::{self, Format};
use county_report::ranking::{self, Order};
use county_report::{join, pipeline, stats, util, PipelineOutput};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Everything the menu needs between choices.
struct App {
    config: Config,
    cache: SummaryCache,
    current: Option<PipelineOutput>,
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn print_warnings(out: &PipelineOutput) {
    for w in &out.warnings {
        println!("Warning: source '{}' skipped: {}", w.source, w.reason);
    }
}

/// Handle option [1]: build (or fetch from cache) the summary table.
fn handle_load(app: &mut App) {
    match app.cache.get_or_run(&app.config) {
        Ok(out) => {
            println!(
                "Summary built: {} counties, {} columns from {} of {} sources.",
                util::format_int(out.summary.len() as u64),
                out.summary.columns.len(),
                out.joined_sources.len(),
                app.config.sources.len()
            );
            print_warnings(out);
            println!();
            app.current = Some(out.clone());
        }
        Err(e) => {
            error!("pipeline failed: {}", e);
            eprintln!("Failed to build summary: {}\n", e);
        }
    }
}

/// Handle option [2]: preview the summary table and quick statistics.
fn handle_preview(app: &App) {
    let Some(out) = app.current.as_ref() else {
        println!("Error: No summary built yet. Please choose option 1 first.\n");
        return;
    };
    println!("Summary Table\n");
    output::preview_table(&out.summary, app.config.output.preview_rows);

    let summary = stats::summarize(&out.summary, &app.config.key_column);
    println!("Counties: {}", util::format_int(summary.total_counties as u64));
    for c in &summary.columns {
        println!(
            "  {}: total {}, mean {}",
            c.column,
            util::format_number(c.sum, 2),
            c.mean.map(|m| util::format_number(m, 2)).unwrap_or_default()
        );
    }
    println!();
}

/// Handle option [3]: rank counties by the pre-computed potential score.
fn handle_ranking(app: &App) {
    let score = &app.config.score;
    let spec = SourceSpec::new("potential", score.path.clone());
    let table = match pipeline::load_scores(&spec, &app.config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Cannot load scores: {}\n", e);
            return;
        }
    };
    let key = &app.config.key_column;
    let ranked = match ranking::rank_by(&table, key, &score.column, Order::Descending) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Cannot rank: {}\n", e);
            return;
        }
    };
    if let Some(s) = stats::summarize(&table, key).column(&score.column) {
        println!(
            "Counties: {}  Max: {}  Min: {}  Mean: {}\n",
            s.non_null,
            util::format_number(s.max.unwrap_or_default(), 2),
            util::format_number(s.min.unwrap_or_default(), 2),
            util::format_number(s.mean.unwrap_or_default(), 2)
        );
    }
    println!("Top {} Counties by {}\n", score.top_n, score.column);
    output::preview_table_rows(ranking::top_n(&ranked, score.top_n), score.top_n);
    println!("Bottom {} Counties by {}\n", score.top_n, score.column);
    output::preview_table_rows(&ranking::bottom_n(&ranked, score.top_n), score.top_n);

    let Some(regions_path) = score.regions.as_ref() else {
        return;
    };
    let regions_spec = SourceSpec::new("regions", regions_path.clone());
    let regions = match pipeline::load_lookup(&regions_spec, &app.config) {
        Ok(r) => r,
        Err(e) => {
            debug!("no region lookup: {}", e);
            return;
        }
    };
    let merged = join::left_join(&table, &regions, key, app.config.join.collisions)
        .and_then(|t| ranking::compare_to_means(&t, key, &score.column, &score.region_column));
    match merged {
        Ok(rows) => {
            println!("Comparison with National and Regional Means\n");
            output::preview_table_rows(&rows, rows.len());
        }
        Err(e) => eprintln!("Cannot compare with regional means: {}\n", e),
    }
}

/// Handle option [4]: write the Excel CSV, the `.xlsx` workbook and `summary.json`.
fn handle_export(app: &App) {
    let Some(out) = app.current.as_ref() else {
        println!("Error: No summary built yet. Please choose option 1 first.\n");
        return;
    };
    let export = &app.config.output.export;
    let workbook = export.with_extension("xlsx");
    let mut targets = vec![(workbook, Format::Xlsx)];
    if Format::from_extension(export) != Some(Format::Xlsx) {
        targets.insert(0, (export.clone(), Format::CsvExcel));
    }
    for (path, format) in &targets {
        if let Err(e) = output::write_to(path, &out.summary, *format) {
            eprintln!("Write error: {}", e);
        } else {
            println!("(Full table exported to {})", path.display());
        }
    }
    let report = stats::build_report(out, &app.config.key_column);
    let stats_path = &app.config.output.stats;
    if let Err(e) = output::write_json(stats_path, &report) {
        eprintln!("Write error: {}", e);
    } else {
        println!("(Summary statistics saved to {})\n", stats_path.display());
    }
}

fn run_once(
    config: &Config,
    export: &Path,
    format: Format,
    stats_path: Option<&Path>,
) -> Result<()> {
    let out = pipeline::run(config).context("building summary table")?;
    print_warnings(&out);
    output::write_to(export, &out.summary, format)
        .with_context(|| format!("writing {}", export.display()))?;
    println!(
        "Exported {} counties to {}",
        util::format_int(out.summary.len() as u64),
        export.display()
    );
    if let Some(path) = stats_path {
        let report = stats::build_report(&out, &config.key_column);
        output::write_json(path, &report).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        anyhow::bail!(
            "{} already exists; remove it first or edit it manually",
            DEFAULT_CONFIG_FILE
        );
    }
    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("writing {}", DEFAULT_CONFIG_FILE))?;
    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.init_config {
        return handle_init_config();
    }
    init_logging(&args);

    let config =
        Config::load_or_default(args.config.as_deref()).context("loading configuration")?;
    debug!(?config, "configuration loaded");

    if let Some(export) = args.export.as_deref() {
        return run_once(&config, export, args.export_format(), args.stats.as_deref());
    }

    let mut app = App {
        config,
        cache: SummaryCache::new(),
        current: None,
    };
    loop {
        println!("County Summary Report:");
        println!("[1] Build summary table");
        println!("[2] Preview summary");
        println!("[3] Potential ranking");
        println!("[4] Export");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut app),
            "2" => handle_preview(&app),
            "3" => handle_ranking(&app),
            "4" => handle_export(&app),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-4.\n"),
        }
    }
    Ok(())
}
