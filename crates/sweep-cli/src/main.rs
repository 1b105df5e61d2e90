mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use config::Config;
use sweep_core::{Checkpoint, Invocation, Sweep};
use sweep_fs::loc;
use sweep_fs::{
    aggregate_tree, plan_session, run_sweep, AggregateOptions, MalformedPolicy, ShellDriver,
};

#[derive(Parser)]
#[command(
    name = "sweep",
    version,
    about = "Drive a benchmark over a power-of-two (N, Nx) grid and aggregate its timings"
)]
struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark driver for every problem size, or resume from a checkpoint
    Run {
        /// Largest N is 2^N_MAX_EXP
        n_max_exp: u32,

        /// Largest Nx is 2^NX_MAX_EXP
        nx_max_exp: u32,

        /// Runs per problem size
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        num_runs: u32,

        /// Result file being written when the previous session stopped,
        /// e.g. benchmarking-cpu/N4194304/N4194304_Nx65536/run16.txt
        checkpoint: Option<String>,

        /// Root of the result tree
        #[arg(long)]
        root: Option<PathBuf>,

        /// Program invoked as `DRIVER N Nx START_RUN NUM_RUNS OUTPUT_DIR`
        #[arg(long)]
        driver: Option<PathBuf>,

        /// Print the invocations without creating directories or running anything
        #[arg(long)]
        dry_run: bool,

        /// Print the dry-run plan as JSON
        #[arg(long, requires = "dry_run")]
        json: bool,
    },

    /// Write one summary table per N directory of a result tree
    Aggregate {
        /// Root of the result tree
        root: Option<PathBuf>,

        /// Skip entries with malformed names instead of aborting
        #[arg(long)]
        skip_malformed: bool,

        /// Summary file name written into each N directory
        #[arg(long)]
        summary_file: Option<String>,

        /// Text that follows the duration on its line
        #[arg(long)]
        marker: Option<String>,
    },

    /// Count lines per source file for one language
    Loc {
        /// Root of the source tree
        path: PathBuf,

        /// Language name (see `sweep config` for the known ones)
        lang: String,

        /// File with `lang=['.ext', ...]` lines
        #[arg(short, long)]
        extensions_file: Option<PathBuf>,

        /// Directory receiving report_<project>/
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(level, env.as_deref()))
        .init();

    let cfg = config::load_config()?;
    tracing::debug!("config: {}", config::show_config_path());

    match cli.command {
        Commands::Run {
            n_max_exp,
            nx_max_exp,
            num_runs,
            checkpoint,
            root,
            driver,
            dry_run,
            json,
        } => {
            let sweep = Sweep::new(cfg.sweep.min_exponent, n_max_exp, nx_max_exp)
                .context("invalid sweep bounds")?;
            let checkpoint = checkpoint
                .as_deref()
                .map(Checkpoint::parse)
                .transpose()
                .context("cannot resume")?;
            let root = root.unwrap_or_else(|| PathBuf::from(&cfg.sweep.root));
            if dry_run {
                cmd_plan(&root, &sweep, num_runs, checkpoint.as_ref(), json)
            } else {
                let driver = driver.unwrap_or_else(|| PathBuf::from(&cfg.sweep.driver));
                cmd_run(&root, &sweep, num_runs, checkpoint.as_ref(), driver)
            }
        }
        Commands::Aggregate {
            root,
            skip_malformed,
            summary_file,
            marker,
        } => {
            let root = root.unwrap_or_else(|| PathBuf::from(&cfg.sweep.root));
            let opts = AggregateOptions {
                marker: marker.unwrap_or_else(|| cfg.aggregate.marker.clone()),
                summary_file: summary_file.unwrap_or_else(|| cfg.aggregate.summary_file.clone()),
                malformed: if skip_malformed || cfg.aggregate.skip_malformed {
                    MalformedPolicy::Skip
                } else {
                    MalformedPolicy::Abort
                },
            };
            cmd_aggregate(&root, &opts)
        }
        Commands::Loc {
            path,
            lang,
            extensions_file,
            output_dir,
        } => {
            let extensions = resolve_extensions(&cfg, &lang, extensions_file)?;
            let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&cfg.loc.output_dir));
            cmd_loc(&path, &lang, &extensions, &output_dir)
        }
        Commands::Config => cmd_config(&cfg),
    }
}

/// `RUST_LOG` directives when given, otherwise `level` for everything.
fn log_filter(level: LevelFilter, env: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(env.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Sweep commands
// ---------------------------------------------------------------------------

fn cmd_plan(
    root: &Path,
    sweep: &Sweep,
    num_runs: u32,
    checkpoint: Option<&Checkpoint>,
    json: bool,
) -> Result<()> {
    let plan = plan_session(root, sweep, num_runs, checkpoint).context("cannot resume")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    for inv in &plan {
        print_invocation(inv);
    }
    println!("{} invocations ({} problem sizes in the sweep).", plan.len(), sweep.len());
    Ok(())
}

fn cmd_run(
    root: &Path,
    sweep: &Sweep,
    num_runs: u32,
    checkpoint: Option<&Checkpoint>,
    driver: PathBuf,
) -> Result<()> {
    let mut driver = ShellDriver::new(driver);
    let summary = run_sweep(root, sweep, num_runs, checkpoint, &mut driver)
        .with_context(|| format!("sweep into {} stopped", root.display()))?;

    println!(
        "Done: {} of {} invocations completed, {} failed, {} skipped.",
        summary.completed,
        summary.planned,
        summary.failed.len(),
        summary.skipped.len()
    );
    for size in &summary.failed {
        println!("  failed:  {size}");
    }
    for size in &summary.skipped {
        println!("  skipped: {size}");
    }
    Ok(())
}

fn cmd_aggregate(root: &Path, opts: &AggregateOptions) -> Result<()> {
    let report = aggregate_tree(root, opts)
        .with_context(|| format!("aggregation of {} stopped", root.display()))?;

    if report.tables.is_empty() {
        println!("No N directories under {}.", root.display());
        return Ok(());
    }

    for table in &report.tables {
        println!(
            "{:<48} {:>6} rows {:>4} unset",
            table.path.display().to_string(),
            table.rows,
            table.unset
        );
    }
    for path in &report.skipped {
        println!("  skipped: {}", path.display());
    }
    Ok(())
}

fn print_invocation(inv: &Invocation) {
    let last_run = u64::from(inv.start_run) + u64::from(inv.num_runs).saturating_sub(1);
    println!(
        "N={:<12} Nx={:<10} runs {}..={:<6} -> {}",
        inv.size.n,
        inv.size.nx,
        inv.start_run,
        last_run,
        inv.output_dir.display()
    );
}

// ---------------------------------------------------------------------------
// Line counter
// ---------------------------------------------------------------------------

fn resolve_extensions(cfg: &Config, lang: &str, file: Option<PathBuf>) -> Result<Vec<String>> {
    let file = file.or_else(|| cfg.loc.extensions_file.as_ref().map(PathBuf::from));

    if let Some(file) = file {
        let text = std::fs::read_to_string(&file)
            .with_context(|| format!("reading {}", file.display()))?;
        return match loc::parse_extensions_file(&text, lang) {
            Some(exts) if !exts.is_empty() => Ok(exts),
            _ => bail!("no extensions for '{lang}' in {}", file.display()),
        };
    }

    match cfg.loc.languages.get(lang) {
        Some(exts) => Ok(exts.clone()),
        None => {
            let known: Vec<&str> = cfg.loc.languages.keys().map(String::as_str).collect();
            bail!("unknown language '{lang}' (known: {})", known.join(", "))
        }
    }
}

fn cmd_loc(path: &Path, lang: &str, extensions: &[String], output_dir: &Path) -> Result<()> {
    let project = loc::project_name(path)
        .with_context(|| format!("cannot name a project after {}", path.display()))?;
    let counts = loc::count_lines(path, extensions)?;
    let report = loc::write_report(output_dir, &project, lang, &counts)?;

    let total: usize = counts.iter().map(|c| c.lines).sum();
    println!(
        "{project}: {} {lang} files, {total} lines (.{})",
        counts.len(),
        extensions.join(", .")
    );
    println!("Report: {}", report.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[sweep]");
    println!("  root = {}", cfg.sweep.root);
    println!("  driver = {}", cfg.sweep.driver);
    println!("  min_exponent = {}", cfg.sweep.min_exponent);
    println!();
    println!("[aggregate]");
    println!("  marker = {:?}", cfg.aggregate.marker);
    println!("  summary_file = {}", cfg.aggregate.summary_file);
    println!("  skip_malformed = {}", cfg.aggregate.skip_malformed);
    println!();
    println!("[loc]");
    println!("  output_dir = {}", cfg.loc.output_dir);
    if let Some(ref file) = cfg.loc.extensions_file {
        println!("  extensions_file = {file}");
    }
    for (lang, exts) in &cfg.loc.languages {
        println!("  {lang} = [{}]", exts.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_positional() {
        let cli = Cli::try_parse_from([
            "sweep",
            "run",
            "22",
            "16",
            "25",
            "benchmarking-cpu/N4194304/N4194304_Nx65536/run16.txt",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                n_max_exp,
                nx_max_exp,
                num_runs,
                checkpoint,
                dry_run,
                ..
            } => {
                assert_eq!((n_max_exp, nx_max_exp, num_runs), (22, 16, 25));
                assert!(checkpoint.unwrap().ends_with("run16.txt"));
                assert!(!dry_run);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_rejects_zero_runs() {
        assert!(Cli::try_parse_from(["sweep", "run", "10", "10", "0"]).is_err());
    }

    #[test]
    fn test_json_requires_dry_run() {
        assert!(Cli::try_parse_from(["sweep", "run", "10", "10", "1", "--json"]).is_err());
        assert!(
            Cli::try_parse_from(["sweep", "run", "10", "10", "1", "--dry-run", "--json"]).is_ok()
        );
    }

    #[test]
    fn test_resolve_extensions_from_config() {
        let cfg = Config::default();
        assert_eq!(resolve_extensions(&cfg, "c", None).unwrap(), vec!["c", "h"]);
        let err = resolve_extensions(&cfg, "cobol", None).unwrap_err();
        assert!(err.to_string().contains("unknown language"));
    }

    #[test]
    fn test_resolve_extensions_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("extensions.txt");
        std::fs::write(&file, "c=['.c', '.h']\npython=['.py']\n").unwrap();

        let cfg = Config::default();
        let exts = resolve_extensions(&cfg, "python", Some(file.clone())).unwrap();
        assert_eq!(exts, vec!["py"]);
        assert!(resolve_extensions(&cfg, "rust", Some(file)).is_err());
    }

    #[test]
    fn test_rust_log_overrides_default_level() {
        assert_eq!(log_filter(LevelFilter::INFO, Some("debug")).to_string(), "debug");
        assert_eq!(log_filter(LevelFilter::WARN, None).to_string(), "warn");
        assert_eq!(log_filter(LevelFilter::INFO, Some("")).to_string(), "info");
    }

    #[test]
    fn test_dry_run_rejects_overflowing_checkpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let sweep = Sweep::new(10, 10, 10).unwrap();
        let cp = Checkpoint::parse("N1024/N1024_Nx1024/run4294967295.txt").unwrap();

        let err = cmd_plan(tmp.path(), &sweep, 2, Some(&cp), false).unwrap_err();
        assert!(format!("{err:#}").contains("overflow"));
        cmd_plan(tmp.path(), &sweep, 1, Some(&cp), false).unwrap();
    }
}
