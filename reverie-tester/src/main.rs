mod logic;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{RunPlan, Runner, ScenarioResult, Strategy};
use util::{parse_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "reverie-tester", version = "0.1.0")]
#[command(about = "Automated playthroughs and invariant checks for the Reverie narrative engine")]
struct Args {
    /// Strategies to run; repeat the flag or omit it to run all of them
    #[arg(long, value_enum)]
    strategy: Vec<Strategy>,

    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of consecutive seeds played from each listed seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Step cap per playthrough
    #[arg(long, default_value_t = 200)]
    max_steps: usize,

    /// Passive degradation ticks applied after every action
    #[arg(long, default_value_t = 1)]
    ticks_per_step: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner(&args);

    let start_time = Instant::now();
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    let results = run_scenarios(&args, &seeds)?;

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        eprintln!("{}", "invariant violations detected".red().bold());
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner(args: &Args) {
    // Keep machine-readable reports clean when they go to stdout.
    if args.report != "console" && args.output.is_none() {
        return;
    }
    println!("{}", "🌙 Reverie Automated Tester".bright_cyan().bold());
    println!("{}", "===========================".cyan());
}

fn strategies(args: &Args) -> Vec<Strategy> {
    if args.strategy.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        args.strategy.clone()
    }
}

fn run_scenarios(args: &Args, seeds: &[u64]) -> Result<Vec<ScenarioResult>> {
    let runner = Runner::new(args.verbose);
    let mut results = Vec::new();
    for strategy in strategies(args) {
        let plan = RunPlan {
            strategy,
            max_steps: args.max_steps,
            ticks_per_step: args.ticks_per_step,
        };
        for &seed in seeds {
            if args.verbose {
                println!(
                    "🧪 Dreaming: {} (seed: {seed}, iterations: {})",
                    strategy.label().bright_white(),
                    args.iterations
                );
            }
            let result = runner
                .run_scenario(&plan, seed, args.iterations)
                .with_context(|| format!("{strategy} run for seed {seed} failed"))?;
            results.push(result);
        }
    }
    Ok(results)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Reverie Dream Run Results\n\n_No dreams executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No dreams executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
