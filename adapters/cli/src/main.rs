#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Tank Clash battles.
//!
//! `tank-clash run <map>` plays one battle and writes the reference output
//! files next to it: `output_<map>` with the per-round action log and the
//! result line, `gameSteps_<map>` with a board dump per round, and
//! `input_errors.txt` when the map needed repairs. `tank-clash generate`
//! writes a reproducible random map for a given seed.

mod map_file;
mod mapgen;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};

use tank_clash_engine::{MatchRunner, StrategyFactory};
use tank_clash_system_decision::Strategy;

#[derive(Parser)]
#[command(name = "tank-clash", about = "Deterministic tank battles on a torus")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Play one battle from a map file and write the output files.
    Run(RunArgs),
    /// Write a reproducible random map.
    Generate(GenerateArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Path to the map file.
    map: PathBuf,
    /// Strategy assigned to every player 1 tank.
    #[arg(long, value_enum, default_value = "predictive")]
    player_one: StrategyArg,
    /// Strategy assigned to every player 2 tank.
    #[arg(long, value_enum, default_value = "predictive")]
    player_two: StrategyArg,
    /// Directory for the output files; defaults to the map's directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Path of the map file to write.
    out: PathBuf,
    /// Board rows.
    #[arg(long, default_value_t = 12)]
    rows: u32,
    /// Board columns.
    #[arg(long, default_value_t = 16)]
    cols: u32,
    /// Number of walls to place.
    #[arg(long, default_value_t = 20)]
    walls: usize,
    /// Number of mines to place.
    #[arg(long, default_value_t = 8)]
    mines: usize,
    /// Tanks dealt to each player.
    #[arg(long, default_value_t = 2)]
    tanks_per_player: usize,
    /// Round limit recorded in the map.
    #[arg(long, default_value_t = 200)]
    max_steps: u32,
    /// Shells loaded into every tank.
    #[arg(long, default_value_t = 16)]
    num_shells: u16,
    /// Seed for the deterministic layout.
    #[arg(long, default_value_t = 0x7461_6e6b)]
    seed: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Reactive policy.
    Baseline,
    /// Shell-tracking, intercepting policy.
    Predictive,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Baseline => Self::Baseline,
            StrategyArg::Predictive => Self::Predictive,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    match Cli::parse().command {
        CliCommand::Run(args) => run_match(&args),
        CliCommand::Generate(args) => generate_map(&args),
    }
}

fn run_match(args: &RunArgs) -> Result<()> {
    let content = fs::read_to_string(&args.map)
        .with_context(|| format!("could not read map file {}", args.map.display()))?;
    let parsed = map_file::parse(&content)
        .with_context(|| format!("map file {} is malformed", args.map.display()))?;

    let map_name = args
        .map
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "map".to_string());
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| args.map.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("could not create {}", output_dir.display()))?;

    if !parsed.warnings.is_empty() {
        for warning in &parsed.warnings {
            warn!("map repair: {warning}");
        }
        let path = output_dir.join("input_errors.txt");
        fs::write(&path, parsed.warnings.join("\n") + "\n")
            .with_context(|| format!("could not write {}", path.display()))?;
    }

    info!(
        "running '{}' ({} objects)",
        parsed.title,
        parsed.setup.objects.len(),
    );
    let factory =
        StrategyFactory::uniform(args.player_one.into(), args.player_two.into());
    let mut runner = MatchRunner::new(&parsed.setup, &factory);
    let result = runner.run();

    let mut log_text = String::new();
    for line in runner.round_log() {
        log_text.push_str(line);
        log_text.push('\n');
    }
    log_text.push_str(&result.to_string());
    log_text.push('\n');
    let log_path = output_dir.join(format!("output_{map_name}"));
    fs::write(&log_path, log_text)
        .with_context(|| format!("could not write {}", log_path.display()))?;

    let mut steps_text = String::from("=== GAME BOARD STATES ===\n\n");
    for (index, dump) in runner.board_dumps().iter().enumerate() {
        steps_text.push_str(&format!("Turn {}:\n{dump}\n\n", index + 1));
    }
    let steps_path = output_dir.join(format!("gameSteps_{map_name}"));
    fs::write(&steps_path, steps_text)
        .with_context(|| format!("could not write {}", steps_path.display()))?;

    println!("{result}");
    info!(
        "wrote {} and {}",
        log_path.display(),
        steps_path.display(),
    );
    Ok(())
}

fn generate_map(args: &GenerateArgs) -> Result<()> {
    let setup = mapgen::generate(&mapgen::GenSpec {
        rows: args.rows,
        cols: args.cols,
        walls: args.walls,
        mines: args.mines,
        tanks_per_player: args.tanks_per_player,
        max_steps: args.max_steps,
        num_shells: args.num_shells,
        seed: args.seed,
    });
    let title = format!("generated seed={:#x}", args.seed);
    let content = map_file::render(&title, &setup);
    fs::write(&args.out, content)
        .with_context(|| format!("could not write {}", args.out.display()))?;
    println!("wrote {}", args.out.display());
    Ok(())
}
