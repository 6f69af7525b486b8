//! Delve level generator
//!
//! Builds one level, prints it, then runs the placed entities for a few
//! simulated frames.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use strum::IntoEnumIterator;

use dv_core::content::{
    ContentContext, ContentPack, ContentType, Phase, Protagonist, StandardContentSet,
};
use dv_core::entity::ComponentScheduler;
use dv_core::logging::{directive_for_verbosity, init_tracing};
use dv_core::{GenResult, GeneratorConfig, LevelBuilder};

/// Fixed simulation step
const TICK: f64 = 1.0 / 60.0;

/// Procedural level generator
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Delve - carve and populate a dungeon level", long_about = None)]
struct Args {
    /// Seed for a reproducible level (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Generator configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content pack (TOML)
    #[arg(long)]
    pack: Option<PathBuf>,

    /// Level phase to build
    #[arg(short, long, value_enum, default_value_t = PhaseArg::FirstVisit)]
    phase: PhaseArg,

    /// Protagonist experience level
    #[arg(short = 'l', long, default_value_t = 1)]
    level: u32,

    /// Simulation frames to run after the build
    #[arg(short, long, default_value_t = 60)]
    ticks: u32,

    /// Companion is unlocked
    #[arg(long)]
    companion: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PhaseArg {
    FirstVisit,
    Revisit,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::FirstVisit => Phase::FirstVisit,
            PhaseArg::Revisit => Phase::Revisit,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(directive_for_verbosity(args.verbose));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("delve: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> GenResult<()> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let pack = match &args.pack {
        Some(path) => ContentPack::load(path)?,
        None => ContentPack::default(),
    };
    let context = ContentContext {
        protagonist: Some(Protagonist::new("adventurer", args.level)),
        companion_unlocked: args.companion,
        scaling: config.scaling.clone(),
    };
    let mut set = StandardContentSet::new(pack, context)?;

    let builder = LevelBuilder::new(config);
    let mut rng = builder.rng();
    let phase = Phase::from(args.phase);
    let built = builder.build(phase, &mut set, &mut rng)?;

    println!("seed {} ({phase})", rng.seed());
    for row in built.render() {
        println!("{}", row.trim_end());
    }
    println!();

    for region in built.level.regions() {
        let mut counts: Vec<String> = Vec::new();
        for kind in ContentType::iter() {
            let n = built
                .placements_in(region.id)
                .filter(|p| p.content.kind == kind)
                .count();
            if n > 0 {
                counts.push(format!("{}{n}", kind.glyph()));
            }
        }
        let main = if built.level.main_region_id() == Some(region.id) {
            " main"
        } else {
            ""
        };
        println!(
            "{:>4} {:?}{main} {} cells: {}",
            region.id.to_string(),
            region.kind,
            region.area(),
            if counts.is_empty() {
                "-".to_string()
            } else {
                counts.join(" ")
            }
        );
    }

    let mut scheduler = ComponentScheduler::new();
    let active = built.activate(&mut scheduler);
    for _ in 0..args.ticks {
        scheduler.update(TICK);
    }
    println!(
        "\n{} entities simulated for {} frames",
        active.contents.len(),
        scheduler.frame()
    );
    active.release(&mut scheduler);
    Ok(())
}
