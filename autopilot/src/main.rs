use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fuelrun_core::constants::MAX_FRAMES_DEFAULT;
use fuelrun_core::tape::parse_tape;
use fuelrun_core::verify_tape;
use fuelrun_autopilot::benchmark::{resolve_bots, run_benchmark, BenchmarkConfig, Objective};
use fuelrun_autopilot::bots::{bot_ids, bot_manifest_entries, create_bot, describe_bots};
use fuelrun_autopilot::runner::{run_bot, write_tape};
use fuelrun_autopilot::util::{
    load_config, parse_seed, parse_seed_csv, parse_seed_file, seed_to_hex,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "fuelrun-autopilot")]
#[command(about = "Headless fuelrun driver for recording, verifying and benchmarking input tapes")]
struct Cli {
    /// JSON simulation config; omitted fields use the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available bots
    ListBots,
    /// Export full bot manifest (including config fingerprints)
    RosterManifest {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Drive one session with a bot and write its tape
    Run {
        #[arg(long)]
        bot: String,
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 7_200)]
        max_ticks: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay a tape and check its footer claims
    VerifyTape {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = MAX_FRAMES_DEFAULT)]
        max_frames: u32,
    },
    /// Run multi-seed benchmark across one or more bots
    Benchmark {
        #[arg(long)]
        bots: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 7_200)]
        max_ticks: u32,
        #[arg(long, value_enum, default_value_t = CliObjective::Distance)]
        objective: CliObjective,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 4)]
        save_top: usize,
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Print the effective simulation config as JSON
    DumpConfig {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliObjective {
    Distance,
    Survival,
    Hybrid,
}

impl From<CliObjective> for Objective {
    fn from(value: CliObjective) -> Self {
        match value {
            CliObjective::Distance => Objective::Distance,
            CliObjective::Survival => Objective::Survival,
            CliObjective::Hybrid => Objective::Hybrid,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let Cli { config, command } = Cli::parse();
    let sim = load_config(config.as_deref())?;

    match command {
        Commands::ListBots => {
            for (id, description) in describe_bots() {
                println!("{id:20} {description}");
            }
        }
        Commands::RosterManifest { output } => {
            let manifest = bot_manifest_entries();
            let encoded = serde_json::to_vec_pretty(&manifest)?;
            if let Some(path) = output {
                write_output(&path, &encoded)?;
                println!("wrote={}", path.display());
                println!("bots={}", manifest.len());
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
        Commands::Run {
            bot,
            seed,
            max_ticks,
            output,
        } => {
            if create_bot(&bot).is_none() {
                let available = bot_ids().join(", ");
                return Err(anyhow!("unknown bot '{bot}'. available: {available}"));
            }
            let seed = parse_seed(&seed)?;
            let artifact = run_bot(&bot, seed, &sim, max_ticks)?;
            let output_path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "tapes/{}-{}-dist{:.0}-frames{}.tape",
                    bot,
                    seed_to_hex(seed).replace("0x", "seed"),
                    artifact.metrics.final_distance,
                    artifact.metrics.frame_count
                ))
            });
            write_tape(&output_path, &artifact.tape)?;

            let m = &artifact.metrics;
            println!("bot={}", m.bot_id);
            println!("bot_fingerprint={}", m.bot_fingerprint);
            println!("seed={}", seed_to_hex(seed));
            println!("frames={}", m.frame_count);
            println!("distance={:.3}", m.final_distance);
            println!("level={}", m.final_level);
            println!("fuel={:.4}", m.final_fuel);
            println!("falls={}", m.falls);
            println!("hazards={}", m.hazards_hit);
            println!("game_over={}", m.game_over);
            println!("checksum={:#010x}", m.tape_checksum);
            println!("output={}", output_path.display());
        }
        Commands::VerifyTape { input, max_frames } => {
            let bytes =
                fs::read(&input).with_context(|| format!("failed reading {}", input.display()))?;
            let tape = parse_tape(&bytes, max_frames)?;
            let report = verify_tape(&sim, &bytes, max_frames)?;
            println!("input={}", input.display());
            println!("seed={}", seed_to_hex(report.seed));
            println!("difficulty_base={}", tape.header.params.difficulty_base);
            println!("tick_rate={}", tape.header.params.tick_rate);
            println!("frame_count={}", report.frame_count);
            println!("final_distance={:.3}", report.final_distance);
            println!("final_level={}", report.final_level);
            println!("checksum={:#010x}", report.tape_checksum);
        }
        Commands::Benchmark {
            bots,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            max_ticks,
            objective,
            out_dir,
            save_top,
            jobs,
        } => {
            let bots = resolve_bots(bots.as_deref())?;
            let seeds = resolve_seeds(
                seeds.as_deref(),
                seed_file.as_deref(),
                seed_start.as_deref(),
                seed_count,
            )?;
            let objective: Objective = objective.into();

            let out_dir = out_dir.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "benchmarks/{}-{}",
                    objective.as_str(),
                    timestamp_suffix()
                ))
            });

            let report = run_benchmark(BenchmarkConfig {
                bots,
                seeds,
                sim,
                max_ticks,
                objective,
                out_dir: out_dir.clone(),
                save_top,
                jobs,
            })?;

            println!("objective={}", objective.as_str());
            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            println!("top bots:");
            for (idx, bot) in report.bot_rankings.iter().take(5).enumerate() {
                println!(
                    "  {}. {}  objective={:.2} avg_distance={:.1} avg_frames={:.1} avg_level={:.2} avg_falls={:.2} avg_steer={:.1} avg_throttle={:.1} avg_brake={:.1} survival={:.0}%",
                    idx + 1,
                    bot.bot_id,
                    bot.objective_value,
                    bot.avg_distance,
                    bot.avg_frames,
                    bot.avg_level,
                    bot.avg_falls,
                    bot.avg_steer_frames,
                    bot.avg_throttle_frames,
                    bot.avg_brake_frames,
                    bot.survival_rate * 100.0,
                );
            }

            println!("saved tapes:");
            for tape in report.saved_tapes.iter().take(10) {
                println!(
                    "  [{} #{:02}] {} {} distance={:.1} level={} frames={}",
                    tape.metric,
                    tape.rank,
                    tape.bot_id,
                    tape.seed_hex,
                    tape.distance,
                    tape.level,
                    tape.frames,
                );
            }
        }
        Commands::DumpConfig { output } => {
            let encoded = serde_json::to_vec_pretty(&sim)?;
            if let Some(path) = output {
                write_output(&path, &encoded)?;
                println!("wrote={}", path.display());
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
    }

    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}

fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: u32,
) -> Result<Vec<u32>> {
    if let Some(path) = seed_file {
        return parse_seed_file(path);
    }

    if let Some(csv) = seeds {
        return parse_seed_csv(csv);
    }

    let start = if let Some(start) = seed_start {
        parse_seed(start)?
    } else {
        0xF0E1_0001
    };

    let mut out = Vec::with_capacity(seed_count as usize);
    let mut cur = start;
    for _ in 0..seed_count {
        out.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    Ok(out)
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}
