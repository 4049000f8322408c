use crate::bots::bot_ids;
use crate::runner::{run_bot, RunMetrics};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use fuelrun_core::SimConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Distance,
    Survival,
    Hybrid,
}

impl Objective {
    pub fn run_value(self, metrics: &RunMetrics) -> f64 {
        let distance = metrics.final_distance as f64;
        let frames = metrics.frame_count as f64;
        let fuel = metrics.final_fuel.max(0.0) as f64;
        let mishaps = (metrics.falls + metrics.hazards_hit) as f64;
        match self {
            Self::Distance => distance + (metrics.final_level as f64) * 250.0,
            Self::Survival => {
                frames + fuel * 600.0 - (metrics.falls as f64) * 300.0
                    + if metrics.game_over { 0.0 } else { 1_000.0 }
            }
            Self::Hybrid => distance * 0.75 + frames * 0.25 + fuel * 200.0 - mishaps * 60.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Survival => "survival",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub sim: SimConfig,
    pub max_ticks: u32,
    pub objective: Objective,
    pub out_dir: PathBuf,
    pub save_top: usize,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub bot_id: String,
    pub bot_fingerprint: String,
    pub seed: u32,
    pub seed_hex: String,
    pub frame_count: u32,
    pub final_distance: f32,
    pub final_level: u16,
    pub final_fuel: f32,
    pub game_over: bool,
    pub falls: u32,
    pub hazards_hit: u32,
    pub fuel_collected: u32,
    pub objective_value: f64,
    pub action_frames: u32,
    pub steer_frames: u32,
    pub throttle_frames: u32,
    pub brake_frames: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotAggregate {
    pub bot_id: String,
    pub bot_fingerprint: String,
    pub runs: usize,
    pub avg_distance: f64,
    pub max_distance: f32,
    pub avg_frames: f64,
    pub max_frames: u32,
    pub avg_level: f64,
    pub max_level: u16,
    pub avg_falls: f64,
    pub avg_hazards: f64,
    pub avg_fuel_collected: f64,
    pub survival_rate: f64,
    pub objective_value: f64,
    pub avg_steer_frames: f64,
    pub avg_throttle_frames: f64,
    pub avg_brake_frames: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedTapeRecord {
    pub rank: usize,
    pub metric: String,
    pub bot_id: String,
    pub bot_fingerprint: String,
    pub seed: u32,
    pub seed_hex: String,
    pub distance: f32,
    pub level: u16,
    pub frames: u32,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub objective: Objective,
    pub max_ticks: u32,
    pub jobs: Option<usize>,
    pub config: SimConfig,
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub bot_rankings: Vec<BotAggregate>,
    pub runs: Vec<RunRecord>,
    pub saved_tapes: Vec<SavedTapeRecord>,
}

#[derive(Clone, Debug)]
struct InternalRun {
    metrics: RunMetrics,
    objective_value: f64,
    tape: Vec<u8>,
}

pub fn resolve_bots(input: Option<&str>) -> Result<Vec<String>> {
    match input {
        None => Ok(bot_ids().iter().map(|id| (*id).to_string()).collect()),
        Some(raw) => {
            let mut bots = Vec::new();
            for token in raw.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                bots.push(token.to_string());
            }
            if bots.is_empty() {
                return Err(anyhow!("--bots resolved to empty list"));
            }
            Ok(bots)
        }
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    values.sum::<f64>() / count as f64
}

fn aggregate(bot_id: String, bot_runs: &[&InternalRun], max_ticks: u32) -> BotAggregate {
    let runs = bot_runs.len();
    let bot_fingerprint = bot_runs
        .first()
        .map(|r| r.metrics.bot_fingerprint.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let survived = bot_runs
        .iter()
        .filter(|r| !r.metrics.game_over && r.metrics.frame_count >= max_ticks)
        .count();

    BotAggregate {
        bot_id,
        bot_fingerprint,
        runs,
        avg_distance: mean(bot_runs.iter().map(|r| r.metrics.final_distance as f64), runs),
        max_distance: bot_runs
            .iter()
            .map(|r| r.metrics.final_distance)
            .fold(0.0, f32::max),
        avg_frames: mean(bot_runs.iter().map(|r| r.metrics.frame_count as f64), runs),
        max_frames: bot_runs
            .iter()
            .map(|r| r.metrics.frame_count)
            .max()
            .unwrap_or_default(),
        avg_level: mean(bot_runs.iter().map(|r| r.metrics.final_level as f64), runs),
        max_level: bot_runs
            .iter()
            .map(|r| r.metrics.final_level)
            .max()
            .unwrap_or_default(),
        avg_falls: mean(bot_runs.iter().map(|r| r.metrics.falls as f64), runs),
        avg_hazards: mean(bot_runs.iter().map(|r| r.metrics.hazards_hit as f64), runs),
        avg_fuel_collected: mean(bot_runs.iter().map(|r| r.metrics.fuel_collected as f64), runs),
        survival_rate: survived as f64 / runs as f64,
        objective_value: mean(bot_runs.iter().map(|r| r.objective_value), runs),
        avg_steer_frames: mean(bot_runs.iter().map(|r| r.metrics.steer_frames as f64), runs),
        avg_throttle_frames: mean(
            bot_runs.iter().map(|r| r.metrics.throttle_frames as f64),
            runs,
        ),
        avg_brake_frames: mean(bot_runs.iter().map(|r| r.metrics.brake_frames as f64), runs),
    }
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.bots.is_empty() {
        return Err(anyhow!("benchmark requires at least one bot"));
    }
    if config.max_ticks == 0 {
        return Err(anyhow!("benchmark --max-ticks must be >= 1"));
    }
    config
        .sim
        .validate()
        .map_err(|err| anyhow!("invalid simulation config: {err}"))?;
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }

    let run_jobs: Vec<(String, u32)> = config
        .bots
        .iter()
        .flat_map(|bot| config.seeds.iter().map(move |seed| (bot.clone(), *seed)))
        .collect();
    info!(
        bots = config.bots.len(),
        seeds = config.seeds.len(),
        max_ticks = config.max_ticks,
        objective = config.objective.as_str(),
        "starting benchmark"
    );

    let run_one = |(bot_id, seed): &(String, u32)| -> Result<InternalRun> {
        let artifact = run_bot(bot_id, *seed, &config.sim, config.max_ticks)
            .with_context(|| format!("benchmark run failed for bot={bot_id} seed={seed:#x}"))?;
        let objective_value = config.objective.run_value(&artifact.metrics);
        Ok(InternalRun {
            metrics: artifact.metrics,
            objective_value,
            tape: artifact.tape,
        })
    };

    let run_results: Vec<Result<InternalRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let mut grouped: HashMap<String, Vec<&InternalRun>> = HashMap::new();
    for run in &runs {
        grouped
            .entry(run.metrics.bot_id.clone())
            .or_default()
            .push(run);
    }

    let mut rankings: Vec<BotAggregate> = grouped
        .into_iter()
        .map(|(bot_id, bot_runs)| aggregate(bot_id, &bot_runs, config.max_ticks))
        .collect();

    rankings.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.avg_distance.total_cmp(&a.avg_distance))
            .then_with(|| b.avg_frames.total_cmp(&a.avg_frames))
            .then_with(|| a.bot_id.cmp(&b.bot_id))
    });

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|run| RunRecord {
            bot_id: run.metrics.bot_id.clone(),
            bot_fingerprint: run.metrics.bot_fingerprint.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            frame_count: run.metrics.frame_count,
            final_distance: run.metrics.final_distance,
            final_level: run.metrics.final_level,
            final_fuel: run.metrics.final_fuel,
            game_over: run.metrics.game_over,
            falls: run.metrics.falls,
            hazards_hit: run.metrics.hazards_hit,
            fuel_collected: run.metrics.fuel_collected,
            objective_value: run.objective_value,
            action_frames: run.metrics.action_frames,
            steer_frames: run.metrics.steer_frames,
            throttle_frames: run.metrics.throttle_frames,
            brake_frames: run.metrics.brake_frames,
        })
        .collect();

    run_records.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.final_distance.total_cmp(&a.final_distance))
            .then_with(|| b.frame_count.cmp(&a.frame_count))
    });

    let mut saved_tapes = Vec::new();
    if config.save_top > 0 {
        save_top_tapes(
            &config.out_dir,
            &runs,
            "objective",
            config.save_top,
            |run| run.objective_value,
            &mut saved_tapes,
        )?;
        save_top_tapes(
            &config.out_dir,
            &runs,
            "distance",
            config.save_top,
            |run| run.metrics.final_distance as f64,
            &mut saved_tapes,
        )?;
        save_top_tapes(
            &config.out_dir,
            &runs,
            "survival",
            config.save_top,
            |run| run.metrics.frame_count as f64,
            &mut saved_tapes,
        )?;
    }

    write_runs_csv(&config.out_dir.join("runs.csv"), &run_records)?;
    write_rankings_csv(&config.out_dir.join("rankings.csv"), &rankings)?;

    if let Some(best) = rankings.first() {
        info!(
            bot = %best.bot_id,
            objective_value = best.objective_value,
            avg_distance = best.avg_distance,
            runs = run_records.len(),
            "benchmark finished"
        );
    }

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        objective: config.objective,
        max_ticks: config.max_ticks,
        jobs: config.jobs,
        config: config.sim,
        bots: config.bots,
        seeds: config.seeds,
        run_count: run_records.len(),
        bot_rankings: rankings,
        runs: run_records,
        saved_tapes,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn save_top_tapes<F>(
    out_dir: &Path,
    runs: &[InternalRun],
    metric_name: &str,
    count: usize,
    metric: F,
    saved_tapes: &mut Vec<SavedTapeRecord>,
) -> Result<()>
where
    F: Fn(&InternalRun) -> f64,
{
    let mut order: Vec<&InternalRun> = runs.iter().collect();
    order.sort_by(|a, b| {
        metric(b)
            .total_cmp(&metric(a))
            .then_with(|| b.metrics.final_distance.total_cmp(&a.metrics.final_distance))
            .then_with(|| b.metrics.frame_count.cmp(&a.metrics.frame_count))
    });

    let save_dir = out_dir.join(format!("top-{metric_name}"));
    fs::create_dir_all(&save_dir)
        .with_context(|| format!("failed creating {}", save_dir.display()))?;

    for (idx, run) in order.into_iter().take(count).enumerate() {
        let rank = idx + 1;
        let safe_bot = run.metrics.bot_id.replace('_', "-");
        let base = format!(
            "rank{rank:02}-{safe_bot}-seed{:08x}-dist{:.0}-frames{}",
            run.metrics.seed, run.metrics.final_distance, run.metrics.frame_count
        );
        let tape_path = save_dir.join(format!("{base}.tape"));
        fs::write(&tape_path, &run.tape)
            .with_context(|| format!("failed writing {}", tape_path.display()))?;

        let meta = serde_json::json!({
            "rank": rank,
            "metric": metric_name,
            "objective_value": run.objective_value,
            "seed_hex": seed_to_hex(run.metrics.seed),
            "run": run.metrics,
        });
        let meta_path = save_dir.join(format!("{base}.json"));
        fs::write(
            &meta_path,
            serde_json::to_vec_pretty(&meta).context("failed to serialize top tape metadata")?,
        )
        .with_context(|| format!("failed writing {}", meta_path.display()))?;

        saved_tapes.push(SavedTapeRecord {
            rank,
            metric: metric_name.to_string(),
            bot_id: run.metrics.bot_id.clone(),
            bot_fingerprint: run.metrics.bot_fingerprint.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            distance: run.metrics.final_distance,
            level: run.metrics.final_level,
            frames: run.metrics.frame_count,
            path: tape_path.to_string_lossy().into_owned(),
        });
    }

    Ok(())
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "bot_id,bot_fingerprint,seed_hex,seed,frame_count,final_distance,final_level,final_fuel,game_over,falls,hazards_hit,fuel_collected,objective_value,action_frames,steer_frames,throttle_frames,brake_frames\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{:.3},{},{:.4},{},{},{},{},{},{},{},{},{}\n",
            row.bot_id,
            row.bot_fingerprint,
            row.seed_hex,
            row.seed,
            row.frame_count,
            row.final_distance,
            row.final_level,
            row.final_fuel,
            row.game_over,
            row.falls,
            row.hazards_hit,
            row.fuel_collected,
            row.objective_value,
            row.action_frames,
            row.steer_frames,
            row.throttle_frames,
            row.brake_frames
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_rankings_csv(path: &Path, rows: &[BotAggregate]) -> Result<()> {
    let mut csv = String::from(
        "rank,bot_id,bot_fingerprint,runs,avg_distance,max_distance,avg_frames,max_frames,avg_level,max_level,avg_falls,avg_hazards,avg_fuel_collected,survival_rate,objective_value,avg_steer_frames,avg_throttle_frames,avg_brake_frames\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{},{:.2},{:.2},{:.2},{},{:.2},{},{:.2},{:.2},{:.2},{:.4},{:.4},{:.2},{:.2},{:.2}\n",
            idx + 1,
            row.bot_id,
            row.bot_fingerprint,
            row.runs,
            row.avg_distance,
            row.max_distance,
            row.avg_frames,
            row.max_frames,
            row.avg_level,
            row.max_level,
            row.avg_falls,
            row.avg_hazards,
            row.avg_fuel_collected,
            row.survival_rate,
            row.objective_value,
            row.avg_steer_frames,
            row.avg_throttle_frames,
            row.avg_brake_frames
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(distance: f32, frames: u32, game_over: bool) -> RunMetrics {
        RunMetrics {
            bot_id: "centerline".to_string(),
            bot_fingerprint: "crc32:0:len:0".to_string(),
            seed: 7,
            max_ticks: 600,
            frame_count: frames,
            final_distance: distance,
            final_level: 1,
            final_fuel: 0.5,
            game_over,
            fuel_collected: 0,
            hazards_hit: 0,
            falls: 0,
            respawns: 0,
            tape_checksum: 0,
            action_frames: 0,
            steer_frames: 0,
            throttle_frames: 0,
            brake_frames: 0,
        }
    }

    #[test]
    fn distance_objective_prefers_progress() {
        let near = metrics(100.0, 600, false);
        let far = metrics(400.0, 600, false);
        assert!(Objective::Distance.run_value(&far) > Objective::Distance.run_value(&near));
        assert!(Objective::Hybrid.run_value(&far) > Objective::Hybrid.run_value(&near));
    }

    #[test]
    fn survival_objective_rewards_finishing_alive() {
        let alive = metrics(100.0, 600, false);
        let dead = metrics(100.0, 600, true);
        assert!(Objective::Survival.run_value(&alive) > Objective::Survival.run_value(&dead));
    }

    #[test]
    fn resolve_bots_defaults_to_roster_and_splits_lists() {
        assert_eq!(resolve_bots(None).unwrap(), bot_ids());
        assert_eq!(
            resolve_bots(Some(" idle, ,cruise ")).unwrap(),
            vec!["idle".to_string(), "cruise".to_string()]
        );
        assert!(resolve_bots(Some(" , ")).is_err());
    }
}
