use clap::Parser;
use packman_arcade_core::autopilot::Autopilot;
use packman_arcade_core::constants::{MAX_LIVES, STEP_MS};
use packman_arcade_core::engine::GameSession;
use packman_arcade_core::io::NullAudio;
use packman_arcade_core::maze::Maze;
use packman_arcade_core::motion::position_clear;
use packman_arcade_core::settings_store::{CabinetSettings, SettingsStore};
use packman_arcade_core::types::{Difficulty, GamePhase, GhostMode, RuntimeEvent, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_TICKS: u64 = 36_000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    ticks: Option<u64>,
    /// baseline | rush | frightened-feast | starvation (repeatable)
    #[arg(long)]
    scenario: Vec<String>,
    #[arg(long)]
    settings_file: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Debug)]
struct Scenario {
    name: String,
    settings: CabinetSettings,
    ticks: u64,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    difficulty: Difficulty,
    ticks: u64,
    outcome: GamePhase,
    #[serde(rename = "finalScore")]
    final_score: i32,
    #[serde(rename = "highScore")]
    high_score: i32,
    level: u32,
    #[serde(rename = "livesLeft")]
    lives_left: i32,
    #[serde(rename = "dotsEaten")]
    dots_eaten: i32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: i32,
    #[serde(rename = "fruitsEaten")]
    fruits_eaten: i32,
    deaths: i32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: i32,
    #[serde(rename = "killScreens")]
    kill_screens: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    #[serde(rename = "finishedTick")]
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "bestScore")]
    best_score: i32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let base_settings = cli
        .settings_file
        .as_ref()
        .map(|path| SettingsStore::new(path.clone()).settings())
        .unwrap_or_default();

    let run_started_at_ms = now_ms();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let run_id = default_run_id(seed, run_started_at_ms);
    let quiet = cli.quiet;

    let scenarios = match resolve_scenarios(&cli, base_settings, seed) {
        Ok(scenarios) => scenarios,
        Err(unknown) => {
            emit_log(
                false,
                "error",
                "unknown_scenario",
                &run_id,
                None,
                None,
                None,
                json!({ "scenario": unknown }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            quiet,
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "difficulty": scenario.settings.difficulty,
                "ticksBudget": scenario.ticks,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                quiet,
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(scenario_run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            quiet,
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "outcome": scenario_run.result.outcome,
                "finalScore": scenario_run.result.final_score,
                "level": scenario_run.result.level,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        outcome_counts,
        total_anomalies,
    );

    match cli.summary_out.as_ref() {
        Some(path) => {
            if let Err(error) = write_summary(path, &summary) {
                emit_log(
                    false,
                    "error",
                    "summary_write_failed",
                    &run_id,
                    None,
                    None,
                    None,
                    json!({
                        "path": path.to_string_lossy(),
                        "error": error.to_string(),
                    }),
                );
                std::process::exit(2);
            }
        }
        None => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).expect("run summary should serialize")
            );
        }
    }

    emit_log(
        quiet,
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "bestScore": summary.best_score,
            "outcomeCounts": summary.outcome_counts,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let fright_cap_ms = scenario.settings.sanitized().fright_ms;
    let mut session = GameSession::new(scenario.settings, 0, scenario.seed);
    let mut pilot = Autopilot::new(scenario.seed.wrapping_mul(2_654_435_761).wrapping_add(1));
    let mut audio = NullAudio;
    session.start_game(&mut audio);

    let mut levels_cleared = 0;
    let mut kill_screens = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut prev_score = 0;
    let mut prev_level = session.level();
    let mut prev_remaining = session.maze().remaining_dots();
    let mut last_tick = 0u64;

    while session.phase() != GamePhase::GameOver && session.tick() < scenario.ticks {
        let snapshot = session.build_snapshot(true);
        last_tick = snapshot.tick;
        pilot.observe(&snapshot, session.maze());

        for message in collect_snapshot_anomalies(&snapshot, session.maze(), fright_cap_ms) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        if snapshot.score < prev_score {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                format!("score decreased: {} -> {}", prev_score, snapshot.score),
            );
        }
        if snapshot.level == prev_level && snapshot.remaining_dots > prev_remaining {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                format!(
                    "remaining dots grew within a level: {} -> {}",
                    prev_remaining, snapshot.remaining_dots
                ),
            );
        }
        prev_score = snapshot.score;
        prev_level = snapshot.level;
        prev_remaining = snapshot.remaining_dots;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::LevelCleared { .. } => levels_cleared += 1,
                RuntimeEvent::KillScreen { .. } => kill_screens += 1,
                _ => {}
            }
        }

        session.advance(STEP_MS, &mut pilot, &mut audio);
    }

    // Events produced by the final steps have not been drained yet.
    let final_snapshot = session.build_snapshot(true);
    for event in &final_snapshot.events {
        match event {
            RuntimeEvent::LevelCleared { .. } => levels_cleared += 1,
            RuntimeEvent::KillScreen { .. } => kill_screens += 1,
            _ => {}
        }
    }

    let summary = session.build_summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            difficulty: scenario.settings.difficulty,
            ticks: summary.ticks,
            outcome: summary.phase,
            final_score: summary.final_score,
            high_score: summary.high_score,
            level: summary.level,
            lives_left: session.lives(),
            dots_eaten: summary.dots_eaten,
            ghosts_eaten: summary.ghosts_eaten,
            fruits_eaten: summary.fruits_eaten,
            deaths: summary.deaths,
            levels_cleared,
            kill_screens,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, maze: &Maze, fright_cap_ms: f32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.lives < 0 || snapshot.lives > MAX_LIVES {
        anomalies.push(format!("lives out of range: {}", snapshot.lives));
    }
    if snapshot.remaining_dots < 0 || snapshot.remaining_dots > maze.total_dots() {
        anomalies.push(format!(
            "remaining dots out of range: {}/{}",
            snapshot.remaining_dots,
            maze.total_dots()
        ));
    }
    if snapshot.fright_ms_left > fright_cap_ms + STEP_MS {
        anomalies.push(format!(
            "fright window exceeds configured duration: {}",
            snapshot.fright_ms_left
        ));
    }
    for ghost in &snapshot.ghosts {
        let should_be_vulnerable =
            matches!(ghost.mode, GhostMode::Frightened | GhostMode::Blinking);
        if ghost.vulnerable != should_be_vulnerable {
            anomalies.push(format!(
                "vulnerable flag inconsistent with mode for {:?}",
                ghost.kind
            ));
        }
    }
    if snapshot.phase == GamePhase::Playing {
        if !position_clear(maze, snapshot.player.x, snapshot.player.y, false) {
            anomalies.push(format!(
                "player out of bounds at ({}, {})",
                snapshot.player.x, snapshot.player.y
            ));
        }
        for ghost in &snapshot.ghosts {
            if !position_clear(maze, ghost.x, ghost.y, true) {
                anomalies.push(format!(
                    "ghost {:?} out of bounds at ({}, {})",
                    ghost.kind, ghost.x, ghost.y
                ));
            }
        }
    }
    anomalies
}

fn scenario_settings(name: &str, base: CabinetSettings) -> Option<CabinetSettings> {
    match name {
        "baseline" => Some(base),
        "rush" => Some(CabinetSettings {
            difficulty: Difficulty::Hard,
            ghost_speed_mult: 1.2,
            ..base
        }),
        "frightened-feast" => Some(CabinetSettings {
            difficulty: Difficulty::Easy,
            fright_ms: 8_000.0,
            ..base
        }),
        "starvation" => Some(CabinetSettings {
            lives: 1,
            difficulty: Difficulty::Hard,
            ghost_speed_mult: 1.2,
            player_speed_mult: 0.8,
            ..base
        }),
        _ => None,
    }
}

fn resolve_scenarios(
    cli: &Cli,
    base: CabinetSettings,
    seed: u32,
) -> Result<Vec<Scenario>, String> {
    let ticks = cli.ticks.unwrap_or(DEFAULT_TICKS).max(1);
    let names: Vec<String> = if cli.scenario.is_empty() {
        vec!["baseline".to_string(), "rush".to_string()]
    } else {
        cli.scenario.clone()
    };

    let mut scenarios = Vec::with_capacity(names.len());
    for (idx, name) in names.iter().enumerate() {
        let settings = scenario_settings(name, base).ok_or_else(|| name.clone())?;
        scenarios.push(Scenario {
            name: name.clone(),
            settings,
            ticks,
            seed: seed.wrapping_add(idx as u32),
        });
    }
    Ok(scenarios)
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let best_score = scenarios
        .iter()
        .map(|scenario| scenario.final_score)
        .max()
        .unwrap_or(0);
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count: scenarios.len(),
        anomaly_count,
        best_score,
        outcome_counts,
        scenarios,
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_log(
    quiet: bool,
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    if quiet && level == "info" {
        return;
    }
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn outcome_key(phase: GamePhase) -> String {
    match phase {
        GamePhase::GameOver => "game_over",
        GamePhase::Playing => "still_playing",
        GamePhase::TitleScreen => "title_screen",
        GamePhase::Starting => "starting",
        GamePhase::Paused => "paused",
        GamePhase::Dying => "dying",
        GamePhase::LevelComplete => "level_complete",
        GamePhase::Cutscene => "cutscene",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
