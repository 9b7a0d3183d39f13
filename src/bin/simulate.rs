use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_escape::constants::{TICK_RATE, TICK_SECONDS};
use maze_escape::engine::{GameSession, GameSessionOptions};
use maze_escape::input::{parse_input_command, InputCommand, InputState};
use maze_escape::maze::{render_ascii, MazeConfig};
use maze_escape::types::{Difficulty, SessionSummary, Vec2};
use serde::Serialize;
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    cell_size: Option<f32>,
    #[arg(long)]
    seed: Option<u64>,
    /// JSON-lines input script (keydown/keyup/wait/retry).
    #[arg(long)]
    script: Option<PathBuf>,
    #[arg(long)]
    print_maze: bool,
    #[arg(long)]
    maze_json: bool,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    #[serde(rename = "runId")]
    run_id: String,
    difficulty: Option<Difficulty>,
    #[serde(flatten)]
    summary: SessionSummary,
    #[serde(rename = "finalPosition")]
    final_position: Vec2,
    #[serde(rename = "finalRotation")]
    final_rotation: f32,
    commands: usize,
    #[serde(rename = "invalidCommands")]
    invalid_commands: usize,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "generatedAt")]
    generated_at: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    result: RunResultLine,
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
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ScriptStats {
    commands: usize,
    invalid: usize,
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let seed = resolve_seed(cli.seed, std::env::var("MAZE_SEED").ok());
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, run_started_at_ms));

    let difficulty_name = cli
        .difficulty
        .clone()
        .or_else(|| std::env::var("MAZE_DIFFICULTY").ok());
    let (difficulty, config) = match resolve_maze_config(&cli, difficulty_name.as_deref()) {
        Ok(resolved) => resolved,
        Err(message) => {
            emit_log(
                "error",
                "invalid_config",
                &run_id,
                Some(seed),
                None,
                json!({ "error": message }),
            );
            std::process::exit(1);
        }
    };

    let mut session = GameSession::new(&config, seed, GameSessionOptions::default());
    emit_session_events(&mut session, &run_id);

    if cli.print_maze {
        print!("{}", render_ascii(session.maze(), Some(session.player().position)));
    }
    if cli.maze_json {
        println!(
            "{}",
            serde_json::to_string(session.maze()).expect("maze should serialize")
        );
    }

    let mut stats = ScriptStats::default();
    if let Some(path) = cli.script.as_ref() {
        let script = match std::fs::read_to_string(path) {
            Ok(script) => script,
            Err(error) => {
                emit_log(
                    "error",
                    "script_read_failed",
                    &run_id,
                    Some(seed),
                    None,
                    json!({
                        "path": path.to_string_lossy(),
                        "error": error.to_string(),
                    }),
                );
                std::process::exit(2);
            }
        };
        stats = run_script(&mut session, &script, &run_id);
    }

    let player = *session.player();
    let result = RunResultLine {
        run_id: run_id.clone(),
        difficulty,
        summary: session.build_summary(),
        final_position: player.position,
        final_rotation: player.rotation,
        commands: stats.commands,
        invalid_commands: stats.invalid,
    };
    println!(
        "{}",
        serde_json::to_string(&result).expect("run result should serialize")
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        let summary = RunSummary {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            started_at_ms: run_started_at_ms,
            finished_at_ms: now_ms(),
            result: result.clone(),
        };
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                Some(seed),
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        Some(seed),
        Some(result.summary.ticks),
        json!({
            "won": result.summary.won,
            "wonAtMs": result.summary.won_at_ms,
            "elapsedMs": result.summary.elapsed_ms,
            "retries": result.summary.retries,
            "invalidCommands": stats.invalid,
            "summaryOut": summary_out_written,
        }),
    );
}

/// Replays a JSON-lines script against the session. Blank lines and lines
/// starting with `#` are skipped; unparseable lines are logged and skipped.
fn run_script(session: &mut GameSession, script: &str, run_id: &str) -> ScriptStats {
    let mut input = InputState::new();
    let mut stats = ScriptStats::default();

    for (line_no, raw) in script.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(command) = parse_input_command(line) else {
            stats.invalid += 1;
            emit_log(
                "warn",
                "invalid_command",
                run_id,
                Some(session.seed()),
                Some(session.tick_count()),
                json!({ "line": line_no + 1, "raw": line }),
            );
            continue;
        };
        stats.commands += 1;

        match command {
            InputCommand::KeyDown(action) => input.press(action),
            InputCommand::KeyUp(action) => input.release(action),
            InputCommand::Retry => {
                session.retry();
                emit_session_events(session, run_id);
            }
            InputCommand::Wait { seconds } => advance(session, &input, seconds, run_id),
        }
    }
    stats
}

/// Waits are rounded to whole fixed-rate frames.
fn advance(session: &mut GameSession, input: &InputState, seconds: f32, run_id: &str) {
    let frames = (seconds * TICK_RATE as f32).round() as u64;
    let intent = input.intent();
    for _ in 0..frames {
        session.step(&intent, TICK_SECONDS);
        emit_session_events(session, run_id);
    }
}

fn emit_session_events(session: &mut GameSession, run_id: &str) {
    let seed = session.seed();
    let snapshot = session.build_snapshot(true);
    for event in &snapshot.events {
        let mut details = serde_json::to_value(event).unwrap_or(Value::Null);
        let name = details
            .as_object_mut()
            .and_then(|object| object.remove("type"))
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "session_event".to_string());
        emit_log("info", &name, run_id, Some(seed), Some(snapshot.tick), details);
    }
}

fn resolve_seed(cli_seed: Option<u64>, env_seed: Option<String>) -> u32 {
    cli_seed
        .or_else(|| env_seed.and_then(|raw| raw.trim().parse::<u64>().ok()))
        .map(normalize_seed)
        .unwrap_or_else(rand::random::<u32>)
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

/// Starts from the difficulty preset and applies explicit size overrides.
fn resolve_maze_config(
    cli: &Cli,
    difficulty_name: Option<&str>,
) -> Result<(Option<Difficulty>, MazeConfig), String> {
    let difficulty = match difficulty_name {
        None => None,
        Some(name) => Some(
            Difficulty::parse(name).ok_or_else(|| format!("unknown difficulty: {name}"))?,
        ),
    };
    let preset = MazeConfig::from_difficulty(difficulty.unwrap_or(Difficulty::Easy));
    let config = MazeConfig::new(
        cli.width.unwrap_or(preset.width()),
        cli.height.unwrap_or(preset.height()),
        cli.cell_size.unwrap_or(preset.cell_size()),
    )
    .map_err(|error| error.to_string())?;
    Ok((difficulty, config))
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("maze-{seed}-{timestamp_ms}")
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
