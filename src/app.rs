//! Command-line driver: plays a line of moves and reports the affect after
//! every ply, then the final evaluation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use schemars::JsonSchema;
use serde::Serialize;

use emotional_chess::config::Config;
use emotional_chess::domain::{EmotionImpact, EmotionSummary, Evaluation, emfen};
use emotional_chess::models::EmotionalGame;

/// Opening played when no moves are given
const DEMO_LINE: [&str; 6] = ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"];

#[derive(Parser, Debug)]
#[command(name = "emotional-chess", version, about = "Play emotional chess moves and inspect affect")]
pub struct Args {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start from this emFEN instead of the initial position
    #[arg(long)]
    pub emfen: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the JSON schema of the report and exit
    #[arg(long)]
    pub schema: bool,

    /// Moves in UCI (e2e4) or SAN (Nf3)
    pub moves: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct PlyReport {
    move_number: u32,
    black: bool,
    san: String,
    uci: String,
    summary: EmotionSummary,
    events: Vec<String>,
    emfen: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct Report {
    start: String,
    plies: Vec<PlyReport>,
    emfen: String,
    status: String,
    evaluation: Evaluation,
    impact: EmotionImpact,
}

pub fn run(args: &Args, config: &Config) -> Result<()> {
    if args.schema {
        let schema = schemars::schema_for!(Report);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let mut game = match &args.emfen {
        Some(text) => EmotionalGame::from_emfen(text, config.weights)
            .with_context(|| format!("Failed to load emFEN '{text}'"))?,
        None => EmotionalGame::with_weights(config.weights),
    };

    let moves: Vec<&str> = if args.moves.is_empty() && args.emfen.is_none() {
        DEMO_LINE.to_vec()
    } else {
        args.moves.iter().map(String::as_str).collect()
    };

    let start = game.to_emfen();
    for text in moves {
        game.play(text)
            .with_context(|| format!("Failed to play '{text}'"))?;
    }

    let report = build_report(&game, start);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn build_report(game: &EmotionalGame, start: String) -> Report {
    let plies = game
        .history()
        .into_iter()
        .map(|display| PlyReport {
            move_number: display.move_num,
            black: display.is_black,
            emfen: game
                .tree()
                .get(display.node_id)
                .map(|node| emfen::encode(&node.position))
                .unwrap_or_default(),
            san: display.san,
            uci: display.uci,
            summary: display.summary,
            events: display.events,
        })
        .collect();

    Report {
        start,
        plies,
        emfen: game.to_emfen(),
        status: game.status().to_string(),
        evaluation: game.evaluation(),
        impact: game.emotion_impact(),
    }
}

fn print_report(report: &Report) {
    println!("start: {}", report.start);
    for ply in &report.plies {
        let dots = if ply.black { "..." } else { "." };
        println!(
            "{}{} {:<8} love {} angry {} sad {}",
            ply.move_number,
            dots,
            ply.san,
            ply.summary.love_pairs,
            ply.summary.angry,
            ply.summary.sad
        );
        for event in &ply.events {
            println!("    {event}");
        }
        println!("    {}", ply.emfen);
    }

    let eval = &report.evaluation;
    println!();
    println!("status:     {}", report.status);
    println!("emFEN:      {}", report.emfen);
    println!(
        "evaluation: {} (material {}, love {:+}, anger {:+}, sadness {:+})",
        eval.total,
        eval.material,
        eval.love_bonus,
        eval.anger_bonus,
        -eval.sad_penalty
    );
    for (side, impact) in [("white", &report.impact.white), ("black", &report.impact.black)] {
        println!(
            "{side}: love {} anger {} sad {}",
            impact.love, impact.anger, impact.sad
        );
    }
}
