use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use judgeloop::generate::CandidateImage;
use judgeloop::media::elide_reference;
use judgeloop::{Config, Delivery, Gender, GoalDirection, ImageData, Session};
use std::path::PathBuf;
use tracing::info;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };

    match cli.command {
        Commands::Personas { gender } => list_personas(&config, gender),
        Commands::Run {
            image,
            judges,
            goal,
            count,
            rounds,
            pick,
        } => {
            let options = RunOptions {
                image,
                judges,
                goal,
                count,
                rounds,
                pick,
            };
            run(&config, options).await
        }
    }
}

fn list_personas(config: &Config, gender: Option<Gender>) -> Result<()> {
    let session = Session::from_config(config)?;
    let selected: Vec<String> = session.selected_judges().into_iter().map(|p| p.id).collect();
    for persona in session
        .personas()
        .into_iter()
        .filter(|p| gender.is_none_or(|g| p.gender == g))
    {
        let marker = if selected.contains(&persona.id) { "*" } else { " " };
        println!(
            "{marker} {:<18} {:<7} {:<8} {}",
            persona.id, persona.gender, persona.name, persona.bio
        );
    }
    Ok(())
}

struct RunOptions {
    image: PathBuf,
    judges: Vec<String>,
    goal: Option<GoalDirection>,
    count: Option<u8>,
    rounds: u32,
    pick: usize,
}

async fn run(config: &Config, options: RunOptions) -> Result<()> {
    let session = Session::from_config(config)?;
    if !options.judges.is_empty() {
        for persona in session.selected_judges() {
            session.deselect_judge(&persona.id);
        }
        for id in &options.judges {
            session.select_judge(id)?;
        }
    }

    let image = ImageData::load(&options.image)
        .await
        .with_context(|| format!("loading {}", options.image.display()))?;
    session.upload_image(image);

    let panel: Vec<String> = session.selected_judges().into_iter().map(|p| p.name).collect();
    info!(judges = %panel.join(", "), rounds = options.rounds, "starting");

    for _ in 0..options.rounds {
        let round = session.current_round().number();
        println!("── Round {round} ──");

        let stats = applied(session.evaluate().await?)?;
        match stats.approval_percent() {
            Some(percent) => println!(
                "Right swipes: {}/{} ({percent}%)",
                stats.yes_count, stats.total_count
            ),
            None => println!("Right swipes: 0/0"),
        }
        for verdict in session.current_round().verdicts() {
            let swipe = if verdict.swipe_right { "right" } else { "left" };
            println!("  [{swipe:>5}] {}: {}", verdict.persona_id, first_line(&verdict.verdict_text));
        }
        if stats.total_count == 0 {
            println!("No judge answered; stopping.");
            break;
        }

        let suggestion = applied(session.combine(options.goal).await?)?;
        if let Some(analysis) = &suggestion.analysis {
            println!("Analysis: {analysis}");
        }
        println!("Directive: {}", suggestion.directive);

        let candidates = applied(session.generate(options.count).await?)?;
        print_candidates(&candidates);

        let next = applied(session.select_candidate(options.pick).await?)?;
        info!(picked = options.pick, next, "candidate selected");
    }

    let summary = serde_json::to_string_pretty(&session.snapshot().summaries())?;
    println!("{summary}");
    Ok(())
}

fn applied<T>(delivery: Delivery<T>) -> Result<T> {
    match delivery {
        Delivery::Applied(value) => Ok(value),
        Delivery::Stale => bail!("round changed while a request was running"),
    }
}

fn print_candidates(candidates: &[CandidateImage]) {
    for (index, candidate) in candidates.iter().enumerate() {
        println!("  #{index}: {}", elide_reference(&candidate.url));
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
