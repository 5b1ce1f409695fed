use clap::{Parser, Subcommand};
use judgeloop::{Gender, GoalDirection};
use std::path::PathBuf;

/// `judgeloop` - let a panel of AI judges critique a photo, round after round.
#[derive(Parser, Debug)]
#[command(name = "judgeloop")]
#[command(version)]
#[command(about = "Round-based photo critique by a panel of AI judge personas.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.judgeloop/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the judge catalog
    Personas {
        /// Only judges of this gender (male, female)
        #[arg(long)]
        gender: Option<Gender>,
    },

    /// Evaluate an image, improve it and repeat
    Run {
        /// Image to start from
        #[arg(long)]
        image: PathBuf,

        /// Judge id to put on the panel (repeatable; default: configured selection)
        #[arg(long = "judge")]
        judges: Vec<String>,

        /// maximize (more right swipes) or minimize (more left swipes)
        #[arg(long)]
        goal: Option<GoalDirection>,

        /// Candidates to generate per round (1-4)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        count: Option<u8>,

        /// Number of rounds to run
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        rounds: u32,

        /// Candidate index that seeds the next round
        #[arg(long, default_value_t = 0)]
        pick: usize,
    },
}
