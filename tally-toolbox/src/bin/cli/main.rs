mod denom;
mod position;
mod tally;

use chain_types::ChainConfig;
use color_eyre::Report;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tally_toolbox::memory::MemApp;
use tally_toolbox::state::ChainState;
use tracing_subscriber::EnvFilter;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Cli {
    /// Tally the votes of a proposal in a state snapshot
    Tally(tally::Tally),
    /// Show the liquid staking position of an address
    Position(position::Position),
    /// Format and parse derivative denominations
    Denom(denom::Denom),
}

impl Cli {
    pub fn exec(self) -> Result<(), Report> {
        match self {
            Self::Tally(cmd) => cmd.exec(),
            Self::Position(cmd) => cmd.exec(),
            Self::Denom(cmd) => cmd.exec(),
        }
    }
}

/// Chain parameters and the snapshot to run against.
#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Common {
    /// Path to a json encoded `ChainState`
    #[structopt(long)]
    pub state: PathBuf,

    #[structopt(flatten)]
    pub config: ConfigArg,
}

impl Common {
    pub fn load(&self) -> Result<(ChainConfig, MemApp), Report> {
        let config = self.config.load()?;
        let app = ChainState::from_file(&self.state)?.load(config.clone())?;
        Ok((config, app))
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct ConfigArg {
    /// Path to a json encoded `ChainConfig`, defaults to the kava mainnet values
    #[structopt(long)]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub fn load(&self) -> Result<ChainConfig, Report> {
        match &self.config {
            Some(path) => load_json(path),
            None => Ok(ChainConfig::default()),
        }
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Report> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Report> {
    serde_json::to_writer_pretty(std::io::stdout(), value)?;
    println!();
    Ok(())
}

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    Cli::from_args().exec()
}
