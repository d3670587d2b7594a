use anyhow::{Context, Result, bail};
use clap::Parser;
use redstone_calc::calculator::{Key, RandomPerturbation, is_token_input};
use redstone_calc::config::Config;
use redstone_calc::frontend::Frontend;
use redstone_calc::pipeline::Outcome;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "redstone-calc", version, about = "Redstone computer keypad calculator")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/redstone-calc/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Evaluate one expression and exit
    #[arg(long)]
    expr: Option<String>,

    /// Skip the simulated processing delays
    #[arg(long)]
    instant: bool,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        },
    };
    Ok(if cli.instant { config.instant() } else { config })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).context("failed to load configuration")?;
    let perturbation = Box::new(RandomPerturbation::new(
        config.perturbation_min,
        config.perturbation_max,
    ));
    let mut frontend = Frontend::new(config, perturbation, io::stdout());

    match cli.expr {
        Some(expr) => {
            if !is_token_input(&expr) {
                bail!("expression may only contain digits and + - * /");
            }
            for c in expr.chars().filter(|c| !c.is_whitespace()) {
                frontend.press(Key::Char(c)).await?;
            }
            match frontend.press(Key::Enter).await? {
                Some(Outcome::Completed(_)) => Ok(()),
                Some(other) => bail!(other.warning().unwrap_or_default()),
                None => bail!("nothing to evaluate"),
            }
        }
        None => frontend.run(io::stdin().lock()).await,
    }
}
