use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use secret_santa::{run, ConfigError, Mailer, SantaConfig, SantaError, SmtpMailer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "secret-santa")]
#[command(version, about = "Assign Secret Santa pairs and email each buyer their recipient")]
struct Cli {
    /// TOML configuration file with [participants], [email] and [general] tables
    config: Option<PathBuf>,

    /// Number of runs; more than one gathers draw statistics and never sends email
    #[arg(long)]
    runs: Option<usize>,

    /// RNG seed for a reproducible draw
    #[arg(long)]
    seed: Option<u64>,

    /// Print every pairing and debug logs
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    let started = Instant::now();
    let cli = Cli::parse();
    if let Err(error) = try_main(cli, started) {
        println!("{error}");
        std::process::exit(1);
    }
}

fn try_main(cli: Cli, started: Instant) -> Result<(), SantaError> {
    let path = cli.config.ok_or(ConfigError::MissingPath)?;
    let mut config = SantaConfig::load(&path)?;
    if let Some(runs) = cli.runs {
        config.general.runs = runs;
    }
    if let Some(seed) = cli.seed {
        config.general.seed = Some(seed);
    }
    if cli.debug {
        config.general.debug = true;
    }
    config.validate()?;

    init_tracing(config.general.debug);
    info!(
        path = %path.display(),
        participants = config.participants.len(),
        "configuration loaded"
    );

    let mut rng = match config.general.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut mailer = if config.sending_enabled() {
        Some(SmtpMailer::new(&config.email)?)
    } else {
        None
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(
        &config,
        &mut rng,
        mailer.as_mut().map(|mailer| mailer as &mut dyn Mailer),
        started,
        &mut out,
    )?;
    Ok(())
}

fn default_filter(debug: bool) -> &'static str {
    if debug {
        "warn,secret_santa=debug"
    } else {
        "warn,secret_santa=info"
    }
}

fn init_tracing(debug: bool) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(debug))),
        )
        .init();
}
