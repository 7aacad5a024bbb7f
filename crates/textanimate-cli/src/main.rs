use std::fs::OpenOptions;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use textanimate_core::{AnimationRequest, AppConfig, Repeat};

mod commands;

#[derive(Parser)]
#[command(name = "textanimate")]
#[command(author, version, about = "Character-by-character text animations in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an animation in the terminal
    Play(AnimationArgs),
    /// Run an animation headless and print JSON snapshots
    Trace {
        #[command(flatten)]
        animation: AnimationArgs,
        /// Total virtual time to run, in milliseconds
        #[arg(long = "for", default_value_t = 2000)]
        run_for: u64,
        /// Time between snapshots, in milliseconds
        #[arg(long, default_value_t = 100)]
        step: u64,
        /// Send the trigger's activation signal at this time
        #[arg(long)]
        activate_at: Option<u64>,
        /// Pace snapshots with the wall clock
        #[arg(long)]
        realtime: bool,
    },
    /// Show configuration
    Config {
        /// Print the config file location instead of its contents
        #[arg(long)]
        path: bool,
        /// Write the current configuration to the config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Animation options shared by `play` and `trace`
#[derive(Args, Debug, Clone)]
pub struct AnimationArgs {
    /// Text to animate
    text: String,
    /// Animation type (typewriter, fadeIn, slideUp, wave, glitch, blur, scramble, particle, morph)
    #[arg(short, long)]
    kind: Option<String>,
    /// When to start: auto, hover, click, view or manual
    #[arg(short, long)]
    trigger: Option<String>,
    #[arg(long)]
    easing: Option<String>,
    /// Duration in milliseconds
    #[arg(short, long)]
    duration: Option<u64>,
    /// Delay before starting, in milliseconds
    #[arg(long)]
    delay: Option<u64>,
    /// Per-character stagger, in milliseconds
    #[arg(long)]
    stagger: Option<u64>,
    /// off, forever or a number of repetitions
    #[arg(long)]
    repeat: Option<Repeat>,
    /// Type from the end of the text
    #[arg(long)]
    reverse: bool,
    /// Comma separated texts to morph between
    #[arg(long, value_delimiter = ',')]
    morph: Vec<String>,
    /// Seed for reproducible randomness
    #[arg(long)]
    seed: Option<u64>,
    /// Let a view-triggered animation run again each time it re-enters the viewport
    #[arg(long)]
    retrigger: bool,
}

impl AnimationArgs {
    /// Build a request from the configured defaults overridden by flags
    pub fn to_request(&self, config: &AppConfig) -> Result<AnimationRequest> {
        let mut animation = config.animation.clone();
        if let Some(kind) = &self.kind {
            animation.kind = kind.clone();
        }
        if let Some(trigger) = &self.trigger {
            animation.trigger = trigger.clone();
        }
        if let Some(easing) = &self.easing {
            animation.easing = easing.clone();
        }
        if let Some(duration) = self.duration {
            animation.duration_ms = Some(duration);
        }
        if let Some(delay) = self.delay {
            animation.delay_ms = delay;
        }
        if let Some(stagger) = self.stagger {
            animation.stagger_ms = Some(stagger);
        }
        if self.retrigger {
            animation.trigger_once = false;
        }

        let mut request = AnimationRequest::from_config(self.text.clone(), &animation)?
            .reverse(self.reverse);
        if let Some(repeat) = self.repeat {
            request = request.repeat(repeat);
        }
        if !self.morph.is_empty() {
            request = request.morph_texts(self.morph.clone());
        }
        if let Some(seed) = self.seed {
            request = request.seed(seed);
        }
        Ok(request)
    }
}

fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if to_file {
        // The terminal belongs to the player, so logs go to a file
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(file),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    init_logging(&config, matches!(cli.command, Commands::Play(_)))?;

    match cli.command {
        Commands::Play(args) => {
            let request = args.to_request(&config)?;
            commands::play::run(request, config)
        }
        Commands::Trace {
            animation,
            run_for,
            step,
            activate_at,
            realtime,
        } => {
            let request = animation.to_request(&config)?;
            let options = commands::trace::TraceOptions {
                run_for,
                step,
                activate_at,
                realtime,
            };
            commands::trace::run(request, options).await
        }
        Commands::Config { path, init } => commands::config::run(&config, path, init),
    }
}
