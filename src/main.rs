use r_cueplayer::audio::SimulatedBackend;
use r_cueplayer::config::Settings;
use r_cueplayer::init_app_dirs;
use r_cueplayer::player::{PlaybackController, PlayerError, StateListener};
use r_cueplayer::ui::{Cli, ConsoleCommand, ParseCommandError};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "r_cueplayer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse command-line arguments and initialize CLI
    let cli = Arc::new(Cli::new());
    let args = &cli.args;

    // Initialize application directories
    init_app_dirs()?;

    // Load configuration from file or create default
    let config_path = match &args.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => Settings::default_path(),
    };
    let mut settings = Settings::load(&config_path)?;
    args.apply_to(&mut settings);
    settings.validate()?;
    info!("Loaded settings from {}", config_path.display());
    debug!("Effective settings: {:?}", settings);

    let backend = SimulatedBackend::new(settings.simulated_track_length())
        .require_existing_files(settings.require_existing_files);
    let (player, controller_task) = PlaybackController::spawn(Arc::new(backend), settings.controller_config());

    // Print controller events as they happen
    let mut events = player.subscribe();
    let event_cli = Arc::clone(&cli);
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => event_cli.display_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} controller events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let listener_cli = Arc::clone(&cli);
    let listener: Arc<dyn StateListener> =
        Arc::new(move |current_path: &str| listener_cli.display_state_change(current_path));

    for file in &args.files {
        if let Err(e) = player
            .start(file.clone(), settings.default_repeat_count, settings.default_delay(), Some(Arc::clone(&listener)))
            .await
        {
            cli.display_error(&e);
        }
    }

    cli.display_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(ParseCommandError::Empty) => continue,
            Err(e) => {
                cli.display_error(&e);
                continue;
            }
        };

        let outcome = match command {
            ConsoleCommand::Play { path, repeat, delay } => {
                let repeat = repeat.unwrap_or(settings.default_repeat_count);
                let delay = delay.unwrap_or_else(|| settings.default_delay());
                player.start(path, repeat, delay, Some(Arc::clone(&listener))).await
            }
            ConsoleCommand::Pause => player.pause().await,
            ConsoleCommand::Resume => player.resume().await,
            ConsoleCommand::Stop => player.stop().await,
            ConsoleCommand::Status => player.snapshot().await.map(|snapshot| cli.display_snapshot(&snapshot)),
            ConsoleCommand::Help => {
                cli.display_help();
                Ok(())
            }
            ConsoleCommand::Quit => break,
        };

        match outcome {
            Ok(()) => {}
            Err(e) if e.is_benign() => println!("{}", e),
            Err(PlayerError::ControllerGone) => {
                cli.display_error(&PlayerError::ControllerGone);
                break;
            }
            Err(e) => cli.display_error(&e),
        }
    }

    info!("Shutting down.");
    if let Err(e) = player.shutdown().await {
        debug!("Controller already stopped: {}", e);
    }
    controller_task.await?;
    Ok(())
}
