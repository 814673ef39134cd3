//! Command-line interface implementation

use clap::Parser;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::Settings;
use crate::player::{PlaybackState, PlayerEvent, PlayerSnapshot};

/// Command-line arguments for r-cueplayer
#[derive(Parser, Debug)]
#[command(author, version, about = "Queueing, repeating audio cue player", long_about = None)]
pub struct Args {
    /// Media files to queue at startup
    pub files: Vec<String>,

    /// Total number of plays for each startup file
    #[arg(short, long, env = "CUEPLAYER_REPEAT")]
    pub repeat: Option<u32>,

    /// Seconds to wait between repeats and between tracks
    #[arg(short, long, env = "CUEPLAYER_DELAY")]
    pub delay: Option<f64>,

    /// Maximum number of pending requests
    #[arg(short = 'q', long, env = "CUEPLAYER_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Interval between end-of-media checks, in milliseconds
    #[arg(short, long, env = "CUEPLAYER_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Simulated length of every track, in seconds
    #[arg(short, long, env = "CUEPLAYER_TRACK_SECS")]
    pub track_secs: Option<f64>,

    /// Accept paths that do not exist on disk
    #[arg(long, env = "CUEPLAYER_ALLOW_MISSING")]
    pub allow_missing: bool,

    /// Config file path
    #[arg(short, long, env = "CUEPLAYER_CONFIG")]
    pub config: Option<String>,
}

impl Args {
    /// Applies command-line overrides on top of loaded settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(repeat) = self.repeat {
            settings.default_repeat_count = repeat;
        }
        if let Some(delay) = self.delay {
            settings.default_delay_secs = delay;
        }
        if let Some(capacity) = self.queue_capacity {
            settings.queue_capacity = capacity;
        }
        if let Some(interval) = self.poll_interval_ms {
            settings.poll_interval_ms = interval;
        }
        if let Some(secs) = self.track_secs {
            settings.simulated_track_secs = secs;
        }
        if self.allow_missing {
            settings.require_existing_files = false;
        }
    }
}

/// Interactive commands read from stdin
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Play {
        path: String,
        repeat: Option<u32>,
        delay: Option<Duration>,
    },
    Pause,
    Resume,
    Stop,
    Status,
    Help,
    Quit,
}

/// Errors from parsing an interactive command line
#[derive(Debug, Error, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (type 'help')")]
    Unknown(String),
    #[error("usage: play <path> [repeat] [delay]")]
    MissingPath,
    #[error("invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(ParseCommandError::Empty);
        };

        match verb.to_lowercase().as_str() {
            "play" | "p" => {
                let path = words.next().ok_or(ParseCommandError::MissingPath)?.to_string();
                let repeat = words
                    .next()
                    .map(|w| {
                        w.parse::<u32>().map_err(|_| ParseCommandError::InvalidNumber {
                            field: "repeat",
                            value: w.to_string(),
                        })
                    })
                    .transpose()?;
                let delay = words
                    .next()
                    .map(|w| match w.parse::<f64>().map(Duration::try_from_secs_f64) {
                        Ok(Ok(delay)) => Ok(delay),
                        _ => Err(ParseCommandError::InvalidNumber {
                            field: "delay",
                            value: w.to_string(),
                        }),
                    })
                    .transpose()?;
                Ok(ConsoleCommand::Play { path, repeat, delay })
            }
            "pause" => Ok(ConsoleCommand::Pause),
            "resume" => Ok(ConsoleCommand::Resume),
            "stop" | "s" => Ok(ConsoleCommand::Stop),
            "status" => Ok(ConsoleCommand::Status),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    /// Display the available interactive commands
    pub fn display_help(&self) {
        println!("\nCommands:");
        println!("  play <path> [repeat] [delay]  queue a file (plays now if idle)");
        println!("  pause | resume | stop         control the current track");
        println!("  status                        show controller state and queue");
        println!("  quit                          exit");
        println!();
    }

    /// Display a snapshot of the controller
    pub fn display_snapshot(&self, snapshot: &PlayerSnapshot) {
        println!("{}", format_snapshot(snapshot));
    }

    /// Display a state-change notification
    pub fn display_state_change(&self, current_path: &str) {
        if current_path.is_empty() {
            println!("[state] nothing playing");
        } else {
            println!("[state] now playing: {}", current_path);
        }
    }

    /// Display a controller event
    pub fn display_event(&self, event: &PlayerEvent) {
        match event {
            PlayerEvent::SegmentStarted { path, segment, remaining_repeats } => {
                println!("[play] {} (play {}, {} left)", path, segment, remaining_repeats.saturating_sub(1));
            }
            PlayerEvent::Paused { path } => println!("[pause] {}", path),
            PlayerEvent::Resumed { path } => println!("[resume] {}", path),
            PlayerEvent::Idle => println!("[idle]"),
            PlayerEvent::Error(message) => eprintln!("[error] {}", message),
        }
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn std::error::Error) {
        eprintln!("Error: {}", error);
    }
}

/// Renders a snapshot as a short multi-line summary
pub fn format_snapshot(snapshot: &PlayerSnapshot) -> String {
    let mut out = match (&snapshot.state, &snapshot.current_path) {
        (PlaybackState::Idle, _) | (_, None) => "State: idle".to_string(),
        (state, Some(path)) => format!(
            "State: {} {} (play {}, {} repeat(s) left, delay {:.1}s)",
            state,
            path,
            snapshot.segment,
            snapshot.remaining_repeats.saturating_sub(1),
            snapshot.delay.as_secs_f64()
        ),
    };
    if snapshot.queued.is_empty() {
        out.push_str("\nQueue: empty");
    } else {
        out.push_str("\nQueue:");
        for (index, request) in snapshot.queued.iter().enumerate() {
            out.push_str(&format!("\n  {:<3} {} x{}", index + 1, request.media_path, request.repeat_count.max(1)));
        }
    }
    out
}
