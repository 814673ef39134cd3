// src/player/run_loop.rs
use super::{command_handler, PlaybackController, PlaybackState, PlayerCommand, PlayerEvent, PLAYER_LOG_TARGET};
use tokio::time::{sleep_until, Instant};
use tracing::{info, trace, warn};

/// Runs the controller's command processing loop.
pub async fn run_controller_loop(player: &mut PlaybackController) {
    info!(target: PLAYER_LOG_TARGET, "Controller run loop started.");
    let mut shutdown_reply = None;

    loop {
        let gap_deadline = player.pending_gap.map(|gap| gap.deadline);

        tokio::select! {
            biased; // Check commands first

            // --- Command Processing ---
            command = player.command_rx.recv() => {
                let Some(command) = command else {
                    info!(target: PLAYER_LOG_TARGET, "All handles dropped. Exiting run loop.");
                    break;
                };
                trace!(target: PLAYER_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    PlayerCommand::Start { request, delay, listener, reply } => {
                        let _ = reply.send(command_handler::handle_start(player, request, delay, listener));
                    }
                    PlayerCommand::Pause(reply) => {
                        let _ = reply.send(command_handler::handle_pause(player));
                    }
                    PlayerCommand::Resume(reply) => {
                        let _ = reply.send(command_handler::handle_resume(player));
                    }
                    PlayerCommand::Stop(reply) => {
                        let _ = reply.send(command_handler::handle_stop(player));
                    }
                    PlayerCommand::GetSnapshot(responder) => {
                        let _ = responder.send(player.snapshot()); // Ignore error if receiver dropped
                    }
                    PlayerCommand::Shutdown(reply) => {
                        info!(target: PLAYER_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                        shutdown_reply = Some(reply);
                        break;
                    }
                }
            }

            // --- End-of-media reports from watchers ---
            Some(report) = player.segment_rx.recv() => {
                command_handler::handle_segment_finished(player, report);
            }

            // --- Inter-segment delay ---
            _ = sleep_until(gap_deadline.unwrap_or_else(Instant::now)), if gap_deadline.is_some() => {
                command_handler::handle_gap_elapsed(player);
            }
        }
    }

    info!(target: PLAYER_LOG_TARGET, "Controller run loop finished. Performing final cleanup.");
    player.cancel_segment();
    if let Err(e) = player.backend.stop() {
        warn!(target: PLAYER_LOG_TARGET, "Error stopping backend during shutdown: {}", e);
    }
    if player.session.state != PlaybackState::Idle {
        player.session.reset_to_idle();
        player.broadcast_update(PlayerEvent::Idle);
        player.notify_listener("");
    }
    player.queue.clear();

    if let Some(reply) = shutdown_reply {
        let _ = reply.send(());
    }
    info!(target: PLAYER_LOG_TARGET, "Controller task cleanup complete.");
}
