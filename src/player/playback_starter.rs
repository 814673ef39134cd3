// src/player/playback_starter.rs
use crate::audio::AudioError;
use crate::player::{
    EndOfMediaWatcher, PlaybackController, PlaybackRequest, PlaybackState, PlayerEvent,
    PLAYER_LOG_TARGET,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Loads and plays the session's current path as a new segment and spawns
/// its watcher.
#[instrument(skip(player), fields(path = ?player.session.current_path, segment = player.session.segment + 1))]
fn start_segment(player: &mut PlaybackController) -> Result<(), AudioError> {
    let path = player
        .session
        .current_path
        .clone()
        .ok_or(AudioError::NothingLoaded)?;

    player.backend.load(&path)?;
    player.backend.play()?;

    // A previous watcher would report a segment that no longer exists.
    if let Some(previous) = player.watcher.take() {
        previous.cancel();
    }
    player.session.generation += 1;
    player.session.segment += 1;
    player.session.state = PlaybackState::Playing;

    player.watcher = Some(EndOfMediaWatcher::spawn(
        Arc::clone(&player.backend),
        path.clone(),
        player.session.generation,
        player.poll_interval,
        player.segment_tx.clone(),
    ));

    info!(
        target: PLAYER_LOG_TARGET,
        "Playing {} (segment {}, {} repeat(s) left, generation {})",
        path, player.session.segment, player.session.remaining_repeats, player.session.generation
    );
    player.broadcast_update(PlayerEvent::SegmentStarted {
        path,
        segment: player.session.segment,
        remaining_repeats: player.session.remaining_repeats,
    });
    Ok(())
}

/// Makes `request` the current session and plays its first segment.
/// On failure the session is left idle.
#[instrument(skip(player), fields(path = %request.media_path, repeat_count = request.repeat_count))]
pub fn begin_request(player: &mut PlaybackController, request: PlaybackRequest) -> Result<(), AudioError> {
    player.session.current_path = Some(request.media_path.clone());
    player.session.remaining_repeats = request.repeat_count;
    player.session.segment = 0;

    match start_segment(player) {
        Ok(()) => {
            player.notify_listener(&request.media_path);
            Ok(())
        }
        Err(e) => {
            error!(target: PLAYER_LOG_TARGET, "Failed to start {}: {}", request.media_path, e);
            player.session.reset_to_idle();
            player.broadcast_update(PlayerEvent::Error(format!(
                "Failed to start {}: {}",
                request.media_path, e
            )));
            Err(e)
        }
    }
}

/// Starts the next queued request, skipping any that fail to start. When the
/// queue runs dry and `announce_idle` is set, reports idle to the listener
/// and subscribers.
#[instrument(skip(player), fields(queued = player.queue.len()))]
pub fn drain_next(player: &mut PlaybackController, announce_idle: bool) {
    while let Some(request) = player.queue.dequeue() {
        info!(target: PLAYER_LOG_TARGET, "Draining next request: {}", request.media_path);
        if begin_request(player, request).is_ok() {
            return;
        }
    }

    debug!(target: PLAYER_LOG_TARGET, "Queue empty, controller idle.");
    if announce_idle {
        player.broadcast_update(PlayerEvent::Idle);
        player.notify_listener("");
    }
}

/// Runs after the inter-segment gap: repeats the current path while repeats
/// remain, otherwise ends the session and drains the queue.
#[instrument(skip(player), fields(path = ?player.session.current_path, remaining = player.session.remaining_repeats))]
pub fn finish_segment(player: &mut PlaybackController) {
    player.session.remaining_repeats = player.session.remaining_repeats.saturating_sub(1);

    if player.session.remaining_repeats > 0 {
        match start_segment(player) {
            Ok(()) => return,
            Err(e) => {
                error!(target: PLAYER_LOG_TARGET, "Failed to repeat {:?}: {}", player.session.current_path, e);
                player.broadcast_update(PlayerEvent::Error(format!("Failed to repeat: {}", e)));
            }
        }
    }

    info!(target: PLAYER_LOG_TARGET, "Finished {:?}", player.session.current_path);
    player.watcher = None;
    player.session.reset_to_idle();
    drain_next(player, true);
}
