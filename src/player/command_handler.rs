use super::{playback_starter, PendingGap, PlaybackController, PLAYER_LOG_TARGET};
use crate::player::{PlaybackRequest, PlaybackState, PlayerError, PlayerEvent, SegmentFinished, StateListener};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Stand-in deadline for delays too large to add to an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[instrument(skip(player, listener), fields(path = %request.media_path, repeat_count = request.repeat_count))]
pub fn handle_start(
    player: &mut PlaybackController,
    request: PlaybackRequest,
    delay: Duration,
    listener: Option<Arc<dyn StateListener>>,
) -> Result<(), PlayerError> {
    info!(target: PLAYER_LOG_TARGET, "Handling Start for {} (repeat {}, delay {:?}).", request.media_path, request.repeat_count, delay);
    if let Err(e) = player.queue.enqueue(request) {
        warn!(target: PLAYER_LOG_TARGET, "Start rejected: {}", e);
        return Err(e.into());
    }
    player.session.delay = delay;
    player.session.listener = listener;

    if player.session.state == PlaybackState::Idle {
        if let Some(head) = player.queue.dequeue() {
            playback_starter::begin_request(player, head)?;
        }
    } else {
        debug!(target: PLAYER_LOG_TARGET, "Controller {}, request queued ({} pending).", player.session.state, player.queue.len());
    }
    Ok(())
}

#[instrument(skip(player))]
pub fn handle_pause(player: &mut PlaybackController) -> Result<(), PlayerError> {
    if player.session.state != PlaybackState::Playing {
        warn!(target: PLAYER_LOG_TARGET, "Pause ignored while {}.", player.session.state);
        return Err(PlayerError::InvalidTransition {
            action: "pause",
            state: player.session.state,
        });
    }
    info!(target: PLAYER_LOG_TARGET, "Handling Pause command.");

    // Between segments there is no stream to pause; only the state changes.
    let in_gap = player.pending_gap.is_some() || player.held_continuation;
    if !in_gap && player.backend.is_busy() {
        player.backend.pause()?;
    }
    player.session.state = PlaybackState::Paused;
    player.broadcast_update(PlayerEvent::Paused {
        path: player.session.current_path.clone().unwrap_or_default(),
    });
    Ok(())
}

#[instrument(skip(player))]
pub fn handle_resume(player: &mut PlaybackController) -> Result<(), PlayerError> {
    if player.session.state != PlaybackState::Paused {
        warn!(target: PLAYER_LOG_TARGET, "Resume ignored while {}.", player.session.state);
        return Err(PlayerError::InvalidTransition {
            action: "resume",
            state: player.session.state,
        });
    }
    info!(target: PLAYER_LOG_TARGET, "Handling Resume command.");

    if player.held_continuation {
        player.held_continuation = false;
        player.session.state = PlaybackState::Playing;
        player.broadcast_update(PlayerEvent::Resumed {
            path: player.session.current_path.clone().unwrap_or_default(),
        });
        debug!(target: PLAYER_LOG_TARGET, "Running continuation held during pause.");
        playback_starter::finish_segment(player);
        return Ok(());
    }

    if player.pending_gap.is_none() && player.backend.is_busy() {
        player.backend.resume()?;
    }
    player.session.state = PlaybackState::Playing;
    player.broadcast_update(PlayerEvent::Resumed {
        path: player.session.current_path.clone().unwrap_or_default(),
    });
    Ok(())
}

#[instrument(skip(player))]
pub fn handle_stop(player: &mut PlaybackController) -> Result<(), PlayerError> {
    info!(target: PLAYER_LOG_TARGET, "Handling Stop command while {}.", player.session.state);
    let was_active = player.session.state != PlaybackState::Idle;

    if was_active {
        if let Err(e) = player.backend.stop() {
            warn!(target: PLAYER_LOG_TARGET, "Backend stop failed: {}", e);
        }
        player.cancel_segment();
        player.session.reset_to_idle();
        player.broadcast_update(PlayerEvent::Idle);
    }
    player.notify_listener("");

    if was_active {
        playback_starter::drain_next(player, false);
    }
    Ok(())
}

#[instrument(skip(player), fields(generation = report.generation, path = %report.path))]
pub fn handle_segment_finished(player: &mut PlaybackController, report: SegmentFinished) {
    if report.generation != player.session.generation || player.session.state == PlaybackState::Idle {
        trace!(
            target: PLAYER_LOG_TARGET,
            "Ignoring stale segment report (generation {}, current {}).",
            report.generation, player.session.generation
        );
        return;
    }

    player.watcher = None;
    let delay = player.session.delay;
    debug!(target: PLAYER_LOG_TARGET, "Segment of {} ended, next step in {:?}.", report.path, delay);
    let now = Instant::now();
    player.pending_gap = Some(PendingGap {
        deadline: now.checked_add(delay).unwrap_or(now + FAR_FUTURE),
        generation: report.generation,
    });
}

#[instrument(skip(player))]
pub fn handle_gap_elapsed(player: &mut PlaybackController) {
    let Some(gap) = player.pending_gap.take() else {
        return;
    };
    if gap.generation != player.session.generation {
        trace!(target: PLAYER_LOG_TARGET, "Dropping gap for stale generation {}.", gap.generation);
        return;
    }
    if player.session.state == PlaybackState::Paused {
        debug!(target: PLAYER_LOG_TARGET, "Gap elapsed while paused; holding until resume.");
        player.held_continuation = true;
        return;
    }
    playback_starter::finish_segment(player);
}
