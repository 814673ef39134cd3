//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use r_cueplayer::config::Settings;
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;
    use r_cueplayer::audio::{AudioBackend, SimulatedBackend};
    use r_cueplayer::player::{PlaybackController, PlaybackState, PlayerError};
    use std::sync::Arc;
    use std::time::Duration;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        // Create a temporary directory for test
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");

        // Create settings with test values
        let mut settings = Settings::default();
        settings.queue_capacity = 3;
        settings.poll_interval_ms = 200;
        settings.default_delay_secs = 1.0;
        settings.default_repeat_count = 2;

        // Validate and save settings
        settings.validate()?;
        settings.save(&config_path)?;

        // Load settings back
        let loaded_settings = Settings::load(&config_path)?;
        assert_eq!(loaded_settings, settings);

        // Test overriding settings
        let mut updated_settings = loaded_settings;
        updated_settings.queue_capacity = 7;
        updated_settings.save(&config_path)?;

        // Load again and verify updates
        let reloaded_settings = Settings::load(&config_path)?;
        assert_eq!(reloaded_settings.queue_capacity, 7);
        assert_eq!(reloaded_settings.default_repeat_count, 2);

        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let mut invalid_settings = Settings::default();
        invalid_settings.queue_capacity = 0;

        let result = invalid_settings.validate();
        assert!(result.is_err());

        if let Err(e) = result {
            assert!(e.to_string().contains("Queue capacity must be at least 1"));
        }
    }

    /// Settings drive the controller's queue capacity
    #[tokio::test(start_paused = true)]
    async fn test_settings_configure_controller() -> Result<(), PlayerError> {
        let mut settings = Settings::default();
        settings.queue_capacity = 1;
        settings.require_existing_files = false;

        let backend = SimulatedBackend::new(settings.simulated_track_length())
            .require_existing_files(settings.require_existing_files);
        let (player, _task) = PlaybackController::spawn(Arc::new(backend), settings.controller_config());

        player.start("a.mp3", 1, settings.default_delay(), None).await?;
        player.start("b.mp3", 1, settings.default_delay(), None).await?;
        let err = player.start("c.mp3", 1, settings.default_delay(), None).await.unwrap_err();
        assert!(matches!(err, PlayerError::QueueFull { capacity: 1 }));

        // Default simulated track is 3s; both tracks are done well within 30s.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(player.snapshot().await?.state, PlaybackState::Idle);
        Ok(())
    }

    /// Missing files are refused by the simulated backend when required
    #[tokio::test(start_paused = true)]
    async fn test_missing_file_surfaces_as_backend_failure() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let present = dir.path().join("present.wav");
        std::fs::write(&present, b"RIFF")?;

        let settings = Settings::default();
        let backend: Arc<dyn AudioBackend> =
            Arc::new(SimulatedBackend::new(settings.simulated_track_length()).require_existing_files(true));
        let (player, _task) = PlaybackController::spawn(backend, settings.controller_config());

        let missing = dir.path().join("missing.wav");
        let err = player
            .start(missing.to_string_lossy(), 1, Duration::ZERO, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PlayerError::BackendFailure(_)));

        player.start(present.to_string_lossy(), 1, Duration::ZERO, None).await?;
        assert_eq!(player.snapshot().await?.state, PlaybackState::Playing);
        Ok(())
    }
}
