use std::time::Duration;

use crate::error::WheelError;

/// Configuration for a [`TimeWheel`](crate::TimeWheel).
///
/// The defaults give a one-second tick over 3000 slots, i.e. a single
/// rotation spans 50 minutes. Longer delays are handled with laps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelConfig {
    /// Instance name for logging
    pub name: String,

    /// Duration of one slot advance
    pub tick_interval: Duration,

    /// Number of slots in the ring
    pub slot_count: usize,

    /// Size of the bounded command channel
    pub command_buffer_size: usize,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            name: "time_wheel".to_string(),
            tick_interval: Duration::from_secs(1),
            slot_count: 3000,
            command_buffer_size: 1024,
        }
    }
}

impl WheelConfig {
    /// Create a config with the given tick interval and slot count, defaults elsewhere.
    pub fn new(tick_interval: Duration, slot_count: usize) -> Self {
        Self {
            tick_interval,
            slot_count,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_command_buffer_size(mut self, size: usize) -> Self {
        self.command_buffer_size = size;
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), WheelError> {
        if self.tick_interval.is_zero() {
            return Err(WheelError::InvalidTickInterval);
        }
        if self.slot_count == 0 {
            return Err(WheelError::InvalidSlotCount);
        }
        if self.command_buffer_size == 0 {
            return Err(WheelError::InvalidCommandBufferSize);
        }
        Ok(())
    }

    /// Time covered by one full rotation of the ring.
    pub fn span(&self) -> Duration {
        let slots = u32::try_from(self.slot_count).unwrap_or(u32::MAX);
        self.tick_interval.saturating_mul(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WheelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.span(), Duration::from_secs(3000));
    }

    #[test]
    fn test_invalid_parameters() {
        let config = WheelConfig::new(Duration::ZERO, 10);
        assert_eq!(config.validate(), Err(WheelError::InvalidTickInterval));

        let config = WheelConfig::new(Duration::from_millis(10), 0);
        assert_eq!(config.validate(), Err(WheelError::InvalidSlotCount));

        let config = WheelConfig::new(Duration::from_millis(10), 8).with_command_buffer_size(0);
        assert_eq!(config.validate(), Err(WheelError::InvalidCommandBufferSize));
    }

    #[test]
    fn test_builder_setters() {
        let config = WheelConfig::new(Duration::from_millis(5), 64)
            .with_name("sessions")
            .with_command_buffer_size(16);
        assert_eq!(config.name, "sessions");
        assert_eq!(config.command_buffer_size, 16);
        assert_eq!(config.span(), Duration::from_millis(320));
    }
}
