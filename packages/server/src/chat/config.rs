//! Engine configuration.

use std::time::Duration;

use super::error::ConfigError;

/// Time allowed to write a frame to the peer
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);
/// Time allowed between two pongs from the peer
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);
/// Keepalive ping period; must be shorter than the pong wait
pub const DEFAULT_PING_PERIOD: Duration = Duration::from_secs(45);
/// Maximum inbound frame size in bytes
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;
/// Outbound messages buffered per session before new ones are dropped
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;
/// Period of the empty-room sweep
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Per-session pump settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub write_wait: Duration,
    pub pong_wait: Duration,
    pub ping_period: Duration,
    pub max_message_size: usize,
    pub mailbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            write_wait: DEFAULT_WRITE_WAIT,
            pong_wait: DEFAULT_PONG_WAIT,
            ping_period: DEFAULT_PING_PERIOD,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ping_period.is_zero() || self.ping_period >= self.pong_wait {
            return Err(ConfigError::InvalidPingPeriod {
                ping_period: self.ping_period,
                pong_wait: self.pong_wait,
            });
        }
        if self.max_message_size == 0 {
            return Err(ConfigError::ZeroMaxMessageSize);
        }
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::ZeroMailboxCapacity);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub sweep_interval: Duration,
    pub session: SessionConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            session: SessionConfig::default(),
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        self.session.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        // テスト項目: デフォルト設定はバリデーションを通過する
        // given (前提条件):
        let config = RegistryConfig::default();

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(config.session.ping_period, Duration::from_secs(45));
        assert_eq!(config.session.max_message_size, 512);
    }

    #[test]
    fn test_ping_period_must_be_shorter_than_pong_wait() {
        // テスト項目: ping 周期が pong 待ち時間以上の場合はエラーになる
        // given (前提条件):
        let config = SessionConfig {
            ping_period: Duration::from_secs(60),
            pong_wait: Duration::from_secs(60),
            ..SessionConfig::default()
        };

        // when (操作):
        let result = config.validate();

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::InvalidPingPeriod { .. })));
    }

    #[test]
    fn test_zero_sizes_are_rejected() {
        // テスト項目: メールボックス容量・最大メッセージサイズ・掃除間隔の 0 は拒否される
        // given (前提条件):
        let zero_mailbox = SessionConfig {
            mailbox_capacity: 0,
            ..SessionConfig::default()
        };
        let zero_size = SessionConfig {
            max_message_size: 0,
            ..SessionConfig::default()
        };
        let zero_sweep = RegistryConfig {
            sweep_interval: Duration::ZERO,
            ..RegistryConfig::default()
        };

        // when (操作) / then (期待する結果):
        assert_eq!(zero_mailbox.validate(), Err(ConfigError::ZeroMailboxCapacity));
        assert_eq!(zero_size.validate(), Err(ConfigError::ZeroMaxMessageSize));
        assert_eq!(zero_sweep.validate(), Err(ConfigError::ZeroSweepInterval));
    }
}
