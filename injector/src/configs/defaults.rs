use crate::configs::injector::InjectorConfig;

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/fluentbit.sock";
pub const DEFAULT_MESSAGE_FORMAT: &str =
    "<134>1 {timestamp} {hostname} test-app {pid} - - Test message #{counter}";
pub const DEFAULT_TARGET_RATE: u32 = 1000;
pub const DEFAULT_DURATION_SECS: u64 = 60;
pub const DEFAULT_BATCH_SIZE: u32 = 100;
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 100;
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 1;

impl Default for InjectorConfig {
    fn default() -> InjectorConfig {
        InjectorConfig {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            message_format: DEFAULT_MESSAGE_FORMAT.to_string(),
            target_rate: DEFAULT_TARGET_RATE,
            duration: DEFAULT_DURATION_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            verbose: false,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
        }
    }
}
