use crate::configs::injector::InjectorConfig;
use std::fmt::{Display, Formatter};

impl Display for InjectorConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ socket_path: {}, message_format: {:?}, target_rate: {} msg/s, duration: {}s, batch_size: {}, verbose: {}, reconnect_interval: {} ms, reconnect_attempts: {} }}",
            self.socket_path,
            self.message_format,
            self.target_rate,
            self.duration,
            self.batch_size,
            self.verbose,
            self.reconnect_interval_ms,
            self.reconnect_attempts
        )
    }
}
