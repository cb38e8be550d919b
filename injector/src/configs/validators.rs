use crate::configs::injector::InjectorConfig;
use crate::error::InjectorError;
use crate::validatable::Validatable;
use tracing::error;

impl Validatable<InjectorError> for InjectorConfig {
    fn validate(&self) -> Result<(), InjectorError> {
        if self.socket_path.trim().is_empty() {
            error!("Injector configuration -> socket path cannot be empty.");
            return Err(InjectorError::InvalidConfiguration(
                "socket_path cannot be empty".to_string(),
            ));
        }

        if self.target_rate == 0 {
            error!("Injector configuration -> target rate must be greater than 0.");
            return Err(InjectorError::InvalidConfiguration(
                "target_rate must be greater than 0".to_string(),
            ));
        }

        if self.batch_size == 0 {
            error!("Injector configuration -> batch size must be greater than 0.");
            return Err(InjectorError::InvalidConfiguration(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.reconnect_attempts == 0 {
            error!("Injector configuration -> reconnect attempts must be greater than 0.");
            return Err(InjectorError::InvalidConfiguration(
                "reconnect_attempts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
