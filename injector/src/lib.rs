pub mod args;
pub mod configs;
pub mod error;
pub mod integrity;
pub mod logging;
pub mod pacing;
pub mod runner;
pub mod shutdown;
pub mod statistics;
pub mod template;
pub mod transport;
pub mod validatable;
