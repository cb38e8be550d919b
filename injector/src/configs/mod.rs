pub mod config_provider;
pub mod defaults;
pub mod displays;
pub mod injector;
pub mod validators;
