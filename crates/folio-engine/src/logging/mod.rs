//! Logger setup for hosts. Library code only uses the `log` facade.

mod init;

pub use init::{LoggingConfig, init_logging};
