pub mod logging;
pub mod varint;

// Re-export logging setup
pub use logging::{init_logging, parse_level};
