pub mod cli;
pub mod error;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod render;
pub mod text_summary;
pub mod transport;
#[cfg(feature = "tui")]
mod tui;
