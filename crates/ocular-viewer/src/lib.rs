//! Demo embedder for the rendering core: a simulated host, a tracing
//! painter, and a JSON-configurable entry point.

#![forbid(unsafe_code)]

pub mod config;
pub mod painter;
pub mod sim;

pub use config::ViewerConfig;
pub use painter::TracePainter;
pub use sim::{SimFaults, SimulatedHost};
