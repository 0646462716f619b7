//! Defining-data documents for horo-core.
//!
//! Reads presentations, basepoint rays and requests from TOML or JSON, and
//! ships the named groups whose horospheres are well understood.

pub mod config;
pub mod error;
pub mod presets;

pub use config::HorosphereConfig;
pub use error::{ConfigError, Result};
pub use presets::{Preset, preset};
