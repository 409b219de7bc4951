// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod logging;
pub mod reducer;
pub mod runtime;
pub mod sampler;
pub mod session;
pub mod store;
pub mod target;
pub mod time_series;
pub mod ui;
pub mod util;

pub use error::{Error, Result};
