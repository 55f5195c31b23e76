pub mod avatar;
pub mod config;
pub mod error;
pub mod io;
pub mod media;
pub mod paths;
pub mod prompts;
pub mod session;
pub mod types;
pub mod video;

pub use error::{RemindError, Result};
