pub mod course;
pub mod audio;
pub mod error;

pub use course::*;
pub use audio::*;
pub use error::{Error, Result};
