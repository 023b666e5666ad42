mod error;
mod pacing;
mod ports;
mod prompt;
mod themes;
mod training;
mod types;

pub use error::*;
pub use pacing::*;
pub use ports::*;
pub use prompt::*;
pub use themes::*;
pub use training::*;
pub use types::*;
