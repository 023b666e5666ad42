pub mod encoding;
pub mod validator;

pub use encoding::*;
pub use validator::*;
