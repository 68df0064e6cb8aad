pub mod library;
pub mod template;

pub use library::*;
pub use template::*;
