pub mod interface;
pub mod schema;
pub mod reply;
pub mod factory;
pub mod openai_compatible;
pub mod ollama;
pub mod gemini;
pub mod claude;

#[cfg(test)]
pub mod mock;

pub use interface::*;
pub use schema::*;
pub use factory::*;
