//! Assembly of the translator from its components

mod builder;
mod instance;

pub use builder::DragomanBuilder;
pub use instance::Dragoman;
