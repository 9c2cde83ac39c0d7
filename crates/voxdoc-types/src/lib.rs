pub mod message;
pub mod session;
pub mod document;
pub mod call;
pub mod voice;
pub mod audio;
pub mod event;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use error::VoxError;
pub type Result<T> = std::result::Result<T, VoxError>;
