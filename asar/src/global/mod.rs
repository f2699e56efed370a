// Globally available exports
pub mod envelope;
pub mod error;
pub mod header;
pub mod result;
