// Handler modules
pub mod policy;
pub mod uninject;

// Re-export all handler functions
pub use policy::handle_policy;
pub use uninject::{UninjectOptions, handle_uninject};
