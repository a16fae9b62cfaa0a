pub mod config;
pub mod document;
pub mod executor;
pub mod findings;
pub mod model;
pub mod report;
pub mod repository;
pub mod rules;
pub mod traits;
pub mod walk;

// Re-export common types for convenience
pub use config::*;
pub use executor::*;
pub use findings::*;
pub use model::*;
pub use traits::*;
