pub mod loader;
pub mod shorthand;

pub use loader::{load_controls, parse_controls};
