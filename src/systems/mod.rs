//! Application systems
//!
//! Window handling kept out of main.rs so it can be tested on its own.

mod window;

pub use window::{WindowError, WindowSystem};
