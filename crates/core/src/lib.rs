#![forbid(unsafe_code)]

pub mod feedback;
pub mod model;
pub mod progress;
pub mod results;
pub mod selector;
pub mod session;
pub mod time;

pub use time::Clock;
