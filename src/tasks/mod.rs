//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - Janitor: purges expired cache entries at a configured interval

mod janitor;

pub use janitor::{Janitor, JanitorState};
