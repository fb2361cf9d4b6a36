//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: purges expired cache entries and session claims

mod cleanup;

pub use cleanup::spawn_cleanup_task;
