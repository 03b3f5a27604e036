//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache engine is
//! alive.
//!
//! # Tasks
//! - TTL Sweep: Removes expired entries from every namespace at the
//!   configured interval

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
