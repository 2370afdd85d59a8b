//! Momentum analytics and reflection pipeline.
//!
//! `aggregate` folds entries into statistics, `compose` turns statistics into
//! text (AI first, `fallback` otherwise), and `pipeline` wires both to the
//! store for the caller-facing entry points.

pub mod aggregate;
pub mod classify;
pub mod compose;
pub mod fallback;
pub mod pipeline;
pub mod prompt;
pub mod window;
