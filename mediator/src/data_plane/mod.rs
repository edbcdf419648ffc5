//! Data-plane layer.
//!
//! Runs exchanges through a started route's bound steps and tracks how many
//! are in flight so that stopping a route can drain them.

pub(crate) mod inflight;
pub(crate) mod pipeline;
