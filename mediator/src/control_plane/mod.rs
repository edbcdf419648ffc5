//! Control-plane layer.
//!
//! Owns route definitions, the ordered route table, and the start/stop
//! transitions that acquire and release endpoints. A route that fails to start
//! releases everything it acquired and never accepts traffic.

pub(crate) mod route;
pub(crate) mod route_definition;
pub(crate) mod route_table;
