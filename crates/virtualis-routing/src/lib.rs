//! # virtualis-routing
//!
//! Pure routing policies for the Virtualis triage engine:
//!
//! - [`match_on_call`] / [`widen`] pick reachable providers for a specialty
//! - [`order_feed`] produces the filtered, deterministically sorted feed
//!
//! Both operate on snapshots and return new collections; nothing here holds
//! state.

pub mod oncall;
pub mod ordering;

pub use oncall::{match_on_call, widen};
pub use ordering::order_feed;
