// CaseSleuth - core/mod.rs
//
// Coordination engine: event channel, selection proxy, transition driver.
// Dependencies: standard library, tracing, chrono (failure timestamps).
// Must NOT depend on: ui, platform, app, or any widget toolkit.

pub mod channel;
pub mod model;
pub mod selection;
pub mod transition;
