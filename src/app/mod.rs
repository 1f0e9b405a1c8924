// CaseSleuth - app/mod.rs
//
// Application layer: composite views, their lifecycle, and the collaborators
// they drive (split containers, searches, case browsers).
// Dependencies: core layer, util.
// Must NOT depend on: ui, platform specifics.

pub mod auxiliary;
pub mod case_select;
pub mod communications_view;
pub mod coordinator;
pub mod discovery_view;
pub mod search;
