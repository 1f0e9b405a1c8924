// CaseSleuth - platform/mod.rs
//
// Platform abstraction layer: config directories and config file loading.
// Dependencies: standard library, directories, serde, toml.
// Must NOT depend on: core, app, ui.

pub mod config;
