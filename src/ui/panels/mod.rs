// CaseSleuth - ui/panels/mod.rs

pub mod case_select;
pub mod communications;
pub mod discovery;
pub mod split;
