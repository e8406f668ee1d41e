//! Adapters between the engine and the outside world: CSV journals and
//! rosters in, reports out.

pub mod csv;
pub mod report;
