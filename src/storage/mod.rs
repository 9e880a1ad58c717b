//! Site state storage
//!
//! All state is memory-resident. The store owns one [`SiteState`] per target url and hands out
//! shared slots to the check workers, which are the only writers.

pub mod memory;
pub mod state;

pub use memory::{SiteSlot, SiteStateStore};
pub use state::{SiteState, Transition};
