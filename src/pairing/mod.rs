//! Pairing engine: planning, history, custom carve-outs, winner tables,
//! weighted seat selection, and the generation pipeline that ties them
//! together.

pub mod custom;
pub mod generator;
pub mod history;
pub mod planner;
pub mod selector;
pub mod winners;

pub use generator::generate_round;
pub use history::PairingHistory;
pub use planner::{GroupPlan, plan};
pub use selector::{SeatSelector, SelectorVariant};
