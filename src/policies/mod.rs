//! Reduction mechanisms and the targets that configure them.

pub mod aggregate;
pub mod catalog;
pub mod electrify;
pub mod eui;
pub mod ghg;
#[cfg(test)]
pub(crate) mod testing;
pub mod tuneup;
pub mod types;

pub use catalog::TargetCatalog;
pub use electrify::ElectrifyTarget;
pub use eui::EuiTarget;
pub use ghg::{GhgGoal, GhgTarget};
pub use tuneup::TuneupTarget;
pub use types::{AreaRange, Policy, PolicyContext, TargetScope, YearRange};
