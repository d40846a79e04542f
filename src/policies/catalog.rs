use crate::sim::types::Mechanism;

use super::{ElectrifyTarget, EuiTarget, GhgTarget, TuneupTarget};

/// Every target of one scenario, grouped by mechanism in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetCatalog {
    pub tuneup: Vec<TuneupTarget>,
    pub eui: Vec<EuiTarget>,
    pub ghg: Vec<GhgTarget>,
    pub electrify: Vec<ElectrifyTarget>,
}

impl TargetCatalog {
    /// Number of targets configured for `mechanism`.
    pub fn count(&self, mechanism: Mechanism) -> usize {
        match mechanism {
            Mechanism::Tuneup => self.tuneup.len(),
            Mechanism::Eui => self.eui.len(),
            Mechanism::Ghg => self.ghg.len(),
            Mechanism::Electrify => self.electrify.len(),
        }
    }

    pub fn len(&self) -> usize {
        Mechanism::ALL.iter().map(|&m| self.count(m)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
