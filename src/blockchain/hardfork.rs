// Height-indexed protocol versions and the proof schemes each one admits

use serde::{Deserialize, Serialize};

use crate::blockchain::rct::RctType;

/// Default version at which bulletproofs become legal
pub const BULLETPROOF_FORK_VERSION: u8 = 8;

/// Rules in force for one major version
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForkRules {
    pub version: u8,
    pub bulletproofs_allowed: bool,
}

impl ForkRules {
    pub fn allows(&self, rct_type: RctType) -> bool {
        match rct_type {
            RctType::Null | RctType::Full | RctType::Simple => true,
            RctType::Bulletproof => self.bulletproofs_allowed,
        }
    }
}

/// One configured activation, `version` in force from `height` on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkActivation {
    pub version: u8,
    pub height: u64,
}

/// Ordered `(version, activation height)` pairs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardForkTable {
    forks: Vec<(u8, u64)>,
    bulletproof_version: u8,
}

impl Default for HardForkTable {
    fn default() -> Self {
        HardForkTable {
            forks: vec![(1, 0)],
            bulletproof_version: BULLETPROOF_FORK_VERSION,
        }
    }
}

impl HardForkTable {
    /// Build from `(version, height)` pairs; pairs are sorted by height
    pub fn new(mut forks: Vec<(u8, u64)>, bulletproof_version: u8) -> Self {
        forks.sort_by_key(|&(_, height)| height);
        if forks.first().map_or(true, |&(_, height)| height != 0) {
            forks.insert(0, (1, 0));
        }
        HardForkTable {
            forks,
            bulletproof_version,
        }
    }

    pub fn from_activations(activations: &[ForkActivation], bulletproof_version: u8) -> Self {
        Self::new(
            activations.iter().map(|a| (a.version, a.height)).collect(),
            bulletproof_version,
        )
    }

    /// Append a fork activating at `height`
    pub fn with_fork(mut self, version: u8, height: u64) -> Self {
        self.forks.push((version, height));
        Self::new(self.forks, self.bulletproof_version)
    }

    /// Major version in force at `height`
    pub fn version_at(&self, height: u64) -> u8 {
        self.forks
            .iter()
            .take_while(|&&(_, activation)| activation <= height)
            .last()
            .map_or(1, |&(version, _)| version)
    }

    pub fn rules_for(&self, version: u8) -> ForkRules {
        ForkRules {
            version,
            bulletproofs_allowed: version >= self.bulletproof_version,
        }
    }

    pub fn rules_at(&self, height: u64) -> ForkRules {
        self.rules_for(self.version_at(height))
    }
}
