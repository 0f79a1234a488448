use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Traversal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Top-down only; each step fans out deferred remote writes, then scans.
    RemoteWrites,
    /// Top-down only; each edge claims its target with a compare-and-swap.
    MigratingThreads,
    /// Direction-optimizing, top-down steps use remote writes.
    RemoteWritesHybrid,
    /// Direction-optimizing, top-down steps use claims.
    #[default]
    BeamerHybrid,
}

impl Algorithm {
    /// Every variant, in declaration order.
    pub const ALL: [Algorithm; 4] = [
        Algorithm::RemoteWrites,
        Algorithm::MigratingThreads,
        Algorithm::RemoteWritesHybrid,
        Algorithm::BeamerHybrid,
    ];

    /// Name used in configuration files and logs.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::RemoteWrites => "remote_writes",
            Algorithm::MigratingThreads => "migrating_threads",
            Algorithm::RemoteWritesHybrid => "remote_writes_hybrid",
            Algorithm::BeamerHybrid => "beamer_hybrid",
        }
    }

    /// `true` for the direction-optimizing variants.
    pub fn is_hybrid(self) -> bool {
        matches!(self, Algorithm::RemoteWritesHybrid | Algorithm::BeamerHybrid)
    }

    /// `true` if top-down steps use deferred remote writes rather than claims.
    pub fn uses_remote_writes(self) -> bool {
        matches!(self, Algorithm::RemoteWrites | Algorithm::RemoteWritesHybrid)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown algorithm `{s}`")))
    }
}
