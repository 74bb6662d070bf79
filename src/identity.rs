//! Per-process identity for result partitioning
//!
//! Result files are partitioned by `(host, rank)` so concurrent processes of
//! a multi-process run never contend for the same file. The rank comes from
//! whatever launcher started the process; detection is a runtime capability
//! check, so a build without any multi-process runtime simply degrades the
//! recorder to a logged no-op instead of being compiled differently.

use std::env;

/// Identity of the calling process within a multi-process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    host: String,
    rank: u32,
}

impl ProcessIdentity {
    /// Create an identity from an explicit host and rank.
    #[must_use]
    pub fn new(host: impl Into<String>, rank: u32) -> Self {
        Self {
            host: host.into(),
            rank,
        }
    }

    /// Host identifier (processor name).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Process rank within the run.
    #[must_use]
    pub const fn rank(&self) -> u32 {
        self.rank
    }
}

/// Source of the calling process's identity.
///
/// Returning `None` means the environment cannot identify the process (no
/// multi-process launcher detected); the recorder then takes its degraded
/// log-and-no-op branch.
pub trait IdentitySource: Send + Sync {
    /// Identity of the current process, if the environment provides one.
    fn identity(&self) -> Option<ProcessIdentity>;
}

/// Rank environment variables set by common launchers, probed in order.
const RANK_VARS: &[&str] = &[
    "OMPI_COMM_WORLD_RANK", // OpenMPI
    "PMI_RANK",             // MPICH / Intel MPI
    "PMIX_RANK",            // PMIx-based launchers
    "SLURM_PROCID",         // Slurm srun
];

/// Identity detection from launcher environment variables.
///
/// The rank is the capability gate: with no rank variable exported the
/// process is not part of a multi-process run and `identity` returns `None`.
/// The host falls back to `localhost` when no hostname variable is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvIdentity;

impl EnvIdentity {
    /// Create an environment-backed identity source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn detect(lookup: impl Fn(&str) -> Option<String>) -> Option<ProcessIdentity> {
        let rank = RANK_VARS
            .iter()
            .find_map(|var| lookup(var))
            .and_then(|raw| raw.trim().parse::<u32>().ok())?;
        let host = lookup("HOSTNAME")
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        Some(ProcessIdentity { host, rank })
    }
}

impl IdentitySource for EnvIdentity {
    fn identity(&self) -> Option<ProcessIdentity> {
        Self::detect(|var| env::var(var).ok())
    }
}

/// Fixed identity for embedding hosts and tests.
///
/// Lets a driver that already knows its rank (e.g. from its own communicator
/// handle) bypass environment detection.
#[derive(Debug, Clone)]
pub struct FixedIdentity(ProcessIdentity);

impl FixedIdentity {
    /// Wrap an explicit identity.
    #[must_use]
    pub fn new(identity: ProcessIdentity) -> Self {
        Self(identity)
    }
}

impl IdentitySource for FixedIdentity {
    fn identity(&self) -> Option<ProcessIdentity> {
        Some(self.0.clone())
    }
}

/// Identity source that always reports an unsupported environment.
///
/// Useful for exercising the recorder's degraded branch deterministically.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIdentity;

impl IdentitySource for NoIdentity {
    fn identity(&self) -> Option<ProcessIdentity> {
        None
    }
}
