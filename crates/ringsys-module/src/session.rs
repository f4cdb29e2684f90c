//! `SessionConfig` — builder over `setup`.
//!
//! Produces a zeroed `IoUringParams`, fills in the requested flags and
//! fields, and hands it to a single setup call. No validation happens here:
//! whatever the kernel rejects comes back as its own errno.
//!
//! ```ignore
//! let session = SessionConfig::new().entries(64).cq_entries(256).establish()?;
//! println!("sq={} cq={}", session.params.sq_entries, session.params.cq_entries);
//! ```

use std::os::unix::io::RawFd;

use ringsys_core::env::{env_get, env_get_bits, env_get_opt};
use ringsys_core::error::Result;
use ringsys_core::flags::{FeatureFlags, SetupFlags};
use ringsys_core::kernel::RingSyscalls;
use ringsys_core::params::IoUringParams;

use crate::linux_syscalls::LinuxSyscalls;
use crate::setup::setup_with;

pub const ENV_ENTRIES: &str = "RINGSYS_ENTRIES";
pub const ENV_CQ_ENTRIES: &str = "RINGSYS_CQ_ENTRIES";
pub const ENV_SETUP_FLAGS: &str = "RINGSYS_SETUP_FLAGS";

/// Parameters for one ring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    entries: u32,
    cq_entries: Option<u32>,
    flags: SetupFlags,
    sq_thread_cpu: u32,
    sq_thread_idle: u32,
    wq_fd: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            entries: 256,
            cq_entries: None,
            flags: SetupFlags::empty(),
            sq_thread_cpu: 0,
            sq_thread_idle: 0,
            wq_fd: 0,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `RINGSYS_ENTRIES`, `RINGSYS_CQ_ENTRIES` and
    /// `RINGSYS_SETUP_FLAGS`. Unset or unparsable keys keep their defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.entries = env_get(ENV_ENTRIES, cfg.entries);
        if let Some(cq) = env_get_opt::<u32>(ENV_CQ_ENTRIES) {
            cfg = cfg.cq_entries(cq);
        }
        cfg.flags |= SetupFlags::from_raw(env_get_bits(ENV_SETUP_FLAGS, 0));
        cfg
    }

    /// Requested submission ring size.
    pub fn entries(mut self, n: u32) -> Self {
        self.entries = n;
        self
    }

    /// Explicit completion ring size. Sets `CQSIZE`.
    pub fn cq_entries(mut self, n: u32) -> Self {
        self.cq_entries = Some(n);
        self.flags |= SetupFlags::CQSIZE;
        self
    }

    /// Let the kernel cap oversize requests instead of failing them.
    pub fn clamp(mut self) -> Self {
        self.flags |= SetupFlags::CLAMP;
        self
    }

    /// Kernel-side submission polling thread, idle timeout in milliseconds.
    pub fn sqpoll(mut self, idle_ms: u32) -> Self {
        self.flags |= SetupFlags::SQPOLL;
        self.sq_thread_idle = idle_ms;
        self
    }

    /// Pin the polling thread. Only meaningful with `sqpoll`.
    pub fn sq_affinity(mut self, cpu: u32) -> Self {
        self.flags |= SetupFlags::SQ_AFF;
        self.sq_thread_cpu = cpu;
        self
    }

    /// Share the async worker backend of an existing session.
    pub fn attach_wq(mut self, fd: RawFd) -> Self {
        self.flags |= SetupFlags::ATTACH_WQ;
        // The kernel reads this field as an unsigned fd.
        self.wq_fd = fd as u32;
        self
    }

    /// OR in arbitrary flags, unknown bits included.
    pub fn flags(mut self, flags: SetupFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn requested_entries(&self) -> u32 {
        self.entries
    }

    pub fn setup_flags(&self) -> SetupFlags {
        self.flags
    }

    /// The block this config would hand to the kernel.
    pub fn params(&self) -> IoUringParams {
        let mut p = IoUringParams::with_flags(self.flags);
        if let Some(cq) = self.cq_entries {
            p.cq_entries = cq;
        }
        p.sq_thread_cpu = self.sq_thread_cpu;
        p.sq_thread_idle = self.sq_thread_idle;
        p.wq_fd = self.wq_fd;
        p
    }

    /// Create the session on the running kernel.
    pub fn establish(&self) -> Result<Established> {
        self.establish_with(&LinuxSyscalls)
    }

    pub fn establish_with<S>(&self, sys: &S) -> Result<Established>
    where
        S: RingSyscalls + ?Sized,
    {
        let mut params = self.params();
        let fd = setup_with(sys, self.entries, &mut params)?;
        Ok(Established { fd, params })
    }
}

/// A freshly created session and the block the kernel filled in.
///
/// Does not close `fd` on drop; wrap it in an `OwnedFd` to hand over
/// ownership.
#[derive(Debug, Clone, Copy)]
pub struct Established {
    pub fd: RawFd,
    pub params: IoUringParams,
}

impl Established {
    pub fn features(&self) -> FeatureFlags {
        self.params.features()
    }

    pub fn sq_entries(&self) -> u32 {
        self.params.sq_entries
    }

    pub fn cq_entries(&self) -> u32 {
        self.params.cq_entries
    }
}

// ============================================================================
// Tests
// ============================================================================
