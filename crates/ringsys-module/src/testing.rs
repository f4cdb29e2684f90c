//! Test support: a scripted `RingSyscalls` fake and live-kernel helpers.

use core::cell::RefCell;
use core::ffi::c_void;
use std::collections::VecDeque;
use std::os::fd::{FromRawFd, OwnedFd};
use std::os::unix::io::RawFd;
use std::sync::{Mutex, MutexGuard};

use ringsys_core::flags::FeatureFlags;
use ringsys_core::kernel::{RawResult, RingSyscalls};
use ringsys_core::params::IoUringParams;

use crate::setup::setup;

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Ok(i64),
    Err(i32),
}

#[derive(Debug, Clone, Copy)]
pub struct RegisterCall {
    pub fd: i32,
    pub opcode: u32,
    pub arg: usize,
    pub nr_args: u32,
}

#[derive(Default)]
struct Log {
    setup: Vec<(u32, u32, u32)>,
    register: Vec<RegisterCall>,
}

/// Replays `script` one step per trap. Panics when it runs dry.
///
/// On a successful setup it fills the block the way a kernel would:
/// power-of-two SQ, CQ twice that (or the rounded `cq_entries` under
/// `CQSIZE`), nonzero offsets. On failure it scribbles over the block.
pub struct ScriptedSyscalls {
    script: RefCell<VecDeque<Step>>,
    log: RefCell<Log>,
}

impl ScriptedSyscalls {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            log: RefCell::new(Log::default()),
        }
    }

    fn next(&self) -> Step {
        self.script.borrow_mut().pop_front().expect("script exhausted")
    }

    pub fn setup_calls(&self) -> Vec<u32> {
        self.log.borrow().setup.iter().map(|c| c.0).collect()
    }

    pub fn seen_flags(&self) -> Vec<u32> {
        self.log.borrow().setup.iter().map(|c| c.1).collect()
    }

    pub fn seen_features(&self) -> Vec<u32> {
        self.log.borrow().setup.iter().map(|c| c.2).collect()
    }

    pub fn register_calls(&self) -> Vec<RegisterCall> {
        self.log.borrow().register.clone()
    }
}

impl RingSyscalls for ScriptedSyscalls {
    unsafe fn io_uring_setup(&self, entries: u32, params: *mut IoUringParams) -> RawResult {
        let p = &mut *params;
        self.log.borrow_mut().setup.push((entries, p.flags, p.features));

        match self.next() {
            Step::Ok(fd) => {
                let sq = entries.max(1).next_power_of_two();
                let cq = if p.setup_flags().contains(ringsys_core::SetupFlags::CQSIZE) {
                    p.cq_entries.next_power_of_two()
                } else {
                    sq * 2
                };
                p.sq_entries = sq;
                p.cq_entries = cq;
                p.features = (FeatureFlags::SINGLE_MMAP | FeatureFlags::NODROP).bits();
                p.sq_off.head = 0;
                p.sq_off.tail = 4;
                p.sq_off.ring_mask = 16;
                p.sq_off.ring_entries = 24;
                p.cq_off.tail = 68;
                p.cq_off.cqes = 128;
                Ok(fd)
            }
            Step::Err(errno) => {
                p.sq_entries = 0xdead;
                p.features = u32::MAX;
                p.sq_off.tail = 1;
                Err(errno)
            }
        }
    }

    unsafe fn io_uring_register(
        &self,
        fd: i32,
        opcode: u32,
        arg: *const c_void,
        nr_args: u32,
    ) -> RawResult {
        self.log.borrow_mut().register.push(RegisterCall {
            fd,
            opcode,
            arg: arg as usize,
            nr_args,
        });
        match self.next() {
            Step::Ok(v) => Ok(v),
            Step::Err(e) => Err(e),
        }
    }
}

static LIVE: Mutex<()> = Mutex::new(());

/// Serializes tests that open or close descriptors.
///
/// A test that closes a ring and then uses the stale number must not have
/// another thread reuse it in between.
pub fn live_lock() -> MutexGuard<'static, ()> {
    LIVE.lock().unwrap_or_else(|e| e.into_inner())
}

/// io_uring missing, disabled by sysctl, or filtered by seccomp.
pub fn unavailable(errno: i32) -> bool {
    matches!(errno, libc::ENOSYS | libc::EPERM | libc::EACCES)
}

/// Live setup; `None` (with a note on stderr) when io_uring is unavailable.
pub fn live_setup(entries: u32, params: &mut IoUringParams) -> Option<RawFd> {
    match setup(entries, params) {
        Ok(fd) => Some(fd),
        Err(e) if unavailable(e.errno()) => {
            eprintln!("skipping: io_uring unavailable ({})", e);
            None
        }
        Err(e) => panic!("io_uring_setup failed: {}", e),
    }
}

pub fn close(fd: RawFd) {
    drop(unsafe { OwnedFd::from_raw_fd(fd) });
}
