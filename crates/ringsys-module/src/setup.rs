//! Session establishment — `io_uring_setup(2)`.
//!
//! Exactly one trap per call. Setup is never retried: a failure here is a
//! property of the request or the kernel, not a transient interruption.
//!
//! The trap runs against a private copy of the caller's block, which is
//! written back only on success. A failed call leaves the caller's block
//! byte-for-byte as it was.

use std::os::unix::io::RawFd;

use ringsys_core::error::{RingError, Result};
use ringsys_core::kernel::RingSyscalls;
use ringsys_core::params::IoUringParams;
use ringsys_core::kdebug;

use crate::linux_syscalls::LinuxSyscalls;

/// Create a ring session on the running kernel.
///
/// `params` must have zeroed reserved words; flags are passed through
/// unchecked, and so is `entries` (zero or oversize requests come back as
/// the kernel's EINVAL). On success the returned handle is the only
/// reference to the session: closing it is the caller's job.
///
/// Under `REGISTERED_FD_ONLY` the handle is a registered ring index, not
/// a file descriptor.
pub fn setup(entries: u32, params: &mut IoUringParams) -> Result<RawFd> {
    setup_with(&LinuxSyscalls, entries, params)
}

/// [`setup`] against an arbitrary trap implementation.
pub fn setup_with<S>(sys: &S, entries: u32, params: &mut IoUringParams) -> Result<RawFd>
where
    S: RingSyscalls + ?Sized,
{
    let mut scratch = *params;

    // Safety: `scratch` is a live, aligned, exclusively borrowed block.
    let ret = unsafe { sys.io_uring_setup(entries, &mut scratch) };

    match ret {
        Ok(handle) => {
            let fd = RawFd::try_from(handle)
                .map_err(|_| RingError::setup(libc::EOVERFLOW))?;
            *params = scratch;
            kdebug!(
                "io_uring_setup(entries={}, flags={:#x}) = {} sq={} cq={} features={:#x}",
                entries, params.flags, fd, params.sq_entries, params.cq_entries, params.features
            );
            Ok(fd)
        }
        Err(errno) => {
            kdebug!(
                "io_uring_setup(entries={}, flags={:#x}) failed: errno {}",
                entries, params.flags, errno
            );
            Err(RingError::setup(errno))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedSyscalls, Step};
    use ringsys_core::error::RingOp;
    use ringsys_core::flags::{FeatureFlags, SetupFlags};

    #[test]
    fn success_writes_back_kernel_fields() {
        let sys = ScriptedSyscalls::new(vec![Step::Ok(7)]);
        let mut p = IoUringParams::new();
        let fd = setup_with(&sys, 6, &mut p).unwrap();

        assert_eq!(fd, 7);
        assert_eq!(p.sq_entries, 8, "fake rounds to a power of two");
        assert_eq!(p.cq_entries, 16);
        assert!(p.offsets_populated());
        assert!(p.features().contains(FeatureFlags::NODROP));
        assert_eq!(sys.setup_calls(), vec![6]);
    }

    #[test]
    fn failure_leaves_block_untouched() {
        let sys = ScriptedSyscalls::new(vec![Step::Err(libc::EINVAL)]);
        let mut p = IoUringParams::with_flags(SetupFlags::CQSIZE);
        p.cq_entries = 3;
        let before = p;

        let err = setup_with(&sys, 0, &mut p).unwrap_err();

        assert_eq!(err.op(), RingOp::Setup);
        assert_eq!(err.errno(), libc::EINVAL);
        // The fake scribbles over its block before failing.
        assert_eq!(p, before);
    }

    #[test]
    fn eintr_is_not_retried() {
        let sys = ScriptedSyscalls::new(vec![Step::Err(libc::EINTR), Step::Ok(3)]);
        let mut p = IoUringParams::new();
        let err = setup_with(&sys, 8, &mut p).unwrap_err();
        assert_eq!(err, RingError::setup(libc::EINTR));
        assert_eq!(sys.setup_calls().len(), 1);
    }

    #[test]
    fn flags_and_features_passed_verbatim() {
        let sys = ScriptedSyscalls::new(vec![Step::Ok(4)]);
        let raw = SetupFlags::SQPOLL.bits() | (1 << 28);
        let mut p = IoUringParams::with_flags(SetupFlags::from_raw(raw));
        p.features = 0xffff_ffff;
        setup_with(&sys, 8, &mut p).unwrap();
        assert_eq!(sys.seen_flags(), vec![raw]);
        assert_eq!(sys.seen_features(), vec![0xffff_ffff]);
    }

    #[test]
    fn oversized_handle_rejected() {
        let sys = ScriptedSyscalls::new(vec![Step::Ok(i64::from(i32::MAX) + 1)]);
        let mut p = IoUringParams::new();
        let before = p;
        let err = setup_with(&sys, 8, &mut p).unwrap_err();
        assert_eq!(err.errno(), libc::EOVERFLOW);
        assert_eq!(p, before);
    }

    // ── Live kernel ──

    use crate::testing::{close, live_lock, live_setup};
    use ringsys_core::abi::IORING_MAX_ENTRIES;

    #[test]
    fn live_round_trip() {
        let _guard = live_lock();
        let mut p = IoUringParams::new();
        let Some(fd) = live_setup(4, &mut p) else { return };

        assert!(fd >= 0);
        assert!(p.sq_entries >= 4 && p.sq_entries.is_power_of_two());
        assert!(p.cq_entries >= p.sq_entries);
        assert!(p.offsets_populated());
        assert!(p.reserved_is_zero());
        close(fd);
    }

    #[test]
    fn live_zero_entries_rejected() {
        let _guard = live_lock();
        let mut probe = IoUringParams::new();
        let Some(fd) = live_setup(1, &mut probe) else { return };
        close(fd);

        let mut p = IoUringParams::new();
        let err = setup(0, &mut p).unwrap_err();
        assert_eq!(err.op(), RingOp::Setup);
        assert_eq!(err.errno(), libc::EINVAL);
        assert_eq!(p, IoUringParams::new());
    }

    #[test]
    fn live_nonzero_reserved_rejected() {
        let _guard = live_lock();
        let mut probe = IoUringParams::new();
        let Some(fd) = live_setup(1, &mut probe) else { return };
        close(fd);

        let mut p = IoUringParams::new();
        p.resv[1] = 1;
        let err = setup(4, &mut p).unwrap_err();
        assert_eq!(err.errno(), libc::EINVAL);
    }

    #[test]
    fn live_oversize_fails_without_clamp() {
        let _guard = live_lock();
        let mut probe = IoUringParams::new();
        let Some(fd) = live_setup(1, &mut probe) else { return };
        close(fd);

        let mut p = IoUringParams::new();
        let err = setup(IORING_MAX_ENTRIES * 2, &mut p).unwrap_err();
        assert_eq!(err.errno(), libc::EINVAL);
    }

    #[test]
    fn live_independent_handles() {
        let _guard = live_lock();
        let mut a = IoUringParams::new();
        let Some(fa) = live_setup(2, &mut a) else { return };
        let mut b = IoUringParams::new();
        let fb = setup(2, &mut b).unwrap();
        assert_ne!(fa, fb);
        close(fa);
        close(fb);
    }
}
