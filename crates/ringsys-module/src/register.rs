//! Session registration — `io_uring_register(2)`.
//!
//! A pure transport: opcode, address and count go to the kernel verbatim.
//! Some sub-actions block (e.g. waiting for in-flight requests to quiesce)
//! and can be interrupted by a signal. EINTR is retried immediately, with
//! no backoff and no bound, so a caller never sees an interruption as a
//! failure. Every other errno ends the call.
//!
//! There is no cancellation or timeout at this layer.

use std::os::unix::io::RawFd;

use nix::errno::Errno;
use ringsys_core::error::{RingError, Result};
use ringsys_core::kernel::RingSyscalls;
use ringsys_core::register_op::{Payload, RegisterOp};
use ringsys_core::{kdebug, ktrace};

use crate::linux_syscalls::LinuxSyscalls;

/// Apply a register sub-action to a live session.
///
/// Returns the kernel's non-negative result; its meaning depends on `op`
/// (zero for most, a new id for `REGISTER_PERSONALITY`, ...).
///
/// # Safety
/// `payload` must describe memory of the shape `op` expects, and every
/// pointer reachable from it must stay valid and unmoved until this call
/// returns. The kernel may read or write through them.
pub unsafe fn register(fd: RawFd, op: RegisterOp, payload: Payload<'_>) -> Result<u32> {
    register_with(&LinuxSyscalls, fd, op, payload)
}

/// [`register`] against an arbitrary trap implementation.
///
/// # Safety
/// Same contract as [`register`].
pub unsafe fn register_with<S>(
    sys: &S,
    fd: RawFd,
    op: RegisterOp,
    payload: Payload<'_>,
) -> Result<u32>
where
    S: RingSyscalls + ?Sized,
{
    let mut interrupted: u64 = 0;
    loop {
        let ret = sys.io_uring_register(
            fd,
            u32::from(op.raw()),
            payload.as_ptr(),
            payload.nr_args(),
        );
        match ret {
            Ok(value) => {
                if interrupted > 0 {
                    kdebug!("io_uring_register({:?}) done after {} EINTR", op, interrupted);
                }
                return u32::try_from(value).map_err(|_| RingError::register(libc::EOVERFLOW));
            }
            Err(errno) if errno == Errno::EINTR as i32 => {
                interrupted += 1;
                ktrace!("io_uring_register({:?}) interrupted, retrying", op);
            }
            Err(errno) => {
                kdebug!("io_uring_register(fd={}, {:?}) failed: errno {}", fd, op, errno);
                return Err(RingError::register(errno));
            }
        }
    }
}
