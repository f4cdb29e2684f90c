//! The raw kernel trap boundary.
//!
//! One method per syscall this layer issues. An implementor performs the
//! trap and reports either the non-negative return value or the positive
//! errno; it applies no policy of its own. Retry and error translation
//! live in the wrappers that are generic over this trait.
//!
//! # Implementors
//!
//! - `LinuxSyscalls` (ringsys-module): `libc::syscall` on the running kernel.
//! - Test doubles that script EINTR storms and failures.

use core::ffi::c_void;

use crate::params::IoUringParams;

/// Raw trap result: return value, or errno.
pub type RawResult = core::result::Result<i64, i32>;

pub trait RingSyscalls {
    /// `io_uring_setup(entries, params)`.
    ///
    /// # Safety
    /// `params` must point to a writable, properly aligned
    /// `IoUringParams` that nothing else touches during the call.
    unsafe fn io_uring_setup(&self, entries: u32, params: *mut IoUringParams) -> RawResult;

    /// `io_uring_register(fd, opcode, arg, nr_args)`.
    ///
    /// # Safety
    /// `arg`/`nr_args` must describe memory valid for whatever `opcode`
    /// makes the kernel read or write, for the duration of the call.
    unsafe fn io_uring_register(
        &self,
        fd: i32,
        opcode: u32,
        arg: *const c_void,
        nr_args: u32,
    ) -> RawResult;
}

impl<S: RingSyscalls + ?Sized> RingSyscalls for &S {
    #[inline]
    unsafe fn io_uring_setup(&self, entries: u32, params: *mut IoUringParams) -> RawResult {
        (**self).io_uring_setup(entries, params)
    }

    #[inline]
    unsafe fn io_uring_register(
        &self,
        fd: i32,
        opcode: u32,
        arg: *const c_void,
        nr_args: u32,
    ) -> RawResult {
        (**self).io_uring_register(fd, opcode, arg, nr_args)
    }
}
