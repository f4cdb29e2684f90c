//! `LinuxSyscalls` — default `RingSyscalls` implementation.
//!
//! Issues the traps with `libc::syscall` using the numbers from
//! `ringsys_core::abi` and reads errno through `nix`. No policy here:
//! one call in, one raw result out.

use core::ffi::c_void;

use nix::errno::Errno;
use ringsys_core::abi::{SYS_IO_URING_REGISTER, SYS_IO_URING_SETUP};
use ringsys_core::kernel::{RawResult, RingSyscalls};
use ringsys_core::params::IoUringParams;

/// The running kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxSyscalls;

#[inline]
fn to_raw(ret: libc::c_long) -> RawResult {
    Errno::result(ret).map(i64::from).map_err(|e| e as i32)
}

impl RingSyscalls for LinuxSyscalls {
    unsafe fn io_uring_setup(&self, entries: u32, params: *mut IoUringParams) -> RawResult {
        let ret = libc::syscall(
            SYS_IO_URING_SETUP as libc::c_long,
            entries as libc::c_uint,
            params,
        );
        to_raw(ret)
    }

    unsafe fn io_uring_register(
        &self,
        fd: i32,
        opcode: u32,
        arg: *const c_void,
        nr_args: u32,
    ) -> RawResult {
        let ret = libc::syscall(
            SYS_IO_URING_REGISTER as libc::c_long,
            fd as libc::c_int,
            opcode as libc::c_uint,
            arg,
            nr_args as libc::c_uint,
        );
        to_raw(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn numbers_match_libc() {
        assert_eq!(SYS_IO_URING_SETUP, libc::SYS_io_uring_setup as i64);
        assert_eq!(ringsys_core::abi::SYS_IO_URING_ENTER, libc::SYS_io_uring_enter as i64);
        assert_eq!(SYS_IO_URING_REGISTER, libc::SYS_io_uring_register as i64);
    }

    #[test]
    fn to_raw_maps_sentinel_to_errno() {
        Errno::set_raw(libc::EBADF);
        assert_eq!(to_raw(-1), Err(libc::EBADF));
        assert_eq!(to_raw(5), Ok(5));
        assert_eq!(to_raw(0), Ok(0));
    }

    #[test]
    fn register_on_non_ring_fd_is_rejected() {
        let _guard = crate::testing::live_lock();
        let file = std::fs::File::open("/dev/null").expect("open /dev/null");
        let fd = std::os::fd::AsRawFd::as_raw_fd(&file);

        let r = unsafe {
            LinuxSyscalls.io_uring_register(fd, 5, core::ptr::null(), 0)
        };
        match r {
            Err(e) => assert!(
                e == libc::EOPNOTSUPP || e == libc::ENOSYS || e == libc::EPERM,
                "unexpected errno {}", e
            ),
            Ok(v) => panic!("register on /dev/null succeeded with {}", v),
        }
    }

    #[test]
    fn register_on_minus_one() {
        // From 6.13, fd -1 selects ring-less ("blind") registration; opcode 0
        // is not a blind opcode and comes back EINVAL. Older kernels say EBADF.
        let r = unsafe {
            LinuxSyscalls.io_uring_register(-1, 0, core::ptr::null(), 0)
        };
        match r {
            Err(e) => assert!(
                matches!(e, libc::EBADF | libc::EINVAL | libc::ENOSYS | libc::EPERM),
                "unexpected errno {}", e
            ),
            Ok(v) => panic!("register on fd -1 succeeded with {}", v),
        }
    }
}
