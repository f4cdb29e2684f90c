//! # ringsys-module — default io_uring setup/register implementation
//!
//! | Item              | Does                                                   |
//! |-------------------|--------------------------------------------------------|
//! | `LinuxSyscalls`   | raw traps via `libc::syscall`, errno via `nix`          |
//! | `setup`           | one `io_uring_setup`, never retried, write-back on Ok   |
//! | `register`        | `io_uring_register`, EINTR retried until it completes   |
//! | `SessionConfig`   | builder producing the params block, then `setup`        |
//!
//! Every wrapper has a `*_with` form generic over
//! [`ringsys_core::RingSyscalls`], so the policy can run against any trap.
//!
//! ```ignore
//! use ringsys_module::{register, RegisterOp, Payload, SessionConfig};
//!
//! let s = SessionConfig::new().entries(32).establish()?;
//! let efd: i32 = /* eventfd */;
//! unsafe { register(s.fd, RegisterOp::REGISTER_EVENTFD, Payload::from_ref(&efd))? };
//! ```

pub mod linux_syscalls;
pub mod setup;
pub mod register;
pub mod session;

#[cfg(test)]
mod testing;

pub use linux_syscalls::LinuxSyscalls;
pub use register::{register, register_with};
pub use session::{Established, SessionConfig};
pub use setup::{setup, setup_with};

pub use ringsys_core::{
    FeatureFlags, IoUringParams, Payload, RegisterOp, RingError, RingOp, SetupFlags,
};
