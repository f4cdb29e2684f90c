//! # ringsys-core — io_uring ABI vocabulary
//!
//! Types shared by everything that talks to `io_uring_setup` and
//! `io_uring_register`. No syscalls are issued from this crate; the raw
//! trap sits behind the [`RingSyscalls`] trait and the default
//! implementation lives in `ringsys-module`.
//!
//! ## Modules
//!
//! - `abi` - syscall numbers, kernel sizing limits
//! - `flags` - `SetupFlags` (input) and `FeatureFlags` (output)
//! - `register_op` - register opcodes and the opaque `Payload`
//! - `params` - `io_uring_params` layout and byte codec
//! - `kernel` - `RingSyscalls` trap trait
//! - `error` - `RingError`
//! - `kprint` - leveled stderr logging macros
//! - `env` - `RINGSYS_*` environment helpers

pub mod abi;
pub mod flags;
pub mod register_op;
pub mod params;
pub mod kernel;
pub mod error;
pub mod kprint;
pub mod env;

pub use abi::{SYS_IO_URING_ENTER, SYS_IO_URING_REGISTER, SYS_IO_URING_SETUP};
pub use error::{RingError, RingOp, Result};
pub use flags::{FeatureFlags, SetupFlags};
pub use kernel::{RawResult, RingSyscalls};
pub use params::{CqRingOffsets, IoUringParams, SqRingOffsets};
pub use register_op::{Payload, RegisterOp};
