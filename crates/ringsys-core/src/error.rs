//! ringsys error types.
//!
//! Every failure carries the operation that failed and the raw errno the
//! kernel returned. This layer does not interpret the code; callers match
//! on [`RingError::errno`] to tell EINVAL from EPERM from ENOMEM.

use std::fmt;
use std::io;

/// Which boundary call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingOp {
    /// `io_uring_setup`
    Setup,
    /// `io_uring_register`
    Register,
}

impl RingOp {
    /// Kernel syscall name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setup => "io_uring_setup",
            Self::Register => "io_uring_register",
        }
    }
}

impl fmt::Display for RingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rejected setup or register call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingError {
    op: RingOp,
    errno: i32,
}

impl RingError {
    #[inline]
    pub const fn new(op: RingOp, errno: i32) -> Self {
        Self { op, errno }
    }

    #[inline]
    pub const fn setup(errno: i32) -> Self {
        Self::new(RingOp::Setup, errno)
    }

    #[inline]
    pub const fn register(errno: i32) -> Self {
        Self::new(RingOp::Register, errno)
    }

    /// The operation that failed.
    #[inline]
    pub const fn op(&self) -> RingOp {
        self.op
    }

    /// Raw OS error code (positive errno).
    #[inline]
    pub const fn errno(&self) -> i32 {
        self.errno
    }

    /// Symbolic errno name, or `None` outside the table.
    #[inline]
    pub fn errno_name(&self) -> Option<&'static str> {
        errno_name(self.errno)
    }
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match errno_name(self.errno) {
            Some(name) => write!(f, "{}: {} (errno {})", self.op, name, self.errno),
            None => write!(f, "{}: errno_{}", self.op, self.errno),
        }
    }
}

impl std::error::Error for RingError {}

impl From<RingError> for io::Error {
    /// Rebuild the OS error; the operation name is dropped.
    fn from(err: RingError) -> Self {
        io::Error::from_raw_os_error(err.errno)
    }
}

pub type Result<T> = std::result::Result<T, RingError>;

/// Names for the errnos setup and register actually produce (Linux values).
pub fn errno_name(errno: i32) -> Option<&'static str> {
    let name = match errno {
        1   => "EPERM",
        2   => "ENOENT",
        4   => "EINTR",
        5   => "EIO",
        6   => "ENXIO",
        9   => "EBADF",
        11  => "EAGAIN",
        12  => "ENOMEM",
        13  => "EACCES",
        14  => "EFAULT",
        16  => "EBUSY",
        17  => "EEXIST",
        22  => "EINVAL",
        23  => "ENFILE",
        24  => "EMFILE",
        28  => "ENOSPC",
        34  => "ERANGE",
        38  => "ENOSYS",
        75  => "EOVERFLOW",
        95  => "EOPNOTSUPP",
        _   => return None,
    };
    Some(name)
}
