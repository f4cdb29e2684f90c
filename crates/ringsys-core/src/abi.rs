//! io_uring syscall numbers and kernel sizing limits.
//!
//! Mirrors the `__NR_io_uring_*` values from `asm/unistd.h`. We define them
//! here rather than pulling in kernel headers. Every architecture on the
//! unified syscall table uses 425..427; MIPS offsets the table per ABI.

cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "mips", target_arch = "mips32r6"))] {
        // o32
        const SYSCALL_BASE: i64 = 4000;
    } else if #[cfg(all(
        any(target_arch = "mips64", target_arch = "mips64r6"),
        target_pointer_width = "32"
    ))] {
        // n32
        const SYSCALL_BASE: i64 = 6000;
    } else if #[cfg(any(target_arch = "mips64", target_arch = "mips64r6"))] {
        // n64
        const SYSCALL_BASE: i64 = 5000;
    } else {
        const SYSCALL_BASE: i64 = 0;
    }
}

// ── Syscall numbers ──

/// `io_uring_setup(entries, params)`
pub const SYS_IO_URING_SETUP: i64 = SYSCALL_BASE + 425;

/// `io_uring_enter(fd, to_submit, min_complete, flags, arg, argsz)`.
///
/// Only named here; the enter path belongs to the ring driver.
pub const SYS_IO_URING_ENTER: i64 = SYSCALL_BASE + 426;

/// `io_uring_register(fd, opcode, arg, nr_args)`
pub const SYS_IO_URING_REGISTER: i64 = SYSCALL_BASE + 427;

// ── Kernel sizing limits ──
//
// Not part of the UAPI header; these are the values `io_uring/io_uring.h`
// enforces. Without IORING_SETUP_CLAMP a larger request fails with EINVAL.

/// Largest SQ size the kernel accepts.
pub const IORING_MAX_ENTRIES: u32 = 32768;

/// Largest CQ size the kernel accepts (with IORING_SETUP_CQSIZE).
pub const IORING_MAX_CQ_ENTRIES: u32 = 2 * IORING_MAX_ENTRIES;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syscall_numbers_distinct_and_ordered() {
        assert_eq!(SYS_IO_URING_ENTER, SYS_IO_URING_SETUP + 1);
        assert_eq!(SYS_IO_URING_REGISTER, SYS_IO_URING_SETUP + 2);
    }

    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64"))]
    #[test]
    fn unified_table_values() {
        assert_eq!(SYS_IO_URING_SETUP, 425);
        assert_eq!(SYS_IO_URING_ENTER, 426);
        assert_eq!(SYS_IO_URING_REGISTER, 427);
    }

    #[test]
    fn cq_limit_is_twice_sq_limit() {
        assert_eq!(IORING_MAX_CQ_ENTRIES, 65536);
        assert!(IORING_MAX_ENTRIES.is_power_of_two());
    }
}
