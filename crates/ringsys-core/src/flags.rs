//! Setup-time configuration flags and kernel-reported feature flags.
//!
//! Both are 32-bit words in `io_uring_params`. Bit positions mirror
//! `IORING_SETUP_*` and `IORING_FEAT_*` from `linux/io_uring.h` exactly.
//!
//! This layer never validates flag combinations. Whatever the caller ORs
//! together is handed to the kernel verbatim, and the kernel decides.
//! Dependencies between flags are noted on the individual constants.

bitflags::bitflags! {
    /// `io_uring_params.flags` (input).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SetupFlags: u32 {
        /// Busy-poll for I/O completion instead of interrupt-driven
        /// completion. Files must support polling (O_DIRECT).
        const IOPOLL = 1 << 0;
        /// Kernel thread polls the SQ. Goes idle after `sq_thread_idle`
        /// milliseconds and sets `IORING_SQ_NEED_WAKEUP`.
        const SQPOLL = 1 << 1;
        /// Pin the SQ poll thread to `sq_thread_cpu`. Requires `SQPOLL`.
        const SQ_AFF = 1 << 2;
        /// Size the CQ from `cq_entries` instead of `2 * sq_entries`.
        const CQSIZE = 1 << 3;
        /// Clamp `sq_entries`/`cq_entries` to the kernel maximum instead of
        /// failing with EINVAL.
        const CLAMP = 1 << 4;
        /// Share the async worker backend of the ring in `wq_fd`.
        const ATTACH_WQ = 1 << 5;
        /// Start disabled. Restrictions may be registered; submission is
        /// refused until `REGISTER_ENABLE_RINGS`.
        const R_DISABLED = 1 << 6;
        /// Keep submitting the rest of a batch after one SQE fails.
        const SUBMIT_ALL = 1 << 7;
        /// Run task work at the next kernel transition instead of forcing
        /// an IPI into the submitter.
        const COOP_TASKRUN = 1 << 8;
        /// Set `IORING_SQ_TASKRUN` when task work is pending.
        const TASKRUN_FLAG = 1 << 9;
        /// 128-byte SQEs (5.19+).
        const SQE128 = 1 << 10;
        /// 32-byte CQEs (5.19+).
        const CQE32 = 1 << 11;
        /// Only one task submits. Violations fail with EEXIST (6.1+).
        const SINGLE_ISSUER = 1 << 12;
        /// Defer task work until the app waits with GETEVENTS.
        /// Requires `SINGLE_ISSUER` (6.1+).
        const DEFER_TASKRUN = 1 << 13;
        /// Rings live in caller-provided memory addressed through
        /// `sq_off.user_addr` / `cq_off.user_addr`. Mapping the ring fd
        /// afterwards fails (6.5+).
        const NO_MMAP = 1 << 14;
        /// Return a registered ring index instead of an fd.
        /// Requires `NO_MMAP` (6.5+).
        const REGISTERED_FD_ONLY = 1 << 15;
        /// SQ is indexed directly by tail; no SQ index array (6.6+).
        const NO_SQARRAY = 1 << 16;
        /// Hybrid IOPOLL: sleep before busy polling. Requires `IOPOLL` (6.13+).
        const HYBRID_IOPOLL = 1 << 17;
    }
}

bitflags::bitflags! {
    /// `io_uring_params.features` (output, written by the kernel).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureFlags: u32 {
        /// SQ and CQ rings share one mmap (5.4+).
        const SINGLE_MMAP = 1 << 0;
        /// Completions are never dropped; overflow is buffered (5.5+).
        const NODROP = 1 << 1;
        /// SQE data is consumed at submit time (5.5+).
        const SUBMIT_STABLE = 1 << 2;
        /// offset -1 means "current file position" (5.6+).
        const RW_CUR_POS = 1 << 3;
        /// Requests run with the credentials of the submitting task (5.6+).
        const CUR_PERSONALITY = 1 << 4;
        /// Internal poll drives readiness of retried requests (5.7+).
        const FAST_POLL = 1 << 5;
        /// 32-bit poll masks (5.9+).
        const POLL_32BITS = 1 << 6;
        /// SQPOLL works with non-registered files (5.11+).
        const SQPOLL_NONFIXED = 1 << 7;
        /// `io_uring_enter` accepts an extended argument (5.11+).
        const EXT_ARG = 1 << 8;
        /// Async workers are native threads (5.12+).
        const NATIVE_WORKERS = 1 << 9;
        /// Resource tags on registered buffers/files (5.13+).
        const RSRC_TAGS = 1 << 10;
        /// `IOSQE_CQE_SKIP_SUCCESS` supported (5.17+).
        const CQE_SKIP = 1 << 11;
        /// Linked requests resolve files at execution time (5.17+).
        const LINKED_FILE = 1 << 12;
        /// Registered ring fds usable with register (6.3+).
        const REG_REG_RING = 1 << 13;
        /// Bundled send/recv (6.10+).
        const RECVSEND_BUNDLE = 1 << 14;
        /// Minimum wait timeout (6.12+).
        const MIN_TIMEOUT = 1 << 15;
        /// Per-request read/write attributes (PI metadata) (6.14+).
        const RW_ATTR = 1 << 16;
        /// Waiting no longer counts as iowait by default (6.15+).
        const NO_IOWAIT = 1 << 17;
    }
}

impl SetupFlags {
    /// Wrap a raw `flags` word, keeping bits this vocabulary doesn't name.
    #[inline]
    pub const fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

impl FeatureFlags {
    /// Wrap the kernel's `features` word. Unknown future bits are kept.
    #[inline]
    pub const fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Bits set by the kernel that have no name here (newer kernel).
    #[inline]
    pub const fn unknown_bits(self) -> u32 {
        self.bits() & !Self::all().bits()
    }

    /// True if every reported bit is in the known vocabulary.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.unknown_bits() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_shift_values() {
        assert_eq!(SetupFlags::IOPOLL.bits(), 0x0000_0001);
        assert_eq!(SetupFlags::SQPOLL.bits(), 0x0000_0002);
        assert_eq!(SetupFlags::SQ_AFF.bits(), 0x0000_0004);
        assert_eq!(SetupFlags::CQSIZE.bits(), 0x0000_0008);
        assert_eq!(SetupFlags::CLAMP.bits(), 0x0000_0010);
        assert_eq!(SetupFlags::ATTACH_WQ.bits(), 0x0000_0020);
        assert_eq!(SetupFlags::R_DISABLED.bits(), 0x0000_0040);
        assert_eq!(SetupFlags::SUBMIT_ALL.bits(), 0x0000_0080);
        assert_eq!(SetupFlags::COOP_TASKRUN.bits(), 0x0000_0100);
        assert_eq!(SetupFlags::TASKRUN_FLAG.bits(), 0x0000_0200);
        assert_eq!(SetupFlags::SQE128.bits(), 0x0000_0400);
        assert_eq!(SetupFlags::CQE32.bits(), 0x0000_0800);
        assert_eq!(SetupFlags::SINGLE_ISSUER.bits(), 0x0000_1000);
        assert_eq!(SetupFlags::DEFER_TASKRUN.bits(), 0x0000_2000);
        assert_eq!(SetupFlags::NO_MMAP.bits(), 0x0000_4000);
        assert_eq!(SetupFlags::REGISTERED_FD_ONLY.bits(), 0x0000_8000);
        assert_eq!(SetupFlags::NO_SQARRAY.bits(), 0x0001_0000);
        assert_eq!(SetupFlags::HYBRID_IOPOLL.bits(), 0x0002_0000);
    }

    #[test]
    fn feature_shift_values() {
        assert_eq!(FeatureFlags::SINGLE_MMAP.bits(), 1 << 0);
        assert_eq!(FeatureFlags::NODROP.bits(), 1 << 1);
        assert_eq!(FeatureFlags::SUBMIT_STABLE.bits(), 1 << 2);
        assert_eq!(FeatureFlags::RW_CUR_POS.bits(), 1 << 3);
        assert_eq!(FeatureFlags::CUR_PERSONALITY.bits(), 1 << 4);
        assert_eq!(FeatureFlags::FAST_POLL.bits(), 1 << 5);
        assert_eq!(FeatureFlags::POLL_32BITS.bits(), 1 << 6);
        assert_eq!(FeatureFlags::SQPOLL_NONFIXED.bits(), 1 << 7);
        assert_eq!(FeatureFlags::EXT_ARG.bits(), 1 << 8);
        assert_eq!(FeatureFlags::MIN_TIMEOUT.bits(), 1 << 15);
        assert_eq!(FeatureFlags::RW_ATTR.bits(), 1 << 16);
        assert_eq!(FeatureFlags::NO_IOWAIT.bits(), 1 << 17);
    }

    #[test]
    fn current_kernel_features_all_named() {
        // A 6.18 kernel reports bits 0..=17.
        let f = FeatureFlags::from_raw(0x0003_ffff);
        assert!(f.is_known());
        assert_eq!(f.unknown_bits(), 0);
        assert_eq!(FeatureFlags::all().iter_names().count(), 18);
    }

    #[test]
    fn setup_bits_are_disjoint() {
        let mut seen = 0u32;
        for (_, flag) in SetupFlags::all().iter_names() {
            assert_eq!(flag.bits().count_ones(), 1);
            assert_eq!(seen & flag.bits(), 0);
            seen |= flag.bits();
        }
        assert_eq!(seen, SetupFlags::all().bits());
    }

    #[test]
    fn setup_flags_transported_verbatim() {
        // Unnamed high bit survives; no local validation.
        let raw = SetupFlags::SQPOLL.bits() | (1 << 30);
        let f = SetupFlags::from_raw(raw);
        assert_eq!(f.bits(), raw);
        assert!(f.contains(SetupFlags::SQPOLL));
    }

    #[test]
    fn feature_unknown_bits_passed_through() {
        let f = FeatureFlags::from_raw(FeatureFlags::NODROP.bits() | (1 << 29));
        assert!(f.contains(FeatureFlags::NODROP));
        assert_eq!(f.unknown_bits(), 1 << 29);
        assert!(!f.is_known());

        let g = FeatureFlags::SINGLE_MMAP | FeatureFlags::EXT_ARG;
        assert!(g.is_known());
        assert_eq!(g.unknown_bits(), 0);
    }
}
