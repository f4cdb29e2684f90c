//! `io_uring_params` — the block exchanged with the kernel at setup.
//!
//! Mirrors `struct io_uring_params`, `struct io_sqring_offsets` and
//! `struct io_cqring_offsets` from `linux/io_uring.h`. Field order is the
//! wire layout. Size and every offset are pinned by compile-time asserts
//! below; the byte codec in `to_bytes`/`from_bytes` is the only place that
//! spells out positions by hand.
//!
//! Input fields: `sq_entries`, `cq_entries` (with CQSIZE), `flags`,
//! `sq_thread_cpu` (with SQPOLL|SQ_AFF), `sq_thread_idle` (with SQPOLL),
//! `wq_fd` (with ATTACH_WQ). Everything else is written by the kernel on
//! success. On success the kernel also rewrites `sq_entries`/`cq_entries`
//! with the sizes it actually allocated (rounded up to a power of two, or
//! clamped under CLAMP).
//!
//! Reserved words are write-zero / read-ignore.

use core::mem::{align_of, offset_of, size_of};

use crate::flags::{FeatureFlags, SetupFlags};

/// Byte offsets of the SQ ring fields inside the ring mapping.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqRingOffsets {
    pub head: u32,
    pub tail: u32,
    pub ring_mask: u32,
    /// Offset of the entry-count word (not the count itself).
    pub ring_entries: u32,
    pub flags: u32,
    pub dropped: u32,
    /// Offset of the SQ index array. Zero under NO_SQARRAY.
    pub array: u32,
    /// Reserved.
    pub resv1: u32,
    /// Caller memory for the SQEs under NO_MMAP; reserved otherwise.
    pub user_addr: u64,
}

/// Byte offsets of the CQ ring fields inside the ring mapping.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CqRingOffsets {
    pub head: u32,
    pub tail: u32,
    pub ring_mask: u32,
    /// Offset of the entry-count word (not the count itself).
    pub ring_entries: u32,
    pub overflow: u32,
    /// Offset of the CQE array.
    pub cqes: u32,
    pub flags: u32,
    /// Reserved.
    pub resv1: u32,
    /// Caller memory for the rings under NO_MMAP; reserved otherwise.
    pub user_addr: u64,
}

/// Session parameter block passed by address to `io_uring_setup`.
///
/// Build one per setup call. The kernel keeps no reference to it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoUringParams {
    pub sq_entries: u32,
    pub cq_entries: u32,
    pub flags: u32,
    pub sq_thread_cpu: u32,
    pub sq_thread_idle: u32,
    /// Kernel-owned output.
    pub features: u32,
    pub wq_fd: u32,
    /// Must be zero; the kernel rejects the call otherwise.
    pub resv: [u32; 3],
    pub sq_off: SqRingOffsets,
    pub cq_off: CqRingOffsets,
}

/// Encoded size of `IoUringParams`.
pub const PARAMS_SIZE: usize = 120;

/// Encoded size of each ring offset block.
pub const RING_OFFSETS_SIZE: usize = 40;

// Field offsets matching the C struct layout in linux/io_uring.h.
mod offsets {
    pub const SQ_ENTRIES: usize = 0;
    pub const CQ_ENTRIES: usize = 4;
    pub const FLAGS: usize = 8;
    pub const SQ_THREAD_CPU: usize = 12;
    pub const SQ_THREAD_IDLE: usize = 16;
    pub const FEATURES: usize = 20;
    pub const WQ_FD: usize = 24;
    pub const RESV: usize = 28;
    pub const SQ_OFF: usize = 40;
    pub const CQ_OFF: usize = 80;

    // Within either ring offset block. Words 0..7 are u32 in declaration
    // order, then user_addr.
    pub const RING_WORDS: usize = 8;
    pub const RING_USER_ADDR: usize = 32;
}

// ── Layout pins ──

const _: () = {
    assert!(size_of::<SqRingOffsets>() == RING_OFFSETS_SIZE);
    assert!(size_of::<CqRingOffsets>() == RING_OFFSETS_SIZE);
    assert!(size_of::<IoUringParams>() == PARAMS_SIZE);
    assert!(align_of::<IoUringParams>() == 8);

    assert!(offset_of!(IoUringParams, sq_entries) == offsets::SQ_ENTRIES);
    assert!(offset_of!(IoUringParams, cq_entries) == offsets::CQ_ENTRIES);
    assert!(offset_of!(IoUringParams, flags) == offsets::FLAGS);
    assert!(offset_of!(IoUringParams, sq_thread_cpu) == offsets::SQ_THREAD_CPU);
    assert!(offset_of!(IoUringParams, sq_thread_idle) == offsets::SQ_THREAD_IDLE);
    assert!(offset_of!(IoUringParams, features) == offsets::FEATURES);
    assert!(offset_of!(IoUringParams, wq_fd) == offsets::WQ_FD);
    assert!(offset_of!(IoUringParams, resv) == offsets::RESV);
    assert!(offset_of!(IoUringParams, sq_off) == offsets::SQ_OFF);
    assert!(offset_of!(IoUringParams, cq_off) == offsets::CQ_OFF);

    assert!(offset_of!(SqRingOffsets, head) == 0);
    assert!(offset_of!(SqRingOffsets, array) == 24);
    assert!(offset_of!(SqRingOffsets, resv1) == 28);
    assert!(offset_of!(SqRingOffsets, user_addr) == offsets::RING_USER_ADDR);

    assert!(offset_of!(CqRingOffsets, overflow) == 16);
    assert!(offset_of!(CqRingOffsets, cqes) == 20);
    assert!(offset_of!(CqRingOffsets, flags) == 24);
    assert!(offset_of!(CqRingOffsets, user_addr) == offsets::RING_USER_ADDR);
};

impl IoUringParams {
    /// All-zero block: no flags, reserved words clear.
    #[inline]
    pub const fn new() -> Self {
        Self {
            sq_entries: 0,
            cq_entries: 0,
            flags: 0,
            sq_thread_cpu: 0,
            sq_thread_idle: 0,
            features: 0,
            wq_fd: 0,
            resv: [0; 3],
            sq_off: SqRingOffsets {
                head: 0, tail: 0, ring_mask: 0, ring_entries: 0,
                flags: 0, dropped: 0, array: 0, resv1: 0, user_addr: 0,
            },
            cq_off: CqRingOffsets {
                head: 0, tail: 0, ring_mask: 0, ring_entries: 0,
                overflow: 0, cqes: 0, flags: 0, resv1: 0, user_addr: 0,
            },
        }
    }

    /// Zeroed block carrying `flags`.
    #[inline]
    pub const fn with_flags(flags: SetupFlags) -> Self {
        let mut p = Self::new();
        p.flags = flags.bits();
        p
    }

    #[inline]
    pub const fn setup_flags(&self) -> SetupFlags {
        SetupFlags::from_raw(self.flags)
    }

    #[inline]
    pub fn set_setup_flags(&mut self, flags: SetupFlags) {
        self.flags = flags.bits();
    }

    #[inline]
    pub const fn features(&self) -> FeatureFlags {
        FeatureFlags::from_raw(self.features)
    }

    /// True if the words the kernel requires to be zero are zero.
    ///
    /// `user_addr` is not checked: it is an input under NO_MMAP.
    pub fn reserved_is_zero(&self) -> bool {
        self.resv == [0; 3] && self.sq_off.resv1 == 0 && self.cq_off.resv1 == 0
    }

    /// True once the kernel has filled in the ring offsets.
    ///
    /// `head` sits at offset 0 on every kernel, so the check looks at
    /// fields that can never be zero after a successful setup.
    pub fn offsets_populated(&self) -> bool {
        self.sq_off.tail != 0
            && self.sq_off.ring_mask != 0
            && self.cq_off.tail != 0
            && self.cq_off.cqes != 0
    }

    /// Encode to the kernel's byte image (native endianness).
    pub fn to_bytes(&self) -> [u8; PARAMS_SIZE] {
        let mut buf = [0u8; PARAMS_SIZE];
        put_u32(&mut buf, offsets::SQ_ENTRIES, self.sq_entries);
        put_u32(&mut buf, offsets::CQ_ENTRIES, self.cq_entries);
        put_u32(&mut buf, offsets::FLAGS, self.flags);
        put_u32(&mut buf, offsets::SQ_THREAD_CPU, self.sq_thread_cpu);
        put_u32(&mut buf, offsets::SQ_THREAD_IDLE, self.sq_thread_idle);
        put_u32(&mut buf, offsets::FEATURES, self.features);
        put_u32(&mut buf, offsets::WQ_FD, self.wq_fd);
        for (i, w) in self.resv.iter().enumerate() {
            put_u32(&mut buf, offsets::RESV + 4 * i, *w);
        }
        self.sq_off.encode(&mut buf[offsets::SQ_OFF..offsets::SQ_OFF + RING_OFFSETS_SIZE]);
        self.cq_off.encode(&mut buf[offsets::CQ_OFF..offsets::CQ_OFF + RING_OFFSETS_SIZE]);
        buf
    }

    /// Decode the kernel's byte image (native endianness).
    pub fn from_bytes(buf: &[u8; PARAMS_SIZE]) -> Self {
        Self {
            sq_entries: get_u32(buf, offsets::SQ_ENTRIES),
            cq_entries: get_u32(buf, offsets::CQ_ENTRIES),
            flags: get_u32(buf, offsets::FLAGS),
            sq_thread_cpu: get_u32(buf, offsets::SQ_THREAD_CPU),
            sq_thread_idle: get_u32(buf, offsets::SQ_THREAD_IDLE),
            features: get_u32(buf, offsets::FEATURES),
            wq_fd: get_u32(buf, offsets::WQ_FD),
            resv: [
                get_u32(buf, offsets::RESV),
                get_u32(buf, offsets::RESV + 4),
                get_u32(buf, offsets::RESV + 8),
            ],
            sq_off: SqRingOffsets::decode(&buf[offsets::SQ_OFF..offsets::SQ_OFF + RING_OFFSETS_SIZE]),
            cq_off: CqRingOffsets::decode(&buf[offsets::CQ_OFF..offsets::CQ_OFF + RING_OFFSETS_SIZE]),
        }
    }
}

impl SqRingOffsets {
    fn words(&self) -> [u32; offsets::RING_WORDS] {
        [
            self.head, self.tail, self.ring_mask, self.ring_entries,
            self.flags, self.dropped, self.array, self.resv1,
        ]
    }

    fn encode(&self, out: &mut [u8]) {
        encode_ring(out, &self.words(), self.user_addr);
    }

    fn decode(buf: &[u8]) -> Self {
        let (w, user_addr) = decode_ring(buf);
        Self {
            head: w[0], tail: w[1], ring_mask: w[2], ring_entries: w[3],
            flags: w[4], dropped: w[5], array: w[6], resv1: w[7],
            user_addr,
        }
    }
}

impl CqRingOffsets {
    fn words(&self) -> [u32; offsets::RING_WORDS] {
        [
            self.head, self.tail, self.ring_mask, self.ring_entries,
            self.overflow, self.cqes, self.flags, self.resv1,
        ]
    }

    fn encode(&self, out: &mut [u8]) {
        encode_ring(out, &self.words(), self.user_addr);
    }

    fn decode(buf: &[u8]) -> Self {
        let (w, user_addr) = decode_ring(buf);
        Self {
            head: w[0], tail: w[1], ring_mask: w[2], ring_entries: w[3],
            overflow: w[4], cqes: w[5], flags: w[6], resv1: w[7],
            user_addr,
        }
    }
}

// ── Byte helpers ──

#[inline]
fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_ne_bytes());
}

#[inline]
fn get_u32(buf: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    u32::from_ne_bytes(b)
}

fn encode_ring(out: &mut [u8], words: &[u32; offsets::RING_WORDS], user_addr: u64) {
    for (i, w) in words.iter().enumerate() {
        put_u32(out, 4 * i, *w);
    }
    out[offsets::RING_USER_ADDR..offsets::RING_USER_ADDR + 8]
        .copy_from_slice(&user_addr.to_ne_bytes());
}

fn decode_ring(buf: &[u8]) -> ([u32; offsets::RING_WORDS], u64) {
    let mut words = [0u32; offsets::RING_WORDS];
    for (i, w) in words.iter_mut().enumerate() {
        *w = get_u32(buf, 4 * i);
    }
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[offsets::RING_USER_ADDR..offsets::RING_USER_ADDR + 8]);
    (words, u64::from_ne_bytes(b))
}
