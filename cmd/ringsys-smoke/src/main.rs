//! ringsys End-to-End Smoke Test
//!
//! Exercises the setup/register layer against the running kernel:
//!   Part A — Layout: params block size, field offsets, flag vocabulary
//!   Part B — Establishment: round trip, zero entries, strict vs clamp,
//!            concurrent independent handles
//!   Part C — Registration: eventfd register/unregister, io-wq limits,
//!            closed handle
//!   Part D — Cross-check: sizes, features and probe vs the io-uring crate
//!
//! Run: ./target/release/ringsys-smoke
//! (RINGSYS_LOG_LEVEL=debug shows every trap)

use ringsys_core::abi::IORING_MAX_ENTRIES;
use ringsys_core::env::{env_get_str, env_is_set};
use ringsys_core::kprint::{self, ENV_FLUSH_EPRINT, ENV_LOG_LEVEL};
use ringsys_core::{kerror, kinfo, kwarn};
use ringsys_core::params::{self, IoUringParams, PARAMS_SIZE, RING_OFFSETS_SIZE};
use ringsys_core::{FeatureFlags, Payload, RegisterOp, RingError, SetupFlags};

use ringsys_module::{register, setup, SessionConfig};

use crossbeam_queue::SegQueue;
use nix::sys::eventfd::{EfdFlags, EventFd};

use std::ffi::c_void;
use std::os::fd::{AsFd, AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::io::RawFd;
use std::sync::Arc;

// ── Test harness ──

struct TestRunner {
    total: usize,
    passed: usize,
    failed: usize,
}

const LINE: &str = "────────────────────────────────────────────────────────────";

impl TestRunner {
    fn new() -> Self {
        Self { total: 0, passed: 0, failed: 0 }
    }

    fn section(&self, name: &str) {
        println!("\n{}", LINE);
        println!("  {}", name);
        println!("{}", LINE);
    }

    fn pass(&mut self, name: &str) {
        self.total += 1;
        self.passed += 1;
        println!("  [{:2}] {:<52} PASS", self.total, name);
    }

    fn fail(&mut self, name: &str, reason: &str) {
        self.total += 1;
        self.failed += 1;
        println!("  [{:2}] {:<52} FAIL: {}", self.total, name, reason);
    }

    fn check(&mut self, name: &str, ok: bool, reason: &str) {
        if ok { self.pass(name); } else { self.fail(name, reason); }
    }

    fn summary(&self) {
        println!("\n{}", LINE);
        println!(
            "  Total: {}  Passed: {}  Failed: {}",
            self.total, self.passed, self.failed
        );
        println!("{}", LINE);
    }
}

fn close(fd: RawFd) {
    drop(unsafe { OwnedFd::from_raw_fd(fd) });
}

fn unavailable(e: &RingError) -> bool {
    matches!(e.errno(), libc::ENOSYS | libc::EPERM | libc::EACCES)
}

// ════════════════════════════════════════════════════════════
// Part A: Layout
// ════════════════════════════════════════════════════════════

fn test_layout(t: &mut TestRunner) {
    t.section("Part A: Layout");

    let size = std::mem::size_of::<IoUringParams>();
    t.check("sizeof(io_uring_params) == 120", size == PARAMS_SIZE, &format!("got {}", size));
    t.check(
        "sizeof(ring offsets) == 40",
        std::mem::size_of::<params::SqRingOffsets>() == RING_OFFSETS_SIZE
            && std::mem::size_of::<params::CqRingOffsets>() == RING_OFFSETS_SIZE,
        "offset block size mismatch",
    );
    t.check(
        "sq_off at 40, cq_off at 80",
        std::mem::offset_of!(IoUringParams, sq_off) == 40
            && std::mem::offset_of!(IoUringParams, cq_off) == 80,
        "offset mismatch",
    );

    let mut p = IoUringParams::with_flags(SetupFlags::CQSIZE | SetupFlags::CLAMP);
    p.cq_entries = 1024;
    let back = IoUringParams::from_bytes(&p.to_bytes());
    t.check("byte codec preserves block", back == p, "decoded block differs");
    t.check("fresh block reserved words zero", IoUringParams::new().reserved_is_zero(), "resv dirty");

    let setup_names = SetupFlags::all().iter_names().count();
    t.check("setup flag vocabulary (18 bits)", setup_names == 18, &format!("got {}", setup_names));
    let feat_names = FeatureFlags::all().iter_names().count();
    t.check("feature flag vocabulary (18 bits)", feat_names == 18, &format!("got {}", feat_names));
    t.check(
        "REGISTER_CLOCK is opcode 29",
        RegisterOp::REGISTER_CLOCK.raw() == 29 && RegisterOp::REGISTER_CLOCK.name().is_some(),
        "opcode table off",
    );
}

// ════════════════════════════════════════════════════════════
// Part B: Establishment
// ════════════════════════════════════════════════════════════

/// Returns a live ring for Part C, or None if io_uring is unavailable.
fn test_setup(t: &mut TestRunner) -> Option<RawFd> {
    t.section("Part B: Establishment (io_uring_setup)");

    // B1: round trip
    let mut p = IoUringParams::new();
    let fd = match setup(4, &mut p) {
        Ok(fd) => { t.pass("setup(4) round trip"); fd }
        Err(e) if unavailable(&e) => {
            kwarn!("io_uring unavailable: {}", e);
            t.fail("setup(4) round trip", &format!("{} (io_uring disabled?)", e));
            println!("       Skipping kernel tests.");
            return None;
        }
        Err(e) => {
            t.fail("setup(4) round trip", &e.to_string());
            return None;
        }
    };
    t.check(
        "sq_entries power of two >= 4",
        p.sq_entries >= 4 && p.sq_entries.is_power_of_two(),
        &format!("sq_entries={}", p.sq_entries),
    );
    t.check("cq_entries >= sq_entries", p.cq_entries >= p.sq_entries, &format!("cq={}", p.cq_entries));
    t.check("offsets populated", p.offsets_populated(), "sq_off/cq_off left zero");
    let feats = p.features();
    println!(
        "       features={:#06x} unknown={:#x} ({:?})",
        feats.bits(), feats.unknown_bits(), feats
    );
    t.check("features reported", !feats.is_empty(), "features word is zero");

    // B2: zero entries
    let mut z = IoUringParams::new();
    match setup(0, &mut z) {
        Ok(fd) => { close(fd); t.fail("setup(0) rejected", "kernel accepted 0 entries"); }
        Err(e) => t.check(
            "setup(0) rejected with EINVAL",
            e.errno() == libc::EINVAL && z == IoUringParams::new(),
            &e.to_string(),
        ),
    }

    // B3: oversize without clamp
    let mut big = IoUringParams::new();
    match setup(IORING_MAX_ENTRIES * 2, &mut big) {
        Ok(fd) => { close(fd); t.fail("oversize without CLAMP rejected", "accepted"); }
        Err(e) => t.check("oversize without CLAMP rejected", e.errno() == libc::EINVAL, &e.to_string()),
    }

    // B4: oversize with clamp
    match SessionConfig::new().entries(IORING_MAX_ENTRIES * 2).clamp().establish() {
        Ok(s) => {
            t.check(
                "oversize with CLAMP capped",
                s.sq_entries() == IORING_MAX_ENTRIES,
                &format!("sq_entries={}", s.sq_entries()),
            );
            close(s.fd);
        }
        Err(e) if e.errno() == libc::ENOMEM => t.pass("oversize with CLAMP (ENOMEM, memlock)"),
        Err(e) => t.fail("oversize with CLAMP capped", &e.to_string()),
    }

    // B5: concurrent independent handles
    let results: Arc<SegQueue<Result<RawFd, RingError>>> = Arc::new(SegQueue::new());
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let results = Arc::clone(&results);
            std::thread::spawn(move || {
                let mut p = IoUringParams::new();
                results.push(setup(8, &mut p));
            })
        })
        .collect();
    for h in threads {
        let _ = h.join();
    }
    let mut fds = Vec::new();
    let mut errors = Vec::new();
    while let Some(r) = results.pop() {
        match r {
            Ok(fd) => fds.push(fd),
            Err(e) => errors.push(e),
        }
    }
    let mut distinct = fds.clone();
    distinct.sort_unstable();
    distinct.dedup();
    t.check(
        "8 concurrent setups, distinct handles",
        errors.is_empty() && distinct.len() == 8,
        &format!("ok={} distinct={} errors={:?}", fds.len(), distinct.len(), errors),
    );
    for fd in fds {
        close(fd);
    }

    Some(fd)
}

// ════════════════════════════════════════════════════════════
// Part C: Registration
// ════════════════════════════════════════════════════════════

fn test_register(t: &mut TestRunner, ring: RawFd) {
    t.section("Part C: Registration (io_uring_register)");

    let efd = match EventFd::from_flags(EfdFlags::EFD_CLOEXEC | EfdFlags::EFD_NONBLOCK) {
        Ok(e) => e,
        Err(e) => {
            t.fail("eventfd()", &e.to_string());
            return;
        }
    };
    let raw = efd.as_fd().as_raw_fd();

    let r = unsafe { register(ring, RegisterOp::REGISTER_EVENTFD, Payload::from_ref(&raw)) };
    t.check("REGISTER_EVENTFD", r == Ok(0), &format!("{:?}", r));

    let r = unsafe { register(ring, RegisterOp::REGISTER_EVENTFD, Payload::from_ref(&raw)) };
    t.check(
        "second REGISTER_EVENTFD -> EBUSY",
        matches!(r, Err(e) if e.errno() == libc::EBUSY),
        &format!("{:?}", r),
    );

    let r = unsafe { register(ring, RegisterOp::UNREGISTER_EVENTFD, Payload::none()) };
    t.check("UNREGISTER_EVENTFD", r == Ok(0), &format!("{:?}", r));

    // Zeros query the current io-wq limits; the kernel writes them back.
    let mut limits = [0u32; 2];
    let r = unsafe {
        register(ring, RegisterOp::REGISTER_IOWQ_MAX_WORKERS, Payload::from_mut_slice(&mut limits))
    };
    match r {
        Ok(_) => {
            kinfo!("io-wq limits: bounded={} unbounded={}", limits[0], limits[1]);
            t.pass("REGISTER_IOWQ_MAX_WORKERS query");
        }
        Err(e) if e.errno() == libc::EINVAL => t.pass("REGISTER_IOWQ_MAX_WORKERS (pre-5.15, EINVAL)"),
        Err(e) => t.fail("REGISTER_IOWQ_MAX_WORKERS query", &e.to_string()),
    }

    let r = unsafe { register(ring, RegisterOp::from_raw(250), Payload::none()) };
    t.check(
        "unknown opcode -> EINVAL",
        matches!(r, Err(e) if e.errno() == libc::EINVAL),
        &format!("{:?}", r),
    );

    // Closed handle: a fresh ring, closed before use.
    let mut p = IoUringParams::new();
    match setup(2, &mut p) {
        Ok(dead) => {
            close(dead);
            let r = unsafe { register(dead, RegisterOp::UNREGISTER_EVENTFD, Payload::none()) };
            t.check(
                "register on closed handle -> EBADF",
                matches!(r, Err(e) if e.errno() == libc::EBADF),
                &format!("{:?}", r),
            );
        }
        Err(e) => t.fail("register on closed handle -> EBADF", &e.to_string()),
    }
}

// ════════════════════════════════════════════════════════════
// Part D: Cross-check against the io-uring crate
// ════════════════════════════════════════════════════════════

/// `io_uring_probe` header is 16 bytes, each op entry 8 bytes.
const PROBE_OPS: usize = 256;
const PROBE_OP_SUPPORTED: u16 = 1 << 0;

fn test_crosscheck(t: &mut TestRunner, ring: RawFd) {
    t.section("Part D: Cross-check vs io-uring crate");

    let other = match io_uring::IoUring::new(8) {
        Ok(r) => r,
        Err(e) => {
            t.fail("io_uring::IoUring::new(8)", &e.to_string());
            return;
        }
    };
    let theirs = other.params();

    let mut ours = IoUringParams::new();
    let fd = match setup(8, &mut ours) {
        Ok(fd) => fd,
        Err(e) => {
            t.fail("setup(8)", &e.to_string());
            return;
        }
    };
    close(fd);

    t.check(
        "sq/cq sizes agree",
        ours.sq_entries == theirs.sq_entries() && ours.cq_entries == theirs.cq_entries(),
        &format!(
            "ours {}/{} theirs {}/{}",
            ours.sq_entries, ours.cq_entries, theirs.sq_entries(), theirs.cq_entries()
        ),
    );

    let f = ours.features();
    let pairs = [
        ("SINGLE_MMAP", f.contains(FeatureFlags::SINGLE_MMAP), theirs.is_feature_single_mmap()),
        ("NODROP", f.contains(FeatureFlags::NODROP), theirs.is_feature_nodrop()),
        ("SUBMIT_STABLE", f.contains(FeatureFlags::SUBMIT_STABLE), theirs.is_feature_submit_stable()),
        ("RW_CUR_POS", f.contains(FeatureFlags::RW_CUR_POS), theirs.is_feature_rw_cur_pos()),
        ("CUR_PERSONALITY", f.contains(FeatureFlags::CUR_PERSONALITY), theirs.is_feature_cur_personality()),
        ("FAST_POLL", f.contains(FeatureFlags::FAST_POLL), theirs.is_feature_fast_poll()),
        ("POLL_32BITS", f.contains(FeatureFlags::POLL_32BITS), theirs.is_feature_poll_32bits()),
        ("SQPOLL_NONFIXED", f.contains(FeatureFlags::SQPOLL_NONFIXED), theirs.is_feature_sqpoll_nonfixed()),
        ("EXT_ARG", f.contains(FeatureFlags::EXT_ARG), theirs.is_feature_ext_arg()),
        ("NATIVE_WORKERS", f.contains(FeatureFlags::NATIVE_WORKERS), theirs.is_feature_native_workers()),
    ];
    let mismatched: Vec<&str> = pairs.iter().filter(|p| p.1 != p.2).map(|p| p.0).collect();
    t.check("feature bits agree", mismatched.is_empty(), &format!("differ: {:?}", mismatched));

    // REGISTER_PROBE through the raw layer vs the crate's probe.
    let mut buf = vec![0u64; 2 + PROBE_OPS];
    let r = unsafe {
        register(
            ring,
            RegisterOp::REGISTER_PROBE,
            Payload::from_raw(buf.as_mut_ptr() as *const c_void, PROBE_OPS as u32),
        )
    };
    if let Err(e) = r {
        t.fail("REGISTER_PROBE", &e.to_string());
        return;
    }
    t.pass("REGISTER_PROBE");

    let mut probe = io_uring::Probe::new();
    if let Err(e) = other.submitter().register_probe(&mut probe) {
        t.fail("io-uring register_probe", &e.to_string());
        return;
    }

    let bytes: Vec<u8> = buf.iter().flat_map(|w| w.to_ne_bytes()).collect();
    let last_op = bytes[0];
    let supported = |op: u8| {
        let at = 16 + 8 * op as usize + 2;
        u16::from_ne_bytes([bytes[at], bytes[at + 1]]) & PROBE_OP_SUPPORTED != 0
    };
    let differ: Vec<u8> = (0..=last_op)
        .filter(|&op| supported(op) != probe.is_supported(op))
        .collect();
    println!("       last_op={} supported={}", last_op, (0..=last_op).filter(|&op| supported(op)).count());
    t.check("probe opcodes agree", differ.is_empty(), &format!("differ: {:?}", differ));
}

fn main() {
    kprint::init();
    // Keep stderr log lines in step with the stdout report.
    if !env_is_set(ENV_FLUSH_EPRINT) {
        kprint::set_flush_enabled(true);
    }

    println!("=== ringsys End-to-End Smoke Test ===");
    let kver = std::fs::read_to_string("/proc/version").unwrap_or_default();
    println!("    kernel: {}", kver.trim().split(' ').nth(2).unwrap_or("?"));

    kinfo!("log level {}", env_get_str(ENV_LOG_LEVEL, "info"));

    let mut t = TestRunner::new();

    test_layout(&mut t);

    if let Some(ring) = test_setup(&mut t) {
        test_register(&mut t, ring);
        test_crosscheck(&mut t, ring);
        close(ring);
    }

    t.summary();
    if t.failed > 0 {
        kerror!("{} of {} checks failed", t.failed, t.total);
    }
    std::process::exit(if t.failed > 0 { 1 } else { 0 });
}
