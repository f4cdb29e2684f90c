//! `io_uring_register` opcodes and the opaque argument payload.
//!
//! The opcode space is owned by the kernel and grows with every release,
//! so `RegisterOp` is an open newtype rather than an enum: any byte can be
//! carried, and the named constants are just the values we know about.
//! What the payload must look like for each opcode is not modelled here.

use core::ffi::c_void;
use core::fmt;
use core::marker::PhantomData;

/// Register sub-action selector (`opcode` argument).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RegisterOp(u8);

impl RegisterOp {
    pub const REGISTER_BUFFERS: Self = Self(0);
    pub const UNREGISTER_BUFFERS: Self = Self(1);
    pub const REGISTER_FILES: Self = Self(2);
    pub const UNREGISTER_FILES: Self = Self(3);
    pub const REGISTER_EVENTFD: Self = Self(4);
    pub const UNREGISTER_EVENTFD: Self = Self(5);
    pub const REGISTER_FILES_UPDATE: Self = Self(6);
    pub const REGISTER_EVENTFD_ASYNC: Self = Self(7);
    pub const REGISTER_PROBE: Self = Self(8);
    pub const REGISTER_PERSONALITY: Self = Self(9);
    pub const UNREGISTER_PERSONALITY: Self = Self(10);
    pub const REGISTER_RESTRICTIONS: Self = Self(11);
    pub const REGISTER_ENABLE_RINGS: Self = Self(12);
    // 5.13+
    pub const REGISTER_FILES2: Self = Self(13);
    pub const REGISTER_FILES_UPDATE2: Self = Self(14);
    pub const REGISTER_BUFFERS2: Self = Self(15);
    pub const REGISTER_BUFFERS_UPDATE: Self = Self(16);
    // 5.14+
    pub const REGISTER_IOWQ_AFF: Self = Self(17);
    pub const UNREGISTER_IOWQ_AFF: Self = Self(18);
    // 5.15+
    pub const REGISTER_IOWQ_MAX_WORKERS: Self = Self(19);
    // 5.18+
    pub const REGISTER_RING_FDS: Self = Self(20);
    pub const UNREGISTER_RING_FDS: Self = Self(21);
    // 5.19+
    pub const REGISTER_PBUF_RING: Self = Self(22);
    pub const UNREGISTER_PBUF_RING: Self = Self(23);
    // 6.0+
    pub const REGISTER_SYNC_CANCEL: Self = Self(24);
    pub const REGISTER_FILE_ALLOC_RANGE: Self = Self(25);
    // 6.8+
    pub const REGISTER_PBUF_STATUS: Self = Self(26);
    pub const REGISTER_NAPI: Self = Self(27);
    pub const UNREGISTER_NAPI: Self = Self(28);
    // 6.12+
    pub const REGISTER_CLOCK: Self = Self(29);

    /// Carry an opcode this vocabulary doesn't name.
    #[inline]
    pub const fn from_raw(code: u8) -> Self {
        Self(code)
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Kernel name of a known opcode, `None` for anything newer.
    pub const fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "REGISTER_BUFFERS",
            1 => "UNREGISTER_BUFFERS",
            2 => "REGISTER_FILES",
            3 => "UNREGISTER_FILES",
            4 => "REGISTER_EVENTFD",
            5 => "UNREGISTER_EVENTFD",
            6 => "REGISTER_FILES_UPDATE",
            7 => "REGISTER_EVENTFD_ASYNC",
            8 => "REGISTER_PROBE",
            9 => "REGISTER_PERSONALITY",
            10 => "UNREGISTER_PERSONALITY",
            11 => "REGISTER_RESTRICTIONS",
            12 => "REGISTER_ENABLE_RINGS",
            13 => "REGISTER_FILES2",
            14 => "REGISTER_FILES_UPDATE2",
            15 => "REGISTER_BUFFERS2",
            16 => "REGISTER_BUFFERS_UPDATE",
            17 => "REGISTER_IOWQ_AFF",
            18 => "UNREGISTER_IOWQ_AFF",
            19 => "REGISTER_IOWQ_MAX_WORKERS",
            20 => "REGISTER_RING_FDS",
            21 => "UNREGISTER_RING_FDS",
            22 => "REGISTER_PBUF_RING",
            23 => "UNREGISTER_PBUF_RING",
            24 => "REGISTER_SYNC_CANCEL",
            25 => "REGISTER_FILE_ALLOC_RANGE",
            26 => "REGISTER_PBUF_STATUS",
            27 => "REGISTER_NAPI",
            28 => "UNREGISTER_NAPI",
            29 => "REGISTER_CLOCK",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for RegisterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "RegisterOp({})", self.0),
        }
    }
}

impl From<u8> for RegisterOp {
    fn from(code: u8) -> Self {
        Self(code)
    }
}

/// Opcode-specific argument region: an address plus an element count.
///
/// The borrow ties the region to the data it was built from, so a
/// `Payload` built with [`from_ref`](Self::from_ref) or
/// [`from_slice`](Self::from_slice) cannot outlive or alias-mutate its
/// source while the call is outstanding. Pointers *inside* the region
/// (iovecs, probe buffers) are the caller's responsibility.
#[derive(Clone, Copy)]
pub struct Payload<'a> {
    ptr: *const c_void,
    nr_args: u32,
    _borrow: PhantomData<&'a ()>,
}

impl<'a> Payload<'a> {
    /// Null address, zero count (unregister-style opcodes).
    #[inline]
    pub const fn none() -> Self {
        Self { ptr: core::ptr::null(), nr_args: 0, _borrow: PhantomData }
    }

    /// A single argument object, `nr_args = 1`.
    #[inline]
    pub fn from_ref<T>(arg: &'a T) -> Self {
        Self { ptr: arg as *const T as *const c_void, nr_args: 1, _borrow: PhantomData }
    }

    /// An array of argument objects, `nr_args = args.len()`.
    ///
    /// Slices longer than `u32::MAX` elements are truncated in the count;
    /// the kernel rejects such sizes long before that.
    #[inline]
    pub fn from_slice<T>(args: &'a [T]) -> Self {
        let nr_args = u32::try_from(args.len()).unwrap_or(u32::MAX);
        Self { ptr: args.as_ptr() as *const c_void, nr_args, _borrow: PhantomData }
    }

    /// An in/out array the kernel writes back into, `nr_args = args.len()`
    /// (e.g. the two limits of `REGISTER_IOWQ_MAX_WORKERS`).
    #[inline]
    pub fn from_mut_slice<T>(args: &'a mut [T]) -> Self {
        let nr_args = u32::try_from(args.len()).unwrap_or(u32::MAX);
        Self { ptr: args.as_mut_ptr() as *const c_void, nr_args, _borrow: PhantomData }
    }

    /// Raw address and count. Some opcodes overload `nr_args` with a
    /// size or a flag word; this constructor carries it verbatim.
    ///
    /// # Safety
    /// `ptr` must stay valid for whatever the opcode makes the kernel
    /// read or write, for the duration of the register call.
    #[inline]
    pub const unsafe fn from_raw(ptr: *const c_void, nr_args: u32) -> Self {
        Self { ptr, nr_args, _borrow: PhantomData }
    }

    #[inline]
    pub const fn as_ptr(&self) -> *const c_void {
        self.ptr
    }

    #[inline]
    pub const fn nr_args(&self) -> u32 {
        self.nr_args
    }
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("ptr", &self.ptr)
            .field("nr_args", &self.nr_args)
            .finish()
    }
}
