//! sysctl bindings for named kernel properties.
//!
//! # Safety
//!
//! This module contains unsafe FFI code. All unsafe blocks are documented
//! with SAFETY comments explaining why they are sound.
//!
//! # Thread Safety
//!
//! `sysctlbyname` reads are safe to issue concurrently; no state is kept
//! between calls.

use std::ffi::CString;
use std::ptr;

/// Read the raw bytes of a named sysctl value.
///
/// Uses the two-call pattern: the first call reports the size, the second
/// fills a buffer of that size.
///
/// # Returns
///
/// - `Some(bytes)` with the value exactly as the kernel reported it
/// - `None` if the name is unknown, empty, or contains an interior NUL
pub fn read_by_name(name: &str) -> Option<Vec<u8>> {
    let name = CString::new(name).ok()?;
    let mut len: libc::size_t = 0;

    // SAFETY: name is a valid NUL-terminated C string. A null oldp with a
    // valid oldlenp asks the kernel for the value size only.
    let result = unsafe {
        libc::sysctlbyname(name.as_ptr(), ptr::null_mut(), &mut len, ptr::null_mut(), 0)
    };
    if result != 0 || len == 0 {
        return None;
    }

    let mut buffer = vec![0u8; len];

    // SAFETY: buffer is exactly `len` bytes and len tells the kernel its
    // capacity. The kernel writes at most `len` bytes and updates len.
    let result = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            buffer.as_mut_ptr().cast(),
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if result != 0 {
        return None;
    }

    buffer.truncate(len);
    Some(buffer)
}
