//! Bounds-checked big-endian readers over untrusted byte windows.
//!
//! Everything the classifier and record parsers touch comes from a scanned
//! buffer that may not contain a real HFS+ structure at all, so every read
//! here returns `None` on out-of-range access instead of panicking. This is
//! deliberately lower-level than `byteorder::ReadBytesExt` (used elsewhere
//! for the trusted, fixed-layout volume header): a `Cursor` would still need
//! the same length checks done up front, and doing the bounds check inline
//! keeps the classifier's hot loop allocation-free.

pub fn u16_be(buf: &[u8], offset: usize) -> Option<u16> {
    buf.get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
}

pub fn i8_at(buf: &[u8], offset: usize) -> Option<i8> {
    buf.get(offset).map(|&b| b as i8)
}

pub fn u32_be(buf: &[u8], offset: usize) -> Option<u32> {
    buf.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn u64_be(buf: &[u8], offset: usize) -> Option<u64> {
    buf.get(offset..offset + 8).map(|b| {
        let mut a = [0u8; 8];
        a.copy_from_slice(b);
        u64::from_be_bytes(a)
    })
}

/// Decode a run of on-disk UTF-16BE code units into a `Vec<u16>`.
pub fn utf16be_units(buf: &[u8], offset: usize, count: usize) -> Option<Vec<u16>> {
    let bytes = buf.get(offset..offset + count * 2)?;
    Some(
        bytes
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect(),
    )
}

/// Downcast each UTF-16 code unit to its low byte, matching `DecodeU16` in
/// the source tool: the byte is written straight into the path, not
/// transcoded through UTF-8. A Rust `String` can't hold that — any low byte
/// `>= 0x80` would get re-encoded as a two-byte UTF-8 sequence on disk,
/// producing a different filename than the source tool. Building an
/// `OsString` from the raw bytes keeps the path component byte-for-byte
/// identical to what the original writes.
pub fn downcast_name_bytes(units: &[u16]) -> Vec<u8> {
    units.iter().map(|&u| u as u8).collect()
}

#[cfg(unix)]
pub fn downcast_name(units: &[u16]) -> std::ffi::OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(&downcast_name_bytes(units)).to_os_string()
}

/// Off Unix there's no raw-bytes path representation, so fall back to a
/// lossy UTF-8 decode of the downcast bytes rather than losing the build.
#[cfg(not(unix))]
pub fn downcast_name(units: &[u16]) -> std::ffi::OsString {
    String::from_utf8_lossy(&downcast_name_bytes(units)).into_owned().into()
}
