//! On-disk record shapes for the Catalog and Extents Overflow trees, and the
//! fixed sizes the classifier needs to compute record boundaries.
//!
//! Field layouts are taken from `hfsplus::catalog` and `hfsplus::volume`
//! (themselves TN1150); what's new here is that every parser takes a plain
//! `&[u8]` window and a starting offset and returns `None` rather than
//! assuming the caller already validated the shape — the classifier is the
//! one thing in this crate allowed to look at garbage.

use std::ffi::OsString;

use crate::decode::{downcast_name, i8_at, u16_be, u32_be, u64_be, utf16be_units};

pub const CATALOG_KEY_MIN_LEN: usize = 6;
pub const MAX_NODE_NAME_UNITS: usize = 255;
pub const FIRST_USER_CNID: u32 = 16;

pub const RECORD_TYPE_FOLDER: u16 = 0x0001;
pub const RECORD_TYPE_FILE: u16 = 0x0002;
pub const RECORD_TYPE_FOLDER_THREAD: u16 = 0x0003;
pub const RECORD_TYPE_FILE_THREAD: u16 = 0x0004;

pub const NODE_DESCRIPTOR_LEN: usize = 14;
pub const NODE_KIND_LEAF: i8 = -1;

/// Fixed size of `HFSPlusCatalogFolder` on disk, record type included.
pub const CATALOG_FOLDER_BODY_LEN: usize = 88;
/// Fixed size of `HFSPlusCatalogFile` on disk, record type included.
pub const CATALOG_FILE_BODY_LEN: usize = 248;
/// Fixed portion of a catalog thread record, up to (not including) the name:
/// `sizeof(HFSPlusCatalogThread)` (520) minus `sizeof(HFSUniStr255)` (512).
pub const CATALOG_THREAD_FIXED_LEN: usize = 8;

/// `HFSPlusExtentKey` body after the 16-bit key-length prefix: forkType(1) +
/// pad(1) + fileID(4) + startBlock(4).
pub const EXTENT_KEY_BODY_LEN: usize = 10;
/// Total on-disk size of an extent key, length prefix included.
pub const EXTENT_KEY_TOTAL_LEN: usize = 2 + EXTENT_KEY_BODY_LEN;
/// Eight `HFSPlusExtentDescriptor` entries of 8 bytes each.
pub const EXTENT_RECORD_LEN: usize = 8 * 8;

pub const FORK_TYPE_DATA: u8 = 0x00;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtentDescriptor {
    pub start_block: u32,
    pub block_count: u32,
}

/// The node descriptor common to every B-tree node (TN1150, 14 bytes).
#[derive(Debug, Clone, Copy)]
pub struct NodeDescriptor {
    pub forward_link: u32,
    pub backward_link: u32,
    pub kind: i8,
    pub height: u8,
    pub num_records: u16,
}

impl NodeDescriptor {
    pub fn parse(buf: &[u8]) -> Option<NodeDescriptor> {
        Some(NodeDescriptor {
            forward_link: u32_be(buf, 0)?,
            backward_link: u32_be(buf, 4)?,
            kind: i8_at(buf, 8)?,
            height: *buf.get(9)?,
            num_records: u16_be(buf, 10)?,
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NODE_KIND_LEAF
    }
}

#[derive(Debug, Clone)]
pub struct CatalogKey {
    pub parent_id: u32,
    pub node_name: OsString,
}

#[derive(Debug, Clone)]
pub struct CatalogFolderEntry {
    pub key: CatalogKey,
    pub folder_id: u32,
}

#[derive(Debug, Clone)]
pub struct CatalogFileEntry {
    pub key: CatalogKey,
    pub file_id: u32,
    pub logical_size: u64,
    pub total_blocks: u32,
    pub extents: [ExtentDescriptor; 8],
}

/// A catalog record found by the classifier, tagged by the shape that
/// matched. Thread records are recognized (so the node still classifies)
/// but carry no payload the indexer needs — see SPEC_FULL.md §4.4.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    Folder(CatalogFolderEntry),
    File(CatalogFileEntry),
    Thread,
}

#[derive(Debug, Clone)]
pub struct ExtentOverflowEntry {
    pub file_id: u32,
    pub start_block: u32,
    pub extents: [ExtentDescriptor; 8],
}

/// Read a catalog key at `offset`, returning the key plus its on-disk
/// `keyLength` (the value of the 16-bit prefix, not counting the prefix
/// itself).
pub fn read_catalog_key(buf: &[u8], offset: usize) -> Option<(CatalogKey, u16)> {
    let key_length = u16_be(buf, offset)?;
    let parent_id = u32_be(buf, offset + 2)?;
    let name_length = u16_be(buf, offset + 6)? as usize;
    if name_length > MAX_NODE_NAME_UNITS {
        return None;
    }
    if key_length as usize != name_length * 2 + CATALOG_KEY_MIN_LEN {
        return None;
    }
    let units = utf16be_units(buf, offset + 8, name_length)?;
    Some((
        CatalogKey {
            parent_id,
            node_name: downcast_name(&units),
        },
        key_length,
    ))
}

fn read_extent_descriptor(buf: &[u8], offset: usize) -> Option<ExtentDescriptor> {
    Some(ExtentDescriptor {
        start_block: u32_be(buf, offset)?,
        block_count: u32_be(buf, offset + 4)?,
    })
}

fn read_eight_extents(buf: &[u8], offset: usize) -> Option<[ExtentDescriptor; 8]> {
    let mut extents = [ExtentDescriptor::default(); 8];
    for (i, slot) in extents.iter_mut().enumerate() {
        *slot = read_extent_descriptor(buf, offset + i * 8)?;
    }
    Some(extents)
}

/// Parse the fixed `HFSPlusCatalogFolder` body starting at `offset`
/// (pointing at the record-type field). Returns `None` only on a short
/// buffer; field values themselves are never validated here.
pub fn read_catalog_folder_body(buf: &[u8], offset: usize, key: CatalogKey) -> Option<CatalogFolderEntry> {
    if offset + CATALOG_FOLDER_BODY_LEN > buf.len() {
        return None;
    }
    let folder_id = u32_be(buf, offset + 8)?;
    Some(CatalogFolderEntry { key, folder_id })
}

/// Parse the fixed `HFSPlusCatalogFile` body starting at `offset`. The data
/// fork's logical size, total blocks, and up to 8 inline extents are all the
/// indexer needs; the resource fork and dates are read by nobody downstream
/// so they're skipped.
pub fn read_catalog_file_body(buf: &[u8], offset: usize, key: CatalogKey) -> Option<CatalogFileEntry> {
    if offset + CATALOG_FILE_BODY_LEN > buf.len() {
        return None;
    }
    let file_id = u32_be(buf, offset + 8)?;
    // data_fork starts after: recordType(2) flags(2) reserved1(4) fileID(4)
    // createDate(4) contentModDate(4) attrModDate(4) accessDate(4)
    // backupDate(4) permissions(16) userInfo(16) finderInfo(16)
    // textEncoding(4) reserved2(4) = 88 bytes.
    let data_fork_offset = offset + 88;
    let logical_size = u64_be(buf, data_fork_offset)?;
    let total_blocks = u32_be(buf, data_fork_offset + 12)?;
    let extents = read_eight_extents(buf, data_fork_offset + 16)?;
    Some(CatalogFileEntry {
        key,
        file_id,
        logical_size,
        total_blocks,
        extents,
    })
}

/// Compute the body length of a thread record given its name length, per
/// SPEC_FULL.md §4.2: the fixed header minus the inlined max-name
/// placeholder, plus room for the name and its trailing unit.
pub fn catalog_thread_body_len(thread_name_length: u16) -> usize {
    CATALOG_THREAD_FIXED_LEN + 2 * (thread_name_length as usize + 1)
}

/// Read just enough of a thread record to learn its body length; the name
/// itself isn't retained (thread records aren't stored by the indexer).
pub fn read_catalog_thread_name_length(buf: &[u8], offset: usize) -> Option<u16> {
    u16_be(buf, offset + 8)
}

/// Read an extent key at `offset`. Returns `None` unless `forkType` selects
/// the data fork (resource-fork extents are out of scope).
pub fn read_extent_key(buf: &[u8], offset: usize) -> Option<(u32, u32)> {
    let key_length = u16_be(buf, offset)?;
    if key_length as usize != EXTENT_KEY_BODY_LEN {
        return None;
    }
    let fork_type = *buf.get(offset + 2)?;
    if fork_type != FORK_TYPE_DATA {
        return None;
    }
    let file_id = u32_be(buf, offset + 4)?;
    let start_block = u32_be(buf, offset + 8)?;
    Some((file_id, start_block))
}

pub fn read_extent_record(buf: &[u8], offset: usize) -> Option<[ExtentDescriptor; 8]> {
    read_eight_extents(buf, offset)
}
