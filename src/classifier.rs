//! Node Classifier: decides whether a candidate byte window is a catalog
//! leaf, an extent leaf, or neither — without trusting anything about where
//! it came from.
//!
//! Grounded on the inner record loop of `recover.cpp::scan`: walk records
//! forward from the start of the node, cross-check each advance against the
//! trailing record-offset table (walked backward), and stop at the first
//! record that doesn't fit either shape. `hfsplus::btree`'s node-descriptor
//! and offset-table handling is the Rust idiom this follows, generalized to
//! operate on an untrusted slice instead of a node already known to be well
//! formed.

use crate::decode::u16_be;
use crate::records::{
    self, CatalogEntry, ExtentOverflowEntry, NodeDescriptor, RECORD_TYPE_FILE,
    RECORD_TYPE_FILE_THREAD, RECORD_TYPE_FOLDER, RECORD_TYPE_FOLDER_THREAD,
};
use crate::warn;

/// What a buffer classified as, with every record collected along the way.
pub enum Classification {
    Catalog(Vec<CatalogEntry>),
    Extent(Vec<ExtentOverflowEntry>),
}

/// Maximum on-disk key length either tree will plausibly carry. Used only to
/// reject absurd key-length prefixes before any shape-specific parsing; real
/// trees report their own max key length in the B-tree header, but the
/// scavenger never trusts that header, so a generous constant stands in.
pub const MAX_PLAUSIBLE_KEY_LENGTH: u16 = 520;

enum RecordMatch {
    Catalog { entry: CatalogEntry, new_cursor: usize },
    Extent { entry: ExtentOverflowEntry, new_cursor: usize },
}

fn try_catalog_record(buf: &[u8], cursor: usize, key_length: u16) -> Option<RecordMatch> {
    let (key, _) = records::read_catalog_key(buf, cursor)?;
    let record_start = cursor + key_length as usize + 2;
    let record_type = u16_be(buf, record_start)?;

    let (entry, body_len) = match record_type {
        RECORD_TYPE_FOLDER => {
            let folder = records::read_catalog_folder_body(buf, record_start, key)?;
            (CatalogEntry::Folder(folder), records::CATALOG_FOLDER_BODY_LEN)
        }
        RECORD_TYPE_FILE => {
            let file = records::read_catalog_file_body(buf, record_start, key)?;
            (CatalogEntry::File(file), records::CATALOG_FILE_BODY_LEN)
        }
        RECORD_TYPE_FOLDER_THREAD | RECORD_TYPE_FILE_THREAD => {
            let name_length = records::read_catalog_thread_name_length(buf, record_start)?;
            (CatalogEntry::Thread, records::catalog_thread_body_len(name_length))
        }
        _ => return None,
    };

    let new_cursor = record_start.checked_add(body_len)?;
    if new_cursor > buf.len() {
        return None;
    }
    Some(RecordMatch::Catalog { entry, new_cursor })
}

fn try_extent_record(buf: &[u8], cursor: usize, key_length: u16) -> Option<RecordMatch> {
    if key_length as usize != records::EXTENT_KEY_BODY_LEN {
        return None;
    }
    let (file_id, start_block) = records::read_extent_key(buf, cursor)?;
    let record_start = cursor + records::EXTENT_KEY_TOTAL_LEN;
    let extents = records::read_extent_record(buf, record_start)?;
    let new_cursor = record_start.checked_add(records::EXTENT_RECORD_LEN)?;
    if new_cursor > buf.len() {
        return None;
    }
    Some(RecordMatch::Extent {
        entry: ExtentOverflowEntry {
            file_id,
            start_block,
            extents,
        },
        new_cursor,
    })
}

/// Classify one candidate node. `buf` is exactly `nodeSize` bytes (either
/// the catalog or extent node size — the caller tries both). Returns `None`
/// if nothing classified, both shapes classified (ambiguous — rejected per
/// SPEC_FULL.md §4.2), or a strict-mode cross-check failed.
pub fn classify_node(buf: &[u8], permissive: bool) -> Option<Classification> {
    let descriptor = NodeDescriptor::parse(buf)?;
    if !descriptor.is_leaf() && !permissive {
        return None;
    }

    let mut catalog_entries = Vec::new();
    let mut extent_entries = Vec::new();
    let mut cursor = records::NODE_DESCRIPTOR_LEN;
    let mut tail_cursor = buf.len();

    while cursor + 2 <= buf.len() {
        let key_length = match u16_be(buf, cursor) {
            Some(v) if v <= MAX_PLAUSIBLE_KEY_LENGTH => v,
            _ => break,
        };

        let matched = try_catalog_record(buf, cursor, key_length)
            .or_else(|| try_extent_record(buf, cursor, key_length));

        let (new_cursor, is_catalog) = match matched {
            Some(RecordMatch::Catalog { entry, new_cursor }) => {
                catalog_entries.push(entry);
                (new_cursor, true)
            }
            Some(RecordMatch::Extent { entry, new_cursor }) => {
                extent_entries.push(entry);
                (new_cursor, false)
            }
            None => break,
        };

        if tail_cursor >= 2 {
            tail_cursor -= 2;
            if let Some(expected) = u16_be(buf, tail_cursor) {
                if expected as usize != new_cursor {
                    if !permissive {
                        return None;
                    }
                    warn(format!(
                        "record-offset-table mismatch at cursor {new_cursor}, table says {expected}"
                    ));
                }
            }
        }

        cursor = new_cursor;
        let _ = is_catalog;
    }

    if catalog_entries.is_empty() && extent_entries.is_empty() {
        return None;
    }
    if !catalog_entries.is_empty() && !extent_entries.is_empty() {
        return None;
    }

    if !catalog_entries.is_empty() {
        Some(Classification::Catalog(catalog_entries))
    } else {
        Some(Classification::Extent(extent_entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_be16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    fn push_be32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    fn node_descriptor(num_records: u16) -> Vec<u8> {
        let mut buf = vec![0u8; records::NODE_DESCRIPTOR_LEN];
        buf[8] = 0xFFu8; // kind = -1 (leaf)
        buf[10..12].copy_from_slice(&num_records.to_be_bytes());
        buf
    }

    fn with_offsets(mut body: Vec<u8>, offsets: &[u16]) -> Vec<u8> {
        for &o in offsets {
            push_be16(&mut body, o);
        }
        body
    }

    fn folder_record(name: &str, parent_id: u32, folder_id: u32) -> Vec<u8> {
        let mut rec = Vec::new();
        push_be16(&mut rec, (name.len() * 2 + records::CATALOG_KEY_MIN_LEN) as u16);
        push_be32(&mut rec, parent_id);
        push_be16(&mut rec, name.len() as u16);
        for c in name.encode_utf16() {
            push_be16(&mut rec, c);
        }
        push_be16(&mut rec, records::RECORD_TYPE_FOLDER);
        rec.extend_from_slice(&[0u8; 2]); // flags
        push_be32(&mut rec, 0); // valence
        push_be32(&mut rec, folder_id);
        rec.extend_from_slice(&[0u8; 4 * 5]); // 5 dates
        rec.extend_from_slice(&[0u8; 16]); // bsd info
        rec.extend_from_slice(&[0u8; 32]); // user+finder info
        push_be32(&mut rec, 0); // text encoding
        push_be32(&mut rec, 0); // reserved
        rec
    }

    /// A thread record's key is looked up by CNID alone (empty name, the
    /// `ownerID` living in the key's `parentID` slot) while its body carries
    /// the item's real parent folder id and name.
    fn thread_record(record_type: u16, owner_id: u32, real_parent_id: u32, name: &str) -> Vec<u8> {
        let mut rec = Vec::new();
        push_be16(&mut rec, records::CATALOG_KEY_MIN_LEN as u16); // empty name: keyLength = 0*2+6
        push_be32(&mut rec, owner_id);
        push_be16(&mut rec, 0); // key name length

        push_be16(&mut rec, record_type);
        rec.extend_from_slice(&[0u8; 2]); // reserved
        push_be32(&mut rec, real_parent_id);
        push_be16(&mut rec, name.len() as u16);
        for c in name.encode_utf16() {
            push_be16(&mut rec, c);
        }
        rec
    }

    #[test]
    fn classifies_thread_record_with_correct_cursor_advance() {
        let mut buf = node_descriptor(1);
        let record_start = buf.len();
        let record = thread_record(records::RECORD_TYPE_FOLDER_THREAD, 16, 2, "docs");
        let cursor_after = record_start + record.len();
        buf.extend_from_slice(&record);
        buf = with_offsets(buf, &[cursor_after as u16]);

        match classify_node(&buf, false) {
            Some(Classification::Catalog(entries)) => {
                assert_eq!(entries.len(), 1);
                assert!(matches!(entries[0], CatalogEntry::Thread));
            }
            _ => panic!("expected catalog classification"),
        }
    }

    #[test]
    fn classifies_single_folder_node() {
        let mut buf = node_descriptor(1);
        let record_start = buf.len();
        let record = folder_record("docs", 2, 16);
        let cursor_after = record_start + record.len();
        buf.extend_from_slice(&record);
        buf = with_offsets(buf, &[cursor_after as u16]);

        match classify_node(&buf, false) {
            Some(Classification::Catalog(entries)) => {
                assert_eq!(entries.len(), 1);
                match &entries[0] {
                    CatalogEntry::Folder(f) => {
                        assert_eq!(f.folder_id, 16);
                        assert_eq!(f.key.node_name.to_str().unwrap(), "docs");
                    }
                    _ => panic!("expected folder entry"),
                }
            }
            _ => panic!("expected catalog classification"),
        }
    }

    #[test]
    fn rejects_garbage() {
        let buf = vec![0u8; 64];
        assert!(classify_node(&buf, false).is_none());
    }

    #[test]
    fn strict_mode_rejects_offset_mismatch() {
        let mut buf = node_descriptor(1);
        let record_start = buf.len();
        let record = folder_record("docs", 2, 16);
        let cursor_after = record_start + record.len();
        buf.extend_from_slice(&record);
        buf = with_offsets(buf, &[(cursor_after + 4) as u16]);

        assert!(classify_node(&buf, false).is_none());
        // permissive mode tolerates the mismatch and keeps the record
        assert!(classify_node(&buf, true).is_some());
    }

    /// A node where one record parses as catalog and a later one parses as
    /// extent must be rejected outright — the two trees never share a node.
    #[test]
    fn ambiguous_node_is_rejected() {
        let mut buf = node_descriptor(2);
        let record0_start = buf.len();
        let record0 = folder_record("docs", 2, 16);
        let cursor_after_record0 = record0_start + record0.len();
        buf.extend_from_slice(&record0);

        push_be16(&mut buf, records::EXTENT_KEY_BODY_LEN as u16);
        buf.push(records::FORK_TYPE_DATA);
        buf.push(0);
        push_be32(&mut buf, 17);
        push_be32(&mut buf, 8);
        buf.extend_from_slice(&[0u8; records::EXTENT_RECORD_LEN]);
        let cursor_after_record1 = cursor_after_record0 + records::EXTENT_KEY_TOTAL_LEN + records::EXTENT_RECORD_LEN;

        buf = with_offsets(buf, &[cursor_after_record1 as u16, cursor_after_record0 as u16]);

        assert!(classify_node(&buf, false).is_none());
        assert!(classify_node(&buf, true).is_none());
    }
}
