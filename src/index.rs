//! Indexer: turns classified records into the three in-memory indices the
//! rest of the pipeline reads. Grounded on `recover.cpp`'s two `index()`
//! overloads (one per catalog key type) and the extent-key overload.

use std::collections::HashMap;
use std::ffi::OsString;

use crate::records::{CatalogEntry, ExtentDescriptor, ExtentOverflowEntry};
use crate::warn;

#[derive(Debug, Clone)]
pub struct FolderInfo {
    pub name: OsString,
    pub parent_id: u32,
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: OsString,
    pub parent_id: u32,
    pub file_id: u32,
    pub logical_size: u64,
    pub total_blocks: u32,
    pub found_blocks: u32,
    pub extents: Vec<ExtentDescriptor>,
}

/// Composite overflow-map key: `(fileID, startBlock)`. A plain tuple already
/// satisfies SPEC_FULL.md's only requirements (equality-by-value,
/// hashability); there's no need for a packed 64-bit encoding in Rust.
pub type OverflowKey = (u32, u32);

#[derive(Default)]
pub struct Indexer {
    pub folders: HashMap<u32, FolderInfo>,
    pub files: Vec<FileInfo>,
    pub overflow: HashMap<OverflowKey, [ExtentDescriptor; 8]>,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest_catalog_entries(&mut self, entries: Vec<CatalogEntry>, block_size: u32, permissive: bool) {
        for entry in entries {
            self.ingest_catalog_entry(entry, block_size, permissive);
        }
    }

    pub fn ingest_catalog_entry(&mut self, entry: CatalogEntry, block_size: u32, permissive: bool) {
        match entry {
            CatalogEntry::Folder(f) => {
                self.folders.insert(
                    f.folder_id,
                    FolderInfo {
                        name: f.key.node_name,
                        parent_id: f.key.parent_id,
                    },
                );
            }
            CatalogEntry::File(f) => {
                if f.logical_size == 0 {
                    return;
                }

                let block_size = block_size as u64;
                let covers = f.total_blocks as u64 * block_size >= f.logical_size;
                let over_by_one = f.total_blocks > 0
                    && (f.total_blocks as u64 - 1) * block_size > f.logical_size;
                if !covers || over_by_one {
                    warn(format!(
                        "file {} has inconsistent block size arithmetic (totalBlocks={}, logicalSize={})",
                        f.file_id, f.total_blocks, f.logical_size
                    ));
                    if !permissive {
                        return;
                    }
                }

                let mut found_blocks = 0u32;
                let mut extents = Vec::new();
                for inline in f.extents.iter() {
                    if found_blocks >= f.total_blocks {
                        break;
                    }
                    extents.push(*inline);
                    found_blocks = found_blocks.saturating_add(inline.block_count);
                }

                self.files.push(FileInfo {
                    name: f.key.node_name,
                    parent_id: f.key.parent_id,
                    file_id: f.file_id,
                    logical_size: f.logical_size,
                    total_blocks: f.total_blocks,
                    found_blocks,
                    extents,
                });
            }
            CatalogEntry::Thread => {}
        }
    }

    pub fn ingest_extent_entries(&mut self, entries: Vec<ExtentOverflowEntry>) {
        for entry in entries {
            self.ingest_extent_entry(entry);
        }
    }

    pub fn ingest_extent_entry(&mut self, entry: ExtentOverflowEntry) {
        self.overflow
            .insert((entry.file_id, entry.start_block), entry.extents);
    }
}
