//! Defragmenter: extends a file's extent list past its inline 8 descriptors
//! using the overflow map. Grounded on `recover.cpp::defragment`.

use std::collections::HashMap;

use crate::index::{FileInfo, OverflowKey};
use crate::records::ExtentDescriptor;
use crate::warn;

/// Repeatedly look up `(fileID, foundBlocks)` in the overflow map, appending
/// every descriptor from each hit, until `foundBlocks >= totalBlocks` or a
/// key is missing. A miss abandons defragmentation for this file — the
/// extractor still writes whatever extents were found. A hit that carries no
/// non-zero descriptor (a validly-shaped but useless overflow record) would
/// otherwise keep handing back the same key forever, so it's treated the
/// same as a miss.
pub fn defragment(file: &mut FileInfo, overflow: &HashMap<OverflowKey, [ExtentDescriptor; 8]>) {
    while file.found_blocks < file.total_blocks {
        let key = (file.file_id, file.found_blocks);
        let Some(extents) = overflow.get(&key) else {
            warn("Couldn't find needed extent.");
            break;
        };

        let found_blocks_before = file.found_blocks;
        for extent in extents {
            if extent.block_count == 0 {
                continue;
            }
            file.extents.push(*extent);
            file.found_blocks = file.found_blocks.saturating_add(extent.block_count);
            if file.found_blocks >= file.total_blocks {
                break;
            }
        }

        if file.found_blocks == found_blocks_before {
            warn("Couldn't find needed extent.");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(total_blocks: u32, found_blocks: u32) -> FileInfo {
        FileInfo {
            name: "a.txt".into(),
            parent_id: 16,
            file_id: 17,
            logical_size: 12288,
            total_blocks,
            found_blocks,
            extents: (0..found_blocks)
                .map(|i| ExtentDescriptor {
                    start_block: i,
                    block_count: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn stitches_overflow_extents_to_completion() {
        let mut overflow = HashMap::new();
        let mut extents: [ExtentDescriptor; 8] = Default::default();
        for (i, slot) in extents.iter_mut().enumerate().take(4) {
            *slot = ExtentDescriptor {
                start_block: 8 + i as u32,
                block_count: 1,
            };
        }
        overflow.insert((17, 8), extents);

        let mut file = file_with(12, 8);
        defragment(&mut file, &overflow);
        assert_eq!(file.found_blocks, 12);
        assert_eq!(file.extents.len(), 12);
    }

    #[test]
    fn missing_overflow_key_abandons_but_keeps_prefix() {
        let overflow = HashMap::new();
        let mut file = file_with(12, 8);
        defragment(&mut file, &overflow);
        assert_eq!(file.found_blocks, 8);
        assert_eq!(file.extents.len(), 8);
    }
}
