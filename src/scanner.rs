//! Scanner: walks the image with a sliding double buffer, asking the
//! classifier about each stride-aligned position. Grounded on
//! `recover.cpp::scan`'s `backbuffer` handling — refilling the second half
//! once the cursor crosses the midpoint — generalized to try the catalog
//! node size and the extent node size as two independent strides per
//! SPEC_FULL.md §4.3.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use crate::classifier::{self, Classification};
use crate::error::Result;
use crate::index::Indexer;
use crate::recover::RecoveryOptions;

#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub blocks_processed: u64,
    pub bytes_processed: u64,
    pub leaves_accepted: u64,
}

fn fill(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = file.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

fn report_progress(stats: &ScanStats, indexer: &Indexer) {
    println!(
        "scanning: {} blocks, {} bytes, {} leaves accepted ({} files, {} folders, {} overflow records)",
        stats.blocks_processed,
        stats.bytes_processed,
        stats.leaves_accepted,
        indexer.files.len(),
        indexer.folders.len(),
        indexer.overflow.len(),
    );
}

/// Scan `image_path` end to end, forwarding every accepted leaf's records to
/// `indexer`. Returns once the image is exhausted or `stopBlock` is hit.
pub fn scan(image_path: &Path, options: &RecoveryOptions, indexer: &mut Indexer) -> Result<ScanStats> {
    let mut file = File::open(image_path)?;

    let buffer_size = options.buffer_size as usize;
    let catalog_node_size = options.catalog_node_size as usize;
    let extent_node_size = options.extent_node_size as usize;
    let min_node_size = catalog_node_size.min(extent_node_size).max(1);

    let mut backbuffer = vec![0u8; buffer_size * 2];
    let mut filled = fill(&mut file, &mut backbuffer[..buffer_size])?;
    let mut base: u64 = 0;
    let mut cursor = 0usize;
    let mut second_half_filled = false;

    let mut stats = ScanStats::default();
    let mut last_report = Instant::now();
    let stop_offset = options
        .stop_block
        .map(|b| b as u64 * options.block_size as u64);

    loop {
        if let Some(stop) = stop_offset {
            if base + cursor as u64 >= stop {
                break;
            }
        }

        if cursor >= buffer_size && !second_half_filled {
            let n = fill(&mut file, &mut backbuffer[buffer_size..])?;
            filled = buffer_size + n;
            second_half_filled = true;
        }

        if cursor + min_node_size > filled {
            break;
        }

        let mut advanced = false;

        if cursor + catalog_node_size <= filled {
            let window = &backbuffer[cursor..cursor + catalog_node_size];
            if let Some(Classification::Catalog(entries)) = classifier::classify_node(window, options.permissive) {
                stats.leaves_accepted += 1;
                indexer.ingest_catalog_entries(entries, options.block_size, options.permissive);
                cursor += catalog_node_size;
                advanced = true;
            }
        }

        if !advanced && cursor + extent_node_size <= filled {
            let window = &backbuffer[cursor..cursor + extent_node_size];
            if let Some(Classification::Extent(entries)) = classifier::classify_node(window, options.permissive) {
                stats.leaves_accepted += 1;
                indexer.ingest_extent_entries(entries);
                cursor += extent_node_size;
                advanced = true;
            }
        }

        if !advanced {
            cursor += min_node_size;
        }

        stats.blocks_processed += 1;
        stats.bytes_processed = base + cursor as u64;

        if last_report.elapsed().as_secs_f64() >= 5.0 {
            report_progress(&stats, indexer);
            last_report = Instant::now();
        }

        if cursor >= buffer_size && second_half_filled {
            backbuffer.copy_within(buffer_size..filled, 0);
            base += buffer_size as u64;
            cursor -= buffer_size;
            filled -= buffer_size;
            second_half_filled = false;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_random_image_yields_no_entries() {
        let mut image = NamedTempFile::new().unwrap();
        // Deterministic "random-ish" filler with no embedded HFS+ shapes.
        let data: Vec<u8> = (0..64 * 1024).map(|i| (i * 7 + 3) as u8).collect();
        image.write_all(&data).unwrap();
        image.flush().unwrap();

        let options = RecoveryOptions {
            block_size: 512,
            buffer_size: 4096,
            catalog_node_size: 4096,
            extent_node_size: 4096,
            ..Default::default()
        };
        let mut indexer = Indexer::new();
        scan(image.path(), &options, &mut indexer).unwrap();
        assert!(indexer.files.is_empty());
        assert!(indexer.folders.is_empty());
        assert!(indexer.overflow.is_empty());
    }
}
