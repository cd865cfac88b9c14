//! Top-level orchestrator: wires preflight, scan, defragment, resolve and
//! extract into the single sequential pipeline described in SPEC_FULL.md
//! §2 and §5. Grounded on `recover.cpp::recover`.

use std::fs::File;
use std::path::Path;

use crate::error::Result;
use crate::index::Indexer;
use crate::{defrag, extract, header, paths, scanner, warn};

/// Tuning knobs for a recovery run. See SPEC_FULL.md §6 for the effect of
/// each field; grounded on `Options`/`RGS` in `recover.cpp`/`recover.h`.
#[derive(Debug, Clone)]
pub struct RecoveryOptions {
    pub sector_size: u32,
    pub block_size: u32,
    pub buffer_size: u32,
    pub catalog_node_size: u32,
    pub extent_node_size: u32,
    pub stop_block: Option<u64>,
    pub permissive: bool,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        RecoveryOptions {
            sector_size: 512,
            block_size: 512,
            buffer_size: 512,
            catalog_node_size: 512,
            extent_node_size: 512,
            stop_block: None,
            permissive: false,
        }
    }
}

impl RecoveryOptions {
    /// Build options whose buffer/node sizes all default to `block_size`,
    /// matching SPEC_FULL.md §6 ("bufferSize default = blockSize" etc).
    pub fn with_block_size(block_size: u32) -> Self {
        RecoveryOptions {
            block_size,
            buffer_size: block_size,
            catalog_node_size: block_size,
            extent_node_size: block_size,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecoveryStats {
    pub blocks_processed: u64,
    pub bytes_processed: u64,
    pub leaves_accepted: u64,
    pub folders_indexed: usize,
    pub files_indexed: usize,
    pub overflow_records_indexed: usize,
    pub files_recovered: usize,
    pub files_failed: usize,
}

/// Run the full recovery pipeline against `image_path`, writing recovered
/// files under `outroot`.
pub fn recover_image(image_path: &Path, outroot: &Path, options: &RecoveryOptions) -> Result<RecoveryStats> {
    let _preflight = header::preflight(image_path, options)?;

    let mut indexer = Indexer::new();
    let scan_stats = scanner::scan(image_path, options, &mut indexer)?;

    println!(
        "scan done: {} folders, {} files, {} overflow records indexed",
        indexer.folders.len(),
        indexer.files.len(),
        indexer.overflow.len()
    );

    for file in &mut indexer.files {
        defrag::defragment(file, &indexer.overflow);
    }
    println!("defragmentation done");

    std::fs::create_dir_all(outroot)?;
    let mut input = File::open(image_path)?;

    let mut stats = RecoveryStats {
        blocks_processed: scan_stats.blocks_processed,
        bytes_processed: scan_stats.bytes_processed,
        leaves_accepted: scan_stats.leaves_accepted,
        folders_indexed: indexer.folders.len(),
        files_indexed: indexer.files.len(),
        overflow_records_indexed: indexer.overflow.len(),
        files_recovered: 0,
        files_failed: 0,
    };

    for file in &indexer.files {
        let dest = paths::resolve_file_path(file, &indexer.folders, outroot);
        match extract::extract_file(image_path, &mut input, file, options.block_size, &dest) {
            Ok(()) => stats.files_recovered += 1,
            Err(e) => {
                warn(format!("failed to extract {}: {e}", file.name.to_string_lossy()));
                stats.files_failed += 1;
            }
        }
    }

    println!(
        "extraction done: {} recovered, {} failed",
        stats.files_recovered, stats.files_failed
    );

    Ok(stats)
}
