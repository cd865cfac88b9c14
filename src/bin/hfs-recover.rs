//! Usage:
//!   hfs-recover <image> <outdir> [options]
//!
//! Options:
//!   -block-size N        allocation block size in bytes (default 512)
//!   -sector-size N        sector size for header preflight (default 512)
//!   -buffer-size N        scan buffer half-size (default = block size)
//!   -catalog-node-size N  catalog B-tree node size (default = block size)
//!   -extent-node-size N   extents B-tree node size (default = block size)
//!   -stop-block N         stop scanning at this block number
//!   -permissive           relax structural cross-checks, never bounds checks
//!
//! Argument parsing is deliberately minimal — see SPEC_FULL.md §1 for why
//! this crate doesn't reach for a parsing crate here.

use std::env;
use std::path::PathBuf;
use std::process;

use hfs_recover::{recover_image, RecoveryOptions};

fn parse_u32(flag: &str, value: &str) -> u32 {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: invalid value for {flag}: {value}");
        process::exit(1);
    })
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: hfs-recover <image> <outdir> [options]");
        process::exit(1);
    }

    let image = PathBuf::from(&args[1]);
    let outdir = PathBuf::from(&args[2]);

    let mut block_size: Option<u32> = None;
    let mut options = RecoveryOptions::default();

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "-block-size" => {
                i += 1;
                block_size = Some(parse_u32("-block-size", &args[i]));
            }
            "-sector-size" => {
                i += 1;
                options.sector_size = parse_u32("-sector-size", &args[i]);
            }
            "-buffer-size" => {
                i += 1;
                options.buffer_size = parse_u32("-buffer-size", &args[i]);
            }
            "-catalog-node-size" => {
                i += 1;
                options.catalog_node_size = parse_u32("-catalog-node-size", &args[i]);
            }
            "-extent-node-size" => {
                i += 1;
                options.extent_node_size = parse_u32("-extent-node-size", &args[i]);
            }
            "-stop-block" => {
                i += 1;
                options.stop_block = Some(parse_u32("-stop-block", &args[i]) as u64);
            }
            "-permissive" => {
                options.permissive = true;
            }
            other => {
                eprintln!("Error: unrecognized option {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(block_size) = block_size {
        options = RecoveryOptions {
            block_size,
            buffer_size: block_size,
            catalog_node_size: block_size,
            extent_node_size: block_size,
            ..options
        };
    }

    match recover_image(&image, &outdir, &options) {
        Ok(stats) => {
            println!(
                "recovered {} of {} indexed files ({} failed)",
                stats.files_recovered, stats.files_indexed, stats.files_failed
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
