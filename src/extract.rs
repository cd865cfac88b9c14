//! Extractor: copies a file's concatenated extents from the image to its
//! resolved output path, byte-exact to `logicalSize`. Grounded on
//! `recover.cpp::save`, including the reopen-on-seek-failure path for images
//! that behave like block devices or drifting sparse files.

use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::index::FileInfo;

/// Copy `file`'s extents from `reader` to `dest_path`, truncating the final
/// block so the output is exactly `logicalSize` bytes. `image_path` is kept
/// around so the input handle can be reopened if a seek fails.
pub fn extract_file(
    image_path: &Path,
    reader: &mut File,
    file: &FileInfo,
    block_size: u32,
    dest_path: &Path,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(dest_path)?);
    let mut remaining = file.logical_size;
    let mut buf = vec![0u8; block_size as usize];

    'extents: for extent in &file.extents {
        if remaining == 0 {
            break;
        }
        let mut pos = extent.start_block as u64 * block_size as u64;

        for _ in 0..extent.block_count {
            if remaining == 0 {
                break 'extents;
            }

            if reader.seek(SeekFrom::Start(pos)).is_err() {
                *reader = File::open(image_path)?;
                reader.seek(SeekFrom::Start(pos))?;
            }

            let want = remaining.min(block_size as u64) as usize;
            reader.read_exact(&mut buf[..want])?;
            out.write_all(&buf[..want])?;

            remaining -= want as u64;
            pos += block_size as u64;
        }
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ExtentDescriptor;
    use std::io::Write as _;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn extracts_single_extent_truncated_to_logical_size() {
        let block_size = 4096u32;
        let mut image = NamedTempFile::new().unwrap();
        let mut data = vec![0u8; block_size as usize * 2];
        data[block_size as usize..block_size as usize + 5].copy_from_slice(b"hello");
        image.write_all(&data).unwrap();
        image.flush().unwrap();

        let file_info = FileInfo {
            name: "a.txt".into(),
            parent_id: 16,
            file_id: 17,
            logical_size: 5,
            total_blocks: 1,
            found_blocks: 1,
            extents: vec![ExtentDescriptor {
                start_block: 1,
                block_count: 1,
            }],
        };

        let out_dir = tempdir().unwrap();
        let dest = out_dir.path().join("a.txt");
        let mut reader = File::open(image.path()).unwrap();
        extract_file(image.path(), &mut reader, &file_info, block_size, &dest).unwrap();

        let contents = std::fs::read(&dest).unwrap();
        assert_eq!(contents, b"hello");
    }

    #[test]
    fn extracts_multiple_extents_in_order() {
        let block_size = 512u32;
        let mut image = NamedTempFile::new().unwrap();
        let mut data = vec![0u8; block_size as usize * 4];
        data[0..block_size as usize].fill(b'A');
        data[block_size as usize..2 * block_size as usize].fill(b'B');
        image.write_all(&data).unwrap();
        image.flush().unwrap();

        let file_info = FileInfo {
            name: "ab.bin".into(),
            parent_id: 16,
            file_id: 18,
            logical_size: block_size as u64 * 2,
            total_blocks: 2,
            found_blocks: 2,
            extents: vec![
                ExtentDescriptor {
                    start_block: 0,
                    block_count: 1,
                },
                ExtentDescriptor {
                    start_block: 1,
                    block_count: 1,
                },
            ],
        };

        let out_dir = tempdir().unwrap();
        let dest = out_dir.path().join("ab.bin");
        let mut reader = File::open(image.path()).unwrap();
        extract_file(image.path(), &mut reader, &file_info, block_size, &dest).unwrap();

        let contents = std::fs::read(&dest).unwrap();
        assert_eq!(contents.len(), block_size as usize * 2);
        assert!(contents[..block_size as usize].iter().all(|&b| b == b'A'));
        assert!(contents[block_size as usize..].iter().all(|&b| b == b'B'));
    }
}
