//! Volume Header Preflight: a quick, non-authoritative look at the primary
//! and alternate volume headers. Grounded on `hfsplus::volume::VolumeHeader`
//! for field offsets and `recover.cpp::verify` for the pass/warn/fatal
//! policy — its output is never consulted by the scanner, which doesn't
//! trust tree roots at all.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{HfsRecoverError, Result};
use crate::recover::RecoveryOptions;

pub const HFS_PLUS_SIGNATURE: u16 = 0x482B;
pub const HFSX_SIGNATURE: u16 = 0x4858;
const VOLUME_HEADER_SIZE: u64 = 512;

#[derive(Debug, Clone)]
pub struct HeaderSummary {
    pub signature: u16,
    pub signature_valid: bool,
    pub file_count: u32,
    pub folder_count: u32,
    pub block_size: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub primary: Option<HeaderSummary>,
    pub alternate: Option<HeaderSummary>,
}

fn parse_header_at<R: Read + Seek>(reader: &mut R, offset: u64) -> std::io::Result<HeaderSummary> {
    reader.seek(SeekFrom::Start(offset))?;
    let signature = reader.read_u16::<BigEndian>()?;
    let _version = reader.read_u16::<BigEndian>()?;
    let _attributes = reader.read_u32::<BigEndian>()?;
    let _last_mounted_version = reader.read_u32::<BigEndian>()?;
    let _journal_info_block = reader.read_u32::<BigEndian>()?;
    let _create_date = reader.read_u32::<BigEndian>()?;
    let _modify_date = reader.read_u32::<BigEndian>()?;
    let _backup_date = reader.read_u32::<BigEndian>()?;
    let _checked_date = reader.read_u32::<BigEndian>()?;
    let file_count = reader.read_u32::<BigEndian>()?;
    let folder_count = reader.read_u32::<BigEndian>()?;
    let block_size = reader.read_u32::<BigEndian>()?;

    let signature_valid = signature == HFS_PLUS_SIGNATURE || signature == HFSX_SIGNATURE;
    Ok(HeaderSummary {
        signature,
        signature_valid,
        file_count,
        folder_count,
        block_size,
    })
}

/// Read the primary header (`2 * sectorSize` from the start) and the
/// alternate header (`2 * sectorSize` from the end). A bad signature on
/// either is a warning; both bad is fatal unless `permissive` is set.
pub fn preflight(image_path: &std::path::Path, options: &RecoveryOptions) -> Result<PreflightReport> {
    let mut file = File::open(image_path)?;
    let len = file.metadata()?.len();
    let sector = options.sector_size as u64;

    if len < 2 * sector + VOLUME_HEADER_SIZE {
        return Err(HfsRecoverError::ImageTooSmall);
    }

    let primary_offset = 2 * sector;
    // The alternate header sits `2 * sectorSize` from the end of the image,
    // not `2 * sectorSize + headerSize` — matches `verify`'s
    // `seekg(-2 * sectorSize, ios::end)`.
    let alternate_offset = len.checked_sub(2 * sector).unwrap_or(0);

    let primary = parse_header_at(&mut file, primary_offset).ok();
    let alternate = parse_header_at(&mut file, alternate_offset).ok();

    let primary_ok = primary.as_ref().is_some_and(|h| h.signature_valid);
    let alternate_ok = alternate.as_ref().is_some_and(|h| h.signature_valid);

    if !primary_ok {
        match &primary {
            Some(h) => crate::warn(format!("incorrect signature 0x{:04X} in primary header", h.signature)),
            None => crate::warn("couldn't read primary header"),
        }
    }
    if !alternate_ok {
        match &alternate {
            Some(h) => crate::warn(format!("incorrect signature 0x{:04X} in alternate header", h.signature)),
            None => crate::warn("couldn't read alternate header"),
        }
    }
    if !primary_ok && !alternate_ok && !options.permissive {
        return Err(HfsRecoverError::BothHeadersInvalid);
    }

    for (label, header) in [("primary", &primary), ("alternate", &alternate)] {
        if let Some(h) = header {
            if h.signature_valid {
                println!(
                    "{label} header: fileCount={} folderCount={} blockSize={}",
                    h.file_count, h.folder_count, h.block_size
                );
            }
        }
    }

    Ok(PreflightReport { primary, alternate })
}
