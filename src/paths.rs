//! Path Resolver: rebuilds a file's output path by walking the folder map
//! upward from its parent id, with a `lost/` sink for unresolvable chains.
//! Grounded on `recover.cpp::makeFolder`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::index::{FileInfo, FolderInfo};
use crate::records::FIRST_USER_CNID;
use crate::warn;

fn create_dir(path: &Path) {
    match fs::create_dir(path) {
        Ok(()) => set_permissive_mode(path),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
        Err(e) => warn(format!("couldn't create directory {}: {e}", path.display())),
    }
}

#[cfg(unix)]
fn set_permissive_mode(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o777));
}

#[cfg(not(unix))]
fn set_permissive_mode(_path: &Path) {}

/// Resolve the directory that should hold catalog node id `folder_id`,
/// creating every directory along the way. Ids below `FIRST_USER_CNID` are
/// HFS+ system ids and map straight to `outroot`; an id with no folder
/// record redirects to `<outroot>/lost`.
pub fn resolve_folder_path(folder_id: u32, folders: &HashMap<u32, FolderInfo>, outroot: &Path) -> PathBuf {
    if folder_id < FIRST_USER_CNID {
        return outroot.to_path_buf();
    }

    match folders.get(&folder_id) {
        Some(info) => {
            let parent_path = resolve_folder_path(info.parent_id, folders, outroot);
            let path = parent_path.join(&info.name);
            create_dir(&path);
            path
        }
        None => {
            warn("Couldn't find folder in chain.");
            let path = outroot.join("lost");
            create_dir(&path);
            path
        }
    }
}

/// Resolve the full output path (directory + file name) for a recovered
/// file, creating any directories that don't yet exist.
pub fn resolve_file_path(file: &FileInfo, folders: &HashMap<u32, FolderInfo>, outroot: &Path) -> PathBuf {
    create_dir(outroot);
    let dir = resolve_folder_path(file.parent_id, folders, outroot);
    dir.join(&file.name)
}
