//! Node discovery

use std::io;
use std::path::{Path, PathBuf};

use log::warn;

use crate::cgroupfs::CgroupfsError;

/// Returns the sorted identifiers of `root` and of all the nodes below it, down to `max_depth`
/// levels (unbounded if `None`)
///
/// # Arguments
///  * `root`: The root directory of the tree. It must be readable.
///  * `max_depth`: The maximum depth of the returned nodes, `root` having a depth of 0
pub fn enumerate(root: &Path, max_depth: Option<usize>) -> Result<Vec<String>, CgroupfsError> {
    subdirectories(root)?;

    let mut identifiers = vec![];
    let mut level = vec![root.to_path_buf()];
    let mut depth = 0;

    while !level.is_empty() && max_depth.map_or(true, |max| depth <= max) {
        let next = next_level(&level);

        identifiers.extend(level.into_iter().map(|p| p.to_string_lossy().into_owned()));

        level = next;
        depth += 1;
    }

    identifiers.sort();
    Ok(identifiers)
}

fn next_level(level: &[PathBuf]) -> Vec<PathBuf> {
    level
        .iter()
        .flat_map(|dir| {
            subdirectories(dir).unwrap_or_else(|e| {
                warn!("Could not list nodes under {:?}: {}", dir, e);
                vec![]
            })
        })
        .collect()
}

fn subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    Ok(dir
        .read_dir()?
        // only retrieve dir entry which are not err
        .filter_map(|r| r.ok())
        // symbolic links are not followed, a tree has none
        .filter(|de| de.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|de| de.path())
        .collect())
}
