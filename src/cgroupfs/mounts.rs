//! Resolution of the layout of the resource-control hierarchy active on the system

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::cgroupfs::libc::{filesystem_magic, CGROUP2_SUPER_MAGIC};
use crate::cgroupfs::parsers::{read_data, Parse, TokenParser};
use crate::cgroupfs::schema::{LegacySchema, UnifiedSchema};
use crate::cgroupfs::CgroupfsError;
use crate::core::controller::Controller;
use crate::core::schema::AttributeSchema;

/// Location where the resource-control hierarchy is conventionally mounted
pub const DEFAULT_MOUNT_POINT: &str = "/sys/fs/cgroup";
/// Mount table of the current process
pub const MOUNTS_FILE: &str = "/proc/self/mounts";

const LEGACY_FS_TYPE: &str = "cgroup";
const UNIFIED_FS_TYPE: &str = "cgroup2";

/// One line of the mount table
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MountEntry {
    mount_point: PathBuf,
    fs_type: String,
    options: Vec<String>,
}

/// Represents data from `/proc/self/mounts`
#[derive(Eq, PartialEq, Debug, Default)]
pub struct MountTable {
    entries: Vec<MountEntry>,
}

impl MountTable {
    /// Returns the mount point of each controller mounted as a legacy hierarchy
    pub fn legacy_roots(&self) -> BTreeMap<Controller, PathBuf> {
        let mut roots = BTreeMap::new();

        for entry in self.entries.iter().filter(|e| e.fs_type == LEGACY_FS_TYPE) {
            for controller in Controller::ALL {
                if entry.options.iter().any(|o| o == controller.legacy_name()) {
                    roots.entry(controller).or_insert_with(|| entry.mount_point.clone());
                }
            }
        }

        roots
    }

    /// Returns the mount point of the first unified hierarchy
    pub fn unified_root(&self) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.fs_type == UNIFIED_FS_TYPE)
            .map(|e| e.mount_point.as_path())
    }
}

impl Parse for MountTable {
    fn parse(token_parser: &TokenParser) -> Result<Self, CgroupfsError> {
        let entries = (0..token_parser.line_count())
            .filter(|l| !token_parser.is_blank(*l))
            .map(|l| -> Result<MountEntry, CgroupfsError> {
                Ok(MountEntry {
                    mount_point: PathBuf::from(unescape_octal(&token_parser.token::<String>(l, 1)?)),
                    fs_type: token_parser.token(l, 2)?,
                    options: token_parser
                        .token::<String>(l, 3)?
                        .split(',')
                        .map(str::to_string)
                        .collect(),
                })
            })
            .collect::<Result<Vec<MountEntry>, CgroupfsError>>()?;

        Ok(MountTable { entries })
    }
}

/// Decodes the `\ooo` sequences used by the mount table to escape whitespaces in paths
fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let escaped = bytes
            .get(i + 1..i + 4)
            .filter(|digits| bytes[i] == b'\\' && digits.iter().all(|d| (b'0'..=b'7').contains(d)));

        match escaped {
            Some(digits) => {
                let value = digits.iter().fold(0u32, |acc, d| acc * 8 + (d - b'0') as u32);
                decoded.push(value as u8);
                i += 4;
            }
            None => {
                decoded.push(bytes[i]);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Determines which layout of the resource-control hierarchy is in use
pub struct SchemaResolver {
    mount_point: PathBuf,
    mounts_file: PathBuf,
    forced_root: Option<PathBuf>,
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self::with_paths(DEFAULT_MOUNT_POINT, MOUNTS_FILE)
    }
}

impl SchemaResolver {
    /// Builds a resolver inspecting the given mount point and mount table
    pub fn with_paths<M, T>(mount_point: M, mounts_file: T) -> Self
    where
        M: Into<PathBuf>,
        T: Into<PathBuf>,
    {
        Self {
            mount_point: mount_point.into(),
            mounts_file: mounts_file.into(),
            forced_root: None,
        }
    }

    /// Builds a resolver which only inspects the given directory, ignoring the mount table
    pub fn with_root<R>(root: R) -> Self
    where
        R: Into<PathBuf>,
    {
        Self {
            forced_root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn resolve(&self) -> Result<Box<dyn AttributeSchema>, CgroupfsError> {
        match &self.forced_root {
            Some(root) => Self::resolve_directory(root),
            None => self.resolve_system(),
        }
    }

    /// A directory holding `cgroup.controllers` is a unified tree, otherwise its subdirectories are
    /// searched for legacy controller trees
    fn resolve_directory(root: &Path) -> Result<Box<dyn AttributeSchema>, CgroupfsError> {
        if root.join("cgroup.controllers").is_file() {
            info!("Using unified hierarchy at {:?}", root);
            Ok(Box::new(UnifiedSchema::load(root)?))
        } else {
            info!("Searching legacy hierarchies in {:?}", root);
            Ok(Box::new(LegacySchema::from_directory(root)?))
        }
    }

    fn resolve_system(&self) -> Result<Box<dyn AttributeSchema>, CgroupfsError> {
        match filesystem_magic(&self.mount_point) {
            Ok(CGROUP2_SUPER_MAGIC) => {
                info!("{:?} is a unified hierarchy", self.mount_point);
                return Ok(Box::new(UnifiedSchema::load(&self.mount_point)?));
            }
            Ok(magic) => debug!("{:?} has filesystem magic {:#x}", self.mount_point, magic),
            Err(e) => warn!("Could not inspect {:?}: {}", self.mount_point, e),
        }

        let mount_table: MountTable = read_data(&self.mounts_file)?;
        let legacy_roots = mount_table.legacy_roots();

        if !legacy_roots.is_empty() {
            info!("Using legacy hierarchies: {:?}", legacy_roots);
            return Ok(Box::new(LegacySchema::new(legacy_roots)));
        }

        match mount_table.unified_root() {
            Some(root) => {
                info!("Using unified hierarchy mounted at {:?}", root);
                Ok(Box::new(UnifiedSchema::load(root)?))
            }
            None => Err(CgroupfsError::NoHierarchy),
        }
    }
}
