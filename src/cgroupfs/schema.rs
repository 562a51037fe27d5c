//! The two layouts of the cgroup filesystem

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cgroupfs::parsers::{read_data, Parse, TokenParser};
use crate::cgroupfs::CgroupfsError;
use crate::core::attributes::{Column, Field, Format};
use crate::core::controller::Controller;
use crate::core::schema::AttributeSchema;

const LEGACY_SHARES: Column = Column::new("shares", "cpu.shares", Field::Whole, Format::Raw);

const LEGACY_CPU: &[Column] = &[
    LEGACY_SHARES,
    Column::new("quota", "cpu.cfs_quota_us", Field::Whole, Format::Limit),
    Column::new("period", "cpu.cfs_period_us", Field::Whole, Format::Raw),
    Column::new("usage", "cpuacct.usage", Field::Whole, Format::Nanoseconds),
];

const LEGACY_CPUSET: &[Column] = &[
    Column::new("cpus", "cpuset.cpus", Field::Whole, Format::Raw),
    Column::new("mems", "cpuset.mems", Field::Whole, Format::Raw),
    Column::new("exclusive", "cpuset.cpu_exclusive", Field::Whole, Format::Raw),
];

const LEGACY_MEMORY: &[Column] = &[
    Column::new("usage", "memory.usage_in_bytes", Field::Whole, Format::Bytes),
    Column::new("peak", "memory.max_usage_in_bytes", Field::Whole, Format::Bytes),
    Column::new("limit", "memory.limit_in_bytes", Field::Whole, Format::Bytes),
    Column::new("soft limit", "memory.soft_limit_in_bytes", Field::Whole, Format::Bytes),
];

const LEGACY_IO: &[Column] = &[
    Column::new("weight", "blkio.weight", Field::Whole, Format::Raw),
    Column::new("read bps", "blkio.throttle.read_bps_device", Field::Whole, Format::Lines),
    Column::new("write bps", "blkio.throttle.write_bps_device", Field::Whole, Format::Lines),
];

const UNIFIED_CPU: &[Column] = &[
    Column::new("weight", "cpu.weight", Field::Whole, Format::Raw),
    Column::new("quota", "cpu.max", Field::Token(0), Format::Limit),
    Column::new("period", "cpu.max", Field::Token(1), Format::Raw),
    Column::new("usage", "cpu.stat", Field::Keyed("usage_usec"), Format::Microseconds),
];

const UNIFIED_CPUSET: &[Column] = &[
    Column::new("cpus", "cpuset.cpus", Field::Whole, Format::Raw),
    Column::new("effective cpus", "cpuset.cpus.effective", Field::Whole, Format::Raw),
    Column::new("effective mems", "cpuset.mems.effective", Field::Whole, Format::Raw),
];

const UNIFIED_MEMORY: &[Column] = &[
    Column::new("current", "memory.current", Field::Whole, Format::Bytes),
    Column::new("peak", "memory.peak", Field::Whole, Format::Bytes),
    Column::new("high", "memory.high", Field::Whole, Format::Bytes),
    Column::new("max", "memory.max", Field::Whole, Format::Bytes),
    Column::new("low", "memory.low", Field::Whole, Format::Bytes),
];

const UNIFIED_IO: &[Column] = &[
    Column::new("weight", "io.weight", Field::Keyed("default"), Format::Raw),
    Column::new("max", "io.max", Field::Whole, Format::Lines),
];

/// Layout where each controller has its own tree, mounted at its own location
#[derive(Debug)]
pub struct LegacySchema {
    roots: BTreeMap<Controller, PathBuf>,
}

impl LegacySchema {
    pub fn new(roots: BTreeMap<Controller, PathBuf>) -> Self {
        Self { roots }
    }

    /// Finds the tree of each controller among the subdirectories of `dir`.
    ///
    /// A subdirectory holds the tree of all the controllers listed in its comma-separated name
    /// (e.g. `cpu,cpuacct`). A directory named exactly after a controller takes precedence.
    pub fn from_directory(dir: &Path) -> Result<Self, CgroupfsError> {
        let mut names: Vec<String> = dir
            .read_dir()?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();

        let mut roots = BTreeMap::new();

        for controller in Controller::ALL {
            let legacy_name = controller.legacy_name();

            let found = names
                .iter()
                .find(|n| n.as_str() == legacy_name)
                .or_else(|| names.iter().find(|n| n.split(',').any(|c| c == legacy_name)));

            if let Some(name) = found {
                roots.insert(controller, dir.join(name));
            }
        }

        if roots.is_empty() {
            return Err(CgroupfsError::NoHierarchy);
        }

        Ok(Self::new(roots))
    }
}

impl AttributeSchema for LegacySchema {
    fn label(&self) -> &'static str {
        "cgroup v1"
    }

    fn controllers(&self) -> Vec<Controller> {
        self.roots.keys().copied().collect()
    }

    fn controller_root(&self, controller: Controller) -> Option<&Path> {
        self.roots.get(&controller).map(PathBuf::as_path)
    }

    fn columns(&self, controller: Controller) -> &'static [Column] {
        match controller {
            Controller::Cpu => LEGACY_CPU,
            Controller::Cpuset => LEGACY_CPUSET,
            Controller::Memory => LEGACY_MEMORY,
            Controller::Io => LEGACY_IO,
        }
    }

    fn capacity_weight(&self, controller: Controller) -> Option<Column> {
        match controller {
            Controller::Cpu => Some(LEGACY_SHARES),
            _ => None,
        }
    }
}

/// Represents the content of `cgroup.controllers`: the controllers available in a unified tree
#[derive(Eq, PartialEq, Debug)]
pub struct ControllerList {
    controllers: Vec<Controller>,
}

impl Parse for ControllerList {
    fn parse(token_parser: &TokenParser) -> Result<Self, CgroupfsError> {
        let mut controllers: Vec<Controller> = token_parser
            .line(0)
            .iter()
            .filter_map(|name| Controller::from_name(name))
            .collect();
        controllers.sort();
        controllers.dedup();

        Ok(ControllerList { controllers })
    }
}

/// Layout where all controllers share a single tree
#[derive(Debug)]
pub struct UnifiedSchema {
    root: PathBuf,
    controllers: Vec<Controller>,
}

impl UnifiedSchema {
    pub fn new(root: PathBuf, controllers: Vec<Controller>) -> Self {
        Self { root, controllers }
    }

    /// Builds the schema of the unified tree mounted at `root`, reading its available controllers
    pub fn load(root: &Path) -> Result<Self, CgroupfsError> {
        let list: ControllerList = read_data(&root.join("cgroup.controllers"))?;

        Ok(Self::new(root.to_path_buf(), list.controllers))
    }
}

impl AttributeSchema for UnifiedSchema {
    fn label(&self) -> &'static str {
        "cgroup v2"
    }

    fn controllers(&self) -> Vec<Controller> {
        self.controllers.clone()
    }

    fn controller_root(&self, controller: Controller) -> Option<&Path> {
        if self.controllers.contains(&controller) {
            Some(self.root.as_path())
        } else {
            None
        }
    }

    fn columns(&self, controller: Controller) -> &'static [Column] {
        match controller {
            Controller::Cpu => UNIFIED_CPU,
            Controller::Cpuset => UNIFIED_CPUSET,
            Controller::Memory => UNIFIED_MEMORY,
            Controller::Io => UNIFIED_IO,
        }
    }

    fn capacity_weight(&self, _controller: Controller) -> Option<Column> {
        None
    }
}


#[cfg(test)]
mod test_unified_schema {
    use std::fs;

    use tempfile::tempdir;

    use crate::cgroupfs::parsers::{Parse, TokenParser};
    use crate::cgroupfs::schema::{ControllerList, UnifiedSchema};
    use crate::core::controller::Controller;
    use crate::core::schema::AttributeSchema;

    #[test]
    fn test_should_only_keep_known_controllers() {
        let list = ControllerList::parse(&TokenParser::new("cpuset cpu io memory hugetlb pids rdma misc\n")).unwrap();

        assert_eq!(
            list.controllers,
            vec![Controller::Cpu, Controller::Cpuset, Controller::Memory, Controller::Io]
        );
    }

    #[test]
    fn test_should_load_controllers_of_root() {
        let dir = tempdir().expect("Could not create tmp dir");
        fs::write(dir.path().join("cgroup.controllers"), "memory pids\n").expect("Could not write controllers");

        let schema = UnifiedSchema::load(dir.path()).unwrap();

        assert_eq!(schema.controllers(), vec![Controller::Memory]);
        assert_eq!(schema.controller_root(Controller::Memory), Some(dir.path()));
        assert_eq!(schema.controller_root(Controller::Cpu), None);
    }

    #[test]
    fn test_should_never_derive_capacity() {
        let schema = UnifiedSchema::new("/sys/fs/cgroup".into(), vec![Controller::Cpu]);

        assert!(schema.capacity_weight(Controller::Cpu).is_none());
    }

    #[test]
    fn test_cpu_columns_should_split_cpu_max() {
        let schema = UnifiedSchema::new("/sys/fs/cgroup".into(), vec![Controller::Cpu]);

        let attributes: Vec<&str> = schema.columns(Controller::Cpu).iter().map(|c| c.attribute()).collect();

        assert_eq!(attributes, vec!["cpu.weight", "cpu.max", "cpu.max", "cpu.stat"]);
    }
}
