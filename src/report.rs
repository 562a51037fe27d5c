//! Assembles the sections of the report, one per controller

use std::io;
use std::io::Write;
use std::path::Path;

use log::{debug, info, warn};

use crate::cgroupfs::nodes;
use crate::config::ReportConfig;
use crate::core::attributes::{Column, ReadAttribute};
use crate::core::capacity::{propagate, CapacityShare};
use crate::core::controller::Controller;
use crate::core::hierarchy::{component_count, Hierarchy, Node};
use crate::core::process::{ProcessMetadata, ProcessScanner};
use crate::core::schema::AttributeSchema;
use crate::render::format::{format_share, format_value, PLACEHOLDER};
use crate::render::section::{Row, Section, SectionRenderer};

/// Header of the column holding the guaranteed CPU capacity of the nodes
const CAPACITY_HEADER: &str = "guaranteed";

/// Name displayed for the root node of a tree
const ROOT_NAME: &str = "/";

/// Reads the hierarchy of each selected controller, and turns it into a section of the report
pub struct Report<'a> {
    config: &'a ReportConfig,
    schema: &'a dyn AttributeSchema,
    reader: &'a dyn ReadAttribute,
    scanner: &'a dyn ProcessScanner,
}

impl<'a> Report<'a> {
    pub fn new(
        config: &'a ReportConfig,
        schema: &'a dyn AttributeSchema,
        reader: &'a dyn ReadAttribute,
        scanner: &'a dyn ProcessScanner,
    ) -> Self {
        Self {
            config,
            schema,
            reader,
            scanner,
        }
    }

    /// Returns the controllers to render, in rendering order
    ///
    /// Without explicit selection, every controller enabled on the system is rendered. Explicitly
    /// selected controllers are rendered even if they are not enabled, to report them as unavailable.
    pub fn selected_controllers(&self) -> Vec<Controller> {
        let requested = self.config.controllers();

        if requested.is_empty() {
            return self.schema.controllers();
        }

        Controller::ALL
            .iter()
            .copied()
            .filter(|c| requested.contains(c))
            .collect()
    }

    pub fn build_sections(&self) -> Vec<Section> {
        self.selected_controllers()
            .into_iter()
            .map(|c| self.build_section(c))
            .collect()
    }

    /// Builds the section of a single controller
    ///
    /// A controller whose tree can not be read is reported as unavailable, without affecting the
    /// other sections.
    pub fn build_section(&self, controller: Controller) -> Section {
        let Some(root) = self.schema.controller_root(controller) else {
            info!("Controller {} is not enabled", controller);
            return Section::unavailable(
                format!("{} [{}]", controller, self.schema.label()),
                format!("{} controller is not enabled", controller),
            );
        };

        let title = format!("{} [{}] {}", controller, self.schema.label(), root.display());
        let capacity_weight = self.schema.capacity_weight(controller);

        // guaranteed capacities depend on the whole tree, whatever the displayed depth
        let enumerated_depth = match capacity_weight {
            Some(_) => None,
            None => self.config.max_depth(),
        };

        let hierarchy = match self.build_hierarchy(root, enumerated_depth) {
            Ok(hierarchy) => hierarchy,
            Err(e) => {
                warn!("Could not list the nodes of controller {}: {}", controller, e);
                return Section::unavailable(title, format!("could not list nodes: {}", e));
            }
        };

        let capacity = capacity_weight.and_then(|weight| self.compute_capacity(&hierarchy, weight));
        let columns = self.schema.columns(controller);

        let mut headers: Vec<String> = columns.iter().map(|c| c.header().to_string()).collect();
        if capacity_weight.is_some() {
            headers.push(CAPACITY_HEADER.to_string());
        }

        let mut section = Section::new(title, headers);

        for node in hierarchy.pre_order() {
            if self.config.max_depth().map_or(false, |max| node.depth() > max) {
                continue;
            }

            let mut values: Vec<String> = columns.iter().map(|c| self.read_value(c, node)).collect();

            if capacity_weight.is_some() {
                values.push(
                    capacity
                        .as_ref()
                        .and_then(|c| c.get(node.identifier()))
                        .map(format_share)
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                );
            }

            let name = if node.depth() == 0 { ROOT_NAME } else { node.name() };
            let mut row = Row::new(node.depth(), name, values);

            if self.config.show_processes() {
                row = row.with_processes(self.attached_processes(node));
            }

            section.push_row(row);
        }

        section
    }

    /// Renders every section to `out`, separated by blank lines
    pub fn write<W>(&self, out: &mut W, renderer: &SectionRenderer) -> io::Result<()>
    where
        W: Write,
    {
        for (i, section) in self.build_sections().iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }

            for line in renderer.render(section) {
                writeln!(out, "{}", line)?;
            }
        }

        out.flush()
    }

    fn build_hierarchy(&self, root: &Path, max_depth: Option<usize>) -> Result<Hierarchy, anyhow::Error> {
        let identifiers = nodes::enumerate(root, max_depth)?;
        let root_depth_offset = component_count(&root.to_string_lossy());

        debug!("Found {} nodes under {:?}", identifiers.len(), root);

        Ok(Hierarchy::build(identifiers, root_depth_offset))
    }

    fn compute_capacity(&self, hierarchy: &Hierarchy, weight: Column) -> Option<CapacityShare> {
        propagate(hierarchy, |id| weight.read_u64(self.reader, id))
            .map_err(|e| warn!("Guaranteed capacities are unavailable: {:#}", anyhow::Error::new(e)))
            .ok()
    }

    fn read_value(&self, column: &Column, node: &Node) -> String {
        match column.read(self.reader, node.identifier()) {
            Ok(raw) => format_value(&raw, column.format()),
            Err(e) => {
                debug!("{}", e);
                PLACEHOLDER.to_string()
            }
        }
    }

    fn attached_processes(&self, node: &Node) -> Vec<ProcessMetadata> {
        let pids = self
            .scanner
            .scan(node.identifier(), self.schema.processes_attribute())
            .unwrap_or_else(|e| {
                warn!("Could not list processes: {}", e);
                vec![]
            });

        pids.into_iter()
            .filter_map(|pid| match self.scanner.fetch_metadata(pid) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    // the process may have exited since the scan
                    debug!("Skipping process {}: {}", pid, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod test_report {
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use rstest::*;
    use tempfile::{tempdir, TempDir};

    use crate::cgroupfs::schema::{LegacySchema, UnifiedSchema};
    use crate::config::ReportConfig;
    use crate::core::attributes::fakes::FakeAttributeReader;
    use crate::core::controller::Controller;
    use crate::core::process::fakes::ScannerStub;
    use crate::core::process::ProcessMetadata;
    use crate::render::section::{Row, SectionRenderer};
    use crate::render::Palette;
    use crate::report::Report;

    fn id(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    /// A legacy cpu tree: `/` holding `system.slice` (with `cron.service`) and `user.slice`
    struct CpuTree {
        _dir: TempDir,
        root: PathBuf,
        schema: LegacySchema,
        reader: FakeAttributeReader,
    }

    impl CpuTree {
        fn node(&self, path: &str) -> String {
            id(&self.root.join(path))
        }
    }

    #[fixture]
    fn cpu_tree() -> CpuTree {
        let dir = tempdir().expect("Could not create tmp dir");
        let root = dir.path().join("cpu,cpuacct");

        fs::create_dir_all(root.join("system.slice/cron.service")).expect("Could not create nodes");
        fs::create_dir_all(root.join("user.slice")).expect("Could not create nodes");

        let mut reader = FakeAttributeReader::default();
        reader.set(&id(&root), "cpu.shares", "1024\n");
        reader.set(&id(&root), "cpu.cfs_quota_us", "-1\n");
        reader.set(&id(&root.join("system.slice")), "cpu.shares", "512\n");
        reader.set(&id(&root.join("system.slice/cron.service")), "cpu.shares", "1024\n");
        reader.set(&id(&root.join("user.slice")), "cpu.shares", "512\n");

        let schema = LegacySchema::new(BTreeMap::from([(Controller::Cpu, root.clone())]));

        CpuTree {
            _dir: dir,
            root,
            schema,
            reader,
        }
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(Row::name).collect()
    }

    fn column(rows: &[Row], pos: usize) -> Vec<&str> {
        rows.iter().map(|r| r.values()[pos].as_str()).collect()
    }

    #[rstest]
    fn test_should_render_enabled_controllers_by_default(cpu_tree: CpuTree) {
        let config = ReportConfig::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        assert_eq!(report.selected_controllers(), vec![Controller::Cpu]);
    }

    #[rstest]
    fn test_requested_controllers_should_be_rendered_in_fixed_order(cpu_tree: CpuTree) {
        let config = ReportConfig::default().with_controllers(vec![Controller::Io, Controller::Cpu]);
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        assert_eq!(report.selected_controllers(), vec![Controller::Cpu, Controller::Io]);
    }

    #[rstest]
    fn test_cpu_section_should_list_nodes_in_pre_order(cpu_tree: CpuTree) {
        let config = ReportConfig::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Cpu);

        assert!(section.is_available());
        assert_eq!(
            section.headers(),
            &["shares", "quota", "period", "usage", "guaranteed"]
        );
        assert_eq!(
            names(section.rows()),
            vec!["/", "system.slice", "cron.service", "user.slice"]
        );
        assert_eq!(
            section.rows().iter().map(Row::depth).collect::<Vec<usize>>(),
            vec![0, 1, 2, 1]
        );
    }

    #[rstest]
    fn test_missing_attributes_should_be_replaced_by_placeholder(cpu_tree: CpuTree) {
        let config = ReportConfig::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Cpu);

        assert_eq!(column(section.rows(), 0), vec!["1024", "512", "1024", "512"]);
        assert_eq!(column(section.rows(), 1), vec!["max", "-", "-", "-"]);
    }

    #[rstest]
    fn test_cpu_section_should_display_guaranteed_capacity(cpu_tree: CpuTree) {
        let config = ReportConfig::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Cpu);

        // root: 100 / (2048 / 1024), system.slice: 25 / (2048 / 1024)
        assert_eq!(column(section.rows(), 4), vec!["50.00%", "12.50%", "12.50%", "25.00%"]);
    }

    #[rstest]
    fn test_depth_limit_should_not_change_guaranteed_capacity(cpu_tree: CpuTree) {
        let config = ReportConfig::default().with_max_depth(Some(1));
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Cpu);

        assert_eq!(names(section.rows()), vec!["/", "system.slice", "user.slice"]);
        assert_eq!(column(section.rows(), 4), vec!["50.00%", "12.50%", "25.00%"]);
    }

    #[rstest]
    fn test_failed_propagation_should_keep_section_without_capacity(mut cpu_tree: CpuTree) {
        let missing = cpu_tree.node("user.slice");
        cpu_tree.reader.set(&missing, "cpu.shares", "unlimited\n");

        let config = ReportConfig::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Cpu);

        assert!(section.is_available());
        assert_eq!(column(section.rows(), 4), vec!["-", "-", "-", "-"]);
        assert_eq!(column(section.rows(), 0), vec!["1024", "512", "1024", "unlimited"]);
    }

    #[rstest]
    fn test_disabled_controller_should_be_unavailable(cpu_tree: CpuTree) {
        let config = ReportConfig::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Memory);

        assert!(!section.is_available());
        assert_eq!(section.title(), "memory [cgroup v1]");
    }

    #[test]
    fn test_unreadable_root_should_be_unavailable() {
        let dir = tempdir().expect("Could not create tmp dir");
        let schema = LegacySchema::new(BTreeMap::from([(Controller::Memory, dir.path().join("memory"))]));

        let config = ReportConfig::default();
        let reader = FakeAttributeReader::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &schema, &reader, &scanner);

        let section = report.build_section(Controller::Memory);

        assert!(!section.is_available());
        assert!(section.title().starts_with("memory [cgroup v1] "));
    }

    #[rstest]
    fn test_should_attach_processes_to_their_node(cpu_tree: CpuTree) {
        let mut scanner = ScannerStub::default();
        scanner.attach(&cpu_tree.node("system.slice/cron.service"), 812, "/usr/sbin/cron -f");
        scanner.attach_vanished(&cpu_tree.node("system.slice/cron.service"), 813);

        let config = ReportConfig::default().with_processes(true);
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Cpu);

        assert_eq!(
            section.rows()[2].processes(),
            &[ProcessMetadata::new(812, "/usr/sbin/cron -f")]
        );
        assert!(section.rows()[1].processes().is_empty());
    }

    #[rstest]
    fn test_processes_should_not_be_listed_by_default(cpu_tree: CpuTree) {
        let mut scanner = ScannerStub::default();
        scanner.attach(&cpu_tree.node("user.slice"), 1000, "bash");

        let config = ReportConfig::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);

        let section = report.build_section(Controller::Cpu);

        assert!(section.rows().iter().all(|r| r.processes().is_empty()));
    }

    #[test]
    fn test_unified_section_should_not_have_capacity_column() {
        let dir = tempdir().expect("Could not create tmp dir");
        fs::create_dir(dir.path().join("init.scope")).expect("Could not create node");
        let schema = UnifiedSchema::new(dir.path().to_path_buf(), vec![Controller::Memory]);

        let mut reader = FakeAttributeReader::default();
        reader.set(&id(&dir.path().join("init.scope")), "memory.current", "1048576\n");

        let config = ReportConfig::default();
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &schema, &reader, &scanner);

        let section = report.build_section(Controller::Memory);

        assert_eq!(section.headers(), &["current", "peak", "high", "max", "low"]);
        assert_eq!(names(section.rows()), vec!["/", "init.scope"]);
        assert_eq!(column(section.rows(), 0), vec!["-", "1.0M"]);
    }

    #[rstest]
    fn test_write_should_separate_sections_with_blank_line(cpu_tree: CpuTree) {
        let config = ReportConfig::default().with_controllers(vec![Controller::Cpu, Controller::Memory]);
        let scanner = ScannerStub::default();
        let report = Report::new(&config, &cpu_tree.schema, &cpu_tree.reader, &scanner);
        let renderer = SectionRenderer::new(120, Palette::new(false));

        let mut out = vec![];
        report.write(&mut out, &renderer).expect("Could not write report");

        let text = String::from_utf8(out).expect("Report is not UTF-8");
        let lines: Vec<&str> = text.lines().collect();

        // title, header, 4 nodes, blank line, title, unavailable line
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("cpu [cgroup v1] "));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "memory [cgroup v1]");
        assert_eq!(lines[8], "  memory controller is not enabled");
    }
}
