//! Processes attached to the nodes, and their command line

use std::fs;
use std::path::{Path, PathBuf};

use crate::cgroupfs::parsers::{read_data, PidList};
use crate::core::process::{Pid, ProcessMetadata, ProcessScanner};
use crate::core::Error;

/// Implementation of ProcessScanner that reads the attached PIDs from the node and the command
/// lines from the `/proc` Linux virtual directory
pub struct ProcfsScanner {
    proc_dir: PathBuf,
}

impl Default for ProcfsScanner {
    fn default() -> Self {
        ProcfsScanner::new()
    }
}

impl ProcfsScanner {
    /// Returns a new ProcfsScanner instance
    pub fn new() -> ProcfsScanner {
        ProcfsScanner {
            proc_dir: PathBuf::from("/proc"),
        }
    }

    /// Returns a ProcfsScanner reading process information from another directory than `/proc`
    pub fn with_proc_dir<P>(proc_dir: P) -> ProcfsScanner
    where
        P: Into<PathBuf>,
    {
        ProcfsScanner {
            proc_dir: proc_dir.into(),
        }
    }

    fn read_process_file(&self, pid: Pid, name: &str) -> Result<String, Error> {
        let process_dir = self.proc_dir.join(pid.to_string());

        fs::read(process_dir.join(name))
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|e| Error::unavailable(process_dir.to_string_lossy(), name, e.into()))
    }
}

impl ProcessScanner for ProcfsScanner {
    fn scan(&self, node: &str, attribute: &str) -> Result<Vec<Pid>, Error> {
        read_data::<PidList>(&Path::new(node).join(attribute))
            .map(PidList::into_pids)
            .map_err(|e| Error::unavailable(node, attribute, e.into()))
    }

    /// Fetch and returns the metadata of a process
    ///
    /// Kernel threads have no command line, their command is then displayed in brackets, as `ps` does.
    ///
    /// # Arguments
    ///  * `pid`: The identifier of the process for which to retrieve metadata
    fn fetch_metadata(&self, pid: Pid) -> Result<ProcessMetadata, Error> {
        let cmdline = self.read_process_file(pid, "cmdline")?;

        let arguments: Vec<&str> = cmdline.split('\0').filter(|a| !a.is_empty()).collect();

        if !arguments.is_empty() {
            return Ok(ProcessMetadata::new(pid, arguments.join(" ")));
        }

        let comm = self.read_process_file(pid, "comm")?;

        Ok(ProcessMetadata::new(pid, format!("[{}]", comm.trim_end())))
    }
}
