//! Processes attached to the nodes of a hierarchy

use crate::core::Error;

/// Represents the unique ID of a running process
///
/// On Linux 64 bits, the maximum value for a PID is 4194304, hence u32
pub type Pid = u32;

/// Basic metadata of a process (PID, command line)
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProcessMetadata {
    pid: Pid,
    command: String,
}

impl ProcessMetadata {
    /// Returns a new instance of a ProcessMetadata
    pub fn new<T>(pid: Pid, command: T) -> ProcessMetadata
    where
        T: Into<String>,
    {
        ProcessMetadata {
            pid,
            command: command.into(),
        }
    }

    /// Returns the process identifier assigned to the process by the OS
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Returns the command line used to execute the given process, including its arguments
    pub fn command(&self) -> &str {
        self.command.as_str()
    }
}

/// Trait with methods to retrieve the processes attached to a node
pub trait ProcessScanner {
    /// Returns the PIDs of the processes attached to the node
    ///
    /// # Arguments
    ///
    /// * `node`: The identifier of the node
    /// * `attribute`: The name of the attribute of the node listing its processes
    fn scan(&self, node: &str, attribute: &str) -> Result<Vec<Pid>, Error>;

    /// Returns the ProcessMetadata of the currently running process with the given PID
    ///
    /// # Arguments
    ///
    /// * `pid`: The process identifier of the currently running process
    fn fetch_metadata(&self, pid: Pid) -> Result<ProcessMetadata, Error>;
}


#[cfg(test)]
mod test_process_metadata {
    use crate::core::process::ProcessMetadata;

    #[test]
    fn test_pid_should_be_pm_pid() {
        assert_eq!(ProcessMetadata::new(123, "command").pid(), 123);
    }

    #[test]
    fn test_command_should_be_pm_command() {
        assert_eq!(ProcessMetadata::new(123, "sleep 10").command(), "sleep 10");
    }
}
