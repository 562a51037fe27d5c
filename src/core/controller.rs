//! Resource controllers that can be reported on

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A resource dimension governed independently at each node of the hierarchy
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Copy, Clone)]
pub enum Controller {
    Cpu,
    Cpuset,
    Memory,
    Io,
}

impl Controller {
    /// All the controllers, in the order in which their sections are rendered
    pub const ALL: [Controller; 4] = [Controller::Cpu, Controller::Cpuset, Controller::Memory, Controller::Io];

    /// Returns the name of the controller under the unified hierarchy
    pub fn name(&self) -> &'static str {
        match self {
            Controller::Cpu => "cpu",
            Controller::Cpuset => "cpuset",
            Controller::Memory => "memory",
            Controller::Io => "io",
        }
    }

    /// Returns the name of the controller as it appears in the mount options of a legacy hierarchy
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Controller::Io => "blkio",
            _ => self.name(),
        }
    }

    /// Finds the controller which has the given name, under either schema
    pub fn from_name(name: &str) -> Option<Controller> {
        Self::ALL
            .iter()
            .find(|c| c.name() == name || c.legacy_name() == name)
            .copied()
    }
}

impl Display for Controller {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Controller {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Controller::from_name(s).ok_or_else(|| format!("unknown controller '{}'", s))
    }
}
