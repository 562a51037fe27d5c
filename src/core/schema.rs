//! The set of capabilities through which the layout of a resource-control hierarchy is accessed

use std::path::Path;

use crate::core::attributes::Column;
use crate::core::controller::Controller;

/// Describes where the nodes of each controller live, and which of their attributes are reported.
///
/// The legacy layout (one tree per controller) and the unified layout (one tree for all
/// controllers) both implement this trait, so that the report never depends on which one is active.
pub trait AttributeSchema {
    /// Short description of the layout, displayed in section titles
    fn label(&self) -> &'static str;

    /// Returns the controllers which are enabled on the system, in rendering order
    fn controllers(&self) -> Vec<Controller>;

    /// Returns the root directory of the tree holding the nodes of a controller
    fn controller_root(&self, controller: Controller) -> Option<&Path>;

    /// Returns the columns to render for each node of the controller
    fn columns(&self, controller: Controller) -> &'static [Column];

    /// Returns the column holding the scheduler weight from which the guaranteed CPU capacity of
    /// each node is derived, if this layout supports it for the controller
    fn capacity_weight(&self, controller: Controller) -> Option<Column>;

    /// Name of the attribute listing the processes attached to a node
    fn processes_attribute(&self) -> &'static str {
        "cgroup.procs"
    }
}
