//! Settings of a report, built once from the command line

use crate::core::controller::Controller;

/// Settings read during the rendering of a report
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportConfig {
    max_depth: Option<usize>,
    show_processes: bool,
    color: bool,
    controllers: Vec<Controller>,
    width: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            show_processes: false,
            color: true,
            controllers: vec![],
            width: None,
        }
    }
}

impl ReportConfig {
    /// Limits the depth of the rendered nodes, the root of each tree having a depth of 0
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_processes(mut self, show_processes: bool) -> Self {
        self.show_processes = show_processes;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Restricts the report to the given controllers. All enabled controllers are rendered if empty.
    pub fn with_controllers(mut self, controllers: Vec<Controller>) -> Self {
        self.controllers = controllers;
        self
    }

    /// Forces the width of the rendered lines, instead of the width of the terminal
    pub fn with_width(mut self, width: Option<usize>) -> Self {
        self.width = width;
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn show_processes(&self) -> bool {
        self.show_processes
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn width(&self) -> Option<usize> {
        self.width
    }
}
