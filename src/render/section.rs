//! Rendering of one controller section: a title, a header and one row per node

use crate::core::process::ProcessMetadata;
use crate::render::layout::{fit_name, indent, shorten_name, truncate_line};
use crate::render::{Palette, Style};

/// Header of the column holding the name of the nodes
const NAME_HEADER: &str = "node";
/// The name column is never narrower than this, even on a narrow terminal
const MIN_NAME_WIDTH: usize = 8;
/// Spaces between two columns
const COLUMN_GAP: usize = 2;

/// The values of one node
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Row {
    depth: usize,
    name: String,
    values: Vec<String>,
    processes: Vec<ProcessMetadata>,
}

impl Row {
    pub fn new<N>(depth: usize, name: N, values: Vec<String>) -> Self
    where
        N: Into<String>,
    {
        Self {
            depth,
            name: name.into(),
            values,
            processes: vec![],
        }
    }

    /// Attaches processes to the row, listed below it
    pub fn with_processes(mut self, processes: Vec<ProcessMetadata>) -> Self {
        self.processes = processes;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn processes(&self) -> &[ProcessMetadata] {
        &self.processes
    }

    /// Returns the indented and shortened name of the node
    fn label(&self) -> String {
        format!("{}{}", indent(self.depth), shorten_name(&self.name))
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum Body {
    Rows(Vec<Row>),
    Unavailable(String),
}

/// The report of one controller
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Section {
    title: String,
    headers: Vec<String>,
    body: Body,
}

impl Section {
    pub fn new<T>(title: T, headers: Vec<String>) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            headers,
            body: Body::Rows(vec![]),
        }
    }

    /// Builds a section whose nodes could not be read, displaying `reason` instead
    pub fn unavailable<T, R>(title: T, reason: R) -> Self
    where
        T: Into<String>,
        R: Into<String>,
    {
        Self {
            title: title.into(),
            headers: vec![],
            body: Body::Unavailable(reason.into()),
        }
    }

    pub fn push_row(&mut self, row: Row) {
        if let Body::Rows(rows) = &mut self.body {
            rows.push(row);
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn is_available(&self) -> bool {
        matches!(self.body, Body::Rows(_))
    }

    pub fn rows(&self) -> &[Row] {
        match &self.body {
            Body::Rows(rows) => rows,
            Body::Unavailable(_) => &[],
        }
    }
}

/// Renders sections as lines of text fitting a given width
pub struct SectionRenderer {
    width: usize,
    palette: Palette,
}

impl SectionRenderer {
    pub fn new(width: usize, palette: Palette) -> Self {
        Self { width, palette }
    }

    pub fn render(&self, section: &Section) -> Vec<String> {
        let mut lines = vec![self.line(Style::Title, &section.title)];

        match &section.body {
            Body::Unavailable(reason) => {
                lines.push(self.line(Style::Unavailable, &format!("{}{}", indent(1), reason)));
            }
            Body::Rows(rows) => self.render_rows(&section.headers, rows, &mut lines),
        }

        lines
    }

    fn render_rows(&self, headers: &[String], rows: &[Row], lines: &mut Vec<String>) {
        let value_widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                rows.iter()
                    .filter_map(|r| r.values.get(i))
                    .map(|v| v.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let labels: Vec<String> = rows.iter().map(Row::label).collect();
        let name_width = self.name_width(&labels, &value_widths);

        let header_names: Vec<&str> = headers.iter().map(String::as_str).collect();
        lines.push(self.line(
            Style::Header,
            &Self::format_row(NAME_HEADER, &header_names, name_width, &value_widths),
        ));

        for (row, label) in rows.iter().zip(labels) {
            let values: Vec<&str> = row.values.iter().map(String::as_str).collect();
            let text = Self::format_row(&fit_name(&label, name_width), &values, name_width, &value_widths);

            lines.push(self.line(Style::Node, &text));

            for process in row.processes.iter() {
                let text = format!("{}{} {}", indent(row.depth + 1), process.pid(), process.command());
                lines.push(self.line(Style::Process, &text));
            }
        }
    }

    /// The name column is as wide as the widest label, but leaves room for the values on the line
    fn name_width(&self, labels: &[String], value_widths: &[usize]) -> usize {
        let values_width: usize = value_widths.iter().map(|w| w + COLUMN_GAP).sum();

        let widest_label = labels
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(NAME_HEADER.len()))
            .max()
            .unwrap_or(0);

        widest_label
            .min(self.width.saturating_sub(values_width))
            .max(MIN_NAME_WIDTH)
    }

    fn format_row(name: &str, values: &[&str], name_width: usize, value_widths: &[usize]) -> String {
        let mut text = format!("{:<width$}", name, width = name_width);

        for (value, width) in values.iter().zip(value_widths) {
            text.push_str(&format!("{:gap$}{:>width$}", "", value, gap = COLUMN_GAP, width = *width));
        }

        text
    }

    /// Truncates the line to the width of the terminal, then decorates it
    fn line(&self, line_style: Style, text: &str) -> String {
        self.palette.paint(line_style, &truncate_line(text, self.width))
    }
}
