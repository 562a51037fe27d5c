//! Access to the attribute files of the nodes, and description of the columns rendered from them

use crate::core::Error;

/// Type which can read the raw content of an attribute of a node
pub trait ReadAttribute {
    /// Returns the full content of the attribute, which may span multiple lines
    ///
    /// # Arguments
    ///  * `node`: The identifier of the node
    ///  * `attribute`: The name of the attribute file (e.g. `cpu.shares`)
    fn read(&self, node: &str, attribute: &str) -> Result<String, Error>;

    /// Returns the whitespace-separated fields of the first line of the attribute
    fn fields(&self, node: &str, attribute: &str) -> Result<Vec<String>, Error> {
        let content = self.read(node, attribute)?;

        Ok(content
            .lines()
            .next()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}

/// Part of an attribute file which is displayed in a column
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum Field {
    /// The whole content of the file
    Whole,
    /// A whitespace-separated token of the first line of the file
    Token(usize),
    /// The value following the given key, in a file made of `key value` lines
    Keyed(&'static str),
}

/// How the raw value of a column is presented
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum Format {
    Raw,
    /// Amount of bytes, `max` or the kernel's unlimited sentinel meaning no limit
    Bytes,
    /// A limit where `max` or `-1` means no limit
    Limit,
    Nanoseconds,
    Microseconds,
    /// One entry per line
    Lines,
}

/// A value displayed for each node of a controller section
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub struct Column {
    header: &'static str,
    attribute: &'static str,
    field: Field,
    format: Format,
}

impl Column {
    pub const fn new(header: &'static str, attribute: &'static str, field: Field, format: Format) -> Self {
        Column {
            header,
            attribute,
            field,
            format,
        }
    }

    pub fn header(&self) -> &'static str {
        self.header
    }

    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Reads the raw value of this column for the given node
    pub fn read(&self, reader: &dyn ReadAttribute, node: &str) -> Result<String, Error> {
        match self.field {
            Field::Whole => Ok(reader.read(node, self.attribute)?.trim_end().to_string()),
            Field::Token(pos) => reader
                .fields(node, self.attribute)?
                .into_iter()
                .nth(pos)
                .ok_or_else(|| self.invalid(node, format!("no token at position {}", pos))),
            Field::Keyed(key) => {
                let content = reader.read(node, self.attribute)?;

                content
                    .lines()
                    .filter_map(|l| {
                        let mut tokens = l.split_whitespace();
                        match (tokens.next(), tokens.next()) {
                            (Some(k), Some(v)) if k == key => Some(v.to_string()),
                            _ => None,
                        }
                    })
                    .next()
                    .ok_or_else(|| self.invalid(node, format!("no value for key '{}'", key)))
            }
        }
    }

    /// Reads the value of this column for the given node, as an unsigned integer
    pub fn read_u64(&self, reader: &dyn ReadAttribute, node: &str) -> Result<u64, Error> {
        let raw = self.read(reader, node)?;

        raw.parse::<u64>()
            .map_err(|_| self.invalid(node, format!("'{}' is not an unsigned integer", raw)))
    }

    fn invalid(&self, node: &str, reason: String) -> Error {
        Error::InvalidAttribute {
            node: node.to_string(),
            attribute: self.attribute.to_string(),
            reason,
        }
    }
}
