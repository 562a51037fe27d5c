//! Parsers to read structured data from the cgroup and /proc filesystems

use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::cgroupfs::CgroupfsError;
use crate::core::attributes::ReadAttribute;
use crate::core::process::Pid;
use crate::core::Error;

/// Type which can be parsed from a `TokenParser`
pub trait Parse: Sized {
    fn parse(token_parser: &TokenParser) -> Result<Self, CgroupfsError>;
}

/// Reads the file at the given path and parses its content
pub fn read_data<D>(filepath: &Path) -> Result<D, CgroupfsError>
where
    D: Parse,
{
    let mut content = String::new();
    File::open(filepath)?.read_to_string(&mut content)?;

    D::parse(&TokenParser::new(&content))
}

/// Reads the attributes of the nodes from the filesystem, a node being the directory holding its attribute files
#[derive(Default)]
pub struct AttributeReader;

impl ReadAttribute for AttributeReader {
    fn read(&self, node: &str, attribute: &str) -> Result<String, Error> {
        fs::read_to_string(Path::new(node).join(attribute)).map_err(|e| Error::unavailable(node, attribute, e.into()))
    }
}

/// Represents the content of `cgroup.procs`: one PID per line
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PidList {
    pids: Vec<Pid>,
}

impl PidList {
    /// Returns the PIDs, sorted in ascending order
    pub fn into_pids(self) -> Vec<Pid> {
        self.pids
    }
}

impl Parse for PidList {
    fn parse(token_parser: &TokenParser) -> Result<Self, CgroupfsError> {
        let mut pids = (0..token_parser.line_count())
            .filter(|l| !token_parser.is_blank(*l))
            .map(|l| token_parser.token::<Pid>(l, 0))
            .collect::<Result<Vec<Pid>, CgroupfsError>>()?;

        pids.sort_unstable();

        Ok(PidList { pids })
    }
}

/// Parses whitespace-separated tokens from a given multi-line string slice
pub struct TokenParser<'a> {
    lines: Vec<Vec<&'a str>>,
}

impl<'a> TokenParser<'a> {
    /// Builds a token parser from a string slice
    /// # Arguments
    ///  * `content` The string slice from which to parse tokens
    pub fn new(content: &'a str) -> TokenParser<'a> {
        let lines = content.lines().map(|l| l.split_whitespace().collect()).collect();

        TokenParser { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns all the tokens of a line, or an empty slice if the line does not exist
    pub fn line(&self, line_no: usize) -> &[&'a str] {
        self.lines.get(line_no).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_blank(&self, line_no: usize) -> bool {
        self.line(line_no).is_empty()
    }

    /// Get the value of a token from the parser
    /// # Arguments
    ///  * `line_no`: The line number from which to retrieve the token
    ///  * `pos`: The position of the token in the line (e.g. 1 for token 'b' in line 'a b c')
    pub fn token<T>(&self, line_no: usize, pos: usize) -> Result<T, CgroupfsError>
    where
        T: std::str::FromStr,
    {
        self.lines
            .get(line_no)
            .ok_or_else(|| {
                let err_msg = format!("Could not get data at line {} and position {}", line_no, pos);
                CgroupfsError::InvalidFileFormat(err_msg)
            })?
            .get(pos)
            .ok_or_else(|| {
                let err_msg = format!("Could not get token at line {} and position {}", line_no, pos);
                CgroupfsError::InvalidFileFormat(err_msg)
            })?
            .parse::<T>()
            .map_err(|_| {
                let err_msg = format!("The token at line {} and position {} could not be parsed", line_no, pos);
                CgroupfsError::InvalidFileContent(err_msg)
            })
    }
}
