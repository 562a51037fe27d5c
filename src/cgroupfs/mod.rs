//! This module offers the hierarchy collaborators for Linux, based on the cgroup filesystem and on
//! the /proc filesystem

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod libc;
pub mod mounts;
pub mod nodes;
pub mod parsers;
pub mod process;
pub mod schema;

#[derive(Error, Debug)]
pub enum CgroupfsError {
    #[error(transparent)]
    IOError(#[from] io::Error),
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),
    #[error("Invalid file content: {0}")]
    InvalidFileContent(String),
    #[error("Could not read filesystem information of '{0:?}'")]
    StatfsError(PathBuf, #[source] io::Error),
    #[error("No resource-control hierarchy is mounted")]
    NoHierarchy,
}
