//! Platform-independant model of a resource-control hierarchy

use thiserror::Error;

pub mod attributes;
pub mod capacity;
pub mod controller;
pub mod hierarchy;
pub mod process;
pub mod schema;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Attribute '{attribute}' is unavailable for node '{node}'")]
    AttributeUnavailable {
        node: String,
        attribute: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Attribute '{attribute}' of node '{node}' has invalid content: {reason}")]
    InvalidAttribute {
        node: String,
        attribute: String,
        reason: String,
    },
    #[error("Capacity propagation aborted at node '{0}'")]
    PropagationAborted(String, #[source] Box<Error>),
}

impl Error {
    pub fn unavailable<N, A>(node: N, attribute: A, source: anyhow::Error) -> Self
    where
        N: Into<String>,
        A: Into<String>,
    {
        Error::AttributeUnavailable {
            node: node.into(),
            attribute: attribute.into(),
            source,
        }
    }
}
