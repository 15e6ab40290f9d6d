//! Registry of request types the client accepts.

use std::collections::BTreeMap;

use crate::error::CvClientError;

/// Maps the request type names callers use to the solver names the server
/// expects (`aaa` -> `aaa_floating`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTypes {
    solvers: BTreeMap<String, String>,
}

impl RequestTypes {
    pub fn new(solvers: BTreeMap<String, String>) -> Self {
        Self { solvers }
    }

    /// Returns the server-side name, or `InvalidRequestType` for unknown names.
    pub fn resolve(&self, name: &str) -> Result<&str, CvClientError> {
        match self.solvers.get(name) {
            Some(solver) => Ok(solver.as_str()),
            None => {
                tracing::error!("No handler for request: {}", name);
                Err(CvClientError::InvalidRequestType(name.to_string()))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.solvers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.solvers.keys().map(String::as_str)
    }
}
