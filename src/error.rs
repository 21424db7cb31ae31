//! Crate-level error types.

use std::fmt;

use crate::gpu::{GraphicsApi, ResourceState};

/// Errors produced by the afterglow crate.
#[derive(Debug)]
pub enum Error {
    /// Barrier construction was attempted against a device whose graphics
    /// API is unknown or has no barrier backend. Silently skipping a hazard
    /// transition would be a correctness bug, so this fails closed.
    UnsupportedBackend(Option<GraphicsApi>),
    /// A barrier targeted a view that has no live backing resource.
    InvalidResource {
        /// Debug name of the offending view.
        name: String,
    },
    /// A resource was handed to an operation in the wrong usage state.
    StateMismatch {
        /// Debug name of the resource.
        name: String,
        /// State the operation requires.
        expected: ResourceState,
        /// State the resource was actually in.
        actual: ResourceState,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedBackend(Some(api)) => {
                write!(f, "no barrier backend for graphics API {api}")
            }
            Self::UnsupportedBackend(None) => {
                write!(f, "device reports no barrier-capable graphics API")
            }
            Self::InvalidResource { name } => {
                write!(f, "resource view '{name}' has no backing allocation")
            }
            Self::StateMismatch {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "resource '{name}' is in state {actual}, operation \
                     requires {expected}"
                )
            }
        }
    }
}

impl std::error::Error for Error {}
