#![forbid(unsafe_code)]

//! Error type for the shared-state core.
//!
//! # Failure Modes
//!
//! | Error | Cause | Recovery |
//! |-------|-------|----------|
//! | `NotShared` | Cell name not declared by the component | Caller bug; nothing was touched |
//! | `Unbound` | Declared cell dropped by teardown | Do not link closed components |
//! | `NotRegistered` | Removing a component twice | Double teardown upstream |
//! | `AlreadyRegistered` | Appending the same instance twice | Caller bug |
//! | `AlreadyClosed` | Second teardown of a component | Ignore or fix the caller |
//! | `LinkOutOfRange` | Link index beyond the wanted list | Fix the mode definition |
//! | `Create` | A component factory failed | Propagated; no rollback |

use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by cells, hosts, the registry, and the mode assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `name` is not in the component's shared-cell declaration table.
    NotShared { component: String, name: String },
    /// `name` is declared but has no cell (the component was torn down).
    Unbound { component: String, name: String },
    /// The component is not in the registry.
    NotRegistered { component: String },
    /// The same component instance was appended twice.
    AlreadyRegistered { component: String },
    /// Teardown already ran for this component.
    AlreadyClosed { component: String },
    /// A link refers to a position outside the wanted component list.
    LinkOutOfRange { index: usize, len: usize },
    /// No component type with this name in the catalog.
    UnknownComponentType(String),
    /// No mode with this name in the catalog.
    UnknownMode(String),
    /// The application context was dropped while a component still used it.
    ContextDropped,
    /// A component factory failed.
    Create { type_name: String, reason: String },
    /// Configuration could not be read or parsed.
    Config(String),
}

impl Error {
    /// Build a [`Error::Create`] from any displayable reason.
    pub fn create(type_name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Create {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotShared { component, name } => {
                write!(f, "'{name}' is not a shared variable of {component}")
            }
            Self::Unbound { component, name } => {
                write!(f, "shared variable '{name}' of {component} is unbound")
            }
            Self::NotRegistered { component } => {
                write!(f, "component {component} is not registered")
            }
            Self::AlreadyRegistered { component } => {
                write!(f, "component {component} is already registered")
            }
            Self::AlreadyClosed { component } => {
                write!(f, "component {component} is already closed")
            }
            Self::LinkOutOfRange { index, len } => {
                write!(f, "link refers to component {index} but mode has {len}")
            }
            Self::UnknownComponentType(name) => write!(f, "unknown component type: {name}"),
            Self::UnknownMode(name) => write!(f, "unknown mode: {name}"),
            Self::ContextDropped => write!(f, "application context dropped"),
            Self::Create { type_name, reason } => {
                write!(f, "failed to create {type_name}: {reason}")
            }
            Self::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
