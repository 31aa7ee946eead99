#![forbid(unsafe_code)]

//! Errors raised by panel actions.

use std::fmt;

use crate::dataset::DatasetError;

pub type Result<T, E = PanelError> = std::result::Result<T, E>;

/// Failure of a user-triggered panel action.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelError {
    /// A shared-cell operation failed.
    Core(artview_core::Error),
    /// A dataset could not be read or gridded.
    Dataset(DatasetError),
    /// The context has no service of the named type.
    MissingService(&'static str),
    /// A shared cell the action needs holds nothing usable.
    NothingSelected { panel: String, variable: &'static str },
    /// The requested choice is not offered.
    InvalidChoice { panel: String, choice: String },
    /// No registered component at this position.
    NoComponentAt(usize),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(e) => write!(f, "{e}"),
            Self::Dataset(e) => write!(f, "{e}"),
            Self::MissingService(name) => write!(f, "no {name} available"),
            Self::NothingSelected { panel, variable } => {
                write!(f, "{panel}: nothing in {variable}")
            }
            Self::InvalidChoice { panel, choice } => {
                write!(f, "{panel}: '{choice}' is not an available choice")
            }
            Self::NoComponentAt(index) => write!(f, "no component at position {index}"),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(e) => Some(e),
            Self::Dataset(e) => Some(e),
            _ => None,
        }
    }
}

impl From<artview_core::Error> for PanelError {
    fn from(e: artview_core::Error) -> Self {
        Self::Core(e)
    }
}

impl From<DatasetError> for PanelError {
    fn from(e: DatasetError) -> Self {
        Self::Dataset(e)
    }
}

impl PanelError {
    pub(crate) fn invalid_choice(panel: &str, choice: impl fmt::Display) -> Self {
        Self::InvalidChoice {
            panel: panel.to_owned(),
            choice: choice.to_string(),
        }
    }

    pub(crate) fn nothing_selected(panel: &str, variable: &'static str) -> Self {
        Self::NothingSelected {
            panel: panel.to_owned(),
            variable,
        }
    }
}
