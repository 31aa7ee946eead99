#![forbid(unsafe_code)]

//! ARTview session runner.
//!
//! The binary assembles modes from [`artview_panels`] against a context
//! backed by synthetic data, drives the panels from the command line, and
//! reports how their shared cells ended up wired.

pub mod cli;
pub mod logging;
pub mod session;

pub use cli::{Opts, ParseError};
pub use session::{Report, ReportFormat, SessionError, SessionPlan, run};
