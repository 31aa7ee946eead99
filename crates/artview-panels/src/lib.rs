#![forbid(unsafe_code)]

//! ARTview panels on top of `artview-core`.
//!
//! # Role in ARTview
//! This crate supplies the concrete panels a mode wires together, the
//! dataset collaborators they call, and the built-in mode definitions.
//! The panels are headless: each keeps the state a window would draw
//! (the current frame, the offered choices) and exposes the actions a
//! user would trigger.
//!
//! # Collaborators
//! Panels reach file I/O and gridding only through services on the
//! [`AppContext`](artview_core::AppContext):
//!
//! ```ignore
//! ctx.provide::<Rc<dyn DatasetLoader>>(Rc::new(SyntheticLoader::new()));
//! ctx.provide::<Rc<dyn Gridder>>(Rc::new(SyntheticGridder));
//! ```

pub mod dataset;
pub mod error;
pub mod modes;
pub mod panels;

pub use dataset::{
    DatasetError, DatasetLoader, FileList, GateFilter, GridDataset, GridOptions, Gridder,
    MemoryLoader, RadarDataset, SyntheticGridder, SyntheticLoader,
};
pub use error::{PanelError, Result};
pub use modes::{builtin_modes, component_catalog, modes_for};
pub use panels::{
    CellRow, FieldSelector, FileNavigator, GridDisplay, GridFrame, LinkInspector, Mapper, Menu,
    Opened, RadarDisplay, RadarFrame, TiltSelector,
};
