#![forbid(unsafe_code)]

//! Core: shared cells, component registry, and mode wiring for ARTview.
//!
//! # Role in ARTview
//! `artview-core` is the synchronisation layer between panels. A panel that
//! changes the open radar volume, the selected field, or the active gate
//! filter does so by changing a shared cell; every other panel holding the
//! same cell reacts through its declared handler.
//!
//! # Primary responsibilities
//! - **Observable cells** ([`reactive`]): value slots with ordered,
//!   synchronous notification and a strong/weak hint.
//! - **Component registry** ([`registry`]): the ordered list of live panels,
//!   itself observable.
//! - **Shared-state host** ([`component`]): the declaration table every panel
//!   carries and its connect/disconnect/teardown lifecycle.
//! - **Links and modes** ([`link`], [`mode`], [`catalog`]): declarative
//!   wiring that reuses running panels, creates missing ones, and makes
//!   named cells identical across panels.
//!
//! # How it fits in the system
//! `artview-panels` implements concrete panels on top of [`component`];
//! the `artview` binary owns the [`AppContext`] and switches modes.
//! Everything runs on one thread; nothing here blocks or spawns.

pub mod catalog;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod link;
pub mod mode;
pub mod reactive;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{ComponentCatalog, ModeCatalog, ModeDefinition};
pub use component::{
    Component, ComponentFactory, ComponentId, ComponentSpec, ComponentType, Handler, LinkOutcome,
    Reaction, SharedHost, SlotState, downcast_rc,
};
pub use config::{ArtviewConfig, LogConfig};
pub use context::{AppContext, WeakContext, WindowHandle};
pub use error::{Error, Result};
pub use link::{CellRef, Link, SharedGroup, link_cells, linked_groups, shares_cell};
pub use mode::{Assembly, ModeAssembler, ModeSpec, change_mode};
pub use reactive::{Observable, SharedCell, Strength, Subscription, SubscriptionId, Value};
pub use registry::{ComponentRegistry, RegistryEvent};
