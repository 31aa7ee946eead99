#![forbid(unsafe_code)]

//! Link instructions: make one component's shared variable the same cell as
//! another's.
//!
//! A [`Link`] names its endpoints by position in a wanted-component list and
//! by shared-variable name, so mode definitions can be written as data
//! before any component exists. [`link_cells`] applies a single link between
//! two live components; [`linked_groups`] reports which components currently
//! share a cell.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::{Component, ComponentId, LinkOutcome};
use crate::error::Result;
use crate::reactive::SharedCell;
use crate::registry::ComponentRegistry;

/// One endpoint of a link: a component position and a shared-variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub component: usize,
    pub cell: String,
}

impl CellRef {
    #[must_use]
    pub fn new(component: usize, cell: impl Into<String>) -> Self {
        Self {
            component,
            cell: cell.into(),
        }
    }
}

/// Make `dest`'s cell the same object as `src`'s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub dest: CellRef,
    pub src: CellRef,
}

impl Link {
    #[must_use]
    pub fn new(dest: (usize, &str), src: (usize, &str)) -> Self {
        Self {
            dest: CellRef::new(dest.0, dest.1),
            src: CellRef::new(src.0, src.1),
        }
    }

    /// Highest component position this link refers to.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.dest.component.max(self.src.component)
    }
}

/// Point `dest`'s `dest_name` at the cell behind `src`'s `src_name`.
///
/// Both names are checked before anything changes. If the two already share
/// a cell the call is a no-op; otherwise `dest`'s handler moves to the
/// adopted cell and runs once with its current value.
pub fn link_cells(
    dest: &dyn Component,
    dest_name: &str,
    src: &dyn Component,
    src_name: &str,
) -> Result<LinkOutcome> {
    let cell = src.host().cell(src_name)?;
    // Surface an undeclared destination before rebind touches anything.
    dest.host().cell(dest_name)?;
    let outcome = dest.host().rebind(dest_name, cell)?;
    debug!(
        dest = dest.name(),
        dest_var = dest_name,
        src = src.name(),
        src_var = src_name,
        ?outcome,
        "link applied"
    );
    Ok(outcome)
}

/// Components sharing one cell under one variable name.
#[derive(Debug, Clone)]
pub struct SharedGroup {
    pub cell_name: String,
    pub cell: SharedCell,
    pub members: Vec<(ComponentId, String)>,
}

impl SharedGroup {
    /// Whether more than one component holds this cell.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.members.len() > 1
    }

    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.members.iter().any(|(member, _)| *member == id)
    }
}

/// Group every bound shared variable in the registry by cell identity.
///
/// Groups appear in order of their first member's registry position, then
/// declaration order. Variables with different names never share a group,
/// even when they hold the same cell.
#[must_use]
pub fn linked_groups(registry: &ComponentRegistry) -> Vec<SharedGroup> {
    let mut groups: Vec<SharedGroup> = Vec::new();
    for component in registry.snapshot() {
        collect_component(&mut groups, &component);
    }
    groups
}

fn collect_component(groups: &mut Vec<SharedGroup>, component: &Rc<dyn Component>) {
    let host = component.host();
    for name in host.shared_names() {
        let Ok(cell) = host.cell(&name) else {
            continue;
        };
        let member = (component.id(), component.name().to_owned());
        match groups
            .iter_mut()
            .find(|g| g.cell_name == name && g.cell.ptr_eq(&cell))
        {
            Some(group) => group.members.push(member),
            None => groups.push(SharedGroup {
                cell_name: name,
                cell,
                members: vec![member],
            }),
        }
    }
}

/// Whether `a`'s `a_name` and `b`'s `b_name` are the same cell.
#[must_use]
pub fn shares_cell(a: &dyn Component, a_name: &str, b: &dyn Component, b_name: &str) -> bool {
    match (a.host().cell(a_name), b.host().cell(b_name)) {
        (Ok(x), Ok(y)) => x.ptr_eq(&y),
        _ => false,
    }
}
