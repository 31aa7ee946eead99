#![forbid(unsafe_code)]

//! Table of which shared cells are linked across the running panels.
//!
//! The inspector declares no shared variables of its own. It follows the
//! registry's event stream, rebuilds its table whenever a panel comes or
//! goes, and can link two panels' cells by registry position.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, LinkOutcome, SharedHost, Subscription,
    link_cells, linked_groups,
};
use tracing::debug;

use crate::error::{PanelError, Result};

/// One shared cell and the panels holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRow {
    pub cell_name: String,
    /// Panel names, in registry order.
    pub members: Vec<String>,
}

impl CellRow {
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.members.len() > 1
    }
}

pub struct LinkInspector {
    host: SharedHost,
    rows: RefCell<Vec<CellRow>>,
    refreshes: Cell<u64>,
    watch: RefCell<Option<Subscription>>,
}

impl LinkInspector {
    /// Rebuild the table from the registry.
    pub fn refresh(&self) {
        let Some(ctx) = self.host.context() else {
            return;
        };
        let rows: Vec<CellRow> = linked_groups(ctx.registry())
            .into_iter()
            .map(|group| CellRow {
                cell_name: group.cell_name,
                members: group.members.into_iter().map(|(_, name)| name).collect(),
            })
            .collect();
        debug!(rows = rows.len(), "link table refreshed");
        *self.rows.borrow_mut() = rows;
        self.refreshes.set(self.refreshes.get() + 1);
    }

    #[must_use]
    pub fn rows(&self) -> Vec<CellRow> {
        self.rows.borrow().clone()
    }

    /// Rows shared by more than one panel.
    #[must_use]
    pub fn linked_rows(&self) -> Vec<CellRow> {
        self.rows
            .borrow()
            .iter()
            .filter(|r| r.is_linked())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.get()
    }

    /// Make the cell `dest_var` of the panel at `dest` the same as `src_var`
    /// of the panel at `src`, then refresh the table.
    pub fn link(
        &self,
        dest: usize,
        dest_var: &str,
        src: usize,
        src_var: &str,
    ) -> Result<LinkOutcome> {
        let ctx = self
            .host
            .context()
            .ok_or(artview_core::Error::ContextDropped)?;
        let registry = ctx.registry();
        let dest = registry.get(dest).ok_or(PanelError::NoComponentAt(dest))?;
        let src = registry.get(src).ok_or(PanelError::NoComponentAt(src))?;
        let outcome = link_cells(&*dest, dest_var, &*src, src_var)?;
        self.refresh();
        Ok(outcome)
    }
}

impl Component for LinkInspector {
    fn host(&self) -> &SharedHost {
        &self.host
    }

    fn close(&self) -> artview_core::Result<()> {
        self.watch.borrow_mut().take();
        self.host.teardown()
    }
}

impl ComponentFactory for LinkInspector {
    const TYPE_NAME: &'static str = "LinkInspector";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let inspector = ctx.register(Rc::new(Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec).build(),
            rows: RefCell::new(Vec::new()),
            refreshes: Cell::new(0),
            watch: RefCell::new(None),
        }))?;
        let weak = Rc::downgrade(&inspector);
        let watch = ctx.registry().subscribe_scoped(move |_event, _strength| {
            if let Some(this) = weak.upgrade() {
                this.refresh();
            }
        });
        *inspector.watch.borrow_mut() = Some(watch);
        inspector.refresh();
        Ok(inspector)
    }
}
