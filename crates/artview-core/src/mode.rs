#![forbid(unsafe_code)]

//! Mode assembly: bring a set of component types up and wire their cells.
//!
//! A [`ModeSpec`] lists the component types a layout needs and the links
//! between them. [`ModeAssembler::assemble`] applies it in three passes:
//!
//! 1. **Reconcile.** Each wanted type takes the first registered component
//!    that satisfies it, in registry order. A matched component leaves the
//!    free pool, so two wanted entries of the same type need two instances.
//! 2. **Instantiate.** Unmatched types are created with a suggested unique
//!    name, attached to the context's main window.
//! 3. **Link.** Links run in the order given; later links see cells that
//!    earlier links repointed.
//!
//! # Failure Modes
//!
//! There is no rollback. If a factory fails, components created earlier in
//! the same call stay registered and linked state is left as it was before
//! the link pass. Re-running the same spec against a fully wired registry
//! creates nothing and every link reports [`LinkOutcome::AlreadyShared`].

use std::rc::Rc;

use tracing::{debug, info, info_span};

use crate::component::{Component, ComponentId, ComponentSpec, ComponentType, LinkOutcome};
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::link::{Link, link_cells};

/// Component types and links making up one application layout.
#[derive(Debug, Clone, Default)]
pub struct ModeSpec {
    pub name: String,
    pub components: Vec<ComponentType>,
    pub links: Vec<Link>,
}

impl ModeSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_component(mut self, ty: ComponentType) -> Self {
        self.components.push(ty);
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Check that every link refers to a wanted component.
    pub fn validate(&self) -> Result<()> {
        let len = self.components.len();
        for link in &self.links {
            let index = link.max_index();
            if index >= len {
                return Err(Error::LinkOutOfRange { index, len });
            }
        }
        Ok(())
    }
}

/// What [`ModeAssembler::assemble`] did.
#[derive(Clone, Default)]
pub struct Assembly {
    /// One component per wanted type, in wanted order.
    pub components: Vec<Rc<dyn Component>>,
    pub reused: Vec<ComponentId>,
    pub created: Vec<ComponentId>,
    /// One outcome per link, in link order.
    pub outcomes: Vec<LinkOutcome>,
}

impl std::fmt::Debug for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.components.iter().map(|c| c.name()).collect();
        f.debug_struct("Assembly")
            .field("components", &names)
            .field("reused", &self.reused)
            .field("created", &self.created)
            .field("outcomes", &self.outcomes)
            .finish()
    }
}

impl Assembly {
    /// Number of links that actually repointed a cell.
    #[must_use]
    pub fn rebound(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == LinkOutcome::Rebound)
            .count()
    }
}

/// Applies [`ModeSpec`]s against a context's registry.
#[derive(Debug, Clone, Copy)]
pub struct ModeAssembler<'a> {
    ctx: &'a AppContext,
}

impl<'a> ModeAssembler<'a> {
    #[must_use]
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Reconcile, instantiate, and link. See the module docs.
    pub fn assemble(&self, spec: &ModeSpec) -> Result<Assembly> {
        spec.validate()?;
        let span = info_span!("change_mode", mode = %spec.name);
        let _guard = span.enter();

        let mut assembly = Assembly::default();
        let matched = self.reconcile(&spec.components);

        for (ty, found) in spec.components.iter().zip(matched) {
            let component = match found {
                Some(component) => {
                    debug!(component = component.name(), wanted = ty.name(), "reusing");
                    assembly.reused.push(component.id());
                    component
                }
                None => {
                    let component = self.instantiate(ty)?;
                    assembly.created.push(component.id());
                    component
                }
            };
            assembly.components.push(component);
        }

        for link in &spec.links {
            let dest = &assembly.components[link.dest.component];
            let src = &assembly.components[link.src.component];
            let outcome = link_cells(&**dest, &link.dest.cell, &**src, &link.src.cell)?;
            assembly.outcomes.push(outcome);
        }

        info!(
            reused = assembly.reused.len(),
            created = assembly.created.len(),
            rebound = assembly.rebound(),
            "mode assembled"
        );
        Ok(assembly)
    }

    /// First free registered component satisfying each wanted type.
    fn reconcile(&self, wanted: &[ComponentType]) -> Vec<Option<Rc<dyn Component>>> {
        let mut pool = self.ctx.registry().snapshot();
        wanted
            .iter()
            .map(|ty| {
                pool.iter()
                    .position(|c| c.satisfies(ty))
                    .map(|pos| pool.remove(pos))
            })
            .collect()
    }

    fn instantiate(&self, ty: &ComponentType) -> Result<Rc<dyn Component>> {
        let name = self.ctx.registry().suggest_name(ty.name());
        let spec = ComponentSpec::named(name).with_parent(self.ctx.main_window());
        let component = ty.create(self.ctx, spec)?;
        debug!(component = component.name(), "created");
        Ok(component)
    }
}

/// Assemble `spec` against `ctx`.
pub fn change_mode(ctx: &AppContext, spec: &ModeSpec) -> Result<Assembly> {
    ModeAssembler::new(ctx).assemble(spec)
}
