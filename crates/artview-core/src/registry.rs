#![forbid(unsafe_code)]

//! Ordered registry of live components.
//!
//! The registry lists every component that has been created and not yet
//! torn down, in creation order. It is observable: every append and removal
//! is published as a [`RegistryEvent`] so discovery panels stay current.
//!
//! # Invariants
//!
//! 1. A component instance appears at most once.
//! 2. Positions follow insertion order; removal shifts later entries down.
//! 3. Events are published after the list has been updated, and no interior
//!    borrow is held while subscribers run.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::component::{Component, ComponentId};
use crate::error::{Error, Result};
use crate::reactive::{Observable, Strength, Subscription, SubscriptionId};

/// A change to the registry's contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegistryEvent {
    /// Nothing has happened yet.
    #[default]
    Idle,
    Appended {
        id: ComponentId,
        name: String,
        index: usize,
    },
    Removed {
        id: ComponentId,
        name: String,
        index: usize,
    },
}

/// The live component list.
pub struct ComponentRegistry {
    components: RefCell<Vec<Rc<dyn Component>>>,
    events: Observable<RegistryEvent>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: RefCell::new(Vec::new()),
            events: Observable::new(RegistryEvent::Idle),
        }
    }

    /// Add `component` at the end and publish [`RegistryEvent::Appended`].
    ///
    /// Returns the new position.
    pub fn append(&self, component: Rc<dyn Component>) -> Result<usize> {
        let id = component.id();
        let name = component.name().to_owned();
        let index = {
            let mut components = self.components.borrow_mut();
            if components.iter().any(|c| c.id() == id) {
                return Err(Error::AlreadyRegistered { component: name });
            }
            components.push(component);
            components.len() - 1
        };
        debug!(component = %name, %id, index, "component registered");
        self.events
            .set(RegistryEvent::Appended { id, name, index });
        Ok(index)
    }

    /// Remove `component` and publish [`RegistryEvent::Removed`].
    pub fn remove(&self, component: &dyn Component) -> Result<Rc<dyn Component>> {
        self.remove_id(component.id())
    }

    /// Remove the component with `id` and publish [`RegistryEvent::Removed`].
    pub fn remove_id(&self, id: ComponentId) -> Result<Rc<dyn Component>> {
        let (removed, index) = {
            let mut components = self.components.borrow_mut();
            let index = components
                .iter()
                .position(|c| c.id() == id)
                .ok_or_else(|| Error::NotRegistered {
                    component: id.to_string(),
                })?;
            (components.remove(index), index)
        };
        let name = removed.name().to_owned();
        debug!(component = %name, %id, index, "component deregistered");
        self.events
            .set(RegistryEvent::Removed { id, name, index });
        Ok(removed)
    }

    /// Position of `component`, if registered.
    #[must_use]
    pub fn index(&self, component: &dyn Component) -> Option<usize> {
        self.position(component.id())
    }

    #[must_use]
    pub fn position(&self, id: ComponentId) -> Option<usize> {
        self.components.borrow().iter().position(|c| c.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Rc<dyn Component>> {
        self.components.borrow().get(index).cloned()
    }

    #[must_use]
    pub fn find(&self, id: ComponentId) -> Option<Rc<dyn Component>> {
        self.components
            .borrow()
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    /// First component with the given instance name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<Rc<dyn Component>> {
        self.components
            .borrow()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.borrow().is_empty()
    }

    /// Ordered copy of the registry for traversal.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn Component>> {
        self.components.borrow().clone()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.components
            .borrow()
            .iter()
            .map(|c| c.name().to_owned())
            .collect()
    }

    /// Every component declaring a shared variable called `cell_name`, in
    /// registry order.
    #[must_use]
    pub fn exposing(&self, cell_name: &str) -> Vec<Rc<dyn Component>> {
        self.components
            .borrow()
            .iter()
            .filter(|c| c.host().declares(cell_name))
            .cloned()
            .collect()
    }

    /// A name based on `base` that no registered component uses.
    ///
    /// `base` itself if free, otherwise `base2`, `base3`, ...
    #[must_use]
    pub fn suggest_name(&self, base: &str) -> String {
        let names = self.names();
        if !names.iter().any(|n| n == base) {
            return base.to_owned();
        }
        (2usize..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| !names.contains(candidate))
            .unwrap_or_else(|| base.to_owned())
    }

    /// The most recent registry event.
    #[must_use]
    pub fn last_event(&self) -> RegistryEvent {
        self.events.get()
    }

    /// Observable stream of registry events.
    #[must_use]
    pub fn events(&self) -> &Observable<RegistryEvent> {
        &self.events
    }

    pub fn subscribe(
        &self,
        handler: impl Fn(&RegistryEvent, Strength) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(move |_, event, strength| handler(event, strength))
    }

    pub fn subscribe_scoped(
        &self,
        handler: impl Fn(&RegistryEvent, Strength) + 'static,
    ) -> Subscription {
        self.events
            .subscribe_scoped(move |_, event, strength| handler(event, strength))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}
