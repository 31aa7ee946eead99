#![forbid(unsafe_code)]

//! Shared-state host contract implemented by every panel.
//!
//! A panel owns a [`SharedHost`] that holds its declaration table: an ordered
//! list of shared-cell names, each bound to a [`SharedCell`] and paired with a
//! [`Reaction`]. The host subscribes and unsubscribes those reactions, swaps
//! cells when a link repoints them, and deregisters the panel on teardown.
//!
//! # Slot lifecycle
//!
//! ```text
//! Bound --connect--> Active --disconnect--> Bound --rebind+connect--> Active
//!   \___________________________ teardown ___________________________/
//!                                   |
//!                                Unbound
//! ```
//!
//! Only `Active` slots deliver notifications to their handler. A slot whose
//! reaction is [`Reaction::Expose`] never becomes `Active`: it offers a cell
//! for others to link to without reacting itself.
//!
//! # Invariants
//!
//! 1. Connecting an `Active` slot is a no-op, so handlers never fire twice
//!    for one change.
//! 2. An undeclared name is rejected with [`Error::NotShared`] before any
//!    slot is touched.
//! 3. Teardown runs once. It deregisters the component, unsubscribes every
//!    handler, and drops every cell.
//! 4. No cell method is called while the slot table is borrowed, so handlers
//!    may call back into the host.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::context::{AppContext, WeakContext, WindowHandle};
use crate::error::{Error, Result};
use crate::reactive::{Observable, SharedCell, Strength, SubscriptionId, Value};

/// Process-unique identifier of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Upcast helper so `dyn Component` can be downcast to its concrete type.
///
/// Call these through `&dyn Component` (or `&*rc`), not on an
/// `Rc<dyn Component>` directly: the blanket impl also covers the `Rc`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A UI component that shares state through named cells.
pub trait Component: AsAny {
    /// The component's shared-state host.
    fn host(&self) -> &SharedHost;

    /// Whether this instance can stand in for a wanted component type.
    ///
    /// The default is an exact type match. Override to let one panel serve
    /// in place of another in a mode.
    fn satisfies(&self, ty: &ComponentType) -> bool {
        self.as_any().type_id() == ty.type_id()
    }

    fn id(&self) -> ComponentId {
        self.host().id()
    }

    fn name(&self) -> &str {
        self.host().name()
    }

    fn type_name(&self) -> &'static str {
        self.host().type_name()
    }

    /// Tear the component down. See [`SharedHost::teardown`].
    fn close(&self) -> Result<()> {
        self.host().teardown()
    }
}

impl dyn Component {
    /// Borrow as the concrete panel type.
    #[must_use]
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    #[must_use]
    pub fn is<C: Component>(&self) -> bool {
        self.as_any().is::<C>()
    }
}

/// Downcast a shared component handle to its concrete type.
#[must_use]
pub fn downcast_rc<C: Component>(component: Rc<dyn Component>) -> Option<Rc<C>> {
    component.into_any_rc().downcast::<C>().ok()
}

/// A component type that can be created by the mode assembler.
pub trait ComponentFactory: Component + Sized {
    /// Human-readable type name, also the base for suggested instance names.
    const TYPE_NAME: &'static str;

    /// Build, register, and connect a new instance.
    ///
    /// Implementations finish with [`AppContext::register`].
    fn create(ctx: &AppContext, spec: ComponentSpec) -> Result<Rc<Self>>;
}

type CreateFn = fn(&AppContext, ComponentSpec) -> Result<Rc<dyn Component>>;

fn create_erased<T: ComponentFactory>(
    ctx: &AppContext,
    spec: ComponentSpec,
) -> Result<Rc<dyn Component>> {
    let component: Rc<dyn Component> = T::create(ctx, spec)?;
    Ok(component)
}

/// Type tag for a creatable component.
#[derive(Clone, Copy)]
pub struct ComponentType {
    name: &'static str,
    type_id: TypeId,
    create: CreateFn,
}

impl ComponentType {
    #[must_use]
    pub fn of<T: ComponentFactory>() -> Self {
        Self {
            name: T::TYPE_NAME,
            type_id: TypeId::of::<T>(),
            create: create_erased::<T>,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Instantiate a new component of this type.
    pub fn create(&self, ctx: &AppContext, spec: ComponentSpec) -> Result<Rc<dyn Component>> {
        (self.create)(ctx, spec)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.name).finish()
    }
}

/// Construction arguments common to every component.
#[derive(Debug, Clone, Default)]
pub struct ComponentSpec {
    /// Instance name. `None` picks a suggested name from the type name.
    pub name: Option<String>,
    /// Window the component attaches to.
    pub parent: Option<WindowHandle>,
    /// Externally owned cells to adopt instead of creating defaults.
    pub bindings: Vec<(String, SharedCell)>,
}

impl ComponentSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Option<WindowHandle>) -> Self {
        self.parent = parent;
        self
    }

    /// Adopt `cell` for the shared variable `name`.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, cell: SharedCell) -> Self {
        self.bindings.push((name.into(), cell));
        self
    }
}

/// Callback a host subscribes to one of its cells.
pub type Handler = Rc<dyn Fn(&SharedCell, &Value, Strength)>;

/// What a component does when one of its shared cells changes.
#[derive(Clone)]
pub enum Reaction {
    Handler(Handler),
    /// Expose the cell for linking without reacting to it.
    Expose,
}

impl Reaction {
    /// Call `f` on the component behind `weak` for every change.
    ///
    /// Once the component is closed or dropped the handler does nothing.
    pub fn method<C: 'static>(weak: &Weak<C>, f: fn(&C, &Value, Strength)) -> Self {
        let weak = weak.clone();
        Self::Handler(Rc::new(move |_cell: &SharedCell, value: &Value, strength| {
            if let Some(this) = weak.upgrade() {
                f(&this, value, strength);
            }
        }))
    }

    pub fn handler(f: impl Fn(&SharedCell, &Value, Strength) + 'static) -> Self {
        Self::Handler(Rc::new(f))
    }

    fn handler_rc(&self) -> Option<Handler> {
        match self {
            Self::Handler(h) => Some(Rc::clone(h)),
            Self::Expose => None,
        }
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => write!(f, "Handler(..)"),
            Self::Expose => write!(f, "Expose"),
        }
    }
}

/// Connection state of one declared shared cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No cell (component torn down).
    Unbound,
    /// Cell assigned, handler not subscribed.
    Bound,
    /// Handler subscribed to the cell.
    Active,
}

/// Result of pointing a slot at another component's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Both slots already held the same cell; nothing changed.
    AlreadyShared,
    /// The destination now holds the source's cell.
    Rebound,
}

struct Slot {
    name: String,
    cell: Option<SharedCell>,
    reaction: Reaction,
    subscription: Option<SubscriptionId>,
}

impl Slot {
    fn state(&self) -> SlotState {
        match (&self.cell, self.subscription) {
            (None, _) => SlotState::Unbound,
            (Some(_), None) => SlotState::Bound,
            (Some(_), Some(_)) => SlotState::Active,
        }
    }
}

/// Declares a host's shared cells before the component is registered.
pub struct HostBuilder {
    context: WeakContext,
    id: ComponentId,
    name: String,
    type_name: &'static str,
    parent: Option<WindowHandle>,
    bindings: Vec<(String, SharedCell)>,
    slots: Vec<Slot>,
}

impl HostBuilder {
    /// Declare `name` with a reaction, adopting a cell from the `ComponentSpec`'s
    /// bindings if one was supplied.
    #[must_use]
    pub fn declare(mut self, name: &str, reaction: Reaction) -> Self {
        let cell = match self.bindings.iter().position(|(n, _)| n == name) {
            Some(pos) => self.bindings.remove(pos).1,
            None => Observable::new(Value::None),
        };
        self.push_slot(name, reaction, cell);
        self
    }

    /// Declare `name` with an initial value for its default cell.
    ///
    /// A `ComponentSpec` binding still takes precedence.
    #[must_use]
    pub fn declare_with(mut self, name: &str, reaction: Reaction, initial: Value) -> Self {
        let cell = match self.bindings.iter().position(|(n, _)| n == name) {
            Some(pos) => self.bindings.remove(pos).1,
            None => Observable::new(initial),
        };
        self.push_slot(name, reaction, cell);
        self
    }

    fn push_slot(&mut self, name: &str, reaction: Reaction, cell: SharedCell) {
        if self.slots.iter().any(|s| s.name == name) {
            warn!(
                component = %self.name,
                variable = name,
                "shared variable declared twice; keeping first"
            );
            return;
        }
        self.slots.push(Slot {
            name: name.to_owned(),
            cell: Some(cell),
            reaction,
            subscription: None,
        });
    }

    #[must_use]
    pub fn build(self) -> SharedHost {
        for (name, _) in &self.bindings {
            warn!(
                component = %self.name,
                variable = %name,
                "binding ignored: not a shared variable of this component"
            );
        }
        SharedHost {
            id: self.id,
            name: self.name,
            type_name: self.type_name,
            parent: self.parent,
            context: self.context,
            slots: RefCell::new(self.slots),
            closed: Rc::new(Cell::new(false)),
        }
    }
}

/// Shared-cell declaration table and lifecycle of one component.
pub struct SharedHost {
    id: ComponentId,
    name: String,
    type_name: &'static str,
    parent: Option<WindowHandle>,
    context: WeakContext,
    slots: RefCell<Vec<Slot>>,
    /// Shared with every subscribed handler; a closed host ignores changes
    /// still in flight.
    closed: Rc<Cell<bool>>,
}

impl fmt::Debug for SharedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHost")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("shared", &self.shared_names())
            .field("closed", &self.closed.get())
            .finish()
    }
}

impl SharedHost {
    /// Start declaring a host for a component of `type_name`.
    ///
    /// An unnamed spec gets a suggested name that is unique in the registry.
    #[must_use]
    pub fn builder(ctx: &AppContext, type_name: &'static str, spec: ComponentSpec) -> HostBuilder {
        let name = spec
            .name
            .unwrap_or_else(|| ctx.registry().suggest_name(type_name));
        HostBuilder {
            context: ctx.downgrade(),
            id: ctx.allocate_id(),
            name,
            type_name,
            parent: spec.parent,
            bindings: spec.bindings,
            slots: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&WindowHandle> {
        self.parent.as_ref()
    }

    /// The application context, if it is still alive.
    #[must_use]
    pub fn context(&self) -> Option<AppContext> {
        self.context.upgrade()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Declared shared-variable names, in declaration order.
    #[must_use]
    pub fn shared_names(&self) -> Vec<String> {
        self.slots.borrow().iter().map(|s| s.name.clone()).collect()
    }

    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.slots.borrow().iter().any(|s| s.name == name)
    }

    fn not_shared(&self, name: &str) -> Error {
        Error::NotShared {
            component: self.name.clone(),
            name: name.to_owned(),
        }
    }

    fn unbound(&self, name: &str) -> Error {
        Error::Unbound {
            component: self.name.clone(),
            name: name.to_owned(),
        }
    }

    /// Handle to the cell currently bound to `name`.
    pub fn cell(&self, name: &str) -> Result<SharedCell> {
        let slots = self.slots.borrow();
        let slot = slots
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| self.not_shared(name))?;
        slot.cell.clone().ok_or_else(|| self.unbound(name))
    }

    /// Current value of the cell bound to `name`.
    pub fn get(&self, name: &str) -> Result<Value> {
        Ok(self.cell(name)?.get())
    }

    /// Change the cell bound to `name`, notifying everyone sharing it.
    pub fn change(&self, name: &str, value: Value, strength: Strength) -> Result<()> {
        let cell = self.cell(name)?;
        trace!(component = %self.name, variable = name, kind = value.kind(), ?strength, "change");
        cell.change(value, strength);
        Ok(())
    }

    pub fn state(&self, name: &str) -> Result<SlotState> {
        self.slots
            .borrow()
            .iter()
            .find(|s| s.name == name)
            .map(Slot::state)
            .ok_or_else(|| self.not_shared(name))
    }

    /// Subscription id of `name`'s handler, if the slot is active.
    pub fn subscription(&self, name: &str) -> Result<Option<SubscriptionId>> {
        self.slots
            .borrow()
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.subscription)
            .ok_or_else(|| self.not_shared(name))
    }

    /// Subscribe `name`'s handler to its current cell.
    ///
    /// Already active or exposed-only slots are left as they are.
    pub fn connect_shared_variable(&self, name: &str) -> Result<()> {
        let (cell, handler) = {
            let slots = self.slots.borrow();
            let slot = slots
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| self.not_shared(name))?;
            if slot.subscription.is_some() {
                return Ok(());
            }
            let Some(handler) = slot.reaction.handler_rc() else {
                return Ok(());
            };
            let cell = slot.cell.clone().ok_or_else(|| self.unbound(name))?;
            (cell, handler)
        };
        let closed = Rc::clone(&self.closed);
        let guarded = move |cell: &SharedCell, value: &Value, strength: Strength| {
            if !closed.get() {
                handler(cell, value, strength);
            }
        };
        let id = cell.subscribe_rc(Rc::new(guarded));
        if let Some(slot) = self.slots.borrow_mut().iter_mut().find(|s| s.name == name) {
            slot.subscription = Some(id);
        }
        trace!(component = %self.name, variable = name, "connected");
        Ok(())
    }

    /// Unsubscribe `name`'s handler from its current cell.
    pub fn disconnect_shared_variable(&self, name: &str) -> Result<()> {
        let detached = {
            let mut slots = self.slots.borrow_mut();
            let slot = slots
                .iter_mut()
                .find(|s| s.name == name)
                .ok_or_else(|| self.not_shared(name))?;
            match (slot.subscription.take(), &slot.cell) {
                (Some(id), Some(cell)) => Some((id, cell.clone())),
                _ => None,
            }
        };
        if let Some((id, cell)) = detached {
            cell.unsubscribe(id);
            trace!(component = %self.name, variable = name, "disconnected");
        }
        Ok(())
    }

    pub fn connect_all_variables(&self) -> Result<()> {
        for name in self.shared_names() {
            self.connect_shared_variable(&name)?;
        }
        Ok(())
    }

    pub fn disconnect_all_variables(&self) -> Result<()> {
        for name in self.shared_names() {
            self.disconnect_shared_variable(&name)?;
        }
        Ok(())
    }

    /// Point `name` at `cell`.
    ///
    /// If the slot already holds `cell` nothing happens. Otherwise the
    /// handler is moved from the old cell to `cell` and called once with the
    /// adopted value, so the component reflects it immediately.
    pub fn rebind(&self, name: &str, cell: SharedCell) -> Result<LinkOutcome> {
        let current = self.cell(name)?;
        if current.ptr_eq(&cell) {
            return Ok(LinkOutcome::AlreadyShared);
        }
        self.disconnect_shared_variable(name)?;
        if let Some(slot) = self.slots.borrow_mut().iter_mut().find(|s| s.name == name) {
            slot.cell = Some(cell.clone());
        }
        self.connect_shared_variable(name)?;
        if let Some(id) = self.subscription(name)? {
            cell.notify_one(id, Strength::Strong);
        }
        debug!(component = %self.name, variable = name, "rebound shared variable");
        Ok(LinkOutcome::Rebound)
    }

    /// Deregister from the registry, disconnect every handler, and drop
    /// every cell.
    ///
    /// Runs once; a second call returns [`Error::AlreadyClosed`] without
    /// touching the registry. Local teardown completes even if the registry
    /// no longer lists the component; that error is returned afterwards.
    pub fn teardown(&self) -> Result<()> {
        if self.closed.replace(true) {
            return Err(Error::AlreadyClosed {
                component: self.name.clone(),
            });
        }
        let deregistered = match self.context.upgrade() {
            Some(ctx) => ctx.registry().remove_id(self.id).map(drop),
            None => Ok(()),
        };
        self.disconnect_all_variables()?;
        for slot in self.slots.borrow_mut().iter_mut() {
            slot.cell = None;
        }
        debug!(component = %self.name, id = %self.id, "component closed");
        deregistered
    }
}

impl Drop for SharedHost {
    fn drop(&mut self) {
        // Components dropped without teardown (e.g. with their context)
        // must not leave handlers on cells that outlive them.
        if !self.closed.get() {
            for slot in self.slots.get_mut().iter_mut() {
                if let (Some(id), Some(cell)) = (slot.subscription.take(), &slot.cell) {
                    cell.unsubscribe(id);
                }
            }
        }
    }
}
