#![forbid(unsafe_code)]

//! Application context passed to every component.
//!
//! The context owns the component registry, the configuration, the main
//! window handle, and a typed service table through which external
//! collaborators (dataset readers, gridders) are injected. Components keep
//! only a [`WeakContext`], so dropping the last [`AppContext`] drops every
//! registered component with it.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::component::{Component, ComponentId};
use crate::config::ArtviewConfig;
use crate::error::Result;
use crate::registry::ComponentRegistry;

/// Opaque handle to a top-level window components attach to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle {
    id: u64,
    title: String,
}

impl WindowHandle {
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

struct ContextInner {
    registry: ComponentRegistry,
    config: ArtviewConfig,
    main_window: RefCell<Option<WindowHandle>>,
    next_component_id: Cell<u64>,
    services: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
}

/// Shared handle to the application state.
///
/// Cloning is cheap and yields a handle to the same context.
#[derive(Clone)]
pub struct AppContext {
    inner: Rc<ContextInner>,
}

/// Non-owning handle held by components.
#[derive(Clone, Default)]
pub struct WeakContext {
    inner: Weak<ContextInner>,
}

impl WeakContext {
    #[must_use]
    pub fn upgrade(&self) -> Option<AppContext> {
        self.inner.upgrade().map(|inner| AppContext { inner })
    }
}

impl fmt::Debug for WeakContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContext")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(ArtviewConfig::default())
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("components", &self.inner.registry.names())
            .field("main_window", &self.inner.main_window.borrow())
            .field("services", &self.inner.services.borrow().len())
            .finish()
    }
}

impl AppContext {
    #[must_use]
    pub fn new(config: ArtviewConfig) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                registry: ComponentRegistry::new(),
                config,
                main_window: RefCell::new(None),
                next_component_id: Cell::new(1),
                services: RefCell::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.inner.registry
    }

    #[must_use]
    pub fn config(&self) -> &ArtviewConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same context.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The window new components attach to.
    #[must_use]
    pub fn main_window(&self) -> Option<WindowHandle> {
        self.inner.main_window.borrow().clone()
    }

    pub fn set_main_window(&self, window: Option<WindowHandle>) {
        *self.inner.main_window.borrow_mut() = window;
    }

    pub(crate) fn allocate_id(&self) -> ComponentId {
        let id = self.inner.next_component_id.get();
        self.inner.next_component_id.set(id + 1);
        ComponentId(id)
    }

    /// Make `service` available to components, replacing any previous value
    /// of the same type.
    ///
    /// Trait objects are provided wrapped, e.g. `Rc<dyn DatasetLoader>`.
    pub fn provide<T: Any>(&self, service: T) {
        debug!(service = std::any::type_name::<T>(), "service provided");
        self.inner
            .services
            .borrow_mut()
            .insert(TypeId::of::<T>(), Rc::new(service));
    }

    /// Look up a service by type.
    #[must_use]
    pub fn service<T: Any + Clone>(&self) -> Option<T> {
        self.inner
            .services
            .borrow()
            .get(&TypeId::of::<T>())
            .and_then(|s| s.downcast_ref::<T>())
            .cloned()
    }

    /// Append a freshly built component to the registry and connect its
    /// shared variables.
    pub fn register<C: Component>(&self, component: Rc<C>) -> Result<Rc<C>> {
        let erased: Rc<dyn Component> = component.clone();
        self.registry().append(erased)?;
        // A registry-event subscriber may already have closed it.
        if !component.host().is_closed() {
            component.host().connect_all_variables()?;
        }
        Ok(component)
    }
}
