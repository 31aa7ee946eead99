#![allow(dead_code)]

//! Test components shared by the integration suites.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Reaction, Result, SharedHost,
    Strength, Value,
};

/// Records every notification on `X` and `Y`.
pub struct Watcher {
    host: SharedHost,
    seen: RefCell<Vec<(&'static str, Value, Strength)>>,
}

impl Watcher {
    fn on_x(&self, value: &Value, strength: Strength) {
        self.seen.borrow_mut().push(("X", value.clone(), strength));
    }

    fn on_y(&self, value: &Value, strength: Strength) {
        self.seen.borrow_mut().push(("Y", value.clone(), strength));
    }

    pub fn take(&self) -> Vec<(&'static str, Value, Strength)> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }

    /// Ints seen on `X`, in delivery order.
    pub fn take_x_ints(&self) -> Vec<i64> {
        self.take()
            .into_iter()
            .filter(|(name, ..)| *name == "X")
            .filter_map(|(_, v, _)| v.as_int())
            .collect()
    }
}

impl Component for Watcher {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for Watcher {
    const TYPE_NAME: &'static str = "Watcher";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> Result<Rc<Self>> {
        let watcher = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("X", Reaction::method(weak, Self::on_x))
                .declare("Y", Reaction::method(weak, Self::on_y))
                .build(),
            seen: RefCell::new(Vec::new()),
        });
        ctx.register(watcher)
    }
}

/// Offers `X` for linking without reacting.
pub struct Source {
    host: SharedHost,
}

impl Component for Source {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for Source {
    const TYPE_NAME: &'static str = "Source";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> Result<Rc<Self>> {
        let source = Rc::new(Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare_with("X", Reaction::Expose, Value::Int(0))
                .build(),
        });
        ctx.register(source)
    }
}
