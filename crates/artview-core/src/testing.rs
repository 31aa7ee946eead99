#![forbid(unsafe_code)]

//! Minimal components for unit tests.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::component::{Component, ComponentFactory, ComponentSpec, Reaction, SharedHost};
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::reactive::{Strength, Value};

pub(crate) type LogEntry = (String, String, Strength);

fn describe(value: &Value) -> String {
    match value.as_text() {
        Some(text) => text.to_owned(),
        None => format!("{value:?}"),
    }
}

/// Reacts to `Vradar` and `Vfield`, exposes `Vlimits`.
pub(crate) struct Probe {
    host: SharedHost,
    log: RefCell<Vec<LogEntry>>,
}

impl Probe {
    fn on_radar(&self, value: &Value, strength: Strength) {
        self.log
            .borrow_mut()
            .push(("Vradar".into(), describe(value), strength));
    }

    fn on_field(&self, value: &Value, strength: Strength) {
        self.log
            .borrow_mut()
            .push(("Vfield".into(), describe(value), strength));
    }

    pub(crate) fn take_log(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

impl Component for Probe {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for Probe {
    const TYPE_NAME: &'static str = "Probe";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> Result<Rc<Self>> {
        let probe = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare("Vfield", Reaction::method(weak, Self::on_field))
                .declare("Vlimits", Reaction::Expose)
                .build(),
            log: RefCell::new(Vec::new()),
        });
        ctx.register(probe)
    }
}

/// Reacts to `Vradar` and `Vgrid`.
pub(crate) struct Sidecar {
    host: SharedHost,
    seen: RefCell<Vec<LogEntry>>,
}

impl Sidecar {
    fn on_radar(&self, value: &Value, strength: Strength) {
        self.seen
            .borrow_mut()
            .push(("Vradar".into(), describe(value), strength));
    }

    fn on_grid(&self, value: &Value, strength: Strength) {
        self.seen
            .borrow_mut()
            .push(("Vgrid".into(), describe(value), strength));
    }

    pub(crate) fn take_log(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }
}

impl Component for Sidecar {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for Sidecar {
    const TYPE_NAME: &'static str = "Sidecar";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> Result<Rc<Self>> {
        let sidecar = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare("Vgrid", Reaction::method(weak, Self::on_grid))
                .build(),
            seen: RefCell::new(Vec::new()),
        });
        ctx.register(sidecar)
    }
}

/// Always fails to construct.
pub(crate) struct Faulty {
    host: SharedHost,
}

impl Component for Faulty {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for Faulty {
    const TYPE_NAME: &'static str = "Faulty";

    fn create(_ctx: &AppContext, _spec: ComponentSpec) -> Result<Rc<Self>> {
        Err(Error::create(Self::TYPE_NAME, "refusing to start"))
    }
}
