#![forbid(unsafe_code)]

//! Field and tilt pickers.
//!
//! Both offer the choices of the open volume and write the pick to their
//! shared cell with a strong change.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Reaction, SharedHost, Strength, Value,
};

use super::DEFAULT_FIELD;
use crate::dataset::RadarDataset;
use crate::error::{PanelError, Result};

/// Lists the fields of the open volume.
pub struct FieldSelector {
    host: SharedHost,
    choices: RefCell<Vec<String>>,
    selected: RefCell<Option<String>>,
}

impl FieldSelector {
    fn on_radar(&self, value: &Value, _strength: Strength) {
        *self.choices.borrow_mut() = RadarDataset::from_value(value)
            .map(|r| r.fields.clone())
            .unwrap_or_default();
    }

    fn on_field(&self, value: &Value, _strength: Strength) {
        *self.selected.borrow_mut() = value.as_text().map(str::to_owned);
    }

    #[must_use]
    pub fn choices(&self) -> Vec<String> {
        self.choices.borrow().clone()
    }

    #[must_use]
    pub fn selected(&self) -> Option<String> {
        self.selected.borrow().clone()
    }

    pub fn select(&self, field: &str) -> Result<()> {
        if !self.choices.borrow().iter().any(|c| c == field) {
            return Err(PanelError::invalid_choice(self.host.name(), field));
        }
        self.host.change("Vfield", Value::from(field), Strength::Strong)?;
        Ok(())
    }
}

impl Component for FieldSelector {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for FieldSelector {
    const TYPE_NAME: &'static str = "FieldSelector";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let selector = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare_with(
                    "Vfield",
                    Reaction::method(weak, Self::on_field),
                    Value::from(DEFAULT_FIELD),
                )
                .build(),
            choices: RefCell::new(Vec::new()),
            selected: RefCell::new(Some(DEFAULT_FIELD.to_owned())),
        });
        ctx.register(selector)
    }
}

/// Lists the sweeps of the open volume with their elevation angles.
pub struct TiltSelector {
    host: SharedHost,
    angles: RefCell<Vec<f64>>,
    selected: RefCell<usize>,
}

impl TiltSelector {
    fn on_radar(&self, value: &Value, _strength: Strength) {
        *self.angles.borrow_mut() = RadarDataset::from_value(value)
            .map(|r| r.sweep_angles.clone())
            .unwrap_or_default();
    }

    fn on_tilt(&self, value: &Value, _strength: Strength) {
        if let Some(tilt) = value.as_int().and_then(|t| usize::try_from(t).ok()) {
            *self.selected.borrow_mut() = tilt;
        }
    }

    /// Elevation angle of each selectable sweep.
    #[must_use]
    pub fn angles(&self) -> Vec<f64> {
        self.angles.borrow().clone()
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        *self.selected.borrow()
    }

    pub fn select(&self, tilt: usize) -> Result<()> {
        let count = self.angles.borrow().len();
        let value = i64::try_from(tilt)
            .ok()
            .filter(|_| tilt < count)
            .ok_or_else(|| PanelError::invalid_choice(self.host.name(), tilt))?;
        self.host.change("Vtilt", Value::Int(value), Strength::Strong)?;
        Ok(())
    }

    /// Step up one sweep, stopping at the highest.
    pub fn up(&self) -> Result<()> {
        let next = self.selected() + 1;
        if next < self.angles.borrow().len() {
            self.select(next)
        } else {
            Ok(())
        }
    }

    /// Step down one sweep, stopping at the lowest.
    pub fn down(&self) -> Result<()> {
        match self.selected().checked_sub(1) {
            Some(prev) => self.select(prev),
            None => Ok(()),
        }
    }
}

impl Component for TiltSelector {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for TiltSelector {
    const TYPE_NAME: &'static str = "TiltSelector";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let selector = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare_with("Vtilt", Reaction::method(weak, Self::on_tilt), Value::Int(0))
                .build(),
            angles: RefCell::new(Vec::new()),
            selected: RefCell::new(0),
        });
        ctx.register(selector)
    }
}
