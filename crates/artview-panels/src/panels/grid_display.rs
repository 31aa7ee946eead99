#![forbid(unsafe_code)]

//! Constant-altitude display of one gridded field.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Reaction, SharedHost, Strength, Value,
};
use tracing::debug;

use super::{DEFAULT_COLORMAP, DEFAULT_FIELD, default_limits, publish};
use crate::dataset::GridDataset;
use crate::error::{PanelError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct GridFrame {
    pub source: String,
    pub field: String,
    pub level: usize,
    pub limits: (f64, f64),
    pub colormap: String,
}

#[derive(Debug, Default)]
struct GridState {
    frame: Option<GridFrame>,
    redraws: u64,
    stale: bool,
}

pub struct GridDisplay {
    host: SharedHost,
    state: RefCell<GridState>,
}

impl GridDisplay {
    fn grid(&self) -> Option<Rc<GridDataset>> {
        self.host
            .get("Vgrid")
            .ok()
            .and_then(|v| GridDataset::from_value(&v))
    }

    fn on_grid(&self, value: &Value, strength: Strength) {
        if !strength.is_strong() {
            self.state.borrow_mut().stale = true;
            return;
        }
        if let Some(grid) = GridDataset::from_value(value) {
            let field = self.host.get("Vfield").ok();
            let known = field
                .as_ref()
                .and_then(Value::as_text)
                .is_some_and(|f| grid.has_field(f));
            if !known && let Some(first) = grid.fields.first() {
                publish(&self.host, "Vfield", Value::from(first.as_str()), Strength::Weak);
            }
            let level = self.level();
            if level >= grid.level_count() {
                publish(&self.host, "Vlevel", Value::Int(0), Strength::Weak);
            }
        }
        self.redraw();
    }

    fn on_field(&self, value: &Value, strength: Strength) {
        if strength.is_strong()
            && let Some(field) = value.as_text()
        {
            let (min, max) = default_limits(field);
            publish(&self.host, "Vlimits", Value::Range(min, max), Strength::Weak);
        }
        self.on_update(value, strength);
    }

    fn on_update(&self, _value: &Value, strength: Strength) {
        if strength.is_strong() {
            self.redraw();
        } else {
            self.state.borrow_mut().stale = true;
        }
    }

    fn level(&self) -> usize {
        self.host
            .get("Vlevel")
            .ok()
            .and_then(|v| v.as_int())
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(0)
    }

    pub fn redraw(&self) {
        let frame = self.grid().map(|grid| {
            let field = self
                .host
                .get("Vfield")
                .ok()
                .and_then(|v| v.as_text().map(str::to_owned))
                .unwrap_or_else(|| DEFAULT_FIELD.to_owned());
            GridFrame {
                source: grid.source.clone(),
                level: self.level().min(grid.level_count().saturating_sub(1)),
                limits: self
                    .host
                    .get("Vlimits")
                    .ok()
                    .and_then(|v| v.as_range())
                    .unwrap_or_else(|| default_limits(&field)),
                colormap: self
                    .host
                    .get("Vcolormap")
                    .ok()
                    .and_then(|v| v.as_text().map(str::to_owned))
                    .unwrap_or_else(|| DEFAULT_COLORMAP.to_owned()),
                field,
            }
        });
        if let Some(f) = &frame {
            debug!(display = %self.host.name(), field = %f.field, level = f.level, "grid redraw");
        }
        let mut state = self.state.borrow_mut();
        state.frame = frame;
        state.redraws += 1;
        state.stale = false;
    }

    #[must_use]
    pub fn frame(&self) -> Option<GridFrame> {
        self.state.borrow().frame.clone()
    }

    #[must_use]
    pub fn redraw_count(&self) -> u64 {
        self.state.borrow().redraws
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.borrow().stale
    }

    pub fn set_level(&self, level: usize) -> Result<()> {
        let levels = self.grid().map_or(0, |g| g.level_count());
        let Ok(value) = i64::try_from(level) else {
            return Err(PanelError::invalid_choice(self.host.name(), level));
        };
        if level >= levels {
            return Err(PanelError::invalid_choice(self.host.name(), level));
        }
        self.host.change("Vlevel", Value::Int(value), Strength::Strong)?;
        Ok(())
    }

    pub fn set_field(&self, field: &str) -> Result<()> {
        if let Some(grid) = self.grid()
            && !grid.has_field(field)
        {
            return Err(PanelError::invalid_choice(self.host.name(), field));
        }
        self.host.change("Vfield", Value::from(field), Strength::Strong)?;
        Ok(())
    }
}

impl Component for GridDisplay {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for GridDisplay {
    const TYPE_NAME: &'static str = "GridDisplay";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let (min, max) = default_limits(DEFAULT_FIELD);
        let display = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vgrid", Reaction::method(weak, Self::on_grid))
                .declare_with(
                    "Vfield",
                    Reaction::method(weak, Self::on_field),
                    Value::from(DEFAULT_FIELD),
                )
                .declare_with("Vlevel", Reaction::method(weak, Self::on_update), Value::Int(0))
                .declare_with(
                    "Vlimits",
                    Reaction::method(weak, Self::on_update),
                    Value::Range(min, max),
                )
                .declare_with(
                    "Vcolormap",
                    Reaction::method(weak, Self::on_update),
                    Value::from(DEFAULT_COLORMAP),
                )
                .build(),
            state: RefCell::new(GridState::default()),
        });
        ctx.register(display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(levels: usize) -> GridDataset {
        GridDataset {
            source: "cube.grid".into(),
            fields: vec!["velocity".into(), "reflectivity".into()],
            shape: (levels, 10, 10),
        }
    }

    #[test]
    fn grid_change_draws_known_field() {
        let ctx = AppContext::default();
        let display = GridDisplay::create(&ctx, ComponentSpec::new()).expect("display");
        display
            .host()
            .change("Vgrid", cube(3).into_value(), Strength::Strong)
            .expect("grid");
        let frame = display.frame().expect("frame");
        assert_eq!(frame.field, "reflectivity");
        assert_eq!(frame.level, 0);

        display.set_level(2).expect("level");
        assert_eq!(display.frame().map(|f| f.level), Some(2));
        assert!(display.set_level(3).is_err());
    }

    #[test]
    fn unknown_field_falls_back_to_first() {
        let ctx = AppContext::default();
        let display = GridDisplay::create(&ctx, ComponentSpec::new()).expect("display");
        let grid = GridDataset {
            fields: vec!["velocity".into()],
            ..cube(1)
        };
        display
            .host()
            .change("Vgrid", grid.into_value(), Strength::Strong)
            .expect("grid");
        assert_eq!(display.frame().map(|f| f.field), Some("velocity".into()));
    }

    #[test]
    fn weak_level_change_waits_for_strong() {
        let ctx = AppContext::default();
        let display = GridDisplay::create(&ctx, ComponentSpec::new()).expect("display");
        display
            .host()
            .change("Vgrid", cube(4).into_value(), Strength::Strong)
            .expect("grid");
        let redraws = display.redraw_count();
        display
            .host()
            .change("Vlevel", Value::Int(3), Strength::Weak)
            .expect("level");
        assert!(display.is_stale());
        assert_eq!(display.redraw_count(), redraws);
        display.redraw();
        assert_eq!(display.frame().map(|f| f.level), Some(3));
    }
}
