#![forbid(unsafe_code)]

//! Plan-position display of one field on one sweep.
//!
//! The display reacts to every cell it shares. A strong change redraws at
//! once; a weak change only marks the picture stale, so a panel adjusting
//! several cells can batch them and finish with one strong change.
//!
//! A new volume resets a field or tilt it does not have, and a new field
//! resets the colour limits to that field's defaults. Those follow-up
//! changes are weak: the redraw that ends the triggering handler picks
//! them up.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Reaction, SharedHost, Strength, Value,
};
use tracing::{debug, trace};

use super::{DEFAULT_COLORMAP, DEFAULT_FIELD, default_limits, publish};
use crate::dataset::{GateFilter, RadarDataset};
use crate::error::{PanelError, Result};

/// What the display last drew.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarFrame {
    pub path: String,
    pub field: String,
    pub tilt: usize,
    /// Elevation of the drawn sweep, in degrees.
    pub elevation: f64,
    pub limits: (f64, f64),
    pub colormap: String,
    /// Number of gate filter rules applied.
    pub filter_rules: usize,
}

#[derive(Debug, Default)]
struct DisplayState {
    frame: Option<RadarFrame>,
    redraws: u64,
    stale: bool,
}

pub struct RadarDisplay {
    host: SharedHost,
    state: RefCell<DisplayState>,
}

impl RadarDisplay {
    fn radar(&self) -> Option<Rc<RadarDataset>> {
        self.host
            .get("Vradar")
            .ok()
            .and_then(|v| RadarDataset::from_value(&v))
    }

    fn text(&self, name: &str) -> Option<String> {
        self.host
            .get(name)
            .ok()
            .and_then(|v| v.as_text().map(str::to_owned))
    }

    fn on_radar(&self, value: &Value, strength: Strength) {
        if !strength.is_strong() {
            self.mark_stale();
            return;
        }
        if let Some(radar) = RadarDataset::from_value(value) {
            let field = self.text("Vfield");
            if let Some(first) = radar.fields.first()
                && !field.as_deref().is_some_and(|f| radar.has_field(f))
            {
                publish(&self.host, "Vfield", Value::from(first.as_str()), Strength::Weak);
            }
            let tilt = self.host.get("Vtilt").ok().and_then(|v| v.as_int());
            let in_range = tilt
                .and_then(|t| usize::try_from(t).ok())
                .is_some_and(|t| t < radar.sweep_count());
            if !in_range {
                publish(&self.host, "Vtilt", Value::Int(0), Strength::Weak);
            }
        }
        self.redraw();
    }

    fn on_field(&self, value: &Value, strength: Strength) {
        if !strength.is_strong() {
            self.mark_stale();
            return;
        }
        if let Some(field) = value.as_text() {
            let (min, max) = default_limits(field);
            publish(&self.host, "Vlimits", Value::Range(min, max), Strength::Weak);
        }
        self.redraw();
    }

    fn on_update(&self, _value: &Value, strength: Strength) {
        if strength.is_strong() {
            self.redraw();
        } else {
            self.mark_stale();
        }
    }

    fn mark_stale(&self) {
        self.state.borrow_mut().stale = true;
    }

    /// Rebuild the frame from the current cell values.
    ///
    /// With no volume open there is nothing to draw and the frame is cleared.
    pub fn redraw(&self) {
        let frame = self.radar().map(|radar| {
            let field = self
                .text("Vfield")
                .or_else(|| radar.fields.first().cloned())
                .unwrap_or_default();
            let tilt = self
                .host
                .get("Vtilt")
                .ok()
                .and_then(|v| v.as_int())
                .and_then(|t| usize::try_from(t).ok())
                .filter(|t| *t < radar.sweep_count())
                .unwrap_or(0);
            let limits = self
                .host
                .get("Vlimits")
                .ok()
                .and_then(|v| v.as_range())
                .unwrap_or_else(|| default_limits(&field));
            let filter_rules = self
                .host
                .get("Vgatefilter")
                .ok()
                .and_then(|v| GateFilter::from_value(&v))
                .map_or(0, |f| f.rules.len());
            RadarFrame {
                path: radar.path.clone(),
                elevation: radar.sweep_angles.get(tilt).copied().unwrap_or_default(),
                field,
                tilt,
                limits,
                colormap: self.text("Vcolormap").unwrap_or_else(|| DEFAULT_COLORMAP.to_owned()),
                filter_rules,
            }
        });
        let mut state = self.state.borrow_mut();
        match &frame {
            Some(f) => debug!(
                display = %self.host.name(),
                field = %f.field,
                tilt = f.tilt,
                "redraw"
            ),
            None => trace!(display = %self.host.name(), "redraw with no volume"),
        }
        state.frame = frame;
        state.redraws += 1;
        state.stale = false;
    }

    #[must_use]
    pub fn frame(&self) -> Option<RadarFrame> {
        self.state.borrow().frame.clone()
    }

    #[must_use]
    pub fn redraw_count(&self) -> u64 {
        self.state.borrow().redraws
    }

    /// Whether a weak change arrived since the last redraw.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.borrow().stale
    }

    /// Select `field`, which must exist in the open volume if there is one.
    pub fn set_field(&self, field: &str) -> Result<()> {
        if let Some(radar) = self.radar()
            && !radar.has_field(field)
        {
            return Err(PanelError::invalid_choice(self.host.name(), field));
        }
        self.host.change("Vfield", Value::from(field), Strength::Strong)?;
        Ok(())
    }

    pub fn set_tilt(&self, tilt: usize) -> Result<()> {
        if let Some(radar) = self.radar()
            && tilt >= radar.sweep_count()
        {
            return Err(PanelError::invalid_choice(self.host.name(), tilt));
        }
        let tilt = i64::try_from(tilt)
            .map_err(|_| PanelError::invalid_choice(self.host.name(), tilt))?;
        self.host.change("Vtilt", Value::Int(tilt), Strength::Strong)?;
        Ok(())
    }

    pub fn set_limits(&self, min: f64, max: f64) -> Result<()> {
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(PanelError::invalid_choice(self.host.name(), format!("{min}..{max}")));
        }
        self.host.change("Vlimits", Value::Range(min, max), Strength::Strong)?;
        Ok(())
    }

    pub fn set_colormap(&self, name: &str) -> Result<()> {
        self.host.change("Vcolormap", Value::from(name), Strength::Strong)?;
        Ok(())
    }

    /// Apply `filter`, or clear it with `None`.
    pub fn set_gate_filter(&self, filter: Option<GateFilter>) -> Result<()> {
        let value = filter.map_or(Value::None, GateFilter::into_value);
        self.host.change("Vgatefilter", value, Strength::Strong)?;
        Ok(())
    }
}

impl Component for RadarDisplay {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for RadarDisplay {
    const TYPE_NAME: &'static str = "RadarDisplay";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let (min, max) = default_limits(DEFAULT_FIELD);
        let display = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare_with(
                    "Vfield",
                    Reaction::method(weak, Self::on_field),
                    Value::from(DEFAULT_FIELD),
                )
                .declare_with("Vtilt", Reaction::method(weak, Self::on_update), Value::Int(0))
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
                .declare("Vgatefilter", Reaction::method(weak, Self::on_update))
                .build(),
            state: RefCell::new(DisplayState::default()),
        });
        ctx.register(display)
    }
}
