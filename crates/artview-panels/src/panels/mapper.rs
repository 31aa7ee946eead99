#![forbid(unsafe_code)]

//! Runs the gridder over the open volume and publishes the grid.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Reaction, SharedHost, Strength, Value,
};
use tracing::{info, info_span};

use crate::dataset::{self, GateFilter, GridOptions, RadarDataset};
use crate::error::{PanelError, Result};

pub struct Mapper {
    host: SharedHost,
    options: Cell<GridOptions>,
    /// Path of the volume the last grid was made from.
    gridded: RefCell<Option<String>>,
}

impl Mapper {
    fn on_radar(&self, value: &Value, strength: Strength) {
        // A new volume makes the previous grid out of date.
        if strength.is_strong() && RadarDataset::from_value(value).is_some() {
            self.gridded.borrow_mut().take();
        }
    }

    fn on_gate_filter(&self, _value: &Value, strength: Strength) {
        if strength.is_strong() {
            self.gridded.borrow_mut().take();
        }
    }

    #[must_use]
    pub fn options(&self) -> GridOptions {
        self.options.get()
    }

    pub fn set_options(&self, options: GridOptions) {
        self.options.set(options);
    }

    /// Whether the published grid reflects the current volume and filter.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.gridded.borrow().is_some()
    }

    /// Grid the open volume with the current gate filter and change `Vgrid`
    /// strongly.
    pub fn execute(&self) -> Result<()> {
        let radar = self
            .host
            .get("Vradar")
            .ok()
            .and_then(|v| RadarDataset::from_value(&v))
            .ok_or_else(|| PanelError::nothing_selected(self.host.name(), "Vradar"))?;
        let filter = GateFilter::from_value(&self.host.get("Vgatefilter")?);
        let ctx = self
            .host
            .context()
            .ok_or(artview_core::Error::ContextDropped)?;
        let gridder = dataset::gridder(&ctx)?;

        let span = info_span!("map_to_grid", path = %radar.path);
        let _guard = span.enter();
        let options = self.options.get();
        let grid = gridder.grid(&radar, filter.as_deref(), &options)?;
        info!(shape = ?grid.shape, filtered = filter.is_some(), "gridded");

        self.host.change("Vgrid", grid.into_value(), Strength::Strong)?;
        *self.gridded.borrow_mut() = Some(radar.path.clone());
        Ok(())
    }
}

impl Component for Mapper {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for Mapper {
    const TYPE_NAME: &'static str = "Mapper";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let mapper = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare("Vgatefilter", Reaction::method(weak, Self::on_gate_filter))
                .declare("Vgrid", Reaction::Expose)
                .build(),
            options: Cell::new(GridOptions::default()),
            gridded: RefCell::new(None),
        });
        ctx.register(mapper)
    }
}
