#![forbid(unsafe_code)]

//! File menu: opens radar volumes and grids into the shared cells.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Reaction, SharedHost, Strength, Value,
};
use tracing::{info, warn};

use crate::dataset::{self, GridDataset, RadarDataset};
use crate::error::{PanelError, Result};

/// Which kind of dataset [`Menu::open`] ended up loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    Radar,
    Grid,
}

pub struct Menu {
    host: SharedHost,
    current: RefCell<Option<String>>,
    recent: RefCell<Vec<String>>,
}

impl Menu {
    const RECENT_LIMIT: usize = 10;

    fn on_radar(&self, value: &Value, _strength: Strength) {
        if let Some(radar) = RadarDataset::from_value(value) {
            self.remember(&radar.path);
        }
    }

    fn on_grid(&self, value: &Value, _strength: Strength) {
        if let Some(grid) = GridDataset::from_value(value) {
            self.remember(&grid.source);
        }
    }

    fn remember(&self, path: &str) {
        *self.current.borrow_mut() = Some(path.to_owned());
        let mut recent = self.recent.borrow_mut();
        recent.retain(|p| p != path);
        recent.insert(0, path.to_owned());
        recent.truncate(Self::RECENT_LIMIT);
    }

    /// Load `path` as a radar volume, or as a grid if it is not one, and
    /// publish it with a strong change.
    pub fn open(&self, path: &str) -> Result<Opened> {
        let ctx = self
            .host
            .context()
            .ok_or(artview_core::Error::ContextDropped)?;
        let loader = dataset::loader(&ctx)?;
        match loader.load_radar(path) {
            Ok(radar) => {
                info!(
                    path,
                    fields = radar.fields.len(),
                    sweeps = radar.sweep_count(),
                    "opened radar"
                );
                self.host.change("Vradar", radar.into_value(), Strength::Strong)?;
                Ok(Opened::Radar)
            }
            Err(radar_err) => match loader.load_grid(path) {
                Ok(grid) => {
                    info!(path, levels = grid.level_count(), "opened grid");
                    self.host.change("Vgrid", grid.into_value(), Strength::Strong)?;
                    Ok(Opened::Grid)
                }
                Err(grid_err) => {
                    warn!(path, %radar_err, %grid_err, "open failed");
                    Err(PanelError::Dataset(radar_err))
                }
            },
        }
    }

    /// Path of the dataset most recently seen on either cell.
    #[must_use]
    pub fn current_path(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Recently opened paths, newest first.
    #[must_use]
    pub fn recent(&self) -> Vec<String> {
        self.recent.borrow().clone()
    }
}

impl Component for Menu {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for Menu {
    const TYPE_NAME: &'static str = "Menu";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let menu = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare("Vgrid", Reaction::method(weak, Self::on_grid))
                .build(),
            current: RefCell::new(None),
            recent: RefCell::new(Vec::new()),
        });
        ctx.register(menu)
    }
}
