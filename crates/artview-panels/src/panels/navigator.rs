#![forbid(unsafe_code)]

//! Steps through the files of the series the open volume belongs to.
//!
//! Whenever `Vradar` changes, the navigator asks the loader for the
//! volume's siblings and publishes them on `Vfilelist` with the open file
//! marked. Stepping loads the neighbouring file and changes `Vradar`
//! strongly, which every linked panel sees as a new volume.

use std::rc::{Rc, Weak};

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Reaction, SharedHost, Strength, Value,
};
use tracing::debug;

use super::publish;
use crate::dataset::{self, FileList, RadarDataset};
use crate::error::{PanelError, Result};

pub struct FileNavigator {
    host: SharedHost,
}

impl FileNavigator {
    fn on_radar(&self, value: &Value, strength: Strength) {
        let Some(radar) = RadarDataset::from_value(value) else {
            return;
        };
        let Some(ctx) = self.host.context() else {
            return;
        };
        let paths = match dataset::loader(&ctx) {
            Ok(loader) => loader.siblings(&radar.path),
            Err(_) => vec![radar.path.clone()],
        };
        let current = paths.iter().position(|p| *p == radar.path);
        debug!(path = %radar.path, files = paths.len(), ?current, "file list refreshed");
        // Same strength as the volume change.
        let list = FileList { paths, current }.into_value();
        publish(&self.host, "Vfilelist", list, strength);
    }

    #[must_use]
    pub fn file_list(&self) -> FileList {
        self.host
            .get("Vfilelist")
            .ok()
            .and_then(|v| FileList::from_value(&v))
            .map(|list| (*list).clone())
            .unwrap_or_default()
    }

    pub fn next(&self) -> Result<String> {
        self.step(|current, _| current.map_or(0, |i| i + 1))
    }

    pub fn previous(&self) -> Result<String> {
        self.step(|current, _| current.map_or(0, |i| i.wrapping_sub(1)))
    }

    pub fn first(&self) -> Result<String> {
        self.step(|_, _| 0)
    }

    pub fn last(&self) -> Result<String> {
        self.step(|_, len| len.wrapping_sub(1))
    }

    /// Open the file at `index` of the current list.
    pub fn go_to(&self, index: usize) -> Result<String> {
        self.step(|_, _| index)
    }

    fn step(&self, pick: impl FnOnce(Option<usize>, usize) -> usize) -> Result<String> {
        let list = self.file_list();
        if list.paths.is_empty() {
            return Err(PanelError::nothing_selected(self.host.name(), "Vfilelist"));
        }
        let index = pick(list.current, list.paths.len());
        let Some(path) = list.paths.get(index) else {
            return Err(PanelError::invalid_choice(self.host.name(), index));
        };
        let ctx = self
            .host
            .context()
            .ok_or(artview_core::Error::ContextDropped)?;
        let radar = dataset::loader(&ctx)?.load_radar(path)?;
        self.host.change("Vradar", radar.into_value(), Strength::Strong)?;
        Ok(path.clone())
    }
}

impl Component for FileNavigator {
    fn host(&self) -> &SharedHost {
        &self.host
    }
}

impl ComponentFactory for FileNavigator {
    const TYPE_NAME: &'static str = "FileNavigator";

    fn create(ctx: &AppContext, spec: ComponentSpec) -> artview_core::Result<Rc<Self>> {
        let navigator = Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: SharedHost::builder(ctx, Self::TYPE_NAME, spec)
                .declare("Vradar", Reaction::method(weak, Self::on_radar))
                .declare("Vfilelist", Reaction::Expose)
                .build(),
        });
        ctx.register(navigator)
    }
}
