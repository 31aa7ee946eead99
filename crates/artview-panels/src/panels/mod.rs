#![forbid(unsafe_code)]

//! The concrete panels.
//!
//! Every panel is a [`ComponentFactory`](artview_core::ComponentFactory):
//! it declares its shared variables on creation, registers itself with the
//! context, and reacts to linked changes through its handlers.
//!
//! | Panel | Shared variables |
//! |-------|------------------|
//! | [`Menu`] | `Vradar`, `Vgrid` |
//! | [`FileNavigator`] | `Vradar`, `Vfilelist` |
//! | [`RadarDisplay`] | `Vradar`, `Vfield`, `Vtilt`, `Vlimits`, `Vcolormap`, `Vgatefilter` |
//! | [`GridDisplay`] | `Vgrid`, `Vfield`, `Vlevel`, `Vlimits`, `Vcolormap` |
//! | [`FieldSelector`] | `Vradar`, `Vfield` |
//! | [`TiltSelector`] | `Vradar`, `Vtilt` |
//! | [`Mapper`] | `Vradar`, `Vgatefilter`, `Vgrid` |
//! | [`LinkInspector`] | none |

mod grid_display;
mod link_inspector;
mod mapper;
mod menu;
mod navigator;
mod radar_display;
mod selectors;

pub use grid_display::{GridDisplay, GridFrame};
pub use link_inspector::{CellRow, LinkInspector};
pub use mapper::Mapper;
pub use menu::{Menu, Opened};
pub use navigator::FileNavigator;
pub use radar_display::{RadarDisplay, RadarFrame};
pub use selectors::{FieldSelector, TiltSelector};

use artview_core::{SharedHost, Strength, Value};
use tracing::warn;

/// Field shown before any volume has been opened.
pub const DEFAULT_FIELD: &str = "reflectivity";

pub const DEFAULT_COLORMAP: &str = "pyart_NWSRef";

/// Display limits for a field, by its conventional name.
#[must_use]
pub fn default_limits(field: &str) -> (f64, f64) {
    match field {
        "reflectivity" | "corrected_reflectivity" => (-8.0, 64.0),
        "velocity" | "corrected_velocity" => (-30.0, 30.0),
        "spectrum_width" => (0.0, 4.0),
        "differential_reflectivity" => (-1.0, 8.0),
        "cross_correlation_ratio" => (0.8, 1.0),
        "normalized_coherent_power" => (0.0, 1.0),
        "differential_phase" => (-180.0, 180.0),
        "specific_differential_phase" => (-2.0, 5.0),
        _ => (0.0, 100.0),
    }
}

/// Change `name` from inside a handler, where there is no caller to
/// return an error to.
pub(crate) fn publish(host: &SharedHost, name: &str, value: Value, strength: Strength) {
    if let Err(err) = host.change(name, value, strength) {
        warn!(component = host.name(), variable = name, %err, "follow-up change dropped");
    }
}
