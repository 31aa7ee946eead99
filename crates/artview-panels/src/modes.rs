#![forbid(unsafe_code)]

//! Built-in layouts.
//!
//! * `radar`: menu, file navigator, radar display, field and tilt pickers,
//!   all on one volume.
//! * `grid`: menu and grid display.
//! * `map_to_grid`: radar display feeding a mapper whose grid lands on a
//!   grid display.
//!
//! Positions in the links below refer to the component lists.

use artview_core::{ArtviewConfig, ComponentCatalog, ModeCatalog, ModeDefinition};

use crate::panels::{
    FieldSelector, FileNavigator, GridDisplay, LinkInspector, Mapper, Menu, RadarDisplay,
    TiltSelector,
};

/// Every panel type, addressable by its type name.
#[must_use]
pub fn component_catalog() -> ComponentCatalog {
    ComponentCatalog::new()
        .with::<Menu>()
        .with::<FileNavigator>()
        .with::<RadarDisplay>()
        .with::<GridDisplay>()
        .with::<FieldSelector>()
        .with::<TiltSelector>()
        .with::<Mapper>()
        .with::<LinkInspector>()
}

#[must_use]
pub fn radar_mode() -> ModeDefinition {
    ModeDefinition::new("radar")
        .with_description("Browse radar volumes sweep by sweep")
        .with_component("Menu")
        .with_component("FileNavigator")
        .with_component("RadarDisplay")
        .with_component("FieldSelector")
        .with_component("TiltSelector")
        .share("Vradar", 1, 0)
        .share("Vradar", 2, 0)
        .share("Vradar", 3, 0)
        .share("Vradar", 4, 0)
        .share("Vfield", 3, 2)
        .share("Vtilt", 4, 2)
}

#[must_use]
pub fn grid_mode() -> ModeDefinition {
    ModeDefinition::new("grid")
        .with_description("Inspect a gridded file level by level")
        .with_component("Menu")
        .with_component("GridDisplay")
        .share("Vgrid", 1, 0)
}

#[must_use]
pub fn map_to_grid_mode() -> ModeDefinition {
    ModeDefinition::new("map_to_grid")
        .with_description("Grid the open volume and show the result")
        .with_component("Menu")
        .with_component("RadarDisplay")
        .with_component("Mapper")
        .with_component("GridDisplay")
        .share("Vradar", 1, 0)
        .share("Vradar", 2, 0)
        .share("Vgatefilter", 2, 1)
        .share("Vgrid", 2, 0)
        .share("Vgrid", 3, 0)
        .share("Vfield", 3, 1)
}

#[must_use]
pub fn builtin_modes() -> ModeCatalog {
    ModeCatalog::new()
        .with(radar_mode())
        .with(grid_mode())
        .with(map_to_grid_mode())
}

/// Built-in modes, overridden and extended by the config's modes.
#[must_use]
pub fn modes_for(config: &ArtviewConfig) -> ModeCatalog {
    let mut modes = builtin_modes();
    modes.extend(config.modes.iter().cloned());
    modes
}
