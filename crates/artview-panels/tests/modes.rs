//! Built-in modes end to end: open, browse, switch modes, grid.

use std::rc::Rc;

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, LinkOutcome, change_mode, downcast_rc,
};
use artview_panels::{
    DatasetLoader, FieldSelector, FileNavigator, GateFilter, GridDisplay, Gridder, LinkInspector,
    Mapper, Menu, Opened, PanelError, RadarDisplay, SyntheticGridder, SyntheticLoader, TiltSelector,
    builtin_modes, component_catalog,
};

fn context() -> AppContext {
    let ctx = AppContext::default();
    ctx.provide::<Rc<dyn DatasetLoader>>(Rc::new(SyntheticLoader::new().with_series_len(3)));
    ctx.provide::<Rc<dyn Gridder>>(Rc::new(SyntheticGridder));
    ctx
}

fn panel<C: Component>(ctx: &AppContext, name: &str) -> Rc<C> {
    let component = ctx.registry().find_by_name(name).expect(name);
    downcast_rc::<C>(component).expect(name)
}

fn enter(ctx: &AppContext, mode: &str) -> artview_core::Assembly {
    let spec = builtin_modes()
        .resolve(mode, &component_catalog())
        .expect("resolve");
    change_mode(ctx, &spec).expect("assemble")
}

#[test]
fn radar_mode_wires_one_volume_through_every_panel() {
    let ctx = context();
    let assembly = enter(&ctx, "radar");
    assert_eq!(assembly.created.len(), 5);
    assert!(assembly.outcomes.iter().all(|o| *o == LinkOutcome::Rebound));

    let menu: Rc<Menu> = panel(&ctx, "Menu");
    let display: Rc<RadarDisplay> = panel(&ctx, "RadarDisplay");
    let fields: Rc<FieldSelector> = panel(&ctx, "FieldSelector");
    let tilts: Rc<TiltSelector> = panel(&ctx, "TiltSelector");
    let nav: Rc<FileNavigator> = panel(&ctx, "FileNavigator");

    assert_eq!(menu.open("KVNX_0000.nc"), Ok(Opened::Radar));
    assert_eq!(display.frame().map(|f| f.path), Some("KVNX_0000.nc".into()));
    assert_eq!(fields.choices().len(), 3);
    assert_eq!(tilts.angles().len(), 4);
    assert_eq!(nav.file_list().paths.len(), 3);

    fields.select("velocity").expect("field");
    tilts.select(1).expect("tilt");
    let frame = display.frame().expect("frame");
    assert_eq!((frame.field.as_str(), frame.tilt, frame.limits), ("velocity", 1, (-30.0, 30.0)));

    assert_eq!(nav.next().as_deref(), Ok("KVNX_0001.nc"));
    let frame = display.frame().expect("frame");
    assert_eq!((frame.path.as_str(), frame.field.as_str()), ("KVNX_0001.nc", "velocity"));
    assert_eq!(menu.current_path().as_deref(), Some("KVNX_0001.nc"));
}

#[test]
fn switching_modes_reuses_running_panels() {
    let ctx = context();
    enter(&ctx, "radar");
    let menu: Rc<Menu> = panel(&ctx, "Menu");
    menu.open("KVNX_0002.nc").expect("open");

    let assembly = enter(&ctx, "map_to_grid");
    assert_eq!(assembly.reused.len(), 2);
    assert_eq!(assembly.created.len(), 2);
    assert_eq!(ctx.registry().len(), 7);

    // Menu and display were already linked on Vradar.
    assert_eq!(assembly.outcomes[0], LinkOutcome::AlreadyShared);

    let display: Rc<RadarDisplay> = panel(&ctx, "RadarDisplay");
    let mapper: Rc<Mapper> = panel(&ctx, "Mapper");
    let grid: Rc<GridDisplay> = panel(&ctx, "GridDisplay");

    display
        .set_gate_filter(Some(GateFilter::new().keep_inside("reflectivity", 0.0, 75.0)))
        .expect("filter");
    mapper.execute().expect("grid");
    assert!(mapper.is_current());
    assert_eq!(grid.frame().map(|f| f.source), Some("KVNX_0002.nc".into()));
    assert_eq!(menu.current_path().as_deref(), Some("KVNX_0002.nc"));

    let again = enter(&ctx, "map_to_grid");
    assert!(again.created.is_empty());
    assert!(again.outcomes.iter().all(|o| *o == LinkOutcome::AlreadyShared));
}

#[test]
fn gate_filter_written_as_json_drives_display_and_mapper() {
    let ctx = context();
    enter(&ctx, "map_to_grid");
    let menu: Rc<Menu> = panel(&ctx, "Menu");
    let display: Rc<RadarDisplay> = panel(&ctx, "RadarDisplay");
    let mapper: Rc<Mapper> = panel(&ctx, "Mapper");
    menu.open("KVNX_0000.nc").expect("open");

    let filter: GateFilter = serde_json::from_str(
        r#"{"rules": [
            {"field": "reflectivity", "min": 0.0, "max": 75.0},
            {"field": "velocity", "min": -20.0, "max": 20.0}
        ]}"#,
    )
    .expect("filter json");
    display.set_gate_filter(Some(filter)).expect("filter");
    assert_eq!(display.frame().map(|f| f.filter_rules), Some(2));
    mapper.execute().expect("grid");
    assert!(mapper.is_current());

    let unknown: GateFilter =
        serde_json::from_str(r#"{"rules": [{"field": "zdr", "min": -2.0, "max": 8.0}]}"#)
            .expect("filter json");
    display.set_gate_filter(Some(unknown)).expect("filter");
    assert!(matches!(mapper.execute(), Err(PanelError::Dataset(_))));
}

#[test]
fn grid_mode_opens_grid_files() {
    let ctx = context();
    enter(&ctx, "grid");
    let menu: Rc<Menu> = panel(&ctx, "Menu");
    let grid: Rc<GridDisplay> = panel(&ctx, "GridDisplay");
    assert_eq!(menu.open("cube.grid"), Ok(Opened::Grid));
    assert_eq!(grid.frame().map(|f| f.source), Some("cube.grid".into()));
}

#[test]
fn inspector_sees_mode_wiring() {
    let ctx = context();
    let inspector = LinkInspector::create(&ctx, ComponentSpec::new()).expect("inspector");
    enter(&ctx, "grid");
    assert_eq!(inspector.rows().len(), 7);

    // Links do not touch the registry, so the table needs an explicit refresh.
    assert!(inspector.linked_rows().is_empty());
    inspector.refresh();
    let linked = inspector.linked_rows();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].cell_name, "Vgrid");
    assert_eq!(linked[0].members, vec!["Menu", "GridDisplay"]);
}

#[test]
fn closing_a_panel_detaches_it() {
    let ctx = context();
    enter(&ctx, "radar");
    let menu: Rc<Menu> = panel(&ctx, "Menu");
    let tilts: Rc<TiltSelector> = panel(&ctx, "TiltSelector");
    tilts.close().expect("close");

    menu.open("KVNX_0000.nc").expect("open");
    assert!(tilts.angles().is_empty());
    assert!(ctx.registry().find_by_name("TiltSelector").is_none());
}
