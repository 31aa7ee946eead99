//! Property: in radar mode the display always shows what the pickers and
//! the navigator say is selected, whatever order the user clicks in.

use std::rc::Rc;

use artview_core::{AppContext, change_mode, downcast_rc};
use artview_panels::{
    DatasetLoader, FieldSelector, FileNavigator, Menu, RadarDisplay, SyntheticLoader,
    TiltSelector, builtin_modes, component_catalog,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Field(usize),
    Tilt(usize),
    Next,
    Previous,
    Limits(i16),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..4).prop_map(Action::Field),
        (0usize..5).prop_map(Action::Tilt),
        Just(Action::Next),
        Just(Action::Previous),
        (-50i16..50).prop_map(Action::Limits),
    ]
}

struct Session {
    _ctx: AppContext,
    display: Rc<RadarDisplay>,
    fields: Rc<FieldSelector>,
    tilts: Rc<TiltSelector>,
    nav: Rc<FileNavigator>,
}

fn session() -> Session {
    let ctx = AppContext::default();
    ctx.provide::<Rc<dyn DatasetLoader>>(Rc::new(SyntheticLoader::new().with_series_len(4)));
    let spec = builtin_modes()
        .resolve("radar", &component_catalog())
        .expect("resolve");
    let assembly = change_mode(&ctx, &spec).expect("assemble");
    let c = &assembly.components;
    let menu = downcast_rc::<Menu>(Rc::clone(&c[0])).expect("menu");
    menu.open("KAMX_0000.nc").expect("open");
    Session {
        nav: downcast_rc(Rc::clone(&c[1])).expect("nav"),
        display: downcast_rc(Rc::clone(&c[2])).expect("display"),
        fields: downcast_rc(Rc::clone(&c[3])).expect("fields"),
        tilts: downcast_rc(Rc::clone(&c[4])).expect("tilts"),
        _ctx: ctx,
    }
}

proptest! {
    #[test]
    fn display_matches_selection(actions in proptest::collection::vec(action_strategy(), 1..24)) {
        let s = session();
        for action in actions {
            // Out-of-range picks and steps past either end are rejected
            // without changing anything.
            let _ = match action {
                Action::Field(i) => match s.fields.choices().get(i) {
                    Some(field) => s.fields.select(field),
                    None => s.fields.select("not_a_field"),
                },
                Action::Tilt(i) => s.tilts.select(i),
                Action::Next => s.nav.next().map(drop),
                Action::Previous => s.nav.previous().map(drop),
                Action::Limits(min) => s.display.set_limits(f64::from(min), f64::from(min) + 10.0),
            };

            let frame = s.display.frame().expect("frame");
            prop_assert_eq!(Some(frame.field.clone()), s.fields.selected());
            prop_assert_eq!(frame.tilt, s.tilts.selected());
            let list = s.nav.file_list();
            prop_assert_eq!(Some(frame.path.as_str()), list.current_path());
            prop_assert!(!s.display.is_stale());
            prop_assert!(frame.limits.0 < frame.limits.1);
        }
    }
}
