//! Property-based invariants for shared cells and links.
//!
//! 1. Every subscriber sees every change exactly once, in subscription order.
//! 2. Unsubscribed handlers never run; the rest keep their relative order.
//! 3. After any sequence of links, two components share a cell exactly when
//!    a simple "dest adopts src's cell" model says they do.
//! 4. A change reaches each component holding the cell exactly once.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use artview_core::{
    AppContext, Component, ComponentFactory, ComponentSpec, Observable, Strength, Value,
    link_cells, shares_cell,
};
use common::Watcher;
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn strength_strategy() -> impl Strategy<Value = Strength> {
    prop_oneof![Just(Strength::Strong), Just(Strength::Weak)]
}

#[derive(Debug, Clone)]
enum Op {
    Subscribe,
    Unsubscribe(usize),
    Change(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Subscribe),
        1 => (0usize..16).prop_map(Op::Unsubscribe),
        3 => any::<i64>().prop_map(Op::Change),
    ]
}

fn links_strategy(components: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((0..components, 0..components), 0..12)
}

// ── Properties ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_subscriber_sees_every_change_in_order(
        subscribers in 1usize..8,
        changes in proptest::collection::vec((any::<i64>(), strength_strategy()), 1..16),
    ) {
        let cell = Observable::new(Value::None);
        let log = Rc::new(RefCell::new(Vec::new()));
        for n in 0..subscribers {
            let log = Rc::clone(&log);
            cell.subscribe(move |_, value, strength| {
                log.borrow_mut().push((n, value.as_int(), strength));
            });
        }

        for (v, s) in &changes {
            cell.change(Value::Int(*v), *s);
            prop_assert_eq!(cell.get().as_int(), Some(*v));
        }

        let expected: Vec<_> = changes
            .iter()
            .flat_map(|(v, s)| (0..subscribers).map(move |n| (n, Some(*v), *s)))
            .collect();
        prop_assert_eq!(&*log.borrow(), &expected);
    }

    #[test]
    fn subscriber_list_matches_model(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let cell = Observable::new(Value::None);
        let log = Rc::new(RefCell::new(Vec::new()));
        // (tag, id) of live subscribers, in subscription order.
        let mut live = Vec::new();
        let mut next_tag = 0usize;

        for op in ops {
            match op {
                Op::Subscribe => {
                    let tag = next_tag;
                    next_tag += 1;
                    let log = Rc::clone(&log);
                    let id = cell.subscribe(move |_, _, _| log.borrow_mut().push(tag));
                    live.push((tag, id));
                }
                Op::Unsubscribe(pick) => {
                    if live.is_empty() {
                        continue;
                    }
                    let (_, id) = live.remove(pick % live.len());
                    prop_assert!(cell.unsubscribe(id));
                    prop_assert!(!cell.unsubscribe(id));
                }
                Op::Change(v) => {
                    log.borrow_mut().clear();
                    cell.change(Value::Int(v), Strength::Strong);
                    let expected: Vec<usize> = live.iter().map(|(tag, _)| *tag).collect();
                    prop_assert_eq!(&*log.borrow(), &expected);
                }
            }
            prop_assert_eq!(cell.subscriber_count(), live.len());
        }
    }

    #[test]
    fn link_sequence_matches_adoption_model(
        count in 2usize..6,
        links in links_strategy(6),
        writer in 0usize..6,
        value in any::<i64>(),
    ) {
        let ctx = AppContext::default();
        let watchers: Vec<_> = (0..count)
            .map(|_| Watcher::create(&ctx, ComponentSpec::new()).expect("watcher"))
            .collect();
        // model[i] = identity of the cell component i holds for "X".
        let mut model: Vec<usize> = (0..count).collect();

        for (dest, src) in links {
            let (dest, src) = (dest % count, src % count);
            link_cells(&*watchers[dest], "X", &*watchers[src], "X")
                .expect("link");
            model[dest] = model[src];
        }

        for i in 0..count {
            for j in 0..count {
                prop_assert_eq!(
                    shares_cell(&*watchers[i], "X", &*watchers[j], "X"),
                    model[i] == model[j]
                );
            }
        }

        for w in &watchers {
            w.take();
        }
        let writer = writer % count;
        watchers[writer]
            .host()
            .change("X", Value::Int(value), Strength::Weak)
            .expect("change");
        for (i, w) in watchers.iter().enumerate() {
            let seen = w.take_x_ints();
            if model[i] == model[writer] {
                prop_assert_eq!(seen, vec![value]);
            } else {
                prop_assert!(seen.is_empty());
            }
        }
    }
}
