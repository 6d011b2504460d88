//! Contract Test: Undo/Redo Coalescing
//!
//! This test verifies that the history records a minimal, correct set of
//! reversible steps and that replaying them restores application data.
//!
//! Constraints verified:
//! - Same-node bursts within the window collapse into one entry
//! - A merged entry reverses to the value before the first write
//! - A final write seals a burst
//! - Undo/redo of writes round-trips through the value pipeline
//! - Button actions are undone by the closure they returned
//!
//! If this test fails, undo can skip or repeat user edits.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use common::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uiconfig_core::methods::ChangeProps;
use uiconfig_core::node::{ConfigNode, NodeRef};
use uiconfig_core::scheduler::Phase;
use uiconfig_core::traits::UndoManager;
use uiconfig_core::undo::{SetValueCommand, UndoCommand};
use uiconfig_core::value::{Action, ClickOutcome, ObjectValue, Record, Reversible, Value};
use uiconfig_core::UiConfigSettings;

fn set_value(node: &NodeRef, previous: i32, value: i32, is_final: bool, at: chrono::DateTime<Utc>) -> UndoCommand {
    UndoCommand::SetValue(SetValueCommand {
        node: node.clone(),
        previous: Some(Value::from(previous)),
        value: Value::from(value),
        is_final,
        props: ChangeProps::last(is_final),
        timestamp: at,
    })
}

#[test]
fn writes_within_window_collapse_into_one_entry() {
    let (methods, history) = methods_with(UiConfigSettings::default().with_coalesce_window_ms(2000));
    let node = ConfigNode::builder("number").value(1).build();
    let start = Utc::now();

    methods.record_undo(set_value(&node, 1, 2, false, start));
    methods.record_undo(set_value(&node, 2, 3, false, start + ChronoDuration::milliseconds(500)));

    assert_eq!(history.undo_count(), 1);
    let merged = history.peek().unwrap();
    let merged = merged.as_set_value().unwrap();
    assert_eq!(merged.previous, Some(Value::from(1)));
    assert_eq!(merged.value, Value::from(3));
}

#[test]
fn writes_outside_window_stay_separate() {
    let (methods, history) = methods_with(UiConfigSettings::default().with_coalesce_window_ms(2000));
    let node = ConfigNode::builder("number").value(1).build();
    let start = Utc::now();

    methods.record_undo(set_value(&node, 1, 2, false, start));
    methods.record_undo(set_value(&node, 2, 3, false, start + ChronoDuration::milliseconds(2500)));

    assert_eq!(history.undo_count(), 2);
}

#[test]
fn writes_to_different_nodes_stay_separate() {
    let (methods, history) = methods();
    let a = ConfigNode::builder("number").value(1).build();
    let b = ConfigNode::builder("number").value(1).build();
    let start = Utc::now();

    methods.record_undo(set_value(&a, 1, 2, false, start));
    methods.record_undo(set_value(&b, 1, 2, false, start + ChronoDuration::milliseconds(10)));

    assert_eq!(history.undo_count(), 2);
}

#[test]
fn unchanged_command_is_not_recorded() {
    let (methods, history) = methods();
    let node = ConfigNode::builder("number").value(1).build();

    methods.record_undo(set_value(&node, 4, 4, true, Utc::now()));

    assert_eq!(history.undo_count(), 0);
}

#[test]
fn final_write_seals_a_burst() {
    let person = Record::new().with_field("age", 30).into_shared();
    let node = ConfigNode::builder("slider").bind(person.clone(), "age").build();
    let (methods, history) = methods();

    methods.write_now(&node, 31, ChangeProps::last(false), false, true);
    methods.write_now(&node, 32, ChangeProps::last(false), false, true);
    assert_eq!(history.undo_count(), 1);

    // drag released on the same value: accepted because it is final
    assert!(methods.write_now(&node, 32, ChangeProps::last(true), false, true));
    assert_eq!(history.undo_count(), 1);
    let sealed = history.peek().unwrap();
    let sealed = sealed.as_set_value().unwrap();
    assert!(sealed.is_final);
    assert_eq!(sealed.previous, Some(Value::from(30)));

    methods.write_now(&node, 33, ChangeProps::last(false), false, true);
    assert_eq!(history.undo_count(), 2);
}

#[tokio::test]
async fn write_undo_redo_round_trip() {
    let person = Record::new()
        .with_field("name", "John")
        .with_field("age", 30)
        .into_shared();
    let node = ConfigNode::builder("number")
        .label("Age")
        .bind(person.clone(), "age")
        .bounds(vec![0.0, 150.0])
        .build();
    let (methods, history) = methods();

    let write = methods.write(&node, 35, ChangeProps::last(true), false, true);
    methods.scheduler().fire(Phase::PostFrame);
    assert!(write.await.unwrap());
    assert_eq!(methods.value(&node), Some(Value::from(35)));

    let undo = methods.undo();
    methods.scheduler().fire(Phase::PostFrame);
    assert!(undo.await.unwrap());
    assert_eq!(methods.value(&node), Some(Value::from(30)));
    assert_eq!(history.redo_count(), 1);

    let redo = methods.redo();
    methods.scheduler().fire(Phase::PostFrame);
    assert!(redo.await.unwrap());
    assert_eq!(methods.value(&node), Some(Value::from(35)));

    // replays never add entries of their own
    assert_eq!(history.undo_count(), 1);
    assert_eq!(person.get("name"), Some(Value::from("John")));
}

#[tokio::test]
async fn undo_restores_value_before_whole_burst() {
    let person = Record::new().with_field("age", 30).into_shared();
    let node = ConfigNode::builder("slider").bind(person.clone(), "age").build();
    let (methods, _history) = methods();

    for age in [31, 32, 33] {
        methods.write_now(&node, age, ChangeProps::last(false), false, true);
    }
    methods.write_now(&node, 34, ChangeProps::last(true), false, true);

    let undo = methods.undo();
    methods.scheduler().fire(Phase::PostFrame);
    assert!(undo.await.unwrap());
    assert_eq!(person.get("age"), Some(Value::from(30)));
}

#[tokio::test]
async fn nothing_to_undo_resolves_false() {
    let (methods, _history) = methods();
    assert!(!methods.undo().await.unwrap());
    assert!(!methods.redo().await.unwrap());
}

#[tokio::test]
async fn button_undo_calls_returned_closure_once() {
    let undo_calls = Arc::new(AtomicUsize::new(0));
    let action_calls = Arc::new(AtomicUsize::new(0));

    let f = {
        let undo_calls = undo_calls.clone();
        Action::unit(move || {
            undo_calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    let returned = f.clone();
    let calls = action_calls.clone();
    let scene = Record::new()
        .with_field("spawn", Action::new(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            ClickOutcome::Undo(returned.clone())
        }))
        .into_shared();
    let node = ConfigNode::builder("button").bind(scene, "spawn").build();
    let (methods, history) = methods();

    methods.click_button_now(&node, vec![]);

    assert_eq!(action_calls.load(Ordering::SeqCst), 1);
    assert_eq!(history.undo_count(), 1);
    let recorded = history.peek().unwrap();
    assert!(recorded.as_action().unwrap().undo.ptr_eq(&f));

    assert!(methods.undo().await.unwrap());
    assert_eq!(undo_calls.load(Ordering::SeqCst), 1);
    assert_eq!(action_calls.load(Ordering::SeqCst), 1);

    // a bare undo function makes the action its own redo
    assert!(methods.redo().await.unwrap());
    assert_eq!(action_calls.load(Ordering::SeqCst), 2);
    assert_eq!(undo_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reversible_click_runs_action_now_and_replays_it() {
    let counter = Record::new().with_field("count", 0).into_shared();

    let increment = {
        let counter = counter.clone();
        Action::unit(move || {
            let n = counter.get("count").and_then(|v| v.as_f64()).unwrap_or(0.0);
            counter.insert("count", n + 1.0);
        })
    };
    let decrement = {
        let counter = counter.clone();
        Action::unit(move || {
            let n = counter.get("count").and_then(|v| v.as_f64()).unwrap_or(0.0);
            counter.insert("count", n - 1.0);
        })
    };

    let node = ConfigNode::builder("button")
        .label("Add")
        .on_click(Action::new(move |_| {
            ClickOutcome::Reversible(Reversible {
                action: Some(increment.clone()),
                undo: Some(decrement.clone()),
                redo: None,
            })
        }))
        .build();
    let (methods, history) = methods();

    methods.click_button_now(&node, vec![]);
    assert_eq!(counter.get("count"), Some(Value::from(1)));
    assert_eq!(history.undo_count(), 1);

    assert!(methods.undo().await.unwrap());
    assert_eq!(counter.get("count"), Some(Value::from(0)));

    assert!(methods.redo().await.unwrap());
    assert_eq!(counter.get("count"), Some(Value::from(1)));
}

#[test]
fn disabled_history_records_nothing() {
    let (methods, history) = methods();
    history.set_enabled(false);
    let person = Record::new().with_field("age", 30).into_shared();
    let node = ConfigNode::builder("number").bind(person, "age").build();

    assert!(methods.write_now(&node, 40, ChangeProps::last(true), false, true));
    assert_eq!(history.undo_count(), 0);
}
