#![forbid(unsafe_code)]

//! End-to-end tests for `Resettable` undo/redo.
//!
//! Validates:
//! - Value-type fields edited through key paths, undone and redone
//! - Shared (reference-like) state edited with explicit inverses
//! - Collection edits with exact structural inverses
//! - Amend, Insert and Inject threading
//! - Full-history dump output
//! - 100 sequential edits with JSONL structured logging per step

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::time::Instant;

use resettable::{HistoryConfig, KeyPath, OperationBehavior, Resettable, ValueSemantic, key_path};

// ============================================================================
// State models
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct Inner {
    value: i32,
}

impl ValueSemantic for Inner {}

#[derive(Debug, Clone, Default, PartialEq)]
struct TestStruct {
    inner: Inner,
    boolean: bool,
    int: i32,
    optional: Option<Inner>,
}

#[derive(Debug, Clone, PartialEq)]
struct Object {
    id: u32,
    value: i32,
}

impl Object {
    fn new(id: u32, value: i32) -> Self {
        Self { id, value }
    }
}

fn inner_value() -> KeyPath<TestStruct, i32> {
    key_path!(TestStruct => inner.value)
}

fn boolean() -> KeyPath<TestStruct, bool> {
    key_path!(TestStruct => boolean)
}

fn int() -> KeyPath<TestStruct, i32> {
    key_path!(TestStruct => int)
}

fn optional() -> KeyPath<TestStruct, Option<Inner>> {
    key_path!(TestStruct => optional)
}

fn object_value() -> KeyPath<Object, i32> {
    key_path!(Object => value)
}

// ============================================================================
// Value types
// ============================================================================

#[test]
fn e2e_undo_redo_value_type() {
    let mut expected = TestStruct::default();
    let mut r = Resettable::new(expected.clone());

    r.at(inner_value()).set(1);
    expected.inner.value = 1;
    r.at(boolean()).set(true);
    expected.boolean = true;
    r.at(inner_value()).set(2);
    expected.inner.value = 2;
    r.at(int()).set(10);
    expected.int = 10;
    assert_eq!(r.value(), &expected);

    r.undo();
    expected.int = 0;
    assert_eq!(r.value(), &expected);

    r.undo();
    expected.inner.value = 1;
    assert_eq!(r.value(), &expected);

    r.undo();
    expected.boolean = false;
    assert_eq!(r.value(), &expected);

    r.undo();
    expected.inner.value = 0;
    assert_eq!(r.value(), &expected);

    r.redo();
    expected.inner.value = 1;
    assert_eq!(r.value(), &expected);

    r.at(int()).update(|v| *v += 1);
    expected.int = 1;
    assert_eq!(r.value(), &expected);

    r.undo();
    expected.int = 0;
    assert_eq!(r.value(), &expected);

    r.redo();
    expected.int = 1;
    assert_eq!(r.value(), &expected);

    // At the newest node: no-op.
    r.redo();
    assert_eq!(r.value(), &expected);

    r.at(optional()).set(Some(Inner::default()));
    expected.optional = Some(Inner::default());
    assert_eq!(r.value(), &expected);

    r.at(optional())
        .optional_at(key_path!(Inner => value))
        .set(Some(1));
    expected.optional = Some(Inner { value: 1 });
    assert_eq!(r.value(), &expected);

    r.at(optional()).set(None);
    expected.optional = None;
    assert_eq!(r.value(), &expected);
}

#[test]
fn e2e_concrete_scenario_four_edits() {
    let mut r = Resettable::new(TestStruct::default());
    r.at(inner_value())
        .set(1)
        .at(boolean())
        .set(true)
        .at(inner_value())
        .set(2)
        .at(int())
        .set(10);

    let edited = TestStruct {
        inner: Inner { value: 2 },
        boolean: true,
        int: 10,
        optional: None,
    };
    assert_eq!(r.value(), &edited);

    r.undo_n(4);
    assert_eq!(r.value(), &TestStruct::default());
    assert!(!r.can_undo());

    r.redo_n(4);
    assert_eq!(r.value(), &edited);
    assert!(!r.can_redo());
}

// ============================================================================
// Reference-like state
// ============================================================================

type Shared = Rc<RefCell<TestStruct>>;

fn add_inner(r: &mut Resettable<Shared>, operation: OperationBehavior, delta: i32) {
    r.modify(
        operation,
        move |s| s.borrow_mut().inner.value += delta,
        move |s| s.borrow_mut().inner.value -= delta,
    );
}

fn toggle_boolean(r: &mut Resettable<Shared>) {
    let toggle = |s: &mut Shared| {
        let mut s = s.borrow_mut();
        s.boolean = !s.boolean;
    };
    r.modify(OperationBehavior::Default, toggle, toggle);
}

fn add_int(r: &mut Resettable<Shared>, delta: i32) {
    r.modify(
        OperationBehavior::Default,
        move |s| s.borrow_mut().int += delta,
        move |s| s.borrow_mut().int -= delta,
    );
}

fn set_optional(r: &mut Resettable<Shared>, value: Option<Inner>) {
    let previous = r.value().borrow().optional.clone();
    r.modify(
        OperationBehavior::Default,
        move |s| s.borrow_mut().optional = value.clone(),
        move |s| s.borrow_mut().optional = previous.clone(),
    );
}

#[test]
fn e2e_undo_redo_reference_type() {
    let shared: Shared = Rc::new(RefCell::new(TestStruct::default()));
    let mut expected = TestStruct::default();
    let mut r = Resettable::new(Rc::clone(&shared));

    add_inner(&mut r, OperationBehavior::Default, 1);
    expected.inner.value = 1;
    toggle_boolean(&mut r);
    expected.boolean = true;
    add_inner(&mut r, OperationBehavior::Default, 1);
    expected.inner.value = 2;
    add_int(&mut r, 10);
    expected.int = 10;
    assert_eq!(*shared.borrow(), expected);

    r.undo();
    expected.int = 0;
    assert_eq!(*shared.borrow(), expected);

    r.undo();
    expected.inner.value = 1;
    assert_eq!(*shared.borrow(), expected);

    r.undo();
    expected.boolean = false;
    assert_eq!(*shared.borrow(), expected);

    r.undo();
    expected.inner.value = 0;
    assert_eq!(*shared.borrow(), expected);

    r.redo();
    expected.inner.value = 1;
    assert_eq!(*shared.borrow(), expected);

    add_int(&mut r, 1);
    expected.int = 1;
    assert_eq!(*shared.borrow(), expected);

    r.undo();
    expected.int = 0;
    assert_eq!(*shared.borrow(), expected);

    r.redo().redo();
    expected.int = 1;
    assert_eq!(*shared.borrow(), expected);

    set_optional(&mut r, Some(Inner::default()));
    expected.optional = Some(Inner::default());
    assert_eq!(*shared.borrow(), expected);

    set_optional(&mut r, None);
    expected.optional = None;
    assert_eq!(*shared.borrow(), expected);

    r.reset();
    assert_eq!(*shared.borrow(), TestStruct::default());
}

#[test]
fn e2e_amend_reference_type() {
    let shared: Shared = Rc::new(RefCell::new(TestStruct::default()));
    let mut expected = TestStruct::default();
    let mut r = Resettable::new(Rc::clone(&shared));

    add_inner(&mut r, OperationBehavior::Default, 1);
    toggle_boolean(&mut r);
    add_inner(&mut r, OperationBehavior::Default, 1);
    add_int(&mut r, 10);
    r.undo_n(3);
    expected.inner.value = 1;
    assert_eq!(*shared.borrow(), expected);

    add_inner(&mut r, OperationBehavior::Amend, 100);
    expected.inner.value = 100;
    assert_eq!(*shared.borrow(), expected);

    r.redo();
    expected.boolean = true;
    assert_eq!(*shared.borrow(), expected);

    r.redo();
    expected.inner.value = 101;
    assert_eq!(*shared.borrow(), expected);

    r.redo();
    expected.int = 10;
    assert_eq!(*shared.borrow(), expected);
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn e2e_undo_redo_collection() {
    let mut first = Object::new(1, 0);
    let mut second = Object::new(2, 1);
    let mut r = Resettable::new(vec![first.clone(), second.clone()]);

    r.collection().swap_at(0, 1);
    assert_eq!(r.value(), &vec![second.clone(), first.clone()]);

    r.collection()
        .safe_index(0)
        .optional_at(object_value())
        .set(Some(0));
    second.value = 0;
    assert_eq!(r.value(), &vec![second.clone(), first.clone()]);

    r.undo();
    second.value = 1;
    assert_eq!(r.value(), &vec![second.clone(), first.clone()]);

    r.undo();
    assert_eq!(r.value(), &vec![first.clone(), second.clone()]);

    r.redo();
    assert_eq!(r.value(), &vec![second.clone(), first.clone()]);

    let third = Object::new(3, -1);
    r.collection()
        .swap_at(0, 1)
        .collection()
        .safe_index(0)
        .optional_at(object_value())
        .set(Some(2))
        .collection()
        .append(third.clone())
        .modify(OperationBehavior::Default, |v| v.reverse(), |v| v.reverse());
    first.value = 2;
    assert_eq!(
        r.value(),
        &vec![third.clone(), second.clone(), first.clone()]
    );

    // Nothing to redo.
    r.redo().redo().redo();
    assert_eq!(
        r.value(),
        &vec![third.clone(), second.clone(), first.clone()]
    );

    r.undo();
    assert_eq!(
        r.value(),
        &vec![first.clone(), second.clone(), third.clone()]
    );

    r.undo();
    assert_eq!(r.value(), &vec![first.clone(), second.clone()]);

    r.redo();
    assert_eq!(
        r.value(),
        &vec![first.clone(), second.clone(), third.clone()]
    );

    r.collection()
        .remove(2)
        .collection()
        .remove(1)
        .collection()
        .remove(0);
    assert!(r.value().is_empty());

    r.undo().undo().undo();
    assert_eq!(
        r.value(),
        &vec![first.clone(), second.clone(), third.clone()]
    );

    r.restore();
    assert!(r.value().is_empty());

    r.reset();
    first.value = 0;
    second.value = 1;
    assert_eq!(r.value(), &vec![first, second]);
    let ids: Vec<u32> = r.value().iter().map(|object| object.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn e2e_insert_collection_keeps_future() {
    let first = Object::new(1, 0);
    let mut second = Object::new(2, 1);
    let third = Object::new(3, 2);
    let mut r = Resettable::new(vec![first.clone(), second.clone()]);

    r.collection().swap_at(0, 1);
    r.collection()
        .safe_index(0)
        .optional_at(object_value())
        .set(Some(0));
    second.value = 0;
    assert_eq!(r.value(), &vec![second.clone(), first.clone()]);

    r.undo();
    second.value = 1;
    r.undo();
    assert_eq!(r.value(), &vec![first.clone(), second.clone()]);

    r.collection()
        .with_behavior(OperationBehavior::Insert)
        .append(third.clone());
    assert_eq!(
        r.value(),
        &vec![first.clone(), second.clone(), third.clone()]
    );

    r.redo();
    assert_eq!(r.value(), &vec![second.clone(), first.clone(), third]);

    r.redo();
    assert_eq!(r.value()[0].value, 0);
}

#[test]
fn e2e_nested_collection_in_struct() {
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Board {
        title: String,
        columns: Vec<Vec<u32>>,
    }

    let mut r = Resettable::new(Board::default());
    r.collection_at(key_path!(Board => columns))
        .append(Vec::new())
        .collection_at(key_path!(Board => columns))
        .append(vec![9])
        .at(key_path!(Board => columns))
        .index(0)
        .collection()
        .append(1)
        .at(key_path!(Board => title))
        .set("board".to_owned());

    assert_eq!(r.value().columns, vec![vec![1], vec![9]]);
    r.undo_n(2);
    assert_eq!(r.value().columns, vec![vec![], vec![9]]);
    assert_eq!(r.value().title, "");
}

// ============================================================================
// Operation behaviors
// ============================================================================

#[test]
fn e2e_amend_value_type() {
    let mut expected = TestStruct::default();
    let mut r = Resettable::new(expected.clone());

    r.at(inner_value()).set(1);
    r.at(boolean()).set(true);
    r.at(inner_value()).set(2);
    r.at(int()).set(10);
    r.undo_n(3);
    expected.inner.value = 1;
    assert_eq!(r.value(), &expected);

    r.at(inner_value())
        .with_behavior(OperationBehavior::Amend)
        .set(100);
    expected.inner.value = 100;
    assert_eq!(r.value(), &expected);

    r.redo();
    expected.boolean = true;
    assert_eq!(r.value(), &expected);

    r.redo();
    expected.inner.value = 2;
    assert_eq!(r.value(), &expected);

    r.redo();
    expected.int = 10;
    assert_eq!(r.value(), &expected);

    r.undo();
    expected.int = 0;
    assert_eq!(r.value(), &expected);

    r.reset();
    assert_eq!(r.value(), &TestStruct::default());
    r.redo();
    assert_eq!(r.value().inner.value, 100);
}

#[test]
fn e2e_amend_at_oldest_boundary() {
    let mut r = Resettable::new(TestStruct::default());
    r.at(int()).set(10);
    r.undo();
    assert_eq!(r.value(), &TestStruct::default());

    r.at(int())
        .with_behavior(OperationBehavior::Amend)
        .set(5);
    assert_eq!(r.value().int, 5);

    r.undo();
    assert_eq!(r.value(), &TestStruct::default());

    r.redo_n(5);
    assert_eq!(r.value().int, 5, "the int = 10 edit must be unreachable");
}

#[test]
fn e2e_inject_and_dump() {
    let mut expected = TestStruct::default();
    let mut r = Resettable::new(expected.clone());

    r.at(int()).update(|v| *v += 1);
    r.at(int()).update(|v| *v += 1);
    r.at(int()).update(|v| *v += 1);
    expected.int += 3;

    r.undo_n(2);
    expected.int -= 2;
    assert_eq!(r.value(), &expected);

    let position = r.position();
    r.at(int())
        .with_behavior(OperationBehavior::Inject)
        .update(|v| *v *= 3);
    expected.int *= 3;
    assert_eq!(r.value(), &expected);
    assert_eq!(r.position(), position);

    r.restore();
    expected.int += 2;
    assert_eq!(r.value(), &expected);

    let expected_dump = [
        "\"\"\"",
        "  TestStruct {",
        "      inner: Inner {",
        "          value: 0,",
        "      },",
        "      boolean: false,",
        "      int: 0,",
        "      optional: None,",
        "  }",
        "",
        "  TestStruct {",
        "      inner: Inner {",
        "          value: 0,",
        "      },",
        "      boolean: false,",
        "-     int: 0,",
        "+     int: 3,",
        "      optional: None,",
        "  }",
        "",
        "  TestStruct {",
        "      inner: Inner {",
        "          value: 0,",
        "      },",
        "      boolean: false,",
        "-     int: 3,",
        "+     int: 4,",
        "      optional: None,",
        "  }",
        "",
        ">>>   TestStruct {",
        "      inner: Inner {",
        "          value: 0,",
        "      },",
        "      boolean: false,",
        "-     int: 4,",
        "+     int: 5,",
        "      optional: None,",
        "  }",
        "\"\"\"",
    ]
    .join("\n");

    assert_eq!(r.dump(), expected_dump);
    assert_eq!(r.value(), &expected);
    assert!(!r.can_redo());
}

#[test]
fn e2e_dump_large_collection_shows_only_changed_lines() {
    const LEN: usize = 30_000;
    let mut r = Resettable::new(vec![0u32; LEN]);
    r.collection().index(LEN / 2).set(1);
    r.collection().append(7);

    let dump = r.dump();
    let changes: Vec<&str> = dump
        .lines()
        .filter(|line| line.starts_with("- ") || line.starts_with("+ "))
        .collect();
    assert_eq!(changes, vec!["-     0,", "+     1,", "+     7,"]);

    let marked: Vec<&str> = dump.lines().filter(|line| line.starts_with(">>> ")).collect();
    assert_eq!(marked, vec![">>>   ["]);

    // Fences, blank separators, the initial render and two full blocks.
    assert_eq!(dump.lines().count(), 2 + 2 + (LEN + 2) + (LEN + 3) + (LEN + 3));

    assert_eq!(r.value().len(), LEN + 1);
    assert_eq!(r.value()[LEN / 2], 1);
    assert!(!r.can_redo());
}

#[test]
fn e2e_values_dump_matches_walk() {
    let mut r = Resettable::new(TestStruct::default());
    r.at(int()).set(1).at(int()).set(2).at(boolean()).set(true);
    r.undo();

    let values = r.values_dump();
    assert_eq!(values.items.len(), 4);
    assert_eq!(values.current_index, 2);
    assert!(values.items[3].boolean);
    assert_eq!(values.current(), Some(r.value()));
}

#[test]
fn e2e_depth_limited_history() {
    let mut r = Resettable::with_config(TestStruct::default(), HistoryConfig::new(3));
    for i in 1..=10 {
        r.at(int()).set(i);
    }
    assert_eq!(r.len(), 3);
    r.reset();
    assert_eq!(r.value().int, 7);
    r.restore();
    assert_eq!(r.value().int, 10);
}

// ============================================================================
// 100 sequential edits with JSONL logging
// ============================================================================

#[derive(Debug, serde::Serialize)]
struct LogEntry {
    event: &'static str,
    operation: &'static str,
    step: u32,
    transitions: usize,
    state_hash: String,
    expected_hash: String,
    #[serde(rename = "match")]
    is_match: bool,
    op_time_ns: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Hash)]
struct EditorState {
    lines: Vec<String>,
    cursor: usize,
    metadata: BTreeMap<String, String>,
}

fn hash_state<T: Hash>(state: &T) -> String {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn apply_edit(r: &mut Resettable<EditorState>, step: u32) {
    let lines = key_path!(EditorState => lines);
    match step % 4 {
        0 => {
            let at = (step as usize).min(r.value().lines.len());
            r.collection_at(lines).insert(at, format!("Line {step}: content"));
        }
        1 => {
            let len = r.value().lines.len();
            if len > 0 {
                let at = (step as usize).min(len - 1);
                r.at(lines)
                    .index(at)
                    .update(move |line| line.push_str(&format!(" appended_{step}")));
            }
        }
        2 => {
            let key = format!("key_{step}");
            let value = format!("val_{step}");
            r.at(key_path!(EditorState => metadata))
                .update(move |map| {
                    map.insert(key.clone(), value.clone());
                })
                .at(key_path!(EditorState => cursor))
                .set(step as usize);
        }
        3 => {
            let len = r.value().lines.len();
            if len > 0 {
                r.collection_at(lines).remove(step as usize % len);
            }
        }
        _ => unreachable!(),
    }
}

#[test]
fn e2e_editor_100_edits_undo_redo() {
    let mut r = Resettable::new(EditorState::default());
    // (transitions recorded so far, state hash) after every edit.
    let mut checkpoints = vec![(0usize, hash_state(r.value()))];
    let mut log_entries = Vec::new();

    for i in 0..100u32 {
        let start = Instant::now();
        apply_edit(&mut r, i);
        let elapsed = start.elapsed().as_nanos() as u64;

        let state_hash = hash_state(r.value());
        checkpoints.push((r.undo_depth(), state_hash.clone()));

        log_entries.push(LogEntry {
            event: "resettable_undo_redo",
            operation: "edit",
            step: i,
            transitions: r.len(),
            state_hash: state_hash.clone(),
            expected_hash: state_hash,
            is_match: true,
            op_time_ns: elapsed,
        });
    }

    let expected_at = |depth: usize| {
        checkpoints
            .iter()
            .rev()
            .find(|(d, _)| *d == depth)
            .map(|(_, hash)| hash.clone())
    };

    // Undo everything, checking every depth an edit ended at.
    let total = r.len();
    for step in (0..total as u32).rev() {
        let start = Instant::now();
        r.undo();
        let elapsed = start.elapsed().as_nanos() as u64;

        let state_hash = hash_state(r.value());
        if let Some(expected) = expected_at(r.undo_depth()) {
            let is_match = state_hash == expected;
            log_entries.push(LogEntry {
                event: "resettable_undo_redo",
                operation: "undo",
                step,
                transitions: r.len(),
                state_hash,
                expected_hash: expected,
                is_match,
                op_time_ns: elapsed,
            });
            assert!(is_match, "undo step {step}: state hash mismatch");
        }
    }
    assert!(!r.can_undo());
    assert_eq!(hash_state(r.value()), checkpoints[0].1);

    // Redo everything.
    for step in 1..=total as u32 {
        let start = Instant::now();
        r.redo();
        let elapsed = start.elapsed().as_nanos() as u64;

        let state_hash = hash_state(r.value());
        if let Some(expected) = expected_at(r.undo_depth()) {
            let is_match = state_hash == expected;
            log_entries.push(LogEntry {
                event: "resettable_undo_redo",
                operation: "redo",
                step,
                transitions: r.len(),
                state_hash,
                expected_hash: expected,
                is_match,
                op_time_ns: elapsed,
            });
            assert!(is_match, "redo step {step}: state hash mismatch");
        }
    }
    assert!(!r.can_redo());

    for entry in &log_entries {
        let json = serde_json::to_string(entry).unwrap();
        let _parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    }
    assert!(
        log_entries.iter().all(|e| e.is_match),
        "all operations should match"
    );
}
