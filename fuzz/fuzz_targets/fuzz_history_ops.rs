#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resettable::{KeyPath, OperationBehavior, Resettable};

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Behavior {
    Default,
    Amend,
    Insert,
    Inject,
}

impl From<Behavior> for OperationBehavior {
    fn from(behavior: Behavior) -> Self {
        match behavior {
            Behavior::Default => Self::Default,
            Behavior::Amend => Self::Amend,
            Behavior::Insert => Self::Insert,
            Behavior::Inject => Self::Inject,
        }
    }
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Edit {
    Add(i64),
    Xor(i64),
}

impl Edit {
    fn apply(self, value: &mut i64) {
        match self {
            Self::Add(n) => *value = value.wrapping_add(n),
            Self::Xor(n) => *value ^= n,
        }
    }

    fn revert(self, value: &mut i64) {
        match self {
            Self::Add(n) => *value = value.wrapping_sub(n),
            Self::Xor(n) => *value ^= n,
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Modify(Behavior, Edit),
    Undo(u8),
    Redo(u8),
    Reset,
    Restore,
    Clear,
}

/// Transitions as edit lists plus a cursor.
struct Model {
    pristine: i64,
    transitions: Vec<Vec<Edit>>,
    cursor: usize,
}

impl Model {
    fn value_at(&self, depth: usize) -> i64 {
        let mut value = self.pristine;
        for edit in self.transitions[..depth].iter().flatten() {
            edit.apply(&mut value);
        }
        value
    }

    fn modify(&mut self, behavior: Behavior, edit: Edit) {
        match behavior {
            Behavior::Amend if self.cursor > 0 => self.transitions[self.cursor - 1] = vec![edit],
            Behavior::Default | Behavior::Amend => {
                self.transitions.truncate(self.cursor);
                self.transitions.push(vec![edit]);
                self.cursor += 1;
            }
            Behavior::Insert => {
                self.transitions.insert(self.cursor, vec![edit]);
                self.cursor += 1;
            }
            Behavior::Inject if self.cursor > 0 => self.transitions[self.cursor - 1].push(edit),
            Behavior::Inject => edit.apply(&mut self.pristine),
        }
    }
}

fuzz_target!(|input: (i64, Vec<Op>)| {
    let (start, ops) = input;
    let path = KeyPath::<i64, i64>::identity();
    let mut r = Resettable::new(start);
    let mut model = Model {
        pristine: start,
        transitions: Vec::new(),
        cursor: 0,
    };

    for op in ops.iter().take(256) {
        match *op {
            Op::Modify(behavior, edit) => {
                r.modify_at_with_undo(
                    &path,
                    behavior.into(),
                    move |v| edit.apply(v),
                    move |v| edit.revert(v),
                );
                model.modify(behavior, edit);
            }
            Op::Undo(n) => {
                r.undo_n(n as usize);
                model.cursor = model.cursor.saturating_sub(n as usize);
            }
            Op::Redo(n) => {
                r.redo_n(n as usize);
                model.cursor = (model.cursor + n as usize).min(model.transitions.len());
            }
            Op::Reset => {
                r.reset();
                model.cursor = 0;
            }
            Op::Restore => {
                r.restore();
                model.cursor = model.transitions.len();
            }
            Op::Clear => {
                r.clear_history();
                model.pristine = model.value_at(model.cursor);
                model.transitions.clear();
                model.cursor = 0;
            }
        }

        assert_eq!(*r.value(), model.value_at(model.cursor), "value diverged after {op:?}");
        assert_eq!(r.len(), model.transitions.len(), "length diverged after {op:?}");
        assert_eq!(r.undo_depth(), model.cursor);
    }

    let position = r.position();
    let dumped = r.values_dump();
    let expected: Vec<i64> = (0..=model.transitions.len()).map(|d| model.value_at(d)).collect();
    assert_eq!(dumped.items, expected);
    assert_eq!(dumped.current_index, model.cursor);
    assert_eq!(r.position(), position);
    assert_eq!(*r.value(), model.value_at(model.cursor));
});
