#![forbid(unsafe_code)]

//! Path-scoped modification handles.
//!
//! A [`Field`] pairs a mutable borrow of a [`Resettable`] with a [`KeyPath`]
//! from its root to some sub-value. Handles compose further down the value
//! (`at`, `optional_at`, `index`, `safe_index`) and end in a modification
//! that returns the container, so edits chain:
//!
//! ```
//! use resettable::{Resettable, key_path};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Inner { value: i32 }
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct State { inner: Inner, flag: bool }
//!
//! let mut state = Resettable::new(State::default());
//! state
//!     .at(key_path!(State => inner))
//!     .at(key_path!(Inner => value))
//!     .set(1)
//!     .at(key_path!(State => flag))
//!     .set(true);
//!
//! assert_eq!(state.value(), &State { inner: Inner { value: 1 }, flag: true });
//! state.undo();
//! assert!(!state.value().flag);
//! ```

use std::fmt;

use resettable_keypath::KeyPath;

use crate::behavior::OperationBehavior;
use crate::collection::Collection;
use crate::resettable::Resettable;
use crate::value::ValueSemantic;

/// Handle to the sub-value of a [`Resettable`] at a key path.
pub struct Field<'a, T: 'static, V: 'static> {
    resettable: &'a mut Resettable<T>,
    path: KeyPath<T, V>,
    behavior: OperationBehavior,
}

impl<T: 'static, V: 'static> fmt::Debug for Field<'_, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("path", &self.path)
            .field("behavior", &self.behavior)
            .finish()
    }
}

impl<'a, T: 'static, V: 'static> Field<'a, T, V> {
    pub(crate) fn new(resettable: &'a mut Resettable<T>, path: KeyPath<T, V>) -> Self {
        Self {
            resettable,
            path,
            behavior: OperationBehavior::Default,
        }
    }

    /// Use `behavior` for the modification that ends this handle.
    #[must_use]
    pub fn with_behavior(mut self, behavior: OperationBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// The composed path from the container's root.
    #[must_use]
    pub fn path(&self) -> &KeyPath<T, V> {
        &self.path
    }

    /// Read the sub-value.
    #[must_use]
    pub fn get(&self) -> V {
        self.path.extract(self.resettable.value())
    }

    /// Descend further along `path`.
    #[must_use]
    pub fn at<W: 'static>(self, path: KeyPath<V, W>) -> Field<'a, T, W> {
        Field {
            resettable: self.resettable,
            path: self.path.appending(&path),
            behavior: self.behavior,
        }
    }

    /// Modify the sub-value with an explicit inverse.
    pub fn update_with_undo<F, U>(self, action: F, undo: U) -> &'a mut Resettable<T>
    where
        F: Fn(&mut V) + Send + Sync + 'static,
        U: Fn(&mut V) + Send + Sync + 'static,
    {
        self.resettable
            .modify_at_with_undo(&self.path, self.behavior, action, undo)
    }
}

impl<'a, T: 'static, V: ValueSemantic> Field<'a, T, V> {
    /// Modify the sub-value; undo restores a snapshot.
    pub fn update<F>(self, action: F) -> &'a mut Resettable<T>
    where
        F: Fn(&mut V) + Send + Sync + 'static,
    {
        self.resettable.modify_at(&self.path, self.behavior, action)
    }

    /// Replace the sub-value; undo restores a snapshot.
    pub fn set(self, value: V) -> &'a mut Resettable<T> {
        self.update(move |slot: &mut V| *slot = value.clone())
    }
}

impl<'a, T: 'static, V: 'static> Field<'a, T, Option<V>> {
    /// Descend into the wrapped value along `path`.
    ///
    /// The resulting sub-value is absent while this one is; setting it then
    /// changes nothing.
    #[must_use]
    pub fn optional_at<W: 'static>(self, path: KeyPath<V, W>) -> Field<'a, T, Option<W>> {
        self.at(path.optional())
    }
}

impl<'a, T: 'static, E: Clone + Send + Sync + 'static> Field<'a, T, Vec<E>> {
    /// Treat the sub-value as a collection.
    #[must_use]
    pub fn collection(self) -> Collection<'a, T, E> {
        Collection::new(self.resettable, self.path).with_behavior(self.behavior)
    }

    /// Descend to the element at `index`.
    ///
    /// # Panics
    ///
    /// Modifying or reading through the handle panics if `index` is out of
    /// bounds at that moment.
    #[must_use]
    pub fn index(self, index: usize) -> Field<'a, T, E> {
        self.at(KeyPath::<Vec<E>, E>::index(index))
    }

    /// Descend to the element at `index`, absent when out of bounds.
    #[must_use]
    pub fn safe_index(self, index: usize) -> Field<'a, T, Option<E>> {
        self.at(KeyPath::<Vec<E>, Option<E>>::safe_index(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resettable_keypath::key_path;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Inner {
        value: i32,
    }

    impl ValueSemantic for Inner {}

    #[derive(Debug, Clone, Default, PartialEq)]
    struct State {
        inner: Inner,
        optional: Option<Inner>,
        items: Vec<Inner>,
    }

    #[test]
    fn set_and_chain() {
        let mut r = Resettable::new(State::default());
        r.at(key_path!(State => inner.value))
            .set(1)
            .at(key_path!(State => inner.value))
            .update(|v| *v += 1);
        assert_eq!(r.value().inner.value, 2);
        r.undo();
        assert_eq!(r.value().inner.value, 1);
    }

    #[test]
    fn get_reads_through_path() {
        let mut r = Resettable::new(State {
            inner: Inner { value: 4 },
            ..State::default()
        });
        let field = r.at(key_path!(State => inner)).at(key_path!(Inner => value));
        assert_eq!(field.get(), 4);
    }

    #[test]
    fn optional_at_is_inert_while_absent() {
        let mut r = Resettable::new(State::default());
        r.at(key_path!(State => optional))
            .optional_at(key_path!(Inner => value))
            .set(Some(1));
        assert_eq!(r.value().optional, None);

        r.at(key_path!(State => optional)).set(Some(Inner::default()));
        r.at(key_path!(State => optional))
            .optional_at(key_path!(Inner => value))
            .set(Some(1));
        assert_eq!(r.value().optional, Some(Inner { value: 1 }));

        r.at(key_path!(State => optional)).set(None);
        assert_eq!(r.value().optional, None);
        r.undo().undo();
        assert_eq!(r.value().optional, Some(Inner { value: 0 }));
    }

    #[test]
    fn element_field_through_index() {
        let mut r = Resettable::new(State {
            items: vec![Inner { value: 1 }, Inner { value: 2 }],
            ..State::default()
        });
        r.at(key_path!(State => items))
            .index(1)
            .at(key_path!(Inner => value))
            .set(20);
        assert_eq!(r.value().items[1].value, 20);
        r.undo();
        assert_eq!(r.value().items[1].value, 2);
    }

    #[test]
    fn safe_index_out_of_range_records_a_no_op() {
        let mut r = Resettable::new(State::default());
        r.at(key_path!(State => items))
            .safe_index(3)
            .set(Some(Inner { value: 9 }));
        assert!(r.value().items.is_empty());
        assert_eq!(r.len(), 1);
        r.undo();
        assert!(r.value().items.is_empty());
    }

    #[test]
    fn with_behavior_is_forwarded() {
        let mut r = Resettable::new(State::default());
        r.at(key_path!(State => inner.value)).set(1);
        r.at(key_path!(State => inner.value))
            .with_behavior(OperationBehavior::Amend)
            .set(5);
        assert_eq!(r.len(), 1);
        r.undo();
        assert_eq!(r.value().inner.value, 0);
    }
}
