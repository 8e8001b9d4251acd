#![forbid(unsafe_code)]

//! Structural edits of collections inside a [`Resettable`].
//!
//! Restoring a snapshot cannot express an inverse that changes a
//! collection's shape, so every edit here records its exact inverse:
//!
//! | edit              | forward              | inverse                  |
//! |-------------------|----------------------|--------------------------|
//! | `swap_at(i, j)`   | swap `i`, `j`        | swap `i`, `j`            |
//! | `remove(i)`       | remove at `i`        | insert removed at `i`    |
//! | `insert(i, e)`    | insert `e` at `i`    | remove at `i`            |
//! | `append(e)`       | push `e`             | pop                      |
//!
//! Positions are validated against the collection as it is when the edit is
//! recorded (after an amended edit has been reverted). The plain variants
//! panic on invalid positions, like slice indexing; the `try_*` variants
//! return [`ResettableError::PositionOutOfBounds`] and record nothing.

use std::fmt;

use resettable_keypath::KeyPath;

use crate::behavior::OperationBehavior;
use crate::error::{ResettableError, ResettableResult};
use crate::field::Field;
use crate::resettable::Resettable;

/// Handle to a `Vec<E>` inside a [`Resettable<T>`].
pub struct Collection<'a, T: 'static, E: 'static> {
    resettable: &'a mut Resettable<T>,
    path: KeyPath<T, Vec<E>>,
    behavior: OperationBehavior,
}

impl<T: 'static, E: 'static> fmt::Debug for Collection<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("path", &self.path)
            .field("behavior", &self.behavior)
            .finish()
    }
}

impl<'a, T: 'static, E: Clone + Send + Sync + 'static> Collection<'a, T, E> {
    pub(crate) fn new(resettable: &'a mut Resettable<T>, path: KeyPath<T, Vec<E>>) -> Self {
        Self {
            resettable,
            path,
            behavior: OperationBehavior::Default,
        }
    }

    /// Use `behavior` for the edit that ends this handle.
    #[must_use]
    pub fn with_behavior(mut self, behavior: OperationBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// The path from the container's root to the collection.
    #[must_use]
    pub fn path(&self) -> &KeyPath<T, Vec<E>> {
        &self.path
    }

    /// Read the collection.
    #[must_use]
    pub fn get(&self) -> Vec<E> {
        self.path.extract(self.resettable.value())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.inspect(self.resettable.value(), Vec::len)
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle to the element at `index`.
    ///
    /// # Panics
    ///
    /// Modifying or reading through the handle panics if `index` is out of
    /// bounds at that moment. Use [`safe_index`](Self::safe_index) otherwise.
    #[must_use]
    pub fn index(self, index: usize) -> Field<'a, T, E> {
        let path = self.path.appending(&KeyPath::<Vec<E>, E>::index(index));
        Field::new(self.resettable, path).with_behavior(self.behavior)
    }

    /// Handle to the element at `index`, absent when out of bounds.
    #[must_use]
    pub fn safe_index(self, index: usize) -> Field<'a, T, Option<E>> {
        let path = self
            .path
            .appending(&KeyPath::<Vec<E>, Option<E>>::safe_index(index));
        Field::new(self.resettable, path).with_behavior(self.behavior)
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Swap the elements at `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either position is out of bounds.
    pub fn swap_at(self, a: usize, b: usize) -> &'a mut Resettable<T> {
        expect_in_bounds("swap_at", self.try_swap_at(a, b))
    }

    /// Remove the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(self, index: usize) -> &'a mut Resettable<T> {
        expect_in_bounds("remove", self.try_remove(index))
    }

    /// Insert `element` at `index`, shifting later elements.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(self, index: usize, element: E) -> &'a mut Resettable<T> {
        expect_in_bounds("insert", self.try_insert(index, element))
    }

    /// Append `element`.
    pub fn append(self, element: E) -> &'a mut Resettable<T> {
        let Self {
            resettable,
            path,
            behavior,
        } = self;
        let pending = resettable.begin(behavior);
        resettable.commit_at(
            &path,
            pending,
            move |items: &mut Vec<E>| items.push(element.clone()),
            |items: &mut Vec<E>| {
                items.pop();
            },
        )
    }

    /// Checked [`swap_at`](Self::swap_at).
    pub fn try_swap_at(self, a: usize, b: usize) -> ResettableResult<&'a mut Resettable<T>> {
        self.edit(
            |length| {
                check_position(a, length)?;
                check_position(b, length)
            },
            |_| {
                (
                    move |items: &mut Vec<E>| items.swap(a, b),
                    move |items: &mut Vec<E>| items.swap(a, b),
                )
            },
        )
    }

    /// Checked [`remove`](Self::remove).
    pub fn try_remove(self, index: usize) -> ResettableResult<&'a mut Resettable<T>> {
        self.edit(
            |length| check_position(index, length),
            |items| {
                let removed = items[index].clone();
                (
                    move |items: &mut Vec<E>| {
                        items.remove(index);
                    },
                    move |items: &mut Vec<E>| items.insert(index, removed.clone()),
                )
            },
        )
    }

    /// Checked [`insert`](Self::insert).
    pub fn try_insert(self, index: usize, element: E) -> ResettableResult<&'a mut Resettable<T>> {
        self.edit(
            |length| check_position(index, length + 1),
            |_| {
                (
                    move |items: &mut Vec<E>| items.insert(index, element.clone()),
                    move |items: &mut Vec<E>| {
                        items.remove(index);
                    },
                )
            },
        )
    }

    /// Validate against the collection, then record the edit `build` returns.
    fn edit<C, B, F, U>(self, check: C, build: B) -> ResettableResult<&'a mut Resettable<T>>
    where
        C: FnOnce(usize) -> ResettableResult<()>,
        B: FnOnce(&[E]) -> (F, U),
        F: Fn(&mut Vec<E>) + Send + Sync + 'static,
        U: Fn(&mut Vec<E>) + Send + Sync + 'static,
    {
        let Self {
            resettable,
            path,
            behavior,
        } = self;
        let pending = resettable.begin(behavior);
        let built = path.inspect(resettable.value(), |items| {
            check(items.len()).map(|()| build(items))
        });

        match built {
            Ok((action, undo)) => Ok(resettable.commit_at(&path, pending, action, undo)),
            Err(err) => {
                resettable.abort(pending);
                tracing::debug!(
                    target: "resettable.history",
                    behavior = %behavior,
                    error = %err,
                    "collection edit rejected"
                );
                Err(err)
            }
        }
    }
}

fn check_position(position: usize, length: usize) -> ResettableResult<()> {
    if position < length {
        Ok(())
    } else {
        Err(ResettableError::PositionOutOfBounds { position, length })
    }
}

fn expect_in_bounds<R>(operation: &str, result: ResettableResult<R>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{operation}: {err}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
