#![forbid(unsafe_code)]

//! Marker for sub-values that can be restored from a snapshot.
//!
//! The snapshot-default inverse used by [`Resettable::modify_at`] clones the
//! sub-value before the edit and writes that clone back on undo. This is only
//! an inverse when the clone is independent of the original. A `Clone` that
//! shares state (`Rc<RefCell<_>>`, `Arc<Mutex<_>>`, handles into external
//! storage) would "restore" the very object the edit mutated, and undo would
//! silently do nothing.
//!
//! [`ValueSemantic`] is implemented here for standard types whose clones are
//! deep copies, and deliberately not for shared or interior-mutable wrappers.
//! Implement it for your own plain-data types:
//!
//! ```
//! use resettable::ValueSemantic;
//!
//! #[derive(Clone)]
//! struct Point { x: i32, y: i32 }
//!
//! impl ValueSemantic for Point {}
//! ```
//!
//! Types that do not qualify can still be edited through
//! [`Resettable::modify_at_with_undo`] with an explicit inverse.
//!
//! [`Resettable::modify_at`]: crate::Resettable::modify_at
//! [`Resettable::modify_at_with_undo`]: crate::Resettable::modify_at_with_undo

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;

/// A `Clone` whose clones share no mutable state with the original.
///
/// Implementing this trait is a promise: mutating a value after cloning it
/// never changes the clone.
pub trait ValueSemantic: Clone + Send + Sync + 'static {}

macro_rules! value_semantic {
    ($($ty:ty),* $(,)?) => {
        $(impl ValueSemantic for $ty {})*
    };
}

value_semantic!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
    std::time::Duration,
);

impl<T: ValueSemantic> ValueSemantic for Option<T> {}
impl<T: ValueSemantic> ValueSemantic for Vec<T> {}
impl<T: ValueSemantic> ValueSemantic for VecDeque<T> {}
impl<T: ValueSemantic> ValueSemantic for Box<T> {}
impl<T: ValueSemantic, const N: usize> ValueSemantic for [T; N] {}
impl<T: ValueSemantic + Ord> ValueSemantic for BTreeSet<T> {}
impl<K: ValueSemantic + Ord, V: ValueSemantic> ValueSemantic for BTreeMap<K, V> {}
impl<T, S> ValueSemantic for HashSet<T, S>
where
    T: ValueSemantic + Eq + std::hash::Hash,
    S: BuildHasher + Clone + Send + Sync + 'static,
{
}
impl<K, V, S> ValueSemantic for HashMap<K, V, S>
where
    K: ValueSemantic + Eq + std::hash::Hash,
    V: ValueSemantic,
    S: BuildHasher + Clone + Send + Sync + 'static,
{
}
impl<T: ValueSemantic, E: ValueSemantic> ValueSemantic for Result<T, E> {}
impl<B> ValueSemantic for Cow<'static, B>
where
    B: ToOwned + ?Sized + Send + Sync + 'static,
    B::Owned: Send + Sync,
{
}

macro_rules! value_semantic_tuple {
    ($($name:ident),+) => {
        impl<$($name: ValueSemantic),+> ValueSemantic for ($($name,)+) {}
    };
}

value_semantic_tuple!(A);
value_semantic_tuple!(A, B);
value_semantic_tuple!(A, B, C);
value_semantic_tuple!(A, B, C, D);
value_semantic_tuple!(A, B, C, D, E);
value_semantic_tuple!(A, B, C, D, E, F);
