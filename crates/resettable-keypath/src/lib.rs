#![forbid(unsafe_code)]

//! Functional key paths.
//!
//! A [`KeyPath<Root, Value>`] is a pair of closures that read a `Value` out of
//! a `Root` ([`extract`](KeyPath::extract)) and write a new `Value` back into
//! it ([`embed`](KeyPath::embed)). Key paths compose with
//! [`appending`](KeyPath::appending), so a path to a deeply nested field is
//! built from one path per level:
//!
//! ```text
//! Form ──settings──► Settings ──theme──► Theme ──accent──► u32
//!
//! extract:  form ─► settings ─► theme ─► accent
//! embed:    accent ─► theme' ─► settings' ─► form'
//! ```
//!
//! Specializations cover the non-field steps:
//!
//! - [`optional`](KeyPath::optional) lifts a path to operate on `Option<Root>`
//! - [`KeyPath::index`] addresses a `Vec` element (panics when out of bounds)
//! - [`KeyPath::safe_index`] addresses a `Vec` element as `Option`, treating
//!   out-of-range positions as absent
//!
//! # Example
//!
//! ```
//! use resettable_keypath::{KeyPath, key_path};
//!
//! #[derive(Clone, Default)]
//! struct Theme { accent: u32 }
//! #[derive(Clone, Default)]
//! struct Settings { theme: Theme }
//!
//! let accent = key_path!(Settings => theme).appending(&key_path!(Theme => accent));
//!
//! let mut settings = Settings::default();
//! accent.embed(7, &mut settings);
//! assert_eq!(accent.extract(&settings), 7);
//! ```
//!
//! # Ownership model
//!
//! Extraction returns an owned value (usually a clone). This keeps the
//! composition rules simple and lets `optional` and `safe_index` synthesize
//! values that do not exist in the root. Paths whose value lives in the root
//! (fields, `index`, `identity` and compositions of those) also carry
//! borrowing accessors, so [`inspect`](KeyPath::inspect) reads and
//! [`modify`](KeyPath::modify) writes them in place without a clone. Closures are stored behind [`Arc`], so cloning a key path is cheap
//! and the clone can be captured by other closures.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

type ExtractFn<Root, Value> = Arc<dyn Fn(&Root) -> Value + Send + Sync>;
type EmbedFn<Root, Value> = Arc<dyn Fn(&mut Root, Value) + Send + Sync>;
type ViewFn<Root, Value> = Arc<dyn for<'r> Fn(&'r Root) -> &'r Value + Send + Sync>;
type ViewMutFn<Root, Value> = Arc<dyn for<'r> Fn(&'r mut Root) -> &'r mut Value + Send + Sync>;

/// Borrowing accessors of a path whose value is stored in the root.
struct Place<Root, Value> {
    view: ViewFn<Root, Value>,
    view_mut: ViewMutFn<Root, Value>,
}

impl<Root, Value> Clone for Place<Root, Value> {
    fn clone(&self) -> Self {
        Self {
            view: Arc::clone(&self.view),
            view_mut: Arc::clone(&self.view_mut),
        }
    }
}

// Pin closures to the higher-ranked borrowing signatures.
fn view_fn<Root, Value, F>(f: F) -> F
where
    F: for<'r> Fn(&'r Root) -> &'r Value,
{
    f
}

fn view_mut_fn<Root, Value, F>(f: F) -> F
where
    F: for<'r> Fn(&'r mut Root) -> &'r mut Value,
{
    f
}

/// Bidirectional accessor between a `Root` and a nested `Value`.
pub struct KeyPath<Root, Value> {
    extract: ExtractFn<Root, Value>,
    embed: EmbedFn<Root, Value>,
    place: Option<Place<Root, Value>>,
}

impl<Root, Value> Clone for KeyPath<Root, Value> {
    fn clone(&self) -> Self {
        Self {
            extract: Arc::clone(&self.extract),
            embed: Arc::clone(&self.embed),
            place: self.place.clone(),
        }
    }
}

impl<Root, Value> fmt::Debug for KeyPath<Root, Value> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPath")
            .field("root", &type_name::<Root>())
            .field("value", &type_name::<Value>())
            .finish()
    }
}

impl<Root: 'static, Value: 'static> KeyPath<Root, Value> {
    /// Create a key path from an extract and an embed closure.
    ///
    /// The pair must be lawful: embedding a value and extracting it again
    /// yields that value, and embedding what was just extracted leaves the
    /// root unchanged.
    #[must_use]
    pub fn new<E, M>(extract: E, embed: M) -> Self
    where
        E: Fn(&Root) -> Value + Send + Sync + 'static,
        M: Fn(&mut Root, Value) + Send + Sync + 'static,
    {
        Self {
            extract: Arc::new(extract),
            embed: Arc::new(embed),
            place: None,
        }
    }

    /// Read the value this path points at.
    #[must_use]
    pub fn extract(&self, root: &Root) -> Value {
        (self.extract)(root)
    }

    /// Borrow the value this path points at, if it lives in `root`.
    ///
    /// `None` for paths that synthesize their value, such as
    /// [`optional`](Self::optional) and [`safe_index`](KeyPath::safe_index).
    #[must_use]
    pub fn view<'r>(&self, root: &'r Root) -> Option<&'r Value> {
        self.place.as_ref().map(|place| (place.view)(root))
    }

    /// Run `f` on the value this path points at.
    ///
    /// Borrows when the path allows it and extracts otherwise.
    pub fn inspect<R, F>(&self, root: &Root, f: F) -> R
    where
        F: FnOnce(&Value) -> R,
    {
        match &self.place {
            Some(place) => f((place.view)(root)),
            None => f(&self.extract(root)),
        }
    }

    /// Write `value` into `root` at this path.
    pub fn embed(&self, value: Value, root: &mut Root) {
        (self.embed)(root, value);
    }

    /// Mutate the value this path points at.
    ///
    /// Stored values are mutated in place; synthesized ones are extracted,
    /// mutated and embedded back.
    pub fn modify<F>(&self, root: &mut Root, f: F)
    where
        F: FnOnce(&mut Value),
    {
        match &self.place {
            Some(place) => f((place.view_mut)(root)),
            None => {
                let mut value = self.extract(root);
                f(&mut value);
                self.embed(value, root);
            }
        }
    }

    /// Compose with a path that starts where this one ends.
    #[must_use]
    pub fn appending<Local: 'static>(&self, other: &KeyPath<Value, Local>) -> KeyPath<Root, Local> {
        if let (Some(outer), Some(inner)) = (&self.place, &other.place) {
            let (read_outer, read_inner) = (outer.clone(), other.clone());
            let (write_outer, write_inner) = (outer.clone(), other.clone());
            let (view_outer, view_inner) = (outer.clone(), inner.clone());
            let (mut_outer, mut_inner) = (outer.clone(), inner.clone());
            return KeyPath {
                extract: Arc::new(move |root: &Root| read_inner.extract((read_outer.view)(root))),
                embed: Arc::new(move |root: &mut Root, local: Local| {
                    write_inner.embed(local, (write_outer.view_mut)(root));
                }),
                place: Some(Place {
                    view: Arc::new(view_fn(move |root: &Root| {
                        (view_inner.view)((view_outer.view)(root))
                    })),
                    view_mut: Arc::new(view_mut_fn(move |root: &mut Root| {
                        (mut_inner.view_mut)((mut_outer.view_mut)(root))
                    })),
                }),
            };
        }

        let outer = self.clone();
        let inner = other.clone();
        let outer_embed = self.clone();
        let inner_embed = other.clone();
        KeyPath::new(
            move |root: &Root| inner.extract(&outer.extract(root)),
            move |root: &mut Root, local: Local| {
                let mut value = outer_embed.extract(root);
                inner_embed.embed(local, &mut value);
                outer_embed.embed(value, root);
            },
        )
    }

    /// Lift this path to optional roots.
    ///
    /// Extraction yields `None` for an absent root. Embedding is a no-op when
    /// either the root or the incoming value is absent.
    #[must_use]
    pub fn optional(&self) -> KeyPath<Option<Root>, Option<Value>> {
        let extract = self.clone();
        let embed = self.clone();
        KeyPath::new(
            move |root: &Option<Root>| root.as_ref().map(|root| extract.extract(root)),
            move |root: &mut Option<Root>, value: Option<Value>| {
                if let (Some(root), Some(value)) = (root.as_mut(), value) {
                    embed.embed(value, root);
                }
            },
        )
    }
}

impl<Root: 'static, Value: Clone + 'static> KeyPath<Root, Value> {
    /// Create a key path to a value stored in the root.
    ///
    /// Extraction clones what `view` borrows and embedding assigns through
    /// `view_mut`. [`key_path!`] expands to this.
    #[must_use]
    pub fn field<V, M>(view: V, view_mut: M) -> Self
    where
        V: for<'r> Fn(&'r Root) -> &'r Value + Send + Sync + 'static,
        M: for<'r> Fn(&'r mut Root) -> &'r mut Value + Send + Sync + 'static,
    {
        let place = Place {
            view: Arc::new(view) as ViewFn<Root, Value>,
            view_mut: Arc::new(view_mut) as ViewMutFn<Root, Value>,
        };
        let (read, write) = (place.clone(), place.clone());
        Self {
            extract: Arc::new(move |root: &Root| (read.view)(root).clone()),
            embed: Arc::new(move |root: &mut Root, value: Value| *(write.view_mut)(root) = value),
            place: Some(place),
        }
    }
}

impl<Root: Clone + 'static> KeyPath<Root, Root> {
    /// The path from a root to itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::field(|root: &Root| root, |root: &mut Root| root)
    }
}

impl<Element: Clone + 'static> KeyPath<Vec<Element>, Element> {
    /// Path to the element at `index`.
    ///
    /// # Panics
    ///
    /// Extracting or embedding panics when `index` is out of bounds for the
    /// root it is applied to, exactly like slice indexing. Use
    /// [`KeyPath::safe_index`] when the position is not known to be valid.
    #[must_use]
    pub fn index(index: usize) -> Self {
        Self::field(
            move |root: &Vec<Element>| &root[index],
            move |root: &mut Vec<Element>| &mut root[index],
        )
    }
}

impl<Element: Clone + 'static> KeyPath<Vec<Element>, Option<Element>> {
    /// Path to the element at `index`, absent when out of bounds.
    ///
    /// Embedding `None`, or embedding at an out-of-range position, leaves the
    /// collection untouched. The path never changes the collection's length.
    #[must_use]
    pub fn safe_index(index: usize) -> Self {
        Self::new(
            move |root: &Vec<Element>| root.get(index).cloned(),
            move |root: &mut Vec<Element>, value: Option<Element>| {
                if let (Some(slot), Some(value)) = (root.get_mut(index), value) {
                    *slot = value;
                }
            },
        )
    }
}

/// Build a [`KeyPath`] to a (possibly nested) field.
///
/// `key_path!(Root => a.b.c)` borrows `root.a.b.c`, extracts a clone of it,
/// embeds by assignment to it and modifies it in place.
///
/// ```
/// use resettable_keypath::key_path;
///
/// #[derive(Clone, Default)]
/// struct Inner { value: i32 }
/// #[derive(Clone, Default)]
/// struct Outer { inner: Inner }
///
/// let path = key_path!(Outer => inner.value);
/// let mut outer = Outer::default();
/// path.embed(3, &mut outer);
/// assert_eq!(outer.inner.value, 3);
/// ```
#[macro_export]
macro_rules! key_path {
    ($root:ty => $($field:tt).+) => {
        $crate::KeyPath::<$root, _>::field(
            |root: &$root| &root.$($field).+,
            |root: &mut $root| &mut root.$($field).+,
        )
    };
}

// ============================================================================
// Tests
// ============================================================================
