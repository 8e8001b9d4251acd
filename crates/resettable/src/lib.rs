#![forbid(unsafe_code)]

//! Resettable
//!
//! In-memory structural undo/redo for a single value. A [`Resettable<T>`]
//! owns a value and a strictly linear history of the modifications applied
//! to it; each modification is recorded as a forward action and its inverse,
//! so any prior or later state can be reconstructed by replaying them.
//!
//! # Key Components
//!
//! - [`Resettable`] - The container: modify, undo/redo, reset/restore, dump
//! - [`KeyPath`] - Composable accessor scoping a modification to a sub-value
//! - [`Field`] - Handle to the sub-value at a key path
//! - [`Collection`] - Handle to a `Vec` with exact structural inverses
//! - [`OperationBehavior`] - How a modification is threaded into history
//! - [`HistoryConfig`] - Optional depth limit
//!
//! # Operation behaviors
//!
//! | Behavior  | New node | Future            | Position      |
//! |-----------|----------|-------------------|---------------|
//! | `Default` | yes      | discarded         | new node      |
//! | `Amend`   | no       | kept              | unchanged     |
//! | `Insert`  | yes      | kept after insert | new node      |
//! | `Inject`  | no       | kept              | unchanged     |
//!
//! # Example
//!
//! ```
//! use resettable::{OperationBehavior, Resettable, key_path};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Form { name: String, age: u32 }
//!
//! let mut form = Resettable::new(Form::default());
//! form.at(key_path!(Form => name)).set("Ada".to_owned())
//!     .at(key_path!(Form => age)).set(36);
//!
//! // Correct the last edit in place instead of adding a step.
//! form.at(key_path!(Form => age))
//!     .with_behavior(OperationBehavior::Amend)
//!     .set(37);
//!
//! form.undo();
//! assert_eq!(form.value(), &Form { name: "Ada".into(), age: 0 });
//! form.restore();
//! assert_eq!(form.value().age, 37);
//! ```
//!
//! # Value semantics
//!
//! [`Field::set`], [`Field::update`] and [`Resettable::modify_at`] undo by
//! restoring a clone of the sub-value taken before the change. That is only
//! correct when cloning produces an independent copy, which is what the
//! [`ValueSemantic`] marker asserts. Shared or interior-mutable sub-values
//! (`Rc<RefCell<_>>`, `Arc<Mutex<_>>`) must use the explicit-inverse forms
//! ([`Field::update_with_undo`], [`Resettable::modify_at_with_undo`],
//! [`Resettable::modify`]).
//!
//! # Logging
//!
//! History changes emit `tracing` events under the `resettable.history`
//! target; dumps run inside a `resettable.dump` span. The crate never
//! installs a subscriber.

pub mod behavior;
pub mod collection;
pub mod config;
pub mod diff;
pub mod dump;
pub mod error;
pub mod field;
mod history;
mod resettable;
pub mod value;

pub use behavior::OperationBehavior;
pub use collection::Collection;
pub use config::HistoryConfig;
pub use diff::DiffLine;
pub use dump::ValuesDump;
pub use error::{ResettableError, ResettableResult};
pub use field::Field;
pub use history::{Action, NodeId};
pub use resettable::Resettable;
pub use value::ValueSemantic;

pub use resettable_keypath::{KeyPath, key_path};
