//! # Facade Module
//!
//! This module implements the **Facade** pattern, serving as the single
//! logic layer between callers and the underlying document store.
//!
//! The facade centralizes the operations that carry actual rules —
//! the conditional-ownership guard on update/delete, the id-injection
//! protocol on insert and the document normalization on reads — while
//! abstracting the store behind the injected [`DocumentClient`].
//!
//! * **Store Abstraction:** callers never see whether the backing
//!   provider is Postgres or an in-memory fake.
//! * **Typed Mutation Results:** guarded mutations report
//!   [`MutationOutcome`] instead of a flattened boolean, so callers can
//!   branch on applied / guard-failed / not-found precisely.
//! * **Encapsulation:** the rest of the system exchanges plain field
//!   mappings with [`DocStore`], never raw store rows.
//!
//! [`DocumentClient`]: crate::client::DocumentClient

mod store;
pub use store::*;

mod error;
pub use error::*;

mod outcome;
pub use outcome::*;
