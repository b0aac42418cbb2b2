//! Domain models for the intake wizard.
//!
//! # Core Concepts
//!
//! - [`RequirementsSnapshot`]: the durable requirements state of one session —
//!   project-core fields, audience strings, and checkable feature items.
//! - [`ParsedFragment`]: structured data extracted from a single model reply,
//!   not yet merged into a snapshot.
//! - [`Message`]: one chat turn. The engine only ever reads `content`; ids
//!   belong to the caller layer.
//!
//! Snapshots are owned by their session. The engine transforms copies and
//! returns new values; it never mutates a caller's snapshot in place.

mod analysis;
mod fragment;
mod message;
mod snapshot;

pub use analysis::*;
pub use fragment::*;
pub use message::*;
pub use snapshot::*;
