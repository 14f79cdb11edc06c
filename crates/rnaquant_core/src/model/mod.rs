//! Domain entities hydrated from store rows.
//!
//! # Responsibility
//! - Convert typed row records into immutable entities.
//! - Expose entities as transfer objects.
//!
//! # Invariants
//! - Every entity's id decodes to its ancestry chain, root first.
//! - Entity equality is id equality.
//! - Entities keep a non-owning copy of their parent's compound id, never
//!   a reference to the parent object.

pub mod expression_level;
pub mod quantification;
