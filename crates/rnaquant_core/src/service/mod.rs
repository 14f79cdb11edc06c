//! Container-tree use cases.
//!
//! # Responsibility
//! - Resolve compound ids through the dataset → set → quantification →
//!   expression level hierarchy.
//! - Keep callers decoupled from store handles and SQL.
//!
//! # See also
//! - [`crate::compound_id`] for the identifier wire format.

pub mod dataset;
pub mod errors;
pub mod quantification_set;
pub mod search;
