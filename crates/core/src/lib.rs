#![forbid(unsafe_code)]

pub mod equivalence;
pub mod ids;
pub mod merge;
pub mod owner;
pub mod schema;

pub use equivalence::{Equivalence, Reference, Secondary, classify, collapse, merge_lists};
pub use ids::{Handle, HandleError, RecordKind, UnknownRecordKind};
pub use merge::{FieldPicks, MergeError, MergeField, merge_records};
pub use owner::ReferenceOwner;
pub use schema::*;
