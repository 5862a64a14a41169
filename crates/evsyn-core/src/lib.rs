#![deny(missing_docs)]
#![doc = "Shared data model, errors and serialization helpers for evidence synthesis."]

pub mod errors;
/// Stable hashing helpers.
pub mod hash;
pub mod provenance;
pub mod record;
pub mod serde;

pub use errors::{ErrorInfo, EvsynError};
pub use hash::{hash_bytes, stable_hash_string};
pub use provenance::{RunProvenance, SchemaVersion};
pub use record::{
    records_from_papers, EffectSizeEntry, EffectSizeRecord, PaperEffectSizes, PaperId, StudySet,
    SUBGROUP_FIELD,
};
