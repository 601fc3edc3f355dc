//! # API Route Modules
//!
//! - `intent` — human-intent capture (customer).
//! - `govern` — governed execution (admin).
//! - `trust` — ledger health (admin).
//! - `packs` — manifest and artefact inspection (admin).
//! - `impact` — policy impact assessment (admin).

pub mod govern;
pub mod impact;
pub mod intent;
pub mod packs;
pub mod trust;
