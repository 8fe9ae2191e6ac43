//! Bundled JSON formats: form documents and id-keyed value snapshots.

pub mod form;
pub mod snapshot;

pub use form::*;
pub use snapshot::*;
