//! Valuation aggregation service and its supporting operations.
//!
//! Every function takes the workspace connection plus the caller's tenant
//! (institution id) and returns a `ServiceResult`. Input is assumed to be
//! well-formed (ids parsed, enums constrained); existence and tenant checks
//! happen here.

pub mod directory;
pub mod initializer;
pub mod learnings;
pub mod populate;
pub mod session;
pub mod template;
pub mod updater;
pub mod valuations;
