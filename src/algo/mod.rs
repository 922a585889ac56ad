//! Mesh processing algorithms.
//!
//! - **Repair**: boundary loop extraction and hole filling ([`repair`])
//! - **Diagnostics**: message collectors the algorithms report into
//!   ([`diagnostics`])

pub mod diagnostics;
pub mod repair;

pub use diagnostics::{Diagnostics, FnDiagnostics, LogDiagnostics, NoDiagnostics};
