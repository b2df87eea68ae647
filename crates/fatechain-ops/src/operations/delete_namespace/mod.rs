//! Deleting a namespace as a two-step chain.
//!
//! [`DeleteNamespace`] takes an exclusive hold on the namespace and a shared
//! hold on the namespace registry, then hands over to [`NamespaceCleanUp`],
//! which removes the namespace's tables, grants and catalog entry and releases
//! both holds.

mod operation;
mod reservation;
mod steps;

pub use operation::{DeleteNamespaceOperation, DeleteNamespaceReport, PROTECTED_NAMESPACES};
pub use steps::{DeleteNamespace, NamespaceCleanUp, NamespaceStep};
