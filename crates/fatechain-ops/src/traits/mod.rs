mod catalog;
mod cluster_state_io;
mod event_sink;

pub use catalog::{CatalogError, NamespaceCatalog};
pub use cluster_state_io::ClusterStateIO;
pub use event_sink::{EventError, EventSink};
