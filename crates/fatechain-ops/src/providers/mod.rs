mod catalog;
mod cluster_state;
mod event_sinks;

pub use catalog::InMemoryCatalog;
pub use cluster_state::{ClusterState, FileSystemClusterStateIO, PermissionEntry, TableEntry};
pub use event_sinks::{NoopEventSink, RecordingEventSink, TracingEventSink};
