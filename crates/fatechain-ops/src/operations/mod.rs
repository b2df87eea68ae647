pub mod delete_namespace;

pub use delete_namespace::{
    DeleteNamespace, DeleteNamespaceOperation, DeleteNamespaceReport, NamespaceCleanUp,
    NamespaceStep,
};
