use fatechain_ops::operations::{DeleteNamespaceReport, NamespaceStep};
use fatechain_ops::providers::ClusterState;
use fatechain_reserve::Reservation;
use fatechain_step::{ChainRecord, ChainRun};

pub(crate) trait OutputFormatter {
    fn format_delete(&self, report: &DeleteNamespaceReport) -> String;
    fn format_run(&self, run: &ChainRun) -> String;
    fn format_catalog(&self, state: &ClusterState) -> String;
    fn format_reservations(&self, reservations: &[Reservation]) -> String;
    fn format_chains(&self, records: &[ChainRecord<NamespaceStep>]) -> String;
}
