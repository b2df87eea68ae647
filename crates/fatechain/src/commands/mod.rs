mod catalog;
mod chains;
mod delete;

use clap::Subcommand;

use crate::error::Result;
use crate::session::Session;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create or delete namespaces
    Namespace {
        #[command(subcommand)]
        command: NamespaceCommand,
    },
    /// Create tables
    Table {
        #[command(subcommand)]
        command: TableCommand,
    },
    /// Grant a user access to a namespace
    Grant { namespace: String, user: String },
    /// List namespaces with their tables and grants
    List,
    /// Show reservations currently held
    Reservations,
    /// Show stored chains
    Chains {
        /// Remove finished chains after listing them
        #[arg(long)]
        prune: bool,
    },
    /// Drive every unfinished chain to a terminal state
    Resume,
}

#[derive(Subcommand)]
pub(crate) enum NamespaceCommand {
    /// Create an empty namespace
    Create { namespace: String },
    /// Delete namespaces with their tables and grants, one chain each
    Delete {
        #[arg(required = true)]
        namespaces: Vec<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum TableCommand {
    /// Create a table inside an existing namespace
    Create { namespace: String, table: String },
}

impl Commands {
    pub(crate) fn execute(self, session: &Session) -> Result<()> {
        match self {
            Self::Namespace {
                command: NamespaceCommand::Create { namespace },
            } => catalog::create_namespace(session, &namespace),
            Self::Namespace {
                command: NamespaceCommand::Delete { namespaces },
            } => delete::run(session, &namespaces),
            Self::Table {
                command: TableCommand::Create { namespace, table },
            } => catalog::create_table(session, &namespace, &table),
            Self::Grant { namespace, user } => catalog::grant(session, &namespace, &user),
            Self::List => catalog::list(session),
            Self::Reservations => catalog::reservations(session),
            Self::Chains { prune } => chains::list(session, prune),
            Self::Resume => chains::resume(session),
        }
    }
}
