use fatechain_core::ResourceId;
use fatechain_ops::traits::NamespaceCatalog;

use crate::error::Result;
use crate::output::{OutputFormatter, PlainTextFormatter};
use crate::session::Session;

pub(super) fn create_namespace(session: &Session, namespace: &str) -> Result<()> {
    session
        .catalog()
        .create_namespace(&ResourceId::new(namespace))?;
    session.save()?;
    println!("created namespace {namespace}");
    Ok(())
}

pub(super) fn create_table(session: &Session, namespace: &str, table: &str) -> Result<()> {
    session
        .catalog()
        .create_table(&ResourceId::new(namespace), table)?;
    session.save()?;
    println!("created table {namespace}.{table}");
    Ok(())
}

pub(super) fn grant(session: &Session, namespace: &str, user: &str) -> Result<()> {
    session.catalog().grant(&ResourceId::new(namespace), user)?;
    session.save()?;
    println!("granted {user} on {namespace}");
    Ok(())
}

pub(super) fn list(session: &Session) -> Result<()> {
    let state = session.catalog().to_state()?;
    print!("{}", PlainTextFormatter.format_catalog(&state));
    Ok(())
}

pub(super) fn reservations(session: &Session) -> Result<()> {
    let held = session.reservations().snapshot()?;
    print!("{}", PlainTextFormatter.format_reservations(&held));
    Ok(())
}
