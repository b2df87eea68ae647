mod events;
mod formatter;
mod plain;

pub(crate) use events::ConsoleEventSink;
pub(crate) use formatter::OutputFormatter;
pub(crate) use plain::PlainTextFormatter;
