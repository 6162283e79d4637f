//! YAML export for human-readable snapshots

use std::io::Write;

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};

fn export_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

/// YAML document preceded by a short comment header
pub fn export_yaml<W: Write, T: Serialize>(value: &T, writer: &mut W) -> LedgerResult<()> {
    writeln!(writer, "# ledgerdash snapshot export").map_err(export_error)?;
    writeln!(writer, "# Amounts are in cents").map_err(export_error)?;
    serde_yaml::to_writer(writer, value).map_err(export_error)?;
    Ok(())
}
