//! Serialization of statement trees back to netlist text.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Result, ScsError};

use super::script::Script;
use super::statement::Item;

/// Header comment prepended to generated netlist files.
pub const GENERATED_HEADER: &str = "// Generated by scscript";

impl fmt::Display for Script {
    /// Render the whole document. Brace containers serialize as
    /// `header {` … `}`; keyword blocks are set off with blank lines, their
    /// open and close statements being ordinary members of the sequence.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_items(f, &self.items)
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Item]) -> fmt::Result {
    for item in items {
        match item {
            Item::Block(sub) => {
                writeln!(f)?;
                write_items(f, sub)?;
                writeln!(f)?;
            }
            Item::Statement(ns) if ns.is_container() => {
                writeln!(f, "{} {{", ns)?;
                write_items(f, &ns.children)?;
                writeln!(f, "}}")?;
            }
            Item::Statement(ns) => writeln!(f, "{}", ns)?,
        }
    }
    Ok(())
}

impl Script {
    /// Write the serialized netlist to `path` under a generated-file header,
    /// creating missing parent directories.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ScsError::file_write(path, e))?;
            }
        }
        tracing::debug!(path = %path.display(), "writing netlist");
        let text = format!("{}\n{}", GENERATED_HEADER, self);
        fs::write(path, text).map_err(|e| ScsError::file_write(path, e))
    }
}
