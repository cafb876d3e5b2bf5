//! Source file splitter – tree-sitter AST, one sub-unit per function.
//!
//! Primary entry points: [`extract_sub_units`] and [`extract_file`]
//!
//! An empty result means "treat this file as a whole": the source did not
//! parse, could not be decoded, or simply has no functions.

mod ast_parser;

use std::path::Path;
use trickle_core::SubUnit;

pub use ast_parser::extract_functions;

/// Extracts the ordered sub-units of Python source `content`.
///
/// `path` is only used for log messages.
pub fn extract_sub_units(path: &str, content: &str) -> Vec<SubUnit> {
    let units = extract_functions(path, content);
    log::debug!("[AST] {} → {} sub-unit(s)", path, units.len());
    units
}

/// Reads `path` and extracts its sub-units.
///
/// I/O and UTF-8 decode errors are logged and yield an empty list.
pub fn extract_file(path: &Path) -> Vec<SubUnit> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to read {:?}: {}", path, e);
            return vec![];
        }
    };

    match String::from_utf8(bytes) {
        Ok(content) => extract_sub_units(&path.to_string_lossy(), &content),
        Err(e) => {
            log::warn!("{:?} is not valid UTF-8 ({}), handling it as a whole file", path, e);
            vec![]
        }
    }
}
