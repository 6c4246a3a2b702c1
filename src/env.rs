//! Environment-derived search roots.
//!
//! MSBuild extensions live under the 32-bit program files directory.  The
//! variables come from an explicit map, see
//! [`SettingsResolver::system_env`](crate::SettingsResolver::system_env).

use std::collections::HashMap;
use std::path::{MAIN_SEPARATOR_STR, PathBuf};

pub const PROGRAM_FILES_VARS: &[&str] = &["ProgramFiles(x86)", "ProgramFiles"];

/// The program files root, or `""` when none of [`PROGRAM_FILES_VARS`] is
/// set to a non-empty value.
pub fn program_files(vars: &HashMap<String, String>) -> String {
    PROGRAM_FILES_VARS
        .iter()
        .filter_map(|name| vars.get(*name))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Default `$(MSBuildExtensionsPath32)`: `<program files>/MSBuild/` with a
/// trailing separator.
pub fn default_extensions_path(vars: &HashMap<String, String>) -> String {
    // An unset root still yields an absolute `/MSBuild/`.
    let root = program_files(vars);
    let mut path = if root.is_empty() {
        PathBuf::from(MAIN_SEPARATOR_STR)
    } else {
        PathBuf::from(root)
    };
    path.push("MSBuild");
    path.push("");
    path.to_string_lossy().into_owned()
}
