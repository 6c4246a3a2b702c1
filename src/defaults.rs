//! Tool defaults: read from `Microsoft.TypeScript.Default.props`, or derived
//! from the TypeScript version when no such file can be used.

use std::path::Path;

use semver::Version;

use crate::error::{Error, Result};
use crate::settings::{SettingKey, SettingKind, SettingValue, SettingsMap, coerce_bool};
use crate::tree::ParsedTree;

/// The settings a defaults file (or the baseline table) provides.
pub const DEFAULTED_KEYS: &[SettingKey] = &[
    SettingKey::Target,
    SettingKey::CompileOnSaveEnabled,
    SettingKey::NoImplicitAny,
    SettingKey::ModuleKind,
    SettingKey::RemoveComments,
    SettingKey::OutFile,
    SettingKey::OutDir,
    SettingKey::GeneratesDeclarations,
    SettingKey::SourceMap,
    SettingKey::MapRoot,
    SettingKey::SourceRoot,
    SettingKey::NoEmitOnError,
];

/// Version-derived defaults used when no defaults file is available.
///
/// `Target` is `ES3` before 1.5.0 and `ES5` from then on; `NoEmitOnError`
/// is on from 1.4.0.  Everything else is empty or `false`.
pub fn baseline(version: &Version) -> SettingsMap {
    let target = if *version < Version::new(1, 5, 0) { "ES3" } else { "ES5" };
    let no_emit_on_error = *version >= Version::new(1, 4, 0);

    let mut defaults = SettingsMap::new();
    for &key in DEFAULTED_KEYS {
        let value = match key {
            SettingKey::Target => SettingValue::from(target),
            SettingKey::NoEmitOnError => SettingValue::from(no_emit_on_error),
            k if k.kind() == SettingKind::Flag => SettingValue::from(false),
            _ => SettingValue::from(""),
        };
        defaults.set(key, value);
    }
    defaults
}

/// Read defaults from a parsed props file.
///
/// Only the first `<PropertyGroup>` is consulted.  Keys it does not carry
/// come from [`baseline`]; flag values are coerced to booleans.
pub fn from_props(tree: &ParsedTree, path: &Path, version: &Version) -> Result<SettingsMap> {
    let malformed = |reason: &str| Error::DefaultsMalformed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let project = tree
        .element("Project")
        .ok_or_else(|| malformed("missing <Project> root"))?;
    let group = project
        .child("PropertyGroup")
        .ok_or_else(|| malformed("no <PropertyGroup>"))?;

    let fallback = baseline(version);
    let mut defaults = SettingsMap::new();
    for &key in DEFAULTED_KEYS {
        let value = match group.child_text(&key.tag()) {
            Some(text) if key.kind() == SettingKind::Flag => {
                SettingValue::Bool(coerce_bool(&SettingValue::from(text)))
            }
            Some(text) => SettingValue::from(text),
            None => match fallback.get(key) {
                Some(v) => v.clone(),
                None => continue,
            },
        };
        defaults.set(key, value);
    }
    Ok(defaults)
}
