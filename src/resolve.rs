//! Reading settings and project metadata out of a `<Project>` element.

use serde::Serialize;

use crate::condition::{self, Selection};
use crate::settings::{SettingKey, SettingsMap};
use crate::tree::XmlNode;

const PROPERTY_GROUP: &str = "PropertyGroup";
const DEFAULT_PROPS_FILE: &str = "Microsoft.TypeScript.Default.props";

// ═══════════════════════════════════════════════════════════════════════════════
//  Conditional properties
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve the value of property `tag` for `selection`.
///
/// Property groups are folded in document order.  A group applies when it
/// has no `Condition` or when its condition selects `selection`; an
/// applying group that sets `tag` replaces the running value.  The last
/// match therefore wins, whether conditional or not.  `default` is returned
/// untouched when no applying group sets `tag`.
pub fn resolve_property(
    project: &XmlNode,
    tag: &str,
    selection: &Selection,
    default: Option<String>,
) -> Option<String> {
    project
        .children(PROPERTY_GROUP)
        .iter()
        .fold(default, |current, group| {
            let applies = match group.attribute("Condition") {
                Some(cond) => selection.matches(cond),
                None => true,
            };
            match group.child_text(tag) {
                Some(value) if applies => Some(value.to_string()),
                _ => current,
            }
        })
}

/// Resolve every recognized TypeScript setting for `selection`.
///
/// Settings no group provides stay unset.
pub fn resolve_settings(project: &XmlNode, selection: &Selection) -> SettingsMap {
    let mut settings = SettingsMap::new();
    for &key in SettingKey::ALL {
        if let Some(value) = resolve_property(project, &key.tag(), selection, None) {
            settings.set(key, value);
        }
    }
    settings
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Project defaults
// ═══════════════════════════════════════════════════════════════════════════════

/// Find the project's own default for `property`.
///
/// Defaults are written as a property element guarded by its own
/// "unset" check, e.g.
/// `<Configuration Condition=" '$(Configuration)' == '' ">Debug</Configuration>`.
/// The first such element in document order wins; an element without that
/// guard is an ordinary setting and is ignored here.
pub fn project_default(project: &XmlNode, property: &str) -> Option<String> {
    project
        .children(PROPERTY_GROUP)
        .iter()
        .filter_map(|group| group.child(property))
        .find(|element| {
            element
                .attribute("Condition")
                .and_then(|cond| condition::parse_comparison(cond).ok())
                .is_some_and(|cmp| cmp.is_unset_check(property))
        })
        .map(|element| element.text().to_string())
}

/// `Configuration` default (e.g. `Debug`), or `""`.
pub fn default_configuration(project: &XmlNode) -> String {
    project_default(project, "Configuration").unwrap_or_default()
}

/// `Platform` default (e.g. `AnyCPU`), or `""`.
pub fn default_platform(project: &XmlNode) -> String {
    project_default(project, "Platform").unwrap_or_default()
}

/// `VisualStudioVersion` default (e.g. `12.0`), or `""`.
pub fn default_visual_studio_version(project: &XmlNode) -> String {
    project_default(project, "VisualStudioVersion").unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Items and imports
// ═══════════════════════════════════════════════════════════════════════════════

/// An `<Import>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Import {
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

pub fn imports(project: &XmlNode) -> Vec<Import> {
    project
        .children("Import")
        .iter()
        .filter(|node| !node.attributes.is_empty())
        .map(|node| Import {
            project: node.attribute("Project").unwrap_or("").to_string(),
            condition: node.attribute("Condition").map(String::from),
        })
        .collect()
}

/// The raw path of the imported TypeScript defaults file, or `""`.
///
/// When several imports reference it, the last one wins.
pub fn default_props_path(project: &XmlNode) -> String {
    imports(project)
        .into_iter()
        .rev()
        .find(|import| import.project.contains(DEFAULT_PROPS_FILE))
        .map(|import| import.project)
        .unwrap_or_default()
}

/// `Include` paths of every `<TypeScriptCompile>` item, with `/` separators.
pub fn compile_files(project: &XmlNode) -> Vec<String> {
    project
        .children("ItemGroup")
        .iter()
        .flat_map(|group| group.children("TypeScriptCompile"))
        .filter_map(|item| item.attribute("Include"))
        .map(|include| include.replace('\\', "/"))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Listing helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Configurations and platforms named by conditional property groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclaredTargets {
    #[serde(rename = "Configurations")]
    pub configurations: Vec<String>,
    #[serde(rename = "Platforms")]
    pub platforms: Vec<String>,
}

/// Return the configurations and platforms the project's property groups
/// are conditioned on, in document order, without duplicates.
pub fn declared_targets(project: &XmlNode) -> DeclaredTargets {
    let mut targets = DeclaredTargets::default();

    let conditions = project
        .children(PROPERTY_GROUP)
        .iter()
        .filter_map(|group| group.attribute("Condition"))
        .filter_map(|cond| condition::parse_comparison(cond).ok())
        .filter_map(|cmp| cmp.bindings());

    for bindings in conditions {
        for (name, value) in bindings {
            let list = match name.as_str() {
                "Configuration" => &mut targets.configurations,
                "Platform" => &mut targets.platforms,
                _ => continue,
            };
            if !value.is_empty() && !list.contains(&value) {
                list.push(value);
            }
        }
    }

    targets
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
