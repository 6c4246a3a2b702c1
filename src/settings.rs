//! The recognized TypeScript settings and the final merge step.
//!
//! Every setting is read from a `TypeScript<Name>` element in the project
//! file (e.g. `<TypeScriptTarget>`).  While resolving, values live in a
//! [`SettingsMap`] where an absent key means "unset"; [`merge`] then fills
//! every gap from a defaults record and produces the fully typed
//! [`CompilerSettings`].

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// How a setting's raw value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Text,
    Flag,
    /// Text whose `\` separators are rewritten to `/`.
    Path,
}

/// A raw value before final coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    Bool(bool),
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Interpret a raw value as a flag: strings compare case-insensitively
/// against `"true"`, booleans pass through.
pub fn coerce_bool(value: &SettingValue) -> bool {
    match value {
        SettingValue::Text(s) => s.eq_ignore_ascii_case("true"),
        SettingValue::Bool(b) => *b,
    }
}

fn coerce_text(value: &SettingValue) -> String {
    match value {
        SettingValue::Text(s) => s.clone(),
        SettingValue::Bool(b) => b.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Schema
// ═══════════════════════════════════════════════════════════════════════════════

macro_rules! field_type {
    (Text) => { String };
    (Flag) => { bool };
    (Path) => { String };
}

macro_rules! coerce {
    (Text, $value:expr) => { $value.map(coerce_text).unwrap_or_default() };
    (Flag, $value:expr) => { $value.map(coerce_bool).unwrap_or_default() };
    (Path, $value:expr) => { $value.map(coerce_text).unwrap_or_default().replace('\\', "/") };
}

/// Declare [`SettingKey`] and [`CompilerSettings`] from one table so the
/// two can never drift apart.
macro_rules! settings_schema {
    ($( $variant:ident => $field:ident : $kind:ident = $name:literal ),* $(,)?) => {
        /// A recognized TypeScript setting.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum SettingKey {
            $( $variant, )*
        }

        impl SettingKey {
            /// Every recognized setting, in schema order.
            pub const ALL: &'static [SettingKey] = &[ $( SettingKey::$variant, )* ];

            /// The setting name without the `TypeScript` prefix.
            pub fn name(self) -> &'static str {
                match self {
                    $( SettingKey::$variant => $name, )*
                }
            }

            pub fn kind(self) -> SettingKind {
                match self {
                    $( SettingKey::$variant => SettingKind::$kind, )*
                }
            }
        }

        /// Effective compiler settings: every key carries a concrete value.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
        pub struct CompilerSettings {
            $(
                #[serde(rename = $name)]
                pub $field: field_type!($kind),
            )*
        }

        impl CompilerSettings {
            fn from_values(values: &SettingsMap) -> Self {
                Self {
                    $( $field: coerce!($kind, values.get(SettingKey::$variant)), )*
                }
            }
        }
    };
}

settings_schema! {
    AdditionalFlags                  => additional_flags: Text = "AdditionalFlags",
    AllowSyntheticDefaultImports     => allow_synthetic_default_imports: Flag = "AllowSyntheticDefaultImports",
    AllowUnusedLabels                => allow_unused_labels: Flag = "AllowUnusedLabels",
    AllowUnreachableCode             => allow_unreachable_code: Flag = "AllowUnreachableCode",
    Charset                          => charset: Text = "Charset",
    CodePage                         => code_page: Text = "CodePage",
    CompileBlocked                   => compile_blocked: Flag = "CompileBlocked",
    CompileOnSaveEnabled             => compile_on_save_enabled: Flag = "CompileOnSaveEnabled",
    EmitBom                          => emit_bom: Flag = "EmitBOM",
    EmitDecoratorMetadata            => emit_decorator_metadata: Flag = "EmitDecoratorMetadata",
    ExperimentalAsyncFunctions       => experimental_async_functions: Flag = "ExperimentalAsyncFunctions",
    ExperimentalDecorators           => experimental_decorators: Flag = "ExperimentalDecorators",
    ForceConsistentCasingInFileNames => force_consistent_casing_in_file_names: Flag = "ForceConsistentCasingInFileNames",
    GeneratesDeclarations            => generates_declarations: Flag = "GeneratesDeclarations",
    InlineSourceMap                  => inline_source_map: Flag = "InlineSourceMap",
    InlineSources                    => inline_sources: Flag = "InlineSources",
    IsolatedModules                  => isolated_modules: Flag = "IsolatedModules",
    JsxEmit                          => jsx_emit: Text = "JSXEmit",
    MapRoot                          => map_root: Path = "MapRoot",
    ModuleKind                       => module_kind: Text = "ModuleKind",
    ModuleResolution                 => module_resolution: Text = "ModuleResolution",
    NewLine                          => new_line: Text = "NewLine",
    NoEmitOnError                    => no_emit_on_error: Flag = "NoEmitOnError",
    NoEmitHelpers                    => no_emit_helpers: Flag = "NoEmitHelpers",
    NoFallthroughCasesInSwitch       => no_fallthrough_cases_in_switch: Flag = "NoFallthroughCasesInSwitch",
    NoImplicitAny                    => no_implicit_any: Flag = "NoImplicitAny",
    NoImplicitReturns                => no_implicit_returns: Flag = "NoImplicitReturns",
    NoImplicitUseStrict              => no_implicit_use_strict: Flag = "NoImplicitUseStrict",
    NoLib                            => no_lib: Flag = "NoLib",
    NoResolve                        => no_resolve: Flag = "NoResolve",
    OutDir                           => out_dir: Path = "OutDir",
    OutFile                          => out_file: Path = "OutFile",
    PreferredUiLang                  => preferred_ui_lang: Text = "PreferredUILang",
    PreserveConstEnums               => preserve_const_enums: Flag = "PreserveConstEnums",
    ReactNamespace                   => react_namespace: Text = "ReactNamespace",
    RemoveComments                   => remove_comments: Flag = "RemoveComments",
    RootDir                          => root_dir: Path = "RootDir",
    SkipDefaultLibCheck              => skip_default_lib_check: Flag = "SkipDefaultLibCheck",
    SourceMap                        => source_map: Flag = "SourceMap",
    SourceRoot                       => source_root: Path = "SourceRoot",
    SuppressImplicitAnyIndexErrors   => suppress_implicit_any_index_errors: Flag = "SuppressImplicitAnyIndexErrors",
    SuppressExcessPropertyErrors     => suppress_excess_property_errors: Flag = "SuppressExcessPropertyErrors",
    Target                           => target: Text = "Target",
}

impl SettingKey {
    /// The element name used in project and defaults files.
    pub fn tag(self) -> String {
        format!("TypeScript{}", self.name())
    }
}

impl Serialize for SettingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  SettingsMap
// ═══════════════════════════════════════════════════════════════════════════════

/// Partially resolved settings; a missing key is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SettingsMap {
    values: BTreeMap<SettingKey, SettingValue>,
}

impl SettingsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SettingKey) -> Option<&SettingValue> {
        self.values.get(&key)
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<SettingValue>) {
        self.values.insert(key, value.into());
    }

    pub fn with(mut self, key: SettingKey, value: impl Into<SettingValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn is_set(&self, key: SettingKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingKey, &SettingValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Merge
// ═══════════════════════════════════════════════════════════════════════════════

/// Fill every unset key of `resolved` from `defaults`, then coerce.
///
/// Flag keys go through [`coerce_bool`], path keys get `/` separators, and
/// keys unset in both inputs become `""` or `false`.
pub fn merge(resolved: &SettingsMap, defaults: &SettingsMap) -> CompilerSettings {
    let mut filled = resolved.clone();
    for (key, value) in defaults.iter() {
        if !filled.is_set(key) {
            filled.set(key, value.clone());
        }
    }
    CompilerSettings::from_values(&filled)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn schema_has_unique_names() {
        let mut names: Vec<_> = SettingKey::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SettingKey::ALL.len());
        assert_eq!(SettingKey::ALL.len(), 43);
    }

    #[test]
    fn tags_carry_typescript_prefix() {
        assert_eq!(SettingKey::JsxEmit.tag(), "TypeScriptJSXEmit");
        assert_eq!(SettingKey::OutDir.tag(), "TypeScriptOutDir");
    }

    #[test]
    fn path_keys_are_the_output_locations() {
        let paths: Vec<_> = SettingKey::ALL
            .iter()
            .filter(|k| k.kind() == SettingKind::Path)
            .map(|k| k.name())
            .collect();
        assert_eq!(paths, ["MapRoot", "OutDir", "OutFile", "RootDir", "SourceRoot"]);
    }

    // ── Coercion ─────────────────────────────────────────────────────────

    #[test]
    fn bool_coercion_ignores_case() {
        for s in ["true", "True", "TRUE", "tRuE"] {
            assert!(coerce_bool(&s.into()), "{s}");
        }
        for s in ["false", "", "yes", "1", " true"] {
            assert!(!coerce_bool(&s.into()), "{s}");
        }
        assert!(coerce_bool(&true.into()));
        assert!(!coerce_bool(&false.into()));
    }

    // ── Merge ────────────────────────────────────────────────────────────

    #[test]
    fn merge_is_total_when_everything_is_unset() {
        let merged = merge(&SettingsMap::new(), &SettingsMap::new());
        assert_eq!(merged, CompilerSettings::default());
        assert_eq!(merged.target, "");
        assert!(!merged.source_map);
    }

    #[test]
    fn merge_prefers_resolved_values() {
        let resolved = SettingsMap::new()
            .with(SettingKey::Target, "ES6")
            .with(SettingKey::SourceMap, "True");
        let defaults = SettingsMap::new()
            .with(SettingKey::Target, "ES5")
            .with(SettingKey::SourceMap, false)
            .with(SettingKey::NoEmitOnError, true);

        let merged = merge(&resolved, &defaults);
        assert_eq!(merged.target, "ES6");
        assert!(merged.source_map);
        assert!(merged.no_emit_on_error);
        assert!(!merged.remove_comments);
    }

    #[test]
    fn merge_keeps_explicit_empty_values() {
        let resolved = SettingsMap::new().with(SettingKey::OutDir, "");
        let defaults = SettingsMap::new().with(SettingKey::OutDir, "bin");
        assert_eq!(merge(&resolved, &defaults).out_dir, "");
    }

    #[test]
    fn merge_normalizes_path_separators() {
        let resolved = SettingsMap::new()
            .with(SettingKey::OutDir, r"build\js\")
            .with(SettingKey::AdditionalFlags, r"--x a\b");
        let defaults = SettingsMap::new().with(SettingKey::SourceRoot, r"..\src");

        let merged = merge(&resolved, &defaults);
        assert_eq!(merged.out_dir, "build/js/");
        assert_eq!(merged.source_root, "../src");
        // Non-path text is untouched.
        assert_eq!(merged.additional_flags, r"--x a\b");
    }

    #[test]
    fn serializes_with_host_names() {
        let merged = merge(&SettingsMap::new().with(SettingKey::JsxEmit, "react"), &SettingsMap::new());
        let json = serde_json::to_value(&merged).unwrap();
        assert_eq!(json["JSXEmit"], "react");
        assert_eq!(json["EmitBOM"], false);
        assert_eq!(json.as_object().unwrap().len(), SettingKey::ALL.len());
    }

    // ── Properties ───────────────────────────────────────────────────────

    fn value_strategy() -> impl Strategy<Value = SettingValue> {
        prop_oneof![
            any::<bool>().prop_map(SettingValue::Bool),
            prop_oneof![Just("true"), Just("TRUE"), Just("False"), Just("")]
                .prop_map(|s: &str| SettingValue::from(s)),
            "[A-Za-z0-9 ./\\\\]{0,12}".prop_map(SettingValue::Text),
        ]
    }

    fn map_strategy() -> impl Strategy<Value = SettingsMap> {
        proptest::collection::btree_map(
            proptest::sample::select(SettingKey::ALL),
            value_strategy(),
            0..=SettingKey::ALL.len(),
        )
        .prop_map(|values| SettingsMap { values })
    }

    /// The value `merge` should produce for `key`, as JSON.
    fn expected(key: SettingKey, resolved: &SettingsMap, defaults: &SettingsMap) -> serde_json::Value {
        let value = resolved.get(key).or_else(|| defaults.get(key));
        match key.kind() {
            SettingKind::Flag => value.map(coerce_bool).unwrap_or_default().into(),
            SettingKind::Text => value.map(coerce_text).unwrap_or_default().into(),
            SettingKind::Path => value
                .map(coerce_text)
                .unwrap_or_default()
                .replace('\\', "/")
                .into(),
        }
    }

    proptest! {
        #[test]
        fn merge_gives_every_key_a_concrete_value(
            resolved in map_strategy(),
            defaults in map_strategy()
        ) {
            let merged = serde_json::to_value(merge(&resolved, &defaults)).unwrap();
            let object = merged.as_object().unwrap();
            prop_assert_eq!(object.len(), SettingKey::ALL.len());

            for &key in SettingKey::ALL {
                let actual = &object[key.name()];
                match key.kind() {
                    SettingKind::Flag => {
                        prop_assert!(actual.is_boolean(), "{}: {actual}", key.name());
                    }
                    SettingKind::Text | SettingKind::Path => {
                        prop_assert!(actual.is_string(), "{}: {actual}", key.name());
                    }
                }
                if key.kind() == SettingKind::Path {
                    prop_assert!(!actual.as_str().unwrap_or_default().contains('\\'));
                }
                prop_assert_eq!(actual, &expected(key, &resolved, &defaults), "{}", key.name());
            }
        }
    }
}
