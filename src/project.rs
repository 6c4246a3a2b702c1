//! End-to-end resolution: project file in, [`ProjectSettings`] out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::Serialize;

use crate::condition::Selection;
use crate::defaults;
use crate::env;
use crate::error::{Error, Result};
use crate::locate::{self, DiskProbe, FileProbe, PathTemplate, SearchOptions, TemplateVars};
use crate::resolve::{self, DeclaredTargets, Import};
use crate::settings::{self, CompilerSettings, SettingsMap};
use crate::tree::{RoxmlReader, XmlReader};
use crate::version;

/// Property holding the project's TypeScript tools version.
const TOOLS_VERSION: &str = "TypeScriptToolsVersion";

// ═══════════════════════════════════════════════════════════════════════════════
//  ProjectIdentity – what the caller asks for
// ═══════════════════════════════════════════════════════════════════════════════

/// The project to resolve and the caller's explicit choices.  Anything left
/// `None` (or empty) is taken from the project file's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub project_file: PathBuf,
    pub configuration: Option<String>,
    pub platform: Option<String>,
    pub typescript_version: Option<String>,
    pub visual_studio_version: Option<String>,
    /// Overrides `$(MSBuildExtensionsPath32)`.
    pub extensions_path: Option<String>,
}

impl ProjectIdentity {
    pub fn new(project_file: impl Into<PathBuf>) -> Self {
        Self {
            project_file: project_file.into(),
            ..Default::default()
        }
    }

    pub fn configuration(mut self, value: impl Into<String>) -> Self {
        self.configuration = Some(value.into());
        self
    }

    pub fn platform(mut self, value: impl Into<String>) -> Self {
        self.platform = Some(value.into());
        self
    }

    pub fn typescript_version(mut self, value: impl Into<String>) -> Self {
        self.typescript_version = Some(value.into());
        self
    }

    pub fn visual_studio_version(mut self, value: impl Into<String>) -> Self {
        self.visual_studio_version = Some(value.into());
        self
    }

    pub fn extensions_path(mut self, value: impl Into<String>) -> Self {
        self.extensions_path = Some(value.into());
        self
    }
}

/// Empty strings count as "not supplied".
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Output
// ═══════════════════════════════════════════════════════════════════════════════

/// Metadata about the project and about how its settings were resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    #[serde(rename = "DefaultProjectConfiguration")]
    pub default_configuration: String,
    #[serde(rename = "DefaultProjectPlatform")]
    pub default_platform: String,
    #[serde(rename = "DefaultVisualStudioVersion")]
    pub default_visual_studio_version: String,
    /// Raw `<Import>` path of the TypeScript defaults file.
    #[serde(rename = "TypeScriptDefaultPropsFilePath")]
    pub default_props_file_path: String,
    /// The defaults file actually read, if any.
    #[serde(rename = "NormalizedTypeScriptDefaultPropsFilePath")]
    pub normalized_props_file_path: Option<String>,
    #[serde(rename = "ActiveConfiguration")]
    pub active_configuration: Option<String>,
    #[serde(rename = "ActivePlatform")]
    pub active_platform: Option<String>,
    #[serde(rename = "MSBuildExtensionsPath32")]
    pub extensions_path: String,
    #[serde(rename = "ProjectFileName")]
    pub project_file_name: String,
    #[serde(rename = "VisualStudioVersion")]
    pub visual_studio_version: Option<String>,
    #[serde(rename = "TypeScriptVersion")]
    pub typescript_version: String,
    #[serde(rename = "imports")]
    pub imports: Vec<Import>,
    #[serde(flatten)]
    pub declared: DeclaredTargets,
    /// The defaults record used to fill unset settings.
    #[serde(rename = "TypeScriptDefaultConfiguration")]
    pub typescript_defaults: SettingsMap,
}

/// Fully resolved TypeScript settings for one configuration/platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectSettings {
    #[serde(rename = "VSProjectDetails")]
    pub details: ProjectDetails,
    /// `TypeScriptCompile` includes, `/`-separated.
    pub files: Vec<String>,
    #[serde(flatten)]
    pub compiler: CompilerSettings,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  SettingsResolver
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolves [`ProjectSettings`] from project files.
///
/// The resolver holds no per-project state; the same instance may resolve
/// any number of projects, and equal inputs give equal results.
///
/// # Example
/// ```no_run
/// use csproj_ts::{ProjectIdentity, SettingsResolver};
///
/// let settings = SettingsResolver::new()
///     .system_env()
///     .resolve(&ProjectIdentity::new("Site.csproj").configuration("Release"))
///     .unwrap();
/// println!("{} -> {}", settings.compiler.target, settings.compiler.out_dir);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettingsResolver<R = RoxmlReader, P = DiskProbe> {
    reader: R,
    probe: P,
    env: HashMap<String, String>,
    search: SearchOptions,
}

impl SettingsResolver {
    /// A resolver reading from disk, with an empty environment.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R, P> SettingsResolver<R, P> {
    /// Replace the XML reader used for project and defaults files.
    pub fn with_reader<R2: XmlReader>(self, reader: R2) -> SettingsResolver<R2, P> {
        SettingsResolver {
            reader,
            probe: self.probe,
            env: self.env,
            search: self.search,
        }
    }

    /// Replace the file-existence probe used while locating defaults files.
    pub fn with_probe<P2: FileProbe>(self, probe: P2) -> SettingsResolver<R, P2> {
        SettingsResolver {
            reader: self.reader,
            probe,
            env: self.env,
            search: self.search,
        }
    }

    /// Merge a variable map into the environment.  Later values win.
    pub fn env(mut self, vars: HashMap<String, String>) -> Self {
        self.env.extend(vars);
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Pull all current process environment variables into the map.
    pub fn system_env(mut self) -> Self {
        self.env.extend(std::env::vars());
        self
    }

    pub fn search_options(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    /// Pin the year that bounds the version probe.
    pub fn current_year(mut self, year: i32) -> Self {
        self.search.current_year = Some(year);
        self
    }
}

impl<R: XmlReader, P: FileProbe> SettingsResolver<R, P> {
    /// Resolve the effective settings of `identity`.
    ///
    /// Fails only when the project file cannot be read or has no
    /// `<Project>` root.  A missing or unusable defaults file falls back to
    /// the built-in table for the TypeScript version.
    pub fn resolve(&self, identity: &ProjectIdentity) -> Result<ProjectSettings> {
        let path = identity.project_file.as_path();
        let tree = self.reader.read(path).map_err(|err| match err {
            Error::Io { path, source } => Error::ProjectNotFound { path, source },
            other => other,
        })?;
        let project = tree.element("Project").ok_or_else(|| Error::ProjectMalformed {
            path: path.to_path_buf(),
            reason: "missing <Project> root".to_string(),
        })?;

        let default_configuration = resolve::default_configuration(project);
        let default_platform = resolve::default_platform(project);
        let default_visual_studio_version = resolve::default_visual_studio_version(project);

        let selection = Selection::new(
            supplied(&identity.configuration).unwrap_or(&default_configuration),
            supplied(&identity.platform).unwrap_or(&default_platform),
        );
        tracing::debug!(
            "resolving {} for {}|{}",
            path.display(),
            selection.configuration,
            selection.platform
        );

        let declared_version = match supplied(&identity.typescript_version) {
            Some(v) => Some(v.to_string()),
            None => resolve::resolve_property(project, TOOLS_VERSION, &selection, None),
        };
        let typescript_version = version::normalize(declared_version.as_deref());

        let extensions_path = match supplied(&identity.extensions_path) {
            Some(p) => p.to_string(),
            None => env::default_extensions_path(&self.env),
        };
        let template = PathTemplate::parse(resolve::default_props_path(project));
        let vars = TemplateVars {
            visual_studio_version: supplied(&identity.visual_studio_version)
                .unwrap_or(&default_visual_studio_version)
                .to_string(),
            extensions_path: extensions_path.clone(),
        };
        let (typescript_defaults, props_path) = self.tool_defaults(&template, &vars, &typescript_version);

        let resolved = resolve::resolve_settings(project, &selection);
        let compiler = settings::merge(&resolved, &typescript_defaults);

        Ok(ProjectSettings {
            details: ProjectDetails {
                default_configuration,
                default_platform,
                default_visual_studio_version,
                default_props_file_path: template.as_str().to_string(),
                normalized_props_file_path: props_path.map(|p| p.to_string_lossy().into_owned()),
                active_configuration: identity.configuration.clone(),
                active_platform: identity.platform.clone(),
                extensions_path,
                project_file_name: path.to_string_lossy().into_owned(),
                visual_studio_version: identity.visual_studio_version.clone(),
                typescript_version: typescript_version.to_string(),
                imports: resolve::imports(project),
                declared: resolve::declared_targets(project),
                typescript_defaults,
            },
            files: resolve::compile_files(project),
            compiler,
        })
    }

    /// Defaults from the located props file, or the baseline table.
    fn tool_defaults(
        &self,
        template: &PathTemplate,
        vars: &TemplateVars,
        version: &Version,
    ) -> (SettingsMap, Option<PathBuf>) {
        let from_file = locate::locate(template, vars, &self.search, &self.probe)
            .and_then(|path| self.read_defaults(&path, version).map(|d| (d, path)));

        match from_file {
            Ok((defaults, path)) => {
                tracing::debug!("using TypeScript defaults from {}", path.display());
                (defaults, Some(path))
            }
            Err(err) => {
                tracing::debug!("{err}; using built-in defaults for TypeScript {version}");
                (defaults::baseline(version), None)
            }
        }
    }

    fn read_defaults(&self, path: &Path, version: &Version) -> Result<SettingsMap> {
        let tree = self.reader.read(path)?;
        defaults::from_props(&tree, path, version)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
