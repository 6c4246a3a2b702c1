//! Locating `Microsoft.TypeScript.Default.props` on disk.
//!
//! The project imports the defaults file through a path template such as
//!
//! ```text
//! $(MSBuildExtensionsPath32)\Microsoft\VisualStudio\v$(VisualStudioVersion)\TypeScript\Microsoft.TypeScript.Default.props
//! ```
//!
//! The caller rarely knows the exact Visual Studio version, so after the
//! declared one fails the locator probes a bounded, descending range of
//! versions derived from the calendar year.

use std::path::{Path, PathBuf};

use chrono::Datelike;

use crate::condition::{ExprValue, parse_string_parts};
use crate::error::{Error, Result};

pub const VISUAL_STUDIO_VERSION: &str = "VisualStudioVersion";
pub const MSBUILD_EXTENSIONS_PATH32: &str = "MSBuildExtensionsPath32";

// ═══════════════════════════════════════════════════════════════════════════════
//  Path template
// ═══════════════════════════════════════════════════════════════════════════════

/// A path containing `$(Var)` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    parts: Vec<ExprValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    pub visual_studio_version: String,
    pub extensions_path: String,
}

impl PathTemplate {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parts = parse_string_parts(&raw);
        Self { raw, parts }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Substitute the Visual Studio version and extensions path.  Any other
    /// `$(Var)` is left as written.
    pub fn render(&self, vars: &TemplateVars) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for part in &self.parts {
            match part {
                ExprValue::Literal(s) => out.push_str(s),
                ExprValue::Variable(name) if name == VISUAL_STUDIO_VERSION => {
                    out.push_str(&vars.visual_studio_version)
                }
                ExprValue::Variable(name) if name == MSBUILD_EXTENSIONS_PATH32 => {
                    out.push_str(&vars.extensions_path)
                }
                ExprValue::Variable(name) => {
                    out.push_str("$(");
                    out.push_str(name);
                    out.push(')');
                }
            }
        }
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Search options
// ═══════════════════════════════════════════════════════════════════════════════

/// Bounds of the descending version probe.
///
/// The upper bound follows the convention that the Visual Studio major
/// version tracks `year - version_epoch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub version_epoch: i32,
    pub minimum_version: i32,
    /// Year used for the upper bound; `None` reads the system clock.
    pub current_year: Option<i32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            version_epoch: 1995,
            minimum_version: 10,
            current_year: None,
        }
    }
}

impl SearchOptions {
    pub fn highest_version(&self) -> i32 {
        let year = self
            .current_year
            .unwrap_or_else(|| chrono::Utc::now().year());
        year - self.version_epoch
    }

    /// Candidate versions from newest to oldest, e.g. `"31.0"` … `"10.0"`.
    pub fn candidates(&self) -> impl Iterator<Item = String> {
        (self.minimum_version..=self.highest_version())
            .rev()
            .map(|v| format!("{v}.0"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Existence probe
// ═══════════════════════════════════════════════════════════════════════════════

/// Answers whether a file exists.
pub trait FileProbe {
    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl FileProbe for DiskProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> FileProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Locate
// ═══════════════════════════════════════════════════════════════════════════════

/// Find the first existing rendering of `template`.
///
/// `vars` is tried as given first; then each version from
/// [`SearchOptions::candidates`] replaces `vars.visual_studio_version`, in
/// order.  Probing is sequential and stops at the first hit.
pub fn locate(
    template: &PathTemplate,
    vars: &TemplateVars,
    options: &SearchOptions,
    probe: &impl FileProbe,
) -> Result<PathBuf> {
    let not_found = || Error::DefaultsNotFound {
        template: template.as_str().to_string(),
    };

    if template.is_empty() {
        return Err(not_found());
    }

    let declared = template.render(vars);
    tracing::debug!("probing declared defaults path {declared}");
    if probe.exists(Path::new(&declared)) {
        return Ok(PathBuf::from(declared));
    }

    let mut alternate = vars.clone();
    for version in options.candidates() {
        alternate.visual_studio_version = version;
        let candidate = template.render(&alternate);
        tracing::debug!("probing defaults path {candidate}");
        if probe.exists(Path::new(&candidate)) {
            return Ok(PathBuf::from(candidate));
        }
    }

    Err(not_found())
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const PROPS: &str = r"$(MSBuildExtensionsPath32)\Microsoft\VisualStudio\v$(VisualStudioVersion)\TypeScript\Microsoft.TypeScript.Default.props";

    fn vars(version: &str) -> TemplateVars {
        TemplateVars {
            visual_studio_version: version.to_string(),
            extensions_path: r"C:\PF\MSBuild\".to_string(),
        }
    }

    fn options() -> SearchOptions {
        SearchOptions {
            current_year: Some(2015),
            ..Default::default()
        }
    }

    fn props_for(version: &str) -> String {
        PathTemplate::parse(PROPS).render(&vars(version))
    }

    // ── Template ─────────────────────────────────────────────────────────

    #[test]
    fn render_substitutes_known_variables() {
        assert_eq!(
            props_for("12.0"),
            r"C:\PF\MSBuild\\Microsoft\VisualStudio\v12.0\TypeScript\Microsoft.TypeScript.Default.props"
        );
    }

    #[test]
    fn render_keeps_unknown_variables() {
        let t = PathTemplate::parse(r"$(VSToolsPath)\TypeScript\v$(VisualStudioVersion)");
        assert_eq!(t.render(&vars("14.0")), r"$(VSToolsPath)\TypeScript\v14.0");
    }

    // ── Search options ───────────────────────────────────────────────────

    #[test]
    fn candidates_descend_to_the_floor() {
        let found: Vec<_> = options().candidates().collect();
        assert_eq!(found.first().map(String::as_str), Some("20.0"));
        assert_eq!(found.last().map(String::as_str), Some("10.0"));
        assert_eq!(found.len(), 11);
    }

    #[test]
    fn candidates_empty_when_range_inverted() {
        let opts = SearchOptions {
            current_year: Some(2000),
            ..Default::default()
        };
        assert_eq!(opts.candidates().count(), 0);
    }

    #[test]
    fn highest_version_uses_clock_by_default() {
        let year = chrono::Utc::now().year();
        assert_eq!(SearchOptions::default().highest_version(), year - 1995);
    }

    // ── Locate ───────────────────────────────────────────────────────────

    #[test]
    fn declared_version_wins_without_probing() {
        let probed = RefCell::new(Vec::new());
        let expected = props_for("12.0");
        let probe = |p: &Path| {
            probed.borrow_mut().push(p.to_path_buf());
            p == Path::new(&expected)
        };

        let found = locate(&PathTemplate::parse(PROPS), &vars("12.0"), &options(), &probe).unwrap();
        assert_eq!(found, PathBuf::from(&expected));
        assert_eq!(probed.borrow().len(), 1);
    }

    #[test]
    fn probe_finds_only_existing_version() {
        let expected = props_for("12.0");
        let probe = |p: &Path| p == Path::new(&expected);

        let found = locate(&PathTemplate::parse(PROPS), &vars(""), &options(), &probe).unwrap();
        assert_eq!(found, PathBuf::from(&expected));
    }

    #[test]
    fn probe_is_descending_and_stops_at_first_hit() {
        let probed = RefCell::new(Vec::new());
        let newer = props_for("14.0");
        let older = props_for("12.0");
        let probe = |p: &Path| {
            probed.borrow_mut().push(p.to_string_lossy().into_owned());
            p == Path::new(&newer) || p == Path::new(&older)
        };

        let found = locate(&PathTemplate::parse(PROPS), &vars("99.0"), &options(), &probe).unwrap();
        assert_eq!(found, PathBuf::from(&newer));
        // declared 99.0, then 20.0 down to 14.0
        assert_eq!(probed.borrow().len(), 1 + 7);
    }

    #[test]
    fn exhausted_range_is_not_found() {
        let probe = |_: &Path| false;
        let err = locate(&PathTemplate::parse(PROPS), &vars("12.0"), &options(), &probe).unwrap_err();
        assert!(matches!(err, Error::DefaultsNotFound { .. }));
    }

    #[test]
    fn version_outside_range_is_not_found() {
        let expected = props_for("9.0");
        let probe = |p: &Path| p == Path::new(&expected);
        let err = locate(&PathTemplate::parse(PROPS), &vars(""), &options(), &probe).unwrap_err();
        assert!(matches!(err, Error::DefaultsNotFound { .. }));
    }

    #[test]
    fn empty_template_is_not_found() {
        let probe = |_: &Path| true;
        let err = locate(&PathTemplate::parse(""), &vars("12.0"), &options(), &probe).unwrap_err();
        assert!(matches!(err, Error::DefaultsNotFound { .. }));
    }
}
