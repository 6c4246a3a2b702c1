//! Coercion of free-form TypeScript version strings.

use semver::Version;

/// Version assumed when none is given or the given one is unusable.
pub const DEFAULT_TYPESCRIPT_VERSION: &str = "1.6.2";

/// The built-in default as a parsed version.
pub fn default_version() -> Version {
    Version::new(1, 6, 2)
}

/// Coerce `raw` into a strict `MAJOR.MINOR.PATCH` version.
///
/// A leading `=` or `v` is dropped, pre-release suffixes are cut at the
/// first `-`, and up to two missing components are padded with `.0`, so
/// `"v1.3"`, `"1.6.2-beta"` and `"1"` become `1.3.0`, `1.6.2` and `1.0.0`.
/// Anything else degrades to [`DEFAULT_TYPESCRIPT_VERSION`]; this never
/// fails.
pub fn normalize(raw: Option<&str>) -> Version {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default_version();
    };

    let unprefixed = raw.strip_prefix('=').unwrap_or(raw);
    let unprefixed = unprefixed.strip_prefix('v').unwrap_or(unprefixed);

    let mut candidate = match unprefixed.split_once('-') {
        Some((release, _)) => release.to_string(),
        None => unprefixed.to_string(),
    };

    for _ in 0..3 {
        if let Ok(version) = Version::parse(&candidate) {
            // Build metadata is not part of the canonical form.
            return Version::new(version.major, version.minor, version.patch);
        }
        candidate.push_str(".0");
    }

    tracing::debug!("unrecognized TypeScript version '{raw}', using {DEFAULT_TYPESCRIPT_VERSION}");
    default_version()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::baseline;
    use crate::settings::{SettingKey, SettingValue};
    use proptest::prelude::*;

    fn norm(raw: &str) -> String {
        normalize(Some(raw)).to_string()
    }

    #[test]
    fn keeps_full_versions() {
        assert_eq!(norm("2.0.3"), "2.0.3");
    }

    #[test]
    fn truncates_prerelease() {
        assert_eq!(norm("1.6.2-beta"), "1.6.2");
        assert_eq!(norm("1.8-rc-2"), "1.8.0");
    }

    #[test]
    fn pads_missing_components() {
        assert_eq!(norm("1.6"), "1.6.0");
        assert_eq!(norm("1"), "1.0.0");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(norm(""), DEFAULT_TYPESCRIPT_VERSION);
        assert_eq!(norm("not-a-version"), DEFAULT_TYPESCRIPT_VERSION);
        assert_eq!(norm("1.2.3.4"), DEFAULT_TYPESCRIPT_VERSION);
        assert_eq!(norm("   "), DEFAULT_TYPESCRIPT_VERSION);
        assert_eq!(normalize(None).to_string(), DEFAULT_TYPESCRIPT_VERSION);
    }

    #[test]
    fn strips_build_metadata() {
        assert_eq!(norm("2.1.4+build.7"), "2.1.4");
    }

    #[test]
    fn accepts_leading_v_and_equals() {
        assert_eq!(norm("v1.3"), "1.3.0");
        assert_eq!(norm("=2.0.1"), "2.0.1");
        assert_eq!(norm("=v1.4-beta"), "1.4.0");
        assert_eq!(norm("v"), DEFAULT_TYPESCRIPT_VERSION);
    }

    #[test]
    fn prefixed_old_version_gets_old_baseline() {
        let defaults = baseline(&normalize(Some("v1.3")));
        assert_eq!(defaults.get(SettingKey::Target), Some(&SettingValue::from("ES3")));
        assert_eq!(defaults.get(SettingKey::NoEmitOnError), Some(&SettingValue::from(false)));
    }

    #[test]
    fn default_constant_and_value_agree() {
        assert_eq!(default_version().to_string(), DEFAULT_TYPESCRIPT_VERSION);
    }

    #[test]
    fn output_is_always_strict() {
        for raw in ["", "1", "1.6", "1.6.2-beta", "x.y", "1..2", "v2", "12.0", "-", "3-"] {
            let v = normalize(Some(raw));
            assert!(v.pre.is_empty() && v.build.is_empty(), "{raw} -> {v}");
            assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
        }
    }

    // ── Properties ───────────────────────────────────────────────────────

    fn version_like() -> impl Strategy<Value = String> {
        "[ =v]{0,2}[0-9]{1,3}(\\.[0-9]{1,3}){0,3}(-[a-z0-9.-]{0,6})?(\\+[a-z0-9]{1,4})?"
    }

    fn assert_strict(raw: &str) -> Result<(), TestCaseError> {
        let v = normalize(Some(raw));
        prop_assert!(v.pre.is_empty() && v.build.is_empty(), "{raw:?} -> {v}");
        prop_assert_eq!(Version::parse(&v.to_string()).ok(), Some(v));
        Ok(())
    }

    proptest! {
        #[test]
        fn arbitrary_input_normalizes_to_strict_version(raw in any::<String>()) {
            assert_strict(&raw)?;
        }

        #[test]
        fn version_like_input_normalizes_to_strict_version(raw in version_like()) {
            assert_strict(&raw)?;
        }
    }
}
