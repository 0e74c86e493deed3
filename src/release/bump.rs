//! Semantic version increments

use crate::core::error::{ManifestError, ReleaseError, ReleaseResult};
use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Increment kind applied by the bump step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
  /// Major version bump (breaking changes)
  Major,
  /// Minor version bump (new features)
  Minor,
  /// Patch version bump (bug fixes)
  #[default]
  Patch,
}

impl VersionBump {
  /// Apply bump to a semver version
  ///
  /// A prerelease is promoted to its release instead of skipping past it:
  /// `1.2.3-rc.1` patches to `1.2.3`, `1.3.0-rc.1` minors to `1.3.0`,
  /// `2.0.0-rc.1` majors to `2.0.0`. A component already at `u64::MAX` cannot be
  /// incremented and is reported as a manifest error.
  pub fn apply(&self, version: &Version) -> ReleaseResult<Version> {
    let pre = !version.pre.is_empty();
    let inc = |component: u64| {
      component.checked_add(1).ok_or_else(|| {
        ReleaseError::Manifest(ManifestError::VersionOverflow {
          value: version.to_string(),
          bump: self.as_str(),
        })
      })
    };

    let mut next = match self {
      VersionBump::Major if pre && version.minor == 0 && version.patch == 0 => {
        Version::new(version.major, 0, 0)
      }
      VersionBump::Major => Version::new(inc(version.major)?, 0, 0),
      VersionBump::Minor if pre && version.patch == 0 => Version::new(version.major, version.minor, 0),
      VersionBump::Minor => Version::new(version.major, inc(version.minor)?, 0),
      VersionBump::Patch if pre => Version::new(version.major, version.minor, version.patch),
      VersionBump::Patch => Version::new(version.major, version.minor, inc(version.patch)?),
    };

    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    Ok(next)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      VersionBump::Major => "major",
      VersionBump::Minor => "minor",
      VersionBump::Patch => "patch",
    }
  }
}

impl fmt::Display for VersionBump {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for VersionBump {
  type Err = ReleaseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "major" => Ok(VersionBump::Major),
      "minor" => Ok(VersionBump::Minor),
      "patch" => Ok(VersionBump::Patch),
      other => Err(ReleaseError::with_help(
        format!("Unknown increment kind '{}'", other),
        "Use one of: major, minor, patch",
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
  }

  #[test]
  fn test_bump_major() {
    assert_eq!(VersionBump::Major.apply(&v("1.2.3")).unwrap(), v("2.0.0"));
    assert_eq!(VersionBump::Major.apply(&v("0.5.1")).unwrap(), v("1.0.0"));
  }

  #[test]
  fn test_bump_minor() {
    assert_eq!(VersionBump::Minor.apply(&v("1.2.3")).unwrap(), v("1.3.0"));
    assert_eq!(VersionBump::Minor.apply(&v("0.1.5")).unwrap(), v("0.2.0"));
  }

  #[test]
  fn test_bump_patch() {
    assert_eq!(VersionBump::Patch.apply(&v("1.2.3")).unwrap(), v("1.2.4"));
    assert_eq!(VersionBump::Patch.apply(&v("0.1.0")).unwrap(), v("0.1.1"));
  }

  #[test]
  fn test_prerelease_promotes_to_release() {
    assert_eq!(VersionBump::Patch.apply(&v("1.2.3-rc.1")).unwrap(), v("1.2.3"));
    assert_eq!(VersionBump::Minor.apply(&v("1.3.0-beta")).unwrap(), v("1.3.0"));
    assert_eq!(VersionBump::Major.apply(&v("2.0.0-alpha.2")).unwrap(), v("2.0.0"));
  }

  #[test]
  fn test_prerelease_past_boundary_still_increments() {
    assert_eq!(VersionBump::Minor.apply(&v("1.3.1-rc.1")).unwrap(), v("1.4.0"));
    assert_eq!(VersionBump::Major.apply(&v("2.1.0-rc.1")).unwrap(), v("3.0.0"));
  }

  #[test]
  fn test_build_metadata_dropped() {
    assert_eq!(VersionBump::Patch.apply(&v("1.2.3+sha.abc")).unwrap(), v("1.2.4"));
  }

  #[test]
  fn test_overflowing_component_is_an_error() {
    let max = u64::MAX;
    let err = VersionBump::Patch.apply(&v(&format!("1.2.{}", max))).unwrap_err();
    assert!(matches!(
      err,
      ReleaseError::Manifest(ManifestError::VersionOverflow { bump: "patch", .. })
    ));

    assert!(VersionBump::Minor.apply(&v(&format!("1.{}.0", max))).is_err());
    assert!(VersionBump::Major.apply(&v(&format!("{}.0.0", max))).is_err());

    // Lower components reset, so only the incremented one matters
    assert_eq!(VersionBump::Major.apply(&v(&format!("1.{0}.{0}", max))).unwrap(), v("2.0.0"));
  }

  #[test]
  fn test_parse_kind() {
    assert_eq!("Major".parse::<VersionBump>().unwrap(), VersionBump::Major);
    assert_eq!("patch".parse::<VersionBump>().unwrap(), VersionBump::Patch);
    assert!("prerelease".parse::<VersionBump>().is_err());
    assert_eq!(VersionBump::default(), VersionBump::Patch);
  }
}
