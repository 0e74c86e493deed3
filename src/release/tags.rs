//! Release tag naming
//!
//! Tags are the bare version by default (`1.2.3`), optionally prefixed (`v1.2.3`).

use semver::Version;

/// How release tags are named and annotated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFormat {
  /// Prepended to the version
  pub prefix: String,
  /// Annotation template; `{version}` is substituted
  pub message: String,
}

impl TagFormat {
  pub fn new(prefix: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
      message: message.into(),
    }
  }

  /// Tag name for a version
  pub fn name(&self, version: &Version) -> String {
    format!("{}{}", self.prefix, version)
  }

  /// Annotation message for a version
  pub fn message(&self, version: &Version) -> String {
    self.message.replace("{version}", &version.to_string())
  }

  /// Version a tag name refers to, if it follows this format
  pub fn parse(&self, tag_name: &str) -> Option<Version> {
    tag_name
      .strip_prefix(self.prefix.as_str())
      .and_then(|rest| Version::parse(rest).ok())
  }

  /// Highest-versioned release tag among `tag_names`; other tags are ignored
  pub fn latest<'a>(&self, tag_names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    tag_names
      .into_iter()
      .filter_map(|name| self.parse(name).map(|version| (version, name)))
      .max_by(|(a, _), (b, _)| a.cmp(b))
      .map(|(_, name)| name)
  }
}

impl Default for TagFormat {
  fn default() -> Self {
    Self::new("", "Created Tag for version: {version}")
  }
}
