//! Version-bearing manifest files
//!
//! A manifest is either JSON (`package.json` style, top-level `"version"`) or TOML
//! (`Cargo.toml` style, `[package].version`), chosen by file extension. Rewrites are
//! lossless apart from the version itself: JSON has the new version spliced into the
//! original text, and TOML goes through `toml_edit` so comments survive.

use crate::core::error::{ManifestError, ReleaseError, ReleaseResult};
use crate::release::bump::VersionBump;
use semver::Version;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Manifest file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
  Json,
  Toml,
}

impl ManifestFormat {
  /// Pick a format from the file extension (anything but `.toml` is JSON)
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|e| e.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("toml") => ManifestFormat::Toml,
      _ => ManifestFormat::Json,
    }
  }
}

#[derive(Debug, Clone)]
enum Document {
  Json {
    /// Source text, edited in place
    text: String,
    value: serde_json::Value,
  },
  Toml(toml_edit::DocumentMut),
}

/// A parsed manifest that can be rewritten in place
#[derive(Debug, Clone)]
pub struct Manifest {
  path: PathBuf,
  document: Document,
}

impl Manifest {
  /// Parse manifest text; `path` picks the format and labels errors
  pub fn parse(path: &Path, text: &str) -> ReleaseResult<Self> {
    let parse_error = |reason: String| {
      ReleaseError::Manifest(ManifestError::Parse {
        path: path.to_path_buf(),
        reason,
      })
    };

    let document = match ManifestFormat::from_path(path) {
      ManifestFormat::Json => {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?;
        if !value.is_object() {
          return Err(parse_error("top-level value must be an object".to_string()));
        }
        Document::Json {
          text: text.to_string(),
          value,
        }
      }
      ManifestFormat::Toml => {
        let doc: toml_edit::DocumentMut = text.parse().map_err(|e: toml_edit::TomlError| parse_error(e.to_string()))?;
        Document::Toml(doc)
      }
    };

    Ok(Self {
      path: path.to_path_buf(),
      document,
    })
  }

  /// Read and parse a manifest from disk
  pub async fn load(path: &Path) -> ReleaseResult<Self> {
    let text = match tokio::fs::read_to_string(path).await {
      Ok(text) => text,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(ReleaseError::Manifest(ManifestError::NotFound {
          path: path.to_path_buf(),
        }));
      }
      Err(e) => {
        return Err(ReleaseError::Io(e).context(format!("Failed to read manifest {}", path.display())));
      }
    };

    Self::parse(path, &text)
  }

  /// Current version
  pub fn version(&self) -> ReleaseResult<Version> {
    let raw = match &self.document {
      Document::Json { value, .. } => value.get("version").and_then(|v| v.as_str()),
      Document::Toml(doc) => doc
        .get("package")
        .and_then(|package| package.get("version"))
        .and_then(|v| v.as_str()),
    };

    let raw = raw.ok_or_else(|| {
      ReleaseError::Manifest(ManifestError::MissingVersion {
        path: self.path.clone(),
      })
    })?;

    Version::parse(raw.trim()).map_err(|e| {
      ReleaseError::Manifest(ManifestError::InvalidVersion {
        path: self.path.clone(),
        value: raw.to_string(),
        reason: e.to_string(),
      })
    })
  }

  /// Replace the version, leaving everything else untouched
  pub fn set_version(&mut self, version: &Version) -> ReleaseResult<()> {
    // The existing field must be readable before it is overwritten
    self.version()?;

    match &mut self.document {
      Document::Json { text, value } => {
        let span = top_level_string_span(text, "version").ok_or_else(|| {
          ReleaseError::Manifest(ManifestError::MissingVersion {
            path: self.path.clone(),
          })
        })?;
        let literal = serde_json::to_string(&version.to_string())?;
        text.replace_range(span, &literal);

        if let Some(object) = value.as_object_mut() {
          object.insert("version".to_string(), serde_json::Value::String(version.to_string()));
        }
      }
      Document::Toml(doc) => {
        let item = &mut doc["package"]["version"];
        let decor = item.as_value().map(|v| v.decor().clone());
        *item = toml_edit::value(version.to_string());
        if let (Some(decor), Some(value)) = (decor, item.as_value_mut()) {
          *value.decor_mut() = decor;
        }
      }
    }

    Ok(())
  }

  /// Render the manifest back to text
  pub fn render(&self) -> ReleaseResult<String> {
    match &self.document {
      Document::Json { text, .. } => Ok(text.clone()),
      Document::Toml(doc) => Ok(doc.to_string()),
    }
  }

  /// Write the manifest back to where it was read from
  pub async fn save(&self) -> ReleaseResult<()> {
    let text = self.render()?;
    tokio::fs::write(&self.path, text).await.map_err(|e| {
      ReleaseError::Manifest(ManifestError::Write {
        path: self.path.clone(),
        reason: e.to_string(),
      })
    })
  }
}

/// Read the version currently persisted in a manifest
pub async fn read_version(path: &Path) -> ReleaseResult<Version> {
  Manifest::load(path).await?.version()
}

/// Bump the manifest version on disk, returning (previous, new)
pub async fn bump_manifest(path: &Path, bump: VersionBump) -> ReleaseResult<(Version, Version)> {
  let mut manifest = Manifest::load(path).await?;
  let current = manifest.version()?;
  let next = bump.apply(&current)?;

  manifest.set_version(&next)?;
  manifest.save().await?;

  tracing::debug!(path = %path.display(), from = %current, to = %next, "manifest version bumped");
  Ok((current, next))
}

/// Byte range of the string value stored under `key` in the top-level object
///
/// `text` must already be valid JSON. Nested objects are skipped; with duplicate keys
/// the last one wins, as it does for the parsed value.
fn top_level_string_span(text: &str, key: &str) -> Option<Range<usize>> {
  let bytes = text.as_bytes();
  let mut depth = 0usize;
  let mut key_matches = false;
  let mut in_value = false;
  let mut found = None;
  let mut i = 0;

  while i < bytes.len() {
    match bytes[i] {
      b'"' => {
        let end = string_end(bytes, i)?;
        if depth == 1 {
          if in_value {
            if key_matches {
              found = Some(i..end);
            }
            in_value = false;
            key_matches = false;
          } else {
            key_matches = serde_json::from_str::<String>(&text[i..end]).is_ok_and(|k| k == key);
          }
        }
        i = end;
        continue;
      }
      b':' if depth == 1 => in_value = true,
      b',' if depth == 1 => {
        in_value = false;
        key_matches = false;
      }
      b'{' | b'[' => {
        if depth == 1 {
          in_value = false;
          key_matches = false;
        }
        depth += 1;
      }
      b'}' | b']' => depth = depth.saturating_sub(1),
      _ => {}
    }
    i += 1;
  }

  found
}

/// Index just past the closing quote of the string starting at `start`
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
  let mut i = start + 1;
  while i < bytes.len() {
    match bytes[i] {
      b'\\' => i += 2,
      b'"' => return Some(i + 1),
      _ => i += 1,
    }
  }
  None
}
