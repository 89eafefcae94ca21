//! Name module parameters.
//!
//! Parameters are owned by an external governance process. The registry only
//! reads them, and reads them on every call so that a change takes effect on
//! the next normalization.

use anyhow::{bail, Result};
use config::{Config, Environment, File as ConfigFile};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_MIN_SEGMENT_LENGTH: u32 = 2;
pub const DEFAULT_MAX_SEGMENT_LENGTH: u32 = 32;
pub const DEFAULT_MAX_NAME_LEVELS: u32 = 16;

/// Bounds applied by name normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParams {
    /// Shortest accepted segment, in bytes.
    pub min_segment_length: u32,
    /// Longest accepted segment, in bytes.
    pub max_segment_length: u32,
    /// Maximum number of `.` separated segments.
    pub max_name_levels: u32,
}

impl Default for NameParams {
    fn default() -> Self {
        Self {
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
            max_segment_length: DEFAULT_MAX_SEGMENT_LENGTH,
            max_name_levels: DEFAULT_MAX_NAME_LEVELS,
        }
    }
}

impl NameParams {
    pub fn new(min_segment_length: u32, max_segment_length: u32, max_name_levels: u32) -> Self {
        Self {
            min_segment_length,
            max_segment_length,
            max_name_levels,
        }
    }

    /// Load parameters from an optional file plus `DOTNAME_*` environment
    /// overrides, falling back to defaults for anything unset.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("min_segment_length", i64::from(defaults.min_segment_length))?
            .set_default("max_segment_length", i64::from(defaults.max_segment_length))?
            .set_default("max_name_levels", i64::from(defaults.max_name_levels))?;

        if let Some(path) = path {
            if !path.exists() {
                bail!("Configuration file {} not found", path.display());
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("DOTNAME"));

        let params: NameParams = builder.build()?.try_deserialize()?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_segment_length == 0 {
            bail!("min_segment_length must be at least 1");
        }
        if self.min_segment_length > self.max_segment_length {
            bail!(
                "min_segment_length ({}) exceeds max_segment_length ({})",
                self.min_segment_length,
                self.max_segment_length
            );
        }
        if self.max_name_levels == 0 {
            bail!("max_name_levels must be at least 1");
        }
        Ok(())
    }
}

/// Read-only view of the current name parameters.
pub trait ParamsProvider {
    fn min_segment_length(&self) -> u32;
    fn max_segment_length(&self) -> u32;
    fn max_name_levels(&self) -> u32;
}

impl ParamsProvider for NameParams {
    fn min_segment_length(&self) -> u32 {
        self.min_segment_length
    }

    fn max_segment_length(&self) -> u32 {
        self.max_segment_length
    }

    fn max_name_levels(&self) -> u32 {
        self.max_name_levels
    }
}

impl<P: ParamsProvider + ?Sized> ParamsProvider for Arc<P> {
    fn min_segment_length(&self) -> u32 {
        (**self).min_segment_length()
    }

    fn max_segment_length(&self) -> u32 {
        (**self).max_segment_length()
    }

    fn max_name_levels(&self) -> u32 {
        (**self).max_name_levels()
    }
}

/// Parameters shared with a governance process that may replace them.
///
/// Clones share the same underlying value.
#[derive(Debug, Clone, Default)]
pub struct SharedParams {
    inner: Arc<RwLock<NameParams>>,
}

impl SharedParams {
    pub fn new(params: NameParams) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    pub fn get(&self) -> NameParams {
        *self.inner.read()
    }

    /// Replace the parameter set after validating it.
    pub fn update(&self, params: NameParams) -> Result<()> {
        params.validate()?;
        *self.inner.write() = params;
        Ok(())
    }
}

impl ParamsProvider for SharedParams {
    fn min_segment_length(&self) -> u32 {
        self.inner.read().min_segment_length
    }

    fn max_segment_length(&self) -> u32 {
        self.inner.read().max_segment_length
    }

    fn max_name_levels(&self) -> u32 {
        self.inner.read().max_name_levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let params = NameParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.min_segment_length(), 2);
        assert_eq!(params.max_segment_length(), 32);
        assert_eq!(params.max_name_levels(), 16);
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        assert!(NameParams::new(0, 10, 4).validate().is_err());
        assert!(NameParams::new(8, 4, 4).validate().is_err());
        assert!(NameParams::new(2, 16, 0).validate().is_err());
    }

    #[test]
    fn load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("name.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "min_segment_length = 3").unwrap();
        writeln!(file, "max_segment_length = 12").unwrap();
        drop(file);

        let params = NameParams::load(Some(&path)).unwrap();
        assert_eq!(params.min_segment_length, 3);
        assert_eq!(params.max_segment_length, 12);
        assert_eq!(params.max_name_levels, DEFAULT_MAX_NAME_LEVELS);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = NameParams::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn shared_params_updates_are_visible_to_clones() {
        let shared = SharedParams::new(NameParams::new(2, 16, 4));
        let view = shared.clone();
        shared.update(NameParams::new(3, 20, 5)).unwrap();
        assert_eq!(view.min_segment_length(), 3);
        assert_eq!(view.max_segment_length(), 20);
        assert_eq!(view.max_name_levels(), 5);
        assert!(shared.update(NameParams::new(5, 1, 1)).is_err());
        assert_eq!(view.get(), NameParams::new(3, 20, 5));
    }
}
