//! Settings for a model comparison run, loadable from YAML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::ops::ExecutionModel;

/// Settings for one comparison run.
///
/// Every field has a default except `input`; `output_side` wins over `factor` when
/// both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Square grayscale source image.
    pub input: Option<PathBuf>,
    /// Target side in pixels.
    pub output_side: Option<u32>,
    /// Integer downscale factor, used when `output_side` is unset.
    pub factor: Option<u32>,
    /// Execution models to run, in order.
    pub models: Vec<ExecutionModel>,
    /// Directory receiving the presented images.
    pub output_dir: PathBuf,
    /// Base log level; `RUST_LOG` overrides it.
    pub log_level: String,
    /// Directory for rolling log files, console only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            input: None,
            output_side: None,
            factor: Some(2),
            models: ExecutionModel::ALL.to_vec(),
            output_dir: PathBuf::from("output"),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl CompareConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: CompareConfig = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Rejects settings that cannot describe a run.
    pub fn validate(&self) -> Result<()> {
        if self.input.is_none() {
            return Err(Error::Config("no input image given".to_string()));
        }
        if self.models.is_empty() {
            return Err(Error::Config("no execution models selected".to_string()));
        }
        match (self.output_side, self.factor) {
            (None, None) => Err(Error::Config(
                "either output_side or factor must be set".to_string(),
            )),
            (Some(0), _) => Err(Error::Config("output_side must be positive".to_string())),
            (None, Some(factor)) if factor < 2 => Err(Error::Config(format!(
                "factor must be at least 2, got {}",
                factor
            ))),
            _ => Ok(()),
        }
    }

    /// Target side for a square input of `input_side`.
    pub fn resolve_output_side(&self, input_side: u32) -> Result<u32> {
        if let Some(side) = self.output_side {
            return Ok(side);
        }

        let factor = self
            .factor
            .ok_or_else(|| Error::Config("either output_side or factor must be set".to_string()))?;
        if factor == 0 || input_side % factor != 0 {
            return Err(Error::InvalidDimensions(format!(
                "factor {} does not evenly divide input side {}",
                factor, input_side
            )));
        }

        Ok(input_side / factor)
    }
}
