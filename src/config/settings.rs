use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::ext::BestEffortPathExt;

const SETTINGS_FILE_NAME: &str = "dusnap.yaml";
const DEFAULT_RETENTION_DEPTH: usize = 5;

const RETENTION_DEPTH_KEY: &str = "retention_depth";
const OUTPUT_DIR_KEY: &str = "output_dir";

/// Defaults for the `stat` command, overridable from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub retention_depth: usize,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retention_depth: DEFAULT_RETENTION_DEPTH,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Reads `explicit` if given, otherwise `dusnap.yaml` from the working
    /// directory when it exists. Without either, the defaults apply.
    pub fn read(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        let path = Path::new(SETTINGS_FILE_NAME);
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        debug!("Reading settings file: {}", path.best_effort_path_display());
        let contents = fs::read_to_string(path).context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_settings_from_yaml(
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        for (key, value) in top_level {
            match key.as_str() {
                Some(RETENTION_DEPTH_KEY) => {
                    settings.retention_depth = match value {
                        Yaml::Value(Scalar::Integer(depth)) => usize::try_from(*depth).ok(),
                        _ => None,
                    }
                    .context(InvalidValueSnafu {
                        key: RETENTION_DEPTH_KEY,
                        expected: "a non-negative integer",
                    })?;
                }
                Some(OUTPUT_DIR_KEY) => {
                    settings.output_dir =
                        value.as_str().map(PathBuf::from).context(InvalidValueSnafu {
                            key: OUTPUT_DIR_KEY,
                            expected: "a string",
                        })?;
                }
                _ => debug!("Ignoring unknown settings key: {:?}", key),
            }
        }

        Ok(settings)
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec =
            Yaml::load_from_str(contents).map_err(|e| SettingsError::ParseError { source: e })?;
        let contents = contents_vec
            .first()
            .ok_or(SettingsError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(SettingsError::TopLevelNotMap)?;

        Self::parse_settings_from_yaml(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted settings file"))]
    MalformedConfig,
    #[snafu(display("Top level of settings should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Setting '{}' should be {}", key, expected))]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },
}
