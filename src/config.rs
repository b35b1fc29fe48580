//! Frozen configuration, loaded from YAML or TOML, validated once at
//! startup. Accepts both the nested shape (`project.directory`) and a
//! flat legacy shape (`directory` at the top level); unknown fields are
//! ignored.

use crate::errors::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    CppOnly,
    GoOnly,
    AutoDetect,
}

impl Default for AnalysisMode {
    fn default() -> Self {
        AnalysisMode::AutoDetect
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub directory: PathBuf,
    #[serde(default)]
    pub build_directory: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            build_directory: None,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![
        ".cpp".into(),
        ".cc".into(),
        ".cxx".into(),
        ".h".into(),
        ".hpp".into(),
        ".go".into(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub directories: Vec<PathBuf>,
    #[serde(default = "default_extensions")]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directories: vec![PathBuf::from(".")],
            file_extensions: default_extensions(),
            exclude_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompileCommandsConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub auto_generate: bool,
    #[serde(default)]
    pub cmake_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub report_file: Option<PathBuf>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub show_uncovered_paths_details: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_file: None,
            log_file: None,
            log_level: default_log_level(),
            show_uncovered_paths_details: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QtLogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub category_functions: Vec<String>,
}

impl Default for QtLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            functions: vec![
                "qDebug".into(),
                "qInfo".into(),
                "qWarning".into(),
                "qCritical".into(),
                "qFatal".into(),
            ],
            category_functions: vec![
                "qCDebug".into(),
                "qCInfo".into(),
                "qCWarning".into(),
                "qCCritical".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomLogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub functions: std::collections::BTreeMap<String, Vec<String>>,
}

impl Default for CustomLogConfig {
    fn default() -> Self {
        let mut functions = std::collections::BTreeMap::new();
        functions.insert(
            "error".to_string(),
            vec!["LOG_ERROR".into(), "LOG_ERROR_FMT".into()],
        );
        functions.insert("warning".to_string(), vec!["LOG_WARNING".into()]);
        functions.insert("info".to_string(), vec!["LOG_INFO".into()]);
        functions.insert("debug".to_string(), vec!["LOG_DEBUG".into()]);
        Self {
            enabled: true,
            functions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogFunctionsConfig {
    #[serde(default)]
    pub qt: QtLogConfig,
    #[serde(default)]
    pub custom: CustomLogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoDetectionConfig {
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_sample_size() -> usize {
    50
}
fn default_confidence_threshold() -> f64 {
    0.8
}

impl Default for AutoDetectionConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub mode: AnalysisMode,
    #[serde(default)]
    pub auto_detection: AutoDetectionConfig,
    #[serde(default = "default_true")]
    pub function_coverage: bool,
    #[serde(default = "default_true")]
    pub branch_coverage: bool,
    #[serde(default = "default_true")]
    pub exception_coverage: bool,
    #[serde(default = "default_true")]
    pub key_path_coverage: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            auto_detection: AutoDetectionConfig::default(),
            function_coverage: true,
            branch_coverage: true,
            exception_coverage: true,
            key_path_coverage: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_true")]
    pub enable_parallel_analysis: bool,
    #[serde(default)]
    pub max_threads: usize,
    #[serde(default = "default_true")]
    pub enable_ast_cache: bool,
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,
    #[serde(default = "default_false")]
    pub enable_io_optimization: bool,
    #[serde(default = "default_file_buffer_size")]
    pub file_buffer_size: usize,
    #[serde(default = "default_false")]
    pub enable_file_preloading: bool,
}

fn default_max_cache_size() -> usize {
    10_000
}
fn default_file_buffer_size() -> usize {
    64 * 1024
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enable_parallel_analysis: true,
            max_threads: 0,
            enable_ast_cache: true,
            max_cache_size: default_max_cache_size(),
            enable_io_optimization: false,
            file_buffer_size: default_file_buffer_size(),
            enable_file_preloading: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoLibraryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoZapConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub logger_functions: Vec<String>,
    #[serde(default)]
    pub sugared_functions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoConfig {
    #[serde(default)]
    pub standard_log: GoLibraryConfig,
    #[serde(default)]
    pub logrus: GoLibraryConfig,
    #[serde(default)]
    pub zap: GoZapConfig,
    #[serde(default)]
    pub golib: GoLibraryConfig,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            standard_log: GoLibraryConfig {
                enabled: true,
                functions: vec!["Println".into(), "Printf".into(), "Fatal".into()],
            },
            logrus: GoLibraryConfig {
                enabled: true,
                functions: vec!["Info".into(), "Warn".into(), "Error".into(), "Debug".into()],
            },
            zap: GoZapConfig {
                enabled: true,
                logger_functions: vec!["Info".into(), "Warn".into(), "Error".into()],
                sugared_functions: vec!["Infof".into(), "Warnf".into(), "Errorf".into()],
            },
            golib: GoLibraryConfig {
                enabled: false,
                functions: Vec::new(),
            },
        }
    }
}

/// Top-level frozen configuration. Constructed only via [`Config::load`]
/// or [`Config::from_str`], both of which validate before returning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub compile_commands: CompileCommandsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log_functions: LogFunctionsConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub go: GoConfig,

    // Flat legacy aliases accepted at the top level; folded into the
    // nested fields above by `apply_flat_aliases` before validation.
    #[serde(default, skip_serializing)]
    directory: Option<PathBuf>,
    #[serde(default, skip_serializing)]
    output_file: Option<PathBuf>,
    #[serde(default, skip_serializing)]
    exclude: Option<Vec<String>>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            project: ProjectConfig::default(),
            scan: ScanConfig::default(),
            compile_commands: CompileCommandsConfig::default(),
            output: OutputConfig::default(),
            log_functions: LogFunctionsConfig::default(),
            analysis: AnalysisConfig::default(),
            performance: PerformanceConfig::default(),
            go: GoConfig::default(),
            directory: None,
            output_file: None,
            exclude: None,
        }
    }
}

impl Config {
    /// Loads from a YAML or TOML file (picked by extension), applies the
    /// flat-shape aliases and environment overrides, then validates.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| AnalysisError::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let mut config = Self::parse(path, &text)?;
        config.apply_flat_aliases();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, AnalysisError> {
        let is_toml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("toml")
        );
        if is_toml {
            toml::from_str(text).map_err(|e| AnalysisError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        } else {
            serde_yaml::from_str(text).map_err(|e| AnalysisError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }

    /// Parses directly from a string with an explicit format hint, used by
    /// tests and the config round-trip property.
    pub fn from_yaml_str(text: &str) -> Result<Self, AnalysisError> {
        let mut config: Self =
            serde_yaml::from_str(text).map_err(|e| AnalysisError::ConfigParse {
                path: PathBuf::from("<string>"),
                message: e.to_string(),
            })?;
        config.apply_flat_aliases();
        Ok(config)
    }

    pub fn apply_flat_aliases(&mut self) {
        if let Some(dir) = self.directory.take() {
            self.project.directory = dir;
        }
        if let Some(output_file) = self.output_file.take() {
            self.output.report_file = Some(output_file);
        }
        if let Some(exclude) = self.exclude.take() {
            self.scan.exclude_patterns.extend(exclude);
        }
    }

    /// Applies `DLOGCOVER_*` environment overrides, matching the order of
    /// precedence: env vars win over file/flat values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DLOGCOVER_DIRECTORY") {
            self.project.directory = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DLOGCOVER_OUTPUT") {
            self.output.report_file = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("DLOGCOVER_LOG_PATH") {
            self.output.log_file = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("DLOGCOVER_LOG_LEVEL") {
            self.output.log_level = v;
        }
        if let Ok(v) = std::env::var("DLOGCOVER_EXCLUDE") {
            self.scan
                .exclude_patterns
                .extend(v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.version != "1.0" {
            return Err(AnalysisError::ConfigInvalid(format!(
                "unsupported config version {:?}, expected \"1.0\"",
                self.version
            )));
        }
        if !self.project.directory.exists() {
            return Err(AnalysisError::ProjectDirectoryMissing(
                self.project.directory.clone(),
            ));
        }
        if self.scan.file_extensions.is_empty() {
            return Err(AnalysisError::ConfigInvalid(
                "scan.file_extensions must not be empty".to_string(),
            ));
        }
        for pattern in &self.scan.exclude_patterns {
            if let Err(e) = crate::io::walker::pattern_to_regex(pattern) {
                return Err(AnalysisError::ConfigInvalid(format!(
                    "invalid exclude pattern {pattern:?}: {e}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_version_one_dot_zero() {
        assert_eq!(Config::default().version, "1.0");
    }

    #[test]
    fn flat_directory_alias_overrides_nested() {
        let mut config = Config::default();
        config.directory = Some(PathBuf::from("/tmp/flat"));
        config.apply_flat_aliases();
        assert_eq!(config.project.directory, PathBuf::from("/tmp/flat"));
    }

    #[test]
    fn env_override_wins_over_file_value() {
        std::env::set_var("DLOGCOVER_LOG_LEVEL", "debug");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.output.log_level, "debug");
        std::env::remove_var("DLOGCOVER_LOG_LEVEL");
    }

    #[test]
    fn rejects_non_1_0_version() {
        let mut config = Config::default();
        config.version = "2.0".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_extension_list() {
        let mut config = Config::default();
        config.scan.file_extensions.clear();
        assert!(config.validate().is_err());
    }
}
