//! Source Collector (§4.13): enumerates files under `scan.directories`
//! matching `scan.file_extensions`, skipping anything matching
//! `scan.exclude_patterns` (globs translated to regex). Uses `ignore`
//! for gitignore-aware traversal, consistent with the rest of the
//! dependency stack.

use crate::config::Config;
use crate::errors::collection::{AnalysisFailure, AnalysisResults, OperationType};
use crate::pipeline::SourceFileInfo;
use ignore::WalkBuilder;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Translates a simple glob pattern (`*`, `?`, literal characters) into
/// an anchored regex. Used both to validate `scan.exclude_patterns` at
/// config load time and to match files during enumeration.
pub fn pattern_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                re.push('\\');
                re.push(c);
            }
            other => re.push(other),
        }
    }
    re.push('$');
    Regex::new(&re)
}

pub struct SourceCollector<'a> {
    config: &'a Config,
    exclude_regexes: Vec<Regex>,
}

impl<'a> SourceCollector<'a> {
    pub fn new(config: &'a Config) -> Self {
        let exclude_regexes = config
            .scan
            .exclude_patterns
            .iter()
            .filter_map(|p| pattern_to_regex(p).ok())
            .collect();
        Self {
            config,
            exclude_regexes,
        }
    }

    /// Enumerates every matching file under every configured scan
    /// directory, reading its content. Unreadable files become a
    /// [`AnalysisFailure`] rather than aborting the whole collection.
    pub fn collect(&self) -> AnalysisResults<SourceFileInfo> {
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        let project_root = &self.config.project.directory;
        let roots: Vec<PathBuf> = if self.config.scan.directories.is_empty() {
            vec![project_root.clone()]
        } else {
            self.config
                .scan
                .directories
                .iter()
                .map(|d| {
                    if d.is_absolute() {
                        d.clone()
                    } else {
                        project_root.join(d)
                    }
                })
                .collect()
        };

        for root in roots {
            if !root.exists() {
                failures.push(AnalysisFailure::directory_access(
                    root.clone(),
                    anyhow::anyhow!("scan directory does not exist"),
                ));
                continue;
            }
            for path in self.walk_root(&root) {
                if self.is_excluded(&path, project_root) {
                    continue;
                }
                if !self.matches_extension(&path) {
                    continue;
                }
                match read_source(&path, project_root) {
                    Ok(info) => successes.push(info),
                    Err(e) => failures.push(AnalysisFailure::new(
                        path,
                        OperationType::FileRead,
                        e,
                    )),
                }
            }
        }

        AnalysisResults::new(successes, failures)
    }

    fn walk_root(&self, root: &Path) -> Vec<PathBuf> {
        WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
            .collect()
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.config
            .scan
            .file_extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }

    fn is_excluded(&self, path: &Path, project_root: &Path) -> bool {
        let relative = path.strip_prefix(project_root).unwrap_or(path);
        let relative_str = relative.to_string_lossy();
        let absolute_str = path.to_string_lossy();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());

        self.exclude_regexes.iter().any(|re| {
            re.is_match(&relative_str)
                || re.is_match(&absolute_str)
                || name.as_deref().map(|n| re.is_match(n)).unwrap_or(false)
        })
    }
}

fn read_source(path: &Path, project_root: &Path) -> anyhow::Result<SourceFileInfo> {
    let content = std::fs::read_to_string(path)?;
    let size_bytes = content.len() as u64;
    let is_header = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("h") | Some("hpp") | Some("hxx")
    );
    let relative_path = path
        .strip_prefix(project_root)
        .unwrap_or(path)
        .to_path_buf();
    Ok(SourceFileInfo {
        absolute_path: path.to_path_buf(),
        relative_path,
        content,
        size_bytes,
        is_header,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.project.directory = root.to_path_buf();
        config.scan.directories = vec![PathBuf::from(".")];
        config.scan.file_extensions = vec![".cpp".to_string()];
        config
    }

    #[test]
    fn collects_matching_extension_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.cpp"), "void f(){}").unwrap();
        std::fs::write(dir.path().join("b.txt"), "ignored").unwrap();

        let config = test_config(dir.path());
        let results = SourceCollector::new(&config).collect();
        assert_eq!(results.success_count(), 1);
        assert_eq!(results.successes[0].relative_path, PathBuf::from("a.cpp"));
    }

    #[test]
    fn excludes_matching_glob_pattern() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.cpp"), "void f(){}").unwrap();
        std::fs::write(dir.path().join("a_test.cpp"), "void g(){}").unwrap();

        let mut config = test_config(dir.path());
        config.scan.exclude_patterns = vec!["*_test.cpp".to_string()];
        let results = SourceCollector::new(&config).collect();
        assert_eq!(results.success_count(), 1);
        assert_eq!(results.successes[0].relative_path, PathBuf::from("a.cpp"));
    }

    #[test]
    fn pattern_to_regex_matches_simple_glob() {
        let re = pattern_to_regex("*_test.cpp").unwrap();
        assert!(re.is_match("foo_test.cpp"));
        assert!(!re.is_match("foo_test.cpp.bak"));
    }
}
