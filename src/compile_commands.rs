//! Compile-commands database: parses `compile_commands.json`, exposes
//! per-file argument vectors, and falls back to a built-in argument set
//! when a file has no entry.

use crate::errors::AnalysisError;
use crate::path_normalizer::{canonical, file_name};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CompileInfo {
    pub file: PathBuf,
    pub directory: PathBuf,
    pub command: String,
    pub include_paths: Vec<String>,
    pub defines: Vec<String>,
    pub flags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    directory: Option<String>,
    command: Option<String>,
    file: Option<String>,
}

/// Built-in argument set used when neither a canonical nor a basename
/// match is found in the compile database.
pub fn fallback_args() -> Vec<String> {
    vec![
        "-std=c++14".to_string(),
        "-fPIC".to_string(),
        "-g".to_string(),
        "-I/usr/include".to_string(),
        "-I/usr/local/include".to_string(),
        "-I/usr/include/x86_64-linux-gnu/qt5".to_string(),
        "-DQT_CORE_LIB".to_string(),
        "-DQT_NO_DEBUG".to_string(),
    ]
}

pub struct CompileCommandsStore {
    by_canonical_path: HashMap<PathBuf, CompileInfo>,
    by_basename: HashMap<String, CompileInfo>,
}

impl CompileCommandsStore {
    /// Loads and parses a `compile_commands.json` file. An empty/malformed
    /// document or a non-array root is an error; individual malformed
    /// entries are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| AnalysisError::CompileCommandsRead {
                path: path.to_path_buf(),
                source,
            })?;

        let raw: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| AnalysisError::CompileCommandsParse {
                path: path.to_path_buf(),
                source,
            })?;

        let array = raw.as_array().ok_or_else(|| AnalysisError::CompileCommandsInvalid {
            path: path.to_path_buf(),
            message: "root must be a JSON array".to_string(),
        })?;

        let mut by_canonical_path = HashMap::new();
        let mut by_basename = HashMap::new();

        for value in array {
            let Ok(entry) = serde_json::from_value::<RawEntry>(value.clone()) else {
                tracing::warn!("skipping malformed compile_commands.json entry");
                continue;
            };
            let (Some(directory), Some(command), Some(file)) =
                (entry.directory, entry.command, entry.file)
            else {
                tracing::warn!("skipping compile_commands.json entry missing a required field");
                continue;
            };

            let directory = PathBuf::from(directory);
            let file_path = if Path::new(&file).is_absolute() {
                PathBuf::from(&file)
            } else {
                directory.join(&file)
            };
            let canonical_path = canonical(&file_path);
            let (include_paths, defines, flags) = tokenize_command(&command);

            let info = CompileInfo {
                file: canonical_path.clone(),
                directory,
                command,
                include_paths,
                defines,
                flags,
            };

            if let Some(basename) = file_name(&canonical_path) {
                by_basename.insert(basename, info.clone());
            }
            by_canonical_path.insert(canonical_path, info);
        }

        if by_canonical_path.is_empty() && !array.is_empty() {
            tracing::warn!(
                path = %path.display(),
                "compile_commands.json parsed zero usable entries; falling back to built-in args"
            );
        }

        Ok(Self {
            by_canonical_path,
            by_basename,
        })
    }

    /// Exact canonical lookup, falling back to a basename match (a
    /// degraded hit, worth logging by the caller).
    pub fn get_compile_info_for_file(&self, path: &Path) -> Option<&CompileInfo> {
        let canonical_path = canonical(path);
        if let Some(info) = self.by_canonical_path.get(&canonical_path) {
            return Some(info);
        }
        let basename = file_name(&canonical_path)?;
        self.by_basename.get(&basename)
    }

    /// Tokenized compiler argument list for `path`: the real entry's
    /// flags with the invocation name, `-o <out>`, `-c`, and the trailing
    /// source file stripped; or the built-in fallback if no entry is
    /// found at all.
    pub fn get_compiler_args(&self, path: &Path) -> Vec<String> {
        match self.get_compile_info_for_file(path) {
            Some(info) => {
                let mut args = Vec::new();
                args.extend(info.include_paths.iter().cloned());
                args.extend(info.defines.iter().cloned());
                args.extend(info.flags.iter().cloned());
                args
            }
            None => fallback_args(),
        }
    }

    /// Shells out to `cmake -B <build_dir> -DCMAKE_EXPORT_COMPILE_COMMANDS=1
    /// <project_dir> <cmake_args...>` and re-parses the produced file.
    /// Fails cleanly (returns an error, does not panic) if cmake is absent.
    pub fn generate(
        project_dir: &Path,
        build_dir: &Path,
        cmake_args: &[String],
    ) -> Result<Self, AnalysisError> {
        let cmake = which::which("cmake")
            .map_err(|e| AnalysisError::CompileCommandsGenerate(e.to_string()))?;

        let status = std::process::Command::new(cmake)
            .arg("-B")
            .arg(build_dir)
            .arg("-DCMAKE_EXPORT_COMPILE_COMMANDS=1")
            .arg(project_dir)
            .args(cmake_args)
            .status()
            .map_err(|e| AnalysisError::CompileCommandsGenerate(e.to_string()))?;

        if !status.success() {
            return Err(AnalysisError::CompileCommandsGenerate(format!(
                "cmake exited with {status}"
            )));
        }

        Self::load(&build_dir.join("compile_commands.json"))
    }
}

/// Splits a raw compiler invocation into include paths (`-I…`), macro
/// defines (`-D…`), and everything else, while stripping the compiler
/// binary name, `-o <out>`, `-c`, and the trailing source-file token.
fn tokenize_command(command: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
    let tokens = shell_split(command);
    let mut include_paths = Vec::new();
    let mut defines = Vec::new();
    let mut flags = Vec::new();

    let mut iter = tokens.into_iter().skip(1).peekable();
    while let Some(tok) = iter.next() {
        if tok == "-o" {
            iter.next();
            continue;
        }
        if tok == "-c" {
            continue;
        }
        if tok.starts_with("-I") {
            include_paths.push(tok);
        } else if tok.starts_with("-D") {
            defines.push(tok);
        } else if tok.starts_with('-') {
            flags.push(tok);
        }
        // bare tokens (the source file, positional args) are dropped
    }

    (include_paths, defines, flags)
}

fn shell_split(command: &str) -> Vec<String> {
    command
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_extracts_includes_and_defines() {
        let (includes, defines, flags) =
            tokenize_command("g++ -Iinclude -DFOO=1 -Wall -c src/main.cpp -o main.o");
        assert_eq!(includes, vec!["-Iinclude"]);
        assert_eq!(defines, vec!["-DFOO=1"]);
        assert_eq!(flags, vec!["-Wall"]);
    }

    #[test]
    fn load_rejects_non_array_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile_commands.json");
        std::fs::write(&path, "{}").unwrap();
        let err = CompileCommandsStore::load(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::CompileCommandsInvalid { .. }));
    }

    #[test]
    fn load_skips_entries_missing_required_fields() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("main.cpp");
        std::fs::write(&src, "").unwrap();
        let path = dir.path().join("compile_commands.json");
        std::fs::write(
            &path,
            format!(
                r#"[{{"directory":"{}","command":"g++ -c main.cpp"}},
                    {{"directory":"{}","command":"g++ -c main.cpp","file":"main.cpp"}}]"#,
                dir.path().display(),
                dir.path().display()
            ),
        )
        .unwrap();

        let store = CompileCommandsStore::load(&path).unwrap();
        assert!(store.get_compile_info_for_file(&src).is_some());
    }

    #[test]
    fn fallback_used_when_no_entry_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile_commands.json");
        std::fs::write(&path, "[]").unwrap();
        let store = CompileCommandsStore::load(&path).unwrap();
        let args = store.get_compiler_args(Path::new("/nowhere/x.cpp"));
        assert_eq!(args, fallback_args());
    }
}
