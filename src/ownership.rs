//! File-ownership validation: decide whether a declaration's source file
//! is "owned" by a target translation unit, at four escalating strictness
//! levels.

use crate::path_normalizer::{canonical, file_name};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hxx", "h++", "hh"];
const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cxx", "c++", "cc", "c"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationLevel {
    Strict,
    Canonical,
    Smart,
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_owned: bool,
    pub used_level: ValidationLevel,
    pub reason: String,
    pub confidence: f64,
    pub normalized_target_path: PathBuf,
    pub normalized_decl_path: PathBuf,
}

#[derive(Debug, Default)]
pub struct ValidatorCounters {
    pub total_validations: AtomicU64,
    pub cache_hits: AtomicU64,
    pub strict_matches: AtomicU64,
    pub canonical_matches: AtomicU64,
    pub smart_matches: AtomicU64,
    pub fuzzy_matches: AtomicU64,
}

/// Exclude patterns (glob or regex) provided by configuration; anything
/// matching is treated as "not owned" at the Smart level.
pub struct OwnershipValidator {
    exclude_patterns: Vec<regex::Regex>,
    cache: DashMap<(PathBuf, PathBuf, ValidationLevel), ValidationResult>,
    counters: ValidatorCounters,
}

impl OwnershipValidator {
    pub fn new(exclude_patterns: &[String]) -> Self {
        let exclude_patterns = exclude_patterns
            .iter()
            .filter_map(|p| glob_to_regex(p).ok())
            .collect();
        Self {
            exclude_patterns,
            cache: DashMap::new(),
            counters: ValidatorCounters::default(),
        }
    }

    /// Clears the cache. Call when the project root changes.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn counters(&self) -> &ValidatorCounters {
        &self.counters
    }

    pub fn validate(
        &self,
        target: &Path,
        decl: &Path,
        level: ValidationLevel,
    ) -> ValidationResult {
        self.counters
            .total_validations
            .fetch_add(1, Ordering::Relaxed);

        let key = (target.to_path_buf(), decl.to_path_buf(), level);
        if let Some(cached) = self.cache.get(&key) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }

        let result = self.validate_uncached(target, decl, level);
        self.record_match(level, &result);
        self.cache.insert(key, result.clone());
        result
    }

    /// Validates a batch of (target, decl) pairs at the given level.
    pub fn validate_batch(
        &self,
        pairs: &[(PathBuf, PathBuf)],
        level: ValidationLevel,
    ) -> Vec<ValidationResult> {
        pairs
            .iter()
            .map(|(t, d)| self.validate(t, d, level))
            .collect()
    }

    fn record_match(&self, level: ValidationLevel, result: &ValidationResult) {
        if !result.is_owned {
            return;
        }
        let counter = match level {
            ValidationLevel::Strict => &self.counters.strict_matches,
            ValidationLevel::Canonical => &self.counters.canonical_matches,
            ValidationLevel::Smart => &self.counters.smart_matches,
            ValidationLevel::Fuzzy => &self.counters.fuzzy_matches,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn validate_uncached(
        &self,
        target: &Path,
        decl: &Path,
        level: ValidationLevel,
    ) -> ValidationResult {
        let normalized_target_path = canonical(target);
        let normalized_decl_path = canonical(decl);

        let strict = target == decl;
        if strict {
            return ValidationResult {
                is_owned: true,
                used_level: ValidationLevel::Strict,
                reason: "byte-identical path strings".into(),
                confidence: 1.0,
                normalized_target_path,
                normalized_decl_path,
            };
        }
        if level == ValidationLevel::Strict {
            return ValidationResult {
                is_owned: false,
                used_level: ValidationLevel::Strict,
                reason: "paths differ".into(),
                confidence: 1.0,
                normalized_target_path,
                normalized_decl_path,
            };
        }

        let canonical_match = normalized_target_path == normalized_decl_path;
        if canonical_match {
            return ValidationResult {
                is_owned: true,
                used_level: ValidationLevel::Canonical,
                reason: "equal after canonicalization".into(),
                confidence: 0.95,
                normalized_target_path,
                normalized_decl_path,
            };
        }
        if level == ValidationLevel::Canonical {
            return ValidationResult {
                is_owned: false,
                used_level: ValidationLevel::Canonical,
                reason: "paths differ after canonicalization".into(),
                confidence: 0.95,
                normalized_target_path,
                normalized_decl_path,
            };
        }

        if level == ValidationLevel::Smart || level == ValidationLevel::Fuzzy {
            if let Some(result) =
                self.try_smart(target, decl, &normalized_target_path, &normalized_decl_path)
            {
                if level == ValidationLevel::Smart || result.is_owned {
                    return result;
                }
            }
        }
        if level == ValidationLevel::Smart {
            return ValidationResult {
                is_owned: false,
                used_level: ValidationLevel::Smart,
                reason: "no smart-level correspondence found".into(),
                confidence: 0.8,
                normalized_target_path,
                normalized_decl_path,
            };
        }

        // Fuzzy: same filename regardless of directory.
        let fuzzy_owned = file_name(target) == file_name(decl);
        ValidationResult {
            is_owned: fuzzy_owned,
            used_level: ValidationLevel::Fuzzy,
            reason: if fuzzy_owned {
                "same filename, different directory".into()
            } else {
                "filenames differ".into()
            },
            confidence: 0.3,
            normalized_target_path,
            normalized_decl_path,
        }
    }

    fn try_smart(
        &self,
        target: &Path,
        decl: &Path,
        normalized_target_path: &Path,
        normalized_decl_path: &Path,
    ) -> Option<ValidationResult> {
        let make = |owned: bool, reason: &str, confidence: f64| ValidationResult {
            is_owned: owned,
            used_level: ValidationLevel::Smart,
            reason: reason.to_string(),
            confidence,
            normalized_target_path: normalized_target_path.to_path_buf(),
            normalized_decl_path: normalized_decl_path.to_path_buf(),
        };

        if self.matches_exclude(decl) {
            return Some(make(false, "declaration path matches exclude pattern", 0.9));
        }

        if is_corresponding_header_source(target, decl) {
            return Some(make(
                true,
                "corresponding header/source pair by stem",
                0.8,
            ));
        }

        let same_dir = target.parent() == decl.parent();
        let same_name = file_name(target) == file_name(decl);
        if same_dir && same_name {
            return Some(make(true, "same directory and filename", 0.7));
        }

        let similarity = path_similarity(target, decl);
        if similarity > 0.8 {
            return Some(make(
                true,
                "path similarity above threshold",
                similarity * 0.6,
            ));
        }

        None
    }

    fn matches_exclude(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.exclude_patterns.iter().any(|re| re.is_match(&text))
    }
}

fn stem_and_ext(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_string_lossy().to_lowercase();
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    Some((stem, ext))
}

fn is_corresponding_header_source(a: &Path, b: &Path) -> bool {
    let Some((stem_a, ext_a)) = stem_and_ext(a) else {
        return false;
    };
    let Some((stem_b, ext_b)) = stem_and_ext(b) else {
        return false;
    };
    if stem_a != stem_b {
        return false;
    }
    (HEADER_EXTENSIONS.contains(&ext_a.as_str()) && SOURCE_EXTENSIONS.contains(&ext_b.as_str()))
        || (SOURCE_EXTENSIONS.contains(&ext_a.as_str()) && HEADER_EXTENSIONS.contains(&ext_b.as_str()))
}

/// Normalized path similarity in `[0, 1]`, `1.0` meaning identical,
/// derived from Levenshtein edit distance over the path strings.
fn path_similarity(a: &Path, b: &Path) -> f64 {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    let distance = levenshtein(&a, &b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        1.0
    } else {
        1.0 - (distance as f64 / max_len as f64)
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn glob_to_regex(pattern: &str) -> Result<regex::Regex, regex::Error> {
    let mut out = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('$');
    regex::Regex::new(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_match_full_confidence() {
        let v = OwnershipValidator::new(&[]);
        let p = PathBuf::from("/p/src/u.cpp");
        let r = v.validate(&p, &p, ValidationLevel::Strict);
        assert!(r.is_owned);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn smart_level_recognizes_header_source_pair() {
        let v = OwnershipValidator::new(&[]);
        let target = PathBuf::from("/p/src/u.cpp");
        let decl = PathBuf::from("/p/include/u.h");
        let r = v.validate(&target, &decl, ValidationLevel::Smart);
        assert!(r.is_owned);
        assert!((r.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn fuzzy_matches_by_filename_only() {
        let v = OwnershipValidator::new(&[]);
        let target = PathBuf::from("/p/a/u.cpp");
        let decl = PathBuf::from("/other/u.cpp");
        let r = v.validate(&target, &decl, ValidationLevel::Fuzzy);
        assert!(r.is_owned);
        assert_eq!(r.confidence, 0.3);
    }

    #[test]
    fn confidence_decreases_strict_to_canonical_to_smart() {
        let v = OwnershipValidator::new(&[]);
        let target = PathBuf::from("/p/src/u.cpp");
        let decl = PathBuf::from("/p/include/u.h");
        let strict = v.validate(&target, &decl, ValidationLevel::Strict);
        let canonical = v.validate(&target, &decl, ValidationLevel::Canonical);
        let smart = v.validate(&target, &decl, ValidationLevel::Smart);
        assert!(!strict.is_owned);
        assert!(!canonical.is_owned);
        assert!(smart.is_owned);
    }
}
