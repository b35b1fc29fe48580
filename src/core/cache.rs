//! Content-hash- and mtime-keyed AST cache with LRU eviction and a
//! memory ceiling.
//!
//! One mutex guards the whole map. Parse time dominates over the
//! contention of a single lock, so a sharded cache was not worth the
//! complexity for this workload.

use crate::core::ast::AstNode;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

#[derive(Clone)]
struct CacheEntry {
    mtime: SystemTime,
    size: u64,
    content_hash: String,
    node: Arc<AstNode>,
    dependencies: Vec<PathBuf>,
    dependencies_last_check: SystemTime,
    access_count: u64,
    last_access: Instant,
    estimated_bytes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entry_count: usize,
    pub estimated_memory_bytes: usize,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            1.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn human_readable(&self) -> String {
        format!(
            "entries={} hits={} misses={} hit_ratio={:.1}% memory={}KB evictions={}",
            self.entry_count,
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.estimated_memory_bytes / 1024,
            self.evictions
        )
    }
}

pub struct AstCacheConfig {
    pub max_entries: usize,
    pub memory_ceiling_bytes: usize,
}

impl Default for AstCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            memory_ceiling_bytes: 512 * 1024 * 1024,
        }
    }
}

struct Inner {
    entries: HashMap<PathBuf, CacheEntry>,
    current_memory: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Thread-safe AST cache, keyed by canonical file path.
pub struct AstCache {
    inner: Mutex<Inner>,
    config: AstCacheConfig,
}

impl AstCache {
    pub fn new(config: AstCacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                current_memory: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            config,
        }
    }

    /// Looks up a cached parse for `path`. Returns `None` on a cache miss,
    /// which includes: absent entry, stale mtime/size/content-hash, or a
    /// dependency modified after the entry's last dependency check.
    pub fn get(&self, path: &Path, current_content: &str) -> Option<Arc<AstNode>> {
        let metadata = std::fs::metadata(path).ok()?;
        let mtime = metadata.modified().ok()?;
        let size = metadata.len();

        let mut inner = self.inner.lock();
        let stale = {
            let entry = inner.entries.get(path)?;
            entry.mtime != mtime
                || entry.size != size
                || entry.content_hash != Self::hash_content(current_content)
                || Self::any_dependency_newer(&entry.dependencies, entry.dependencies_last_check)
        };

        if stale {
            if let Some(entry) = inner.entries.remove(path) {
                inner.current_memory = inner.current_memory.saturating_sub(entry.estimated_bytes);
            }
            inner.misses += 1;
            return None;
        }

        inner.hits += 1;
        let entry = inner.entries.get_mut(path).expect("checked present above");
        entry.access_count += 1;
        entry.last_access = Instant::now();
        Some(entry.node.clone())
    }

    /// Inserts a freshly parsed AST, evicting LRU entries as needed to
    /// respect both the entry-count ceiling and the memory ceiling.
    pub fn insert(
        &self,
        path: PathBuf,
        content: &str,
        node: Arc<AstNode>,
        dependencies: Vec<PathBuf>,
    ) {
        let Ok(metadata) = std::fs::metadata(&path) else {
            return;
        };
        let Ok(mtime) = metadata.modified() else {
            return;
        };
        let size = metadata.len();
        let estimated_bytes = node.estimated_size() + path.as_os_str().len();

        let mut inner = self.inner.lock();

        if let Some(old) = inner.entries.remove(&path) {
            inner.current_memory = inner.current_memory.saturating_sub(old.estimated_bytes);
        }

        while inner.entries.len() >= self.config.max_entries {
            if !Self::evict_lru(&mut inner) {
                break;
            }
        }
        while inner.current_memory + estimated_bytes > self.config.memory_ceiling_bytes
            && !inner.entries.is_empty()
        {
            if !Self::evict_lru(&mut inner) {
                break;
            }
        }

        inner.current_memory += estimated_bytes;
        inner.entries.insert(
            path,
            CacheEntry {
                mtime,
                size,
                content_hash: Self::hash_content(content),
                node,
                dependencies,
                dependencies_last_check: SystemTime::now(),
                access_count: 0,
                last_access: Instant::now(),
                estimated_bytes,
            },
        );
    }

    fn evict_lru(inner: &mut Inner) -> bool {
        let Some(oldest_path) = inner
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(p, _)| p.clone())
        else {
            return false;
        };
        if let Some(entry) = inner.entries.remove(&oldest_path) {
            inner.current_memory = inner.current_memory.saturating_sub(entry.estimated_bytes);
            inner.evictions += 1;
        }
        true
    }

    fn any_dependency_newer(deps: &[PathBuf], since: SystemTime) -> bool {
        deps.iter().any(|d| {
            std::fs::metadata(d)
                .and_then(|m| m.modified())
                .map(|m| m > since)
                .unwrap_or(false)
        })
    }

    fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entry_count: inner.entries.len(),
            estimated_memory_bytes: inner.current_memory,
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.current_memory = 0;
    }
}

/// Scans source text for `#include "..."` and `#include <...>` directives
/// and resolves them against `search_dirs`, returning only paths that
/// exist on disk. Used as the default dependency list when the caller
/// does not supply one explicitly.
pub fn scan_include_dependencies(content: &str, base_dir: &Path, search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut deps = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with("#include") {
            continue;
        }
        let rest = trimmed["#include".len()..].trim();
        let name = if let Some(stripped) = rest.strip_prefix('"') {
            stripped.split('"').next()
        } else if let Some(stripped) = rest.strip_prefix('<') {
            stripped.split('>').next()
        } else {
            None
        };
        let Some(name) = name else { continue };

        let mut candidates = vec![base_dir.join(name)];
        candidates.extend(search_dirs.iter().map(|d| d.join(name)));
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            deps.push(found);
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::NodeKind;
    use crate::core::types::SourceLocation;
    use tempfile::NamedTempFile;

    fn dummy_node() -> Arc<AstNode> {
        Arc::new(AstNode::leaf(
            NodeKind::Function,
            "f",
            SourceLocation::new(PathBuf::from("x.cpp"), 1, 1),
        ))
    }

    #[test]
    fn miss_on_absent_entry() {
        let cache = AstCache::new(AstCacheConfig::default());
        let file = NamedTempFile::new().unwrap();
        assert!(cache.get(file.path(), "content").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn hit_after_insert_with_unchanged_content() {
        let cache = AstCache::new(AstCacheConfig::default());
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "int main() {}").unwrap();

        cache.insert(
            file.path().to_path_buf(),
            "int main() {}",
            dummy_node(),
            vec![],
        );
        assert!(cache.get(file.path(), "int main() {}").is_some());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn miss_when_content_hash_changes() {
        let cache = AstCache::new(AstCacheConfig::default());
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "int main() {}").unwrap();

        cache.insert(
            file.path().to_path_buf(),
            "int main() {}",
            dummy_node(),
            vec![],
        );
        std::fs::write(file.path(), "int main() { return 1; }").unwrap();
        assert!(cache
            .get(file.path(), "int main() { return 1; }")
            .is_none());
    }

    #[test]
    fn evicts_lru_at_entry_ceiling() {
        let cache = AstCache::new(AstCacheConfig {
            max_entries: 1,
            memory_ceiling_bytes: usize::MAX,
        });
        let f1 = NamedTempFile::new().unwrap();
        let f2 = NamedTempFile::new().unwrap();
        std::fs::write(f1.path(), "a").unwrap();
        std::fs::write(f2.path(), "b").unwrap();

        cache.insert(f1.path().to_path_buf(), "a", dummy_node(), vec![]);
        cache.insert(f2.path().to_path_buf(), "b", dummy_node(), vec![]);

        assert!(cache.get(f1.path(), "a").is_none());
        assert!(cache.get(f2.path(), "b").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }
}
