use super::ast::Expr;
use super::compiler::FormulaCompiler;
use crate::error::TabulaResult;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::trace;

pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FormulaKey {
    /// Structural (`Debug`) form; the source rendering is not injective
    expression: String,
    columns: Vec<String>,
    row_index: u32,
}

/// Cache of compiled formula text keyed by (expression, column set, row).
///
/// Owned by the caller and shared by reference (or `Arc`) between exports.
/// When full, the whole map is cleared; a miss only costs a recompile.
pub struct FormulaCache {
    entries: DashMap<FormulaKey, Arc<str>>,
    capacity: usize,
    eviction: Mutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for FormulaCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl FormulaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            eviction: Mutex::new(()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Compiled text for `expr` at `row_index`, compiling on a miss.
    pub fn get_or_compile(
        &self,
        expr: &Expr,
        columns: &[String],
        row_index: u32,
    ) -> TabulaResult<Arc<str>> {
        let key = FormulaKey {
            expression: format!("{:?}", expr),
            columns: columns.to_vec(),
            row_index,
        };

        if let Some(found) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(formula = %expr, row = row_index, "formula cache hit");
            return Ok(found.value().clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(formula = %expr, row = row_index, "formula cache miss");
        let compiled: Arc<str> = FormulaCompiler::new(columns, row_index).compile(expr)?.into();

        if self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(key, compiled.clone());
        Ok(compiled)
    }

    fn evict(&self) {
        // Another thread is already evicting; inserting past the cap briefly is fine.
        let Ok(_guard) = self.eviction.try_lock() else {
            return;
        };
        if self.entries.len() >= self.capacity {
            trace!(entries = self.entries.len(), "formula cache full, clearing");
            self.entries.clear();
        }
    }
}
