use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::feedback::WorkingTable;

/// LRU cache of processed uploads keyed by dataset id
pub struct TableCache {
    cache: HashMap<String, Arc<WorkingTable>>,
    max_size: usize,
    access_order: Vec<String>,
    /// Cache statistics
    hits: usize,
    misses: usize,
}

impl TableCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            max_size: max_size.max(1),
            access_order: Vec::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, dataset_id: &str) -> Option<Arc<WorkingTable>> {
        let result = self.cache.get(dataset_id).cloned();

        if result.is_some() {
            self.hits += 1;
            self.touch(dataset_id);
        } else {
            self.misses += 1;
        }

        result
    }

    pub fn put(&mut self, table: Arc<WorkingTable>) {
        let key = table.dataset_id.clone();
        if self.cache.contains_key(&key) {
            self.cache.insert(key.clone(), table);
            self.touch(&key);
            return;
        }

        // Evict least recently used; readers holding the Arc keep their copy
        while self.cache.len() >= self.max_size && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.cache.remove(&oldest);
        }

        self.cache.insert(key.clone(), table);
        self.access_order.push(key);
    }

    fn touch(&mut self, key: &str) {
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.to_string());
    }

    pub fn stats(&self) -> TableCacheStats {
        let total_requests = self.hits + self.misses;
        let hit_rate = if total_requests > 0 {
            self.hits as f32 / total_requests as f32
        } else {
            0.0
        };

        TableCacheStats {
            total_entries: self.cache.len(),
            max_size: self.max_size,
            hits: self.hits,
            misses: self.misses,
            hit_rate,
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.access_order.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCacheStats {
    pub total_entries: usize,
    pub max_size: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f32,
}
