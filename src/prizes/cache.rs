use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::draws::models::{DrawId, GameType, PrizeTableEntry};

/// A draw's prize table indexed by category code
pub type PrizeTable = HashMap<&'static str, PrizeTableEntry>;

/// Prize table cache key: (game, normalized draw id, draw year)
type CacheKey = (GameType, DrawId, i32);

/// Prize tables already read during one reconciliation run.
///
/// Owned by the run that created it and dropped with it.
pub struct PrizeCache {
    tables: RwLock<HashMap<CacheKey, Arc<PrizeTable>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PrizeCache {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, game: GameType, draw_id: &DrawId, year: i32) -> Option<Arc<PrizeTable>> {
        let tables = self.tables.read().await;
        match tables.get(&(game, draw_id.clone(), year)) {
            Some(table) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✓ Prize cache hit: {} draw {}", game, draw_id);
                Some(table.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Index and store a table; an empty table is cached too
    pub async fn insert(
        &self,
        game: GameType,
        draw_id: &DrawId,
        year: i32,
        entries: Vec<PrizeTableEntry>,
    ) -> Arc<PrizeTable> {
        let table: PrizeTable = entries
            .into_iter()
            .map(|e| (e.category.code(), e))
            .collect();
        let table = Arc::new(table);

        let mut tables = self.tables.write().await;
        tables.insert((game, draw_id.clone(), year), table.clone());
        debug!("💾 Cached prize table: {} draw {} ({} entries)", game, draw_id, table.len());
        table
    }

    /// Drop a table after its entries changed in the store
    pub async fn invalidate(&self, game: GameType, draw_id: &DrawId, year: i32) {
        let mut tables = self.tables.write().await;
        if tables.remove(&(game, draw_id.clone(), year)).is_some() {
            debug!("🔄 Prize cache invalidated: {} draw {}", game, draw_id);
        }
    }

    pub async fn size(&self) -> usize {
        self.tables.read().await.len()
    }

    /// (hits, misses) so far
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

impl Default for PrizeCache {
    fn default() -> Self {
        Self::new()
    }
}
