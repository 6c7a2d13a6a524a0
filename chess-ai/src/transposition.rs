//! 评估缓存
//!
//! 固定槽位的置换表，缓存静态评估结果。键为 Zobrist 哈希（已混入评估视角），
//! 新条目总是覆盖旧条目。评估权重变化后整表失效。

/// 缓存条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTEntry {
    /// 完整哈希（用于验证）
    pub key: u64,
    /// 静态评估分
    pub score: f64,
}

/// 评估缓存表
pub struct TranspositionTable {
    /// 条目数组
    entries: Vec<Option<TTEntry>>,
    /// 写入条目时的权重版本
    revision: u64,
    /// 命中次数
    hits: u64,
    /// 查询次数
    probes: u64,
}

impl TranspositionTable {
    /// 创建指定条目数的缓存，容量为 0 时不缓存任何内容
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
            revision: 0,
            hits: 0,
            probes: 0,
        }
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// 计算索引
    #[inline]
    fn index(&self, hash: u64) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some((hash % self.entries.len() as u64) as usize)
        }
    }

    /// 权重版本变化时清空缓存
    pub fn sync_revision(&mut self, revision: u64) {
        if self.revision != revision {
            self.entries.fill(None);
            self.revision = revision;
        }
    }

    /// 查询缓存
    pub fn probe(&mut self, hash: u64) -> Option<f64> {
        self.probes += 1;

        let entry = self.index(hash).and_then(|i| self.entries[i])?;
        if entry.key == hash {
            self.hits += 1;
            Some(entry.score)
        } else {
            None
        }
    }

    /// 存储条目（总是覆盖）
    pub fn store(&mut self, hash: u64, score: f64) {
        if let Some(index) = self.index(hash) {
            self.entries[index] = Some(TTEntry { key: hash, score });
        }
    }

    /// 清空表
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.hits = 0;
        self.probes = 0;
    }

    /// 获取命中率
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    /// 获取统计信息
    pub fn stats(&self) -> TTStats {
        TTStats {
            entries: self.entries.len(),
            used: self.entries.iter().filter(|e| e.is_some()).count(),
            hits: self.hits,
            probes: self.probes,
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone)]
pub struct TTStats {
    pub entries: usize,
    pub used: usize,
    pub hits: u64,
    pub probes: u64,
}

impl TTStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }

    pub fn usage(&self) -> f64 {
        if self.entries == 0 {
            0.0
        } else {
            self.used as f64 / self.entries as f64
        }
    }
}
