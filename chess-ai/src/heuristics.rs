//! 走法排序启发
//!
//! - 杀手走法：每个剩余深度保留两个最近造成剪枝的走法（含吃子）
//! - 历史表：64x64 固定数组，按 (from, to) 累加剪枝深度，超过上限时整体减半

use chess_core::{Move, SQUARE_COUNT};

/// 历史分上限，任一条目超过后整表减半
pub const HISTORY_CAP: u32 = 1 << 14;

/// 每个深度的杀手走法槽位数
const KILLER_SLOTS: usize = 2;

/// 杀手走法表
#[derive(Debug, Clone, Default)]
pub struct KillerTable {
    slots: Vec<[Option<Move>; KILLER_SLOTS]>,
}

impl KillerTable {
    /// 为至多 `max_depth` 的剩余深度预留槽位
    pub fn new(max_depth: u32) -> Self {
        Self {
            slots: vec![[None; KILLER_SLOTS]; max_depth as usize + 1],
        }
    }

    /// 记录造成剪枝的走法，最新的放在第一格
    pub fn record(&mut self, depth: u32, mv: Move) {
        let depth = depth as usize;
        if depth >= self.slots.len() {
            self.slots.resize(depth + 1, [None; KILLER_SLOTS]);
        }
        let slot = &mut self.slots[depth];
        if slot[0] == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }

    /// 是否为该深度的杀手走法
    pub fn is_killer(&self, depth: u32, mv: Move) -> bool {
        self.slots
            .get(depth as usize)
            .is_some_and(|slot| slot.contains(&Some(mv)))
    }

    /// 清空
    pub fn clear(&mut self) {
        self.slots.fill([None; KILLER_SLOTS]);
    }
}

/// 历史表
#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: Box<[[u32; SQUARE_COUNT]; SQUARE_COUNT]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            scores: Box::new([[0; SQUARE_COUNT]; SQUARE_COUNT]),
        }
    }

    /// 按剪枝深度累加
    pub fn record(&mut self, mv: Move, depth: u32) {
        let entry = &mut self.scores[mv.from.to_index()][mv.to.to_index()];
        *entry = entry.saturating_add(depth);
        if *entry > HISTORY_CAP {
            self.age();
        }
    }

    /// 历史分
    pub fn score(&self, mv: Move) -> u32 {
        self.scores[mv.from.to_index()][mv.to.to_index()]
    }

    /// 整表减半
    pub fn age(&mut self) {
        for row in self.scores.iter_mut() {
            for entry in row.iter_mut() {
                *entry /= 2;
            }
        }
    }

    /// 清空
    pub fn clear(&mut self) {
        for row in self.scores.iter_mut() {
            row.fill(0);
        }
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Square;

    fn mv(from: &str, to: &str) -> Move {
        Move::new(
            Square::from_algebraic(from).unwrap(),
            Square::from_algebraic(to).unwrap(),
        )
    }

    #[test]
    fn test_killer_two_slots() {
        let mut killers = KillerTable::new(4);
        killers.record(2, mv("e2", "e4"));
        killers.record(2, mv("d2", "d4"));
        killers.record(2, mv("g1", "f3"));

        assert!(killers.is_killer(2, mv("g1", "f3")));
        assert!(killers.is_killer(2, mv("d2", "d4")));
        assert!(!killers.is_killer(2, mv("e2", "e4")), "最旧的杀手走法应被挤出");
        assert!(!killers.is_killer(3, mv("g1", "f3")), "杀手走法按深度区分");
    }

    #[test]
    fn test_killer_no_duplicate() {
        let mut killers = KillerTable::new(2);
        killers.record(1, mv("e2", "e4"));
        killers.record(1, mv("d2", "d4"));
        killers.record(1, mv("d2", "d4"));
        assert!(killers.is_killer(1, mv("e2", "e4")));
    }

    #[test]
    fn test_killer_grows_and_clears() {
        let mut killers = KillerTable::new(1);
        killers.record(7, mv("a2", "a3"));
        assert!(killers.is_killer(7, mv("a2", "a3")));
        killers.clear();
        assert!(!killers.is_killer(7, mv("a2", "a3")));
    }

    #[test]
    fn test_history_accumulates_and_ages() {
        let mut history = HistoryTable::new();
        let m = mv("e2", "e4");
        history.record(m, 3);
        history.record(m, 4);
        assert_eq!(history.score(m), 7);

        let other = mv("d2", "d4");
        history.record(other, 10);
        history.record(m, HISTORY_CAP);
        // 超过上限后整表减半
        assert_eq!(history.score(other), 5);
        assert_eq!(history.score(m), (7 + HISTORY_CAP) / 2);
        assert!(history.score(m) <= HISTORY_CAP);

        history.clear();
        assert_eq!(history.score(m), 0);
    }
}
