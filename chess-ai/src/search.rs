//! 搜索引擎
//!
//! 实现迭代加深 + Minimax + Alpha-Beta 剪枝 + 静态搜索。
//!
//! 分数始终站在根节点走子方的角度：极大层为根方，极小层为对方。
//! 叶子处用当前走子方视角的评估，极小层取反。

use std::time::Instant;

use chess_core::{BoardState, Color, Move, MoveGenerator, PieceType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::evaluate::Evaluator;
use crate::heuristics::{HistoryTable, KillerTable};
use crate::transposition::TranspositionTable;
use crate::zobrist::ZobristTable;

/// 将死分值（有限值，避免无穷参与运算）
pub const MATE_SCORE: f64 = 1.0e9;

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// AI 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// 迭代加深的最大深度
    pub max_depth: u32,
    /// 单次搜索的节点上限
    pub max_nodes: u64,
    /// 静态搜索额外层数
    pub quiescence_depth: u32,
    /// 完成一层后最佳分超过该值即停止加深
    pub decisive_score: f64,
    /// 评估缓存条目数
    pub tt_entries: usize,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                max_depth: 2,
                max_nodes: 10_000,
                ..Self::base()
            },
            Difficulty::Medium => Self::base(),
            Difficulty::Hard => Self {
                max_depth: 5,
                max_nodes: 200_000,
                tt_entries: 1 << 18,
                ..Self::base()
            },
        }
    }

    fn base() -> Self {
        Self {
            max_depth: 4,
            max_nodes: 50_000,
            quiescence_depth: 3,
            decisive_score: 1000.0,
            tt_entries: 1 << 16,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

/// 最近一次搜索的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStats {
    /// 访问的节点数（含静态搜索）
    pub nodes: u64,
    /// 完整完成的最深一层
    pub depth_reached: u32,
    /// 该层的最佳分
    pub best_score: Option<f64>,
    /// 评估缓存命中率
    pub tt_hit_rate: f64,
    /// 耗时
    pub elapsed_ms: u64,
}

/// 搜索引擎
pub struct SearchEngine {
    config: AiConfig,
    evaluator: Evaluator,
    killers: KillerTable,
    history: HistoryTable,
    tt: TranspositionTable,
    zobrist: ZobristTable,
    nodes_searched: u64,
    stats: SearchStats,
}

impl SearchEngine {
    /// 创建新的搜索引擎
    pub fn new(evaluator: Evaluator, config: AiConfig) -> Self {
        Self {
            killers: KillerTable::new(config.max_depth),
            history: HistoryTable::new(),
            tt: TranspositionTable::new(config.tt_entries),
            zobrist: ZobristTable::new(),
            config,
            evaluator,
            nodes_searched: 0,
            stats: SearchStats::default(),
        }
    }

    /// 从难度创建（默认权重）
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::new(Evaluator::new(), AiConfig::from_difficulty(difficulty))
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 设置最大搜索深度（至少为 1）
    pub fn set_max_depth(&mut self, depth: u32) {
        self.config.max_depth = depth.max(1);
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// 可变访问评估器（调整权重会使评估缓存在下次使用时失效）
    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// 获取最近一次搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// 获取最近一次搜索的统计
    pub fn last_stats(&self) -> &SearchStats {
        &self.stats
    }

    /// 清空杀手表、历史表和评估缓存
    pub fn clear_heuristics(&mut self) {
        self.killers.clear();
        self.history.clear();
        self.tt.clear();
    }

    /// 搜索最佳走法
    ///
    /// 返回 `None` 表示无合法走法（由调用方用 `is_in_check` 区分将死与逼和），
    /// 或 `color` 不是当前走子方。搜索结束后局面与调用前完全一致。
    pub fn find_best_move(&mut self, state: &mut BoardState, color: Color) -> Option<Move> {
        let start = Instant::now();
        self.nodes_searched = 0;
        self.stats = SearchStats::default();

        if state.side_to_move != color {
            warn!(
                "Search requested for {} but {} is to move",
                color, state.side_to_move
            );
            return None;
        }

        let moves = MoveGenerator::generate_legal(state, color);
        if moves.is_empty() {
            return None;
        }

        // 只有一个走法，直接返回
        if moves.len() == 1 {
            return Some(moves[0]);
        }

        let mut ordered = self.order_moves(state, moves, color, None);
        let mut completed: Option<(Move, f64)> = None;

        for depth in 1..=self.config.max_depth {
            let mut alpha = f64::NEG_INFINITY;
            let beta = f64::INFINITY;
            let mut depth_best: Option<(Move, f64)> = None;
            let mut aborted = false;

            for &mv in &ordered {
                if self.budget_exhausted() {
                    aborted = true;
                    break;
                }

                let Some(mut child) = state.play(mv) else {
                    continue;
                };
                let score =
                    self.minimax(&mut child, depth - 1, alpha, beta, color.opponent(), false);
                drop(child);

                if depth_best.map_or(true, |(_, best)| score > best) {
                    depth_best = Some((mv, score));
                    alpha = alpha.max(score);
                }

                if self.budget_exhausted() {
                    aborted = true;
                    break;
                }
            }

            if aborted {
                debug!(
                    "Node budget exhausted at depth {} after {} nodes",
                    depth, self.nodes_searched
                );
                if completed.is_none() {
                    completed = depth_best;
                }
                break;
            }

            let Some((best_move, best_score)) = depth_best else {
                break;
            };
            completed = Some((best_move, best_score));
            self.stats.depth_reached = depth;
            self.stats.best_score = Some(best_score);
            debug!(
                "Depth {} complete: best {} score {:.1} nodes {}",
                depth, best_move, best_score, self.nodes_searched
            );

            // 上一层的最佳走法下一层最先搜索
            if let Some(pos) = ordered.iter().position(|m| *m == best_move) {
                let mv = ordered.remove(pos);
                ordered.insert(0, mv);
            }

            if best_score > self.config.decisive_score {
                break;
            }
        }

        self.stats.nodes = self.nodes_searched;
        self.stats.tt_hit_rate = self.tt.hit_rate();
        self.stats.elapsed_ms = start.elapsed().as_millis() as u64;

        completed.map(|(mv, _)| mv).or_else(|| ordered.first().copied())
    }

    /// Minimax + Alpha-Beta
    fn minimax(
        &mut self,
        state: &mut BoardState,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        color: Color,
        maximizing: bool,
    ) -> f64 {
        self.nodes_searched += 1;

        // 节点用尽：返回当前静态评估
        if self.budget_exhausted() {
            return self.leaf_score(state, color, maximizing);
        }

        let moves = MoveGenerator::generate_legal(state, color);
        if moves.is_empty() {
            if state.is_in_check(color) {
                return if maximizing { -MATE_SCORE } else { MATE_SCORE };
            }
            return 0.0;
        }

        if depth == 0 {
            let remaining = self.config.quiescence_depth;
            return self.quiescence(state, alpha, beta, color, maximizing, remaining);
        }

        let ordered = self.order_moves(state, moves, color, Some(depth));

        if maximizing {
            let mut best = f64::NEG_INFINITY;
            for mv in ordered {
                let Some(mut child) = state.play(mv) else {
                    continue;
                };
                let score = self.minimax(&mut child, depth - 1, alpha, beta, color.opponent(), false);
                drop(child);

                best = best.max(score);
                alpha = alpha.max(score);
                if beta <= alpha {
                    self.record_cutoff(mv, depth);
                    break;
                }
            }
            best
        } else {
            let mut best = f64::INFINITY;
            for mv in ordered {
                let Some(mut child) = state.play(mv) else {
                    continue;
                };
                let score = self.minimax(&mut child, depth - 1, alpha, beta, color.opponent(), true);
                drop(child);

                best = best.min(score);
                beta = beta.min(score);
                if beta <= alpha {
                    self.record_cutoff(mv, depth);
                    break;
                }
            }
            best
        }
    }

    /// 静态搜索（只搜索吃子走法）
    fn quiescence(
        &mut self,
        state: &mut BoardState,
        mut alpha: f64,
        mut beta: f64,
        color: Color,
        maximizing: bool,
        remaining: u32,
    ) -> f64 {
        self.nodes_searched += 1;

        let stand_pat = self.leaf_score(state, color, maximizing);
        if maximizing {
            if stand_pat >= beta {
                return beta;
            }
            alpha = alpha.max(stand_pat);
        } else {
            if stand_pat <= alpha {
                return alpha;
            }
            beta = beta.min(stand_pat);
        }

        if remaining == 0 || self.budget_exhausted() {
            return stand_pat;
        }

        let captures: Vec<Move> = MoveGenerator::generate_legal(state, color)
            .into_iter()
            .filter(Move::is_capture)
            .collect();
        if captures.is_empty() {
            return stand_pat;
        }

        let mut score = stand_pat;
        for mv in self.order_moves(state, captures, color, None) {
            let Some(mut child) = state.play(mv) else {
                continue;
            };
            let child_score = self.quiescence(
                &mut child,
                alpha,
                beta,
                color.opponent(),
                !maximizing,
                remaining - 1,
            );
            drop(child);

            if maximizing {
                score = score.max(child_score);
                alpha = alpha.max(score);
            } else {
                score = score.min(child_score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        score
    }

    /// 走法排序：吃子（MVV-LVA）> 杀手 > 历史 > 进入中心 > 兵前进，稳定降序
    fn order_moves(
        &self,
        state: &BoardState,
        moves: Vec<Move>,
        color: Color,
        depth: Option<u32>,
    ) -> Vec<Move> {
        let mut scored: Vec<(i64, Move)> = moves
            .into_iter()
            .map(|mv| (self.move_score(state, mv, color, depth), mv))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }

    fn move_score(&self, state: &BoardState, mv: Move, color: Color, depth: Option<u32>) -> i64 {
        let mut score = 0i64;
        let mover = state.get(mv.from);

        if let (Some(victim), Some(attacker)) = (mv.captured, mover) {
            score += 10_000 + (victim.value() - attacker.value()) as i64;
        }

        if depth.is_some_and(|d| self.killers.is_killer(d, mv)) {
            score += 1000;
        }

        score += self.history.score(mv) as i64 * 100;

        if mv.to.is_center() {
            score += 50;
        }

        if let Some(piece) = mover {
            let advance = mv.to.rank as i8 - mv.from.rank as i8;
            if piece.kind == PieceType::Pawn && advance.signum() == color.forward() {
                score += 10;
            }
        }

        score
    }

    fn record_cutoff(&mut self, mv: Move, depth: u32) {
        self.killers.record(depth, mv);
        self.history.record(mv, depth);
    }

    fn budget_exhausted(&self) -> bool {
        self.nodes_searched >= self.config.max_nodes
    }

    /// 叶子分：当前走子方视角的评估，极小层取反
    fn leaf_score(&mut self, state: &BoardState, color: Color, maximizing: bool) -> f64 {
        let score = self.static_eval(state, color);
        if maximizing {
            score
        } else {
            -score
        }
    }

    /// 经评估缓存的静态评估
    fn static_eval(&mut self, state: &BoardState, color: Color) -> f64 {
        self.tt.sync_revision(self.evaluator.revision());

        let key = self.zobrist.hash_for(state, color);
        if let Some(score) = self.tt.probe(key) {
            return score;
        }

        let score = self.evaluator.evaluate(state, color);
        self.tt.store(key, score);
        score
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(Evaluator::new(), AiConfig::default())
    }
}
