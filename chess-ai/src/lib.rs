//! 国际象棋 AI 引擎
//!
//! 包含:
//! - 可调权重的棋局评估函数
//! - 迭代加深 Minimax + Alpha-Beta 搜索与静态搜索
//! - 走法排序启发（MVV-LVA、杀手走法、历史表）
//! - Zobrist 哈希与评估缓存
//! - 按对手风格调整评估权重

mod evaluate;
mod heuristics;
mod search;
mod style;
mod transposition;
mod weight_adapter;
mod zobrist;

pub use evaluate::{EvalBreakdown, EvalWeights, Evaluator, WeightKey};
pub use heuristics::{HistoryTable, KillerTable, HISTORY_CAP};
pub use search::{AiConfig, Difficulty, SearchEngine, SearchStats, MATE_SCORE};
pub use style::{StyleCategory, StyleIndicators, StyleScores, STYLE_THRESHOLD};
pub use transposition::{TTEntry, TTStats, TranspositionTable};
pub use weight_adapter::WeightAdapter;
pub use zobrist::ZobristTable;
