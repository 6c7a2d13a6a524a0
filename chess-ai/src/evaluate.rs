//! 棋局评估函数
//!
//! 七个特征分项分别计算后按权重加权求和。权重可由风格适配器在对局间调整，
//! 每个评估器和每次权重修改都会取得一个全局唯一的 `revision`，
//! 供评估缓存判断是否失效（即使整个评估器被替换）。

use std::sync::atomic::{AtomicU64, Ordering};

use chess_core::{
    BoardState, Color, MoveGenerator, PieceType, Square, BOARD_HEIGHT, BOARD_WIDTH,
    CENTER_SQUARES, EXTENDED_CENTER_SQUARES, KING_OFFSETS,
};
use serde::{Deserialize, Serialize};

/// 权重名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKey {
    Material,
    PieceActivity,
    KingSafety,
    CentralControl,
    PawnStructure,
    PieceCoordination,
    Mobility,
    TradePreference,
}

impl WeightKey {
    /// 所有权重名称
    pub const ALL: [WeightKey; 8] = [
        WeightKey::Material,
        WeightKey::PieceActivity,
        WeightKey::KingSafety,
        WeightKey::CentralControl,
        WeightKey::PawnStructure,
        WeightKey::PieceCoordination,
        WeightKey::Mobility,
        WeightKey::TradePreference,
    ];

    /// 可读名称（用于解释文本）
    pub fn label(&self) -> &'static str {
        match self {
            WeightKey::Material => "material",
            WeightKey::PieceActivity => "piece activity",
            WeightKey::KingSafety => "king safety",
            WeightKey::CentralControl => "central control",
            WeightKey::PawnStructure => "pawn structure",
            WeightKey::PieceCoordination => "piece coordination",
            WeightKey::Mobility => "mobility",
            WeightKey::TradePreference => "trade preference",
        }
    }
}

impl std::fmt::Display for WeightKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 评估权重
///
/// `trade_preference` 目前不参与评估求和，只作为风格适配的输出保留。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalWeights {
    pub material: f64,
    pub piece_activity: f64,
    pub king_safety: f64,
    pub central_control: f64,
    pub pawn_structure: f64,
    pub piece_coordination: f64,
    pub mobility: f64,
    pub trade_preference: f64,
}

impl EvalWeights {
    /// 读取单个权重
    pub fn get(&self, key: WeightKey) -> f64 {
        match key {
            WeightKey::Material => self.material,
            WeightKey::PieceActivity => self.piece_activity,
            WeightKey::KingSafety => self.king_safety,
            WeightKey::CentralControl => self.central_control,
            WeightKey::PawnStructure => self.pawn_structure,
            WeightKey::PieceCoordination => self.piece_coordination,
            WeightKey::Mobility => self.mobility,
            WeightKey::TradePreference => self.trade_preference,
        }
    }

    /// 写入单个权重
    pub fn set(&mut self, key: WeightKey, value: f64) {
        let slot = match key {
            WeightKey::Material => &mut self.material,
            WeightKey::PieceActivity => &mut self.piece_activity,
            WeightKey::KingSafety => &mut self.king_safety,
            WeightKey::CentralControl => &mut self.central_control,
            WeightKey::PawnStructure => &mut self.pawn_structure,
            WeightKey::PieceCoordination => &mut self.piece_coordination,
            WeightKey::Mobility => &mut self.mobility,
            WeightKey::TradePreference => &mut self.trade_preference,
        };
        *slot = value;
    }

    /// 按固定顺序遍历 (名称, 值)
    pub fn iter(&self) -> impl Iterator<Item = (WeightKey, f64)> + '_ {
        WeightKey::ALL.iter().map(move |&key| (key, self.get(key)))
    }
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            material: 1.0,
            piece_activity: 0.5,
            king_safety: 0.8,
            central_control: 0.3,
            pawn_structure: 0.4,
            piece_coordination: 0.2,
            mobility: 0.6,
            trade_preference: 0.0,
        }
    }
}

/// 未加权的各项特征分
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalBreakdown {
    pub material: f64,
    pub piece_activity: f64,
    pub king_safety: f64,
    pub central_control: f64,
    pub pawn_structure: f64,
    pub piece_coordination: f64,
    pub mobility: f64,
}

impl EvalBreakdown {
    /// 按权重加权求和
    pub fn weighted(&self, w: &EvalWeights) -> f64 {
        self.material * w.material
            + self.piece_activity * w.piece_activity
            + self.king_safety * w.king_safety
            + self.central_control * w.central_control
            + self.pawn_structure * w.pawn_structure
            + self.piece_coordination * w.piece_coordination
            + self.mobility * w.mobility
    }
}

/// 全局权重版本计数，0 留给空缓存
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// 评估器
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: EvalWeights,
    revision: u64,
}

impl Evaluator {
    /// 使用默认权重创建
    pub fn new() -> Self {
        Self::with_weights(EvalWeights::default())
    }

    /// 使用指定权重创建
    pub fn with_weights(weights: EvalWeights) -> Self {
        Self {
            weights,
            revision: next_revision(),
        }
    }

    /// 当前权重
    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// 整体替换权重
    pub fn set_weights(&mut self, weights: EvalWeights) {
        self.weights = weights;
        self.revision = next_revision();
    }

    /// 逐项加上增量，结果不低于 0
    pub fn update_weights<I>(&mut self, deltas: I)
    where
        I: IntoIterator<Item = (WeightKey, f64)>,
    {
        for (key, delta) in deltas {
            let value = (self.weights.get(key) + delta).max(0.0);
            self.weights.set(key, value);
        }
        self.revision = next_revision();
    }

    /// 权重版本号，不同评估器之间也不会重复
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// 从指定阵营视角评估局面（正数对该阵营有利）
    pub fn evaluate(&self, state: &BoardState, color: Color) -> f64 {
        self.breakdown(state, color).weighted(&self.weights)
    }

    /// 计算未加权的各项特征分
    pub fn breakdown(&self, state: &BoardState, color: Color) -> EvalBreakdown {
        EvalBreakdown {
            material: material(state, color),
            piece_activity: piece_activity(state, color),
            king_safety: king_safety(state, color),
            central_control: central_control(state, color),
            pawn_structure: pawn_structure(state, color),
            piece_coordination: piece_coordination(state, color),
            mobility: mobility(state, color),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// 子力：己方加分，对方减分
fn material(state: &BoardState, color: Color) -> f64 {
    state
        .board
        .all_pieces()
        .iter()
        .map(|(_, piece)| {
            let value = piece.value() as f64;
            if piece.color == color {
                value
            } else {
                -value
            }
        })
        .sum()
}

/// 中心四格上的棋子：己方 +20，对方 -20
fn piece_activity(state: &BoardState, color: Color) -> f64 {
    CENTER_SQUARES
        .iter()
        .filter_map(|&(file, rank)| state.board.get(Square::new_unchecked(file, rank)))
        .map(|piece| if piece.color == color { 20.0 } else { -20.0 })
        .sum()
}

fn king_safety(state: &BoardState, color: Color) -> f64 {
    let Some(king) = state.board.find_king(color) else {
        return 0.0;
    };

    let guards = KING_OFFSETS
        .iter()
        .filter_map(|&(df, dr)| king.offset(df, dr))
        .filter_map(|sq| state.board.get(sq))
        .filter(|piece| piece.color == color)
        .count();

    let mut score = guards as f64 * 15.0;
    if state.board.is_in_check(color) {
        score -= 100.0;
    }
    score
}

/// 只计己方棋子：中心四格 +15，外圈十二格 +8
fn central_control(state: &BoardState, color: Color) -> f64 {
    let count = |squares: &[(u8, u8)]| {
        squares
            .iter()
            .filter_map(|&(file, rank)| state.board.get(Square::new_unchecked(file, rank)))
            .filter(|piece| piece.color == color)
            .count() as f64
    };
    count(&CENTER_SQUARES) * 15.0 + count(&EXTENDED_CENTER_SQUARES) * 8.0
}

fn pawn_structure(state: &BoardState, color: Color) -> f64 {
    let is_pawn = |sq: Square, c: Color| {
        state
            .board
            .get(sq)
            .is_some_and(|p| p.kind == PieceType::Pawn && p.color == c)
    };

    let mut score = 0.0;

    // 叠兵：同一列每多一个兵 -20
    for file in 0..BOARD_WIDTH as u8 {
        let pawns = (0..BOARD_HEIGHT as u8)
            .filter(|&rank| is_pawn(Square::new_unchecked(file, rank), color))
            .count();
        if pawns > 1 {
            score -= 20.0 * (pawns - 1) as f64;
        }
    }

    // 通路兵：前方本列及相邻列都没有敌兵 +30
    let opponent = color.opponent();
    for (sq, piece) in state.board.pieces(color) {
        if piece.kind != PieceType::Pawn {
            continue;
        }
        let ahead: Vec<u8> = match color {
            Color::White => (sq.rank + 1..BOARD_HEIGHT as u8).collect(),
            Color::Black => (0..sq.rank).collect(),
        };
        let blocked = ahead.iter().any(|&rank| {
            (-1i8..=1)
                .filter_map(|df| sq.offset(df, 0))
                .any(|side| is_pawn(Square::new_unchecked(side.file, rank), opponent))
        });
        if !blocked {
            score += 30.0;
        }
    }

    score
}

/// 同一横线上有两个及以上己方车/后 +15
fn piece_coordination(state: &BoardState, color: Color) -> f64 {
    (0..BOARD_HEIGHT as u8)
        .filter(|&rank| {
            (0..BOARD_WIDTH as u8)
                .filter_map(|file| state.board.get(Square::new_unchecked(file, rank)))
                .filter(|p| {
                    p.color == color && matches!(p.kind, PieceType::Rook | PieceType::Queen)
                })
                .count()
                >= 2
        })
        .count() as f64
        * 15.0
}

/// 每个合法走法 +2
fn mobility(state: &BoardState, color: Color) -> f64 {
    MoveGenerator::generate_legal(state, color).len() as f64 * 2.0
}
