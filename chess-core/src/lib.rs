//! 国际象棋规则核心库
//!
//! 包含:
//! - 棋子、格子、棋盘等核心数据结构
//! - 可精确撤销的走子 (make / unmake / MoveGuard)
//! - 走法生成和规则验证（易位、吃过路兵、升变）
//! - FEN 格式

mod board;
mod constants;
mod error;
mod fen;
mod moves;
mod piece;

pub use board::{Board, BoardState, CastlingRights, MoveGuard, MoveRecord};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use moves::{Move, MoveGenerator};
pub use piece::{Color, Piece, PieceType, Square};
