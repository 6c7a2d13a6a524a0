//! FEN 格式解析和生成
//!
//! 国际象棋 FEN 格式：
//! `<棋盘> <走子方> <易位权> <吃过路兵格> <半回合数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1`
//!
//! 省略的尾部字段取默认值：`w - - 0 1`。

use crate::board::{Board, BoardState, CastlingRights};
use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::error::ChessError;
use crate::piece::{Color, Piece, Square};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋盘状态
    pub fn parse(fen: &str) -> Result<BoardState, ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(invalid("Empty FEN string"));
        }
        if parts.len() > 6 {
            return Err(invalid(format!("Expected at most 6 fields, got {}", parts.len())));
        }

        let board = Self::parse_board(parts[0])?;

        let side_to_move = match parts.get(1) {
            Some(field) => parse_color(field)?,
            None => Color::White,
        };

        let castling = match parts.get(2) {
            Some(field) => CastlingRights::from_fen(field)
                .ok_or_else(|| invalid(format!("Invalid castling field: {}", field)))?,
            None => CastlingRights::none(),
        };

        let en_passant = match parts.get(3) {
            Some(&"-") | None => None,
            Some(field) => {
                // 过路兵目标格只可能在第 3 或第 6 横线
                let square = Square::from_algebraic(field)
                    .ok()
                    .filter(|sq| sq.rank == 2 || sq.rank == 5)
                    .ok_or_else(|| invalid(format!("Invalid en passant square: {}", field)))?;
                Some(square)
            }
        };

        let halfmove_clock = match parts.get(4) {
            Some(field) => field
                .parse()
                .map_err(|_| invalid(format!("Invalid halfmove clock: {}", field)))?,
            None => 0,
        };

        let fullmove_number = match parts.get(5) {
            Some(field) => field
                .parse()
                .map_err(|_| invalid(format!("Invalid fullmove number: {}", field)))?,
            None => 1,
        };

        let mut state = BoardState::from_board(board, side_to_move);
        state.castling = castling;
        state.en_passant = en_passant;
        state.halfmove_clock = halfmove_clock;
        state.fullmove_number = fullmove_number;
        Ok(state)
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board, ChessError> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_HEIGHT {
            return Err(invalid(format!("Expected 8 ranks, got {}", rows.len())));
        }

        // FEN 从第 8 行写到第 1 行
        for (row_idx, row) in rows.iter().enumerate() {
            let rank = (BOARD_HEIGHT - 1 - row_idx) as u8;
            let mut file = 0usize;

            for c in row.chars() {
                if let Some(empty_count) = c.to_digit(10) {
                    if !(1..=8).contains(&empty_count) {
                        return Err(invalid(format!("Invalid empty count: {}", c)));
                    }
                    file += empty_count as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if file >= BOARD_WIDTH {
                        return Err(invalid(format!("Rank {} has too many files", rank + 1)));
                    }
                    board.set(Square::new_unchecked(file as u8, rank), Some(piece));
                    file += 1;
                } else {
                    return Err(invalid(format!("Invalid piece character: {}", c)));
                }
            }

            if file != BOARD_WIDTH {
                return Err(invalid(format!(
                    "Rank {} has {} files, expected 8",
                    rank + 1,
                    file
                )));
            }
        }

        Ok(board)
    }

    /// 将棋盘状态转换为 FEN 字符串
    pub fn to_string(state: &BoardState) -> String {
        let en_passant = state
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            Self::board_to_string(&state.board),
            state.side_to_move.to_fen_char(),
            state.castling.to_fen(),
            en_passant,
            state.halfmove_clock,
            state.fullmove_number
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_HEIGHT);

        for rank in (0..BOARD_HEIGHT as u8).rev() {
            let mut row = String::new();
            let mut empty_count = 0;

            for file in 0..BOARD_WIDTH as u8 {
                if let Some(piece) = board.get(Square::new_unchecked(file, rank)) {
                    if empty_count > 0 {
                        row.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                row.push_str(&empty_count.to_string());
            }

            rows.push(row);
        }

        rows.join("/")
    }
}

fn invalid(reason: impl Into<String>) -> ChessError {
    ChessError::InvalidFen {
        reason: reason.into(),
    }
}

fn parse_color(field: &str) -> Result<Color, ChessError> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Color::from_fen_char(c),
        _ => None,
    }
    .ok_or_else(|| invalid(format!("Invalid active color: {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceType;

    #[test]
    fn test_parse_initial_fen() {
        let state = Fen::parse(INITIAL_FEN).unwrap();

        assert_eq!(state.side_to_move, Color::White);
        assert_eq!(state.castling, CastlingRights::all());
        assert_eq!(state.en_passant, None);
        assert_eq!(state, BoardState::initial());

        let king = state.board.get(Square::new_unchecked(4, 0));
        assert_eq!(king, Some(Piece::new(PieceType::King, Color::White)));
        let queen = state.board.get(Square::new_unchecked(3, 7));
        assert_eq!(queen, Some(Piece::new(PieceType::Queen, Color::Black)));
    }

    #[test]
    fn test_fen_roundtrip_corpus() {
        let corpus = [
            INITIAL_FEN,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 12 40",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ];

        for fen in corpus {
            let state = Fen::parse(fen).unwrap();
            assert_eq!(Fen::to_string(&state), fen, "FEN 应能原样还原");
            assert_eq!(state.to_fen(), fen);
        }
    }

    #[test]
    fn test_partial_fen_defaults() {
        let state = Fen::parse("4k3/8/8/8/8/8/8/4K3").unwrap();
        assert_eq!(state.side_to_move, Color::White);
        assert_eq!(state.castling, CastlingRights::none());
        assert_eq!(state.en_passant, None);
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.fullmove_number, 1);

        let state = Fen::parse("4k3/8/8/8/8/8/8/4K3 b").unwrap();
        assert_eq!(state.side_to_move, Color::Black);
        assert_eq!(state.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
    }

    #[test]
    fn test_after_move_fen() {
        let mut state = BoardState::initial();
        assert!(state.make_move(
            Square::from_algebraic("e2").unwrap(),
            Square::from_algebraic("e4").unwrap(),
            None
        ));
        assert_eq!(
            state.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_invalid_fen() {
        // 空字符串
        assert!(Fen::parse("").is_err());
        // 行数不对
        assert!(Fen::parse("8/8/8").is_err());
        // 列数不对
        assert!(Fen::parse("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Fen::parse("4k4/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        assert!(Fen::parse("4k2/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        // 无效字符
        assert!(Fen::parse("4x3/8/8/8/8/8/8/4K3 w - - 0 1").is_err());
        // 无效字段
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w KX - 0 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w - e9 0 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - a 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1 extra").is_err());

        assert!(matches!(
            Fen::parse("8/8/8"),
            Err(ChessError::InvalidFen { .. })
        ));
    }

    #[test]
    fn test_active_color_lowercase_only() {
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 W - - 0 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 B - - 0 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 wb - - 0 1").is_err());
        let state = Fen::parse("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(state.side_to_move, Color::Black);
    }

    #[test]
    fn test_en_passant_rank() {
        let state = Fen::parse("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(state.en_passant, Some(Square::new_unchecked(3, 5)));
        assert!(Fen::parse("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").is_ok());

        // 第 3、6 横线以外的目标格
        assert!(Fen::parse("4k3/8/8/8/4P3/8/8/4K3 b - e4 0 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w - a1 0 1").is_err());
        assert!(Fen::parse("4k3/8/8/8/8/8/8/4K3 w - h8 0 1").is_err());
    }
}
