//! 棋子与格子定义

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, CENTER_SQUARES};
use crate::error::ChessError;

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    /// 兵
    Pawn,
    /// 马
    Knight,
    /// 象
    Bishop,
    /// 车
    Rook,
    /// 后
    Queen,
    /// 王
    King,
}

impl PieceType {
    /// 获取棋子的基础分值（厘兵）
    pub fn value(&self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            PieceType::King => 20000,
        }
    }

    /// 数组索引
    pub fn index(&self) -> usize {
        match self {
            PieceType::Pawn => 0,
            PieceType::Knight => 1,
            PieceType::Bishop => 2,
            PieceType::Rook => 3,
            PieceType::Queen => 4,
            PieceType::King => 5,
        }
    }

    /// 兵可以升变成的类型
    pub fn is_promotion_target(&self) -> bool {
        matches!(
            self,
            PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen
        )
    }

    /// 获取 FEN 字符（白方大写，黑方小写）
    pub fn to_fen_char(&self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceType, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((kind, color))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// 白方（先手，在下方）
    White,
    /// 黑方（后手，在上方）
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 兵前进方向（rank 增量）
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// 底线（王和车的初始行）
    pub fn home_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// 兵的初始行
    pub fn pawn_rank(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// 兵的升变行
    pub fn promotion_rank(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// 数组索引
    pub fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// 从 FEN 字符解析，只接受小写
    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    /// 创建新棋子
    pub fn new(kind: PieceType, color: Color) -> Self {
        Self { kind, color }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.kind.to_fen_char(self.color)
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceType::from_fen_char(c).map(|(kind, color)| Piece { kind, color })
    }

    /// 获取棋子分值
    pub fn value(&self) -> i32 {
        self.kind.value()
    }
}

/// 棋盘格子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    /// 列 (0-7，对应 a-h)
    pub file: u8,
    /// 行 (0-7，对应 1-8)
    pub rank: u8,
}

impl Square {
    /// 创建新格子
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if (file as usize) < BOARD_WIDTH && (rank as usize) < BOARD_HEIGHT {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// 创建新格子（不检查边界，内部使用）
    pub const fn new_unchecked(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// 检查格子是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.file as usize) < BOARD_WIDTH && (self.rank as usize) < BOARD_HEIGHT
    }

    /// 是否为中心四格之一
    pub fn is_center(&self) -> bool {
        CENTER_SQUARES.contains(&(self.file, self.rank))
    }

    /// 获取偏移后的格子
    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file as i8 + df;
        let rank = self.rank as i8 + dr;
        if file >= 0 && (file as usize) < BOARD_WIDTH && rank >= 0 && (rank as usize) < BOARD_HEIGHT {
            Some(Square {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.rank as usize * BOARD_WIDTH + self.file as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_WIDTH * BOARD_HEIGHT {
            Some(Square {
                file: (index % BOARD_WIDTH) as u8,
                rank: (index / BOARD_WIDTH) as u8,
            })
        } else {
            None
        }
    }

    /// 遍历所有格子（a1, b1, ..., h8）
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_WIDTH * BOARD_HEIGHT).map(|i| Square {
            file: (i % BOARD_WIDTH) as u8,
            rank: (i / BOARD_WIDTH) as u8,
        })
    }

    /// 从代数记法解析（如 "e4"）
    pub fn from_algebraic(s: &str) -> Result<Square, ChessError> {
        let invalid = || ChessError::InvalidSquare {
            notation: s.to_string(),
        };
        let mut chars = s.chars();
        let (Some(f), Some(r), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        if !('a'..='h').contains(&f) || !('1'..='8').contains(&r) {
            return Err(invalid());
        }
        Ok(Square::new_unchecked(f as u8 - b'a', r as u8 - b'1'))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl std::str::FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_fen_char() {
        let white_king = Piece::new(PieceType::King, Color::White);
        assert_eq!(white_king.to_fen_char(), 'K');

        let black_knight = Piece::new(PieceType::Knight, Color::Black);
        assert_eq!(black_knight.to_fen_char(), 'n');

        assert_eq!(
            Piece::from_fen_char('R'),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert_eq!(
            Piece::from_fen_char('q'),
            Some(Piece::new(PieceType::Queen, Color::Black))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(PieceType::Pawn.value(), 100);
        assert_eq!(PieceType::Knight.value(), 320);
        assert_eq!(PieceType::Bishop.value(), 330);
        assert_eq!(PieceType::Rook.value(), 500);
        assert_eq!(PieceType::Queen.value(), 900);
        assert_eq!(PieceType::King.value(), 20000);
    }

    #[test]
    fn test_square_valid() {
        assert!(Square::new(0, 0).is_some());
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
    }

    #[test]
    fn test_square_algebraic() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(e4, Square::new_unchecked(4, 3));
        assert_eq!(e4.to_string(), "e4");
        assert_eq!(Square::from_algebraic("a1").unwrap(), Square::new_unchecked(0, 0));
        assert_eq!(Square::from_algebraic("h8").unwrap(), Square::new_unchecked(7, 7));

        assert!(Square::from_algebraic("i1").is_err());
        assert!(Square::from_algebraic("a9").is_err());
        assert!(Square::from_algebraic("e44").is_err());
        assert!(Square::from_algebraic("").is_err());
    }

    #[test]
    fn test_square_index_roundtrip() {
        for sq in Square::all() {
            assert_eq!(Square::from_index(sq.to_index()), Some(sq));
        }
        assert_eq!(Square::all().count(), 64);
        assert!(Square::from_index(64).is_none());
    }

    #[test]
    fn test_square_offset() {
        let a1 = Square::new_unchecked(0, 0);
        assert_eq!(a1.offset(1, 2), Some(Square::new_unchecked(1, 2)));
        assert_eq!(a1.offset(-1, 0), None);
        assert_eq!(Square::new_unchecked(7, 7).offset(0, 1), None);
    }

    #[test]
    fn test_center_squares() {
        assert!(Square::from_algebraic("d4").unwrap().is_center());
        assert!(Square::from_algebraic("e5").unwrap().is_center());
        assert!(!Square::from_algebraic("c4").unwrap().is_center());
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::White.forward(), 1);
        assert_eq!(Color::Black.forward(), -1);
    }

    #[test]
    fn test_color_fen_char() {
        assert_eq!(Color::from_fen_char('w'), Some(Color::White));
        assert_eq!(Color::from_fen_char('b'), Some(Color::Black));
        assert_eq!(Color::from_fen_char('W'), None, "行棋方只接受小写");
        assert_eq!(Color::from_fen_char('x'), None);
        assert_eq!(Color::Black.to_fen_char(), 'b');
    }
}
