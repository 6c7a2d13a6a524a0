//! 棋盘状态
//!
//! `Board` 只保存 8x8 的棋子布局；`BoardState` 在此基础上加入走子方、
//! 易位权、吃过路兵目标格、步数计数和走法历史，并提供可精确撤销的
//! `make_move` / `unmake_move`。

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, KINGSIDE_KING_FILE, QUEENSIDE_KING_FILE};
use crate::error::ChessError;
use crate::fen::Fen;
use crate::moves::{Move, MoveGenerator};
use crate::piece::{Color, Piece, PieceType, Square};

/// 棋盘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 8x8 棋盘，索引为 [rank][file]
    squares: [[Option<Piece>; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: [[None; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();

        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for color in [Color::White, Color::Black] {
            for (file, kind) in back_rank.iter().enumerate() {
                board.set(
                    Square::new_unchecked(file as u8, color.home_rank()),
                    Some(Piece::new(*kind, color)),
                );
                board.set(
                    Square::new_unchecked(file as u8, color.pawn_rank()),
                    Some(Piece::new(PieceType::Pawn, color)),
                );
            }
        }

        board
    }

    /// 获取指定格子的棋子
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if sq.is_valid() {
            self.squares[sq.rank as usize][sq.file as usize]
        } else {
            None
        }
    }

    /// 设置指定格子的棋子
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_valid() {
            self.squares[sq.rank as usize][sq.file as usize] = piece;
        }
    }

    /// 清空指定格子
    pub fn clear(&mut self, sq: Square) {
        self.set(sq, None);
    }

    /// 移动棋子（不检查规则）
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.set(from, None);
        self.set(to, piece);
        captured
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| {
            self.get(sq) == Some(Piece::new(PieceType::King, color))
        })
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|sq| self.get(sq).map(|piece| (sq, piece)))
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|sq| self.get(sq).map(|piece| (sq, piece)))
            .collect()
    }

    /// 检查指定阵营是否被将军
    pub fn is_in_check(&self, color: Color) -> bool {
        MoveGenerator::is_in_check(self, color)
    }

    /// 检查某格是否被指定阵营攻击
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        MoveGenerator::is_square_attacked(self, sq, by)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  a b c d e f g h")?;
        for rank in (0..BOARD_HEIGHT as u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..BOARD_WIDTH as u8 {
                match self.get(Square::new_unchecked(file, rank)) {
                    Some(piece) => write!(f, "{} ", piece.to_fen_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "{}", rank + 1)?;
        }
        write!(f, "  a b c d e f g h")
    }
}

/// 易位权
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    /// 四个方向均可易位
    pub fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    /// 不可易位
    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    /// 王翼易位权
    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    /// 后翼易位权
    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    /// 取消某一方的全部易位权
    pub fn revoke(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// 车的初始格被离开或被占据时，取消对应的易位权
    pub fn revoke_rook_square(&mut self, sq: Square) {
        match (sq.file, sq.rank) {
            (0, 0) => self.white_queenside = false,
            (7, 0) => self.white_kingside = false,
            (0, 7) => self.black_queenside = false,
            (7, 7) => self.black_kingside = false,
            _ => {}
        }
    }

    /// 转换为 FEN 字段
    pub fn to_fen(&self) -> String {
        let mut s = String::new();
        if self.white_kingside {
            s.push('K');
        }
        if self.white_queenside {
            s.push('Q');
        }
        if self.black_kingside {
            s.push('k');
        }
        if self.black_queenside {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    /// 从 FEN 字段解析
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::none());
        }
        let mut rights = Self::none();
        for c in field.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => return None,
            }
        }
        Some(rights)
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

/// 已执行走法的撤销记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    /// 移动的棋子（升变前）
    pub piece: Piece,
    /// 被吃的棋子
    pub captured: Option<Piece>,
    /// 被吃棋子所在格（吃过路兵时与目标格不同）
    pub captured_square: Square,
    /// 易位时车的移动 (from, to)
    pub rook_move: Option<(Square, Square)>,
    /// 升变结果
    pub promotion: Option<PieceType>,
    pub prev_en_passant: Option<Square>,
    pub prev_castling: CastlingRights,
    pub prev_halfmove_clock: u32,
    pub prev_fullmove_number: u32,
}

impl MoveRecord {
    /// 是否为吃过路兵
    pub fn is_en_passant(&self) -> bool {
        self.captured.is_some() && self.captured_square != self.to
    }

    /// 是否为易位
    pub fn is_castling(&self) -> bool {
        self.rook_move.is_some()
    }
}

/// 完整的棋盘状态（包含走子方、易位权、步数等）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub side_to_move: Color,
    /// 易位权
    pub castling: CastlingRights,
    /// 吃过路兵目标格
    pub en_passant: Option<Square>,
    /// 半回合计数（用于五十步规则，仅记录）
    pub halfmove_clock: u32,
    /// 完整回合数（黑方走完后 +1）
    pub fullmove_number: u32,
    /// 走法历史
    history: Vec<MoveRecord>,
}

impl BoardState {
    /// 创建初始状态
    pub fn initial() -> Self {
        Self::from_board(Board::initial(), Color::White)
    }

    /// 从棋盘创建状态
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    /// 从 FEN 解析
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Fen::parse(fen)
    }

    /// 转换为 FEN
    pub fn to_fen(&self) -> String {
        Fen::to_string(self)
    }

    /// 获取指定格子的棋子
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    /// 直接放置棋子（不检查规则）
    pub fn set(&mut self, sq: Square, piece: Piece) {
        self.board.set(sq, Some(piece));
    }

    /// 直接清空格子（不检查规则）
    pub fn clear(&mut self, sq: Square) {
        self.board.clear(sq);
    }

    /// 检查指定阵营是否被将军
    pub fn is_in_check(&self, color: Color) -> bool {
        self.board.is_in_check(color)
    }

    /// 已执行的走法数
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// 最近一步走法
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// 检查走法是否合法
    ///
    /// `from` 上必须是当前走子方的棋子，且 `(from, to)` 在该棋子的合法走法中。
    pub fn is_legal_move(&self, from: Square, to: Square) -> bool {
        self.find_legal(from, to).is_ok()
    }

    /// 执行走法，非法时返回 false 且不修改状态
    pub fn make_move(&mut self, from: Square, to: Square, promotion: Option<PieceType>) -> bool {
        self.try_make_move(from, to, promotion).is_ok()
    }

    /// 执行走法，非法时返回原因
    pub fn try_make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<(), ChessError> {
        let mv = self.find_legal(from, to)?;
        if self.apply(mv, promotion) {
            Ok(())
        } else {
            Err(ChessError::KingInCheck)
        }
    }

    /// 执行生成器给出的走法，返回撤销守卫
    ///
    /// 守卫离开作用域时自动撤销走法。搜索只通过这个入口改动局面，
    /// 从而保证每次走子都恰好被撤销一次。
    pub fn play(&mut self, mv: Move) -> Option<MoveGuard<'_>> {
        if self.get(mv.from).map(|p| p.color) != Some(self.side_to_move) {
            return None;
        }
        if self.apply(mv, None) {
            Some(MoveGuard { state: self })
        } else {
            None
        }
    }

    /// 撤销最近一步走法，历史为空时不做任何事
    pub fn unmake_move(&mut self) {
        let Some(record) = self.history.pop() else {
            return;
        };

        self.restore(&record);
        self.halfmove_clock = record.prev_halfmove_clock;
        self.fullmove_number = record.prev_fullmove_number;
        self.side_to_move = record.piece.color;
    }

    /// 在合法走法中查找 (from, to)
    ///
    /// 走子方已无合法走法时，任何失败都报告为 `GameOver`。
    fn find_legal(&self, from: Square, to: Square) -> Result<Move, ChessError> {
        self.locate_legal(from, to).map_err(|err| {
            if MoveGenerator::generate_legal(self, self.side_to_move).is_empty() {
                ChessError::GameOver
            } else {
                err
            }
        })
    }

    fn locate_legal(&self, from: Square, to: Square) -> Result<Move, ChessError> {
        let piece = self.get(from).ok_or_else(|| ChessError::NoPiece {
            square: from.to_string(),
        })?;
        if piece.color != self.side_to_move {
            return Err(ChessError::NotYourTurn);
        }
        if !to.is_valid() {
            return Err(ChessError::InvalidSquare {
                notation: format!("({}, {})", to.file, to.rank),
            });
        }

        MoveGenerator::generate_for_square(self, from)
            .into_iter()
            .find(|mv| mv.to == to)
            .ok_or_else(|| ChessError::InvalidMove {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// 实际执行走法，走后己方王被将军则完整回滚并返回 false
    fn apply(&mut self, mv: Move, promotion: Option<PieceType>) -> bool {
        let Some(piece) = self.get(mv.from) else {
            return false;
        };
        let mover = piece.color;

        let mut record = MoveRecord {
            from: mv.from,
            to: mv.to,
            piece,
            captured: self.get(mv.to),
            captured_square: mv.to,
            rook_move: None,
            promotion: None,
            prev_en_passant: self.en_passant,
            prev_castling: self.castling,
            prev_halfmove_clock: self.halfmove_clock,
            prev_fullmove_number: self.fullmove_number,
        };

        // 易位：先移动车
        if piece.kind == PieceType::King && mv.from.file.abs_diff(mv.to.file) == 2 {
            let rook_files = match mv.to.file {
                KINGSIDE_KING_FILE => Some((7, 5)),
                QUEENSIDE_KING_FILE => Some((0, 3)),
                _ => None,
            };
            if let Some((rook_from, rook_to)) = rook_files {
                let rook_from = Square::new_unchecked(rook_from, mv.from.rank);
                let rook_to = Square::new_unchecked(rook_to, mv.from.rank);
                if self.get(rook_from) == Some(Piece::new(PieceType::Rook, mover)) {
                    self.board.move_piece(rook_from, rook_to);
                    record.rook_move = Some((rook_from, rook_to));
                }
            }
        }

        // 升变
        let placed = if piece.kind == PieceType::Pawn && mv.to.rank == mover.promotion_rank() {
            let kind = promotion
                .filter(|kind| kind.is_promotion_target())
                .unwrap_or(PieceType::Queen);
            record.promotion = Some(kind);
            Piece::new(kind, mover)
        } else {
            piece
        };

        self.board.set(mv.to, Some(placed));
        self.board.clear(mv.from);

        // 吃过路兵：被吃的兵在目标格后方一行
        if piece.kind == PieceType::Pawn
            && record.captured.is_none()
            && Some(mv.to) == record.prev_en_passant
        {
            if let Some(victim_sq) = mv.to.offset(0, -mover.forward()) {
                if let Some(victim) = self.get(victim_sq) {
                    if victim.kind == PieceType::Pawn && victim.color != mover {
                        self.board.clear(victim_sq);
                        record.captured = Some(victim);
                        record.captured_square = victim_sq;
                    }
                }
            }
        }

        // 新的吃过路兵目标格
        self.en_passant = if piece.kind == PieceType::Pawn && mv.from.rank.abs_diff(mv.to.rank) == 2
        {
            Some(Square::new_unchecked(mv.from.file, (mv.from.rank + mv.to.rank) / 2))
        } else {
            None
        };

        // 易位权
        if piece.kind == PieceType::King {
            self.castling.revoke(mover);
        }
        self.castling.revoke_rook_square(mv.from);
        self.castling.revoke_rook_square(mv.to);

        if self.board.is_in_check(mover) {
            self.restore(&record);
            return false;
        }

        if piece.kind == PieceType::Pawn || record.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = mover.opponent();
        self.history.push(record);

        true
    }

    /// 按记录还原棋盘、易位权和吃过路兵目标格
    fn restore(&mut self, record: &MoveRecord) {
        self.board.clear(record.to);
        self.board.set(record.from, Some(record.piece));
        if let Some(captured) = record.captured {
            self.board.set(record.captured_square, Some(captured));
        }
        if let Some((rook_from, rook_to)) = record.rook_move {
            self.board.move_piece(rook_to, rook_from);
        }
        self.en_passant = record.prev_en_passant;
        self.castling = record.prev_castling;
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

/// 走法守卫：持有局面的独占引用，析构时撤销对应走法
pub struct MoveGuard<'a> {
    state: &'a mut BoardState,
}

impl Deref for MoveGuard<'_> {
    type Target = BoardState;

    fn deref(&self) -> &BoardState {
        self.state
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut BoardState {
        self.state
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.state.unmake_move();
    }
}
