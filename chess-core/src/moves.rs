//! 走法生成和验证

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardState};
use crate::constants::{
    DIAGONAL_DIRECTIONS, KING_HOME_FILE, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONAL_DIRECTIONS,
};
use crate::piece::{Color, Piece, PieceType, Square};

/// 走法
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub struct Move {
    /// 起始格
    pub from: Square,
    /// 目标格
    pub to: Square,
    /// 被吃的棋子（如果有，包括吃过路兵）
    pub captured: Option<Piece>,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    /// 创建带吃子的走法
    pub fn with_capture(from: Square, to: Square, captured: Piece) -> Self {
        Self {
            from,
            to,
            captured: Some(captured),
        }
    }

    /// 是否吃子
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// 走法相等只比较起止格
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl std::hash::Hash for Move {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成指定阵营的所有伪合法走法（不考虑走后是否被将军）
    ///
    /// 易位是例外：易位的全部前提（包括途经格不被攻击）在这里就已检查。
    pub fn generate_pseudo_legal(state: &BoardState, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);

        for (sq, piece) in state.board.pieces(color) {
            Self::generate_piece_moves(state, sq, piece, &mut moves);
        }

        moves
    }

    /// 生成指定阵营的所有合法走法
    pub fn generate_legal(state: &BoardState, color: Color) -> Vec<Move> {
        Self::generate_pseudo_legal(state, color)
            .into_iter()
            .filter(|mv| Self::leaves_king_safe(&state.board, *mv, color))
            .collect()
    }

    /// 生成某一格上棋子的合法走法，空格返回空列表
    pub fn generate_for_square(state: &BoardState, from: Square) -> Vec<Move> {
        let Some(piece) = state.board.get(from) else {
            return Vec::new();
        };

        let mut moves = Vec::new();
        Self::generate_piece_moves(state, from, piece, &mut moves);
        moves.retain(|mv| Self::leaves_king_safe(&state.board, *mv, piece.color));
        moves
    }

    /// 在棋盘副本上试走，检查己方王是否安全
    fn leaves_king_safe(board: &Board, mv: Move, color: Color) -> bool {
        let mut scratch = *board;
        let Some(piece) = scratch.get(mv.from) else {
            return false;
        };

        // 吃过路兵：目标格为空的斜走
        if piece.kind == PieceType::Pawn && mv.from.file != mv.to.file && scratch.get(mv.to).is_none()
        {
            if let Some(victim) = mv.to.offset(0, -color.forward()) {
                scratch.clear(victim);
            }
        }

        // 易位：同时移动车
        if piece.kind == PieceType::King && mv.from.file.abs_diff(mv.to.file) == 2 {
            let (rook_from, rook_to) = if mv.to.file > mv.from.file { (7, 5) } else { (0, 3) };
            scratch.move_piece(
                Square::new_unchecked(rook_from, mv.from.rank),
                Square::new_unchecked(rook_to, mv.from.rank),
            );
        }

        scratch.move_piece(mv.from, mv.to);
        !Self::is_in_check(&scratch, color)
    }

    /// 生成指定棋子的所有伪合法走法
    fn generate_piece_moves(state: &BoardState, sq: Square, piece: Piece, moves: &mut Vec<Move>) {
        let board = &state.board;
        match piece.kind {
            PieceType::Pawn => Self::generate_pawn_moves(state, sq, piece.color, moves),
            PieceType::Knight => {
                Self::generate_step_moves(board, sq, piece.color, &KNIGHT_OFFSETS, moves)
            }
            PieceType::Bishop => {
                Self::generate_slider_moves(board, sq, piece.color, &DIAGONAL_DIRECTIONS, moves)
            }
            PieceType::Rook => {
                Self::generate_slider_moves(board, sq, piece.color, &ORTHOGONAL_DIRECTIONS, moves)
            }
            PieceType::Queen => {
                Self::generate_slider_moves(board, sq, piece.color, &ORTHOGONAL_DIRECTIONS, moves);
                Self::generate_slider_moves(board, sq, piece.color, &DIAGONAL_DIRECTIONS, moves);
            }
            PieceType::King => {
                Self::generate_step_moves(board, sq, piece.color, &KING_OFFSETS, moves);
                Self::generate_castling_moves(state, sq, piece.color, moves);
            }
        }
    }

    /// 生成兵的走法
    fn generate_pawn_moves(state: &BoardState, sq: Square, color: Color, moves: &mut Vec<Move>) {
        let board = &state.board;
        let forward = color.forward();

        // 前进一格，在初始行时可前进两格
        if let Some(one) = sq.offset(0, forward) {
            if board.get(one).is_none() {
                moves.push(Move::new(sq, one));

                if sq.rank == color.pawn_rank() {
                    if let Some(two) = one.offset(0, forward) {
                        if board.get(two).is_none() {
                            moves.push(Move::new(sq, two));
                        }
                    }
                }
            }
        }

        // 斜吃和吃过路兵
        for df in [-1, 1] {
            let Some(target) = sq.offset(df, forward) else {
                continue;
            };

            match board.get(target) {
                Some(victim) if victim.color != color => {
                    moves.push(Move::with_capture(sq, target, victim));
                }
                None if state.en_passant == Some(target) => {
                    let victim = target
                        .offset(0, -forward)
                        .and_then(|victim_sq| board.get(victim_sq))
                        .filter(|p| p.kind == PieceType::Pawn && p.color != color);
                    if let Some(victim) = victim {
                        moves.push(Move::with_capture(sq, target, victim));
                    }
                }
                _ => {}
            }
        }
    }

    /// 生成马或王的一步走法
    fn generate_step_moves(
        board: &Board,
        sq: Square,
        color: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in offsets {
            if let Some(to) = sq.offset(df, dr) {
                Self::try_add_move(board, sq, to, color, moves);
            }
        }
    }

    /// 生成滑行棋子的走法，遇到第一个棋子停止
    fn generate_slider_moves(
        board: &Board,
        sq: Square,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in directions {
            let mut current = sq;
            while let Some(next) = current.offset(df, dr) {
                if !Self::try_add_move(board, sq, next, color, moves) {
                    break;
                }
                current = next;
            }
        }
    }

    /// 生成易位走法，任何条件不满足时直接跳过
    fn generate_castling_moves(
        state: &BoardState,
        sq: Square,
        color: Color,
        moves: &mut Vec<Move>,
    ) {
        let board = &state.board;
        let rank = color.home_rank();
        if sq != Square::new_unchecked(KING_HOME_FILE, rank) {
            return;
        }

        let opponent = color.opponent();
        if Self::is_square_attacked(board, sq, opponent) {
            return;
        }

        let own_rook = Some(Piece::new(PieceType::Rook, color));

        // (权利, 车所在列, 必须为空的列, 王途经的列, 王的目标列)
        let sides: [(bool, u8, &[u8], [u8; 2], u8); 2] = [
            (state.castling.kingside(color), 7, &[5, 6], [5, 6], 6),
            (state.castling.queenside(color), 0, &[1, 2, 3], [3, 2], 2),
        ];

        for (allowed, rook_file, empty_files, transit_files, king_file) in sides {
            if !allowed {
                continue;
            }
            if board.get(Square::new_unchecked(rook_file, rank)) != own_rook {
                continue;
            }
            let path_clear = empty_files
                .iter()
                .all(|&file| board.get(Square::new_unchecked(file, rank)).is_none());
            if !path_clear {
                continue;
            }
            let path_safe = transit_files.iter().all(|&file| {
                !Self::is_square_attacked(board, Square::new_unchecked(file, rank), opponent)
            });
            if !path_safe {
                continue;
            }

            moves.push(Move::new(sq, Square::new_unchecked(king_file, rank)));
        }
    }

    /// 尝试添加走法，返回该方向能否继续前进（目标格为空）
    fn try_add_move(
        board: &Board,
        from: Square,
        to: Square,
        color: Color,
        moves: &mut Vec<Move>,
    ) -> bool {
        match board.get(to) {
            None => {
                moves.push(Move::new(from, to));
                true
            }
            Some(target) => {
                if target.color != color {
                    moves.push(Move::with_capture(from, to, target));
                }
                false
            }
        }
    }

    /// 检查某格是否被指定阵营攻击
    ///
    /// 只看棋盘上的占位，不考虑攻击方自身是否被牵制。
    pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
        let is = |target: Option<Square>, kinds: &[PieceType]| {
            target
                .and_then(|t| board.get(t))
                .is_some_and(|p| p.color == by && kinds.contains(&p.kind))
        };

        // 兵：攻击方的兵位于目标格后方的斜线上
        let behind = -by.forward();
        if is(sq.offset(-1, behind), &[PieceType::Pawn]) || is(sq.offset(1, behind), &[PieceType::Pawn])
        {
            return true;
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| is(sq.offset(df, dr), &[PieceType::Knight]))
        {
            return true;
        }

        if KING_OFFSETS
            .iter()
            .any(|&(df, dr)| is(sq.offset(df, dr), &[PieceType::King]))
        {
            return true;
        }

        Self::ray_hits(board, sq, by, &ORTHOGONAL_DIRECTIONS, &[PieceType::Rook, PieceType::Queen])
            || Self::ray_hits(board, sq, by, &DIAGONAL_DIRECTIONS, &[PieceType::Bishop, PieceType::Queen])
    }

    /// 沿方向射线查找第一个棋子，判断是否为指定攻击者
    fn ray_hits(
        board: &Board,
        sq: Square,
        by: Color,
        directions: &[(i8, i8)],
        attackers: &[PieceType],
    ) -> bool {
        for &(df, dr) in directions {
            let mut current = sq;
            while let Some(next) = current.offset(df, dr) {
                if let Some(piece) = board.get(next) {
                    if piece.color == by && attackers.contains(&piece.kind) {
                        return true;
                    }
                    break;
                }
                current = next;
            }
        }
        false
    }

    /// 检查指定阵营是否被将军，没有王时返回 false
    pub fn is_in_check(board: &Board, color: Color) -> bool {
        match board.find_king(color) {
            Some(king) => Self::is_square_attacked(board, king, color.opponent()),
            None => false,
        }
    }

    /// 检查当前走子方是否被将死
    pub fn is_checkmate(state: &BoardState) -> bool {
        let color = state.side_to_move;
        if !Self::is_in_check(&state.board, color) {
            return false;
        }
        Self::generate_legal(state, color).is_empty()
    }

    /// 检查当前走子方是否无子可动（未被将军）
    pub fn is_stalemate(state: &BoardState) -> bool {
        let color = state.side_to_move;
        if Self::is_in_check(&state.board, color) {
            return false;
        }
        Self::generate_legal(state, color).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn state(fen: &str) -> BoardState {
        BoardState::from_fen(fen).unwrap()
    }

    fn has_move(moves: &[Move], from: &str, to: &str) -> bool {
        moves.contains(&Move::new(sq(from), sq(to)))
    }

    fn perft(state: &mut BoardState, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = MoveGenerator::generate_legal(state, state.side_to_move);
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in moves {
            if let Some(mut child) = state.play(mv) {
                nodes += perft(&mut child, depth - 1);
            }
        }
        nodes
    }

    #[test]
    fn test_initial_move_count() {
        let state = BoardState::initial();
        let moves = MoveGenerator::generate_legal(&state, Color::White);

        // 16 步兵 + 4 步马
        assert_eq!(moves.len(), 20);
        assert!(has_move(&moves, "e2", "e4"));
        assert!(has_move(&moves, "g1", "f3"));
        assert_eq!(MoveGenerator::generate_legal(&state, Color::Black).len(), 20);
    }

    #[test]
    fn test_perft_initial() {
        let mut state = BoardState::initial();
        assert_eq!(perft(&mut state, 1), 20);
        assert_eq!(perft(&mut state, 2), 400);
        assert_eq!(perft(&mut state, 3), 8902);
        assert_eq!(state, BoardState::initial(), "perft 后局面应还原");
    }

    #[test]
    fn test_knight_moves() {
        let s = state("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1");
        let moves = MoveGenerator::generate_for_square(&s, sq("d4"));
        assert_eq!(moves.len(), 8);

        let corner = state("4k3/8/8/8/8/8/8/N3K3 w - - 0 1");
        assert_eq!(MoveGenerator::generate_for_square(&corner, sq("a1")).len(), 2);
    }

    #[test]
    fn test_rook_blocked_and_capture() {
        let s = state("4k3/8/8/3p4/8/8/3R4/3NK3 w - - 0 1");
        let moves = MoveGenerator::generate_for_square(&s, sq("d2"));

        // 上方到 d5（吃子）为止，下方被己方马挡住
        assert!(has_move(&moves, "d2", "d5"));
        assert!(!has_move(&moves, "d2", "d6"));
        assert!(!has_move(&moves, "d2", "d1"));
        let capture = moves.iter().find(|m| m.to == sq("d5")).unwrap();
        assert_eq!(capture.captured, Some(Piece::new(PieceType::Pawn, Color::Black)));
        // 3 (d3-d5) + 7 (横向)
        assert_eq!(moves.len(), 10);
    }

    #[test]
    fn test_bishop_and_queen_moves() {
        let s = state("4k3/8/8/8/3B4/8/8/4K3 w - - 0 1");
        assert_eq!(MoveGenerator::generate_for_square(&s, sq("d4")).len(), 13);

        let s = state("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        assert_eq!(MoveGenerator::generate_for_square(&s, sq("d4")).len(), 27);
    }

    #[test]
    fn test_pawn_moves() {
        let s = state("4k3/8/8/8/8/2p5/3P4/4K3 w - - 0 1");
        let moves = MoveGenerator::generate_for_square(&s, sq("d2"));
        assert!(has_move(&moves, "d2", "d3"));
        assert!(has_move(&moves, "d2", "d4"));
        assert!(has_move(&moves, "d2", "c3"));
        assert_eq!(moves.len(), 3);

        // 前方被挡住时既不能走一步也不能走两步
        let blocked = state("4k3/8/8/8/8/3n4/3P4/4K3 w - - 0 1");
        assert!(MoveGenerator::generate_for_square(&blocked, sq("d2")).is_empty());
    }

    #[test]
    fn test_black_pawn_direction() {
        let s = state("4k3/3p4/8/8/8/8/8/4K3 b - - 0 1");
        let moves = MoveGenerator::generate_for_square(&s, sq("d7"));
        assert!(has_move(&moves, "d7", "d6"));
        assert!(has_move(&moves, "d7", "d5"));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_en_passant_generated() {
        let s = state("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let moves = MoveGenerator::generate_for_square(&s, sq("e5"));
        assert!(has_move(&moves, "e5", "d6"));
        let ep = moves.iter().find(|m| m.to == sq("d6")).unwrap();
        assert_eq!(ep.captured, Some(Piece::new(PieceType::Pawn, Color::Black)));

        // 没有目标格时不能吃
        let s = state("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1");
        assert!(!has_move(&MoveGenerator::generate_for_square(&s, sq("e5")), "e5", "d6"));
    }

    #[test]
    fn test_en_passant_exposing_king_is_illegal() {
        // 吃过路兵后第五横线上的车直接攻击王
        let s = state("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(!has_move(&moves, "e5", "d6"));
        assert!(has_move(&moves, "e5", "e6"));
    }

    #[test]
    fn test_castling_both_sides() {
        let s = state("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(has_move(&moves, "e1", "g1"));
        assert!(has_move(&moves, "e1", "c1"));

        let moves = MoveGenerator::generate_legal(&s, Color::Black);
        assert!(has_move(&moves, "e8", "g8"));
        assert!(has_move(&moves, "e8", "c8"));
    }

    #[test]
    fn test_castling_requires_rights() {
        let s = state("r3k2r/8/8/8/8/8/8/R3K2R w Qkq - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(!has_move(&moves, "e1", "g1"));
        assert!(has_move(&moves, "e1", "c1"));

        let s = state("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(!has_move(&moves, "e1", "g1"));
        assert!(!has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn test_castling_requires_empty_path() {
        let s = state("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(!has_move(&moves, "e1", "g1"));
        // b1 被占也不行，即使王不经过 b1
        assert!(!has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn test_castling_requires_rook() {
        let s = state("r3k2r/8/8/8/8/8/8/4K2R w KQkq - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(has_move(&moves, "e1", "g1"));
        assert!(!has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn test_castling_not_out_of_check() {
        let s = state("r3k2r/8/8/8/4r3/8/8/R3K2R w KQkq - 0 1");
        assert!(s.is_in_check(Color::White));
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(!has_move(&moves, "e1", "g1"));
        assert!(!has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn test_castling_not_through_attacked_square() {
        // f1 被黑车攻击：王翼不可易位，后翼仍可
        let s = state("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(!has_move(&moves, "e1", "g1"));
        assert!(has_move(&moves, "e1", "c1"));

        // c1 被攻击：后翼不可易位
        let s = state("2r1k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(has_move(&moves, "e1", "g1"));
        assert!(!has_move(&moves, "e1", "c1"));

        // b1 被攻击不影响后翼易位
        let s = state("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert!(has_move(&moves, "e1", "c1"));
    }

    #[test]
    fn test_check_detection() {
        assert!(state("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").is_in_check(Color::White));
        assert!(state("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").is_in_check(Color::White));
        assert!(state("4k3/8/8/8/8/5n2/8/4K3 w - - 0 1").is_in_check(Color::White));
        assert!(state("4k3/8/8/b7/8/8/8/4K3 w - - 0 1").is_in_check(Color::White));
        // 射线被挡
        assert!(!state("4k3/8/8/b7/8/2P5/8/4K3 w - - 0 1").is_in_check(Color::White));
        // 兵不向后攻击
        assert!(!state("4k3/8/8/8/8/8/8/3pK3 w - - 0 1").is_in_check(Color::White));
    }

    #[test]
    fn test_no_move_leaves_king_in_check() {
        let s = state("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let moves = MoveGenerator::generate_legal(&s, Color::White);
        assert_eq!(moves.len(), 48);

        for mv in moves {
            let mut copy = s.clone();
            assert!(copy.make_move(mv.from, mv.to, None), "{} 应合法", mv);
            assert!(!copy.is_in_check(Color::White));
        }
    }

    #[test]
    fn test_kiwipete_perft_depth_two() {
        let mut s = state("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        assert_eq!(perft(&mut s, 1), 48);
        assert_eq!(perft(&mut s, 2), 2039);
    }

    #[test]
    fn test_checkmate() {
        // 后翼杀：黑王被白后和白王困死
        let s = state("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1");
        assert!(MoveGenerator::is_checkmate(&s));
        assert!(!MoveGenerator::is_stalemate(&s));
    }

    #[test]
    fn test_stalemate() {
        let s = state("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(MoveGenerator::is_stalemate(&s));
        assert!(!MoveGenerator::is_checkmate(&s));
        assert!(MoveGenerator::generate_legal(&s, Color::Black).is_empty());
    }

    #[test]
    fn test_not_checkmate_with_escape() {
        let s = state("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        assert!(!MoveGenerator::is_checkmate(&s));
        assert!(!MoveGenerator::generate_legal(&s, Color::White).is_empty());
    }

    #[test]
    fn test_move_equality_ignores_capture() {
        let a = Move::new(sq("e4"), sq("d5"));
        let b = Move::with_capture(sq("e4"), sq("d5"), Piece::new(PieceType::Pawn, Color::Black));
        assert_eq!(a, b);
        assert!(b.is_capture());
        assert_eq!(a.to_string(), "e4d5");
    }
}
