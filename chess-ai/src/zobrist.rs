//! Zobrist 哈希
//!
//! 为局面计算 64 位哈希，用作评估缓存的键

use chess_core::{BoardState, Color, Piece, Square, SQUARE_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Zobrist 哈希表
///
/// 使用固定种子的随机数为每个格子上的每种棋子生成唯一的哈希值
pub struct ZobristTable {
    /// 棋子哈希值 [color][piece_type][square]
    pieces: [[[u64; SQUARE_COUNT]; 6]; 2],
    /// 黑方走棋
    side_to_move: u64,
    /// 易位权 K Q k q
    castling: [u64; 4],
    /// 吃过路兵目标格所在列
    en_passant_file: [u64; 8],
    /// 评估视角为黑方
    perspective: u64,
}

impl ZobristTable {
    /// 创建新的 Zobrist 表（使用固定种子保证确定性）
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF_CAFE_1234);

        let mut pieces = [[[0u64; SQUARE_COUNT]; 6]; 2];
        for color in pieces.iter_mut() {
            for kind in color.iter_mut() {
                for sq in kind.iter_mut() {
                    *sq = rng.gen();
                }
            }
        }

        let side_to_move = rng.gen();
        let mut castling = [0u64; 4];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }
        let mut en_passant_file = [0u64; 8];
        for key in en_passant_file.iter_mut() {
            *key = rng.gen();
        }

        Self {
            pieces,
            side_to_move,
            castling,
            en_passant_file,
            perspective: rng.gen(),
        }
    }

    /// 计算局面的完整哈希值
    pub fn hash(&self, state: &BoardState) -> u64 {
        let mut hash = 0u64;

        for (sq, piece) in state.board.all_pieces() {
            hash ^= self.piece_hash(piece, sq);
        }

        if state.side_to_move == Color::Black {
            hash ^= self.side_to_move;
        }

        let rights = [
            state.castling.white_kingside,
            state.castling.white_queenside,
            state.castling.black_kingside,
            state.castling.black_queenside,
        ];
        for (key, allowed) in self.castling.iter().zip(rights) {
            if allowed {
                hash ^= key;
            }
        }

        if let Some(ep) = state.en_passant {
            hash ^= self.en_passant_file[ep.file as usize];
        }

        hash
    }

    /// 从指定阵营视角评估时使用的哈希值
    pub fn hash_for(&self, state: &BoardState, perspective: Color) -> u64 {
        let hash = self.hash(state);
        match perspective {
            Color::White => hash,
            Color::Black => hash ^ self.perspective,
        }
    }

    /// 获取棋子的哈希值
    #[inline]
    pub fn piece_hash(&self, piece: Piece, sq: Square) -> u64 {
        self.pieces[piece.color.index()][piece.kind.index()][sq.to_index()]
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zobrist_deterministic() {
        let table1 = ZobristTable::new();
        let table2 = ZobristTable::new();

        let state = BoardState::initial();
        assert_eq!(table1.hash(&state), table2.hash(&state), "Zobrist 哈希应该是确定性的");
    }

    #[test]
    fn test_zobrist_different_positions() {
        let table = ZobristTable::new();
        let mut state = BoardState::initial();
        let hash1 = table.hash(&state);

        let e2 = Square::from_algebraic("e2").unwrap();
        let e4 = Square::from_algebraic("e4").unwrap();
        assert!(state.make_move(e2, e4, None));
        let hash2 = table.hash(&state);
        assert_ne!(hash1, hash2, "不同局面应该有不同的哈希值");

        state.unmake_move();
        assert_eq!(table.hash(&state), hash1, "撤销后哈希应还原");
    }

    #[test]
    fn test_zobrist_side_and_rights_matter() {
        let table = ZobristTable::new();
        let white = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let black = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        let no_rights = BoardState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();

        assert_ne!(table.hash(&white), table.hash(&black), "不同走子方应该有不同的哈希值");
        assert_ne!(table.hash(&white), table.hash(&no_rights), "易位权应影响哈希值");
    }

    #[test]
    fn test_zobrist_perspective() {
        let table = ZobristTable::new();
        let state = BoardState::initial();
        assert_ne!(
            table.hash_for(&state, Color::White),
            table.hash_for(&state, Color::Black)
        );
        assert_eq!(table.hash_for(&state, Color::White), table.hash(&state));
    }
}
