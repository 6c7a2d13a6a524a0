//! 规则常量定义

/// 棋盘宽度（列数）
pub const BOARD_WIDTH: usize = 8;

/// 棋盘高度（行数）
pub const BOARD_HEIGHT: usize = 8;

/// 格子总数
pub const SQUARE_COUNT: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// 王翼易位后王所在列（g）
pub const KINGSIDE_KING_FILE: u8 = 6;

/// 后翼易位后王所在列（c）
pub const QUEENSIDE_KING_FILE: u8 = 2;

/// 王的初始列（e）
pub const KING_HOME_FILE: u8 = 4;

/// 中心四格（d4, e4, d5, e5），以 (file, rank) 表示
pub const CENTER_SQUARES: [(u8, u8); 4] = [(3, 3), (4, 3), (3, 4), (4, 4)];

/// 中心外圈十二格（c3-f3, c4, f4, c5, f5, c6-f6）
pub const EXTENDED_CENTER_SQUARES: [(u8, u8); 12] = [
    (2, 2), (3, 2), (4, 2), (5, 2),
    (2, 3), (5, 3),
    (2, 4), (5, 4),
    (2, 5), (3, 5), (4, 5), (5, 5),
];

/// 马的跳法
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

/// 王的一步走法
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1),
    (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

/// 直线方向（车/后）
pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// 斜线方向（象/后）
pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
