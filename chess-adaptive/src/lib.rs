//! 自适应国际象棋
//!
//! 包含:
//! - 玩家画像
//! - 走法风格分析
//! - 画像存储（内存 / JSON 文件）
//! - 自适应对局驱动

pub mod analyzer;
pub mod config;
pub mod engine;
pub mod profile;
pub mod store;

pub use analyzer::{pawn_units, MoveAnalysis, StyleAnalyzer};
pub use config::AdaptiveConfig;
pub use engine::{AdaptiveEngine, PlayerStyleInfo};
pub use profile::{PlayerProfile, StylePercentages, BLUNDER_THRESHOLD, RECENT_MOVES_CAP};
pub use store::{FileProfileStore, MemoryProfileStore, ProfileStore};
