//! 局面搜索测试
//!
//! 运行方式:
//! ```bash
//! cargo run -p chess-ai --example search_position
//! ```

use chess_ai::{Difficulty, SearchEngine};
use chess_core::BoardState;

const POSITIONS: [(&str, &str); 3] = [
    ("开局", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
    ("一步杀", "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1"),
    ("Kiwipete", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"),
];

fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== 局面搜索测试 ===\n");

    for (name, fen) in POSITIONS {
        let mut state = BoardState::from_fen(fen)?;
        println!("{}: {}", name, fen);

        for difficulty in [Difficulty::Easy, Difficulty::Medium] {
            let mut engine = SearchEngine::from_difficulty(difficulty);
            let color = state.side_to_move;
            let best = engine.find_best_move(&mut state, color);
            let stats = engine.last_stats();

            match best {
                Some(mv) => println!(
                    "   {:?}: {} (深度 {}, 节点 {}, 评分 {:?}, 缓存命中 {:.1}%, {} ms)",
                    difficulty,
                    mv,
                    stats.depth_reached,
                    stats.nodes,
                    stats.best_score,
                    stats.tt_hit_rate * 100.0,
                    stats.elapsed_ms
                ),
                None => println!("   {:?}: 没有合法走法", difficulty),
            }
        }
        println!();
    }

    Ok(())
}
