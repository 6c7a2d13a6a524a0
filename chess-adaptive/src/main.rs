use anyhow::Result;
use chess_adaptive::{AdaptiveConfig, AdaptiveEngine, MemoryProfileStore};
use chess_core::Square;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 演示用的人类走法
const SCRIPT: [(&str, &str); 8] = [
    ("e2", "e4"),
    ("g1", "f3"),
    ("f1", "c4"),
    ("e1", "g1"),
    ("d2", "d4"),
    ("b1", "c3"),
    ("c1", "g5"),
    ("d1", "e2"),
];

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("chess_adaptive=debug".parse()?))
        .init();

    info!("自适应国际象棋演示启动中...");

    let mut engine = AdaptiveEngine::new("demo-player", MemoryProfileStore::new(), AdaptiveConfig::default());
    engine.set_search_depth(3);
    engine.start_new_game();

    for (from, to) in SCRIPT {
        let (from, to) = (Square::from_algebraic(from)?, Square::from_algebraic(to)?);
        if !engine.make_player_move(from, to) {
            info!("Scripted move {}{} is not playable here, stopping", from, to);
            break;
        }
        match engine.make_engine_move() {
            Some(reply) => info!("{}{} answered with {}", from, to, reply),
            None => {
                info!("Engine has no reply");
                break;
            }
        }
    }

    println!("{}", engine.state().board);
    println!("FEN: {}", engine.state().to_fen());

    engine.end_game();
    let style = engine.player_style_info();
    println!("Primary style: {}", style.primary_style);
    println!("{}", style.adaptation_explanation);
    println!("{}", serde_json::to_string_pretty(&style.style_percentages)?);

    Ok(())
}
