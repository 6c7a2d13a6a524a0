//! 自适应对局驱动
//!
//! 把棋盘、搜索引擎、风格分析和权重适配串起来：
//! 人类每走一步都会被分析并记入画像，每隔若干步重新推导风格并调整引擎权重。
//! 画像存储失败只记录日志，不会中断对局。

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use chess_ai::{Evaluator, SearchEngine, StyleCategory, WeightAdapter};
use chess_core::{BoardState, Color, Move, MoveGenerator, Square};

use crate::analyzer::{MoveAnalysis, StyleAnalyzer};
use crate::config::AdaptiveConfig;
use crate::profile::{PlayerProfile, StylePercentages};
use crate::store::ProfileStore;

/// 玩家风格摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStyleInfo {
    pub primary_style: StyleCategory,
    pub style_percentages: StylePercentages,
    pub adaptation_explanation: String,
}

/// 自适应引擎
pub struct AdaptiveEngine<S: ProfileStore> {
    config: AdaptiveConfig,
    state: BoardState,
    search: SearchEngine,
    adapter: WeightAdapter,
    analyzer: StyleAnalyzer,
    profile: PlayerProfile,
    store: S,
    /// 本局人类走法的分析（最多 `max_game_moves` 条）
    game_moves: Vec<MoveAnalysis>,
    /// 本局人类走法总数（不受截断影响）
    player_moves: usize,
}

impl<S: ProfileStore> AdaptiveEngine<S> {
    /// 读取或创建玩家画像，并立即按画像调整权重
    pub fn new(player_id: &str, mut store: S, config: AdaptiveConfig) -> Self {
        let profile = match store.get_or_create(player_id) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Failed to load profile for {}: {:#}", player_id, e);
                PlayerProfile::new(player_id)
            }
        };

        let evaluator = Evaluator::new();
        let adapter = WeightAdapter::new(&evaluator);
        let search = SearchEngine::new(evaluator, config.search.clone());

        let mut engine = Self {
            config,
            state: BoardState::initial(),
            search,
            adapter,
            analyzer: StyleAnalyzer::new(),
            profile,
            store,
            game_moves: Vec::new(),
            player_moves: 0,
        };
        engine.update_adaptation();
        engine
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.search
    }

    /// 本局记录的人类走法分析
    pub fn game_moves(&self) -> &[MoveAnalysis] {
        &self.game_moves
    }

    /// 当前走子方没有合法走法
    pub fn is_game_over(&self) -> bool {
        MoveGenerator::generate_legal(&self.state, self.state.side_to_move).is_empty()
    }

    /// 从 FEN 设置局面，本局记录保持不变
    pub fn load_position(&mut self, fen: &str) -> Result<()> {
        self.state = BoardState::from_fen(fen).context("无法加载局面")?;
        Ok(())
    }

    /// 人类走子，只有轮到人类且走法合法时才会执行
    pub fn make_player_move(&mut self, from: Square, to: Square) -> bool {
        if self.state.side_to_move != self.config.human_color {
            return false;
        }
        if !self.state.is_legal_move(from, to) {
            return false;
        }
        let Some(analysis) = self.analyzer.analyze_move(&self.state, from, to) else {
            return false;
        };
        if !self.state.make_move(from, to, None) {
            return false;
        }

        self.game_moves.push(analysis);
        if self.game_moves.len() > self.config.max_game_moves {
            let excess = self.game_moves.len() - self.config.max_game_moves;
            self.game_moves.drain(..excess);
        }
        self.player_moves += 1;
        self.profile.update_stats(&analysis);

        let interval = self.config.adaptation_interval;
        if interval > 0 && self.player_moves % interval == 0 {
            self.refresh_profile();
            self.update_adaptation();
        }
        true
    }

    /// 引擎走子。搜索没有结果时退回一步静态评估最好的走法，再退回第一个合法走法
    pub fn make_engine_move(&mut self) -> Option<Move> {
        let color = self.config.engine_color();
        if self.state.side_to_move != color {
            return None;
        }

        if let Some(mv) = self.search.find_best_move(&mut self.state, color) {
            if self.state.make_move(mv.from, mv.to, None) {
                return Some(mv);
            }
            warn!("Engine move {} was rejected, using fallback", mv);
        }

        let mv = self.fallback_move(color)?;
        self.state.make_move(mv.from, mv.to, None).then_some(mv)
    }

    fn fallback_move(&mut self, color: Color) -> Option<Move> {
        let moves = MoveGenerator::generate_legal(&self.state, color);
        let first = moves.first().copied()?;

        let mut best: Option<(Move, f64)> = None;
        for mv in moves {
            let Some(guard) = self.state.play(mv) else {
                continue;
            };
            let score = self.search.evaluator().evaluate(&guard, color);
            drop(guard);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((mv, score));
            }
        }
        Some(best.map_or(first, |(mv, _)| mv))
    }

    /// 按当前画像调整引擎权重
    pub fn update_adaptation(&mut self) {
        self.adapter
            .apply(self.search.evaluator_mut(), &self.profile);
    }

    /// 用最近的走法窗口重新推导画像
    fn refresh_profile(&mut self) {
        let window = self.config.analysis_window.min(self.game_moves.len());
        let recent = &self.game_moves[self.game_moves.len() - window..];
        self.analyzer.update_profile(&mut self.profile, recent);
        debug!(
            "Profile {} re-derived from {} moves: {}",
            self.profile.player_id,
            recent.len(),
            self.profile.primary_style()
        );
    }

    /// 开始新对局
    pub fn start_new_game(&mut self) {
        self.state = BoardState::initial();
        self.game_moves.clear();
        self.player_moves = 0;
        self.search.clear_heuristics();
        self.profile.record_game_start();
        self.persist();
        self.update_adaptation();
        info!(
            "New game for {} (game {})",
            self.profile.player_id, self.profile.games_played
        );
    }

    /// 结束对局：用整局走法更新画像并保存
    pub fn end_game(&mut self) {
        if self.game_moves.len() >= self.config.adaptation_interval.max(1) {
            self.analyzer
                .update_profile(&mut self.profile, &self.game_moves);
        }
        self.persist();
        info!(
            "Game over for {}: {} moves analysed, style {}",
            self.profile.player_id,
            self.game_moves.len(),
            self.profile.primary_style()
        );
        self.game_moves.clear();
        self.player_moves = 0;
    }

    /// 风格摘要
    pub fn player_style_info(&self) -> PlayerStyleInfo {
        PlayerStyleInfo {
            primary_style: self.profile.primary_style(),
            style_percentages: self.profile.style_percentages(),
            adaptation_explanation: self.adapter.explain(&self.profile),
        }
    }

    pub fn set_search_depth(&mut self, depth: u32) {
        self.search.set_max_depth(depth);
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.profile) {
            warn!("Failed to save profile {}: {:#}", self.profile.player_id, e);
        }
    }
}
