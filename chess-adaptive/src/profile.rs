//! 玩家画像
//!
//! 记录对手的风格分数、倾向与走法统计，供权重适配读取。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chess_ai::{StyleCategory, StyleIndicators};

use crate::analyzer::MoveAnalysis;

/// 保留的最近走法分析数量
pub const RECENT_MOVES_CAP: usize = 100;

/// 失子超过该值（兵单位）视为漏着
pub const BLUNDER_THRESHOLD: i32 = -5;

/// 玩家画像
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub player_id: String,
    pub player_name: String,
    pub games_played: u32,
    pub moves_recorded: u32,

    // 风格分数，均在 [0, 1]
    pub aggression_score: f64,
    pub defensive_score: f64,
    pub tactical_score: f64,
    pub positional_score: f64,
    pub endgame_score: f64,
    pub mistake_control: f64,
    pub blunder_rate: f64,

    // 倾向
    pub trade_willingness: f64,
    pub king_safety_focus: f64,
    pub central_control_preference: f64,
    pub piece_activity_preference: f64,
    pub pawn_structure_focus: f64,

    // 走法统计
    pub capture_rate: f64,
    pub check_rate: f64,
    pub castle_rate: f64,

    pub recent_moves: Vec<MoveAnalysis>,
    pub last_updated: DateTime<Utc>,
}

impl PlayerProfile {
    /// 创建新画像，所有分数取中性值
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// 主导风格
    pub fn primary_style(&self) -> StyleCategory {
        self.dominant_style()
    }

    /// 风格百分比（0-100）
    pub fn style_percentages(&self) -> StylePercentages {
        StylePercentages {
            aggressive: self.aggression_score * 100.0,
            defensive: self.defensive_score * 100.0,
            tactical: self.tactical_score * 100.0,
            positional: self.positional_score * 100.0,
            endgame: self.endgame_score * 100.0,
            mistake_control: self.mistake_control * 100.0,
        }
    }

    /// 按单步走法更新计数与比率
    pub fn update_stats(&mut self, analysis: &MoveAnalysis) {
        self.moves_recorded += 1;
        let n = self.moves_recorded as f64;
        let running = |rate: f64, hit: bool| rate + ((hit as u8 as f64) - rate) / n;

        self.capture_rate = running(self.capture_rate, analysis.is_capture);
        self.check_rate = running(self.check_rate, analysis.is_check);
        self.castle_rate = running(self.castle_rate, analysis.is_castling);
        self.blunder_rate = running(
            self.blunder_rate,
            analysis.material_gain < BLUNDER_THRESHOLD,
        )
        .clamp(0.0, 1.0);
        self.mistake_control = (1.0 - self.blunder_rate).clamp(0.0, 1.0);

        self.recent_moves.push(*analysis);
        if self.recent_moves.len() > RECENT_MOVES_CAP {
            let excess = self.recent_moves.len() - RECENT_MOVES_CAP;
            self.recent_moves.drain(..excess);
        }
        self.touch();
    }

    /// 记录新对局开始
    pub fn record_game_start(&mut self) {
        self.games_played += 1;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            player_id: String::new(),
            player_name: "Unknown".to_string(),
            games_played: 0,
            moves_recorded: 0,
            aggression_score: 0.5,
            defensive_score: 0.5,
            tactical_score: 0.5,
            positional_score: 0.5,
            endgame_score: 0.5,
            mistake_control: 0.5,
            blunder_rate: 0.0,
            trade_willingness: 0.5,
            king_safety_focus: 0.5,
            central_control_preference: 0.5,
            piece_activity_preference: 0.5,
            pawn_structure_focus: 0.5,
            capture_rate: 0.0,
            check_rate: 0.0,
            castle_rate: 0.0,
            recent_moves: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

impl StyleIndicators for PlayerProfile {
    fn aggression(&self) -> f64 {
        self.aggression_score
    }
    fn defensiveness(&self) -> f64 {
        self.defensive_score
    }
    fn tactical(&self) -> f64 {
        self.tactical_score
    }
    fn positional(&self) -> f64 {
        self.positional_score
    }
    fn trade_willingness(&self) -> f64 {
        self.trade_willingness
    }
    fn king_safety_focus(&self) -> f64 {
        self.king_safety_focus
    }
    fn central_control_preference(&self) -> f64 {
        self.central_control_preference
    }
}

/// 风格百分比
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StylePercentages {
    pub aggressive: f64,
    pub defensive: f64,
    pub tactical: f64,
    pub positional: f64,
    pub endgame: f64,
    pub mistake_control: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Color, PieceType, Square};

    fn analysis(is_capture: bool, material_gain: i32) -> MoveAnalysis {
        MoveAnalysis {
            from: Square::new_unchecked(4, 1),
            to: Square::new_unchecked(4, 3),
            color: Color::White,
            piece: PieceType::Pawn,
            target: None,
            is_capture,
            is_check: false,
            is_castling: false,
            is_promotion: false,
            move_forward: true,
            central_square: true,
            attacking_value: 0.0,
            defensive_value: 0.0,
            material_gain,
        }
    }

    #[test]
    fn test_default_profile() {
        let profile = PlayerProfile::new("p1");
        assert_eq!(profile.player_id, "p1");
        assert_eq!(profile.player_name, "Unknown");
        assert_eq!(profile.primary_style(), StyleCategory::Balanced);
        assert_eq!(profile.style_percentages().aggressive, 50.0);
    }

    #[test]
    fn test_update_stats_rates() {
        let mut profile = PlayerProfile::new("p1");
        profile.update_stats(&analysis(true, 0));
        profile.update_stats(&analysis(false, 0));
        profile.update_stats(&analysis(false, 0));
        profile.update_stats(&analysis(true, 0));

        assert_eq!(profile.moves_recorded, 4);
        assert!((profile.capture_rate - 0.5).abs() < 1e-9);
        assert_eq!(profile.check_rate, 0.0);
    }

    #[test]
    fn test_blunder_updates_mistake_control() {
        let mut profile = PlayerProfile::new("p1");
        profile.update_stats(&analysis(true, -8));
        profile.update_stats(&analysis(false, 0));

        assert!((profile.blunder_rate - 0.5).abs() < 1e-9);
        assert!((profile.mistake_control - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_recent_moves_capped() {
        let mut profile = PlayerProfile::new("p1");
        for _ in 0..RECENT_MOVES_CAP + 20 {
            profile.update_stats(&analysis(false, 0));
        }
        assert_eq!(profile.recent_moves.len(), RECENT_MOVES_CAP);
        assert_eq!(profile.moves_recorded as usize, RECENT_MOVES_CAP + 20);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut profile = PlayerProfile::new("p1").with_name("Alice");
        profile.record_game_start();
        profile.aggression_score = 0.8;
        profile.update_stats(&analysis(true, 2));

        let json = profile.to_json().unwrap();
        let loaded = PlayerProfile::from_json(&json).unwrap();
        assert_eq!(loaded, profile);
        assert_eq!(loaded.primary_style(), StyleCategory::Aggressive);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let loaded = PlayerProfile::from_json(r#"{"player_id":"p2","tactical_score":0.9}"#).unwrap();
        assert_eq!(loaded.player_id, "p2");
        assert_eq!(loaded.games_played, 0);
        assert_eq!(loaded.defensive_score, 0.5);
        assert_eq!(loaded.primary_style(), StyleCategory::Tactical);
    }
}
