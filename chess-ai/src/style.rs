//! 对手风格接口
//!
//! 权重适配只需要读取一组 [0, 1] 的风格指标，具体的画像结构由上层提供。

use serde::{Deserialize, Serialize};

/// 主导风格的判定阈值
pub const STYLE_THRESHOLD: f64 = 0.65;

/// 风格类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleCategory {
    Aggressive,
    Defensive,
    Tactical,
    Positional,
    Balanced,
}

impl StyleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleCategory::Aggressive => "aggressive",
            StyleCategory::Defensive => "defensive",
            StyleCategory::Tactical => "tactical",
            StyleCategory::Positional => "positional",
            StyleCategory::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 风格指标（只读）
pub trait StyleIndicators {
    fn aggression(&self) -> f64;
    fn defensiveness(&self) -> f64;
    fn tactical(&self) -> f64;
    fn positional(&self) -> f64;
    fn trade_willingness(&self) -> f64;
    fn king_safety_focus(&self) -> f64;
    fn central_control_preference(&self) -> f64;

    /// 按进攻、防守、战术、局面的顺序取第一个超过阈值的风格
    fn dominant_style(&self) -> StyleCategory {
        if self.aggression() > STYLE_THRESHOLD {
            StyleCategory::Aggressive
        } else if self.defensiveness() > STYLE_THRESHOLD {
            StyleCategory::Defensive
        } else if self.tactical() > STYLE_THRESHOLD {
            StyleCategory::Tactical
        } else if self.positional() > STYLE_THRESHOLD {
            StyleCategory::Positional
        } else {
            StyleCategory::Balanced
        }
    }
}

/// 简单的风格指标集合，未指定的指标为 0.5
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleScores {
    pub aggression: f64,
    pub defensiveness: f64,
    pub tactical: f64,
    pub positional: f64,
    pub trade_willingness: f64,
    pub king_safety_focus: f64,
    pub central_control_preference: f64,
}

impl Default for StyleScores {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            defensiveness: 0.5,
            tactical: 0.5,
            positional: 0.5,
            trade_willingness: 0.5,
            king_safety_focus: 0.5,
            central_control_preference: 0.5,
        }
    }
}

impl StyleIndicators for StyleScores {
    fn aggression(&self) -> f64 {
        self.aggression
    }
    fn defensiveness(&self) -> f64 {
        self.defensiveness
    }
    fn tactical(&self) -> f64 {
        self.tactical
    }
    fn positional(&self) -> f64 {
        self.positional
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
