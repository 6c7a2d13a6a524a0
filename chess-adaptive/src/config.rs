//! 自适应对局配置

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use chess_ai::AiConfig;
use chess_core::Color;

/// 自适应对局配置，缺省字段使用默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// 引擎搜索参数
    pub search: AiConfig,
    /// 人类玩家执子颜色
    pub human_color: Color,
    /// 每隔多少步人类走法重新分析一次风格
    pub adaptation_interval: usize,
    /// 风格分析使用的最近走法数
    pub analysis_window: usize,
    /// 单局最多保留的走法分析数
    pub max_game_moves: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            search: AiConfig::default(),
            human_color: Color::White,
            adaptation_interval: 5,
            analysis_window: 20,
            max_game_moves: 100,
        }
    }
}

impl AdaptiveConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("解析配置失败")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("序列化配置失败")
    }

    /// 从文件读取配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("读取配置文件失败: {:?}", path))?;
        Self::from_json(&content)
    }

    /// 引擎执子颜色
    pub fn engine_color(&self) -> Color {
        self.human_color.opponent()
    }
}
