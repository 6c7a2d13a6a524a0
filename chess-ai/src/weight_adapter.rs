//! 权重适配
//!
//! 根据对手的主导风格和若干倾向，从基准权重出发生成一组新的评估权重。
//! 适配是全函数：任何输入都不会产生负数、NaN 或无穷的权重。

use tracing::debug;

use crate::evaluate::{EvalWeights, Evaluator, WeightKey};
use crate::style::{StyleCategory, StyleIndicators};

/// 倾向的高低阈值
const HIGH_TENDENCY: f64 = 0.6;
const LOW_TENDENCY: f64 = 0.4;

/// 解释文本中忽略的微小变化
const EXPLAIN_THRESHOLD: f64 = 0.1;

/// 每种主导风格对应的调整
fn style_rules(style: StyleCategory) -> &'static [(WeightKey, f64)] {
    use WeightKey::*;
    match style {
        // 对手进攻型：加强王的安全，避免无谓兑子
        StyleCategory::Aggressive => &[
            (KingSafety, 0.3),
            (PieceActivity, -0.2),
            (CentralControl, 0.2),
            (TradePreference, -0.3),
        ],
        // 对手防守型：争夺中心，主动兑子
        StyleCategory::Defensive => &[
            (CentralControl, 0.3),
            (PieceActivity, 0.2),
            (KingSafety, -0.1),
            (TradePreference, 0.2),
        ],
        // 对手战术型：稳固阵型
        StyleCategory::Tactical => &[
            (PawnStructure, 0.3),
            (KingSafety, 0.2),
            (PieceCoordination, 0.2),
            (Mobility, -0.1),
        ],
        // 对手局面型：提高子力活跃度
        StyleCategory::Positional => &[
            (PieceActivity, 0.3),
            (Mobility, 0.2),
            (CentralControl, -0.1),
            (TradePreference, 0.1),
        ],
        StyleCategory::Balanced => &[],
    }
}

/// 权重适配器
#[derive(Debug, Clone)]
pub struct WeightAdapter {
    baseline: EvalWeights,
}

impl WeightAdapter {
    /// 以评估器当前的权重为基准
    pub fn new(evaluator: &Evaluator) -> Self {
        Self::with_baseline(*evaluator.weights())
    }

    pub fn with_baseline(baseline: EvalWeights) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> &EvalWeights {
        &self.baseline
    }

    /// 生成针对该对手的权重
    pub fn adapt(&self, profile: &dyn StyleIndicators) -> EvalWeights {
        let mut weights = self.baseline;
        let mut nudge = |key: WeightKey, delta: f64| {
            weights.set(key, weights.get(key) + delta);
        };

        for &(key, delta) in style_rules(profile.dominant_style()) {
            nudge(key, delta);
        }

        let trade = profile.trade_willingness();
        if trade > HIGH_TENDENCY {
            nudge(WeightKey::TradePreference, -0.2);
        } else if trade < LOW_TENDENCY {
            nudge(WeightKey::TradePreference, 0.2);
        }

        if profile.king_safety_focus() > HIGH_TENDENCY {
            nudge(WeightKey::PieceActivity, 0.15);
            nudge(WeightKey::Mobility, 0.1);
        }

        if profile.central_control_preference() > HIGH_TENDENCY {
            nudge(WeightKey::CentralControl, 0.15);
        } else {
            nudge(WeightKey::CentralControl, 0.2);
        }

        for key in WeightKey::ALL {
            let value = weights.get(key);
            let valid = if value.is_finite() {
                value.max(0.0)
            } else {
                let base = self.baseline.get(key);
                if base.is_finite() {
                    base.max(0.0)
                } else {
                    0.0
                }
            };
            weights.set(key, valid);
        }

        weights
    }

    /// 把适配后的权重写入评估器
    pub fn apply(&self, evaluator: &mut Evaluator, profile: &dyn StyleIndicators) {
        let weights = self.adapt(profile);
        debug!(
            "Applying {} adaptation: {:?}",
            profile.dominant_style(),
            weights
        );
        evaluator.set_weights(weights);
    }

    /// 恢复基准权重
    pub fn reset(&self, evaluator: &mut Evaluator) {
        evaluator.set_weights(self.baseline);
    }

    /// 可读的适配说明
    pub fn explain(&self, profile: &dyn StyleIndicators) -> String {
        let style = profile.dominant_style();
        let adapted = self.adapt(profile);

        let changes: Vec<String> = adapted
            .iter()
            .filter_map(|(key, value)| {
                let delta = value - self.baseline.get(key);
                if delta.abs() <= EXPLAIN_THRESHOLD {
                    None
                } else if delta > 0.0 {
                    Some(format!("Increased {} by {:.2}", key, delta))
                } else {
                    Some(format!("Decreased {} by {:.2}", key, delta.abs()))
                }
            })
            .collect();

        if changes.is_empty() {
            format!("No significant adaptation needed for {} player", style)
        } else {
            format!("Adapting to {} player: {}", style, changes.join("; "))
        }
    }
}
