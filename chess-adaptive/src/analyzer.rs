//! 风格分析
//!
//! 单步走法的特征提取，以及从一段走法窗口重新推导画像的风格分数。
//! 材料相关的数值都以兵为单位（兵 1、马象 3、车 5、后 9、王 100）。

use serde::{Deserialize, Serialize};

use chess_core::{BoardState, Color, MoveGenerator, PieceType, Square};

use crate::profile::PlayerProfile;

/// 以兵为单位的子力价值
pub fn pawn_units(kind: PieceType) -> i32 {
    match kind {
        PieceType::Pawn => 1,
        PieceType::Knight | PieceType::Bishop => 3,
        PieceType::Rook => 5,
        PieceType::Queen => 9,
        PieceType::King => 100,
    }
}

/// 单步走法的风格特征
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveAnalysis {
    pub from: Square,
    pub to: Square,
    pub color: Color,
    pub piece: PieceType,
    pub target: Option<PieceType>,
    pub is_capture: bool,
    pub is_check: bool,
    pub is_castling: bool,
    pub is_promotion: bool,
    /// 朝对方底线方向移动
    pub move_forward: bool,
    /// 落点在中心四格
    pub central_square: bool,
    /// 落点两格范围内的敌子价值，按距离衰减
    pub attacking_value: f64,
    /// 落点两格范围内的己方子力价值，按距离衰减
    pub defensive_value: f64,
    /// 吃子收益：被吃子价值减去走子价值
    pub material_gain: i32,
}

impl MoveAnalysis {
    /// 落点相对于走子方的横线（0 为己方底线）
    pub fn relative_rank(&self) -> u8 {
        match self.color {
            Color::White => self.to.rank,
            Color::Black => 7 - self.to.rank,
        }
    }
}

/// 风格分析器
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleAnalyzer;

impl StyleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 在走子前的局面上分析走法，起点无子时返回 None
    pub fn analyze_move(&self, state: &BoardState, from: Square, to: Square) -> Option<MoveAnalysis> {
        let piece = state.get(from)?;
        let color = piece.color;

        let en_passant = piece.kind == PieceType::Pawn
            && state.en_passant == Some(to)
            && from.file != to.file;
        let target = state
            .get(to)
            .filter(|t| t.color != color)
            .map(|t| t.kind)
            .or(en_passant.then_some(PieceType::Pawn));

        let is_castling = piece.kind == PieceType::King && from.file.abs_diff(to.file) == 2;
        let move_forward = match color {
            Color::White => to.rank > from.rank,
            Color::Black => to.rank < from.rank,
        };

        let mut scratch = state.clone();
        let is_check = scratch.make_move(from, to, None)
            && MoveGenerator::is_in_check(&scratch.board, color.opponent());

        Some(MoveAnalysis {
            from,
            to,
            color,
            piece: piece.kind,
            target,
            is_capture: target.is_some(),
            is_check,
            is_castling,
            is_promotion: piece.kind == PieceType::Pawn && to.rank == color.promotion_rank(),
            move_forward,
            central_square: to.is_center(),
            attacking_value: Self::neighborhood_value(state, from, to, color.opponent()),
            defensive_value: Self::neighborhood_value(state, from, to, color),
            material_gain: target.map_or(0, |t| pawn_units(t) - pawn_units(piece.kind)),
        })
    }

    /// 落点周围 5x5 范围内某方棋子的价值和，距离按切比雪夫距离衰减。
    /// 走子本身所在的起点不计入。
    fn neighborhood_value(state: &BoardState, from: Square, to: Square, owner: Color) -> f64 {
        let mut value = 0.0;
        for dr in -2i8..=2 {
            for df in -2i8..=2 {
                if dr == 0 && df == 0 {
                    continue;
                }
                let Some(sq) = to.offset(df, dr) else {
                    continue;
                };
                if sq == from {
                    continue;
                }
                if let Some(piece) = state.get(sq).filter(|p| p.color == owner) {
                    let distance = dr.unsigned_abs().max(df.unsigned_abs()) as f64;
                    value += pawn_units(piece.kind) as f64 / distance;
                }
            }
        }
        value
    }

    /// 用一段走法窗口重新推导画像的风格分数，空窗口不做修改
    pub fn update_profile(&self, profile: &mut PlayerProfile, moves: &[MoveAnalysis]) {
        if moves.is_empty() {
            return;
        }
        let total = moves.len() as f64;
        let share = |pred: &dyn Fn(&MoveAnalysis) -> bool| {
            moves.iter().filter(|&m| pred(m)).count() as f64 / total
        };

        profile.capture_rate = share(&|m: &MoveAnalysis| m.is_capture);
        profile.check_rate = share(&|m: &MoveAnalysis| m.is_check);
        profile.castle_rate = share(&|m: &MoveAnalysis| m.is_castling);
        profile.trade_willingness = profile.capture_rate;

        let aggression: Vec<f64> = moves.iter().map(move_aggression).collect();
        profile.aggression_score = clamp01(0.2 + mean(&aggression) * 0.6);

        let defensive = moves
            .iter()
            .zip(&aggression)
            .map(|(m, &a)| move_defensiveness(m, a))
            .sum::<f64>();
        profile.defensive_score = clamp01(0.2 + defensive / total * 0.7);

        profile.tactical_score = windowed_score(moves, move_tactics, 0.2, 0.8, 0.6);
        profile.positional_score = windowed_score(moves, move_positional, 0.15, 0.8, 0.6);

        let central = moves
            .iter()
            .filter(|m| m.central_square)
            .map(|m| pawn_units(m.piece) as f64 / 15.0)
            .sum::<f64>();
        profile.central_control_preference = clamp01(0.2 + central / total * 1.2);

        profile.piece_activity_preference = share(&|m: &MoveAnalysis| {
            matches!(
                m.piece,
                PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen
            )
        });
        profile.pawn_structure_focus =
            share(&|m: &MoveAnalysis| m.piece == PieceType::Pawn && !m.is_capture);

        let king_safety = moves.iter().map(move_king_safety).sum::<f64>();
        profile.king_safety_focus = clamp01(0.2 + king_safety / total * 0.8);

        profile.endgame_score = windowed_score(moves, move_endgame, 0.1, 1.0, 0.5);

        let (blunder_rate, mistake_control) = mistake_profile(moves);
        profile.blunder_rate = blunder_rate;
        profile.mistake_control = mistake_control;

        profile.touch();
    }
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.5
    } else {
        x.clamp(0.0, 1.0)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// `0.2 + 平均单步分 * scale`，并且不低于显著走法占比乘以 `share_scale`
fn windowed_score(
    moves: &[MoveAnalysis],
    per_move: fn(&MoveAnalysis) -> f64,
    significant: f64,
    scale: f64,
    share_scale: f64,
) -> f64 {
    let total = moves.len() as f64;
    let scores: Vec<f64> = moves.iter().map(per_move).collect();
    let count = scores.iter().filter(|&&s| s > significant).count();
    let mut score = clamp01(0.2 + scores.iter().sum::<f64>() / total * scale);
    if count > 0 {
        score = score.max(count as f64 / total * share_scale);
    }
    score
}

fn move_aggression(m: &MoveAnalysis) -> f64 {
    let mut score = 0.0;
    if m.is_capture {
        score += 0.3 + m.target.map_or(0.0, |t| pawn_units(t) as f64 / 30.0);
    }
    if m.is_check {
        score += 0.4;
    }
    if m.piece == PieceType::Pawn && m.move_forward {
        score += 0.2;
    }
    if m.material_gain < -3 {
        score += 0.5;
    } else if m.material_gain < -1 {
        score += 0.2;
    }
    if m.attacking_value > 20.0 {
        score += 0.3;
    } else if m.attacking_value > 10.0 {
        score += 0.15;
    }
    if matches!(m.piece, PieceType::Queen | PieceType::Rook) && m.move_forward {
        score += 0.15;
    }
    score
}

fn move_defensiveness(m: &MoveAnalysis, aggression: f64) -> f64 {
    let mut score = 0.0;
    if m.is_castling {
        score += 0.5;
    }
    if m.defensive_value > 15.0 {
        score += 0.4;
    } else if m.defensive_value > 8.0 {
        score += 0.2;
    }
    if !m.is_capture {
        if m.material_gain <= 0 {
            score += 0.1;
        }
        if m.piece == PieceType::Pawn {
            score += 0.15;
        }
        let retreating_piece = matches!(
            m.piece,
            PieceType::Rook | PieceType::Bishop | PieceType::Queen
        ) && !m.central_square
            && !m.move_forward;
        if retreating_piece {
            score += 0.1;
        }
    }
    if aggression < 0.2 {
        score += 0.1;
    }
    score
}

fn move_tactics(m: &MoveAnalysis) -> f64 {
    let mut score = 0.0;
    if m.is_check {
        score += 0.5;
    }
    if m.material_gain >= 5 {
        score += 0.6;
    } else if m.material_gain >= 3 {
        score += 0.4;
    } else if m.material_gain > 0 {
        score += 0.2;
    }
    if m.attacking_value > 25.0 {
        score += 0.4;
    } else if m.attacking_value > 15.0 {
        score += 0.2;
    }
    if m.piece == PieceType::Knight && m.central_square {
        score += 0.15;
    }
    score
}

fn move_positional(m: &MoveAnalysis) -> f64 {
    let mut score = 0.0;
    if m.is_capture {
        return score;
    }
    if m.central_square {
        score += 0.2 + pawn_units(m.piece) as f64 / 50.0;
    }
    score += match m.piece {
        PieceType::Knight | PieceType::Bishop => 0.25,
        PieceType::Rook => 0.2,
        PieceType::Pawn => 0.15,
        _ => 0.0,
    };
    if !m.is_check && m.material_gain <= 0 {
        score += 0.1;
    }
    score
}

fn move_king_safety(m: &MoveAnalysis) -> f64 {
    if m.is_castling {
        0.5
    } else if m.piece == PieceType::King {
        0.2
    } else if m.defensive_value > 10.0 {
        0.1
    } else {
        0.0
    }
}

fn move_endgame(m: &MoveAnalysis) -> f64 {
    let mut score = 0.0;
    match m.piece {
        PieceType::King => {
            score += if m.move_forward || m.central_square { 0.4 } else { 0.2 };
        }
        PieceType::Pawn => {
            if m.move_forward {
                let rank = m.relative_rank();
                if rank >= 5 {
                    score += 0.5;
                } else if rank >= 3 {
                    score += 0.3;
                }
            }
            if m.is_capture {
                score += 0.2;
            }
            if m.is_promotion {
                score += 0.6;
            }
        }
        PieceType::Queen | PieceType::Rook => {
            if m.is_capture || m.is_check {
                score += 0.25;
            }
        }
        _ => {}
    }
    score
}

/// 返回 (漏着率, 失误控制)
fn mistake_profile(moves: &[MoveAnalysis]) -> (f64, f64) {
    let total = moves.len() as f64;
    let mut blunders = 0.0;
    let mut mistakes = 0.0;
    for m in moves {
        if m.material_gain < -5 {
            blunders += 1.0;
        } else if m.material_gain < -2 {
            mistakes += 1.0;
        } else if m.material_gain < -1 {
            mistakes += 0.5;
        }
    }

    let blunder_rate = clamp01((2.0 * blunders + mistakes) / (2.0 * total).max(1.0));
    let mistake_control = if blunders == 0.0 && mistakes == 0.0 {
        0.9
    } else if blunders == 0.0 {
        (1.0 - mistakes / total * 0.5).max(0.7)
    } else {
        (1.0 - blunders / total * 1.2).max(0.0)
    };
    (blunder_rate, clamp01(mistake_control))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn test_analyze_quiet_pawn_move() {
        let state = BoardState::initial();
        let analysis = StyleAnalyzer::new()
            .analyze_move(&state, sq("e2"), sq("e4"))
            .unwrap();

        assert_eq!(analysis.piece, PieceType::Pawn);
        assert_eq!(analysis.color, Color::White);
        assert!(!analysis.is_capture);
        assert!(!analysis.is_check);
        assert!(analysis.move_forward);
        assert!(analysis.central_square);
        assert_eq!(analysis.material_gain, 0);
        // d2、f2、d1、e1、f1 等己方子在两格范围内
        assert!(analysis.defensive_value > 0.0);
        assert_eq!(analysis.attacking_value, 0.0);
    }

    #[test]
    fn test_analyze_capture_and_check() {
        // 白后吃 f7 兵并将军
        let state =
            BoardState::from_fen("rnbqkbnr/pppp1ppp/8/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 0 1")
                .unwrap();
        let analysis = StyleAnalyzer::new()
            .analyze_move(&state, sq("f3"), sq("f7"))
            .unwrap();

        assert!(analysis.is_capture);
        assert!(analysis.is_check);
        assert_eq!(analysis.target, Some(PieceType::Pawn));
        assert_eq!(analysis.material_gain, 1 - 9);
        assert!(analysis.attacking_value > 100.0, "黑王在旁边");
    }

    #[test]
    fn test_analyze_castling_and_en_passant() {
        let state = BoardState::from_fen("4k3/8/8/3pP3/8/8/8/4K2R w K d6 0 1").unwrap();
        let analyzer = StyleAnalyzer::new();

        let castle = analyzer.analyze_move(&state, sq("e1"), sq("g1")).unwrap();
        assert!(castle.is_castling);
        assert!(!castle.move_forward);

        let ep = analyzer.analyze_move(&state, sq("e5"), sq("d6")).unwrap();
        assert!(ep.is_capture);
        assert_eq!(ep.target, Some(PieceType::Pawn));
        assert_eq!(ep.material_gain, 0);
    }

    #[test]
    fn test_analyze_empty_square() {
        let state = BoardState::initial();
        assert!(StyleAnalyzer::new()
            .analyze_move(&state, sq("e4"), sq("e5"))
            .is_none());
    }

    #[test]
    fn test_black_forward_and_relative_rank() {
        let mut state = BoardState::initial();
        assert!(state.make_move(sq("e2"), sq("e4"), None));
        let analysis = StyleAnalyzer::new()
            .analyze_move(&state, sq("d7"), sq("d5"))
            .unwrap();
        assert_eq!(analysis.color, Color::Black);
        assert!(analysis.move_forward);
        assert_eq!(analysis.relative_rank(), 3);
    }

    #[test]
    fn test_update_profile_bounds() {
        let analyzer = StyleAnalyzer::new();
        let aggressive = MoveAnalysis {
            from: sq("d1"),
            to: sq("d7"),
            color: Color::White,
            piece: PieceType::Queen,
            target: Some(PieceType::Queen),
            is_capture: true,
            is_check: true,
            is_castling: false,
            is_promotion: false,
            move_forward: true,
            central_square: false,
            attacking_value: 150.0,
            defensive_value: 0.0,
            material_gain: 0,
        };

        let mut profile = PlayerProfile::new("p1");
        analyzer.update_profile(&mut profile, &[aggressive; 10]);

        for value in [
            profile.aggression_score,
            profile.defensive_score,
            profile.tactical_score,
            profile.positional_score,
            profile.endgame_score,
            profile.mistake_control,
            profile.blunder_rate,
            profile.trade_willingness,
            profile.king_safety_focus,
            profile.central_control_preference,
        ] {
            assert!((0.0..=1.0).contains(&value), "分数应在 [0, 1]: {}", value);
        }
        assert!(profile.aggression_score > 0.65, "连续吃子将军应判定为进攻型");
        assert_eq!(profile.trade_willingness, 1.0);
        assert_eq!(profile.mistake_control, 0.9);
    }

    #[test]
    fn test_update_profile_defensive() {
        let analyzer = StyleAnalyzer::new();
        let quiet = MoveAnalysis {
            from: sq("e1"),
            to: sq("g1"),
            color: Color::White,
            piece: PieceType::King,
            target: None,
            is_capture: false,
            is_check: false,
            is_castling: true,
            is_promotion: false,
            move_forward: false,
            central_square: false,
            attacking_value: 0.0,
            defensive_value: 20.0,
            material_gain: 0,
        };

        let mut profile = PlayerProfile::new("p1");
        analyzer.update_profile(&mut profile, &[quiet; 6]);
        assert!(profile.defensive_score > 0.65);
        assert!(profile.aggression_score < 0.65);
        assert_eq!(profile.castle_rate, 1.0);
        assert!(profile.king_safety_focus > 0.5);
    }

    #[test]
    fn test_update_profile_empty_is_noop() {
        let mut profile = PlayerProfile::new("p1");
        let before = profile.clone();
        StyleAnalyzer::new().update_profile(&mut profile, &[]);
        assert_eq!(profile, before);
    }

    #[test]
    fn test_mistake_profile() {
        let mut m = StyleAnalyzer::new()
            .analyze_move(&BoardState::initial(), sq("g1"), sq("f3"))
            .unwrap();
        m.material_gain = -8;
        let (blunder_rate, control) = mistake_profile(&[m, m]);
        assert_eq!(blunder_rate, 1.0);
        assert_eq!(control, 0.0);
    }
}
