// ==========================================
// 教务系统 - 成绩值生成
// ==========================================
// 偏置策略:
// - Fixed:      恒为固定值（钳制到 [0, 10]）
// - None:       [min, max] 均匀
// - Often10:    10 在区间内时 70% 取 10，其余均匀
// - Often9_10:  9、10 权重 35，其余权重 10
// - OftenGE8:   >=8 权重 25，其余权重 10
// 退化: min > max → min
// ==========================================

use crate::domain::{clamp_grade, BiasPolicy, GradeRule, GRADE_MAX};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Often10 命中 10 的概率
pub const OFTEN_10_PROBABILITY: f64 = 0.70;

const WEIGHT_BASE: u32 = 10;
const WEIGHT_9_10: u32 = 35;
const WEIGHT_GE_8: u32 = 25;

pub fn generate_grade<R>(rng: &mut R, rule: &GradeRule) -> i32
where
    R: Rng + ?Sized,
{
    let min = clamp_grade(rule.min_grade);
    let max = clamp_grade(rule.max_grade);

    if rule.bias == BiasPolicy::Fixed {
        return clamp_grade(rule.fixed_grade.unwrap_or(min));
    }
    if min > max {
        return min;
    }

    match rule.bias {
        BiasPolicy::Often10 => {
            if (min..=max).contains(&GRADE_MAX) && rng.random_bool(OFTEN_10_PROBABILITY) {
                GRADE_MAX
            } else {
                rng.random_range(min..=max)
            }
        }
        BiasPolicy::Often9To10 => weighted(rng, min, max, |v| {
            if v >= 9 {
                WEIGHT_9_10
            } else {
                WEIGHT_BASE
            }
        }),
        BiasPolicy::OftenGe8 => weighted(rng, min, max, |v| {
            if v >= 8 {
                WEIGHT_GE_8
            } else {
                WEIGHT_BASE
            }
        }),
        BiasPolicy::None | BiasPolicy::Fixed => rng.random_range(min..=max),
    }
}

fn weighted<R, F>(rng: &mut R, min: i32, max: i32, weight_of: F) -> i32
where
    R: Rng + ?Sized,
    F: Fn(i32) -> u32,
{
    let values: Vec<i32> = (min..=max).collect();
    let weights: Vec<u32> = values.iter().map(|v| weight_of(*v)).collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => values[dist.sample(rng)],
        Err(_) => rng.random_range(min..=max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rule(min: i32, max: i32, bias: BiasPolicy, fixed: Option<i32>) -> GradeRule {
        GradeRule {
            subject_name: "БД".to_string(),
            lesson_type: "ЛР".to_string(),
            allow_lecture: false,
            min_count: 1,
            max_count: 1,
            min_grade: min,
            max_grade: max,
            bias,
            fixed_grade: fixed,
        }
    }

    fn histogram(r: &GradeRule, draws: usize, seed: u64) -> [usize; 11] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = [0usize; 11];
        for _ in 0..draws {
            let v = generate_grade(&mut rng, r);
            assert!((0..=10).contains(&v));
            counts[v as usize] += 1;
        }
        counts
    }

    #[test]
    fn test_fixed_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(generate_grade(&mut rng, &rule(0, 10, BiasPolicy::Fixed, Some(9))), 9);
        assert_eq!(generate_grade(&mut rng, &rule(0, 10, BiasPolicy::Fixed, Some(42))), 10);
        assert_eq!(generate_grade(&mut rng, &rule(0, 10, BiasPolicy::Fixed, Some(-1))), 0);
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(8);
        for bias in [BiasPolicy::None, BiasPolicy::Often10, BiasPolicy::OftenGe8] {
            assert_eq!(generate_grade(&mut rng, &rule(8, 3, bias, None)), 8);
        }
    }

    #[test]
    fn test_values_stay_in_rule_range() {
        let counts = histogram(&rule(4, 9, BiasPolicy::None, None), 2_000, 9);
        assert_eq!(counts[..4].iter().sum::<usize>(), 0);
        assert_eq!(counts[10], 0);
    }

    #[test]
    fn test_often10_hits_ten_about_seventy_percent() {
        let counts = histogram(&rule(0, 10, BiasPolicy::Often10, None), 10_000, 42);
        // 0.70 + 0.30 / 11 ≈ 0.727
        let ratio = counts[10] as f64 / 10_000.0;
        assert!((0.70..=0.76).contains(&ratio), "ratio = {}", ratio);
    }

    #[test]
    fn test_often10_without_ten_in_range_is_uniform() {
        let counts = histogram(&rule(3, 6, BiasPolicy::Often10, None), 4_000, 11);
        assert_eq!(counts[10], 0);
        for v in 3..=6 {
            assert!(counts[v] > 800, "value {} drawn {} times", v, counts[v]);
        }
    }

    #[test]
    fn test_often9_10_weight_ratio() {
        // 区间 [7, 10]: 权重 10,10,35,35 → P(9|10) = 70/90
        let counts = histogram(&rule(7, 10, BiasPolicy::Often9To10, None), 9_000, 5);
        let high = (counts[9] + counts[10]) as f64 / 9_000.0;
        assert!((0.74..=0.81).contains(&high), "high = {}", high);
    }

    #[test]
    fn test_often_ge8_weight_ratio() {
        // 区间 [6, 9]: 权重 10,10,25,25 → P(>=8) = 50/70
        let counts = histogram(&rule(6, 9, BiasPolicy::OftenGe8, None), 7_000, 6);
        let high = (counts[8] + counts[9]) as f64 / 7_000.0;
        assert!((0.68..=0.75).contains(&high), "high = {}", high);
    }
}
