// ==========================================
// 教务系统 - 成绩数量抽取
// ==========================================
// 规则:
// - min_count <= 0 → 0（本规则对该学生不产生成绩）
// - max_count < min_count → 固定为 min_count
// - 否则在 [min_count, max_count] 内均匀抽取
// ==========================================

use rand::Rng;

pub fn pick_count<R>(rng: &mut R, min_count: i32, max_count: i32) -> usize
where
    R: Rng + ?Sized,
{
    if min_count <= 0 {
        return 0;
    }
    if max_count <= min_count {
        return min_count as usize;
    }
    rng.random_range(min_count..=max_count) as usize
}
