// ==========================================
// 教务系统 - 不重复日期抽取
// ==========================================
// 规则:
// - n == 0 或候选为空 → 空
// - n >= 候选数量 → 全部候选（排序去重）
// - 否则随机打乱后取前 n 个, 再排序
// ==========================================

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

pub fn pick_distinct_dates<R>(rng: &mut R, pool: &[NaiveDate], n: usize) -> Vec<NaiveDate>
where
    R: Rng + ?Sized,
{
    let mut dates: Vec<NaiveDate> = pool.to_vec();
    dates.sort_unstable();
    dates.dedup();

    if n == 0 || dates.is_empty() {
        return Vec::new();
    }
    if n >= dates.len() {
        return dates;
    }

    dates.shuffle(rng);
    dates.truncate(n);
    dates.sort_unstable();
    dates
}
