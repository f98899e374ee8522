//! 结果汇总
//!
//! 合并各批次结果，按内容去重，截断到目标数量。

use std::collections::HashSet;

/// 单次生成调用请求的默认题目数量
///
/// 数量过大时模型回复容易被截断，JSON 无法解析
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// 用于去重的内容标识
pub trait ContentIdentity {
    fn identity_key(&self) -> &str;
}

impl ContentIdentity for String {
    fn identity_key(&self) -> &str {
        self
    }
}

/// 批次规划
///
/// 每个批次都请求 `batch_size` 个，总数可能超过目标，用来抵消去重损失
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub target: usize,
    pub batch_size: usize,
    pub batch_count: usize,
}

impl BatchPlan {
    pub fn for_target(target: usize, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            target,
            batch_size,
            batch_count: target.div_ceil(batch_size),
        }
    }

    /// 计划请求的总数量
    pub fn requested(&self) -> usize {
        self.batch_count * self.batch_size
    }
}

/// 合并、去重并截断
///
/// 先按批次顺序再按批内顺序展开，相同标识保留第一次出现的，
/// 数量不足时原样返回，不做填充。
pub fn aggregate<I, B>(batches: B, target: usize) -> Vec<I>
where
    I: ContentIdentity,
    B: IntoIterator<Item = Vec<I>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for item in batches.into_iter().flatten() {
        if merged.len() >= target {
            break;
        }
        if seen.insert(item.identity_key().to_string()) {
            merged.push(item);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        text: &'static str,
        tag: u8,
    }

    impl ContentIdentity for Item {
        fn identity_key(&self) -> &str {
            self.text
        }
    }

    fn item(text: &'static str, tag: u8) -> Item {
        Item { text, tag }
    }

    #[test]
    fn test_dedup_then_truncate() {
        let (a, b, c) = (item("a", 0), item("b", 0), item("c", 0));
        let batches = vec![vec![a.clone(), b.clone(), a.clone()], vec![c, b.clone()]];
        assert_eq!(aggregate(batches, 2), vec![a, b]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let batches = vec![vec![item("q", 1)], vec![item("q", 2), item("r", 2)]];
        let merged = aggregate(batches, 10);
        assert_eq!(merged, vec![item("q", 1), item("r", 2)]);
    }

    #[test]
    fn test_under_delivery_is_not_padded() {
        let batches = vec![vec![item("a", 0), item("a", 0)], vec![item("b", 0)]];
        assert_eq!(aggregate(batches, 5).len(), 2);
    }

    #[test]
    fn test_identity_key_compared_exactly() {
        let batches = vec![vec!["Rust".to_string(), "rust".to_string(), " Rust".to_string(), "Rust".to_string()]];
        assert_eq!(
            aggregate(batches, 5),
            vec!["Rust".to_string(), "rust".to_string(), " Rust".to_string()]
        );
    }

    #[test]
    fn test_batch_plan_rounds_up() {
        let plan = BatchPlan::for_target(25, 10);
        assert_eq!(plan.batch_count, 3);
        assert_eq!(plan.requested(), 30);

        assert_eq!(BatchPlan::for_target(20, 10).batch_count, 2);
        assert_eq!(BatchPlan::for_target(0, 10).batch_count, 0);
        assert_eq!(BatchPlan::for_target(3, 0).batch_size, 1);
    }
}
