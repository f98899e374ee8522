use std::sync::atomic::{AtomicUsize, Ordering};

/// 任务队列游标
///
/// 所有 worker 共享，`claim` 必须是原子的：同一个索引只能被领取一次。
pub trait TaskCursor: Send + Sync {
    /// 领取下一个未被领取的任务索引
    fn claim(&self) -> usize;
}

/// 基于 `AtomicUsize` 的游标
#[derive(Debug, Default)]
pub struct AtomicCursor {
    next: AtomicUsize,
}

impl AtomicCursor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskCursor for AtomicCursor {
    fn claim(&self) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_claims_are_sequential() {
        let cursor = AtomicCursor::new();
        assert_eq!(cursor.claim(), 0);
        assert_eq!(cursor.claim(), 1);
        assert_eq!(cursor.claim(), 2);
    }

    #[test]
    fn test_concurrent_claims_are_unique() {
        let cursor = Arc::new(AtomicCursor::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cursor = cursor.clone();
                std::thread::spawn(move || (0..500).map(|_| cursor.claim()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for index in handle.join().unwrap() {
                assert!(seen.insert(index), "索引 {} 被重复领取", index);
            }
        }
        assert_eq!(seen.len(), 4000);
        assert_eq!(seen.iter().max(), Some(&3999));
    }
}
