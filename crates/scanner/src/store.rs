//! 스냅샷 저장소 -- 최신 스냅샷과 스캔 히스토리
//!
//! [`StateStore`]는 복제 비용이 싼 핸들입니다. 수집 태스크가 유일한 쓰기 주체이고,
//! API 핸들러들이 읽기 주체입니다.
//!
//! 스냅샷 교체와 히스토리 추가는 하나의 임계 구역에서 일어나므로 읽기 측은
//! 항상 완성된 스냅샷과 그에 맞는 히스토리를 봅니다. 락은 포인터 교체와
//! 요약 복사 동안만 잡히며, 스캔이나 파싱 중에는 잡히지 않습니다.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use ironwave_core::types::{HistoryEntry, Snapshot};
use parking_lot::Mutex;

struct Inner {
    current: Arc<Snapshot>,
    history: VecDeque<HistoryEntry>,
    capacity: usize,
    published: u64,
}

/// 스냅샷 저장소 핸들
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<Mutex<Inner>>,
}

impl StateStore {
    /// 빈 스냅샷으로 저장소를 생성합니다.
    ///
    /// `history_capacity`가 0이면 1로 올립니다.
    pub fn new(history_capacity: usize) -> Self {
        let capacity = history_capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                current: Arc::new(Snapshot::empty()),
                history: VecDeque::with_capacity(capacity),
                capacity,
                published: 0,
            })),
        }
    }

    /// 새 스냅샷을 발행합니다.
    ///
    /// 히스토리가 가득 차면 가장 오래된 항목을 버립니다.
    /// 발행된 스냅샷의 공유 핸들을 반환합니다.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        // 요약은 락 밖에서 계산
        let entry = HistoryEntry::from_snapshot(&snapshot, Utc::now());
        let snapshot = Arc::new(snapshot);

        let mut inner = self.inner.lock();
        inner.current = Arc::clone(&snapshot);
        inner.history.push_front(entry);
        while inner.history.len() > inner.capacity {
            inner.history.pop_back();
        }
        inner.published = inner.published.saturating_add(1);
        snapshot
    }

    /// 현재 스냅샷. 첫 발행 전에는 빈 스냅샷입니다.
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.lock().current)
    }

    /// 히스토리 (최신순)
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.lock().history.iter().cloned().collect()
    }

    /// 히스토리 최대 개수
    pub fn history_capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// 지금까지 발행된 스냅샷 수
    pub fn published_count(&self) -> u64 {
        self.inner.lock().published
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(30)
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("StateStore")
            .field("method", &inner.current.method)
            .field("signals", &inner.current.signals.len())
            .field("history", &inner.history.len())
            .field("capacity", &inner.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironwave_core::types::INITIAL_METHOD;

    fn snapshot(method: &str) -> Snapshot {
        Snapshot::new(Vec::new(), method, Utc::now())
    }

    #[test]
    fn empty_before_first_publish() {
        let store = StateStore::new(5);
        let current = store.current_snapshot();
        assert!(current.signals.is_empty());
        assert_eq!(current.method, INITIAL_METHOD);
        assert!(current.scanned_at.is_none());
        assert!(store.history().is_empty());
        assert_eq!(store.published_count(), 0);
    }

    #[test]
    fn publish_replaces_current() {
        let store = StateStore::new(5);
        store.publish(snapshot("iw"));
        assert_eq!(store.current_snapshot().method, "iw");
        store.publish(snapshot("proc"));
        assert_eq!(store.current_snapshot().method, "proc");
        assert_eq!(store.published_count(), 2);
    }

    #[test]
    fn history_is_bounded_and_newest_first() {
        let store = StateStore::new(3);
        for method in ["a", "b", "c", "d", "e"] {
            store.publish(snapshot(method));
        }
        let methods: Vec<String> = store.history().into_iter().map(|h| h.method).collect();
        assert_eq!(methods, ["e", "d", "c"]);
    }

    #[test]
    fn old_snapshot_survives_replacement() {
        let store = StateStore::new(2);
        store.publish(snapshot("first"));
        let held = store.current_snapshot();
        store.publish(snapshot("second"));
        assert_eq!(held.method, "first");
        assert_eq!(store.current_snapshot().method, "second");
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let store = StateStore::new(0);
        store.publish(snapshot("a"));
        store.publish(snapshot("b"));
        assert_eq!(store.history_capacity(), 1);
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = StateStore::new(3);
        let reader = store.clone();
        store.publish(snapshot("dumpsys"));
        assert_eq!(reader.current_snapshot().method, "dumpsys");
    }
}
