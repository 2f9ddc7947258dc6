//! Correlation store for edited-message recompiles and callback buttons.
//!
//! Requests are keyed by the message that carried the code (so an edit can
//! re-trigger the compile); results by the bot's reply (so the asm/output
//! buttons can re-render without recompiling). Both maps are bounded with
//! least-recently-used eviction; the router wraps the store in a mutex.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::domain::MessageKey;
use crate::explorer::types::CompileRequest;
use crate::result::CompileResult;

/// The stored half of a compile request: everything except the source, which
/// comes from the (possibly edited) message itself.
#[derive(Clone, Debug)]
pub struct PendingCompile {
    pub compiler_id: String,
    pub user_arguments: String,
}

impl PendingCompile {
    pub fn with_source(&self, source: &str) -> CompileRequest {
        CompileRequest {
            compiler_id: self.compiler_id.clone(),
            source: source.to_string(),
            user_arguments: self.user_arguments.clone(),
        }
    }
}

#[derive(Debug)]
struct LruMap<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Copy + Eq + Hash, V> LruMap<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn insert(&mut self, key: K, value: V) {
        if self.map.insert(key, value).is_some() {
            self.touch(key);
            return;
        }
        self.order.push_back(key);
        if self.map.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.map.remove(&evicted);
            }
        }
    }

    fn get(&mut self, key: K) -> Option<&V> {
        if self.map.contains_key(&key) {
            self.touch(key);
        }
        self.map.get(&key)
    }

    fn touch(&mut self, key: K) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
            self.order.push_back(key);
        }
    }
}

#[derive(Debug)]
pub struct ReplyStore {
    requests: LruMap<MessageKey, PendingCompile>,
    results: LruMap<MessageKey, CompileResult>,
}

impl ReplyStore {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        Self {
            requests: LruMap::new(capacity),
            results: LruMap::new(capacity),
        }
    }

    pub fn add_request(&mut self, key: MessageKey, request: PendingCompile) {
        self.requests.insert(key, request);
    }

    pub fn request(&mut self, key: MessageKey) -> Option<PendingCompile> {
        self.requests.get(key).cloned()
    }

    pub fn add_result(&mut self, key: MessageKey, result: CompileResult) {
        self.results.insert(key, result);
    }

    pub fn result(&mut self, key: MessageKey) -> Option<CompileResult> {
        self.results.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, MessageId};

    fn key(id: i32) -> MessageKey {
        MessageKey::new(ChatId(7), MessageId(id))
    }

    fn pending(compiler: &str) -> PendingCompile {
        PendingCompile {
            compiler_id: compiler.to_string(),
            user_arguments: "-O2".to_string(),
        }
    }

    #[test]
    fn stores_and_recalls_requests() {
        let mut store = ReplyStore::new(8);
        store.add_request(key(1), pending("g112"));
        let got = store.request(key(1)).unwrap();
        assert_eq!(got.compiler_id, "g112");
        assert!(store.request(key(2)).is_none());
    }

    #[test]
    fn rebuilds_request_with_new_source() {
        let req = pending("g112").with_source("int main() {}");
        assert_eq!(req.compiler_id, "g112");
        assert_eq!(req.source, "int main() {}");
        assert_eq!(req.user_arguments, "-O2");
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut store = ReplyStore::new(2);
        store.add_request(key(1), pending("a"));
        store.add_request(key(2), pending("b"));
        store.add_request(key(3), pending("c"));
        assert!(store.request(key(1)).is_none());
        assert!(store.request(key(2)).is_some());
        assert!(store.request(key(3)).is_some());
    }

    #[test]
    fn recently_used_entries_survive() {
        let mut store = ReplyStore::new(2);
        store.add_request(key(1), pending("a"));
        store.add_request(key(2), pending("b"));
        // Touch 1 so 2 becomes the eviction candidate.
        let _ = store.request(key(1));
        store.add_request(key(3), pending("c"));
        assert!(store.request(key(1)).is_some());
        assert!(store.request(key(2)).is_none());
    }

    #[test]
    fn reinsert_updates_in_place() {
        let mut store = ReplyStore::new(2);
        store.add_request(key(1), pending("a"));
        store.add_request(key(1), pending("b"));
        assert_eq!(store.request(key(1)).unwrap().compiler_id, "b");
        // The reinsert did not consume a second slot.
        store.add_request(key(2), pending("c"));
        assert!(store.request(key(1)).is_some());
        assert!(store.request(key(2)).is_some());
    }
}
