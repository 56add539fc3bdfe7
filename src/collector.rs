//! Build-scoped accumulation of generated class rules.
//!
//! The host may transform files concurrently; the collector is the only
//! shared mutable state in the pipeline, so appends are serialized behind a
//! mutex and stay in arrival order. Flushing drains the store — a second
//! flush without intervening transforms emits nothing.

use lazy_static::lazy_static;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct StyleCollector {
    rules: Mutex<Vec<String>>,
}

impl StyleCollector {
    pub fn new() -> Self {
        StyleCollector::default()
    }

    /// Append one generated rule.
    pub fn append(&self, rule: String) {
        self.rules.lock().unwrap().push(rule);
    }

    /// Append a batch of rules (cache replay).
    pub fn extend<I: IntoIterator<Item = String>>(&self, rules: I) {
        self.rules.lock().unwrap().extend(rules);
    }

    /// Take every collected rule, leaving the collector empty.
    pub fn drain(&self) -> Vec<String> {
        let mut rules = self.rules.lock().unwrap();
        std::mem::take(&mut *rules)
    }

    pub fn len(&self) -> usize {
        self.rules.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

lazy_static! {
    static ref COLLECTED: StyleCollector = StyleCollector::new();
}

/// The process-wide collector backing the napi surface. Library callers
/// that want per-build isolation construct their own [`StyleCollector`].
pub fn global() -> &'static StyleCollector {
    &COLLECTED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let collector = StyleCollector::new();
        collector.append(".A-a { color: red; }".to_string());
        collector.append(".B-b { color: blue; }".to_string());
        assert_eq!(collector.len(), 2);
        let rules = collector.drain();
        assert!(rules[0].starts_with(".A-a"));
        assert!(rules[1].starts_with(".B-b"));
    }

    #[test]
    fn test_drain_empties_exactly_once() {
        let collector = StyleCollector::new();
        collector.append(".A-a { color: red; }".to_string());
        assert_eq!(collector.drain().len(), 1);
        assert!(collector.drain().is_empty());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_concurrent_append_loses_nothing() {
        use std::sync::Arc;

        let collector = Arc::new(StyleCollector::new());
        let mut handles = Vec::new();
        for t in 0..4 {
            let collector = Arc::clone(&collector);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    collector.append(format!(".T{}-r{} {{ }}", t, i));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(collector.len(), 200);
    }
}
