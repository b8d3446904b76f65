use super::*;

#[test]
fn contains_is_true_until_ttl_elapses() {
    let mut cache: TtlCache<String> = TtlCache::new(Duration::from_millis(50), 10);
    let t0 = Instant::now();
    cache.insert("dedupe-key".to_string(), t0);

    assert!(cache.contains(&"dedupe-key".to_string(), t0));
    assert!(!cache.contains(&"dedupe-key".to_string(), t0 + Duration::from_millis(100)));
}

#[test]
fn capacity_evicts_oldest_entry_first() {
    let mut cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(300), 2);
    let t0 = Instant::now();
    cache.insert(1, t0);
    cache.insert(2, t0 + Duration::from_millis(1));
    cache.insert(3, t0 + Duration::from_millis(2));

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(&1, t0 + Duration::from_millis(2)));
    assert!(cache.contains(&3, t0 + Duration::from_millis(2)));
}

#[test]
fn eviction_is_lazy_and_bounds_memory_on_next_touch() {
    let mut cache: TtlCache<u32> = TtlCache::new(Duration::from_millis(10), 100);
    let t0 = Instant::now();
    for i in 0..50 {
        cache.insert(i, t0);
    }
    assert_eq!(cache.len(), 50);

    cache.insert(999, t0 + Duration::from_millis(50));
    assert_eq!(cache.len(), 1);
}
