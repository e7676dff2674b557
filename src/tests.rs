use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::StoreError;
use crate::index::NodeIndex;
use crate::node::Node;
use crate::store::EventStore;
use crate::{Event, EventMap};

struct EventGenerator {
    rng: StdRng,
    unique: HashSet<i32>,
    next_id: u64,
    limit: i32,
}

impl EventGenerator {
    fn new(seed: [u8; 32]) -> Self {
        const LIMIT: i32 = 1000;
        Self {
            rng: SeedableRng::from_seed(seed),
            unique: HashSet::new(),
            next_id: 0,
            limit: LIMIT,
        }
    }

    fn next(&mut self) -> Event<i32> {
        let start = self.rng.gen_range(0..self.limit);
        let duration = self.rng.gen_range(1..60);
        let id = self.next_id;
        self.next_id += 1;
        Event::new(id, start, start + duration, format!("event-{id}"))
    }

    fn next_unique(&mut self) -> Event<i32> {
        let mut event = self.next();
        while self.unique.contains(&event.start) {
            event = self.next();
        }
        self.unique.insert(event.start);
        event
    }

    fn range(&mut self) -> (i32, i32) {
        let lo = self.rng.gen_range(0..self.limit);
        let hi = self.rng.gen_range(lo..self.limit);
        (lo, hi)
    }
}

impl EventMap<i32> {
    fn check_invariants(&self) {
        let _ignore = self.check_at(self.root, None, None);
    }

    /// Verifies the height bookkeeping, the AVL balance bound and the BST
    /// order. Ties descend right on insert but rotations can lift an equal
    /// key above its duplicates, so left descendants satisfy `start <=` the
    /// ancestor and right descendants satisfy `start >=` it.
    fn check_at(&self, x: NodeIndex<u32>, lo: Option<i32>, hi: Option<i32>) -> u32 {
        if self.node_ref(x, Node::is_sentinel) {
            return 0;
        }
        let start = *self.node_ref(x, Node::start);
        if let Some(lo) = lo {
            assert!(start >= lo, "start {start} below subtree bound {lo}");
        }
        if let Some(hi) = hi {
            assert!(start <= hi, "start {start} above subtree bound {hi}");
        }
        let left_height = self.check_at(self.node_ref(x, Node::left), lo, Some(start));
        let right_height = self.check_at(self.node_ref(x, Node::right), Some(start), hi);
        assert!(
            left_height.abs_diff(right_height) <= 1,
            "unbalanced at start {start}: {left_height} vs {right_height}"
        );
        let height = 1 + left_height.max(right_height);
        assert_eq!(self.node_ref(x, Node::height), height);
        height
    }
}

fn with_map_and_generator(test_fn: impl Fn(EventMap<i32>, EventGenerator)) {
    let seeds = vec![[0; 32], [1; 32], [2; 32]];
    for seed in seeds {
        let gen = EventGenerator::new(seed);
        let map = EventMap::new();
        test_fn(map, gen);
    }
}

#[test]
fn avl_invariants_hold_after_random_inserts() {
    with_map_and_generator(|mut map, mut gen| {
        for _ in 0..1000 {
            map.insert(gen.next());
            map.check_invariants();
        }
    });
}

#[test]
fn avl_invariants_hold_after_random_removals() {
    with_map_and_generator(|mut map, mut gen| {
        let events: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(1000)
            .collect();
        for event in events.clone() {
            map.insert(event);
        }
        for event in &events {
            assert!(map.remove_by_start(&event.start).is_some());
            map.check_invariants();
        }
        assert!(map.is_empty());
    });
}

#[test]
fn height_stays_logarithmic() {
    with_map_and_generator(|mut map, mut gen| {
        for _ in 0..1000 {
            map.insert(gen.next());
        }
        let bound = 1.44 * ((map.len() + 2) as f64).log2();
        assert!(f64::from(map.height()) <= bound);
    });
}

#[test]
fn map_len_will_update() {
    with_map_and_generator(|mut map, mut gen| {
        let events: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(100)
            .collect();
        for event in events.clone() {
            map.insert(event);
        }
        assert_eq!(map.len(), 100);
        for event in &events {
            let _ignore = map.remove_by_start(&event.start);
        }
        assert_eq!(map.len(), 0);
    });
}

#[test]
fn remove_non_exist_start_will_do_nothing() {
    with_map_and_generator(|mut map, mut gen| {
        let limit = gen.limit;
        for _ in 0..1000 {
            map.insert(gen.next());
        }
        assert_eq!(map.len(), 1000);
        for start in limit..limit + 100 {
            assert_eq!(map.remove_by_start(&start), None);
        }
        assert_eq!(map.len(), 1000);
        map.check_invariants();
    });
}

#[test]
fn get_by_id_round_trip() {
    with_map_and_generator(|mut map, mut gen| {
        let events: Vec<_> = std::iter::repeat_with(|| gen.next()).take(500).collect();
        for event in events.clone() {
            map.insert(event);
        }
        for event in &events {
            assert_eq!(map.get_by_id(event.id), Some(event));
        }
        assert_eq!(map.get_by_id(events.len() as u64 + 1), None);
    });
}

#[test]
fn removal_is_complete() {
    with_map_and_generator(|mut map, mut gen| {
        let events: Vec<_> = std::iter::repeat_with(|| gen.next_unique())
            .take(100)
            .collect();
        for event in events.clone() {
            map.insert(event);
        }
        let victim = &events[42];
        assert_eq!(map.remove_by_start(&victim.start).as_ref(), Some(victim));
        assert_eq!(map.get_by_id(victim.id), None);
        for event in events.iter().filter(|e| e.id != victim.id) {
            assert_eq!(map.get_by_id(event.id), Some(event));
        }
    });
}

#[test]
fn range_search_matches_brute_force() {
    with_map_and_generator(|mut map, mut gen| {
        let events: Vec<_> = std::iter::repeat_with(|| gen.next()).take(1000).collect();
        for event in events.clone() {
            map.insert(event);
        }
        for _ in 0..100 {
            let (lo, hi) = gen.range();
            let mut expect: Vec<_> = events
                .iter()
                .filter(|e| lo <= e.start && e.start <= hi)
                .collect();
            let mut result = map.range_search(&lo, &hi);
            expect.sort_unstable_by_key(|e| (e.start, e.id));
            result.sort_unstable_by_key(|e| (e.start, e.id));
            assert_eq!(expect, result);
        }
    });
}

#[test]
fn range_iter_equal_to_range_search() {
    with_map_and_generator(|mut map, mut gen| {
        let events: Vec<_> = std::iter::repeat_with(|| gen.next()).take(1000).collect();
        for event in events {
            map.insert(event);
        }
        for _ in 0..100 {
            let (lo, hi) = gen.range();
            let iter_result: Vec<_> = map.range_iter(&lo, &hi).collect();
            let mut starts: Vec<_> = iter_result.iter().map(|e| e.start).collect();
            assert!(starts.windows(2).all(|w| w[0] <= w[1]));
            starts.sort_unstable();

            let mut search_starts: Vec<_> =
                map.range_search(&lo, &hi).iter().map(|e| e.start).collect();
            search_starts.sort_unstable();
            assert_eq!(starts, search_starts);
        }
    });
}

#[test]
fn iterate_through_map_is_sorted() {
    with_map_and_generator(|mut map, mut gen| {
        for _ in 0..1000 {
            map.insert(gen.next());
        }
        let starts: Vec<_> = map.iter().map(|e| e.start).collect();
        assert_eq!(starts.len(), 1000);
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    });
}

#[test]
fn equal_start_events_are_all_kept() {
    let mut map = EventMap::new();
    for id in 0..5 {
        map.insert(Event::new(id, 10, 20, format!("dup-{id}")));
    }
    assert_eq!(map.len(), 5);
    map.check_invariants();
    assert_eq!(map.range_search(&10, &10).len(), 5);
    for left in (0..5usize).rev() {
        assert!(map.remove_by_start(&10).is_some());
        assert_eq!(map.len(), left);
        map.check_invariants();
    }
    assert_eq!(map.remove_by_start(&10), None);
}

#[test]
fn range_search_keeps_boundary_duplicates() {
    // Duplicates of a bound can end up on either side of it: ties descend
    // right on insert, and rotations can lift an equal key above one.
    let mut map = EventMap::new();
    let starts = [20, 10, 30, 10, 30, 10, 30, 5, 35];
    for (id, start) in starts.into_iter().enumerate() {
        map.insert(Event::new(id as u64, start, start + 1, "boundary"));
    }
    map.check_invariants();
    for (lo, hi) in [(10, 10), (30, 30), (10, 30), (30, 35), (5, 10)] {
        let mut got: Vec<u64> = map.range_search(&lo, &hi).iter().map(|e| e.id).collect();
        got.sort_unstable();
        let expect: Vec<u64> = starts
            .iter()
            .enumerate()
            .filter(|&(_, s)| (lo..=hi).contains(s))
            .map(|(id, _)| id as u64)
            .collect();
        assert_eq!(got, expect, "range [{lo}, {hi}]");
    }
}

#[test]
fn event_map_clear_is_ok() {
    let mut map = EventMap::new();
    map.insert(Event::new(1, 1, 3, "a"));
    map.insert(Event::new(2, 2, 4, "b"));
    map.insert(Event::new(3, 6, 7, "c"));
    assert_eq!(map.len(), 3);
    map.clear();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.nodes.len(), 1);
    assert!(map.nodes[0].is_sentinel());
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn store_returns_range_sorted_by_start() {
    init_logs();
    let mut store = EventStore::new();
    store
        .add_event(1, "01/01/2024 10:00:00", "01/01/2024 11:00:00", "Standup")
        .unwrap();
    store
        .add_event(2, "01/01/2024 09:00:00", "01/01/2024 09:30:00", "Prep")
        .unwrap();
    let matches = store
        .search_by_range("01/01/2024 08:00:00", "01/01/2024 12:00:00")
        .unwrap();
    let summary: Vec<_> = matches
        .events
        .iter()
        .map(|r| (r.id, r.name.as_str()))
        .collect();
    assert_eq!(summary, vec![(2, "Prep"), (1, "Standup")]);
}

#[test]
fn store_rejects_duplicate_ids() {
    init_logs();
    let mut store = EventStore::new();
    store
        .add_event(5, "01/01/2024 10:00:00", "01/01/2024 11:00:00", "First")
        .unwrap();
    let err = store
        .add_event(5, "05/06/2024 08:00:00", "05/06/2024 09:00:00", "Second")
        .unwrap_err();
    assert_eq!(err, StoreError::DuplicateId(5));
    assert_eq!(store.len(), 1);
    assert_eq!(store.search_event("5").unwrap().name, "First");
}

#[test]
fn store_remove_of_missing_id_changes_nothing() {
    init_logs();
    let mut store = EventStore::new();
    store
        .add_event(1, "01/01/2024 10:00:00", "01/01/2024 11:00:00", "Standup")
        .unwrap();
    store
        .add_event(2, "01/01/2024 09:00:00", "01/01/2024 09:30:00", "Prep")
        .unwrap();
    let height_before = store.tree.height();

    assert_eq!(store.remove_event("99"), Err(StoreError::NotFound(99)));
    assert_eq!(store.len(), 2);
    assert_eq!(store.tree.height(), height_before);
    assert_eq!(store.search_event("1").unwrap().name, "Standup");
    assert_eq!(store.search_event("2").unwrap().name, "Prep");
}

#[test]
fn store_removed_event_is_gone() {
    init_logs();
    let mut store = EventStore::new();
    store
        .add_event(1, "01/01/2024 10:00:00", "01/01/2024 11:00:00", "Standup")
        .unwrap();
    store
        .add_event(2, "01/01/2024 09:00:00", "01/01/2024 09:30:00", "Prep")
        .unwrap();
    let removed = store.remove_event("1").unwrap();
    assert_eq!((removed.id, removed.name.as_str()), (1, "Standup"));
    assert_eq!(store.search_event("1"), Err(StoreError::NotFound(1)));
    assert_eq!(store.search_event("2").unwrap().name, "Prep");
}

#[test]
fn store_validates_tokens() {
    init_logs();
    let mut store = EventStore::new();
    assert_eq!(
        store.add_event(1, "not a date", "01/01/2024 11:00:00", "X"),
        Err(StoreError::InvalidDateFormat("not a date".to_owned()))
    );
    assert_eq!(
        store.remove_event("five"),
        Err(StoreError::InvalidId("five".to_owned()))
    );
    assert_eq!(
        store.search_event("1.5"),
        Err(StoreError::InvalidId("1.5".to_owned()))
    );
    assert!(store.is_empty());
}

#[test]
fn store_reports_empty_ranges() {
    init_logs();
    let mut store = EventStore::new();
    store
        .add_event(1, "01/01/2024 10:00:00", "01/01/2024 11:00:00", "Standup")
        .unwrap();
    let err = store
        .search_by_range("02/01/2024 00:00:00", "03/01/2024 00:00:00")
        .unwrap_err();
    assert!(matches!(err, StoreError::EmptyRange { .. }));
}
