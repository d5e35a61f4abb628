use super::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Default)]
struct Counter {
    hits: u32,
    cleared: Rc<Cell<bool>>,
}

impl ViewModel for Counter {
    fn on_cleared(&mut self) {
        self.cleared.set(true);
    }
}

#[test]
fn models_are_created_once_per_type() {
    let mut store = ViewModelStore::new();
    store.get_or_insert_with(Counter::default).hits += 1;
    store.get_or_insert_with(Counter::default).hits += 1;
    assert_eq!(store.get::<Counter>().map(|c| c.hits), Some(2));
    assert_eq!(store.len(), 1);
}

#[test]
fn clear_notifies_models() {
    let flag = Rc::new(Cell::new(false));
    let mut store = ViewModelStore::new();
    store.get_or_insert_with(|| Counter {
        hits: 0,
        cleared: Rc::clone(&flag),
    });
    store.clear();
    assert!(flag.get());
    assert!(store.is_empty());
}
