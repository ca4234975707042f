//! Coalesces bursts of document mutations into a single re-scan.

use crate::features::schedule::{Scheduler, TimerHandle};

/// Delay after the last mutation burst before the document is re-scanned.
pub const RESCAN_DELAY_MS: u32 = 80;

/// `Node.ELEMENT_NODE`.
pub const ELEMENT_NODE: u16 = 1;

/// Only element insertions can introduce new CTAs; text and comment nodes are
/// ignored.
pub fn adds_elements(node_types: impl IntoIterator<Item = u16>) -> bool {
    node_types.into_iter().any(|node_type| node_type == ELEMENT_NODE)
}

/// Keeps at most one pending task; each trigger replaces (and so cancels) the
/// previous one.
pub struct Debouncer {
    delay_ms: u32,
    pending: Option<Box<dyn TimerHandle>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(RESCAN_DELAY_MS)
    }
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn trigger(&mut self, scheduler: &dyn Scheduler, task: Box<dyn FnOnce()>) {
        self.pending = Some(scheduler.schedule(self.delay_ms, task));
    }
}

#[cfg(test)]
mod tests {
    use super::{Debouncer, adds_elements};
    use crate::features::schedule::{Scheduler, TimerHandle};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Handle(Rc<Cell<bool>>);

    impl TimerHandle for Handle {}

    impl Drop for Handle {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[derive(Default)]
    struct ManualScheduler {
        tasks: RefCell<Vec<(u32, Rc<Cell<bool>>, Box<dyn FnOnce()>)>>,
    }

    impl Scheduler for ManualScheduler {
        fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
            let cancelled = Rc::new(Cell::new(false));
            self.tasks
                .borrow_mut()
                .push((delay_ms, Rc::clone(&cancelled), task));
            Box::new(Handle(cancelled))
        }
    }

    impl ManualScheduler {
        fn run_live(&self) {
            let tasks = self.tasks.take();
            for (_, cancelled, task) in tasks {
                if !cancelled.get() {
                    task();
                }
            }
        }
    }

    #[test]
    fn bursts_collapse_into_the_last_trigger() {
        let scheduler = ManualScheduler::default();
        let runs = Rc::new(Cell::new(0));
        let mut debouncer = Debouncer::default();

        for _ in 0..3 {
            let runs = Rc::clone(&runs);
            debouncer.trigger(&scheduler, Box::new(move || runs.set(runs.get() + 1)));
        }
        assert!(scheduler.tasks.borrow().iter().all(|(delay, _, _)| *delay == 80));

        scheduler.run_live();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn dropping_the_debouncer_drops_its_task() {
        let scheduler = ManualScheduler::default();
        let runs = Rc::new(Cell::new(0));
        let mut debouncer = Debouncer::new(10);
        let counter = Rc::clone(&runs);
        debouncer.trigger(&scheduler, Box::new(move || counter.set(counter.get() + 1)));
        drop(debouncer);
        scheduler.run_live();
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn only_element_insertions_trigger_rescans() {
        assert!(adds_elements([3, 1]));
        assert!(!adds_elements([3, 8]));
        assert!(!adds_elements([]));
    }
}
