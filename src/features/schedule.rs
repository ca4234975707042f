//! Delayed callbacks and page navigation, the two effects that outlive the
//! event handler that requested them.

/// A scheduled callback. Dropping the handle cancels the callback if it has not
/// run yet.
pub trait TimerHandle {}

pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Box<dyn TimerHandle>;
}

/// Full-page navigation.
pub trait Navigator {
    fn navigate(&self, url: &str);
}
