//! Thread-safe single-slot broadcaster
//!
//! An [`Observable`] holds the latest posted value and fans each post out to
//! every registered callback. Callbacks run synchronously on the posting
//! thread; the value slot and the registration map are the only state shared
//! across threads, each behind its own lock.
//!
//! Dispatch iterates a snapshot of the registration map, so a
//! [`Subscription`] may be dropped from any thread at any time, including
//! while a post is mid-dispatch, without corrupting the set or deadlocking.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Shared<T> {
    value: Mutex<T>,
    // BTreeMap keyed by registration token: dispatch order is deterministic
    callbacks: Mutex<BTreeMap<u64, Callback<T>>>,
    next_token: AtomicU64,
}

/// Single-slot broadcaster for values of type `T`.
///
/// Cheap to clone; clones share the same slot and registration set.
pub struct Observable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Default + Send + 'static> Observable<T> {
    /// New observable holding `T::default()` until the first post
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                value: Mutex::new(T::default()),
                callbacks: Mutex::new(BTreeMap::new()),
                next_token: AtomicU64::new(0),
            }),
        }
    }

    /// Store `value` as latest, then invoke every registered callback with it.
    ///
    /// Callbacks run outside both locks, so a concurrent [`Self::value`] call
    /// never waits on callback execution.
    pub fn post(&self, value: T) {
        *self.shared.value.lock() = value.clone();
        let snapshot: Vec<Callback<T>> = self.shared.callbacks.lock().values().cloned().collect();
        for callback in snapshot {
            callback(&value);
        }
    }

    /// Latest posted value, or `T::default()` before any post
    pub fn value(&self) -> T {
        self.shared.value.lock().clone()
    }

    /// Register `callback`, invoked on every subsequent post.
    ///
    /// The registration lives until the returned handle is dropped.
    pub fn observe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let token = self.shared.next_token.fetch_add(1, Ordering::Relaxed);
        self.shared.callbacks.lock().insert(token, Arc::new(callback));
        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        Subscription {
            unobserve: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.callbacks.lock().remove(&token);
                }
            })),
        }
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.shared.callbacks.lock().len()
    }
}

impl<T: Clone + Default + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ownership token for one active callback registration.
///
/// Dropping it deregisters the callback. Holds only a weak reference to the
/// registry, so dropping after the observable itself is gone is a no-op.
pub struct Subscription {
    unobserve: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Deregister now instead of waiting for drop
    pub fn unobserve(mut self) {
        if let Some(f) = self.unobserve.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unobserve.take() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_value_before_post_is_default() {
        let obs: Observable<u32> = Observable::new();
        assert_eq!(obs.value(), 0);
    }

    #[test]
    fn test_latest_value_wins() {
        let obs: Observable<u32> = Observable::new();
        for v in 1..=5 {
            obs.post(v);
        }
        assert_eq!(obs.value(), 5);
    }

    #[test]
    fn test_fan_out_and_deregistration() {
        let obs: Observable<u32> = Observable::new();
        let hits = Arc::new(Mutex::new(vec![0usize; 3]));

        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let hits = Arc::clone(&hits);
                obs.observe(move |_| hits.lock()[i] += 1)
            })
            .collect();

        obs.post(7);
        assert_eq!(*hits.lock(), vec![1, 1, 1]);

        // Dropping handle 1 must leave the other two registered
        let mut subs = subs;
        drop(subs.remove(1));
        assert_eq!(obs.observer_count(), 2);

        obs.post(8);
        assert_eq!(*hits.lock(), vec![2, 1, 2]);
        assert_eq!(obs.value(), 8);
    }

    #[test]
    fn test_drop_after_observable_gone() {
        let obs: Observable<u32> = Observable::new();
        let sub = obs.observe(|_| {});
        drop(obs);
        drop(sub); // must not panic
    }

    #[test]
    fn test_explicit_unobserve() {
        let obs: Observable<u32> = Observable::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = obs.observe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        obs.post(1);
        sub.unobserve();
        obs.post(2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_post_stress() {
        const PRODUCERS: usize = 4;
        const POSTS: usize = 250;

        let obs: Observable<u64> = Observable::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _sub = obs.observe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let obs = obs.clone();
                thread::spawn(move || {
                    for i in 0..POSTS {
                        obs.post((p * POSTS + i + 1) as u64);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Every post dispatched exactly once; final value is one of the posts
        assert_eq!(count.load(Ordering::SeqCst), PRODUCERS * POSTS);
        let v = obs.value();
        assert!(v >= 1 && v <= (PRODUCERS * POSTS) as u64);
    }
}
