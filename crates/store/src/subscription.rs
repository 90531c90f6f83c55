use std::sync::{Arc, Mutex, PoisonError};

/// Change callback registered with a store.
pub type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

type SharedListener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T: ?Sized> {
    next_id: u64,
    listeners: Vec<(u64, SharedListener<T>)>,
}

/// Listener registry behind a store's change feed.
pub struct Subscribers<T: ?Sized> {
    inner: Arc<Mutex<Registry<T>>>,
}

impl<T: ?Sized + 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + 'static> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, listener: Listener<T>) -> Subscription {
        self.register(Arc::from(listener))
    }

    /// Registers `listener`, then calls it once with `current`.
    ///
    /// Callers hold the lock guarding `current` for the whole call, so a commit
    /// cannot swap the value between registration and the first delivery.
    pub fn subscribe_with(&self, listener: Listener<T>, current: &T) -> Subscription {
        let listener: SharedListener<T> = Arc::from(listener);
        let subscription = self.register(listener.clone());
        listener(current);
        subscription
    }

    fn register(&self, listener: SharedListener<T>) -> Subscription {
        let id = {
            let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, listener));
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut registry = inner.lock().unwrap_or_else(PoisonError::into_inner);
                    registry.listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Calls every listener in registration order. The registry lock is released first,
    /// so listeners may subscribe or unsubscribe.
    pub fn notify(&self, value: &T) {
        let listeners: Vec<SharedListener<T>> = {
            let registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Active registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(subscribers: &Subscribers<u32>, hits: &Arc<AtomicUsize>) -> Subscription {
        let hits = hits.clone();
        subscribers.subscribe(Box::new(move |v: &u32| {
            hits.fetch_add(*v as usize, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_notify_reaches_all_listeners() {
        let subscribers = Subscribers::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let _a = counter(&subscribers, &hits);
        let _b = counter(&subscribers, &hits);
        subscribers.notify(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 4);
        assert_eq!(subscribers.len(), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let subscribers = Subscribers::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let a = counter(&subscribers, &hits);
        let b = counter(&subscribers, &hits);
        drop(a);
        subscribers.notify(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        b.unsubscribe();
        subscribers.notify(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(subscribers.is_empty());
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let subscribers = Subscribers::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = counter(&subscribers, &hits);
        drop(subscribers);
        drop(sub);
    }

    #[test]
    fn test_subscribe_with_registers_before_first_call() {
        let subscribers = Arc::new(Subscribers::<u32>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (inner, log) = (subscribers.clone(), seen.clone());
        let sub = subscribers.subscribe_with(
            Box::new(move |v: &u32| {
                log.lock().unwrap().push((*v, inner.len()));
            }),
            &7,
        );
        subscribers.notify(&8);
        assert_eq!(*seen.lock().unwrap(), vec![(7, 1), (8, 1)]);

        drop(sub);
        assert!(subscribers.is_empty());
    }

    #[test]
    fn test_unsized_payload() {
        let subscribers = Subscribers::<[u32]>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let _sub = subscribers.subscribe(Box::new(move |v: &[u32]| {
            seen.fetch_add(v.len(), Ordering::SeqCst);
        }));
        subscribers.notify(&[1, 2, 3][..]);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
