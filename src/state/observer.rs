/// Change notification for the state holders
///
/// Holders call `notify` after every mutation that changes what is on
/// screen; subscribers decide what to redraw.

type Listener<E> = Box<dyn Fn(&E) + Send>;

pub struct Listeners<E> {
    listeners: Vec<Listener<E>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<E> Listeners<E> {
    pub fn subscribe(&mut self, listener: impl Fn(&E) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn notify(&self, event: &E) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E> std::fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_every_listener_is_called() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut listeners: Listeners<u32> = Listeners::default();
        for _ in 0..3 {
            let hits = hits.clone();
            listeners.subscribe(move |n| {
                hits.fetch_add(*n as usize, Ordering::SeqCst);
            });
        }
        listeners.notify(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 6);
        assert_eq!(listeners.len(), 3);
    }
}
