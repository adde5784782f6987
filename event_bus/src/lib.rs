#![forbid(unsafe_code)]

//! Synchronous in-process publish/subscribe for UI events.
//!
//! Subscriptions are scoped resources: the handle returned by
//! [`EventBus::subscribe`] deregisters its listener when dropped, so
//! listener lifetime is tied to the owning component rather than living as
//! ambient global state.

use std::sync::{Arc, Mutex, Weak};

use render_canvas::TileCoord;

/// Named UI event types with small payloads. Dispatch is synchronous and
/// fire-and-forget; ordering follows publish order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    /// The layered canvases should repaint.
    RenderRequest,
    /// The active match advanced to a new turn.
    TurnProgress { turn: u32 },
    /// A click resolved to a game tile.
    TileClick { tile: TileCoord },
    /// The pointer, held down, entered a new game tile.
    TileDrag { tile: TileCoord },
    /// Right-button edge over the canvas (native context menu suppressed).
    ContextPress { pressed: bool },
}

type Listener = Box<dyn Fn(&UiEvent) + Send + 'static>;

struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<Registry>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers a listener for every published event. Listeners run on the
    /// publisher's thread and must not publish or subscribe re-entrantly.
    pub fn subscribe(&self, listener: impl Fn(&UiEvent) + Send + 'static) -> Subscription {
        let mut registry = lock_unpoisoned(&self.inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    pub fn publish(&self, event: &UiEvent) {
        let registry = lock_unpoisoned(&self.inner);
        for (_, listener) in &registry.listeners {
            listener(event);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        lock_unpoisoned(&self.inner).listeners.len()
    }
}

fn lock_unpoisoned<T>(mutex: &Arc<Mutex<T>>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Listener handle; dropping it deregisters the listener.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut guard = lock_unpoisoned(&registry);
            guard.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn published_events_reach_every_subscriber_in_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_a = Arc::clone(&seen);
        let _sub_a = bus.subscribe(move |event| {
            seen_a.lock().expect("seen lock").push(("a", *event));
        });
        let seen_b = Arc::clone(&seen);
        let _sub_b = bus.subscribe(move |event| {
            seen_b.lock().expect("seen lock").push(("b", *event));
        });

        bus.publish(&UiEvent::RenderRequest);
        bus.publish(&UiEvent::TurnProgress { turn: 3 });

        let log = seen.lock().expect("seen lock");
        assert_eq!(
            log.as_slice(),
            &[
                ("a", UiEvent::RenderRequest),
                ("b", UiEvent::RenderRequest),
                ("a", UiEvent::TurnProgress { turn: 3 }),
                ("b", UiEvent::TurnProgress { turn: 3 }),
            ]
        );
    }

    #[test]
    fn dropping_the_subscription_deregisters_the_listener() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));
        let hits_in = Arc::clone(&hits);
        let sub = bus.subscribe(move |_| {
            hits_in.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(&UiEvent::RenderRequest);
        drop(sub);
        bus.publish(&UiEvent::RenderRequest);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_the_bus_drops_quietly() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }
}
