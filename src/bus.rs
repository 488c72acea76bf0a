//! In-process publish/subscribe message bus
//!
//! Producers publish a payload under an event type; every handler
//! subscribed to that type is called synchronously, in subscription order,
//! before `publish` returns. Key principles:
//! - Registration per event type (only interested handlers are notified)
//! - Delivery iterates a snapshot taken at publish time, so handlers may
//!   subscribe or unsubscribe while being called
//! - A failing handler is logged and skipped; the rest still run
//!
//! ```
//! use drumpad::bus::{events, BeepEvent, Handler, HandlerResult, MessageBus};
//! use std::rc::Rc;
//!
//! let bus = MessageBus::new();
//! let handler: Rc<dyn Handler<BeepEvent>> = Rc::new(|event: &BeepEvent| -> HandlerResult {
//!     println!("beep: {}", event.name);
//!     Ok(())
//! });
//! bus.subscribe(events::BEEP, Rc::clone(&handler)).unwrap();
//! assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Kick")), 1);
//! ```

use crate::error::{DrumpadError, DrumpadResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Event type names understood by the pad
pub mod events {
    /// Request to play a sound; payload is [`super::BeepEvent`]
    pub const BEEP: &str = "beep";
}

/// Payload of [`events::BEEP`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeepEvent {
    pub name: String,
}

impl BeepEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub type HandlerResult = Result<(), Box<dyn std::error::Error>>;

/// Something that reacts to payloads of type `P`
pub trait Handler<P> {
    fn handle(&self, payload: &P) -> HandlerResult;
}

impl<P, F> Handler<P> for F
where
    F: Fn(&P) -> HandlerResult,
{
    fn handle(&self, payload: &P) -> HandlerResult {
        self(payload)
    }
}

type Subscribers<P> = HashMap<String, Vec<Rc<dyn Handler<P>>>>;

/// Publish/subscribe registry keyed by event type.
///
/// `None` inside means the bus was destroyed; it stays inert until [`reset`](Self::reset).
pub struct MessageBus<P = BeepEvent> {
    subscribers: RefCell<Option<Subscribers<P>>>,
}

impl<P> Default for MessageBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> MessageBus<P> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Some(HashMap::new())),
        }
    }

    /// Append `handler` to the list for `event_type`. The same handler may be
    /// subscribed more than once and is then called once per subscription.
    pub fn subscribe(&self, event_type: &str, handler: Rc<dyn Handler<P>>) -> DrumpadResult<()> {
        let mut guard = self.subscribers.borrow_mut();
        let subscribers = guard.as_mut().ok_or(DrumpadError::BusDestroyed)?;
        subscribers
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
        debug!("Subscribed handler to '{}'", event_type);
        Ok(())
    }

    /// Deliver `payload` to every handler of `event_type`, in order.
    /// Returns how many handlers were called.
    pub fn publish(&self, event_type: &str, payload: &P) -> usize {
        let snapshot: Vec<Rc<dyn Handler<P>>> = match self.subscribers.borrow().as_ref() {
            Some(subscribers) => match subscribers.get(event_type) {
                Some(handlers) => handlers.clone(),
                None => return 0,
            },
            None => return 0,
        };

        for handler in &snapshot {
            if let Err(e) = handler.handle(payload) {
                warn!("Handler for '{}' failed: {}", event_type, e);
            }
        }
        snapshot.len()
    }

    /// Remove the first subscription of `handler` to `event_type`.
    /// Handlers are matched by identity, not by value.
    pub fn unsubscribe(&self, event_type: &str, handler: &Rc<dyn Handler<P>>) -> bool {
        let mut guard = self.subscribers.borrow_mut();
        let Some(handlers) = guard.as_mut().and_then(|s| s.get_mut(event_type)) else {
            return false;
        };

        let target = Rc::as_ptr(handler) as *const ();
        match handlers
            .iter()
            .position(|h| Rc::as_ptr(h) as *const () == target)
        {
            Some(idx) => {
                handlers.remove(idx);
                debug!("Unsubscribed handler from '{}'", event_type);
                true
            }
            None => false,
        }
    }

    /// Drop every subscription for `event_type`; returns how many were removed
    pub fn unsubscribe_all(&self, event_type: &str) -> usize {
        self.subscribers
            .borrow_mut()
            .as_mut()
            .and_then(|s| s.remove(event_type))
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscribers
            .borrow()
            .as_ref()
            .and_then(|s| s.get(event_type))
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Unsubscribe every event type and retire the bus. Safe to call more than once.
    pub fn destroy(&self) {
        let types: Vec<String> = match self.subscribers.borrow().as_ref() {
            Some(subscribers) => subscribers.keys().cloned().collect(),
            None => return,
        };
        for event_type in &types {
            self.unsubscribe_all(event_type);
        }
        *self.subscribers.borrow_mut() = None;
        debug!("Message bus destroyed ({} event types)", types.len());
    }

    /// Bring a destroyed (or used) bus back to an empty registry
    pub fn reset(&self) {
        *self.subscribers.borrow_mut() = Some(HashMap::new());
    }

    pub fn is_destroyed(&self) -> bool {
        self.subscribers.borrow().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter(count: &Rc<Cell<usize>>) -> Rc<dyn Handler<BeepEvent>> {
        let count = Rc::clone(count);
        Rc::new(move |_: &BeepEvent| -> HandlerResult {
            count.set(count.get() + 1);
            Ok(())
        })
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus: MessageBus = MessageBus::new();
        assert_eq!(bus.publish("nobody-listens", &BeepEvent::new("Kick")), 0);
    }

    #[test]
    fn test_duplicate_subscription_is_called_twice() {
        let bus = MessageBus::new();
        let count = Rc::new(Cell::new(0));
        let handler = counter(&count);

        bus.subscribe(events::BEEP, Rc::clone(&handler)).unwrap();
        bus.subscribe(events::BEEP, Rc::clone(&handler)).unwrap();
        bus.publish(events::BEEP, &BeepEvent::new("Kick"));

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unsubscribe_removes_only_first_match() {
        let bus = MessageBus::new();
        let count = Rc::new(Cell::new(0));
        let handler = counter(&count);

        bus.subscribe(events::BEEP, Rc::clone(&handler)).unwrap();
        bus.subscribe(events::BEEP, Rc::clone(&handler)).unwrap();
        assert!(bus.unsubscribe(events::BEEP, &handler));

        assert_eq!(bus.subscriber_count(events::BEEP), 1);
        bus.publish(events::BEEP, &BeepEvent::new("Kick"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_type_is_false() {
        let bus: MessageBus = MessageBus::new();
        let handler = counter(&Rc::new(Cell::new(0)));
        assert!(!bus.unsubscribe("other", &handler));
    }

    #[test]
    fn test_failing_handler_does_not_stop_delivery() {
        let bus = MessageBus::new();
        let count = Rc::new(Cell::new(0));
        let failing: Rc<dyn Handler<BeepEvent>> =
            Rc::new(|_: &BeepEvent| -> HandlerResult { Err("speaker on fire".into()) });

        bus.subscribe(events::BEEP, failing).unwrap();
        bus.subscribe(events::BEEP, counter(&count)).unwrap();

        assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Crash")), 2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_publish() {
        let bus = Rc::new(MessageBus::new());
        let slot: Rc<RefCell<Option<Rc<dyn Handler<BeepEvent>>>>> = Rc::new(RefCell::new(None));

        let bus_in = Rc::clone(&bus);
        let slot_in = Rc::clone(&slot);
        let once: Rc<dyn Handler<BeepEvent>> = Rc::new(move |_: &BeepEvent| -> HandlerResult {
            if let Some(me) = slot_in.borrow().as_ref() {
                bus_in.unsubscribe(events::BEEP, me);
            }
            Ok(())
        });
        *slot.borrow_mut() = Some(Rc::clone(&once));
        bus.subscribe(events::BEEP, once).unwrap();

        assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Kick")), 1);
        assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Kick")), 0);

        // break the cycle
        slot.borrow_mut().take();
    }

    #[test]
    fn test_destroy_then_reset() {
        let bus = MessageBus::new();
        let handler = counter(&Rc::new(Cell::new(0)));
        bus.subscribe(events::BEEP, Rc::clone(&handler)).unwrap();

        bus.destroy();
        bus.destroy();

        assert!(bus.is_destroyed());
        assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Kick")), 0);
        assert!(matches!(
            bus.subscribe(events::BEEP, Rc::clone(&handler)),
            Err(DrumpadError::BusDestroyed)
        ));

        bus.reset();
        assert!(bus.subscribe(events::BEEP, handler).is_ok());
    }
}
