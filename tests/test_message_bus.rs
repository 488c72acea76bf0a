/// Tests for the message bus delivery contract
///
/// Covers ordering, unsubscription, no-subscriber publishes and teardown
/// through the public API only.
use drumpad::bus::{events, BeepEvent, Handler, HandlerResult, MessageBus};
use std::cell::RefCell;
use std::rc::Rc;

/// Helper: handler that appends `tag` to a shared log
fn tagged(log: &Rc<RefCell<Vec<String>>>, tag: &str) -> Rc<dyn Handler<BeepEvent>> {
    let log = Rc::clone(log);
    let tag = tag.to_string();
    Rc::new(move |event: &BeepEvent| -> HandlerResult {
        log.borrow_mut().push(format!("{}:{}", tag, event.name));
        Ok(())
    })
}

// ============================================================================
// TEST: Delivery
// ============================================================================

#[test]
fn test_publish_with_no_subscribers_calls_nothing() {
    let bus: MessageBus = MessageBus::new();
    assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Kick")), 0);
    assert_eq!(bus.subscriber_count(events::BEEP), 0);
}

#[test]
fn test_handlers_run_in_subscription_order() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    for tag in ["first", "second", "third", "fourth"] {
        bus.subscribe(events::BEEP, tagged(&log, tag)).unwrap();
    }
    assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Snare")), 4);

    assert_eq!(
        *log.borrow(),
        vec!["first:Snare", "second:Snare", "third:Snare", "fourth:Snare"]
    );
}

#[test]
fn test_event_types_are_independent() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    bus.subscribe(events::BEEP, tagged(&log, "beep")).unwrap();
    bus.subscribe("boop", tagged(&log, "boop")).unwrap();
    bus.publish("boop", &BeepEvent::new("x"));

    assert_eq!(*log.borrow(), vec!["boop:x"]);
}

// ============================================================================
// TEST: Unsubscribe
// ============================================================================

#[test]
fn test_unsubscribed_handler_is_not_called() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = tagged(&log, "a");
    let b = tagged(&log, "b");

    bus.subscribe(events::BEEP, Rc::clone(&a)).unwrap();
    bus.subscribe(events::BEEP, Rc::clone(&b)).unwrap();
    assert!(bus.unsubscribe(events::BEEP, &a));
    assert!(!bus.unsubscribe(events::BEEP, &a), "already removed");

    bus.publish(events::BEEP, &BeepEvent::new("Crash"));
    assert_eq!(*log.borrow(), vec!["b:Crash"]);
}

#[test]
fn test_equal_looking_handlers_are_distinct() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = tagged(&log, "same");
    let b = tagged(&log, "same");

    bus.subscribe(events::BEEP, Rc::clone(&a)).unwrap();
    assert!(!bus.unsubscribe(events::BEEP, &b));
    assert_eq!(bus.subscriber_count(events::BEEP), 1);
}

#[test]
fn test_unsubscribe_all_clears_only_that_type() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    bus.subscribe(events::BEEP, tagged(&log, "a")).unwrap();
    bus.subscribe(events::BEEP, tagged(&log, "b")).unwrap();
    bus.subscribe("other", tagged(&log, "c")).unwrap();

    assert_eq!(bus.unsubscribe_all(events::BEEP), 2);
    assert_eq!(bus.unsubscribe_all(events::BEEP), 0, "nothing left to remove");

    assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Kick")), 0);
    assert_eq!(bus.publish("other", &BeepEvent::new("Kick")), 1);
    assert_eq!(*log.borrow(), vec!["c:Kick"]);
}

// ============================================================================
// TEST: Teardown
// ============================================================================

#[test]
fn test_destroy_twice_then_publish_is_silent() {
    let bus = MessageBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    bus.subscribe(events::BEEP, tagged(&log, "a")).unwrap();
    bus.subscribe("other", tagged(&log, "b")).unwrap();

    bus.destroy();
    bus.destroy();

    assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Kick")), 0);
    assert_eq!(bus.publish("other", &BeepEvent::new("Kick")), 0);
    assert!(log.borrow().is_empty());
}
