//! Controller that plays a beep set in response to bus events

use crate::audio::AudioSink;
use crate::beep_set::{self, BeepSet};
use crate::bus::{events, BeepEvent, Handler, HandlerResult, MessageBus};
use crate::error::DrumpadResult;
use crate::sample_loader::SampleBank;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, trace};

/// Model shared between a controller (owner) and views (readers)
pub type SharedBeepSet = Rc<RefCell<BeepSet>>;

/// Bus-facing half of the controller
struct BeepListener {
    model: SharedBeepSet,
}

impl Handler<BeepEvent> for BeepListener {
    fn handle(&self, event: &BeepEvent) -> HandlerResult {
        play_named(&self.model, event);
        Ok(())
    }
}

fn play_named(model: &SharedBeepSet, event: &BeepEvent) {
    let Ok(model) = model.try_borrow() else {
        debug!("Beep set busy, dropping '{}'", event.name);
        return;
    };
    match model.get(&event.name) {
        Some(beep) => beep.play(),
        None => trace!("No sound named '{}'", event.name),
    }
}

/// Owns a [`BeepSet`] and plays from it whenever `beep` is published.
///
/// Destroying the controller (explicitly or on drop) unsubscribes it and
/// destroys the set it owns.
pub struct BeepSetController {
    model: SharedBeepSet,
    bus: Rc<MessageBus<BeepEvent>>,
    listener: Option<Rc<dyn Handler<BeepEvent>>>,
}

impl BeepSetController {
    pub fn new(bus: Rc<MessageBus<BeepEvent>>, model: BeepSet) -> DrumpadResult<Self> {
        let model = Rc::new(RefCell::new(model));
        let listener: Rc<dyn Handler<BeepEvent>> = Rc::new(BeepListener {
            model: Rc::clone(&model),
        });
        bus.subscribe(events::BEEP, Rc::clone(&listener))?;
        info!("Controller listening for '{}'", events::BEEP);

        Ok(Self {
            model,
            bus,
            listener: Some(listener),
        })
    }

    /// Controller over the drum kit
    pub fn drums(
        bus: Rc<MessageBus<BeepEvent>>,
        bank: &mut SampleBank,
        sink: Rc<dyn AudioSink>,
    ) -> DrumpadResult<Self> {
        Self::new(bus, beep_set::drums(bank, sink))
    }

    /// Shared handle to the model, for views
    pub fn model(&self) -> SharedBeepSet {
        Rc::clone(&self.model)
    }

    /// Play the beep named in `event`; unknown names are ignored
    pub fn on_beep(&self, event: &BeepEvent) {
        play_named(&self.model, event);
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Unsubscribe from the bus and destroy the owned set. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.bus.unsubscribe(events::BEEP, &listener);
            debug!("Controller stopped listening");
        }
        if let Ok(mut model) = self.model.try_borrow_mut() {
            model.destroy();
        }
    }
}

impl Drop for BeepSetController {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingSink;
    use crate::sample_loader::StereoSample;

    fn setup() -> (Rc<MessageBus>, Rc<RecordingSink>, BeepSetController) {
        let bus = Rc::new(MessageBus::new());
        let sink = Rc::new(RecordingSink::new());
        let mut bank = SampleBank::new("/nonexistent");
        bank.insert("a.wav", StereoSample::mono(vec![0.2; 8], 44100));

        let sink_dyn: Rc<dyn AudioSink> = sink.clone();
        let model = BeepSet::from_table(&[("A", "a.wav")], &mut bank, sink_dyn);
        let controller = BeepSetController::new(Rc::clone(&bus), model).unwrap();
        (bus, sink, controller)
    }

    #[test]
    fn test_publish_plays_matching_beep_once() {
        let (bus, sink, controller) = setup();
        let voice = controller.model().borrow().get("A").unwrap().voice();

        bus.publish(events::BEEP, &BeepEvent::new("A"));

        assert_eq!(sink.starts_for(voice), 1);
    }

    #[test]
    fn test_unknown_name_plays_nothing() {
        let (bus, sink, _controller) = setup();
        assert_eq!(bus.publish(events::BEEP, &BeepEvent::new("Z")), 1);
        assert!(sink.started().is_empty());
    }

    #[test]
    fn test_on_beep_plays_without_the_bus() {
        let (bus, sink, controller) = setup();
        bus.destroy();
        let voice = controller.model().borrow().get("A").unwrap().voice();

        controller.on_beep(&BeepEvent::new("A"));
        controller.on_beep(&BeepEvent::new("Z"));

        assert_eq!(sink.started(), vec![voice]);
    }

    #[test]
    fn test_destroy_unsubscribes_and_empties_model() {
        let (bus, sink, mut controller) = setup();

        controller.destroy();
        controller.destroy();

        assert!(!controller.is_listening());
        assert_eq!(bus.subscriber_count(events::BEEP), 0);
        assert!(controller.model().borrow().is_empty());
        bus.publish(events::BEEP, &BeepEvent::new("A"));
        assert!(sink.started().is_empty());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (bus, _sink, controller) = setup();
        assert_eq!(bus.subscriber_count(events::BEEP), 1);
        drop(controller);
        assert_eq!(bus.subscriber_count(events::BEEP), 0);
    }

    #[test]
    fn test_destroyed_bus_refuses_controller() {
        let bus: Rc<MessageBus> = Rc::new(MessageBus::new());
        bus.destroy();
        let result = BeepSetController::new(bus, BeepSet::default());
        assert!(result.is_err());
    }
}
