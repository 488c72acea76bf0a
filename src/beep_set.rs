//! Named sets of beeps (one instrument's worth of sounds)
//!
//! A set is built once from a static key → sample path table. The drum kit
//! is just one such table, [`DRUM_KIT`]; other instruments are other tables
//! passed to the same constructor.

use crate::audio::AudioSink;
use crate::beep::{Beep, SoundHandle};
use crate::sample_loader::SampleBank;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{info, warn};

/// Static key → sample path table
pub type KitTable = [(&'static str, &'static str)];

/// The drum kit: four percussion sounds, paths relative to the sounds directory
pub const DRUM_KIT: &KitTable = &[
    ("Snare", "drums/snare.wav"),
    ("Crash", "drums/crash.wav"),
    ("HihatClosed", "drums/hihat_closed.wav"),
    ("Kick", "drums/kick.wav"),
];

/// Mapping from sound name to [`Beep`], in table order
#[derive(Debug, Default)]
pub struct BeepSet {
    beeps: HashMap<String, Beep>,
    order: Vec<String>,
}

impl BeepSet {
    /// Build a set from a table. Entries whose sample fails to load become
    /// silent beeps; a repeated key replaces the earlier beep in place.
    pub fn from_table<'a, I>(table: I, bank: &mut SampleBank, sink: Rc<dyn AudioSink>) -> Self
    where
        I: IntoIterator<Item = &'a (&'a str, &'a str)>,
    {
        let mut set = Self::default();

        for &(name, path) in table {
            let resource = match bank.load(path) {
                Ok(sample) => Some(SoundHandle::new(sample, Rc::clone(&sink))),
                Err(e) => {
                    warn!("Sound '{}' unavailable ({}): {}", name, path, e);
                    None
                }
            };
            set.insert(name, Beep::new(resource, Some(name)));
        }

        info!("Built beep set with {} sounds", set.len());
        set
    }

    fn insert(&mut self, name: &str, beep: Beep) {
        match self.beeps.insert(name.to_string(), beep) {
            Some(mut replaced) => replaced.destroy(),
            None => self.order.push(name.to_string()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Beep> {
        self.beeps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.beeps.contains_key(name)
    }

    /// Number of distinct sound names
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sound names in table order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (name, beep) pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Beep)> {
        self.order
            .iter()
            .filter_map(|name| self.beeps.get(name).map(|beep| (name.as_str(), beep)))
    }

    /// Destroy every beep and empty the set. Safe to call more than once.
    pub fn destroy(&mut self) {
        for beep in self.beeps.values_mut() {
            beep.destroy();
        }
        self.beeps.clear();
        self.order.clear();
    }
}

/// Build the drum kit set
pub fn drums(bank: &mut SampleBank, sink: Rc<dyn AudioSink>) -> BeepSet {
    BeepSet::from_table(DRUM_KIT, bank, sink)
}
