//! # Drumpad - a terminal drum pad
//!
//! A fixed kit of named samples ("beeps") shown as tiles; activating a tile
//! plays its sound. The view and the sound-playing controller never see
//! each other: the view publishes a `beep` event on a [`bus::MessageBus`],
//! the controller is subscribed to it and plays the named [`beep::Beep`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use drumpad::app::{AppContext, PadApp};
//! use drumpad::audio::AudioEngine;
//! use drumpad::settings::Settings;
//! use std::rc::Rc;
//!
//! let ctx = AppContext::new(Settings::default());
//! let engine = AudioEngine::new(ctx.settings.gain).expect("audio device");
//! let mut app = PadApp::new(&ctx, Rc::new(engine)).unwrap();
//! app.run().unwrap();
//! ```
//!
//! ## Headless use
//!
//! ```
//! use drumpad::audio::RecordingSink;
//! use drumpad::bus::{events, BeepEvent, MessageBus};
//! use drumpad::controller::BeepSetController;
//! use drumpad::sample_loader::{SampleBank, StereoSample};
//! use std::rc::Rc;
//!
//! let bus = Rc::new(MessageBus::new());
//! let sink = Rc::new(RecordingSink::new());
//! let mut bank = SampleBank::new("sounds");
//! bank.insert("drums/kick.wav", StereoSample::mono(vec![0.5; 64], 44100));
//!
//! let controller = BeepSetController::drums(Rc::clone(&bus), &mut bank, sink.clone()).unwrap();
//! bus.publish(events::BEEP, &BeepEvent::new("Kick"));
//!
//! let kick = controller.model().borrow().get("Kick").unwrap().voice();
//! assert_eq!(sink.starts_for(kick), 1);
//! ```
//!
//! ## Architecture
//!
//! - [`beep`] - one playable sample
//! - [`beep_set`] - named set of beeps built from a static table ([`beep_set::DRUM_KIT`])
//! - [`bus`] - synchronous publish/subscribe registry
//! - [`controller`] - owns a set and plays it on `beep` events
//! - [`view`] - pad grid that publishes `beep` events
//! - [`audio`] - cpal output and the [`audio::AudioSink`] seam
//! - [`sample_loader`] - WAV decoding and caching
//! - [`generate`] - synthetic kit samples
//! - [`settings`] - TOML settings
//! - [`app`] - bootstrap and terminal loop

pub mod app;
pub mod audio;
pub mod beep;
pub mod beep_set;
pub mod bus;
pub mod controller;
pub mod error;
pub mod generate;
pub mod sample_loader;
pub mod settings;
pub mod view;

pub use error::{DrumpadError, DrumpadResult};
