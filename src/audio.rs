//! Real-time audio output using cpal
//! Works with JACK, ALSA, OpenSL ES (Android/Termux), etc.
//!
//! Beeps do not talk to cpal directly; they go through the [`AudioSink`]
//! trait. [`AudioEngine`] is the device-backed sink, [`NullSink`] swallows
//! everything (`--mute`, or no device), and [`RecordingSink`] keeps a log of
//! calls for dry runs and tests.

use crate::error::{DrumpadError, DrumpadResult};
use crate::sample_loader::StereoSample;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info, trace};

/// Identifies one beep's playback slot in the mixer.
/// Starting a voice that is already sounding restarts it from the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoiceId(u64);

static NEXT_VOICE: AtomicU64 = AtomicU64::new(1);

impl VoiceId {
    /// Allocate a process-unique voice id
    pub fn next() -> Self {
        VoiceId(NEXT_VOICE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where beeps send their playback requests
pub trait AudioSink {
    /// Begin playing `sample` on `voice` from frame 0
    fn start(&self, voice: VoiceId, sample: Arc<StereoSample>);
    /// Silence `voice` if it is sounding
    fn stop(&self, voice: VoiceId);
}

enum MixerCommand {
    Start(VoiceId, Arc<StereoSample>),
    Stop(VoiceId),
}

struct Voice {
    id: VoiceId,
    sample: Arc<StereoSample>,
    /// Read head in source frames; fractional when rates differ
    position: f64,
    /// Source frames advanced per output frame
    speed: f64,
    active: bool,
}

/// Voice mixer shared between the UI thread and the audio callback
pub struct Mixer {
    voices: Vec<Voice>,
    pending: VecDeque<MixerCommand>,
    gain: f32,
    output_rate: u32,
}

impl Mixer {
    /// `output_rate` is the device rate; samples recorded at other rates
    /// are resampled to it
    pub fn new(gain: f32, output_rate: u32) -> Self {
        Self {
            voices: Vec::new(),
            pending: VecDeque::new(),
            gain,
            output_rate,
        }
    }

    fn speed_for(&self, sample: &StereoSample) -> f64 {
        if sample.sample_rate == 0 || self.output_rate == 0 {
            return 1.0;
        }
        sample.sample_rate as f64 / self.output_rate as f64
    }

    pub fn start(&mut self, voice: VoiceId, sample: Arc<StereoSample>) {
        self.pending.push_back(MixerCommand::Start(voice, sample));
    }

    pub fn stop(&mut self, voice: VoiceId) {
        self.pending.push_back(MixerCommand::Stop(voice));
    }

    /// Number of voices currently sounding
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    fn apply_pending(&mut self) {
        while let Some(cmd) = self.pending.pop_front() {
            match cmd {
                MixerCommand::Stop(id) => {
                    for voice in self.voices.iter_mut().filter(|v| v.id == id) {
                        voice.active = false;
                    }
                }
                MixerCommand::Start(id, sample) => {
                    // Same id first (choke), then any free slot, then grow
                    let slot = self
                        .voices
                        .iter()
                        .position(|v| v.id == id)
                        .or_else(|| self.voices.iter().position(|v| !v.active));

                    let voice = Voice {
                        id,
                        speed: self.speed_for(&sample),
                        sample,
                        position: 0.0,
                        active: true,
                    };
                    match slot {
                        Some(idx) => self.voices[idx] = voice,
                        None => self.voices.push(voice),
                    }
                }
            }
        }
    }

    /// Mix all active voices into an interleaved buffer
    pub fn process<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: cpal::Sample + cpal::FromSample<f32>,
    {
        self.apply_pending();
        let channels = channels.max(1);

        for frame in output.chunks_mut(channels) {
            let mut left = 0.0f32;
            let mut right = 0.0f32;

            for voice in &mut self.voices {
                if !voice.active {
                    continue;
                }
                let idx = voice.position as usize;
                if idx >= voice.sample.len() {
                    voice.active = false;
                    continue;
                }

                let (mut l, mut r) = voice.sample.frame(idx);
                // Linear interpolation between frames for rate changes
                let frac = (voice.position - idx as f64) as f32;
                if frac > 0.0 && idx + 1 < voice.sample.len() {
                    let (next_l, next_r) = voice.sample.frame(idx + 1);
                    l += (next_l - l) * frac;
                    r += (next_r - r) * frac;
                }
                left += l;
                right += r;
                voice.position += voice.speed;
            }

            // Soft clipping to prevent distortion
            left = left.tanh() * self.gain;
            right = right.tanh() * self.gain;

            if channels == 1 {
                frame[0] = T::from_sample((left + right) * 0.5);
                continue;
            }
            for (ch, out) in frame.iter_mut().enumerate() {
                let value = match ch {
                    0 => left,
                    1 => right,
                    _ => (left + right) * 0.5,
                };
                *out = T::from_sample(value);
            }
        }
    }
}

/// Device-backed sink
pub struct AudioEngine {
    sample_rate: u32,
    mixer: Arc<Mutex<Mixer>>,
    _stream: cpal::Stream,
}

impl AudioEngine {
    pub fn new(gain: f32) -> DrumpadResult<Self> {
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());

        let device = host
            .default_output_device()
            .ok_or_else(|| DrumpadError::Audio("No audio output device found".to_string()))?;
        if let Ok(name) = device.name() {
            info!("Audio device: {}", name);
        }

        let config = device
            .default_output_config()
            .map_err(|e| DrumpadError::Audio(e.to_string()))?;
        info!("Audio config: {:?}", config);

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let mixer = Arc::new(Mutex::new(Mixer::new(gain, sample_rate)));
        let mixer_clone = Arc::clone(&mixer);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), mixer_clone, channels)
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), mixer_clone, channels)
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), mixer_clone, channels)
            }
            other => {
                return Err(DrumpadError::Audio(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }?;

        stream
            .play()
            .map_err(|e| DrumpadError::Audio(e.to_string()))?;
        info!("Audio stream started at {} Hz", sample_rate);

        Ok(Self {
            sample_rate,
            mixer,
            _stream: stream,
        })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        mixer: Arc<Mutex<Mixer>>,
        channels: usize,
    ) -> DrumpadResult<cpal::Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| match mixer.lock() {
                    Ok(mut mixer) => mixer.process(data, channels),
                    Err(_) => data.fill(T::EQUILIBRIUM),
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| DrumpadError::Audio(e.to_string()))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioSink for AudioEngine {
    fn start(&self, voice: VoiceId, sample: Arc<StereoSample>) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.start(voice, sample);
        }
    }

    fn stop(&self, voice: VoiceId) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.stop(voice);
        }
    }
}

/// Sink that drops every request
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn start(&self, voice: VoiceId, _sample: Arc<StereoSample>) {
        trace!("NullSink: start {:?}", voice);
    }

    fn stop(&self, _voice: VoiceId) {}
}

/// A call observed by [`RecordingSink`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkCall {
    Start(VoiceId),
    Stop(VoiceId),
}

/// Sink that records calls instead of producing sound
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: RefCell<Vec<SinkCall>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.borrow().clone()
    }

    /// Voices started, in order
    pub fn started(&self) -> Vec<VoiceId> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                SinkCall::Start(v) => Some(*v),
                SinkCall::Stop(_) => None,
            })
            .collect()
    }

    pub fn starts_for(&self, voice: VoiceId) -> usize {
        self.started().into_iter().filter(|v| *v == voice).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl AudioSink for RecordingSink {
    fn start(&self, voice: VoiceId, _sample: Arc<StereoSample>) {
        self.calls.borrow_mut().push(SinkCall::Start(voice));
    }

    fn stop(&self, voice: VoiceId) {
        self.calls.borrow_mut().push(SinkCall::Stop(voice));
    }
}
