//! Synthetic drum sounds for kits with no recorded samples
//!
//! `drumpad generate` writes one WAV per kit entry so the pad works out of
//! the box. Sounds are picked by name: anything containing "kick", "snare",
//! "crash" or "hihat"/"hat" gets the matching voice, the rest get a blip.

use crate::error::DrumpadResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SAMPLE_RATE: u32 = 44100;

/// Drum voices the generator knows how to make
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrumVoice {
    Kick,
    Snare,
    Crash,
    HihatClosed,
    Blip,
}

impl DrumVoice {
    /// Guess the voice from a kit name
    pub fn for_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("kick") {
            DrumVoice::Kick
        } else if lower.contains("snare") {
            DrumVoice::Snare
        } else if lower.contains("crash") {
            DrumVoice::Crash
        } else if lower.contains("hat") {
            DrumVoice::HihatClosed
        } else {
            DrumVoice::Blip
        }
    }

    pub fn render(self) -> Vec<f32> {
        match self {
            DrumVoice::Kick => kick(60.0, 0.3),
            DrumVoice::Snare => snare(200.0, 0.2),
            DrumVoice::Crash => crash(1.2),
            DrumVoice::HihatClosed => hihat(0.08, 0.8),
            DrumVoice::Blip => blip(880.0, 0.05),
        }
    }
}

fn frames(duration: f32) -> usize {
    (duration * SAMPLE_RATE as f32) as usize
}

/// Generate a kick drum: sine wave with pitch envelope
pub fn kick(base_freq: f32, duration: f32) -> Vec<f32> {
    (0..frames(duration))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = (-t * 10.0).exp();
            let pitch_env = 1.0 + 4.0 * (-t * 30.0).exp();
            let phase = 2.0 * PI * base_freq * pitch_env * t;
            (phase.sin() * env * 0.9).tanh()
        })
        .collect()
}

/// Generate a snare: noise + tone with envelope
pub fn snare(tone_freq: f32, duration: f32) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(12345);
    (0..frames(duration))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let noise: f32 = rng.gen_range(-1.0..1.0);
            let tone = (2.0 * PI * tone_freq * t).sin();
            let noise_env = (-t * 20.0).exp();
            let tone_env = (-t * 40.0).exp();
            (noise * noise_env * 0.6 + tone * tone_env * 0.4) * 0.8
        })
        .collect()
}

/// Generate a hi-hat: highpassed noise with a fast decay
pub fn hihat(duration: f32, brightness: f32) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(67890);
    let cutoff = 0.1 + brightness * 0.3;
    let mut lp_state = 0.0f32;
    (0..frames(duration))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let noise: f32 = rng.gen_range(-1.0..1.0);
            lp_state = lp_state * (1.0 - cutoff) + noise * cutoff;
            let env = (-t * 30.0).exp();
            (noise - lp_state) * env * 0.45
        })
        .collect()
}

/// Generate a crash: bright noise with a long tail
pub fn crash(duration: f32) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(24680);
    let mut lp_state = 0.0f32;
    (0..frames(duration))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let noise: f32 = rng.gen_range(-1.0..1.0);
            lp_state = lp_state * 0.7 + noise * 0.3;
            let attack = (t * 400.0).min(1.0);
            let env = attack * (-t * 2.5).exp();
            (noise - lp_state) * env * 0.45
        })
        .collect()
}

/// Generate a blip: short sine burst
pub fn blip(freq: f32, duration: f32) -> Vec<f32> {
    (0..frames(duration))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * PI * freq * t).sin() * (-t * 40.0).exp() * 0.8
        })
        .collect()
}

/// Write mono 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32]) -> DrumpadResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(BufWriter::new(File::create(path)?), spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Write a WAV for every kit entry under `root`. Existing files are kept
/// unless `force` is set. Returns the files written.
pub fn generate_kit(
    table: &[(&str, &str)],
    root: &Path,
    force: bool,
) -> DrumpadResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    for &(name, relative) in table {
        let path = root.join(relative);
        if path.exists() && !force {
            info!("Keeping existing {}", path.display());
            continue;
        }

        let voice = DrumVoice::for_name(name);
        write_wav(&path, &voice.render())?;
        info!("Generated {:?} for '{}' at {}", voice, name, path.display());
        written.push(path);
    }

    Ok(written)
}
