//! Sample loading for the kit
//!
//! Kit tables name their sounds by path relative to the configured sounds
//! directory (`drums/kick.wav`). [`SampleBank`] resolves those paths,
//! decodes the WAV files and caches the result so that two tiles pointing
//! at the same file share one buffer.
//!
//! # Examples
//!
//! ```no_run
//! use drumpad::sample_loader::SampleBank;
//!
//! let mut bank = SampleBank::new("sounds");
//! let kick = bank.load("drums/kick.wav").expect("kick should load");
//! println!("Kick: {} frames", kick.len());
//! ```

use crate::error::{DrumpadError, DrumpadResult};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Stereo sample data - supports both mono and stereo samples
///
/// For mono samples, `right` is None and `left` contains all data.
#[derive(Clone, Debug, PartialEq)]
pub struct StereoSample {
    /// Left channel (or mono data if mono sample)
    pub left: Vec<f32>,
    /// Right channel (None for mono samples)
    pub right: Option<Vec<f32>>,
    /// Rate the file was recorded at
    pub sample_rate: u32,
}

impl StereoSample {
    /// Create a mono sample
    pub fn mono(data: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            left: data,
            right: None,
            sample_rate,
        }
    }

    /// Create a stereo sample from left and right channels
    pub fn stereo(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            left,
            right: Some(right),
            sample_rate,
        }
    }

    pub fn is_stereo(&self) -> bool {
        self.right.is_some()
    }

    /// Number of frames (samples per channel)
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Frame at `index` as (left, right); mono samples return the same value twice.
    /// Out of range reads are silence.
    pub fn frame(&self, index: usize) -> (f32, f32) {
        let left = match self.left.get(index) {
            Some(&l) => l,
            None => return (0.0, 0.0),
        };
        let right = self
            .right
            .as_ref()
            .and_then(|r| r.get(index).copied())
            .unwrap_or(left);
        (left, right)
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f32 / self.sample_rate as f32
    }
}

/// Decode a WAV stream into a [`StereoSample`].
/// Int formats are normalized to -1.0..1.0; more than two channels keeps the first two.
pub fn read_wav<R: Read>(reader: R) -> DrumpadResult<StereoSample> {
    let mut reader = hound::WavReader::new(reader)?;
    let spec = reader.spec();

    let raw_samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    if channels == 1 {
        return Ok(StereoSample::mono(raw_samples, spec.sample_rate));
    }

    // Deinterleave: L R L R -> (L L, R R)
    let num_frames = raw_samples.len() / channels;
    let mut left = Vec::with_capacity(num_frames);
    let mut right = Vec::with_capacity(num_frames);
    for chunk in raw_samples.chunks_exact(channels) {
        left.push(chunk[0]);
        right.push(chunk[1]);
    }
    Ok(StereoSample::stereo(left, right, spec.sample_rate))
}

/// Sample bank that resolves kit paths and caches decoded WAV files
#[derive(Clone, Debug)]
pub struct SampleBank {
    root: PathBuf,
    samples: HashMap<String, Arc<StereoSample>>,
}

impl SampleBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            samples: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute or root-relative location of a kit path
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }

    /// Load a sample by kit path, using the cache when possible
    pub fn load(&mut self, path: &str) -> DrumpadResult<Arc<StereoSample>> {
        if let Some(sample) = self.samples.get(path) {
            return Ok(Arc::clone(sample));
        }

        let full_path = self.resolve(path);
        let file = std::fs::File::open(&full_path)?;
        let sample = read_wav(std::io::BufReader::new(file)).map_err(|e| match e {
            DrumpadError::Wav(msg) => DrumpadError::Wav(format!("{}: {}", full_path.display(), msg)),
            other => other,
        })?;
        debug!(
            "Loaded {} ({} frames, {} Hz)",
            full_path.display(),
            sample.len(),
            sample.sample_rate
        );

        let sample = Arc::new(sample);
        self.samples.insert(path.to_string(), Arc::clone(&sample));
        Ok(sample)
    }

    /// Put an already decoded sample in the cache under a kit path
    pub fn insert(&mut self, path: &str, sample: StereoSample) {
        self.samples.insert(path.to_string(), Arc::new(sample));
    }

    /// Number of cached samples
    pub fn cached(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(channels: u16, frames: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in frames {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_read_mono_normalizes_ints() {
        let bytes = wav_bytes(1, &[0, 16384, -32768]);
        let sample = read_wav(Cursor::new(bytes)).unwrap();

        assert!(!sample.is_stereo());
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.sample_rate, 22050);
        assert!((sample.left[1] - 0.5).abs() < 1e-4);
        assert_eq!(sample.left[2], -1.0);
    }

    #[test]
    fn test_read_stereo_deinterleaves() {
        let bytes = wav_bytes(2, &[100, -100, 200, -200]);
        let sample = read_wav(Cursor::new(bytes)).unwrap();

        assert!(sample.is_stereo());
        assert_eq!(sample.len(), 2);
        let (l, r) = sample.frame(1);
        assert!(l > 0.0 && r < 0.0);
    }

    #[test]
    fn test_frame_out_of_range_is_silence() {
        let sample = StereoSample::mono(vec![0.25], 44100);
        assert_eq!(sample.frame(0), (0.25, 0.25));
        assert_eq!(sample.frame(5), (0.0, 0.0));
    }

    #[test]
    fn test_garbage_is_wav_error() {
        let result = read_wav(Cursor::new(b"definitely not RIFF".to_vec()));
        assert!(matches!(result, Err(DrumpadError::Wav(_))));
    }

    #[test]
    fn test_bank_caches_by_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("drums")).unwrap();
        std::fs::write(dir.path().join("drums/kick.wav"), wav_bytes(1, &[1, 2, 3])).unwrap();

        let mut bank = SampleBank::new(dir.path());
        let first = bank.load("drums/kick.wav").unwrap();
        let second = bank.load("drums/kick.wav").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(bank.cached(), 1);
    }

    #[test]
    fn test_bank_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut bank = SampleBank::new(dir.path());
        assert!(matches!(bank.load("drums/none.wav"), Err(DrumpadError::Io(_))));
    }

    #[test]
    fn test_inserted_sample_skips_disk() {
        let mut bank = SampleBank::new("/nonexistent");
        bank.insert("drums/snare.wav", StereoSample::mono(vec![0.1; 8], 44100));
        assert_eq!(bank.load("drums/snare.wav").unwrap().len(), 8);
    }

    #[test]
    fn test_relative_paths_resolve_under_root() {
        let bank = SampleBank::new("/opt/kits");
        assert_eq!(bank.root(), Path::new("/opt/kits"));
        assert_eq!(bank.resolve("drums/kick.wav"), PathBuf::from("/opt/kits/drums/kick.wav"));
        assert_eq!(bank.resolve("/tmp/clap.wav"), PathBuf::from("/tmp/clap.wav"));
    }
}
