//! Error types for drumpad
//!
//! Runtime paths (publishing, playing, destroying) never fail; these errors
//! only come out of bootstrap work such as reading settings, opening the
//! audio device or writing kit samples.

use std::fmt;
use std::path::PathBuf;

/// Drumpad errors
#[derive(Debug)]
pub enum DrumpadError {
    /// Filesystem error
    Io(std::io::Error),
    /// WAV decode/encode error
    Wav(String),
    /// Settings file could not be parsed
    Settings { path: PathBuf, message: String },
    /// Audio device or stream error
    Audio(String),
    /// The message bus was destroyed and has not been reset
    BusDestroyed,
    /// Sound name not present in the kit
    UnknownSound(String),
}

impl fmt::Display for DrumpadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrumpadError::Io(e) => write!(f, "IO error: {}", e),
            DrumpadError::Wav(msg) => write!(f, "WAV error: {}", msg),
            DrumpadError::Settings { path, message } => {
                write!(f, "Invalid settings in {}: {}", path.display(), message)
            }
            DrumpadError::Audio(msg) => write!(f, "Audio error: {}", msg),
            DrumpadError::BusDestroyed => write!(f, "Message bus has been destroyed"),
            DrumpadError::UnknownSound(name) => write!(f, "Unknown sound: {}", name),
        }
    }
}

impl std::error::Error for DrumpadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrumpadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DrumpadError {
    fn from(e: std::io::Error) -> Self {
        DrumpadError::Io(e)
    }
}

impl From<hound::Error> for DrumpadError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => DrumpadError::Io(io),
            other => DrumpadError::Wav(other.to_string()),
        }
    }
}

pub type DrumpadResult<T> = Result<T, DrumpadError>;
