//! A single playable sound

use crate::audio::{AudioSink, VoiceId};
use crate::sample_loader::StereoSample;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

/// Decoded sample plus the sink it plays through
#[derive(Clone)]
pub struct SoundHandle {
    pub sample: Arc<StereoSample>,
    pub sink: Rc<dyn AudioSink>,
}

impl SoundHandle {
    pub fn new(sample: Arc<StereoSample>, sink: Rc<dyn AudioSink>) -> Self {
        Self { sample, sink }
    }
}

/// One named, independently playable sample.
///
/// A beep without a resource (the file failed to load, or the beep was
/// destroyed) stays silent when played.
pub struct Beep {
    resource: Option<SoundHandle>,
    id: Option<String>,
    voice: VoiceId,
}

impl Beep {
    /// Create a beep; `id` defaults to the creation time in milliseconds
    pub fn new(resource: Option<SoundHandle>, id: Option<&str>) -> Self {
        let id = match id {
            Some(id) => id.to_string(),
            None => creation_timestamp(),
        };
        Self {
            resource,
            id: Some(id),
            voice: VoiceId::next(),
        }
    }

    /// Stop any in-flight playback of this beep and play it again from the start
    pub fn play(&self) {
        match &self.resource {
            Some(handle) => {
                trace!("Playing {:?} on {:?}", self.id, self.voice);
                handle.sink.stop(self.voice);
                handle.sink.start(self.voice, Arc::clone(&handle.sample));
            }
            None => debug!("Beep {:?} has no sound loaded, ignoring play", self.id),
        }
    }

    /// Release the sound and clear the id. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.resource.take() {
            handle.sink.stop(self.voice);
        }
        self.id = None;
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn voice(&self) -> VoiceId {
        self.voice
    }

    pub fn is_loaded(&self) -> bool {
        self.resource.is_some()
    }

    pub fn sample(&self) -> Option<&Arc<StereoSample>> {
        self.resource.as_ref().map(|h| &h.sample)
    }

    /// Length of the loaded sample in seconds
    pub fn duration_secs(&self) -> Option<f32> {
        self.sample().map(|s| s.duration_secs())
    }
}

impl std::fmt::Debug for Beep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Beep")
            .field("id", &self.id)
            .field("voice", &self.voice)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

fn creation_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string()
}
