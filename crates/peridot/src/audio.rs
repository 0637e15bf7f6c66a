//! Named sound playback over kira.
//!
//! Sounds register under a name, then play/stop by that name. A failed
//! backend init degrades to a silent manager: every call logs and reports
//! failure instead of crashing, so a headless machine still runs the game.

use std::collections::HashMap;
use std::fmt;

use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::sound::PlaybackState;
use kira::{AudioManager as KiraManager, AudioManagerSettings, DefaultBackend, Tween};

/// Errors that can occur in the audio system.
#[derive(Debug)]
pub enum AudioError {
    /// Failed to initialize the audio backend.
    BackendInit(String),
    /// Failed to load a sound file.
    Load(String),
    /// Failed to play a sound.
    Play(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::BackendInit(e) => write!(f, "audio backend init failed: {e}"),
            AudioError::Load(e) => write!(f, "audio load failed: {e}"),
            AudioError::Play(e) => write!(f, "audio play failed: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

struct SoundSlot {
    data: StaticSoundData,
    handle: Option<StaticSoundHandle>,
}

/// Registry of named sounds. One playback handle per name: playing a sound
/// that is already playing is a no-op rather than a second overlapping
/// instance.
pub struct AudioManager {
    /// `None` when the backend failed to initialize; all calls degrade.
    manager: Option<KiraManager<DefaultBackend>>,
    sounds: HashMap<String, SoundSlot>,
}

impl AudioManager {
    pub fn new() -> Self {
        let manager = match KiraManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("{}; audio disabled", AudioError::BackendInit(e.to_string()));
                None
            }
        };
        Self {
            manager,
            sounds: HashMap::new(),
        }
    }

    /// Loads and registers a sound file under a name. Returns `false` when
    /// the name is taken or the file fails to decode.
    pub fn add(&mut self, path: &str, name: &str) -> bool {
        if self.sounds.contains_key(name) {
            log::warn!("sound {name:?} is already registered");
            return false;
        }
        match StaticSoundData::from_file(path) {
            Ok(data) => {
                self.sounds.insert(
                    name.to_owned(),
                    SoundSlot { data, handle: None },
                );
                true
            }
            Err(e) => {
                log::warn!("{}", AudioError::Load(format!("{path}: {e}")));
                false
            }
        }
    }

    /// Stops and unregisters a sound. Returns `false` for unknown names.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(mut slot) = self.sounds.remove(name) else {
            return false;
        };
        if let Some(handle) = slot.handle.as_mut() {
            handle.stop(Tween::default());
        }
        true
    }

    /// Starts a registered sound. Already-playing sounds are left alone.
    /// Returns `false` for unknown names or playback failures.
    pub fn play(&mut self, name: &str) -> bool {
        let Some(manager) = self.manager.as_mut() else {
            return false;
        };
        let Some(slot) = self.sounds.get_mut(name) else {
            log::warn!("sound {name:?} is not registered");
            return false;
        };
        if slot
            .handle
            .as_ref()
            .is_some_and(|h| h.state() == PlaybackState::Playing)
        {
            return true;
        }
        match manager.play(slot.data.clone()) {
            Ok(handle) => {
                slot.handle = Some(handle);
                true
            }
            Err(e) => {
                log::warn!("{}", AudioError::Play(format!("{name}: {e}")));
                false
            }
        }
    }

    /// Stops a playing sound; the next play restarts from the beginning.
    /// Returns `false` for unknown names.
    pub fn stop(&mut self, name: &str) -> bool {
        let Some(slot) = self.sounds.get_mut(name) else {
            return false;
        };
        if let Some(handle) = slot.handle.as_mut() {
            handle.stop(Tween::default());
            slot.handle = None;
        }
        true
    }

    pub fn stop_all(&mut self) {
        for slot in self.sounds.values_mut() {
            if let Some(handle) = slot.handle.as_mut() {
                handle.stop(Tween::default());
            }
            slot.handle = None;
        }
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.sounds
            .get(name)
            .and_then(|slot| slot.handle.as_ref())
            .is_some_and(|h| h.state() == PlaybackState::Playing)
    }
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioManager")
            .field("sounds", &self.sounds.len())
            .field("enabled", &self.manager.is_some())
            .finish()
    }
}
