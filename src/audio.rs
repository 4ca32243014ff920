//! Fire-and-forget sound cues for pops, explosions, and lasers.
//!
//! Cues are short synthesized tones ([`Pitch`]), so no audio files ship with
//! the game.  Nothing plays unless `audio_enabled` is set.

use std::time::Duration;

use bevy::audio::Pitch;
use bevy::prelude::*;

use crate::bubble::BubbleKind;
use crate::config::BubbleSettings;
use crate::events::SimEvent;

/// Sound played for one simulation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundCue {
    Pop,
    Explosion,
    Laser,
}

impl SoundCue {
    /// Tone frequency (Hz) and length.
    pub fn tone(self) -> (f32, Duration) {
        match self {
            SoundCue::Pop => (880.0, Duration::from_millis(60)),
            SoundCue::Explosion => (110.0, Duration::from_millis(250)),
            SoundCue::Laser => (1_760.0, Duration::from_millis(40)),
        }
    }

    pub fn for_event(event: &SimEvent) -> Option<Self> {
        match event {
            SimEvent::Popped {
                kind: BubbleKind::Grenade,
                ..
            } => Some(SoundCue::Explosion),
            SimEvent::Popped { .. } => Some(SoundCue::Pop),
            SimEvent::LaserFired { .. } => Some(SoundCue::Laser),
            _ => None,
        }
    }
}

pub struct SoundCuePlugin;

impl Plugin for SoundCuePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sound_cue_system);
    }
}

/// Play at most one cue of each kind per frame so a chain reaction does not
/// stack dozens of identical tones.
pub fn sound_cue_system(
    mut commands: Commands,
    mut events: MessageReader<SimEvent>,
    settings: Res<BubbleSettings>,
    mut pitches: ResMut<Assets<Pitch>>,
) {
    if !settings.audio_enabled {
        events.clear();
        return;
    }
    let mut cues: Vec<SoundCue> = events.read().filter_map(SoundCue::for_event).collect();
    cues.sort_unstable();
    cues.dedup();

    for cue in cues {
        let (frequency, duration) = cue.tone();
        commands.spawn((
            AudioPlayer(pitches.add(Pitch::new(frequency, duration))),
            PlaybackSettings::DESPAWN,
        ));
    }
}
