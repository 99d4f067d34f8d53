/*!
 * Spoken duration model.
 *
 * A dialogue lasts `words / wpm * 60` seconds. Consecutive dialogues of a
 * scene are separated by the inter-speaker pause and consecutive scenes by
 * the scene transition.
 */

use serde::{Deserialize, Serialize};

use super::round2;
use crate::app_config::SpeechConfig;
use crate::script::{Dialogue, Episode, Scene};

/// Duration estimate for one scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneTiming {
    pub scene_id: String,
    pub dialogue_duration_seconds: f64,
    pub word_count: usize,
    pub dialogue_count: usize,
}

/// Duration estimate for a whole episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingEstimate {
    pub total_duration_seconds: f64,
    pub total_duration_minutes: f64,
    pub transition_duration_seconds: f64,
    pub total_words: usize,
    pub total_dialogues: usize,
    pub speech_rate_wpm: f64,
    pub scene_timings: Vec<SceneTiming>,
}

/// Estimate spoken duration per scene and for the episode
pub fn estimate_timing(episode: &Episode, speech: &SpeechConfig) -> TimingEstimate {
    let pause = speech.inter_speaker_pause_seconds.max(0.0);
    let transition = speech.scene_transition_seconds.max(0.0);

    let mut scene_timings = Vec::with_capacity(episode.scenes.len());
    let mut raw_scene_total = 0.0;
    for scene in &episode.scenes {
        let seconds = scene_seconds(scene, speech.speech_rate_wpm, pause);
        raw_scene_total += seconds;
        scene_timings.push(SceneTiming {
            scene_id: scene.scene_id.clone(),
            dialogue_duration_seconds: round2(seconds),
            word_count: scene.dialogues.iter().map(Dialogue::word_count).sum(),
            dialogue_count: scene.dialogue_count(),
        });
    }

    let transition_seconds = gaps(episode.scenes.len()) * transition;
    let total_seconds = raw_scene_total + transition_seconds;

    TimingEstimate {
        total_duration_seconds: round2(total_seconds),
        total_duration_minutes: round2(total_seconds / 60.0),
        transition_duration_seconds: round2(transition_seconds),
        total_words: scene_timings.iter().map(|s| s.word_count).sum(),
        total_dialogues: episode.dialogue_count(),
        speech_rate_wpm: speech.speech_rate_wpm,
        scene_timings,
    }
}

/// Spoken seconds of one dialogue; zero for a non-positive rate
pub fn dialogue_seconds(dialogue: &Dialogue, speech_rate_wpm: f64) -> f64 {
    if !speech_rate_wpm.is_finite() || speech_rate_wpm <= 0.0 {
        return 0.0;
    }
    dialogue.word_count() as f64 / speech_rate_wpm * 60.0
}

fn scene_seconds(scene: &Scene, speech_rate_wpm: f64, pause: f64) -> f64 {
    let speech: f64 = scene
        .dialogues
        .iter()
        .map(|d| dialogue_seconds(d, speech_rate_wpm))
        .sum();
    speech + gaps(scene.dialogues.len()) * pause
}

/// Number of gaps between `n` consecutive items
fn gaps(n: usize) -> f64 {
    n.saturating_sub(1) as f64
}
