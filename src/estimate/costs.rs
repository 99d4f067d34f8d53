/*!
 * Downstream production cost model.
 *
 * Every component is priced from tag or character counts and rounded to
 * 4 decimal places; the episode total is the rounded sum of the rounded
 * components, so the components always add up to the total.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::round4;
use crate::app_config::RateTable;
use crate::script::{Episode, TagKind};

/// Cost of each pipeline component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentCosts {
    pub voice_generation: f64,
    pub image_generation: f64,
    pub sfx: f64,
    pub music: f64,
    pub ambient: f64,
    pub transitions: f64,
}

impl ComponentCosts {
    /// Components in report order, with their JSON names
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("voice_generation", self.voice_generation),
            ("image_generation", self.image_generation),
            ("sfx", self.sfx),
            ("music", self.music),
            ("ambient", self.ambient),
            ("transitions", self.transitions),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.entries().iter().map(|(_, cost)| cost).sum()
    }
}

/// Voice cost attributed to one speaker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerCost {
    pub characters: usize,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceCosts {
    pub total_cost: f64,
    pub cost_per_character: f64,
    pub total_characters: usize,
    pub costs_by_speaker: BTreeMap<String, SpeakerCost>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageCosts {
    pub total_cost: f64,
    pub cost_per_image: f64,
    pub total_images: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioCosts {
    pub total_cost: f64,
    pub sfx_cost: f64,
    pub music_cost: f64,
    pub ambient_cost: f64,
    pub transition_cost: f64,
    pub sfx_count: usize,
    pub music_count: usize,
    pub ambient_count: usize,
    pub transition_count: usize,
}

/// Full cost estimate for one episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub currency: String,
    pub total_episode_cost: f64,
    pub cost_per_minute: f64,
    pub pipeline_component_costs: ComponentCosts,
    pub voice_generation: VoiceCosts,
    pub image_generation: ImageCosts,
    pub audio_processing: AudioCosts,
}

/// Price an episode against a rate table
pub fn estimate_costs(episode: &Episode, rates: &RateTable) -> CostAnalysis {
    let mut by_speaker: BTreeMap<String, SpeakerCost> = BTreeMap::new();
    let mut total_characters = 0usize;
    for dialogue in episode.dialogues() {
        by_speaker.entry(dialogue.speaker.clone()).or_default().characters += dialogue.character_count;
        total_characters += dialogue.character_count;
    }
    for speaker in by_speaker.values_mut() {
        speaker.cost = round4(speaker.characters as f64 * rates.voice_per_character);
    }

    let total_images = episode.tag_count(TagKind::Image);
    let sfx_count = episode.tag_count(TagKind::Sfx);
    let music_count = episode.tag_count(TagKind::Music);
    let ambient_count = episode.tag_count(TagKind::Ambient);
    let transition_count = episode.tag_count(TagKind::Transition);

    let components = ComponentCosts {
        voice_generation: round4(total_characters as f64 * rates.voice_per_character),
        image_generation: round4(total_images as f64 * rates.image_per_generation),
        sfx: round4(sfx_count as f64 * rates.effect_per_use),
        music: round4(music_count as f64 * rates.music_per_cue),
        ambient: round4(ambient_count as f64 * rates.effect_per_use),
        transitions: round4(transition_count as f64 * rates.effect_per_use),
    };
    let total_episode_cost = round4(components.sum());

    let audio_processing = AudioCosts {
        total_cost: round4(components.sfx + components.music + components.ambient + components.transitions),
        sfx_cost: components.sfx,
        music_cost: components.music,
        ambient_cost: components.ambient,
        transition_cost: components.transitions,
        sfx_count,
        music_count,
        ambient_count,
        transition_count,
    };

    CostAnalysis {
        currency: rates.currency.clone(),
        total_episode_cost,
        cost_per_minute: cost_per_minute(total_episode_cost, rates.expected_characters_per_minute),
        voice_generation: VoiceCosts {
            total_cost: components.voice_generation,
            cost_per_character: rates.voice_per_character,
            total_characters,
            costs_by_speaker: by_speaker,
        },
        image_generation: ImageCosts {
            total_cost: components.image_generation,
            cost_per_image: rates.image_per_generation,
            total_images,
        },
        audio_processing,
        pipeline_component_costs: components,
    }
}

/// `total / (characters_per_minute / 60)`, or 0 when undefined
fn cost_per_minute(total: f64, characters_per_minute: f64) -> f64 {
    let divisor = characters_per_minute / 60.0;
    if total == 0.0 || !divisor.is_finite() || divisor <= 0.0 {
        return 0.0;
    }
    round4(total / divisor)
}
