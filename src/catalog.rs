//! Fixed catalogs shown in the UI: hosted models, moods, affirmations and
//! suggested prompts.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hosted models a session can talk to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Model {
    #[default]
    #[serde(rename = "zephyr-7b")]
    #[value(name = "zephyr-7b")]
    Zephyr7b,
    #[serde(rename = "phi-3")]
    #[value(name = "phi-3")]
    Phi3,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::Zephyr7b, Model::Phi3];

    /// Form/CLI key.
    pub fn key(self) -> &'static str {
        match self {
            Model::Zephyr7b => "zephyr-7b",
            Model::Phi3 => "phi-3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Model::Zephyr7b => "Zephyr 7B",
            Model::Phi3 => "Phi-3",
        }
    }

    /// Identifier of the model on the inference provider.
    pub fn repo_id(self) -> &'static str {
        match self {
            Model::Zephyr7b => "HuggingFaceH4/zephyr-7b-beta",
            Model::Phi3 => "microsoft/Phi-3-mini-4k-instruct",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Happy,
    Okay,
    Sad,
    Angry,
    Anxious,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Okay, Mood::Sad, Mood::Angry, Mood::Anxious];

    pub fn key(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Okay => "okay",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Anxious => "anxious",
        }
    }

    /// Label shown in the dropdown and injected into the prompt.
    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "😊 Happy",
            Mood::Okay => "😐 Okay",
            Mood::Sad => "😞 Sad",
            Mood::Angry => "😠 Angry",
            Mood::Anxious => "😰 Anxious",
        }
    }
}

pub const AFFIRMATIONS: [&str; 5] = [
    "You are stronger than you think. 💪",
    "Every step forward is progress. 🪴",
    "You deserve peace and happiness. 😊",
    "It’s okay to feel what you're feeling. 💙",
    "You are doing your best, and that’s enough. 🌟",
];

pub const SUGGESTIONS: [&str; 6] = [
    "I'm feeling anxious lately.",
    "Can you guide me through a short breathing exercise?",
    "I can't focus on studies, what can I do?",
    "Suggest a positive habit to build.",
    "How do I deal with emotional burnout?",
    "I'm feeling lonely – any advice?",
];

pub fn random_affirmation<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    AFFIRMATIONS.choose(rng).copied().unwrap_or(AFFIRMATIONS[0])
}

pub fn suggestion(index: usize) -> Option<&'static str> {
    SUGGESTIONS.get(index).copied()
}
