#![forbid(unsafe_code)]

//! Sample models.

use tether_core::{Value, json};

/// The character sheet used throughout the test suites.
#[must_use]
pub fn character() -> Value {
    json!({
        "name": "Dave",
        "level": 10,
        "undead": true,
        "race": "Human",
        "description": DESCRIPTION,
        "skills": skills()["skills"].clone(),
        "powers": [
            {
                "name": "Flurry of Keystrokes",
                "description": "You can type up to 80 word per minute."
            },
            {
                "name": "Telekenesis",
                "description": "You can move a pebble-sized object with your brain once per day."
            }
        ]
    })
}

/// Only the nested skill table.
#[must_use]
pub fn skills() -> Value {
    json!({
        "skills": {
            "programming": { "day": 10, "night": 20 },
            "underwaterBasketWeaving": { "day": 1, "night": 2 }
        }
    })
}

/// Race options offered by the character form.
pub const RACES: [&str; 3] = ["Human", "Klingon", "Vulcan"];

pub const DESCRIPTION: &str = "As a young boy, Dave created lego masterpieces and wrestled \
alligators. This is why he only has one arm...";
