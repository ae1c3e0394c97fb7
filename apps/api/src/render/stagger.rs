//! Entrance-animation delay arithmetic.
//!
//! Every rendered element gets a start delay (seconds) derived only from its
//! position: section ordinal, item index within the section, and sub-item index
//! within an item. Nothing here depends on the record contents.
//!
//! ```text
//! section_delay(i)      = 0.15 * i
//! heading_delay(i)      = section_delay(i) + 0.15
//! item_delay(i, j, r)   = heading_delay(i) + r * j
//! sub_item_delay(p, k)  = p + 0.15 + 0.05 * k
//! ```

use serde::{Deserialize, Serialize};

/// Delay between consecutive section cards.
pub const SECTION_STAGGER: f64 = 0.15;
/// Pause between a card appearing and its heading/content appearing.
pub const CONTENT_OFFSET: f64 = 0.15;
/// Per-item stagger for paragraph-like list items.
pub const ITEM_STAGGER_NORMAL: f64 = 0.08;
/// Per-item stagger for densely packed chips.
pub const ITEM_STAGGER_FAST: f64 = 0.05;
/// Fixed delay of the candidate-name heading above all cards.
pub const NAME_HEADING_DELAY: f64 = 0.1;

/// How quickly items inside a section follow each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerRate {
    Normal,
    Fast,
}

impl StaggerRate {
    pub fn step(self) -> f64 {
        match self {
            StaggerRate::Normal => ITEM_STAGGER_NORMAL,
            StaggerRate::Fast => ITEM_STAGGER_FAST,
        }
    }
}

pub fn section_delay(section: usize) -> f64 {
    SECTION_STAGGER * section as f64
}

pub fn heading_delay(section: usize) -> f64 {
    section_delay(section) + CONTENT_OFFSET
}

pub fn item_delay(section: usize, item: usize, rate: StaggerRate) -> f64 {
    heading_delay(section) + rate.step() * item as f64
}

/// Nested chips (a skill inside a category, a technology inside a project)
/// always follow their parent at the fast rate.
pub fn sub_item_delay(parent: f64, sub: usize) -> f64 {
    parent + CONTENT_OFFSET + ITEM_STAGGER_FAST * sub as f64
}

/// Single entry point over the three position levels.
///
/// `item == None` yields the heading delay; `sub == None` yields the item delay.
pub fn delay(section: usize, item: Option<usize>, sub: Option<usize>, rate: StaggerRate) -> f64 {
    match (item, sub) {
        (None, _) => heading_delay(section),
        (Some(j), None) => item_delay(section, j, rate),
        (Some(j), Some(k)) => sub_item_delay(item_delay(section, j, rate), k),
    }
}

/// CSS value for an `animation-delay` declaration.
pub fn css_seconds(delay: f64) -> String {
    let rounded = format!("{delay:.3}");
    match rounded.trim_end_matches('0').trim_end_matches('.') {
        "" => "0s".to_string(),
        trimmed => format!("{trimmed}s"),
    }
}
