//! Stat-block import from attached text documents.
//!
//! Each stat is found by its first keyword occurrence followed by an optional
//! `:`, `=` or `-` separator and an integer, e.g. `HP: 12`, `Speed 4`,
//! `E-Def = 8`. Matching is case-insensitive.

use crate::assets::has_extension;
use crate::item::{Attribute, PlacedItem};

/// Extensions scanned for stats on attach.
pub const STAT_DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Keyword spellings per stat, tried in order at each text position.
/// Multi-word spellings allow any whitespace between words.
const STAT_KEYWORDS: &[(Attribute, &[&[&str]])] = &[
    (Attribute::Hp, &[&["hp"], &["hit", "points"], &["hit", "point"]]),
    (Attribute::Structure, &[&["structure"], &["struct"]]),
    (Attribute::Speed, &[&["speed"], &["spd"]]),
    (Attribute::Evasion, &[&["evasion"], &["evade"], &["eva"]]),
    (
        Attribute::EDefense,
        &[&["e-defense"], &["e-def"], &["e", "defense"], &["e", "def"], &["edef"]],
    ),
    (Attribute::RepairCap, &[&["repair"], &["repairs"], &["repair", "cap"]]),
    (Attribute::HeatCap, &[&["heat"], &["heat", "cap"]]),
];

/// Stats found in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatBlock {
    /// Hit points.
    pub hp: Option<i32>,
    /// Structure boxes.
    pub structure: Option<i32>,
    /// Speed.
    pub speed: Option<i32>,
    /// Evasion.
    pub evasion: Option<i32>,
    /// E-Defense.
    pub e_defense: Option<i32>,
    /// Repair capacity.
    pub repair_cap: Option<i32>,
    /// Heat capacity.
    pub heat_cap: Option<i32>,
}

impl StatBlock {
    /// Scan `text` for stats.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mut block = Self::default();
        for (attribute, spellings) in STAT_KEYWORDS {
            let value = find_stat(&lower, spellings);
            match attribute {
                Attribute::Hp => block.hp = value,
                Attribute::Structure => block.structure = value,
                Attribute::Speed => block.speed = value,
                Attribute::Evasion => block.evasion = value,
                Attribute::EDefense => block.e_defense = value,
                Attribute::RepairCap => block.repair_cap = value,
                Attribute::HeatCap => block.heat_cap = value,
                Attribute::MaxHp => {}
            }
        }
        block
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy found stats onto an item.
    ///
    /// HP seeds both `max_hp` and `hp`, and only when `max_hp` is unset.
    /// Structure only fills an unset value. Everything else overwrites.
    /// Returns the attributes that changed.
    pub fn apply_to(&self, item: &mut PlacedItem) -> Vec<Attribute> {
        let mut changed = Vec::new();
        if let (Some(hp), None) = (self.hp, item.max_hp) {
            item.max_hp = Some(hp);
            item.hp = Some(hp);
            changed.extend([Attribute::MaxHp, Attribute::Hp]);
        }
        if let (Some(structure), None) = (self.structure, item.structure) {
            item.structure = Some(structure);
            changed.push(Attribute::Structure);
        }
        let overwrites = [
            (Attribute::Speed, self.speed),
            (Attribute::Evasion, self.evasion),
            (Attribute::EDefense, self.e_defense),
            (Attribute::RepairCap, self.repair_cap),
            (Attribute::HeatCap, self.heat_cap),
        ];
        for (attribute, value) in overwrites {
            if value.is_some() {
                item.set_attribute(attribute, value);
                changed.push(attribute);
            }
        }
        changed
    }
}

/// Whether an attached file should be scanned for stats.
#[must_use]
pub fn is_stat_document(path: &str) -> bool {
    has_extension(path, STAT_DOCUMENT_EXTENSIONS)
}

fn find_stat(text: &str, spellings: &[&[&str]]) -> Option<i32> {
    text.char_indices().find_map(|(at, _)| {
        spellings
            .iter()
            .find_map(|words| match_stat_at(&text[at..], words))
    })
}

fn match_stat_at(text: &str, words: &[&str]) -> Option<i32> {
    let mut rest = text;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            rest = rest.trim_start();
        }
        rest = rest.strip_prefix(word)?;
    }
    rest = rest.trim_start();
    rest = rest.strip_prefix([':', '=', '-']).unwrap_or(rest);
    rest = rest.trim_start();

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse().ok()
}
