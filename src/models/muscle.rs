//! Fixed muscle-group catalogue shared by the spreadsheet facets and the weekly volume rollup.
//!
//! The 22 names match the column headers of the `Muscle Groups - *` export sheets.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const MUSCLE_COUNT: usize = 22;
pub const PATTERN_COUNT: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Muscle {
    Chest,
    Triceps,
    FrontDelts,
    SideDelts,
    UpperBack,
    Lats,
    Biceps,
    RearDelts,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Adductors,
    Abductors,
    LowerBack,
    Abs,
    Obliques,
    Forearms,
    Traps,
    Neck,
    Serratus,
    HipFlexors,
}

impl Muscle {
    /// Catalogue order; also the column order used when no header row is present.
    pub const ALL: [Muscle; MUSCLE_COUNT] = [
        Muscle::Chest,
        Muscle::Triceps,
        Muscle::FrontDelts,
        Muscle::SideDelts,
        Muscle::UpperBack,
        Muscle::Lats,
        Muscle::Biceps,
        Muscle::RearDelts,
        Muscle::Quads,
        Muscle::Hamstrings,
        Muscle::Glutes,
        Muscle::Calves,
        Muscle::Adductors,
        Muscle::Abductors,
        Muscle::LowerBack,
        Muscle::Abs,
        Muscle::Obliques,
        Muscle::Forearms,
        Muscle::Traps,
        Muscle::Neck,
        Muscle::Serratus,
        Muscle::HipFlexors,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Muscle::Chest => "Chest",
            Muscle::Triceps => "Triceps",
            Muscle::FrontDelts => "Front Delts",
            Muscle::SideDelts => "Side Delts",
            Muscle::UpperBack => "Upper Back",
            Muscle::Lats => "Lats",
            Muscle::Biceps => "Biceps",
            Muscle::RearDelts => "Rear Delts",
            Muscle::Quads => "Quads",
            Muscle::Hamstrings => "Hamstrings",
            Muscle::Glutes => "Glutes",
            Muscle::Calves => "Calves",
            Muscle::Adductors => "Adductors",
            Muscle::Abductors => "Abductors",
            Muscle::LowerBack => "Lower Back",
            Muscle::Abs => "Abs",
            Muscle::Obliques => "Obliques",
            Muscle::Forearms => "Forearms",
            Muscle::Traps => "Traps",
            Muscle::Neck => "Neck",
            Muscle::Serratus => "Serratus",
            Muscle::HipFlexors => "Hip Flexors",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Muscle::ALL.iter().copied().find(|m| m.name().eq_ignore_ascii_case(name))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Every movement pattern this muscle counts toward. Upper-body muscles land in both
    /// `Upper` and their push/pull subgroup.
    pub fn patterns(self) -> impl Iterator<Item = MovementPattern> {
        MovementPattern::ALL.into_iter().filter(move |p| p.contains(self))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MovementPattern {
    Push,
    Pull,
    Upper,
    Lower,
}

const PUSH: [Muscle; 4] = [Muscle::Chest, Muscle::Triceps, Muscle::FrontDelts, Muscle::SideDelts];
const PULL: [Muscle; 4] = [Muscle::UpperBack, Muscle::Lats, Muscle::Biceps, Muscle::RearDelts];
const LOWER: [Muscle; 7] = [
    Muscle::Quads,
    Muscle::Hamstrings,
    Muscle::Glutes,
    Muscle::Calves,
    Muscle::Adductors,
    Muscle::Abductors,
    Muscle::LowerBack,
];

impl MovementPattern {
    pub const ALL: [MovementPattern; PATTERN_COUNT] = [
        MovementPattern::Push,
        MovementPattern::Pull,
        MovementPattern::Upper,
        MovementPattern::Lower,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn contains(self, muscle: Muscle) -> bool {
        match self {
            MovementPattern::Push => PUSH.contains(&muscle),
            MovementPattern::Pull => PULL.contains(&muscle),
            MovementPattern::Upper => PUSH.contains(&muscle) || PULL.contains(&muscle),
            MovementPattern::Lower => LOWER.contains(&muscle),
        }
    }
}

/// Per-muscle values for one date. Columns missing from the sheet (or blank cells) stay `None`,
/// which is distinct from a logged zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuscleValues([Option<f64>; MUSCLE_COUNT]);

impl MuscleValues {
    pub fn get(&self, muscle: Muscle) -> Option<f64> {
        self.0[muscle.index()]
    }

    pub fn set(&mut self, muscle: Muscle, value: Option<f64>) {
        self.0[muscle.index()] = value;
    }

    /// Present values in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = (Muscle, f64)> + '_ {
        Muscle::ALL
            .iter()
            .copied()
            .filter_map(|m| self.get(m).map(|v| (m, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

impl Serialize for MuscleValues {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (muscle, value) in self.iter() {
            map.serialize_entry(muscle.name(), &value)?;
        }
        map.end()
    }
}
