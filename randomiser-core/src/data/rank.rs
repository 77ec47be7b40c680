use serde::{Deserialize, Serialize};

/// Weapon families in the order rank transfer walks them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    Sword,
    Lance,
    Axe,
    Bow,
    Anima,
    Light,
    Dark,
    Staff,
}

impl WeaponType {
    /// Processing order for rank transfer and any per-type iteration.
    pub const ORDER: [WeaponType; 8] = [
        WeaponType::Sword,
        WeaponType::Lance,
        WeaponType::Axe,
        WeaponType::Bow,
        WeaponType::Anima,
        WeaponType::Light,
        WeaponType::Dark,
        WeaponType::Staff,
    ];

    /// Item type byte in the image.
    pub fn from_code(code: u8) -> Option<WeaponType> {
        match code {
            0 => Some(WeaponType::Sword),
            1 => Some(WeaponType::Lance),
            2 => Some(WeaponType::Axe),
            3 => Some(WeaponType::Bow),
            4 => Some(WeaponType::Staff),
            5 => Some(WeaponType::Anima),
            6 => Some(WeaponType::Light),
            7 => Some(WeaponType::Dark),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self.storage_index() as u8
    }

    /// Position of this type's rank byte inside class and character records.
    pub fn storage_index(self) -> usize {
        match self {
            WeaponType::Sword => 0,
            WeaponType::Lance => 1,
            WeaponType::Axe => 2,
            WeaponType::Bow => 3,
            WeaponType::Staff => 4,
            WeaponType::Anima => 5,
            WeaponType::Light => 6,
            WeaponType::Dark => 7,
        }
    }

    pub fn is_staff(self) -> bool {
        self == WeaponType::Staff
    }

    pub fn is_magic(self) -> bool {
        matches!(self, WeaponType::Anima | WeaponType::Light | WeaponType::Dark)
    }
}

/// Ordinal proficiency tier, NONE < E < D < C < B < A < S.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum WeaponRank {
    None,
    E,
    D,
    C,
    B,
    A,
    S,
}

/// Succession table: rank, stored threshold value, next rank up.
const RANK_TABLE: [(WeaponRank, u8, WeaponRank); 7] = [
    (WeaponRank::None, 0, WeaponRank::E),
    (WeaponRank::E, 1, WeaponRank::D),
    (WeaponRank::D, 31, WeaponRank::C),
    (WeaponRank::C, 71, WeaponRank::B),
    (WeaponRank::B, 121, WeaponRank::A),
    (WeaponRank::A, 181, WeaponRank::S),
    (WeaponRank::S, 251, WeaponRank::S),
];

impl WeaponRank {
    pub const ALL: [WeaponRank; 7] = [
        WeaponRank::None,
        WeaponRank::E,
        WeaponRank::D,
        WeaponRank::C,
        WeaponRank::B,
        WeaponRank::A,
        WeaponRank::S,
    ];

    fn entry(self) -> (WeaponRank, u8, WeaponRank) {
        RANK_TABLE[self as usize]
    }

    /// Stored threshold for this rank.
    pub fn value(self) -> u8 {
        self.entry().1
    }

    /// Highest rank whose threshold `value` reaches.
    pub fn from_value(value: u8) -> WeaponRank {
        RANK_TABLE
            .iter()
            .rev()
            .find(|(_, threshold, _)| value >= *threshold)
            .map(|(rank, _, _)| *rank)
            .unwrap_or(WeaponRank::None)
    }

    /// Next rank up; S is its own successor.
    pub fn successor(self) -> WeaponRank {
        self.entry().2
    }
}
