//! Closed taxonomy of object kinds
//!
//! Parent/child relationships are a hand-written table; a category query for
//! a parent also matches all of its children.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Player,
    Block,
    MiniBlock,
    /// Invisible room border used by the "solid" death border; counts as a Block
    BorderBlock,
    Platform,
    /// Abstract category for everything that kills on touch
    Killer,
    SpikeUp,
    SpikeDown,
    SpikeLeft,
    SpikeRight,
    MiniSpikeUp,
    MiniSpikeDown,
    MiniSpikeLeft,
    MiniSpikeRight,
    Apple,
    KillerBlock,
    Save,
    Water,
    Water2,
    Water3,
    WalljumpL,
    WalljumpR,
    PlayerStart,
    Warp,
    JumpRefresher,
    GravityArrowUp,
    GravityArrowDown,
    BulletBlocker,
    Blood,
    PlayerBullet,
}

const KILLER_CHILDREN: [ObjectKind; 10] = [
    ObjectKind::SpikeUp,
    ObjectKind::SpikeDown,
    ObjectKind::SpikeLeft,
    ObjectKind::SpikeRight,
    ObjectKind::MiniSpikeUp,
    ObjectKind::MiniSpikeDown,
    ObjectKind::MiniSpikeLeft,
    ObjectKind::MiniSpikeRight,
    ObjectKind::Apple,
    ObjectKind::KillerBlock,
];

const BLOCK_CHILDREN: [ObjectKind; 1] = [ObjectKind::BorderBlock];

impl ObjectKind {
    pub const ALL: [ObjectKind; 30] = [
        ObjectKind::Player,
        ObjectKind::Block,
        ObjectKind::MiniBlock,
        ObjectKind::BorderBlock,
        ObjectKind::Platform,
        ObjectKind::Killer,
        ObjectKind::SpikeUp,
        ObjectKind::SpikeDown,
        ObjectKind::SpikeLeft,
        ObjectKind::SpikeRight,
        ObjectKind::MiniSpikeUp,
        ObjectKind::MiniSpikeDown,
        ObjectKind::MiniSpikeLeft,
        ObjectKind::MiniSpikeRight,
        ObjectKind::Apple,
        ObjectKind::KillerBlock,
        ObjectKind::Save,
        ObjectKind::Water,
        ObjectKind::Water2,
        ObjectKind::Water3,
        ObjectKind::WalljumpL,
        ObjectKind::WalljumpR,
        ObjectKind::PlayerStart,
        ObjectKind::Warp,
        ObjectKind::JumpRefresher,
        ObjectKind::GravityArrowUp,
        ObjectKind::GravityArrowDown,
        ObjectKind::BulletBlocker,
        ObjectKind::Blood,
        ObjectKind::PlayerBullet,
    ];

    /// Kinds a map can contain, in palette order
    pub const PALETTE: [ObjectKind; 25] = [
        ObjectKind::SpikeUp,
        ObjectKind::SpikeDown,
        ObjectKind::SpikeLeft,
        ObjectKind::SpikeRight,
        ObjectKind::MiniSpikeUp,
        ObjectKind::MiniSpikeDown,
        ObjectKind::MiniSpikeLeft,
        ObjectKind::MiniSpikeRight,
        ObjectKind::Block,
        ObjectKind::MiniBlock,
        ObjectKind::Apple,
        ObjectKind::Save,
        ObjectKind::Platform,
        ObjectKind::KillerBlock,
        ObjectKind::Water,
        ObjectKind::Water2,
        ObjectKind::Water3,
        ObjectKind::WalljumpL,
        ObjectKind::WalljumpR,
        ObjectKind::PlayerStart,
        ObjectKind::Warp,
        ObjectKind::JumpRefresher,
        ObjectKind::GravityArrowUp,
        ObjectKind::GravityArrowDown,
        ObjectKind::BulletBlocker,
    ];

    /// Every registered descendant of this kind
    pub fn children(self) -> &'static [ObjectKind] {
        match self {
            ObjectKind::Killer => &KILLER_CHILDREN,
            ObjectKind::Block => &BLOCK_CHILDREN,
            _ => &[],
        }
    }

    pub fn parent(self) -> Option<ObjectKind> {
        if KILLER_CHILDREN.contains(&self) {
            Some(ObjectKind::Killer)
        } else if BLOCK_CHILDREN.contains(&self) {
            Some(ObjectKind::Block)
        } else {
            None
        }
    }

    /// True when `self` is `category` or one of its children
    pub fn is_a(self, category: ObjectKind) -> bool {
        self == category || category.children().contains(&self)
    }

    pub fn in_palette(self) -> bool {
        Self::PALETTE.contains(&self)
    }

    /// Sprite the kind's mask is taken from; abstract kinds have none
    pub fn sprite_name(self) -> Option<&'static str> {
        Some(match self {
            ObjectKind::Player => "player_mask",
            ObjectKind::Block | ObjectKind::BorderBlock => "block",
            ObjectKind::MiniBlock => "mini_block",
            ObjectKind::Platform => "platform",
            ObjectKind::Killer => return None,
            ObjectKind::SpikeUp => "spike_up",
            ObjectKind::SpikeDown => "spike_down",
            ObjectKind::SpikeLeft => "spike_left",
            ObjectKind::SpikeRight => "spike_right",
            ObjectKind::MiniSpikeUp => "mini_spike_up",
            ObjectKind::MiniSpikeDown => "mini_spike_down",
            ObjectKind::MiniSpikeLeft => "mini_spike_left",
            ObjectKind::MiniSpikeRight => "mini_spike_right",
            ObjectKind::Apple => "apple",
            ObjectKind::KillerBlock => "killer_block",
            ObjectKind::Save => "save",
            ObjectKind::Water => "water",
            ObjectKind::Water2 => "water2",
            ObjectKind::Water3 => "water3",
            ObjectKind::WalljumpL => "walljump_l",
            ObjectKind::WalljumpR => "walljump_r",
            ObjectKind::PlayerStart => "player_start",
            ObjectKind::Warp => "warp",
            ObjectKind::JumpRefresher => "jump_refresher",
            ObjectKind::GravityArrowUp => "gravity_up",
            ObjectKind::GravityArrowDown => "gravity_down",
            ObjectKind::BulletBlocker => "bullet_blocker",
            ObjectKind::Blood => "blood",
            ObjectKind::PlayerBullet => "bullet",
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Player => "Player",
            ObjectKind::Block => "Block",
            ObjectKind::MiniBlock => "Mini Block",
            ObjectKind::BorderBlock => "Border Block",
            ObjectKind::Platform => "Platform",
            ObjectKind::Killer => "Killer",
            ObjectKind::SpikeUp => "Spike Up",
            ObjectKind::SpikeDown => "Spike Down",
            ObjectKind::SpikeLeft => "Spike Left",
            ObjectKind::SpikeRight => "Spike Right",
            ObjectKind::MiniSpikeUp => "Mini Spike Up",
            ObjectKind::MiniSpikeDown => "Mini Spike Down",
            ObjectKind::MiniSpikeLeft => "Mini Spike Left",
            ObjectKind::MiniSpikeRight => "Mini Spike Right",
            ObjectKind::Apple => "Apple",
            ObjectKind::KillerBlock => "Killer Block",
            ObjectKind::Save => "Save",
            ObjectKind::Water => "Water",
            ObjectKind::Water2 => "Water 2",
            ObjectKind::Water3 => "Water 3",
            ObjectKind::WalljumpL => "Walljump L",
            ObjectKind::WalljumpR => "Walljump R",
            ObjectKind::PlayerStart => "Player Start",
            ObjectKind::Warp => "Warp",
            ObjectKind::JumpRefresher => "Jump Refresher",
            ObjectKind::GravityArrowUp => "Gravity Up",
            ObjectKind::GravityArrowDown => "Gravity Down",
            ObjectKind::BulletBlocker => "Bullet Blocker",
            ObjectKind::Blood => "Blood",
            ObjectKind::PlayerBullet => "Bullet",
        }
    }

    /// Numeric id used by `.jmap` files
    pub fn jmap_id(self) -> Option<u8> {
        Some(match self {
            ObjectKind::Block => 1,
            ObjectKind::MiniBlock => 2,
            ObjectKind::SpikeUp => 3,
            ObjectKind::SpikeRight => 4,
            ObjectKind::SpikeLeft => 5,
            ObjectKind::SpikeDown => 6,
            ObjectKind::MiniSpikeUp => 7,
            ObjectKind::MiniSpikeRight => 8,
            ObjectKind::MiniSpikeLeft => 9,
            ObjectKind::MiniSpikeDown => 10,
            ObjectKind::Apple => 11,
            ObjectKind::Save => 12,
            ObjectKind::Platform => 13,
            ObjectKind::Water => 14,
            ObjectKind::Water2 => 15,
            ObjectKind::WalljumpL => 16,
            ObjectKind::WalljumpR => 17,
            ObjectKind::KillerBlock => 18,
            ObjectKind::BulletBlocker => 19,
            ObjectKind::PlayerStart => 20,
            ObjectKind::Warp => 21,
            ObjectKind::JumpRefresher => 22,
            ObjectKind::Water3 => 23,
            ObjectKind::GravityArrowUp => 24,
            ObjectKind::GravityArrowDown => 25,
            _ => return None,
        })
    }

    pub fn from_jmap_id(id: u8) -> Option<ObjectKind> {
        Self::PALETTE.iter().copied().find(|k| k.jmap_id() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_point_back_to_parent() {
        for kind in ObjectKind::ALL {
            for child in kind.children() {
                assert_eq!(child.parent(), Some(kind));
                assert!(child.is_a(kind));
            }
        }
    }

    #[test]
    fn test_category_membership() {
        assert!(ObjectKind::Apple.is_a(ObjectKind::Killer));
        assert!(ObjectKind::BorderBlock.is_a(ObjectKind::Block));
        assert!(!ObjectKind::Block.is_a(ObjectKind::Killer));
        assert!(!ObjectKind::Block.is_a(ObjectKind::BorderBlock));
    }

    #[test]
    fn test_palette_has_jmap_ids() {
        for kind in ObjectKind::PALETTE {
            let id = kind.jmap_id().unwrap();
            assert_eq!(ObjectKind::from_jmap_id(id), Some(kind));
        }
        assert!(ObjectKind::Player.jmap_id().is_none());
        assert!(!ObjectKind::BorderBlock.in_palette());
    }
}
