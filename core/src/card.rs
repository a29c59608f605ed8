use serde::{Deserialize, Serialize};

use crate::GameError;

/// Face of a card. Two cards match when their faces are equal.
///
/// Stored in saves by discriminant, so the order here is part of the save format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum CardType {
    Checkmark = 0,
    Circle = 1,
    Cross = 2,
    Square = 3,
    Star = 4,
    CheckRound = 5,
    CheckSquare = 6,
    ArrowEast = 7,
    ArrowNorth = 8,
    ArrowDecorative = 9,
}

impl CardType {
    pub const ALL: [CardType; 10] = [
        CardType::Checkmark,
        CardType::Circle,
        CardType::Cross,
        CardType::Square,
        CardType::Star,
        CardType::CheckRound,
        CardType::CheckSquare,
        CardType::ArrowEast,
        CardType::ArrowNorth,
        CardType::ArrowDecorative,
    ];

    /// Short glyph used by text frontends
    pub const fn symbol(self) -> char {
        use CardType::*;
        match self {
            Checkmark => 'v',
            Circle => 'o',
            Cross => 'x',
            Square => '#',
            Star => '*',
            CheckRound => '@',
            CheckSquare => '%',
            ArrowEast => '>',
            ArrowNorth => '^',
            ArrowDecorative => '~',
        }
    }
}

impl From<CardType> for u8 {
    fn from(card_type: CardType) -> Self {
        card_type as u8
    }
}

impl TryFrom<u8> for CardType {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CardType::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(GameError::UnknownCardType(value))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

impl Default for CardState {
    fn default() -> Self {
        Self::Hidden
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    card_type: CardType,
    state: CardState,
    flippable: bool,
}

impl Card {
    /// A freshly dealt, face-down card.
    pub const fn new(card_type: CardType) -> Self {
        Self {
            card_type,
            state: CardState::Hidden,
            flippable: true,
        }
    }

    /// A card rebuilt from a save that was already paired off.
    pub const fn restored_matched(card_type: CardType) -> Self {
        Self {
            card_type,
            state: CardState::Matched,
            flippable: false,
        }
    }

    pub const fn card_type(&self) -> CardType {
        self.card_type
    }

    pub const fn state(&self) -> CardState {
        self.state
    }

    pub const fn is_flippable(&self) -> bool {
        self.flippable
    }

    pub const fn is_matched(&self) -> bool {
        matches!(self.state, CardState::Matched)
    }

    /// Whether the face is currently shown to the player
    pub const fn is_face_up(&self) -> bool {
        !matches!(self.state, CardState::Hidden)
    }

    /// Accepts a flip request. Only a settled hidden card can be flipped; the card stays locked
    /// until it is either matched or closed again.
    pub(crate) fn begin_flip(&mut self) -> bool {
        if self.flippable && self.state == CardState::Hidden {
            self.flippable = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn reveal(&mut self) {
        if self.state == CardState::Hidden {
            self.state = CardState::Revealed;
        }
    }

    pub(crate) fn mark_matched(&mut self) {
        if self.state == CardState::Revealed {
            self.state = CardState::Matched;
            self.flippable = false;
        }
    }

    pub(crate) fn conceal(&mut self) {
        if self.state == CardState::Revealed {
            self.state = CardState::Hidden;
            self.flippable = true;
        }
    }
}
