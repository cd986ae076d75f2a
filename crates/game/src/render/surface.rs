use crate::snapshot::{Card, PlayerId};

use super::scene::{OtherBlock, OwnRegion, PlayerMarker, StackRow};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, t: f32) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// A rendered element an animation starts from or flies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    PlayedCard(PlayerId),
    Player(PlayerId),
    Pile(usize),
    PileSlot { stack: usize, slot: usize },
}

/// One fully materialized display region.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Players(Vec<PlayerMarker>),
    Stacks(Vec<StackRow>),
    Own(OwnRegion),
    Others(Vec<OtherBlock>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u64);

/// What the renderer and the animation steps may do to a display.
///
/// Lookups return `None` when the element is not currently displayed;
/// callers treat that as a missing anchor, never as a fatal error.
pub trait Surface: Send + 'static {
    fn materialize(&mut self, region: Region);

    fn locate(&self, anchor: &Anchor) -> Option<Point>;

    /// Removes and returns the card shown as `player`'s played card.
    fn take_played_card(&mut self, player: &str) -> Option<Card>;

    /// Replaces or inserts `player`'s played card. Returns `false` when the
    /// player has no place on this surface.
    fn show_played_card(&mut self, player: &str, card: Card) -> bool;

    /// Appends a not-yet-visible slot to a pile and returns its position.
    fn push_placeholder(&mut self, stack: usize, card: Card) -> Option<usize>;

    fn settle_placeholder(&mut self, stack: usize, slot: usize);

    fn pile_len(&self, stack: usize) -> Option<usize>;

    /// Hides one card of a pile in place and returns it.
    fn hide_pile_card(&mut self, stack: usize, slot: usize) -> Option<Card>;

    fn clear_pile(&mut self, stack: usize);

    fn spawn_sprite(&mut self, card: Card, at: Point) -> SpriteId;

    fn move_sprite(&mut self, id: SpriteId, to: Point);

    fn remove_sprite(&mut self, id: SpriteId);
}
