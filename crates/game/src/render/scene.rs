use crate::gate::Intent;
use crate::snapshot::{Card, PlayerId};

use super::layout::BoardLayout;
use super::surface::{Anchor, Point, Region, SpriteId, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMarker {
    pub player: PlayerId,
    pub is_self: bool,
    pub choosing_stack: bool,
    pub awaiting_card: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardView {
    pub card: Card,
    /// Slot is reserved but nothing is drawn in it.
    pub hidden: bool,
}

impl CardView {
    pub fn visible(card: Card) -> Self {
        Self {
            card,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRow {
    pub index: usize,
    pub cards: Vec<CardView>,
}

/// A hand card in display order, remembering where it sits in the hand
/// the server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandCard {
    pub card: Card,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnRegion {
    pub player: PlayerId,
    pub name: String,
    pub total: i64,
    pub hand: Vec<HandCard>,
    pub played: Option<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherBlock {
    pub player: PlayerId,
    pub name: String,
    pub total: i64,
    pub played: Option<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub id: SpriteId,
    pub card: Card,
    pub at: Point,
}

/// Something the user can click on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// A pile row, by display position.
    Stack(usize),
    /// A hand card, by display position.
    HandCard(usize),
}

/// In-memory retained display. The TUI draws it, tests inspect it.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub layout: BoardLayout,
    pub players: Vec<PlayerMarker>,
    pub stacks: Vec<StackRow>,
    pub own: Option<OwnRegion>,
    pub others: Vec<OtherBlock>,
    pub sprites: Vec<Sprite>,
    revision: u64,
    next_sprite: u64,
}

impl Scene {
    pub fn new(layout: BoardLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    /// Bumped on every materialized region.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn click(&self, target: ClickTarget) -> Option<Intent> {
        match target {
            ClickTarget::Stack(row) => self
                .stacks
                .get(row)
                .map(|row| Intent::ChooseStack { index: row.index }),
            ClickTarget::HandCard(position) => self
                .own
                .as_ref()
                .and_then(|own| own.hand.get(position))
                .map(|card| Intent::PlayCard { index: card.index }),
        }
    }

    pub fn played_card(&self, player: &str) -> Option<Card> {
        if let Some(own) = self.own.as_ref().filter(|own| own.player == player) {
            return own.played;
        }
        self.others
            .iter()
            .find(|block| block.player == player)
            .and_then(|block| block.played)
    }

    fn played_slot(&mut self, player: &str) -> Option<&mut Option<Card>> {
        if let Some(own) = self.own.as_mut().filter(|own| own.player == player) {
            return Some(&mut own.played);
        }
        self.others
            .iter_mut()
            .find(|block| block.player == player)
            .map(|block| &mut block.played)
    }

    fn row_mut(&mut self, stack: usize) -> Option<&mut StackRow> {
        self.stacks.iter_mut().find(|row| row.index == stack)
    }

    fn row_position(&self, stack: usize) -> Option<usize> {
        self.stacks.iter().position(|row| row.index == stack)
    }

    fn block_position(&self, player: &str) -> Option<usize> {
        self.others.iter().position(|block| block.player == player)
    }

    fn is_own(&self, player: &str) -> bool {
        self.own.as_ref().is_some_and(|own| own.player == player)
    }
}

impl Surface for Scene {
    fn materialize(&mut self, region: Region) {
        match region {
            Region::Players(markers) => self.players = markers,
            Region::Stacks(rows) => self.stacks = rows,
            Region::Own(own) => self.own = Some(own),
            Region::Others(blocks) => self.others = blocks,
        }
        // A render never overlaps an animation, so any sprite left here was
        // abandoned by a step that hit its watchdog.
        self.sprites.clear();
        self.revision += 1;
    }

    fn locate(&self, anchor: &Anchor) -> Option<Point> {
        let stack_count = self.stacks.len();
        match anchor {
            Anchor::PlayedCard(player) => {
                self.played_card(player)?;
                if self.is_own(player) {
                    Some(self.layout.own_played(stack_count))
                } else {
                    let block = self.block_position(player)?;
                    Some(self.layout.other_played(stack_count, block))
                }
            }
            Anchor::Player(player) => {
                if self.is_own(player) {
                    Some(self.layout.own_label(stack_count))
                } else {
                    let block = self.block_position(player)?;
                    Some(self.layout.other_block(stack_count, block))
                }
            }
            Anchor::Pile(stack) => {
                let row = self.row_position(*stack)?;
                Some(self.layout.pile_slot(row, 0))
            }
            Anchor::PileSlot { stack, slot } => {
                let row = self.row_position(*stack)?;
                if *slot > self.stacks[row].cards.len() {
                    return None;
                }
                Some(self.layout.pile_slot(row, *slot))
            }
        }
    }

    fn take_played_card(&mut self, player: &str) -> Option<Card> {
        self.played_slot(player)?.take()
    }

    fn show_played_card(&mut self, player: &str, card: Card) -> bool {
        match self.played_slot(player) {
            Some(slot) => {
                *slot = Some(card);
                true
            }
            None => false,
        }
    }

    fn push_placeholder(&mut self, stack: usize, card: Card) -> Option<usize> {
        let row = self.row_mut(stack)?;
        row.cards.push(CardView { card, hidden: true });
        Some(row.cards.len() - 1)
    }

    fn settle_placeholder(&mut self, stack: usize, slot: usize) {
        if let Some(view) = self
            .row_mut(stack)
            .and_then(|row| row.cards.get_mut(slot))
        {
            view.hidden = false;
        }
    }

    fn pile_len(&self, stack: usize) -> Option<usize> {
        let row = self.row_position(stack)?;
        Some(self.stacks[row].cards.len())
    }

    fn hide_pile_card(&mut self, stack: usize, slot: usize) -> Option<Card> {
        let view = self.row_mut(stack)?.cards.get_mut(slot)?;
        view.hidden = true;
        Some(view.card)
    }

    fn clear_pile(&mut self, stack: usize) {
        if let Some(row) = self.row_mut(stack) {
            row.cards.clear();
        }
    }

    fn spawn_sprite(&mut self, card: Card, at: Point) -> SpriteId {
        let id = SpriteId(self.next_sprite);
        self.next_sprite += 1;
        self.sprites.push(Sprite { id, card, at });
        id
    }

    fn move_sprite(&mut self, id: SpriteId, to: Point) {
        if let Some(sprite) = self.sprites.iter_mut().find(|s| s.id == id) {
            sprite.at = to;
        }
    }

    fn remove_sprite(&mut self, id: SpriteId) {
        self.sprites.retain(|s| s.id != id);
    }
}

fn write_card(f: &mut std::fmt::Formatter<'_>, card: Option<Card>) -> std::fmt::Result {
    match card {
        Some(card) => write!(f, "{}", card),
        None => write!(f, "-"),
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "players:")?;
        for marker in &self.players {
            let mut tag = String::new();
            if marker.is_self {
                tag.push('*');
            }
            if marker.choosing_stack {
                tag.push('!');
            }
            if marker.awaiting_card {
                tag.push('…');
            }
            write!(f, " [{}{}]", marker.player, tag)?;
        }
        writeln!(f)?;

        for row in &self.stacks {
            write!(f, "stack {}:", row.index)?;
            for view in row.cards.iter().filter(|view| !view.hidden) {
                write!(f, " {}", view.card)?;
            }
            writeln!(f)?;
        }

        for block in &self.others {
            write!(f, "{} ({} pts): ", block.name, block.total)?;
            write_card(f, block.played)?;
            writeln!(f)?;
        }

        if let Some(own) = &self.own {
            write!(f, "You ({}): {} pts, played ", own.name, own.total)?;
            write_card(f, own.played)?;
            writeln!(f)?;
            write!(f, "hand:")?;
            for (position, hand_card) in own.hand.iter().enumerate() {
                write!(f, " {}:{}", position, hand_card.card)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
