//! Snapshot to display regions, and the retained scene they land on.

mod layout;
mod scene;
mod surface;

pub use layout::BoardLayout;
pub use scene::{
    CardView, ClickTarget, HandCard, OtherBlock, OwnRegion, PlayerMarker, Scene, Sprite, StackRow,
};
pub use surface::{Anchor, Point, Region, SpriteId, Surface};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::snapshot::{Card, GameStateSnapshot};

pub type SharedSurface<S> = Arc<Mutex<S>>;

pub fn lock_surface<S>(surface: &Mutex<S>) -> MutexGuard<'_, S> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn render(snapshot: &GameStateSnapshot) -> Vec<Region> {
    vec![
        render_players(snapshot),
        render_stacks(&snapshot.stacks),
        render_own(snapshot),
        render_others(snapshot),
    ]
}

pub fn render_players(snapshot: &GameStateSnapshot) -> Region {
    let markers = snapshot
        .players
        .iter()
        .map(|player| PlayerMarker {
            player: player.clone(),
            is_self: *player == snapshot.self_conn,
            choosing_stack: snapshot.waiting_for_stack.as_ref() == Some(player),
            awaiting_card: snapshot.waiting_for_card.contains(player),
        })
        .collect();
    Region::Players(markers)
}

pub fn render_stacks(stacks: &[Vec<Card>]) -> Region {
    let rows = stacks
        .iter()
        .enumerate()
        .map(|(index, pile)| StackRow {
            index,
            cards: pile.iter().copied().map(CardView::visible).collect(),
        })
        .collect();
    Region::Stacks(rows)
}

/// The hand is shown sorted by face, but every card keeps its index into
/// the unsorted hand; that index is what a `play_card` request must carry.
pub fn render_own(snapshot: &GameStateSnapshot) -> Region {
    let own = &snapshot.own;
    let mut hand: Vec<HandCard> = own
        .hand
        .iter()
        .copied()
        .enumerate()
        .map(|(index, card)| HandCard { card, index })
        .collect();
    hand.sort_by_key(|hand_card| hand_card.card.face);

    Region::Own(OwnRegion {
        player: snapshot.self_conn.clone(),
        name: own.name.clone(),
        total: own.total(),
        hand,
        played: own.played_card,
    })
}

pub fn render_others(snapshot: &GameStateSnapshot) -> Region {
    let blocks = snapshot
        .opponents()
        .into_iter()
        .map(|(player, view)| OtherBlock {
            player: player.clone(),
            name: view.name.clone(),
            total: view.total(),
            played: view.played_card,
        })
        .collect();
    Region::Others(blocks)
}
