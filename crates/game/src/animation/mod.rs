//! Turns one [`AnimationEvent`] into a timed change of whatever is on the
//! surface right now. Purely cosmetic: the next full render is authoritative.

mod transition;

pub use transition::Transition;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::event::AnimationEvent;
use crate::render::{Anchor, SpriteId, Surface, lock_surface};
use crate::snapshot::{Card, PlayerId};

const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);

pub struct Animator<S> {
    surface: Arc<Mutex<S>>,
    config: ClientConfig,
}

impl<S> Clone for Animator<S> {
    fn clone(&self) -> Self {
        Self {
            surface: Arc::clone(&self.surface),
            config: self.config.clone(),
        }
    }
}

impl<S: Surface> Animator<S> {
    pub fn new(surface: Arc<Mutex<S>>, config: ClientConfig) -> Self {
        Self { surface, config }
    }

    /// Plays one step. Missing anchors are logged and skipped.
    pub async fn play(self, event: AnimationEvent) -> Result<(), Error> {
        let outcome = match &event {
            AnimationEvent::PlayCard { player, stack } => self.play_card(player, *stack).await,
            AnimationEvent::PickStack { player, stack } => self.pick_stack(player, *stack).await,
            AnimationEvent::RevealCards { revealed_cards } => {
                self.reveal_cards(revealed_cards);
                Ok(())
            }
        };

        match outcome {
            Err(Error::MissingRenderAnchor(anchor)) => {
                log::debug!("Skipping {}: {:?} is not displayed", event.kind(), anchor);
                Ok(())
            }
            other => other,
        }
    }

    async fn play_card(&self, player: &str, stack: usize) -> Result<(), Error> {
        let (sprite, slot, transition) = {
            let mut surface = self.surface();
            let source = Anchor::PlayedCard(player.to_owned());
            let from = surface
                .locate(&source)
                .ok_or_else(|| Error::MissingRenderAnchor(source.clone()))?;
            if surface.pile_len(stack).is_none() {
                return Err(Error::MissingRenderAnchor(Anchor::Pile(stack)));
            }
            let card = surface
                .take_played_card(player)
                .ok_or(Error::MissingRenderAnchor(source))?;
            let slot = surface
                .push_placeholder(stack, card)
                .ok_or(Error::MissingRenderAnchor(Anchor::Pile(stack)))?;
            let destination = Anchor::PileSlot { stack, slot };
            let to = surface
                .locate(&destination)
                .ok_or(Error::MissingRenderAnchor(destination))?;

            let sprite = surface.spawn_sprite(card, from);
            let transition = Transition::new(from, to, self.config.play_card_duration);
            (sprite, slot, transition)
        };

        self.fly(sprite, transition).await;

        let mut surface = self.surface();
        surface.remove_sprite(sprite);
        surface.settle_placeholder(stack, slot);
        Ok(())
    }

    /// Collects a pile card by card, front to back, each flight finishing
    /// before the next starts.
    async fn pick_stack(&self, player: &str, stack: usize) -> Result<(), Error> {
        let target = Anchor::Player(player.to_owned());
        let count = {
            let surface = self.surface();
            if surface.locate(&target).is_none() {
                return Err(Error::MissingRenderAnchor(target));
            }
            surface
                .pile_len(stack)
                .ok_or(Error::MissingRenderAnchor(Anchor::Pile(stack)))?
        };

        for slot in 0..count {
            let Some((sprite, transition)) = self.lift_pile_card(stack, slot, &target) else {
                log::debug!("Pile {} changed while being collected", stack);
                break;
            };
            self.fly(sprite, transition).await;
            self.surface().remove_sprite(sprite);
        }

        self.surface().clear_pile(stack);
        Ok(())
    }

    fn lift_pile_card(
        &self,
        stack: usize,
        slot: usize,
        target: &Anchor,
    ) -> Option<(SpriteId, Transition)> {
        let mut surface = self.surface();
        let from = surface.locate(&Anchor::PileSlot { stack, slot })?;
        let to = surface.locate(target)?;
        let card: Card = surface.hide_pile_card(stack, slot)?;
        let sprite = surface.spawn_sprite(card, from);
        Some((
            sprite,
            Transition::new(from, to, self.config.pick_stack_duration),
        ))
    }

    /// Each substitution is independent; a player without a place on the
    /// surface only loses their own reveal.
    fn reveal_cards(&self, revealed: &HashMap<PlayerId, Card>) {
        let mut surface = self.surface();
        for (player, card) in revealed {
            if !surface.show_played_card(player, *card) {
                log::debug!("No place to reveal the card of {}", player);
            }
        }
    }

    async fn fly(&self, sprite: SpriteId, transition: Transition) {
        let frames = async {
            let start = Instant::now();
            let mut ticker = tokio::time::interval(self.config.frame_interval.max(MIN_FRAME_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let elapsed = start.elapsed();
                self.surface().move_sprite(sprite, transition.at(elapsed));
                if transition.is_finished(elapsed) {
                    break;
                }
            }
        };

        let deadline = transition.duration + self.config.transition_grace;
        if tokio::time::timeout(deadline, frames).await.is_err() {
            log::warn!("Transition of {:?} did not settle within {:?}", sprite, deadline);
        }
    }

    fn surface(&self) -> MutexGuard<'_, S> {
        lock_surface(&self.surface)
    }
}
