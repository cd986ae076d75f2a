use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::error::{Error, LocalActionRejection};
use crate::net::ClientMessage;
use crate::snapshot::GameStateSnapshot;

pub type Outbound = mpsc::UnboundedSender<ClientMessage>;

/// A click on a displayed element, before gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ChooseStack { index: usize },
    /// `index` is the card's position in the unsorted hand.
    PlayCard { index: usize },
}

/// Decides whether the local player may act right now and sends the
/// resulting request.
///
/// The dispatcher writes it synchronously as messages arrive; input handlers
/// read it at click time.
#[derive(Debug)]
pub struct ActionGate {
    token: String,
    awaiting_stack_choice: AtomicBool,
    card_played: AtomicBool,
    online: AtomicBool,
    link: Mutex<Option<Outbound>>,
}

impl ActionGate {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            awaiting_stack_choice: AtomicBool::new(false),
            card_played: AtomicBool::new(false),
            online: AtomicBool::new(false),
            link: Mutex::new(None),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn sync(&self, snapshot: &GameStateSnapshot) {
        self.awaiting_stack_choice
            .store(snapshot.awaiting_stack_choice(), Ordering::SeqCst);
        self.card_played
            .store(snapshot.own.played_card.is_some(), Ordering::SeqCst);
    }

    pub fn awaiting_stack_choice(&self) -> bool {
        self.awaiting_stack_choice.load(Ordering::SeqCst)
    }

    pub fn card_played(&self) -> bool {
        self.card_played.load(Ordering::SeqCst)
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Stores the link of a freshly opened connection. Clicks stay blocked
    /// until [`go_online`](Self::go_online).
    pub fn attach(&self, link: Outbound) {
        *self.link() = Some(link);
    }

    pub fn go_online(&self) {
        self.online.store(true, Ordering::SeqCst);
    }

    pub fn detach(&self) {
        self.online.store(false, Ordering::SeqCst);
        *self.link() = None;
    }

    /// Sends without consulting the gate.
    pub fn send(&self, message: ClientMessage) -> Result<(), Error> {
        match self.link().as_ref() {
            Some(link) => link
                .send(message)
                .map_err(|_| Error::TransportFailure(String::from("connection is closed"))),
            None => Err(Error::TransportFailure(String::from("not connected"))),
        }
    }

    pub fn submit(&self, intent: Intent) -> Result<(), Error> {
        if !self.is_online() {
            return Err(Error::TransportFailure(String::from("not synchronized")));
        }

        let message = match intent {
            Intent::ChooseStack { index } => {
                // One send per pending choice; the next snapshot re-arms it.
                if self
                    .awaiting_stack_choice
                    .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    return Err(Error::InvalidLocalAction(
                        LocalActionRejection::NotAwaitingStackChoice,
                    ));
                }
                ClientMessage::ChooseStack {
                    token: self.token.clone(),
                    index,
                }
            }
            Intent::PlayCard { index } => {
                if self.awaiting_stack_choice() {
                    return Err(Error::InvalidLocalAction(
                        LocalActionRejection::StackChoicePending,
                    ));
                }
                if self
                    .card_played
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    return Err(Error::InvalidLocalAction(
                        LocalActionRejection::CardAlreadyPlayed,
                    ));
                }
                ClientMessage::PlayCard {
                    token: self.token.clone(),
                    index,
                }
            }
        };

        log::debug!("Sending {:?}", message);
        self.send(message)
    }

    fn link(&self) -> MutexGuard<'_, Option<Outbound>> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
