//! Session-scoped shopping baskets.
//!
//! [`BasketStore`] holds one basket per session id; change notification is
//! a [`tokio::sync::broadcast`] channel callers subscribe to. Baskets are
//! in-memory only and never outlive the process.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use mossberry_core::{ProductId, VisitorSessionId};

/// One line in a basket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasketLine {
    /// The product in the basket.
    pub product_id: ProductId,
    /// Display name captured at add time.
    pub name: String,
    /// Unit price captured at add time.
    pub unit_price: Decimal,
    /// Units of this product.
    pub quantity: u32,
}

/// A change to some session's basket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasketEvent {
    /// A line was added, or an existing line's quantity grew.
    Added {
        session: VisitorSessionId,
        product_id: ProductId,
        quantity: u32,
    },
    /// A line's quantity was set outright.
    QuantitySet {
        session: VisitorSessionId,
        product_id: ProductId,
        quantity: u32,
    },
    /// A line was removed.
    Removed {
        session: VisitorSessionId,
        product_id: ProductId,
    },
    /// The whole basket was emptied.
    Cleared { session: VisitorSessionId },
}

/// In-memory store of per-session baskets with change broadcasting.
pub struct BasketStore {
    baskets: RwLock<HashMap<VisitorSessionId, Vec<BasketLine>>>,
    events: broadcast::Sender<BasketEvent>,
}

impl Default for BasketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BasketStore {
    /// Event channel capacity; slow subscribers lag rather than block.
    const EVENT_CAPACITY: usize = 64;

    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(Self::EVENT_CAPACITY);
        Self {
            baskets: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to basket changes across all sessions.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BasketEvent> {
        self.events.subscribe()
    }

    /// Add units of a product to a session's basket. An existing line for
    /// the same product has its quantity increased; otherwise a line is
    /// appended.
    pub async fn add(&self, session: VisitorSessionId, line: BasketLine) {
        let quantity = line.quantity;
        let product_id = line.product_id;
        {
            let mut baskets = self.baskets.write().await;
            let basket = baskets.entry(session).or_default();
            if let Some(existing) = basket.iter_mut().find(|l| l.product_id == product_id) {
                existing.quantity = existing.quantity.saturating_add(quantity);
            } else {
                basket.push(line);
            }
        }
        let _ = self.events.send(BasketEvent::Added {
            session,
            product_id,
            quantity,
        });
    }

    /// Set a line's quantity outright. A quantity of zero removes the
    /// line. Returns `false` (and emits nothing) when the session has no
    /// line for this product.
    pub async fn set_quantity(
        &self,
        session: VisitorSessionId,
        product_id: ProductId,
        quantity: u32,
    ) -> bool {
        if quantity == 0 {
            return self.remove(session, product_id).await;
        }
        let changed = {
            let mut baskets = self.baskets.write().await;
            baskets
                .get_mut(&session)
                .and_then(|basket| basket.iter_mut().find(|l| l.product_id == product_id))
                .map(|line| line.quantity = quantity)
                .is_some()
        };
        if changed {
            let _ = self.events.send(BasketEvent::QuantitySet {
                session,
                product_id,
                quantity,
            });
        }
        changed
    }

    /// Remove a product's line from a session's basket.
    ///
    /// Returns `true` if a line was removed.
    pub async fn remove(&self, session: VisitorSessionId, product_id: ProductId) -> bool {
        let removed = {
            let mut baskets = self.baskets.write().await;
            match baskets.get_mut(&session) {
                Some(basket) => {
                    let before = basket.len();
                    basket.retain(|l| l.product_id != product_id);
                    basket.len() < before
                }
                None => false,
            }
        };
        if removed {
            let _ = self
                .events
                .send(BasketEvent::Removed { session, product_id });
        }
        removed
    }

    /// Empty a session's basket. No-op (and no event) if already empty.
    pub async fn clear(&self, session: VisitorSessionId) {
        let had_lines = {
            let mut baskets = self.baskets.write().await;
            baskets.remove(&session).is_some_and(|b| !b.is_empty())
        };
        if had_lines {
            let _ = self.events.send(BasketEvent::Cleared { session });
        }
    }

    /// Snapshot of a session's basket lines.
    pub async fn lines(&self, session: VisitorSessionId) -> Vec<BasketLine> {
        self.baskets
            .read()
            .await
            .get(&session)
            .cloned()
            .unwrap_or_default()
    }

    /// Basket total: sum of unit price times quantity across lines.
    pub async fn total(&self, session: VisitorSessionId) -> Decimal {
        self.baskets
            .read()
            .await
            .get(&session)
            .map(|basket| {
                basket
                    .iter()
                    .map(|l| l.unit_price * Decimal::from(l.quantity))
                    .sum()
            })
            .unwrap_or(Decimal::ZERO)
    }
}
