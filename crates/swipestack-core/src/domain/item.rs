//! Decidable items: the cards in the stack.
//!
//! Items are created by an external fetch step and are immutable once they
//! enter the queue. Fields are private so the engine can only read them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::ItemError;
use super::ids::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "Crypto")]
    Crypto,
    #[serde(alias = "Sports")]
    Sports,
    #[serde(alias = "Social")]
    Social,
    #[serde(alias = "Farcaster")]
    Farcaster,
    #[serde(alias = "DeFi", alias = "Defi")]
    Defi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    #[default]
    Active,
    Resolved,
    Cancelled,
}

/// A binary prediction market.
///
/// `total_pool` is denominated in ETH. Odds are whole percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCard {
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub category: Category,

    pub end_date: DateTime<Utc>,

    pub total_pool: Decimal,

    pub yes_odds: u8,

    pub no_odds: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub created_by: String,

    #[serde(default)]
    pub status: MarketStatus,

    /// Resolved result (`true` = YES). Only set once `status` is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A candidate profile: a person and the call they are making.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCard {
    pub name: String,
    pub age: u32,
    pub prediction: String,
    /// Confidence in percent.
    pub confidence: u8,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub bio: String,
}

/// Display payload of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Card {
    Market(MarketCard),
    Profile(ProfileCard),
}

/// An opaque identifier plus its display payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    #[serde(flatten)]
    card: Card,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, card: Card) -> Self {
        Self {
            id: id.into(),
            card,
        }
    }

    pub fn market(id: impl Into<ItemId>, card: MarketCard) -> Self {
        Self::new(id, Card::Market(card))
    }

    pub fn profile(id: impl Into<ItemId>, card: ProfileCard) -> Self {
        Self::new(id, Card::Profile(card))
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn title(&self) -> &str {
        match &self.card {
            Card::Market(m) => &m.title,
            Card::Profile(p) => &p.name,
        }
    }

    pub fn category(&self) -> Category {
        match &self.card {
            Card::Market(m) => m.category,
            Card::Profile(p) => p.category,
        }
    }

    /// Expiry of the underlying market, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &self.card {
            Card::Market(m) => Some(m.end_date),
            Card::Profile(_) => None,
        }
    }

    pub fn as_market(&self) -> Option<&MarketCard> {
        match &self.card {
            Card::Market(m) => Some(m),
            Card::Profile(_) => None,
        }
    }

    /// Check the display fields a card needs before it can be shown.
    ///
    /// Items failing this are dropped at load time, never mid-swipe.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.id.is_empty() {
            return Err(ItemError::MissingField {
                item: self.id.clone(),
                field: "id",
            });
        }

        match &self.card {
            Card::Market(m) => {
                require_text(&self.id, "title", &m.title)?;
                require_percent(&self.id, "yesOdds", m.yes_odds)?;
                require_percent(&self.id, "noOdds", m.no_odds)?;
                if m.total_pool.is_sign_negative() {
                    return Err(ItemError::InvalidValue {
                        item: self.id.clone(),
                        field: "totalPool",
                        reason: format!("negative pool {}", m.total_pool),
                    });
                }
            }
            Card::Profile(p) => {
                require_text(&self.id, "name", &p.name)?;
                require_text(&self.id, "prediction", &p.prediction)?;
                require_percent(&self.id, "confidence", p.confidence)?;
            }
        }
        Ok(())
    }
}

fn require_text(item: &ItemId, field: &'static str, value: &str) -> Result<(), ItemError> {
    if value.trim().is_empty() {
        return Err(ItemError::MissingField {
            item: item.clone(),
            field,
        });
    }
    Ok(())
}

fn require_percent(item: &ItemId, field: &'static str, value: u8) -> Result<(), ItemError> {
    if value > 100 {
        return Err(ItemError::InvalidValue {
            item: item.clone(),
            field,
            reason: format!("{value} is not a percentage"),
        });
    }
    Ok(())
}
