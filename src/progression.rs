use serde::Serialize;

use crate::config::VolumeScope;
use crate::domain::EnrichedEntry;
use crate::error::GymError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub name: String,
    pub ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionState {
    pub lifetime_volume: f64,
    pub tier_name: String,
    pub tier_index: usize,
    pub tier_floor: f64,
    pub tier_ceiling: f64,
    pub progress_pct: u8,
    pub next_tier: Option<String>,
}

impl TierTable {
    pub fn new(tiers: Vec<Tier>) -> Result<Self, GymError> {
        if tiers.is_empty() {
            return Err(GymError::InvalidConfig("tier table is empty".to_string()));
        }
        let mut previous = 0.0;
        for tier in &tiers {
            if tier.name.trim().is_empty() {
                return Err(GymError::InvalidConfig("tier name is empty".to_string()));
            }
            if !tier.ceiling.is_finite() || tier.ceiling <= previous {
                return Err(GymError::InvalidConfig(format!(
                    "tier {} ceiling {} must be above {previous}",
                    tier.name, tier.ceiling
                )));
            }
            previous = tier.ceiling;
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn floor(&self, index: usize) -> f64 {
        match index {
            0 => 0.0,
            _ => self.tiers[index - 1].ceiling,
        }
    }

    /// Boundaries use a strict `<` against the ceiling, so a volume sitting
    /// exactly on a boundary belongs to the higher tier.
    pub fn classify(&self, lifetime_volume: f64) -> ProgressionState {
        let volume = if lifetime_volume.is_finite() {
            lifetime_volume.max(0.0)
        } else {
            0.0
        };
        let last = self.tiers.len() - 1;
        let index = self
            .tiers
            .iter()
            .position(|tier| volume < tier.ceiling)
            .unwrap_or(last);
        let tier = &self.tiers[index];
        let pct = (100.0 * volume / tier.ceiling).floor().clamp(0.0, 100.0);

        ProgressionState {
            lifetime_volume: volume,
            tier_name: tier.name.clone(),
            tier_index: index,
            tier_floor: self.floor(index),
            tier_ceiling: tier.ceiling,
            progress_pct: pct as u8,
            next_tier: self.tiers.get(index + 1).map(|next| next.name.clone()),
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let tiers = [
            ("Beginner", 2_000.0),
            ("Developing", 10_000.0),
            ("Intermediate", 50_000.0),
            ("Advanced", 100_000.0),
            ("Elite", 500_000.0),
            ("Legendary", 1_000_000.0),
        ]
        .into_iter()
        .map(|(name, ceiling)| Tier {
            name: name.to_string(),
            ceiling,
        })
        .collect();
        Self { tiers }
    }
}

pub fn lifetime_volume(entries: &[EnrichedEntry], scope: VolumeScope) -> f64 {
    entries
        .iter()
        .filter(|entry| scope == VolumeScope::All || !entry.is_cardio)
        .map(EnrichedEntry::load)
        .sum()
}

pub fn evaluate(entries: &[EnrichedEntry], scope: VolumeScope, table: &TierTable) -> ProgressionState {
    table.classify(lifetime_volume(entries, scope))
}
