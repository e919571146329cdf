//! Per-lot slot accounting
//!
//! The ledger holds one bounded counter per configured lot. Slots are taken
//! when a session opens and given back when it closes; both operations are
//! checked so the counter can never leave `0..=capacity`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::models::LotId;

/// Default campus layout: five lots of 50 slots
pub const DEFAULT_LOTS: &[(&str, u32)] = &[("A", 50), ("B", 50), ("C", 50), ("D", 50), ("Visitor", 50)];

/// Slot counters for one lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSlots {
    /// Configured number of slots
    pub capacity: u32,
    /// Slots currently free
    pub available: u32,
}

impl LotSlots {
    fn occupied(&self) -> u32 {
        self.capacity - self.available
    }
}

/// Available-slot counters for every configured lot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLedger {
    lots: BTreeMap<LotId, LotSlots>,
}

impl CapacityLedger {
    /// Build a ledger with every lot empty
    ///
    /// Fails on an empty lot id, a lot configured twice, or no lots at all.
    pub fn new<I, S>(lots: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<LotId>,
    {
        let mut table = BTreeMap::new();

        for (lot, capacity) in lots {
            let lot = lot.into();
            if lot.trim().is_empty() {
                return Err(Error::config("Lot id cannot be empty"));
            }
            let slots = LotSlots {
                capacity,
                available: capacity,
            };
            if table.insert(lot.clone(), slots).is_some() {
                return Err(Error::config(format!("Lot '{}' is configured twice", lot)));
            }
        }

        if table.is_empty() {
            return Err(Error::config("At least one parking lot must be configured"));
        }

        debug!(lots = table.len(), "Capacity ledger initialized");
        Ok(Self { lots: table })
    }

    fn slots(&self, lot: &str) -> Result<&LotSlots> {
        self.lots.get(lot).ok_or_else(|| Error::unknown_lot(lot))
    }

    fn slots_mut(&mut self, lot: &str) -> Result<&mut LotSlots> {
        self.lots.get_mut(lot).ok_or_else(|| Error::unknown_lot(lot))
    }

    /// Take a slot if one is free
    ///
    /// Returns `Ok(false)` without touching the counter when the lot is full.
    pub fn try_acquire(&mut self, lot: &str) -> Result<bool> {
        let slots = self.slots_mut(lot)?;
        if slots.available == 0 {
            trace!(lot, "Lot full");
            return Ok(false);
        }
        slots.available -= 1;
        trace!(lot, available = slots.available, "Slot acquired");
        Ok(true)
    }

    /// Give a slot back
    ///
    /// Releasing into a lot that is already fully available is a double
    /// release and fails with [`Error::CapacityOverflow`].
    pub fn release(&mut self, lot: &str) -> Result<()> {
        let slots = self.slots_mut(lot)?;
        if slots.available >= slots.capacity {
            return Err(Error::CapacityOverflow {
                lot: lot.to_string(),
                capacity: slots.capacity,
            });
        }
        slots.available += 1;
        trace!(lot, available = slots.available, "Slot released");
        Ok(())
    }

    /// Free slots in a lot
    pub fn available(&self, lot: &str) -> Result<u32> {
        self.slots(lot).map(|s| s.available)
    }

    /// Configured slots in a lot
    pub fn capacity(&self, lot: &str) -> Result<u32> {
        self.slots(lot).map(|s| s.capacity)
    }

    /// Taken slots in a lot
    pub fn occupied(&self, lot: &str) -> Result<u32> {
        self.slots(lot).map(LotSlots::occupied)
    }

    /// Whether the lot is configured
    pub fn contains(&self, lot: &str) -> bool {
        self.lots.contains_key(lot)
    }

    /// Configured lot ids in sorted order
    pub fn lot_ids(&self) -> impl Iterator<Item = &LotId> {
        self.lots.keys()
    }

    /// Available slots per lot
    pub fn snapshot(&self) -> BTreeMap<LotId, u32> {
        self.lots
            .iter()
            .map(|(lot, slots)| (lot.clone(), slots.available))
            .collect()
    }

    /// Full counters per lot
    pub fn slots_snapshot(&self) -> BTreeMap<LotId, LotSlots> {
        self.lots.clone()
    }
}

impl Default for CapacityLedger {
    fn default() -> Self {
        Self {
            lots: DEFAULT_LOTS
                .iter()
                .map(|(lot, capacity)| {
                    (
                        lot.to_string(),
                        LotSlots {
                            capacity: *capacity,
                            available: *capacity,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(capacity: u32) -> CapacityLedger {
        CapacityLedger::new([("A", capacity)]).unwrap()
    }

    #[test]
    fn test_acquire_until_full() {
        let mut ledger = ledger(2);

        assert!(ledger.try_acquire("A").unwrap());
        assert!(ledger.try_acquire("A").unwrap());
        assert_eq!(ledger.available("A").unwrap(), 0);

        assert!(!ledger.try_acquire("A").unwrap());
        assert_eq!(ledger.available("A").unwrap(), 0);
        assert_eq!(ledger.occupied("A").unwrap(), 2);
    }

    #[test]
    fn test_acquire_release_round_trip() {
        let mut ledger = ledger(3);
        let before = ledger.available("A").unwrap();

        assert!(ledger.try_acquire("A").unwrap());
        ledger.release("A").unwrap();

        assert_eq!(ledger.available("A").unwrap(), before);
    }

    #[test]
    fn test_double_release_overflows() {
        let mut ledger = ledger(1);
        assert!(ledger.try_acquire("A").unwrap());
        ledger.release("A").unwrap();

        let err = ledger.release("A").unwrap_err();
        assert!(matches!(err, Error::CapacityOverflow { ref lot, capacity: 1 } if lot == "A"));
        assert_eq!(ledger.available("A").unwrap(), 1);
    }

    #[test]
    fn test_unknown_lot_is_fatal() {
        let mut ledger = ledger(1);
        assert!(matches!(ledger.try_acquire("Z"), Err(Error::UnknownLot(_))));
        assert!(matches!(ledger.release("Z"), Err(Error::UnknownLot(_))));
        assert!(matches!(ledger.available("Z"), Err(Error::UnknownLot(_))));
    }

    #[test]
    fn test_zero_capacity_lot_is_always_full() {
        let mut ledger = ledger(0);
        assert!(!ledger.try_acquire("A").unwrap());
        assert!(matches!(ledger.release("A"), Err(Error::CapacityOverflow { .. })));
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(CapacityLedger::new(Vec::<(String, u32)>::new()).is_err());
        assert!(CapacityLedger::new([("A", 1), ("A", 2)]).is_err());
        assert!(CapacityLedger::new([(" ", 1)]).is_err());
    }

    #[test]
    fn test_default_lots() {
        let ledger = CapacityLedger::default();
        let snapshot = ledger.snapshot();

        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.get("Visitor"), Some(&50));
        assert_eq!(
            ledger.lot_ids().cloned().collect::<Vec<_>>(),
            vec!["A", "B", "C", "D", "Visitor"]
        );
    }
}
