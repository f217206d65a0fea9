pub mod entry;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::DayKey;
use crate::catalog::Catalogs;
use crate::error::{Result, TrackerError};
use crate::ids::EntryId;
use crate::nutrition::Totals;

pub use entry::{Entry, EntrySource, EntryTarget, Meal, ResolvedEntry};

/// Logged entries per day, in the order they were logged.
///
/// Stored lists keep entries whose ingredient or recipe has since been deleted.
/// Every read goes through [`Entry::resolve`] and leaves those out, so they add
/// nothing and stay invisible until the user removes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayLedger {
    days: BTreeMap<DayKey, Vec<Entry>>,
}

impl DayLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to `day`. The reference itself is not checked here.
    pub fn append(&mut self, day: DayKey, entry: Entry) -> Result<()> {
        if !entry.target.has_valid_amount() {
            return Err(TrackerError::validation(
                "amount",
                "must be a finite number greater than zero",
            ));
        }
        self.days.entry(day).or_default().push(entry);
        Ok(())
    }

    /// Removes the first entry with `id`; `None` when the day has no such entry.
    pub fn remove(&mut self, day: &DayKey, id: &EntryId) -> Option<Entry> {
        let entries = self.days.get_mut(day)?;
        let position = entries.iter().position(|entry| &entry.id == id)?;
        Some(entries.remove(position))
    }

    /// Everything stored for `day`, stale entries included.
    pub fn stored_entries(&self, day: &DayKey) -> &[Entry] {
        self.days.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visible entries for `day` in logging order.
    pub fn entries_for<'a>(&'a self, day: &DayKey, catalogs: Catalogs<'a>) -> Vec<ResolvedEntry<'a>> {
        self.stored_entries(day)
            .iter()
            .filter_map(|entry| entry.resolve(catalogs))
            .collect()
    }

    pub fn totals_for(&self, day: &DayKey, catalogs: Catalogs<'_>) -> Totals {
        self.entries_for(day, catalogs)
            .iter()
            .map(|resolved| resolved.totals)
            .sum()
    }

    pub fn totals_for_meal(&self, day: &DayKey, meal: Meal, catalogs: Catalogs<'_>) -> Totals {
        self.entries_for(day, catalogs)
            .iter()
            .filter(|resolved| resolved.entry.meal == meal)
            .map(|resolved| resolved.totals)
            .sum()
    }

    /// Days that hold at least one stored entry, oldest first.
    pub fn logged_days(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.days
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(day, _)| *day)
    }

    pub fn earliest_logged_day(&self) -> Option<DayKey> {
        self.logged_days().next()
    }

    /// Every day key present, including days whose list has been emptied.
    pub fn day_keys(&self) -> impl Iterator<Item = &DayKey> {
        self.days.keys()
    }
}
