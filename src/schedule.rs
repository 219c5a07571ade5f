//! Schedule ordering
//!
//! The provider does not guarantee section order; the application sorts
//! before rendering.

use crate::error::{AppError, Result};
use crate::provider::ScheduleEntry;

/// Sort schedule entries ascending by numeric period.
///
/// The sort is stable: entries with equal periods keep their relative
/// input order. A period that does not parse as a number is a data
/// error, not something to silently slot into the sequence.
pub fn sort_by_period(mut entries: Vec<ScheduleEntry>) -> Result<Vec<ScheduleEntry>> {
    let mut keyed: Vec<(u32, ScheduleEntry)> = Vec::with_capacity(entries.len());
    for entry in entries.drain(..) {
        let period = entry.data.period.trim().parse::<u32>().map_err(|_| {
            AppError::Validation(format!(
                "Section {:?} has unparseable period {:?}",
                entry.data.name, entry.data.period
            ))
        })?;
        keyed.push((period, entry));
    }

    keyed.sort_by_key(|(period, _)| *period);
    Ok(keyed.into_iter().map(|(_, entry)| entry).collect())
}
