use crate::charity::bonus::BonusMultiplier;
use crate::error::EngineResult;
use crate::participant::ParticipantCollection;
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// One recorded fundraising period for one participant. The multiplier
/// in force at recording time is stamped onto the entry, so a later
/// sports-zone change never rescales history.
#[derive(Debug, Clone, Serialize)]
pub struct DonationEntry {
    pub participant_id: u32,
    pub amount_pence: u64,
    pub multiplier: BonusMultiplier,
    pub period_end: NaiveDate,
}

impl DonationEntry {
    pub fn effective_pence(&self) -> u64 {
        self.multiplier.apply(self.amount_pence)
    }
}

/// Append-only log of donation periods across the whole charity ladder.
#[derive(Debug, Clone, Default)]
pub struct DonationLog {
    entries: Vec<DonationEntry>,
}

impl DonationLog {
    pub fn new() -> Self {
        DonationLog {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[DonationEntry] {
        &self.entries
    }

    pub fn entries_for(&self, participant_id: u32) -> Vec<&DonationEntry> {
        self.entries
            .iter()
            .filter(|e| e.participant_id == participant_id)
            .collect()
    }

    /// Most recent period end seen in the log.
    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.entries.iter().map(|e| e.period_end).max()
    }

    pub fn period_count(&self) -> usize {
        let mut periods: Vec<NaiveDate> = self.entries.iter().map(|e| e.period_end).collect();
        periods.sort_unstable();
        periods.dedup();
        periods.len()
    }

    /// Entries with the latest period removed, for the trend comparison
    /// against the previous charity snapshot.
    pub fn without_latest_period(&self) -> Vec<&DonationEntry> {
        match self.latest_period() {
            Some(latest) => self
                .entries
                .iter()
                .filter(|e| e.period_end != latest)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Appends a fundraising period total for a participant, stamping the
/// supplied multiplier (the one in force right now, from the bonus
/// coupling engine).
pub fn record_donation_period(
    log: &mut DonationLog,
    registry: &ParticipantCollection,
    participant_id: u32,
    amount_pence: u64,
    period_end: NaiveDate,
    multiplier: BonusMultiplier,
) -> EngineResult<DonationEntry> {
    registry.get(participant_id)?;

    let entry = DonationEntry {
        participant_id,
        amount_pence,
        multiplier,
        period_end,
    };

    debug!(
        "donation recorded: participant {} raised {}p (x{:.2}) for period ending {}",
        participant_id,
        amount_pence,
        multiplier.as_f32(),
        period_end
    );

    log.entries.push(entry.clone());

    Ok(entry)
}
