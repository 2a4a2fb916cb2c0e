use crate::charity::bonus::BonusMultiplier;
use crate::charity::donation::{DonationEntry, DonationLog};
use crate::error::EngineResult;
use crate::league::{Trend, ZoneAssignment, ZoneClassifier};
use crate::participant::Participant;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

/// Charity ladder row. Tier-independent: every active participant is
/// pooled into one table, ranked by effective (multiplier-adjusted)
/// fundraising for the current period.
#[derive(Debug, Clone, Serialize)]
pub struct CharityTableRow {
    pub participant_id: u32,
    pub name: String,
    pub organization: String,
    /// Raw pence raised in the latest period.
    pub raised_period_pence: u64,
    /// Period total with each entry's stamped multiplier applied.
    pub effective_period_pence: u64,
    pub raised_all_time_pence: u64,
    pub effective_all_time_pence: u64,
    pub months_active: u32,
    /// Multiplier currently in force for new donations.
    pub multiplier: BonusMultiplier,
    pub trend: Trend,
    pub position: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct CharityTable {
    pub rows: Vec<CharityTableRow>,
}

impl CharityTable {
    /// Derives the pooled charity standings from the donation log.
    /// `multipliers` carries each participant's multiplier currently in
    /// force (from the bonus coupling engine); absentees default to
    /// x1.00. Historical entries always use their own stamped value.
    pub fn compute(
        participants: &[&Participant],
        log: &DonationLog,
        multipliers: &HashMap<u32, BonusMultiplier>,
        today: NaiveDate,
    ) -> CharityTable {
        let all: Vec<&DonationEntry> = log.entries().iter().collect();
        let mut rows = Self::accumulate(participants, &all, log.latest_period(), multipliers, today);

        if log.period_count() >= 2 {
            let truncated = log.without_latest_period();
            let previous_latest = truncated.iter().map(|e| e.period_end).max();
            let previous =
                Self::accumulate(participants, &truncated, previous_latest, multipliers, today);

            let previous_positions: HashMap<u32, u16> = previous
                .iter()
                .map(|row| (row.participant_id, row.position))
                .collect();

            for row in rows.iter_mut() {
                if let Some(&prior) = previous_positions.get(&row.participant_id) {
                    row.trend = match row.position.cmp(&prior) {
                        std::cmp::Ordering::Less => Trend::Up,
                        std::cmp::Ordering::Greater => Trend::Down,
                        std::cmp::Ordering::Equal => Trend::Flat,
                    };
                }
            }
        }

        CharityTable { rows }
    }

    fn accumulate(
        participants: &[&Participant],
        entries: &[&DonationEntry],
        current_period: Option<NaiveDate>,
        multipliers: &HashMap<u32, BonusMultiplier>,
        today: NaiveDate,
    ) -> Vec<CharityTableRow> {
        let mut rows: HashMap<u32, CharityTableRow> = participants
            .iter()
            .map(|p| {
                let row = CharityTableRow {
                    participant_id: p.id,
                    name: p.name.clone(),
                    organization: p.organization.clone(),
                    raised_period_pence: 0,
                    effective_period_pence: 0,
                    raised_all_time_pence: 0,
                    effective_all_time_pence: 0,
                    months_active: p.months_active(today),
                    multiplier: multipliers.get(&p.id).copied().unwrap_or_default(),
                    trend: Trend::Flat,
                    position: 0,
                };

                (p.id, row)
            })
            .collect();

        for entry in entries {
            let Some(row) = rows.get_mut(&entry.participant_id) else {
                continue;
            };

            row.raised_all_time_pence += entry.amount_pence;
            row.effective_all_time_pence += entry.effective_pence();

            if Some(entry.period_end) == current_period {
                row.raised_period_pence += entry.amount_pence;
                row.effective_period_pence += entry.effective_pence();
            }
        }

        let mut rows: Vec<CharityTableRow> = rows
            .into_values()
            .sorted_by(|a, b| {
                b.effective_period_pence
                    .cmp(&a.effective_period_pence)
                    .then(b.effective_all_time_pence.cmp(&a.effective_all_time_pence))
                    .then(a.name.cmp(&b.name))
            })
            .collect();

        for (index, row) in rows.iter_mut().enumerate() {
            row.position = index as u16 + 1;
        }

        rows
    }

    /// The charity ladder reuses the quartile zone rules with the pool
    /// size as the tier size.
    pub fn classify(&self) -> EngineResult<Vec<ZoneAssignment>> {
        let ordered: Vec<u32> = self.rows.iter().map(|r| r.participant_id).collect();
        ZoneClassifier::classify_ordered(&ordered)
    }

    pub fn row_for(&self, participant_id: u32) -> Option<&CharityTableRow> {
        self.rows.iter().find(|r| r.participant_id == participant_id)
    }
}
