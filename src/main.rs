use chrono::{Datelike, Duration};
use core::{
    BonusMultiplier, CharityTable, FixtureStatus, Zone, ZoneClassifier,
    compute_charity_multiplier, record_donation_period,
};
use database::{
    DatabaseGenerator, DatabaseLoader, DonationAmountGenerator, InMemoryStore, LeagueStore,
    ScoreGenerator,
};
use env_logger::Env;
use log::info;
use std::collections::HashMap;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let database = DatabaseLoader::load();
    let data = DatabaseGenerator::generate(&database);
    let mut store = InMemoryStore::new(data);

    run_season(&mut store)?;

    Ok(())
}

/// Plays one full demo season: schedule, weekly results, monthly
/// donation periods, final tables, zones, charity coupling, rollover.
fn run_season(store: &mut InMemoryStore) -> color_eyre::Result<()> {
    store.data.league.schedule_season(&store.data.registry)?;

    info!(
        "📅 {} fixtures scheduled",
        store.fixtures_with_status(FixtureStatus::Scheduled).len()
    );

    let data = &mut store.data;
    let season_start = data.league.settings.date_allocation.season_start;

    // Play every round in order; donation periods close monthly with the
    // multiplier each participant has earned on the pitch so far.
    let mut fixtures: Vec<(String, chrono::NaiveDateTime)> = data
        .league
        .tiers
        .iter()
        .flat_map(|t| t.schedule.items().map(|i| (i.id.clone(), i.date)))
        .collect();

    fixtures.sort_by_key(|(_, date)| *date);

    let mut last_period_month = season_start.month();
    let mut last_played = season_start;

    for (fixture_id, date) in fixtures {
        let (home_score, away_score) = ScoreGenerator::generate();
        data.league.record_result(&fixture_id, home_score, away_score)?;

        if date.date().month() != last_period_month {
            close_donation_period(data, date.date() - Duration::days(1))?;
            last_period_month = date.date().month();
        }

        last_played = date.date();
    }

    // Final period for the closing month of the season.
    close_donation_period(data, last_played)?;

    info!("⚽ all fixtures completed, season {}", data.league.season);

    for table in data.league.compute_all_tables(&data.registry) {
        let tier = data.league.tier(table.tier_id)?;
        info!("🏆 {} standings:", tier.name);

        let zones = ZoneClassifier::classify(&table)?;

        for row in &table.rows {
            let zone = zones
                .iter()
                .find(|z| z.participant_id == row.participant_id)
                .map(|z| z.zone)
                .unwrap_or(Zone::Safe);

            info!(
                "  {:>2}. {:<18} {:>2} pts (gd {:+}) form {:<5} [{:?}]",
                row.position,
                row.name,
                row.points,
                row.goal_difference,
                row.form_string(),
                zone
            );
        }
    }

    let charity_table = compute_charity_table(data)?;

    info!("💷 charity ladder:");
    for row in &charity_table.rows {
        info!(
            "  {:>2}. {:<22} £{:>9.2} this period (x{:.2}), £{:>10.2} all time",
            row.position,
            row.name,
            row.effective_period_pence as f64 / 100.0,
            row.multiplier.as_f32(),
            row.effective_all_time_pence as f64 / 100.0,
        );
    }

    let report = data.league.rollover_season(&mut data.registry)?;

    for (tier_id, champion_id) in &report.champions {
        let tier = data.league.tier(*tier_id)?;
        let champion = data.registry.get(*champion_id)?;
        info!("🥇 {} champions: {}", tier.name, champion.name);
    }

    for tier_move in &report.moves {
        let participant = data.registry.get(tier_move.participant_id)?;
        info!(
            "🔀 {} moves to tier {} ({:?})",
            participant.name, tier_move.to_tier_id, tier_move.zone
        );
    }

    Ok(())
}

/// Records one fundraising period for every active participant, each at
/// the multiplier their current sports zone earns them.
fn close_donation_period(
    data: &mut database::SimulationData,
    period_end: chrono::NaiveDate,
) -> color_eyre::Result<()> {
    let participant_ids: Vec<u32> = data
        .registry
        .participants
        .iter()
        .filter(|p| p.active)
        .map(|p| p.id)
        .collect();

    for participant_id in participant_ids {
        let multiplier = compute_charity_multiplier(participant_id, &data.league, &data.registry)?;

        record_donation_period(
            &mut data.donations,
            &data.registry,
            participant_id,
            DonationAmountGenerator::generate_pence(),
            period_end,
            multiplier,
        )?;
    }

    info!("💰 donation period closed: {}", period_end);

    Ok(())
}

fn compute_charity_table(data: &database::SimulationData) -> color_eyre::Result<CharityTable> {
    let mut multipliers: HashMap<u32, BonusMultiplier> = HashMap::new();

    for participant in &data.registry.participants {
        if participant.active {
            multipliers.insert(
                participant.id,
                compute_charity_multiplier(participant.id, &data.league, &data.registry)?,
            );
        }
    }

    let pool: Vec<&core::Participant> = data
        .registry
        .participants
        .iter()
        .filter(|p| p.active)
        .collect();

    let today = data
        .donations
        .latest_period()
        .unwrap_or(data.league.settings.date_allocation.season_start);

    Ok(CharityTable::compute(
        &pool,
        &data.donations,
        &multipliers,
        today,
    ))
}
