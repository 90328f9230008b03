use petling::clock::{apply_decay_tick, DecayConfig, ManualClock, StatClock, TimeSource};
use petling::evolution::{
    check_requirements, current_stage, evolve, next_stage, progress_fraction, stage,
    EvolutionProgress, StageId, STAGES,
};
use petling::expression::Expression;
use petling::model::{PetRecord, Stats};

fn pet(level: u8, happiness: f32, energy: f32, hunger: f32) -> PetRecord {
    PetRecord::new("Pip", 0).with_stats(Stats {
        happiness,
        hunger,
        energy,
        level,
    })
}

#[test]
fn scenario_teen_requirements_met_and_evolves() {
    let p = pet(5, 40.0, 30.0, 25.0);
    let teen = stage(StageId::Teen);
    assert_eq!(teen.required_level, 5);
    assert_eq!(teen.required_stats.happiness, 30.0);
    assert_eq!(teen.required_stats.energy, 25.0);
    assert_eq!(teen.required_stats.health, 20.0);

    let req = check_requirements(&p, teen);
    assert!(req.can_evolve);
    assert_eq!(req.health.actual, 75.0);

    let progress = EvolutionProgress::starting_at(StageId::Child, &p, 0);
    let out = evolve(&p, &progress, 1_000);
    let event = out.event.expect("should evolve");
    assert_eq!(event.from_stage_id, Some(StageId::Child));
    assert_eq!(event.to_stage_id, StageId::Teen);
    assert_eq!(event.level_at_transition, 5);
    assert_eq!(out.progress.current_stage_id(), StageId::Teen);
    assert_eq!(out.progress.history().len(), progress.history().len() + 1);
    assert_eq!(out.pet.stats.happiness, 50.0);
    assert_eq!(out.pet.stats.energy, 35.0);
    assert_eq!(out.pet.stats.hunger, 20.0);
}

#[test]
fn any_single_unmet_dimension_blocks_evolution() {
    // child needs level 3, happiness 20, energy 15, health 15
    let ready = pet(3, 20.0, 15.0, 85.0);
    let progress = EvolutionProgress::new(&ready, 0);
    assert!(evolve(&ready, &progress, 0).event.is_some());

    let blockers = [
        pet(2, 20.0, 15.0, 85.0),
        pet(3, 19.9, 15.0, 85.0),
        pet(3, 20.0, 14.9, 85.0),
        pet(3, 20.0, 15.0, 85.1),
    ];
    for p in blockers {
        let out = evolve(&p, &progress, 0);
        assert!(out.event.is_none(), "{:?} should not evolve", p.stats);
        assert_eq!(out.pet, p);
        assert_eq!(out.progress, progress);
    }
}

#[test]
fn full_climb_to_elder_then_terminal() {
    let mut p = pet(10, 100.0, 100.0, 0.0);
    let mut progress = EvolutionProgress::new(&p, 0);
    for (i, expected) in STAGES.iter().skip(1).enumerate() {
        let out = evolve(&p, &progress, i as i64 + 1);
        assert_eq!(out.event.map(|e| e.to_stage_id), Some(expected.id));
        p = out.pet;
        progress = out.progress;
    }

    assert_eq!(current_stage(&progress).id, StageId::Elder);
    assert!(next_stage(&progress).is_none());
    assert_eq!(progress.history().len(), STAGES.len());
    assert_eq!(progress.history()[0].from_stage_id, None);

    let starved = pet(1, 0.0, 0.0, 100.0);
    for subject in [&p, &starved] {
        assert_eq!(progress_fraction(subject, &progress), 100);
        let out = evolve(subject, &progress, 99);
        assert!(out.event.is_none());
        assert_eq!(out.progress, progress);
    }
}

#[test]
fn evolve_is_deterministic() {
    let p = pet(3, 50.0, 50.0, 10.0);
    let progress = EvolutionProgress::new(&p, 0);
    assert_eq!(evolve(&p, &progress, 7), evolve(&p, &progress, 7));
}

#[test]
fn decay_below_minimum_leaves_record_untouched() {
    let config = DecayConfig::default();
    let p = pet(4, 60.0, 60.0, 40.0);
    let too_soon = p.last_update_ms + config.minimum_elapsed_ms as i64 - 1;
    assert!(apply_decay_tick(&p, &config, too_soon).is_none());
}

#[test]
fn decay_drives_pet_toward_tired_and_sad() {
    let clock = ManualClock::new(0);
    let mut stat_clock = StatClock::new(DecayConfig::default());
    stat_clock.start(clock.now_ms());

    let mut p = pet(2, 70.0, 70.0, 10.0);
    clock.advance(24 * 60 * 60_000);
    let mut seen = None;
    assert!(stat_clock.tick(&p, clock.now_ms(), |next| seen = Some(next)));
    p = seen.expect("tick delivered a record");

    assert_eq!(p.stats.happiness, 0.0);
    assert_eq!(p.stats.hunger, 100.0);
    assert_eq!(p.stats.energy, 0.0);
    assert_eq!(p.expression(), Expression::Tired);
}
