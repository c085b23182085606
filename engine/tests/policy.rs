use duel_engine::policy::{choose_action, matching_rule, OPPONENT_RULES};
use duel_engine::{Action, Dice, Entity};

fn entity(ammo: u32, health: i32) -> Entity {
    Entity {
        ammo,
        health,
        ..Entity::default()
    }
}

fn pick(opponent: Entity, player: Entity, roll: f64) -> Action {
    let mut dice = Dice::from_scripted(vec![roll]);
    choose_action(&opponent, &player, &mut dice)
}

#[test]
fn rules_are_evaluated_in_a_fixed_order() {
    let names: Vec<&str> = OPPONENT_RULES.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        vec![
            "last_stand",
            "punish_unarmed",
            "rearm_safely",
            "press_advantage",
            "recover_ammo",
            "balanced"
        ]
    );
}

#[test]
fn last_stand_mostly_shields() {
    let opponent = entity(3, 1);
    let player = entity(1, 3);
    assert_eq!(matching_rule(&opponent, &player).name, "last_stand");
    assert_eq!(pick(opponent, player, 0.79), Action::Shield);
    assert_eq!(pick(opponent, player, 0.81), Action::Reload);
}

#[test]
fn low_health_against_unarmed_player_attacks_instead() {
    let opponent = entity(1, 1);
    let player = entity(0, 3);
    assert_eq!(matching_rule(&opponent, &player).name, "punish_unarmed");
    assert_eq!(pick(opponent, player, 0.0), Action::Attack);
}

#[test]
fn unarmed_player_is_punished_without_a_roll() {
    let mut dice = Dice::from_scripted(vec![0.0]);
    let action = choose_action(&entity(2, 3), &entity(0, 3), &mut dice);
    assert_eq!(action, Action::Attack);
    assert_eq!(dice.draws(), 0);
}

#[test]
fn both_unarmed_means_reload() {
    let mut dice = Dice::from_scripted(vec![0.99]);
    let action = choose_action(&entity(0, 3), &entity(0, 3), &mut dice);
    assert_eq!(action, Action::Reload);
    assert_eq!(dice.draws(), 0);
}

#[test]
fn stocked_opponent_presses() {
    let opponent = entity(2, 3);
    let player = entity(1, 3);
    assert_eq!(matching_rule(&opponent, &player).name, "press_advantage");
    assert_eq!(pick(opponent, player, 0.69), Action::Attack);
    assert_eq!(pick(opponent, player, 0.71), Action::Shield);
}

#[test]
fn empty_opponent_recovers() {
    let opponent = entity(0, 3);
    let player = entity(1, 3);
    assert_eq!(matching_rule(&opponent, &player).name, "recover_ammo");
    assert_eq!(pick(opponent, player, 0.69), Action::Reload);
    assert_eq!(pick(opponent, player, 0.71), Action::Shield);
}

#[test]
fn balanced_fallback_splits_three_ways() {
    let opponent = entity(1, 3);
    let player = entity(1, 3);
    assert_eq!(matching_rule(&opponent, &player).name, "balanced");
    assert_eq!(pick(opponent, player, 0.49), Action::Attack);
    assert_eq!(pick(opponent, player, 0.5), Action::Reload);
    assert_eq!(pick(opponent, player, 0.79), Action::Reload);
    assert_eq!(pick(opponent, player, 0.81), Action::Shield);
}

#[test]
fn never_shields_against_an_unarmed_player() {
    for opp_ammo in 0..4 {
        for opp_health in 1..=3 {
            for roll in [0.0, 0.25, 0.5, 0.75, 0.99] {
                let action = pick(entity(opp_ammo, opp_health), entity(0, 3), roll);
                assert_ne!(action, Action::Shield);
            }
        }
    }
}

#[test]
fn never_attacks_without_ammo() {
    for player_ammo in 0..4 {
        for opp_health in 1..=3 {
            for roll in [0.0, 0.25, 0.5, 0.75, 0.99] {
                let action = pick(entity(0, opp_health), entity(player_ammo, 3), roll);
                assert_ne!(action, Action::Attack);
            }
        }
    }
}
