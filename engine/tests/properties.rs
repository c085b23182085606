use duel_engine::combat::resolve::{resolve_exposed_round, resolve_round};
use duel_engine::entity::{MAX_MOMENTUM, MIN_MOMENTUM};
use duel_engine::{Action, Dice, Entity};
use proptest::prelude::*;

fn action_strategy() -> impl Strategy<Value = Option<Action>> {
    prop_oneof![
        Just(None),
        Just(Some(Action::Reload)),
        Just(Some(Action::Shield)),
        Just(Some(Action::Attack)),
    ]
}

fn action_pair() -> impl Strategy<Value = (Option<Action>, Action)> {
    (
        action_strategy(),
        prop_oneof![
            Just(Action::Reload),
            Just(Action::Shield),
            Just(Action::Attack)
        ],
    )
}

/// Attack without ammo is refused upstream; model that by reloading instead.
fn affordable(entity: &Entity, action: Action) -> Action {
    if entity.can_afford(action) {
        action
    } else {
        Action::Reload
    }
}

proptest! {
    #[test]
    fn round_invariants_hold_for_any_sequence(
        seed in any::<u64>(),
        rounds in prop::collection::vec(action_pair(), 1..60),
    ) {
        let mut dice = Dice::from_seed(seed);
        let mut player = Entity::default();
        let mut opponent = Entity::default();

        for (player_choice, opponent_choice) in rounds {
            let opponent_action = affordable(&opponent, opponent_choice);
            let before = (player, opponent);

            let report = match player_choice {
                Some(choice) => {
                    let player_action = affordable(&player, choice);
                    resolve_round(&mut player, &mut opponent, player_action, opponent_action, &mut dice)
                }
                None => resolve_exposed_round(&mut player, &mut opponent, opponent_action, &mut dice),
            };

            for e in [&player, &opponent] {
                prop_assert!(e.momentum >= MIN_MOMENTUM && e.momentum <= MAX_MOMENTUM);
            }
            prop_assert_eq!(player.shielded, report.player_action == Some(Action::Shield));
            prop_assert_eq!(opponent.shielded, opponent_action == Action::Shield);

            if let Some(attack) = report.player_attack {
                prop_assert_eq!(player.crit_bonus, 0.0);
                prop_assert_eq!(player.shield_streak, 0);
                if opponent_action == Action::Shield {
                    prop_assert!(attack.blocked);
                    prop_assert_eq!(opponent.health, before.1.health);
                }
            }
            if let Some(attack) = report.opponent_attack {
                prop_assert!(!attack.crit);
                if report.player_action == Some(Action::Shield) {
                    prop_assert!(attack.blocked);
                    prop_assert_eq!(player.health, before.0.health);
                }
            }
            if report.is_exposed() {
                let (p0, _) = before;
                prop_assert_eq!(player.ammo, p0.ammo);
                prop_assert_eq!(player.momentum, p0.momentum);
                prop_assert_eq!(player.shield_streak, p0.shield_streak);
                prop_assert_eq!(player.crit_bonus, p0.crit_bonus);
            }

            // keep the duel going so long sequences stay meaningful
            if player.is_defeated() || opponent.is_defeated() {
                player = Entity::default();
                opponent = Entity::default();
            }
        }
    }
}
