//! Damage, decoy and boss behaviour through the public API.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tacojiman::{
    circle_contains, final_score, Boss, BossConfig, BossPhase, EnemyConfig, EnemyDirector,
    EnemyType, GameEvent, TacoResult, TerrainGrid, WorldPoint,
};

/// Open 15x15 field with a path cross and a river through the house.
fn field() -> Arc<TerrainGrid> {
    let mut rows = Vec::new();
    for y in 0..15 {
        let row: String = (0..15)
            .map(|x| match (x, y) {
                (7, 7) => 'H',
                (6, _) | (_, 8) => '#',
                (8, _) | (_, 6) => '~',
                _ => '.',
            })
            .collect();
        rows.push(row);
    }
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    Arc::new(TerrainGrid::parse(&rows, 30).unwrap())
}

fn director(seed: u64) -> TacoResult<EnemyDirector> {
    EnemyDirector::new(field(), EnemyConfig::default(), 25.0, StdRng::seed_from_u64(seed))
}

#[test]
fn test_zoomed_kill_score() {
    assert_eq!(final_score(4, 2.5), 10);
}

#[test]
fn test_decoy_retarget_and_revert() -> TacoResult<()> {
    let mut director = director(1)?;
    let origin = WorldPoint::new(225.0, 100.0);
    let id = director
        .spawn_at(EnemyType::Air, origin)
        .expect("air spawns always succeed");

    director.add_decoy_target(WorldPoint::new(225.0, 180.0), 120.0, 1);
    director.add_decoy_target(WorldPoint::new(225.0, 150.0), 120.0, 2);
    assert_eq!(director.enemy(id).map(|e| e.decoy_id()), Some(Some(2)));

    director.remove_decoy_target(2);
    assert_eq!(director.enemy(id).map(|e| e.decoy_id()), Some(Some(1)));

    director.remove_decoy_target(1);
    let enemy = director.enemy(id).expect("still alive");
    assert_eq!(enemy.decoy_id(), None);
    assert_eq!(enemy.target(), WorldPoint::new(225.0, 225.0));
    Ok(())
}

#[test]
fn test_damage_never_heals() -> TacoResult<()> {
    let mut director = director(2)?;
    let point = WorldPoint::new(60.0, 60.0);
    let id = director.spawn_at(EnemyType::Water, WorldPoint::new(255.0, 15.0));
    let air = director.spawn_at(EnemyType::Air, point).expect("spawned");
    assert!(id.is_some());

    let mut last_hp = director.enemy(air).map(|e| e.current_hp()).unwrap_or(0);
    for _ in 0..3 {
        director.check_attack_hit(point, 10.0, |_| true, 1.0);
        director.update(0.0);
        let hp = director.enemy(air).map(|e| e.current_hp()).unwrap_or(0);
        assert!(hp <= last_hp);
        last_hp = hp;
    }
    assert!(director.enemy(air).is_none());
    Ok(())
}

#[test]
fn test_boss_thresholds() {
    let mut boss = Boss::new(
        BossConfig::default(),
        WorldPoint::new(195.0, 0.0),
        WorldPoint::new(225.0, 225.0),
    );
    assert!(boss.drain_events().contains(&GameEvent::BossSpawned));

    // Hits during the drop already wear down the barrier
    for _ in 0..5 {
        boss.take_damage(1, 1.0);
    }
    assert_eq!(boss.current_hits(), 5);
    boss.update(2.0);
    assert_eq!(boss.phase(), BossPhase::Barrier);

    let mut visual_hp = vec![2; 5];
    for hit in 6..=42 {
        let outcome = boss.take_damage(1, 3.0);
        visual_hp.push(boss.visual_hp());
        if hit == 9 {
            assert!(boss.has_barrier());
        }
        if hit == 10 {
            assert!(!boss.has_barrier());
            assert_eq!(boss.phase(), BossPhase::Damage);
        }
        if hit < 42 {
            assert!(!outcome.destroyed);
        } else {
            assert!(outcome.destroyed);
            assert_eq!(outcome.score, 100);
        }
    }
    assert_eq!(visual_hp[19], 2);
    assert_eq!(visual_hp[20], 1);
    assert_eq!(visual_hp[40], 1);
    assert_eq!(visual_hp[41], 0);
    assert!(boss.is_defeated());

    let events = boss.drain_events();
    assert_eq!(
        events,
        vec![
            GameEvent::BossBarrierBroken,
            GameEvent::BossHpLost { remaining: 1 },
            GameEvent::BossHpLost { remaining: 0 },
            GameEvent::BossDefeated { score: 100 },
        ]
    );
}

proptest! {
    #[test]
    fn prop_area_hit_is_exhaustive(
        offsets in prop::collection::vec((-150.0f32..150.0, -150.0f32..150.0), 1..20),
        radius in 10.0f32..120.0,
        damage in 1i32..4,
    ) {
        let mut director = director(3).unwrap();
        let center = WorldPoint::new(225.0, 225.0);
        for (dx, dy) in &offsets {
            director.spawn_at(EnemyType::Air, WorldPoint::new(center.x + dx, center.y + dy));
        }

        let inside: Vec<_> = director.enemies_in_area(center, radius).iter().map(|e| e.id()).collect();
        let outside = director.enemy_count() - inside.len();
        let expected_kills = if damage >= 2 { inside.len() } else { 0 };

        let score = director.check_area_hit(center, radius, damage, 1.0);
        prop_assert_eq!(score as usize, expected_kills * 3);
        prop_assert_eq!(director.enemy_count(), outside + inside.len() - expected_kills);

        for enemy in director.enemies() {
            let in_range = circle_contains(center, radius, enemy.position());
            if in_range {
                prop_assert!(enemy.current_hp() < enemy.max_hp());
            } else {
                prop_assert_eq!(enemy.current_hp(), enemy.max_hp());
            }
        }
    }
}
