//! Fixed timestep world step
//!
//! One call advances the current level by one tick in a fixed order:
//! controller, platform resolution, entities, enemy patrol, boss, fall-out,
//! damage, camera. Contact flags written here are read by the controller on
//! the next tick.

use glam::Vec2;

use super::collision::{Contacts, check_slope, overlaps, resolve_body};
use super::events::GameEvent;
use super::input::InputSnapshot;
use super::state::{EntityKind, Level, PlatformKind, World, WorldPhase};
use crate::consts::*;
use crate::tuning::Tuning;

/// How far below a one-way top the feet may have been last tick and still land
const ONE_WAY_TOLERANCE: f32 = 1.0;
/// Stomps must land within this band below the enemy's top edge
const STOMP_BAND: f32 = 10.0;

const HARD_LANDING_SHAKE: (f32, f32) = (4.0, 100.0);
const DAMAGE_SHAKE: (f32, f32) = (8.0, 150.0);
const LAUNCH_SHAKE: (f32, f32) = (10.0, 200.0);
const BOSS_HIT_SHAKE: (f32, f32) = (15.0, 200.0);

/// Advance the world by one fixed timestep (`dt` in ms)
pub fn tick(world: &mut World, input: &InputSnapshot, tuning: &Tuning, dt: f32) {
    if world.phase != WorldPhase::Playing {
        return;
    }

    // Never step null geometry
    let Some(mut level) = world.level.take() else {
        if !world.missing_level_warned {
            log::warn!("World step skipped: no level loaded");
            world.missing_level_warned = true;
        }
        return;
    };

    world.time_ticks += 1;

    // Controller
    let prev_bottom = world.player.bounds().bottom();
    let first_event = world.events.len();
    world
        .player
        .update(input, &tuning.player, dt, &mut world.events);

    let hard_landing = world.events[first_event..].iter().any(|e| {
        matches!(e, GameEvent::Land { impact_speed, .. } if *impact_speed > tuning.player.hard_landing_speed)
    });
    if hard_landing {
        world.camera.shake(HARD_LANDING_SHAKE.0, HARD_LANDING_SHAKE.1);
    }

    let mut hurt = resolve_platforms(world, &level, prev_bottom);
    hurt |= handle_entities(world, &mut level, tuning);

    for entity in level.entities.iter_mut() {
        entity.patrol(dt);
    }

    hurt |= handle_boss(world, tuning, dt);

    let fell_out = world.player.pos.y > level.height + FALL_MARGIN;
    if fell_out || (hurt && !world.player.is_invincible()) {
        take_damage(world, tuning);
    }

    // Camera
    let player = &world.player;
    let settled = player.grounded() && !input.any_horizontal();
    world
        .camera
        .follow(player.center(), player.vel.x, &tuning.camera);
    world.camera.update_peeking(
        dt,
        settled && input.up,
        settled && input.down,
        &tuning.camera,
    );
    world.camera.update(dt, &tuning.camera);

    world.level = Some(level);
}

/// Rebuild contact flags from scratch against every platform.
///
/// Returns true if a hazard was touched.
fn resolve_platforms(world: &mut World, level: &Level, prev_bottom: f32) -> bool {
    let player = &mut world.player;
    let mut contacts = Contacts::default();
    let mut in_water = false;
    let mut hazard = false;

    for platform in &level.platforms {
        let solid = platform.bounds();
        let body = player.bounds();

        match platform.kind {
            PlatformKind::Ground => {
                if overlaps(&body, &solid) {
                    contacts |= resolve_body(&mut player.pos, &mut player.vel, player.size, &solid);
                }
            }
            PlatformKind::OneWay => {
                let from_above = prev_bottom <= solid.y + ONE_WAY_TOLERANCE;
                if overlaps(&body, &solid) && player.vel.y >= 0.0 && from_above {
                    player.pos.y = solid.y - player.size.y;
                    player.vel.y = 0.0;
                    contacts.grounded = true;
                }
            }
            PlatformKind::SlopeLeft | PlatformKind::SlopeRight => {
                let Some(dir) = platform.kind.slope_dir() else {
                    continue;
                };
                if let Some(dy) = check_slope(&body, player.vel.y, &solid, dir) {
                    player.pos.y += dy;
                    player.vel.y = 0.0;
                    contacts.grounded = true;
                }
            }
            PlatformKind::Hazard => hazard |= overlaps(&body, &solid),
            PlatformKind::Water => in_water |= overlaps(&body, &solid),
        }
    }

    player.set_contacts(contacts, in_water);
    hazard
}

/// Entity interactions, last to first so removal never skips an entry.
///
/// Returns true if an enemy hurt the player.
fn handle_entities(world: &mut World, level: &mut Level, tuning: &Tuning) -> bool {
    let mut hurt = false;

    for i in (0..level.entities.len()).rev() {
        let body = world.player.bounds();
        let entity = &mut level.entities[i];
        if !overlaps(&body, &entity.bounds()) {
            // Launchers re-arm once the player is off them
            if entity.kind == EntityKind::Launcher {
                entity.triggered = false;
            }
            continue;
        }
        let center = entity.center();
        let kind = entity.kind;

        match kind {
            EntityKind::Coin => {
                world.score += COIN_SCORE;
                world.coins += 1;
                level.entities.remove(i);
                let progress = world.progress();
                world.events.push(GameEvent::CoinCollect {
                    pos: center,
                    progress,
                });
            }
            EntityKind::Enemy => {
                let landed_on_top = world.player.fall_speed() > 0.0
                    && body.bottom() < entity.pos().y + STOMP_BAND;
                if landed_on_top {
                    world.player.vel.y = -tuning.player.stomp_bounce;
                    world.score += STOMP_SCORE;
                    level.entities.remove(i);
                    world.events.push(GameEvent::Stomp { pos: center });
                } else {
                    hurt = true;
                }
            }
            EntityKind::Launcher => {
                if !entity.triggered {
                    entity.triggered = true;
                    world.player.vel.y = -tuning.player.launcher_force;
                    world.camera.shake(LAUNCH_SHAKE.0, LAUNCH_SHAKE.1);
                    world.totems.find("hockey");
                    world.events.push(GameEvent::Launch { pos: center });
                }
            }
            EntityKind::Checkpoint => {
                if !entity.triggered {
                    entity.triggered = true;
                    world.respawn = Vec2::new(entity.x, entity.y + ENTITY_SIZE - world.player.size.y);
                    log::info!("Checkpoint reached at ({}, {})", entity.x, entity.y);
                    let progress = world.progress();
                    world.events.push(GameEvent::Checkpoint {
                        pos: center,
                        progress,
                    });
                }
            }
            EntityKind::Goal => {
                if world.phase == WorldPhase::Playing {
                    log::info!("Goal reached in \"{}\" with score {}", level.name, world.score);
                    world.phase = WorldPhase::LevelComplete;
                    world.events.push(GameEvent::GoalReached);
                }
            }
        }
    }

    hurt
}

/// Boss flight, attack hits and contact damage.
///
/// Returns true if the boss touched a player who wasn't attacking.
fn handle_boss(world: &mut World, tuning: &Tuning, dt: f32) -> bool {
    let Some(boss) = world.boss.as_mut() else {
        return false;
    };

    boss.update(dt, world.player.pos, &mut world.events);

    if !overlaps(&world.player.bounds(), &boss.bounds()) {
        return false;
    }
    if !world.player.is_attacking() {
        return true;
    }
    if !world.player.claim_attack_hit() {
        return false;
    }

    let defeated = boss.take_damage();
    let pos = boss.center();
    world.camera.shake(BOSS_HIT_SHAKE.0, BOSS_HIT_SHAKE.1);
    world.player.vel.y = -tuning.player.attack_bounce;
    world.events.push(GameEvent::BossHit {
        pos,
        health: boss.health,
    });

    if defeated {
        world.boss = None;
        world.totems.find("owl");
        world.events.push(GameEvent::BossDefeated { pos });
    }
    false
}

/// Lose one health: respawn with invincibility, or end the run at zero
fn take_damage(world: &mut World, tuning: &Tuning) {
    let player = &mut world.player;
    player.health = player.health.saturating_sub(1);
    world.camera.shake(DAMAGE_SHAKE.0, DAMAGE_SHAKE.1);
    world.events.push(GameEvent::Damage {
        health: player.health,
    });

    if player.health == 0 {
        log::info!("Game over with score {}", world.score);
        world.phase = WorldPhase::GameOver;
        world.events.push(GameEvent::GameOver);
        return;
    }

    player.respawn(world.respawn);
    player.grant_invincibility(tuning.player.invincibility);
    world.camera.snap_to(player.center());
}
