//! Subject spawn factories and lookups for the hecs world.
//!
//! The host mirrors its players and mobs into the storm world with these
//! and keeps positions and presence up to date between ticks.

use hecs::{Entity, World};

use stormfront_core::components::*;
use stormfront_core::enums::{ActivityMode, SubjectKind};
use stormfront_core::types::{Position, SubjectId};

/// Spawn an online player in survival mode with full health.
pub fn spawn_player(
    world: &mut World,
    id: SubjectId,
    position: Position,
    max_health: f64,
) -> Entity {
    world.spawn((
        Subject {
            id,
            kind: SubjectKind::Player,
        },
        position,
        Health::full(max_health),
        Presence { online: true },
        ActivityMode::Survival,
        StatusEffects::default(),
    ))
}

/// Spawn a loaded non-player entity with full health.
pub fn spawn_entity(
    world: &mut World,
    id: SubjectId,
    position: Position,
    max_health: f64,
) -> Entity {
    world.spawn((
        Subject {
            id,
            kind: SubjectKind::Entity,
        },
        position,
        Health::full(max_health),
        Presence { online: true },
    ))
}

/// Find the hecs entity carrying a subject id.
pub fn find_subject(world: &World, id: SubjectId) -> Option<Entity> {
    world
        .query::<&Subject>()
        .iter()
        .find(|(_, subject)| subject.id == id)
        .map(|(entity, _)| entity)
}

/// Move a subject. Returns false when it is not in the world.
pub fn move_subject(world: &mut World, id: SubjectId, position: Position) -> bool {
    let Some(entity) = find_subject(world, id) else {
        return false;
    };
    match world.get::<&mut Position>(entity) {
        Ok(mut pos) => {
            *pos = position;
            true
        }
        Err(_) => false,
    }
}

/// Mark a subject online or offline. Returns false when it is not in the world.
pub fn set_online(world: &mut World, id: SubjectId, online: bool) -> bool {
    let Some(entity) = find_subject(world, id) else {
        return false;
    };
    match world.get::<&mut Presence>(entity) {
        Ok(mut presence) => {
            presence.online = online;
            true
        }
        Err(_) => false,
    }
}

/// Current health of a subject.
pub fn health_of(world: &World, id: SubjectId) -> Option<Health> {
    let entity = find_subject(world, id)?;
    world.get::<&Health>(entity).ok().map(|h| *h)
}
