//! Arena demo: players, terrain and projectiles in a headless physics world
//!
//! Usage: `arena_demo [config.toml|config.ron]`

use std::collections::HashMap;

use rand::prelude::*;
use rust_physics::foundation::logging;
use rust_physics::prelude::*;

// Arena configuration
const ARENA_HALF_WIDTH: f32 = 20.0;
const PLAYER_COUNT: usize = 4;
const PLAYER_RADIUS: f32 = 0.5;
const PROJECTILE_RADIUS: f32 = 0.1;
const PROJECTILE_SPEED: f32 = 25.0;
const PROJECTILE_LIFETIME: f32 = 1.5; // Seconds before a projectile despawns
const HITSCAN_RANGE: f32 = 100.0;
const HITSCAN_DAMAGE: i32 = 25;
const FIRE_INTERVAL: f32 = 0.5; // Seconds between volleys
const FRAME_TIME: f32 = 1.0 / 60.0;
const RUN_SECONDS: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorKind {
    Player,
    Terrain,
    Projectile,
}

#[derive(Debug)]
struct Actor {
    name: String,
    kind: ActorKind,
    body: BodyHandle,
    health: i32,
    age: f32,
}

/// Game-side lookup from owner handles back to actors
struct Arena {
    world: PhysicsWorld,
    actors: HashMap<OwnerHandle, Actor>,
    next_owner: u64,
    rng: StdRng,
}

impl Arena {
    fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        Ok(Self {
            world: PhysicsWorld::new(config)?,
            actors: HashMap::new(),
            next_owner: 1,
            rng: StdRng::seed_from_u64(7),
        })
    }

    fn spawn(&mut self, name: impl Into<String>, kind: ActorKind, body: Body) -> OwnerHandle {
        let owner = OwnerHandle(self.next_owner);
        self.next_owner += 1;

        let body = self.world.add_body(body);
        let name = name.into();
        log::debug!("Spawned {} ({:?}) as {:?}", name, kind, owner);
        self.actors.insert(owner, Actor { name, kind, body, health: 100, age: 0.0 });
        owner
    }

    fn build_level(&mut self) -> Result<(), PhysicsError> {
        let floor = Body::cuboid(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(ARENA_HALF_WIDTH * 2.0, 1.0, ARENA_HALF_WIDTH * 2.0),
            BodyOptions::fixed().with_owner(self.next_owner),
        )?;
        self.spawn("floor", ActorKind::Terrain, floor);

        for (i, x) in [-ARENA_HALF_WIDTH, ARENA_HALF_WIDTH].into_iter().enumerate() {
            let wall = Body::cuboid(
                Vec3::new(x, 2.0, 0.0),
                Vec3::new(1.0, 4.0, ARENA_HALF_WIDTH * 2.0),
                BodyOptions::fixed().with_owner(self.next_owner),
            )?;
            self.spawn(format!("wall-{i}"), ActorKind::Terrain, wall);
        }

        // A cover block in the middle of the arena
        let cover = Body::cuboid(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 2.0, 2.0),
            BodyOptions::fixed().with_owner(self.next_owner),
        )?;
        self.spawn("cover", ActorKind::Terrain, cover);
        Ok(())
    }

    fn spawn_players(&mut self) -> Result<(), PhysicsError> {
        for i in 0..PLAYER_COUNT {
            let x = self.rng.gen_range(-ARENA_HALF_WIDTH + 2.0..ARENA_HALF_WIDTH - 2.0);
            let z = self.rng.gen_range(-ARENA_HALF_WIDTH + 2.0..ARENA_HALF_WIDTH - 2.0);
            let player = Body::sphere(
                Vec3::new(x, 3.0, z),
                PLAYER_RADIUS,
                BodyOptions::new()
                    .with_mass(80.0)
                    .with_restitution(0.1)
                    .with_collision_group(CollisionGroup::PLAYER)
                    .with_owner(self.next_owner),
            )?;
            self.spawn(format!("player-{i}"), ActorKind::Player, player);
        }
        Ok(())
    }

    fn players(&self) -> Vec<(OwnerHandle, BodyHandle)> {
        let mut players: Vec<_> = self
            .actors
            .iter()
            .filter(|(_, actor)| actor.kind == ActorKind::Player && actor.health > 0)
            .map(|(owner, actor)| (*owner, actor.body))
            .collect();
        players.sort_by_key(|(owner, _)| *owner);
        players
    }

    fn fire_projectile(&mut self, from: Vec3, direction: Vec3) -> Result<(), PhysicsError> {
        let Some(direction) = direction.try_normalize(1.0e-6) else {
            return Ok(());
        };
        let projectile = Body::sphere(
            from + direction * (PLAYER_RADIUS + PROJECTILE_RADIUS * 2.0),
            PROJECTILE_RADIUS,
            BodyOptions::new()
                .with_mass(0.05)
                .with_restitution(0.6)
                .with_gravity(false)
                .with_collision_group(CollisionGroup::PROJECTILE)
                .with_velocity(direction * PROJECTILE_SPEED)
                .with_owner(self.next_owner),
        )?;
        self.spawn("projectile", ActorKind::Projectile, projectile);
        Ok(())
    }

    /// Every living player shoots a hitscan ray and a projectile at the next one
    fn volley(&mut self) -> Result<(), PhysicsError> {
        let players = self.players();
        if players.len() < 2 {
            return Ok(());
        }

        for (i, &(shooter_owner, shooter)) in players.iter().enumerate() {
            let (_, target) = players[(i + 1) % players.len()];
            let (Some(from), Some(to)) = (
                self.world.body(shooter).map(Body::position),
                self.world.body(target).map(Body::position),
            ) else {
                continue;
            };

            let mask = CollisionLayers::PLAYER | CollisionLayers::TERRAIN;
            if let Some(hit) = self.world.raycast_filtered(from, to - from, HITSCAN_RANGE, mask, Some(shooter)) {
                self.apply_hit(shooter_owner, hit);
            }
            self.fire_projectile(from, to - from)?;
        }
        Ok(())
    }

    fn apply_hit(&mut self, shooter: OwnerHandle, hit: RaycastResult) {
        let shooter_name = self.actors.get(&shooter).map_or("?", |a| a.name.as_str()).to_string();
        let Some(actor) = hit.owner.and_then(|owner| self.actors.get_mut(&owner)) else {
            log::warn!("{} hit a body with no owner at {:?}", shooter_name, hit.point);
            return;
        };

        match actor.kind {
            ActorKind::Player => {
                actor.health -= HITSCAN_DAMAGE;
                log::info!(
                    "{} hit {} at distance {:.2} (health {})",
                    shooter_name,
                    actor.name,
                    hit.distance,
                    actor.health
                );
            }
            _ => log::info!("{} hit {} at {:?}", shooter_name, actor.name, hit.point),
        }
    }

    fn expire_projectiles(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for (owner, actor) in &mut self.actors {
            actor.age += dt;
            let out_of_bounds = self
                .world
                .body(actor.body)
                .map_or(true, |body| body.position().magnitude() > ARENA_HALF_WIDTH * 4.0);
            if actor.kind == ActorKind::Projectile && (actor.age > PROJECTILE_LIFETIME || out_of_bounds) {
                expired.push(*owner);
            }
        }

        for owner in expired {
            if let Some(actor) = self.actors.remove(&owner) {
                self.world.remove_body(actor.body);
            }
        }
    }

    fn remove_dead_players(&mut self) {
        let dead: Vec<OwnerHandle> = self
            .actors
            .iter()
            .filter(|(_, actor)| actor.kind == ActorKind::Player && actor.health <= 0)
            .map(|(owner, _)| *owner)
            .collect();

        for owner in dead {
            if let Some(actor) = self.actors.remove(&owner) {
                log::info!("{} is out", actor.name);
                self.world.remove_body(actor.body);
            }
        }
    }
}

fn load_config() -> Result<PhysicsConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = PhysicsConfig::load_from_file(&path)?;
            config.validate()?;
            log::info!("Loaded physics config from {}", path);
            Ok(config)
        }
        None => Ok(PhysicsConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default_filter("info");

    let config = load_config()?;
    let mut arena = Arena::new(config)?;
    arena.build_level()?;
    arena.spawn_players()?;
    log::info!("Arena ready with {} bodies", arena.world.body_count());

    let mut elapsed = 0.0;
    let mut next_volley = FIRE_INTERVAL;
    let mut total_contacts = 0;

    while elapsed < RUN_SECONDS {
        arena.world.update(FRAME_TIME);
        elapsed += FRAME_TIME;
        total_contacts += arena.world.last_step_stats().contacts;

        if elapsed >= next_volley {
            arena.volley()?;
            next_volley += FIRE_INTERVAL;
        }

        arena.expire_projectiles(FRAME_TIME);
        arena.remove_dead_players();
    }

    for (owner, body) in arena.players() {
        if let (Some(actor), Some(body)) = (arena.actors.get(&owner), arena.world.body(body)) {
            log::info!(
                "{} ends at {:?} with health {}",
                actor.name,
                body.position(),
                actor.health
            );
        }
    }

    let nearby = arena.world.bodies_in_radius(Vec3::zeros(), 5.0);
    log::info!(
        "Finished after {:.1}s: {} bodies, {} contacts, {} bodies near the center",
        elapsed,
        arena.world.body_count(),
        total_contacts,
        nearby.len()
    );
    Ok(())
}
