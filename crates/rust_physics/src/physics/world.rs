//! Physics world and step pipeline
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! [`PhysicsWorld`] owns every body and runs, per fixed substep:
//! integration, spatial hash rebuild, broad phase, narrow phase through the
//! shape dispatch table, and immediate impulse resolution.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::core::config::PhysicsConfig;
use crate::foundation::math::{utils, Vec3};
use crate::physics::body::{Body, BodyHandle};
use crate::physics::collision::{
    collide_shapes, intersect_ray_shape, CollisionInfo, Ray, RaycastResult, AABB,
};
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::error::{PhysicsError, PhysicsResult};
use crate::spatial::{SpatialHash, SpatialQuery};

/// Diagnostics of the most recent [`PhysicsWorld::update`] or [`PhysicsWorld::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    /// Substeps executed
    pub substeps: u32,
    /// Length of each substep in seconds
    pub step_time: f32,
    /// Broad-phase pairs handed to the filters
    pub candidate_pairs: usize,
    /// Narrow-phase hits
    pub contacts: usize,
    /// Hits that reached velocity resolution (approaching bodies)
    pub resolved: usize,
}

impl StepStats {
    fn accumulate(&mut self, other: &StepStats) {
        self.candidate_pairs += other.candidate_pairs;
        self.contacts += other.contacts;
        self.resolved += other.resolved;
    }
}

/// Rigid-body simulation world
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: SlotMap<BodyHandle, Body>,
    // Insertion order; slot order changes once freed slots are reused
    order: Vec<BodyHandle>,
    spatial_query: Box<dyn SpatialQuery>,
    last_stats: StepStats,
}

impl PhysicsWorld {
    /// Create a world using a [`SpatialHash`] sized by `config.cell_size`
    pub fn new(config: PhysicsConfig) -> PhysicsResult<Self> {
        config.validate()?;
        let spatial_hash = SpatialHash::new(config.cell_size)?;
        Ok(Self::assemble(config, Box::new(spatial_hash)))
    }

    /// Create a world with a custom broad-phase structure
    ///
    /// `config.cell_size` is still validated but otherwise unused.
    pub fn with_spatial_query(config: PhysicsConfig, spatial_query: Box<dyn SpatialQuery>) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, spatial_query))
    }

    fn assemble(config: PhysicsConfig, mut spatial_query: Box<dyn SpatialQuery>) -> Self {
        spatial_query.clear();
        log::debug!(
            "PhysicsWorld: created (gravity {:?}, time step {}s, max {} steps, cell size {})",
            config.gravity,
            config.time_step,
            config.max_steps,
            config.cell_size
        );
        Self {
            config,
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            spatial_query,
            last_stats: StepStats::default(),
        }
    }

    /// World configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Gravity acceleration
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Replace gravity; non-finite values are ignored
    pub fn set_gravity(&mut self, gravity: Vec3) {
        if utils::is_finite(&gravity) {
            self.config.gravity = gravity;
        } else {
            log::warn!("PhysicsWorld: ignoring non-finite gravity {:?}", gravity);
        }
    }

    /// Air resistance coefficient
    pub fn air_resistance(&self) -> f32 {
        self.config.air_resistance
    }

    /// Replace the air resistance coefficient; negative or non-finite values are ignored
    pub fn set_air_resistance(&mut self, air_resistance: f32) {
        if air_resistance.is_finite() && air_resistance >= 0.0 {
            self.config.air_resistance = air_resistance;
        } else {
            log::warn!("PhysicsWorld: ignoring air resistance {}", air_resistance);
        }
    }

    /// Statistics of the last update or step
    pub fn last_step_stats(&self) -> StepStats {
        self.last_stats
    }

    // ------------------------------------------------------------------
    // Body management
    // ------------------------------------------------------------------

    /// Take ownership of a body and index it
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let aabb = *body.aabb();
        let handle = self.bodies.insert(body);
        self.order.push(handle);
        self.spatial_query.insert(handle, &aabb);
        handle
    }

    /// Remove a body, returning it if the handle was live
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.bodies.remove(handle)?;
        self.order.retain(|&stored| stored != handle);
        self.spatial_query.remove(handle);
        Some(body)
    }

    /// Borrow a body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Check if a handle refers to a live body
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Iterate every body in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.order
            .iter()
            .filter_map(|&handle| self.bodies.get(handle).map(|body| (handle, body)))
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Remove every body
    pub fn clear(&mut self) {
        log::debug!("PhysicsWorld: clearing {} bodies", self.bodies.len());
        self.bodies.clear();
        self.order.clear();
        self.spatial_query.clear();
    }

    /// Teleport a body
    pub fn set_body_position(&mut self, handle: BodyHandle, position: Vec3) -> PhysicsResult<()> {
        if !utils::is_finite(&position) {
            return Err(PhysicsError::InvalidBody(format!("position must be finite, got {position:?}")));
        }
        self.modify_body(handle, |body| body.set_position(position))
    }

    /// Overwrite a body's velocity
    pub fn set_body_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> PhysicsResult<()> {
        if !utils::is_finite(&velocity) {
            return Err(PhysicsError::InvalidBody(format!("velocity must be finite, got {velocity:?}")));
        }
        self.modify_body(handle, |body| body.set_velocity(velocity))
    }

    /// Apply a force to a body, see [`Body::apply_force`]
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) -> PhysicsResult<()> {
        self.modify_body(handle, |body| body.apply_force(force))
    }

    /// Apply an impulse to a body, see [`Body::apply_impulse`]
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()> {
        self.modify_body(handle, |body| body.apply_impulse(impulse))
    }

    /// Run `f` on a body, then refresh its bounds and broad-phase entry
    pub fn modify_body<R>(&mut self, handle: BodyHandle, f: impl FnOnce(&mut Body) -> R) -> PhysicsResult<R> {
        let Some(body) = self.bodies.get_mut(handle) else {
            log::warn!("PhysicsWorld: stale body handle {:?}", handle);
            return Err(PhysicsError::BodyNotFound(handle));
        };

        let result = f(body);
        body.update_aabb();
        let aabb = *body.aabb();
        self.spatial_query.update(handle, &aabb);
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance the simulation by `delta_time` seconds in fixed substeps
    ///
    /// Runs `ceil(delta_time / time_step)` substeps, capped at `max_steps`.
    /// When capped, each substep grows so the full `delta_time` is still
    /// simulated. Non-positive or non-finite input does nothing.
    pub fn update(&mut self, delta_time: f32) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return;
        }

        let needed = (delta_time / self.config.time_step).ceil().max(1.0);
        let max_steps = self.config.max_steps.max(1);
        let steps = if needed > max_steps as f32 {
            log::debug!(
                "PhysicsWorld: {}s needs {} steps, clamped to {}",
                delta_time,
                needed,
                max_steps
            );
            max_steps
        } else {
            needed as u32
        };
        let step_time = delta_time / steps as f32;

        let mut stats = StepStats {
            substeps: steps,
            step_time,
            ..StepStats::default()
        };
        for _ in 0..steps {
            let substep = self.substep(step_time);
            stats.accumulate(&substep);
        }
        self.last_stats = stats;
    }

    /// Run exactly one substep of `step_time` seconds
    pub fn step(&mut self, step_time: f32) {
        if !step_time.is_finite() || step_time <= 0.0 {
            return;
        }
        self.last_stats = self.substep(step_time);
    }

    fn substep(&mut self, dt: f32) -> StepStats {
        self.integrate(dt);
        self.rebuild_spatial_index();

        let pairs = self.broad_phase();
        let mut stats = StepStats {
            substeps: 1,
            step_time: dt,
            candidate_pairs: pairs.len(),
            ..StepStats::default()
        };

        for (a, b) in pairs {
            let Some(info) = self.narrow_phase(a, b) else {
                continue;
            };
            stats.contacts += 1;
            if self.resolve(&info) {
                stats.resolved += 1;
            }
        }

        log::trace!(
            "PhysicsWorld: substep {}s, {} candidates, {} contacts, {} resolved",
            dt,
            stats.candidate_pairs,
            stats.contacts,
            stats.resolved
        );
        stats
    }

    /// Apply gravity and drag, then move every non-static body
    fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        let air_resistance = self.config.air_resistance;

        for (_, body) in self.bodies.iter_mut() {
            if body.is_static() {
                continue;
            }

            if body.is_dynamic() {
                let mut velocity = body.velocity();
                if body.affected_by_gravity() {
                    velocity += gravity * dt;
                }
                if body.affected_by_air_resistance() {
                    velocity = apply_drag(velocity, air_resistance, dt);
                }
                body.set_velocity(velocity);
            }

            body.translate(body.velocity() * dt);
        }
    }

    fn rebuild_spatial_index(&mut self) {
        self.spatial_query.clear();
        for (handle, body) in &self.bodies {
            self.spatial_query.insert(handle, body.aabb());
        }
    }

    /// Unordered candidate pairs, each listed once as (earlier, later) in insertion order
    fn broad_phase(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let order: HashMap<BodyHandle, usize> = self
            .order
            .iter()
            .copied()
            .enumerate()
            .map(|(index, handle)| (handle, index))
            .collect();

        let mut pairs = Vec::new();
        for (index, &handle) in self.order.iter().enumerate() {
            let mut later: Vec<(usize, BodyHandle)> = self
                .spatial_query
                .query_nearby(handle)
                .into_iter()
                .filter_map(|other| order.get(&other).map(|&i| (i, other)))
                .filter(|&(i, _)| i > index)
                .collect();
            later.sort_unstable_by_key(|&(i, _)| i);
            pairs.extend(later.into_iter().map(|(_, other)| (handle, other)));
        }
        pairs
    }

    /// Filter a candidate pair and run the shape test on it
    fn narrow_phase(&self, a: BodyHandle, b: BodyHandle) -> Option<CollisionInfo> {
        let body_a = self.bodies.get(a)?;
        let body_b = self.bodies.get(b)?;

        if !body_a.collision_group().can_collide_with(&body_b.collision_group()) {
            return None;
        }
        if body_a.is_immovable() && body_b.is_immovable() {
            return None;
        }
        if !body_a.aabb().intersects(body_b.aabb()) {
            return None;
        }

        collide_shapes(body_a.shape(), body_a.position(), body_b.shape(), body_b.position())
            .map(|contact| CollisionInfo::new(a, b, contact))
    }

    /// Separate and bounce a colliding pair; returns whether an impulse was applied
    ///
    /// Both bodies are re-indexed afterwards so region queries see the
    /// corrected positions.
    fn resolve(&mut self, info: &CollisionInfo) -> bool {
        let Some([body_a, body_b]) = self.bodies.get_disjoint_mut([info.body_a, info.body_b]) else {
            return false;
        };
        let moved_a = body_a.position();
        let moved_b = body_b.position();
        let applied = resolve_collision(body_a, body_b, info);

        if body_a.position() != moved_a {
            self.spatial_query.update(info.body_a, body_a.aabb());
        }
        if body_b.position() != moved_b {
            self.spatial_query.update(info.body_b, body_b.aabb());
        }
        applied
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Nearest body hit by a ray within `max_distance`
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastResult> {
        self.raycast_filtered(origin, direction, max_distance, CollisionLayers::ALL, None)
    }

    /// Nearest hit among bodies whose group id intersects `mask`, skipping `ignore`
    ///
    /// Weapons pass their shooter as `ignore` so the ray does not start
    /// inside it.
    pub fn raycast_filtered(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: CollisionLayers,
        ignore: Option<BodyHandle>,
    ) -> Option<RaycastResult> {
        if max_distance.is_nan() || max_distance < 0.0 || !utils::is_finite(&origin) {
            return None;
        }
        let ray = Ray::new(origin, direction)?;

        let mut nearest: Option<RaycastResult> = None;
        for (handle, body) in self.bodies() {
            if Some(handle) == ignore || !mask.intersects(body.collision_group().id) {
                continue;
            }
            let limit = nearest.map_or(max_distance, |hit| hit.distance);
            let Some(hit) = intersect_ray_shape(&ray, body.shape(), body.position(), limit) else {
                continue;
            };
            if nearest.map_or(true, |best| hit.distance < best.distance) {
                nearest = Some(RaycastResult {
                    body: handle,
                    owner: body.owner(),
                    point: hit.point,
                    normal: hit.normal,
                    distance: hit.distance,
                });
            }
        }
        nearest
    }

    /// Bodies whose AABB overlaps `region`
    pub fn query_region(&self, region: &AABB) -> Vec<BodyHandle> {
        self.spatial_query
            .query_aabb(region)
            .into_iter()
            .filter(|&handle| self.bodies.get(handle).is_some_and(|body| body.aabb().intersects(region)))
            .collect()
    }

    /// Bodies whose AABB comes within `radius` of `position`
    pub fn bodies_in_radius(&self, position: Vec3, radius: f32) -> Vec<BodyHandle> {
        self.spatial_query
            .query_sphere(position, radius)
            .into_iter()
            .filter(|&handle| self.bodies.contains_key(handle))
            .collect()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::assemble(PhysicsConfig::default(), Box::new(SpatialHash::default()))
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("indexed", &self.spatial_query.body_count())
            .field("last_stats", &self.last_stats)
            .finish()
    }
}

/// Quadratic drag opposing motion; never reverses the velocity
fn apply_drag(velocity: Vec3, air_resistance: f32, dt: f32) -> Vec3 {
    let speed = velocity.magnitude();
    if speed <= 0.0 {
        return velocity;
    }

    let drag = air_resistance * speed * speed * dt;
    if drag >= speed {
        Vec3::zeros()
    } else {
        velocity - velocity / speed * drag
    }
}

/// Positional correction plus restitution impulse along the contact normal
fn resolve_collision(body_a: &mut Body, body_b: &mut Body, info: &CollisionInfo) -> bool {
    let dynamic_a = body_a.is_dynamic();
    let dynamic_b = body_b.is_dynamic();
    let normal = info.normal;

    match (dynamic_a, dynamic_b) {
        (false, false) => return false,
        (true, true) => {
            let half = info.penetration * 0.5;
            body_a.translate(-normal * half);
            body_b.translate(normal * half);
        }
        (true, false) => body_a.translate(-normal * info.penetration),
        (false, true) => body_b.translate(normal * info.penetration),
    }

    let approach = (body_b.velocity() - body_a.velocity()).dot(&normal);
    if approach > 0.0 {
        return false;
    }

    let inv_mass_a = body_a.inverse_mass();
    let inv_mass_b = body_b.inverse_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum <= 0.0 {
        return false;
    }

    let restitution = body_a.restitution().min(body_b.restitution());
    let impulse = -(1.0 + restitution) * approach / inv_mass_sum;

    body_a.set_velocity(body_a.velocity() - normal * impulse * inv_mass_a);
    body_b.set_velocity(body_b.velocity() + normal * impulse * inv_mass_b);
    true
}
