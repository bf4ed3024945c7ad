//! World-level scenarios: stepping, resolution, filtering and ray casts

use approx::assert_relative_eq;
use proptest::prelude::*;

use crate::core::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::physics::{
    Body, BodyHandle, BodyOptions, CollisionGroup, CollisionLayers, OwnerHandle, PhysicsError, PhysicsWorld, AABB,
};

/// World without gravity or drag, so only collisions change velocities
fn quiet_world() -> PhysicsWorld {
    PhysicsWorld::new(PhysicsConfig::new().with_gravity(Vec3::zeros()).with_air_resistance(0.0)).unwrap()
}

fn free_options() -> BodyOptions {
    BodyOptions::new().with_gravity(false).with_air_resistance(false)
}

fn add_sphere(world: &mut PhysicsWorld, position: Vec3, radius: f32, options: BodyOptions) -> BodyHandle {
    world.add_body(Body::sphere(position, radius, options).unwrap())
}

fn add_box(world: &mut PhysicsWorld, position: Vec3, size: Vec3, options: BodyOptions) -> BodyHandle {
    world.add_body(Body::cuboid(position, size, options).unwrap())
}

fn normal_velocity(world: &PhysicsWorld, a: BodyHandle, b: BodyHandle, normal: Vec3) -> f32 {
    (world.body(b).unwrap().velocity() - world.body(a).unwrap().velocity()).dot(&normal)
}

#[test]
fn test_sphere_sphere_resolution_scenario() {
    let mut world = quiet_world();
    let options = free_options().with_restitution(0.0);
    let a = add_sphere(&mut world, Vec3::zeros(), 1.0, options.clone());
    let b = add_sphere(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0, options);

    world.step(1.0 / 60.0);

    let stats = world.last_step_stats();
    assert_eq!(stats.contacts, 1);

    let body_a = world.body(a).unwrap();
    let body_b = world.body(b).unwrap();
    assert_relative_eq!(body_a.position(), Vec3::new(-0.25, 0.0, 0.0), epsilon = 1e-6);
    assert_relative_eq!(body_b.position(), Vec3::new(1.75, 0.0, 0.0), epsilon = 1e-6);

    // Touching faces are allowed; no positive overlap remains
    assert!(body_a.aabb().max.x <= body_b.aabb().min.x + 1e-6);
}

#[test]
fn test_restitution_bound_head_on() {
    let mut world = quiet_world();
    let a = add_sphere(
        &mut world,
        Vec3::zeros(),
        1.0,
        free_options().with_restitution(0.5).with_velocity(Vec3::new(1.0, 0.0, 0.0)),
    );
    let b = add_sphere(
        &mut world,
        Vec3::new(1.5, 0.0, 0.0),
        1.0,
        free_options()
            .with_restitution(0.8)
            .with_mass(3.0)
            .with_velocity(Vec3::new(-1.0, 0.0, 0.0)),
    );

    let before = normal_velocity(&world, a, b, Vec3::x());
    world.step(1.0e-3);
    let after = normal_velocity(&world, a, b, Vec3::x());

    // The smaller restitution wins
    assert_relative_eq!(after, -0.5 * before, epsilon = 1e-5);
}

#[test]
fn test_static_pairs_never_move() {
    let mut world = PhysicsWorld::default();
    let a = add_box(&mut world, Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0), BodyOptions::fixed());
    let b = add_box(&mut world, Vec3::new(0.5, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0), BodyOptions::fixed());
    let c = add_sphere(&mut world, Vec3::new(0.0, 0.5, 0.0), 1.0, BodyOptions::new().with_static(true));

    world.update(0.5);

    for (handle, expected) in [(a, Vec3::zeros()), (b, Vec3::new(0.5, 0.0, 0.0)), (c, Vec3::new(0.0, 0.5, 0.0))] {
        let body = world.body(handle).unwrap();
        assert_eq!(body.position(), expected);
        assert_eq!(body.velocity(), Vec3::zeros());
    }
    assert_eq!(world.last_step_stats().contacts, 0);
}

#[test]
fn test_collision_group_filtering() {
    for projectile_first in [true, false] {
        let mut world = quiet_world();
        let projectile = free_options().with_collision_group(CollisionGroup::PROJECTILE);
        let trigger = free_options().with_collision_group(CollisionGroup::TRIGGER);
        let (first, second) = if projectile_first { (projectile, trigger) } else { (trigger, projectile) };

        let a = add_sphere(&mut world, Vec3::zeros(), 1.0, first);
        let b = add_sphere(&mut world, Vec3::zeros(), 1.0, second);

        world.step(1.0 / 60.0);

        assert_eq!(world.last_step_stats().contacts, 0);
        assert_eq!(world.body(a).unwrap().position(), Vec3::zeros());
        assert_eq!(world.body(b).unwrap().position(), Vec3::zeros());
    }
}

#[test]
fn test_free_fall_kinematics() {
    let mut world = PhysicsWorld::default();
    let body = add_sphere(&mut world, Vec3::new(0.0, 100.0, 0.0), 0.5, BodyOptions::new().with_air_resistance(false));

    world.update(1.0);

    let stats = world.last_step_stats();
    assert_eq!(stats.substeps, 10);
    assert_relative_eq!(stats.step_time, 0.1, epsilon = 1e-6);
    assert_relative_eq!(world.body(body).unwrap().velocity().y, -9.81, epsilon = 1e-4);

    // Semi-implicit Euler: sum of 10 velocity increments times 0.1
    assert_relative_eq!(world.body(body).unwrap().position().y, 100.0 - 9.81 * 0.01 * 55.0, epsilon = 1e-3);
}

#[test]
fn test_air_resistance_slows_without_reversing() {
    let mut world = PhysicsWorld::new(PhysicsConfig::new().with_gravity(Vec3::zeros()).with_air_resistance(0.5)).unwrap();
    let body = add_sphere(&mut world, Vec3::zeros(), 0.5, BodyOptions::new().with_velocity(Vec3::new(10.0, 0.0, 0.0)));

    world.step(0.1);
    // drag = 0.5 * 100 * 0.1 = 5
    assert_relative_eq!(world.body(body).unwrap().velocity().x, 5.0, epsilon = 1e-5);

    world.step(10.0);
    assert_eq!(world.body(body).unwrap().velocity(), Vec3::zeros());
}

#[test]
fn test_update_step_count_and_time_dilation() {
    let mut world = PhysicsWorld::new(PhysicsConfig::new().with_time_step(0.01).with_max_steps(5)).unwrap();

    world.update(0.035);
    let stats = world.last_step_stats();
    assert_eq!(stats.substeps, 4);
    assert_relative_eq!(stats.step_time, 0.035 / 4.0);

    // Over budget: the step count is capped and each step grows
    world.update(1.0);
    let stats = world.last_step_stats();
    assert_eq!(stats.substeps, 5);
    assert_relative_eq!(stats.step_time, 0.2);

    // Very small frames still run one step
    world.update(0.001);
    assert_eq!(world.last_step_stats().substeps, 1);

    for invalid in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        world.update(invalid);
        assert_eq!(world.last_step_stats().substeps, 1);
    }
}

#[test]
fn test_box_resting_on_static_floor() {
    let mut world = quiet_world();
    let floor = add_box(
        &mut world,
        Vec3::zeros(),
        Vec3::new(10.0, 1.0, 10.0),
        BodyOptions::fixed().with_restitution(0.0),
    );
    let crate_box = add_box(
        &mut world,
        Vec3::new(0.0, 0.9, 0.0),
        Vec3::new(1.0, 1.0, 1.0),
        free_options().with_restitution(0.0).with_velocity(Vec3::new(0.0, -1.0, 0.0)),
    );

    world.step(1.0e-3);

    let body = world.body(crate_box).unwrap();
    assert_relative_eq!(body.position().y, 1.0, epsilon = 1e-5);
    assert_relative_eq!(body.velocity().y, 0.0, epsilon = 1e-5);
    assert_eq!(world.body(floor).unwrap().position(), Vec3::zeros());
}

#[test]
fn test_sphere_bounces_off_static_box() {
    let mut world = quiet_world();
    let ball = add_sphere(
        &mut world,
        Vec3::new(0.0, 0.9, 0.0),
        0.5,
        free_options().with_restitution(1.0).with_velocity(Vec3::new(0.0, -2.0, 0.0)),
    );
    add_box(
        &mut world,
        Vec3::zeros(),
        Vec3::new(10.0, 1.0, 10.0),
        BodyOptions::fixed().with_restitution(1.0),
    );

    world.step(1.0e-3);

    let body = world.body(ball).unwrap();
    assert_relative_eq!(body.position().y, 1.0, epsilon = 1e-5);
    assert_relative_eq!(body.velocity(), Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-4);
    assert_eq!(world.last_step_stats().resolved, 1);
}

#[test]
fn test_kinematic_body_moves_but_is_not_pushed() {
    let mut world = PhysicsWorld::default();
    let mover = add_box(
        &mut world,
        Vec3::zeros(),
        Vec3::new(2.0, 2.0, 2.0),
        BodyOptions::new().with_kinematic(true).with_velocity(Vec3::new(1.0, 0.0, 0.0)),
    );
    let ball = add_sphere(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0, free_options());

    world.step(0.1);

    let kinematic = world.body(mover).unwrap();
    assert_relative_eq!(kinematic.position(), Vec3::new(0.1, 0.0, 0.0), epsilon = 1e-6);
    assert_relative_eq!(kinematic.velocity(), Vec3::new(1.0, 0.0, 0.0));
    assert!(world.body(ball).unwrap().velocity().x > 0.0);
}

#[test]
fn test_raycast_sphere_scenario() {
    let mut world = PhysicsWorld::default();
    let target = add_sphere(&mut world, Vec3::new(0.0, 0.0, 5.0), 1.0, BodyOptions::new().with_owner(OwnerHandle(7)));

    let hit = world.raycast(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0), 100.0).unwrap();
    assert_eq!(hit.body, target);
    assert_eq!(hit.owner, Some(OwnerHandle(7)));
    assert_relative_eq!(hit.distance, 4.0);
    assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, 4.0));
    assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));

    assert!(world.raycast(Vec3::zeros(), Vec3::zeros(), 100.0).is_none());
    assert!(world.raycast(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0), 3.0).is_none());
}

#[test]
fn test_raycast_returns_nearest_and_honors_filters() {
    let mut world = PhysicsWorld::default();
    let shooter = add_sphere(
        &mut world,
        Vec3::zeros(),
        0.5,
        BodyOptions::new().with_collision_group(CollisionGroup::PLAYER),
    );
    let wall = add_box(&mut world, Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 4.0, 4.0), BodyOptions::fixed());
    let item = add_sphere(
        &mut world,
        Vec3::new(5.0, 0.0, 0.0),
        0.5,
        BodyOptions::new().with_collision_group(CollisionGroup::ITEM),
    );

    let direction = Vec3::new(1.0, 0.0, 0.0);

    // Starting inside the shooter reports its exit point
    assert_eq!(world.raycast(Vec3::zeros(), direction, 100.0).unwrap().body, shooter);

    let hit = world
        .raycast_filtered(Vec3::zeros(), direction, 100.0, CollisionLayers::ALL, Some(shooter))
        .unwrap();
    assert_eq!(hit.body, item);
    assert_relative_eq!(hit.distance, 4.5);

    let mask = CollisionLayers::TERRAIN | CollisionLayers::PLAYER;
    let hit = world.raycast_filtered(Vec3::zeros(), direction, 100.0, mask, Some(shooter)).unwrap();
    assert_eq!(hit.body, wall);
    assert_relative_eq!(hit.distance, 9.5);
    assert_relative_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));

    assert!(world
        .raycast_filtered(Vec3::zeros(), direction, 100.0, CollisionLayers::NONE, None)
        .is_none());
}

#[test]
fn test_stale_handle_errors() {
    let mut world = PhysicsWorld::default();
    let handle = add_sphere(&mut world, Vec3::zeros(), 1.0, BodyOptions::new());
    assert!(world.remove_body(handle).is_some());
    assert!(world.remove_body(handle).is_none());
    assert!(world.body(handle).is_none());

    assert!(matches!(
        world.set_body_position(handle, Vec3::zeros()),
        Err(PhysicsError::BodyNotFound(h)) if h == handle
    ));
    assert!(matches!(world.set_body_velocity(handle, Vec3::zeros()), Err(PhysicsError::BodyNotFound(_))));
    assert!(matches!(world.apply_force(handle, Vec3::x()), Err(PhysicsError::BodyNotFound(_))));
    assert!(matches!(world.apply_impulse(handle, Vec3::x()), Err(PhysicsError::BodyNotFound(_))));
    assert!(matches!(world.modify_body(handle, |_| ()), Err(PhysicsError::BodyNotFound(_))));

    // A new body never reuses the stale handle
    let fresh = add_sphere(&mut world, Vec3::zeros(), 1.0, BodyOptions::new());
    assert_ne!(fresh, handle);
}

#[test]
fn test_region_queries_see_positions_after_resolution() {
    let config = PhysicsConfig::new()
        .with_gravity(Vec3::zeros())
        .with_air_resistance(0.0)
        .with_cell_size(1.0);
    let mut world = PhysicsWorld::new(config).unwrap();
    let a = add_sphere(&mut world, Vec3::zeros(), 1.0, free_options());
    let b = add_sphere(&mut world, Vec3::new(0.1, 0.0, 0.0), 1.0, free_options());

    world.step(1.0e-3);

    // Deep overlap: each sphere is pushed 0.95 out
    assert_relative_eq!(world.body(a).unwrap().position().x, -0.95, epsilon = 1e-5);
    assert_relative_eq!(world.body(b).unwrap().position().x, 1.05, epsilon = 1e-5);

    let left_edge = AABB::new(Vec3::new(-1.94, -0.1, -0.1), Vec3::new(-1.9, 0.1, 0.1));
    assert!(world.body(a).unwrap().aabb().intersects(&left_edge));
    assert_eq!(world.query_region(&left_edge), vec![a]);
    assert_eq!(world.bodies_in_radius(Vec3::new(-1.92, 0.0, 0.0), 0.01), vec![a]);

    let right_edge = AABB::new(Vec3::new(1.9, -0.1, -0.1), Vec3::new(2.0, 0.1, 0.1));
    assert_eq!(world.query_region(&right_edge), vec![b]);
}

#[test]
fn test_pair_order_follows_insertion_after_slot_reuse() {
    let mut world = quiet_world();
    let placeholder = add_sphere(&mut world, Vec3::new(50.0, 0.0, 0.0), 1.0, free_options());
    let player = add_sphere(
        &mut world,
        Vec3::zeros(),
        1.0,
        free_options().with_collision_group(CollisionGroup::PLAYER),
    );
    world.remove_body(placeholder);

    // Reuses the freed slot, which sits before the player's
    let trigger = add_sphere(
        &mut world,
        Vec3::new(0.5, 0.0, 0.0),
        1.0,
        free_options().with_collision_group(CollisionGroup::TRIGGER),
    );
    let order: Vec<BodyHandle> = world.bodies().map(|(handle, _)| handle).collect();
    assert_eq!(order, vec![player, trigger]);

    // The player is first and its mask excludes triggers
    world.step(1.0e-3);
    assert_eq!(world.last_step_stats().contacts, 0);

    // Added the other way round, the trigger's mask accepts the player
    let mut world = quiet_world();
    add_sphere(
        &mut world,
        Vec3::zeros(),
        1.0,
        free_options().with_collision_group(CollisionGroup::TRIGGER),
    );
    add_sphere(
        &mut world,
        Vec3::new(0.5, 0.0, 0.0),
        1.0,
        free_options().with_collision_group(CollisionGroup::PLAYER),
    );
    world.step(1.0e-3);
    assert_eq!(world.last_step_stats().contacts, 1);
}

#[test]
fn test_mutations_keep_broad_phase_in_sync() {
    let mut world = PhysicsWorld::default();
    let handle = add_box(&mut world, Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), BodyOptions::new());
    let origin_region = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    let far_region = AABB::new(Vec3::new(49.0, -1.0, -1.0), Vec3::new(51.0, 1.0, 1.0));

    assert_eq!(world.query_region(&origin_region), vec![handle]);

    world.set_body_position(handle, Vec3::new(50.0, 0.0, 0.0)).unwrap();
    assert!(world.query_region(&origin_region).is_empty());
    assert_eq!(world.query_region(&far_region), vec![handle]);
    assert_eq!(world.bodies_in_radius(Vec3::new(52.0, 0.0, 0.0), 2.0), vec![handle]);
    assert!(world.bodies_in_radius(Vec3::new(60.0, 0.0, 0.0), 2.0).is_empty());

    let mass = world.modify_body(handle, |body| {
        body.translate(Vec3::new(-50.0, 0.0, 0.0));
        body.mass()
    });
    assert_relative_eq!(mass.unwrap(), 1.0);
    assert_eq!(world.query_region(&origin_region), vec![handle]);

    assert!(world.set_body_position(handle, Vec3::new(f32::NAN, 0.0, 0.0)).is_err());
}

#[test]
fn test_forces_through_world() {
    let mut world = PhysicsWorld::default();
    let handle = add_sphere(&mut world, Vec3::zeros(), 1.0, BodyOptions::new().with_mass(2.0));
    world.apply_force(handle, Vec3::new(4.0, 0.0, 0.0)).unwrap();
    world.apply_impulse(handle, Vec3::new(0.0, 0.0, 2.0)).unwrap();
    assert_relative_eq!(world.body(handle).unwrap().velocity(), Vec3::new(2.0, 0.0, 1.0));

    world.set_body_velocity(handle, Vec3::zeros()).unwrap();
    assert_eq!(world.body(handle).unwrap().velocity(), Vec3::zeros());
}

#[test]
fn test_settings_and_clear() {
    let mut world = PhysicsWorld::default();
    assert_relative_eq!(world.gravity(), Vec3::new(0.0, -9.81, 0.0));
    assert_relative_eq!(world.air_resistance(), 0.01);

    world.set_gravity(Vec3::new(0.0, -1.0, 0.0));
    world.set_gravity(Vec3::new(f32::NAN, 0.0, 0.0));
    assert_relative_eq!(world.gravity(), Vec3::new(0.0, -1.0, 0.0));

    world.set_air_resistance(0.2);
    world.set_air_resistance(-1.0);
    assert_relative_eq!(world.air_resistance(), 0.2);
    assert_relative_eq!(world.config().air_resistance, 0.2);

    add_sphere(&mut world, Vec3::zeros(), 1.0, BodyOptions::new());
    add_sphere(&mut world, Vec3::new(5.0, 0.0, 0.0), 1.0, BodyOptions::new());
    assert_eq!(world.body_count(), 2);
    assert_eq!(world.bodies().count(), 2);

    world.clear();
    assert_eq!(world.body_count(), 0);
    assert!(world.query_region(&AABB::new(Vec3::repeat(-10.0), Vec3::repeat(10.0))).is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = PhysicsWorld::new(PhysicsConfig::new().with_cell_size(0.0));
    assert!(matches!(result, Err(PhysicsError::Config(_))));

    let result = PhysicsWorld::new(PhysicsConfig::new().with_time_step(-1.0));
    assert!(result.is_err());
}

#[test]
fn test_custom_spatial_query() {
    let hash = crate::spatial::SpatialHash::new(1.0).unwrap();
    let mut world = PhysicsWorld::with_spatial_query(PhysicsConfig::default(), Box::new(hash)).unwrap();
    let options = free_options().with_restitution(0.0);
    add_sphere(&mut world, Vec3::zeros(), 1.0, options.clone());
    add_sphere(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0, options);

    world.step(1.0 / 60.0);
    assert_eq!(world.last_step_stats().contacts, 1);
}

proptest! {
    #[test]
    fn prop_restitution_bound(
        speed_a in 0.1f32..10.0,
        speed_b in 0.1f32..10.0,
        mass_a in 0.5f32..5.0,
        mass_b in 0.5f32..5.0,
        restitution in 0.0f32..=1.0,
    ) {
        let mut world = quiet_world();
        let a = add_sphere(
            &mut world,
            Vec3::zeros(),
            1.0,
            free_options().with_mass(mass_a).with_restitution(restitution).with_velocity(Vec3::new(speed_a, 0.0, 0.0)),
        );
        let b = add_sphere(
            &mut world,
            Vec3::new(1.5, 0.0, 0.0),
            1.0,
            free_options().with_mass(mass_b).with_restitution(1.0).with_velocity(Vec3::new(-speed_b, 0.0, 0.0)),
        );

        let before = normal_velocity(&world, a, b, Vec3::x());
        world.step(1.0e-4);
        let after = normal_velocity(&world, a, b, Vec3::x());

        prop_assert!((after + restitution * before).abs() <= 1e-4 * (1.0 + before.abs()));
    }
}
