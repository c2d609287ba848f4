//! End-to-end checks of the headless scene: camera, rain and lightning driven
//! through the public API the way the window loop drives them.

use stormview::input::{Input, KeyCode};
use stormview::{
    Camera, FlashEffect, FlashSettings, FlashState, ParticleField, RainSettings, RenderMode,
    Scene, Vec3, ViewerConfig,
};

fn rain(count: usize, seed: u64, fall_speed: f32) -> RainSettings {
    RainSettings {
        count,
        seed: Some(seed),
        fall_speed,
        ..RainSettings::default()
    }
}

/// Trigger that fires on its first poll only.
fn fire_once() -> impl FnMut() -> bool {
    let mut fired = false;
    move || !std::mem::replace(&mut fired, true)
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn test_camera_looking_at_origin_keeps_view_on_zero_rotation() {
    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    camera.rotate(0.0, 0.0);
    assert!((camera.front() - Vec3::NEG_Z).length() < 1e-5);
}

#[test]
fn test_camera_pitch_never_passes_vertical() {
    let mut camera = Camera::new(Vec3::new(-1.1, 0.9, 2.75), Vec3::new(-1.4, 1.0, 0.0), Vec3::Y);
    for _ in 0..100 {
        camera.rotate(10.0, 3.0);
        assert!(camera.pitch() <= 89.0);
        assert!((camera.front().length() - 1.0).abs() < 1e-5);
    }
    for _ in 0..100 {
        camera.rotate(-10.0, 3.0);
        assert!(camera.pitch() >= -89.0);
    }
}

// ============================================================================
// Rain
// ============================================================================

#[test]
fn test_single_drop_recycles_within_bound() {
    let settings = rain(1, 11, 0.3);
    let mut field = ParticleField::new(&settings).unwrap();
    let bound = ((settings.spawn_height_base + settings.spawn_height_range + 1.0) / 0.3).ceil() as usize;

    let mut recycled_at = None;
    for tick in 1..=bound {
        if field.tick(1.0) == 1 {
            recycled_at = Some(tick);
            break;
        }
    }

    assert!(recycled_at.is_some(), "drop did not recycle within {} ticks", bound);
    let position = field.positions().next().unwrap();
    assert!(field.spawn_volume().contains(position));
}

#[test]
fn test_only_fallen_drops_are_resampled() {
    let settings = rain(2_000, 5, 0.3);
    let mut field = ParticleField::new(&settings).unwrap();
    let ground = field.ground_level();

    for _ in 0..120 {
        let before: Vec<Vec3> = field.positions().collect();
        let recycled = field.tick(1.0);

        let mut expected_recycled = 0;
        for (old, drop) in before.iter().zip(field.drops()) {
            let fallen = *old + Vec3::new(0.0, -0.3, 0.0);
            if fallen.y < ground {
                expected_recycled += 1;
                assert!(field.spawn_volume().contains(drop.position));
            } else {
                assert_eq!(drop.position, fallen);
            }
            assert_eq!(drop.velocity, Vec3::new(0.0, -0.3, 0.0));
        }
        assert_eq!(recycled, expected_recycled);
    }
}

#[test]
fn test_drops_stay_between_ground_and_spawn_top() {
    let mut field = ParticleField::new(&rain(5_000, 9, 18.0)).unwrap();
    let top = field.spawn_volume().height_top();
    for _ in 0..300 {
        field.tick(1.0 / 60.0);
    }
    for position in field.positions() {
        assert!(position.y >= field.ground_level());
        assert!(position.y <= top);
    }
}

#[test]
fn test_seed_changes_rain() {
    let a = ParticleField::new(&rain(100, 1, 0.3)).unwrap();
    let b = ParticleField::new(&rain(100, 2, 0.3)).unwrap();
    assert!(!a.positions().eq(b.positions()));
    assert_eq!(a.seed(), 1);
}

// ============================================================================
// Lightning
// ============================================================================

#[test]
fn test_never_firing_trigger_stays_idle() {
    let settings = FlashSettings::default();
    let mut flash = FlashEffect::with_trigger(&settings, || false);
    for _ in 0..1_000 {
        flash.tick(0.016);
        assert_eq!(flash.state(), FlashState::Idle);
        assert_eq!(flash.light_color(), settings.default_color);
    }
}

#[test]
fn test_flash_ends_however_time_is_split() {
    let settings = FlashSettings::default();
    assert_eq!(settings.duration, 0.5);

    let splits: [&[f32]; 4] = [
        &[0.5],
        &[0.25, 0.25],
        &[0.125, 0.25, 0.125],
        &[0.3, 0.3],
    ];

    for split in splits {
        let mut flash = FlashEffect::with_trigger(&settings, fire_once());
        flash.tick(0.016);
        assert!(flash.is_active());
        assert_eq!(flash.light_color(), settings.flash_color);

        for &dt in split {
            flash.tick(dt);
        }
        assert_eq!(flash.state(), FlashState::Idle, "split {:?}", split);
        assert_eq!(flash.light_color(), settings.default_color);
    }
}

#[test]
fn test_flash_still_running_before_duration() {
    let settings = FlashSettings::default();
    let mut flash = FlashEffect::with_trigger(&settings, fire_once());
    flash.tick(0.0);
    flash.tick(0.25);
    flash.tick(0.125);
    assert!(flash.is_active());
    assert_eq!(flash.intensity(), 0.25);
}

// ============================================================================
// Scene
// ============================================================================

#[test]
fn test_scene_frame_loop() {
    let mut config = ViewerConfig::default();
    config.rain = rain(500, 3, 0.3);
    let flash = FlashEffect::with_trigger(&config.flash, fire_once());
    let mut scene = Scene::with_flash(&config, flash).unwrap();
    let mut input = Input::new();

    // First frame: lightning starts and the scene light is switched off
    input.press(KeyCode::L);
    scene.update(&input, 1.0);
    input.begin_frame();
    let frame = scene.frame(16.0 / 9.0);
    assert!(frame.flash_active);
    assert_eq!(frame.light.color, config.flash.flash_color);

    // Flash over: the light stays off
    scene.update(&input, 1.0);
    let frame = scene.frame(16.0 / 9.0);
    assert!(!frame.flash_active);
    assert_eq!(frame.light.color, Vec3::ZERO);

    // Point mode, then quit
    input.press(KeyCode::C);
    let outcome = scene.update(&input, 1.0);
    assert!(!outcome.quit);
    assert_eq!(scene.render_mode(), RenderMode::Points);
    input.begin_frame();

    input.press(KeyCode::Escape);
    assert!(scene.update(&input, 1.0).quit);
}
