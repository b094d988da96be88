use lumen::app::demo_scene;
use lumen::camera::Camera;
use lumen::renderer::scene::{Cuboid, Material, Scene, Sphere};
use lumen::renderer::{Renderer, Settings};
use lumen::Size;
use nalgebra::{Point3, Vector3};

fn demo_camera(size: Size) -> Camera {
    let mut camera = Camera::new(45.0, 0.1, 100.0, size);
    camera.set_position(Point3::new(1.5, 0.5, -9.0));
    camera.look_at(Point3::new(1.5, 0.5, 0.0));
    camera
}

fn still_settings() -> Settings {
    Settings {
        light_direction: Vector3::new(0.0, -1.0, 1.0),
        light_jitter: 0.0,
        ..Default::default()
    }
}

// 결정적인 장면: 흔들림 없는 빛, 거칠기 0
fn still_scene() -> Scene {
    let mut scene = demo_scene();
    for material in &mut scene.materials {
        material.roughness = 0.0;
    }
    scene
}

fn difference(a: &[u32], b: &[u32]) -> u64 {
    a.iter()
        .zip(b)
        .flat_map(|(a, b)| a.to_le_bytes().into_iter().zip(b.to_le_bytes()))
        .map(|(a, b)| (a as i32 - b as i32).unsigned_abs() as u64)
        .sum()
}

#[test]
fn accumulation_converges() {
    let size = Size::new(24, 16);
    let scene = demo_scene();
    let camera = demo_camera(size);
    let mut renderer = Renderer::with_settings(
        size,
        Settings {
            light_jitter: 0.3,
            ..Default::default()
        },
    );

    let mut frames = Vec::new();
    for _ in 0..48 {
        renderer.render(&scene, &camera).unwrap();
        frames.push(renderer.frame().pixels().to_vec());
    }
    assert_eq!(renderer.frame_index(), 49);

    let early: u64 = (0..4).map(|i| difference(&frames[i], &frames[i + 1])).sum();
    let late: u64 = (43..47).map(|i| difference(&frames[i], &frames[i + 1])).sum();

    assert!(late <= early, "late delta {late} should not exceed early delta {early}");
}

#[test]
fn disabled_accumulation_ignores_history() {
    let size = Size::new(12, 8);
    let scene = still_scene();
    let camera = demo_camera(size);

    let mut history = Renderer::with_settings(size, still_settings());
    for _ in 0..5 {
        history.render(&scene, &camera).unwrap();
    }
    history.settings.accumulate = false;
    history.render(&scene, &camera).unwrap();
    assert_eq!(history.frame_index(), 1);

    let mut fresh = Renderer::with_settings(
        size,
        Settings {
            accumulate: false,
            ..still_settings()
        },
    );
    fresh.render(&scene, &camera).unwrap();

    assert_eq!(history.frame().pixels(), fresh.frame().pixels());
}

#[test]
fn single_thread_matches_parallel_for_still_scene() {
    let size = Size::new(12, 8);
    let scene = still_scene();
    let camera = demo_camera(size);

    let mut parallel = Renderer::with_settings(
        size,
        Settings {
            accumulate: false,
            ..still_settings()
        },
    );
    let mut serial = Renderer::with_settings(
        size,
        Settings {
            accumulate: false,
            multithreaded: false,
            ..still_settings()
        },
    );

    parallel.render(&scene, &camera).unwrap();
    serial.render(&scene, &camera).unwrap();

    assert_eq!(parallel.frame().pixels(), serial.frame().pixels());
}

#[test]
fn resize_reallocates_and_restarts() {
    let mut renderer = Renderer::new(Size::new(4, 4));
    let scene = demo_scene();
    let camera = demo_camera(Size::new(4, 4));

    renderer.render(&scene, &camera).unwrap();
    renderer.render(&scene, &camera).unwrap();
    assert_eq!(renderer.frame_index(), 3);

    assert!(!renderer.resize(Size::new(4, 4)));
    assert_eq!(renderer.frame_index(), 3);

    assert!(renderer.resize(Size::new(5, 3)));
    assert_eq!(renderer.frame_index(), 1);
    assert_eq!(renderer.frame().pixels().len(), 15);
    assert_eq!(renderer.frame().accumulation().len(), 15);
    assert!(renderer.frame().accumulation().iter().all(|sum| *sum == nalgebra::Vector4::zeros()));
}

#[test]
fn tie_between_sphere_and_box_shows_sphere() {
    let mut scene = Scene::default();
    let red = scene.add_material(Material {
        albedo: Vector3::new(1.0, 0.0, 0.0),
        ..Default::default()
    });
    let green = scene.add_material(Material {
        albedo: Vector3::new(0.0, 1.0, 0.0),
        ..Default::default()
    });
    scene.add_box(Cuboid {
        position: Point3::new(-1.0, -1.0, 4.0),
        width: 2.0,
        height: 2.0,
        depth: 2.0,
        material_index: green,
    });
    scene.add_sphere(Sphere {
        position: Point3::new(0.0, 0.0, 5.0),
        radius: 1.0,
        material_index: red,
    });

    let camera = Camera::from_rays(Point3::origin(), Size::new(1, 1), vec![Vector3::z()]);
    let mut renderer = Renderer::with_settings(
        Size::new(1, 1),
        Settings {
            light_direction: Vector3::z(),
            ..still_settings()
        },
    );

    renderer.render(&scene, &camera).unwrap();
    assert_eq!(renderer.frame().pixel(0, 0), 0xFF0000FF);
}

#[test]
fn background_pixel_is_packed_clamped() {
    let scene = Scene::default();
    let camera = Camera::from_rays(Point3::origin(), Size::new(2, 1), vec![Vector3::z(); 2]);
    let mut renderer = Renderer::with_settings(
        Size::new(2, 1),
        Settings {
            background: Vector3::new(3.0, 0.0, 1.0),
            ..Default::default()
        },
    );

    renderer.render(&scene, &camera).unwrap();
    assert_eq!(renderer.frame().pixels(), &[0xFFFF00FFu32, 0xFFFF00FF]);
}
