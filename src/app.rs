use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};

use crate::camera::Camera;
use crate::renderer::scene::{Cuboid, Material, Scene, SceneError, Sphere};
use crate::renderer::{Renderer, Settings};
use crate::Size;

/// 창 없이 돌아가는 호스트 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub viewport_size: Size,
    /// 누적할 최대 프레임 수
    pub frames: u32,
    pub bounces: u32,
    pub accumulate: bool,
    pub multithreaded: bool,
    pub vertical_fov: f32,
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport_size: Size::new(640, 360),
            frames: 100,
            bounces: 4,
            accumulate: true,
            multithreaded: true,
            vertical_fov: 45.0,
            output: PathBuf::from("lumen.png"),
        }
    }
}

/// 장면, 카메라, 렌더러를 들고 있는 호스트. 렌더 호출 사이에서만 장면과 카메라를 고침
pub struct Application {
    pub scene: Scene,
    pub camera: Camera,
    pub renderer: Renderer,
    viewport_size: Size,
    last_render_time: Duration,
}

impl Application {
    pub fn new(config: &Config) -> Self {
        let mut camera = Camera::new(config.vertical_fov, 0.1, 100.0, config.viewport_size);
        camera.set_position(Point3::new(1.5, 0.5, -9.0));
        camera.look_at(Point3::new(1.5, 0.5, 0.0));

        let settings = Settings {
            accumulate: config.accumulate,
            multithreaded: config.multithreaded,
            bounces: config.bounces,
            ..Default::default()
        };

        Self {
            scene: demo_scene(),
            camera,
            renderer: Renderer::with_settings(config.viewport_size, settings),
            viewport_size: config.viewport_size,
            last_render_time: Duration::ZERO,
        }
    }

    pub fn resize(&mut self, new_size: Size) {
        self.viewport_size = new_size;
    }

    /// 카메라가 움직였으면 누적을 처음부터 다시 함
    pub fn move_camera(&mut self, delta: Vector3<f32>) {
        self.camera.translate(delta);
        self.renderer.reset_frame_index();
    }

    /// 마우스 이동량만큼 시선을 돌리고 누적을 다시 시작함
    pub fn rotate_camera(&mut self, delta: Vector2<f32>) {
        self.camera.rotate(delta);
        self.renderer.reset_frame_index();
    }

    /// 장면을 고친 뒤에도 누적을 다시 시작해야 함
    pub fn edit_scene<F: FnOnce(&mut Scene)>(&mut self, edit: F) {
        edit(&mut self.scene);
        self.renderer.reset_frame_index();
    }

    pub fn render(&mut self) -> Result<(), SceneError> {
        let timer = Instant::now();

        self.renderer.resize(self.viewport_size);
        self.camera.resize(self.viewport_size);
        self.renderer.render(&self.scene, &self.camera)?;

        self.last_render_time = timer.elapsed();
        Ok(())
    }

    pub fn last_render_time(&self) -> Duration {
        self.last_render_time
    }
}

/// 구 두 개와 얇은 판 하나
pub fn demo_scene() -> Scene {
    let mut scene = Scene::default();

    let pink = scene.add_material(Material {
        albedo: Vector3::new(1.0, 0.0, 1.0),
        roughness: 0.0,
        ..Default::default()
    });
    let blue = scene.add_material(Material {
        albedo: Vector3::new(0.2, 0.3, 1.0),
        roughness: 0.1,
        reflective: true,
        ..Default::default()
    });
    let floor = scene.add_material(Material {
        albedo: Vector3::new(1.0, 0.0, 1.0),
        roughness: 0.0,
        reflective: true,
        ..Default::default()
    });

    scene.add_sphere(Sphere {
        position: Point3::new(0.0, 0.0, 0.0),
        radius: 1.0,
        material_index: pink,
    });
    scene.add_sphere(Sphere {
        position: Point3::new(3.0, 0.0, 0.0),
        radius: 2.0,
        material_index: blue,
    });

    scene.add_box(Cuboid {
        position: Point3::new(1.0, 2.0, 1.0),
        width: 10.0,
        height: 0.1,
        depth: 10.0,
        material_index: floor,
    });

    scene
}

pub fn run(config: Config) -> Result<()> {
    if config.viewport_size.is_empty() {
        warn!(
            "viewport {}x{} is empty, nothing to render",
            config.viewport_size.width, config.viewport_size.height
        );
        return Ok(());
    }

    let mut app = Application::new(&config);
    let frames = config.frames.max(1);

    info!(
        "rendering {}x{}, up to {} frames",
        config.viewport_size.width, config.viewport_size.height, frames
    );

    let started = Instant::now();
    loop {
        app.render().context("scene was rejected by the renderer")?;

        let frame_index = app.renderer.frame_index();
        if frame_index % 10 == 0 {
            info!(
                "frame {}: last render {:.3}ms",
                frame_index - 1,
                app.last_render_time().as_secs_f64() * 1000.0
            );
        }

        // 누적을 안 하면 프레임 번호가 1에 고정되므로 한 번만 그림
        if !app.renderer.settings.accumulate || frame_index > frames {
            break;
        }
    }
    info!("finished in {:.2}s", started.elapsed().as_secs_f64());

    app.renderer
        .frame()
        .save_png(&config.output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    info!("saved {}", config.output.display());

    Ok(())
}
