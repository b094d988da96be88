use log::{debug, info};
use nalgebra::{Reflection3, Unit, Vector3, Vector4};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::util::{jitter, random_vec};
use crate::{vec4_to_rgba, Size};

use self::frame::{accumulate, FrameBuffer};
use self::intersect::{trace_ray, HitPayload};
use self::ray::Ray;
use self::scene::{Scene, SceneError};

pub mod frame;
pub mod intersect;
pub mod ray;
pub mod scene;

/// 다음 광선 시작점을 표면에서 띄우는 거리
pub const SURFACE_BIAS: f32 = 0.0001;
/// 반사 재질에서 한 번 튈 때마다 곱하는 감쇠
pub const REFLECTIVE_DECAY: f32 = 0.7;
/// 난반사 재질의 감쇠. 난반사 표면에서는 경로가 끝나므로 다음 기여에는 쓰이지 않음
pub const DIFFUSE_DECAY: f32 = 0.4;

pub struct Settings {
    pub accumulate: bool,
    /// false면 행을 순서대로 하나씩 그림
    pub multithreaded: bool,
    /// 픽셀 하나당 최대 광선 구간 수
    pub bounces: u32,
    pub background: Vector3<f32>,
    /// 태양 빛이 나아가는 방향
    pub light_direction: Vector3<f32>,
    pub light_jitter: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accumulate: true,
            multithreaded: true,
            bounces: 4,
            background: Vector3::new(0.6, 0.7, 0.9),
            light_direction: Vector3::new(-1.0, -1.0, 1.0),
            light_jitter: 0.1,
        }
    }
}

pub struct Renderer {
    frame: FrameBuffer,
    frame_index: u32,
    pub settings: Settings,
}

impl Renderer {
    pub fn new(viewport_size: Size) -> Self {
        Self::with_settings(viewport_size, Settings::default())
    }

    pub fn with_settings(viewport_size: Size, settings: Settings) -> Self {
        Self {
            frame: FrameBuffer::new(viewport_size),
            frame_index: 1,
            settings,
        }
    }

    /// 크기가 바뀌면 최종 이미지와 누적 버퍼를 같이 새로 만들고 누적을 처음부터 다시 시작함
    pub fn resize(&mut self, new_size: Size) -> bool {
        if !self.frame.resize(new_size) {
            return false;
        }

        info!("renderer resized to {}x{}", new_size.width, new_size.height);
        self.frame_index = 1;
        true
    }

    pub fn reset_frame_index(&mut self) {
        self.frame_index = 1;
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// 이미지 전체를 한 번 그림.
    ///
    /// 장면과 카메라는 호출이 끝날 때까지 빌려서 읽기만 함. 재질 인덱스가 잘못된 장면은
    /// 아무것도 그리지 않고 거부함.
    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), SceneError> {
        scene.validate()?;

        let size = self.frame.size();
        let viewport = camera.viewport_size();
        // 개수만 같고 가로세로가 다르면 행 간격이 어긋남
        assert!(
            viewport == size && camera.rays().len() == size.pixel_count(),
            "camera rays ({}, {}x{}) do not match the frame buffer ({}x{})",
            camera.rays().len(),
            viewport.width,
            viewport.height,
            size.width,
            size.height
        );

        if self.frame_index == 1 {
            self.frame.clear_accumulation();
        }

        if !size.is_empty() {
            let tracer = Tracer::new(scene, camera, &self.settings);
            let frame_index = self.frame_index;
            let width = size.width as usize;
            let (image_data, accumulation) = self.frame.buffers_mut();

            // 행끼리는 서로 겹치는 메모리가 없으니 마음대로 나눠 그려도 됨
            if self.settings.multithreaded {
                image_data
                    .par_chunks_mut(width)
                    .zip(accumulation.par_chunks_mut(width))
                    .enumerate()
                    .for_each(|(y, (pixels, paths))| tracer.render_row(y, pixels, paths, frame_index));
            } else {
                image_data
                    .chunks_mut(width)
                    .zip(accumulation.chunks_mut(width))
                    .enumerate()
                    .for_each(|(y, (pixels, paths))| tracer.render_row(y, pixels, paths, frame_index));
            }
        }

        debug!("frame {} rendered", self.frame_index);

        if self.settings.accumulate {
            self.frame_index += 1;
        } else {
            self.frame_index = 1;
        }

        Ok(())
    }
}

/// 렌더 한 번 동안만 살아 있는 장면, 카메라, 설정 참조.
pub struct Tracer<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    settings: &'a Settings,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, camera: &'a Camera, settings: &'a Settings) -> Self {
        Self {
            scene,
            camera,
            settings,
        }
    }

    fn render_row(&self, y: usize, pixels: &mut [u32], paths: &mut [Vector4<f32>], frame_index: u32) {
        let width = pixels.len();

        for (x, (pixel, path)) in pixels.iter_mut().zip(paths.iter_mut()).enumerate() {
            let color = self.per_pixel(x + y * width);

            *pixel = if self.settings.accumulate {
                accumulate(path, &color, frame_index)
            } else {
                vec4_to_rgba(&color)
            };
        }
    }

    // DirectX의 RayGen 쉐이더와 같음
    pub fn per_pixel(&self, index: usize) -> Vector4<f32> {
        let mut ray = Ray::new(self.camera.position(), self.camera.rays()[index]);

        let mut color = Vector3::zeros();
        let mut multiplier = 1.0;

        for _ in 0..self.settings.bounces {
            let Some(HitPayload { position, normal, object_index, kind, .. }) = self.trace_ray(&ray) else {
                color += self.settings.background * multiplier;
                break;
            };

            let material = self.scene.material(kind, object_index);

            // 태양 방향을 조금씩 흔들어서 부드러운 그림자를 만듦
            let light_direction = (self.settings.light_direction + jitter(self.settings.light_jitter))
                .try_normalize(1.0e-6)
                .unwrap_or_else(|| -Vector3::y());

            let intensity = normal.dot(&-light_direction).max(0.0); // cos(v1, v2) = v1 * v2 IF both normal

            // position 자체가 표면에 붙어 있어서 그대로 쓰면 자기 자신과 또 부딪힘.
            // 그래서 조금이라도 옮겨야 함
            let origin = position + normal.as_ref() * SURFACE_BIAS;

            // 그림자 광선이 아무것도 안 맞으면 빛을 받는 점. 맞으면 기여 없음
            let shadow_ray = Ray::new(origin, -light_direction);
            if self.trace_ray(&shadow_ray).is_none() {
                color += material.albedo * intensity * multiplier;
            }

            multiplier *= if material.reflective { REFLECTIVE_DECAY } else { DIFFUSE_DECAY };
            if !material.reflective {
                break;
            }

            ray.origin = origin;
            let reflection_axis =
                Unit::new_normalize(normal.as_ref() + material.roughness * random_vec(-0.5..0.5));
            Reflection3::new(reflection_axis, 0.0).reflect(&mut ray.direction);
        }

        Vector4::new(color.x, color.y, color.z, 1.0)
    }

    pub fn trace_ray(&self, ray: &Ray) -> Option<HitPayload> {
        trace_ray(self.scene, ray)
    }
}
