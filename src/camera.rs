use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Unit, UnitQuaternion, Vector2, Vector3, Vector4};
use rayon::prelude::*;

use crate::Size;

/// 호스트 쪽 카메라. 픽셀마다 정규화된 광선 방향을 하나씩 미리 계산해 둠.
///
/// `rays()`는 `x + y * width`로 인덱싱되며, 0번째 행은 NDC y = -1 (화면 아래쪽)에 해당함.
/// 위치, 방향, 뷰포트 크기가 바뀌면 광선 목록을 다시 계산함.
pub struct Camera {
    inverse_projection: Matrix4<f32>,
    view: Isometry3<f32>,

    vertical_fov: f32,
    near: f32,
    far: f32,

    position: Point3<f32>,
    forward: Unit<Vector3<f32>>,

    rays: Vec<Vector3<f32>>,
    viewport_size: Size,
}

impl Camera {
    /// `vertical_fov`는 도(degree) 단위.
    pub fn new(vertical_fov: f32, near: f32, far: f32, viewport_size: Size) -> Self {
        let vertical_fov = vertical_fov.to_radians();
        let inverse_projection = Self::build_projection(viewport_size, vertical_fov, near, far).inverse();

        let position = Point3::new(0.0, 0.0, -6.0);
        let forward = Vector3::z_axis();
        let view = Self::build_view(&position, &forward);

        let mut to_return = Self {
            inverse_projection,
            view,
            vertical_fov,
            near,
            far,
            position,
            forward,
            rays: vec![],
            viewport_size,
        };

        to_return.reevaluate_rays();

        to_return
    }

    /// 광선 방향을 이미 가지고 있는 호스트용. 다음 `resize`나 이동 때까지 주어진 목록을 그대로 씀.
    pub fn from_rays(position: Point3<f32>, viewport_size: Size, rays: Vec<Vector3<f32>>) -> Self {
        assert_eq!(
            rays.len(),
            viewport_size.pixel_count(),
            "ray table must hold exactly one direction per pixel"
        );

        let mut camera = Self::new(45.0, 0.1, 100.0, Size::default());
        camera.viewport_size = viewport_size;
        camera.position = position;
        camera.reevaluate_projection();
        camera.reevaluate_view();
        camera.rays = rays;
        camera
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn forward(&self) -> Unit<Vector3<f32>> {
        self.forward
    }

    pub fn rays(&self) -> &[Vector3<f32>] {
        &self.rays
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// 크기가 실제로 바뀌었으면 true
    pub fn resize(&mut self, new_size: Size) -> bool {
        if self.viewport_size == new_size {
            return false;
        }
        self.viewport_size = new_size;

        self.reevaluate_projection();
        self.reevaluate_rays();
        true
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        self.reevaluate_view();
        self.reevaluate_rays();
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.set_position(self.position + delta);
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        let Some(forward) = Unit::try_new(target - self.position, 1.0e-6) else {
            return;
        };
        self.forward = forward;
        self.reevaluate_view();
        self.reevaluate_rays();
    }

    /// 마우스 이동량(픽셀)만큼 회전. 오른쪽이 yaw 양수, 위쪽이 pitch 음수.
    pub fn rotate(&mut self, delta: Vector2<f32>) {
        let delta = delta * 0.002;

        let up: Unit<Vector3<f32>> = Vector3::y_axis();
        let right = Unit::new_normalize(up.cross(&self.forward.into_inner()));

        let pitch_delta = delta.y * self.rotation_speed();
        let yaw_delta = delta.x * self.rotation_speed();

        let q = UnitQuaternion::from_axis_angle(&right, pitch_delta)
            * UnitQuaternion::from_axis_angle(&up, yaw_delta);

        self.forward = q * self.forward;
        self.forward.renormalize_fast();

        self.reevaluate_view();
        self.reevaluate_rays();
    }

    pub fn rotation_speed(&self) -> f32 {
        0.7
    }

    fn build_projection(size: Size, vertical_fov: f32, near: f32, far: f32) -> Perspective3<f32> {
        // 크기가 0이어도 Perspective3가 패닉하지 않도록 최소 1로
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;

        let right = Perspective3::new(aspect, vertical_fov, near, far).into_inner();
        // 오른손 좌표계 절두체라서 z를 뒤집음
        let mut z_flip = Matrix4::identity();
        z_flip[(2, 2)] = -1.0;
        Perspective3::from_matrix_unchecked(right * z_flip)
    }

    fn build_view(position: &Point3<f32>, forward: &Unit<Vector3<f32>>) -> Isometry3<f32> {
        let target = *position + forward.into_inner();
        Isometry3::look_at_lh(position, &target, &Vector3::y_axis())
    }

    fn reevaluate_projection(&mut self) {
        self.inverse_projection =
            Self::build_projection(self.viewport_size, self.vertical_fov, self.near, self.far).inverse();
    }

    fn reevaluate_view(&mut self) {
        self.view = Self::build_view(&self.position, &self.forward);
    }

    fn reevaluate_rays(&mut self) {
        let size = self.viewport_size;
        if size.is_empty() {
            self.rays = vec![];
            return;
        }

        let inverse_projection = &self.inverse_projection;
        let view = &self.view;

        self.rays = (0..size.pixel_count())
            .into_par_iter()
            .map(|index| {
                let y = (index / size.width as usize) as f32;
                let x = (index % size.width as usize) as f32;

                let coord = Vector2::new(x / size.width as f32, y / size.height as f32) * 2.0
                    - Vector2::new(1.0, 1.0);

                let target = inverse_projection * Vector4::new(coord.x, coord.y, 1.0, 1.0);

                let mut normalized = target.xyz().normalize();
                if target.w.is_sign_negative() {
                    normalized = -normalized;
                }

                view.inverse_transform_vector(&normalized)
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_ray_per_pixel() {
        let camera = Camera::new(45.0, 0.1, 100.0, Size::new(8, 4));
        assert_eq!(camera.rays().len(), 32);

        for ray in camera.rays() {
            assert!((ray.magnitude() - 1.0).abs() < 1.0e-4);
        }
    }

    #[test]
    fn center_pixel_looks_forward() {
        // 2x2에서 (1, 1) 픽셀의 NDC 좌표가 정확히 (0, 0)
        let camera = Camera::new(45.0, 0.1, 100.0, Size::new(2, 2));
        let center = camera.rays()[1 + 2];

        assert!((center - camera.forward().into_inner()).magnitude() < 1.0e-4);
    }

    #[test]
    fn resize_recomputes_rays() {
        let mut camera = Camera::new(45.0, 0.1, 100.0, Size::new(4, 4));

        assert!(!camera.resize(Size::new(4, 4)));
        assert!(camera.resize(Size::new(6, 3)));
        assert_eq!(camera.rays().len(), 18);

        assert!(camera.resize(Size::new(0, 3)));
        assert!(camera.rays().is_empty());
    }

    #[test]
    fn look_at_turns_center_ray() {
        let mut camera = Camera::new(45.0, 0.1, 100.0, Size::new(2, 2));
        camera.set_position(Point3::origin());
        camera.look_at(Point3::new(5.0, 0.0, 0.0));

        let center = camera.rays()[3];
        assert!((center - Vector3::x()).magnitude() < 1.0e-4);
    }

    #[test]
    fn rotate_turns_forward() {
        let mut camera = Camera::new(45.0, 0.1, 100.0, Size::new(4, 4));
        let before = camera.forward();

        camera.rotate(Vector2::new(100.0, 0.0));

        assert!((camera.forward().magnitude() - 1.0).abs() < 1.0e-4);
        assert!(camera.forward().dot(&before.into_inner()) < 0.999);
        assert_eq!(camera.rays().len(), 16);
    }

    #[test]
    fn from_rays_keeps_table() {
        let rays = vec![Vector3::z(); 6];
        let camera = Camera::from_rays(Point3::new(1.0, 2.0, 3.0), Size::new(3, 2), rays.clone());

        assert_eq!(camera.rays(), rays.as_slice());
        assert_eq!(camera.position(), Point3::new(1.0, 2.0, 3.0));
    }
}
