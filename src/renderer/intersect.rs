use nalgebra::{Point3, Unit, Vector3};

use crate::renderer::ray::Ray;
use crate::renderer::scene::{Cuboid, PrimitiveKind, Scene, Sphere};

/// 광선과 도형 하나의 교차 판정.
pub trait Intersect {
    /// 광선 위의 가장 가까운 교차 거리. 교차하지 않으면 None
    fn intersect(&self, ray: &Ray) -> Option<f32>;

    /// 표면 위의 점에서 바깥쪽을 향하는 법선
    fn normal_at(&self, point: &Point3<f32>) -> Unit<Vector3<f32>>;
}

impl Intersect for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        // 반지름이 0 이하(또는 NaN)면 절대 안 맞음
        if !(self.radius > 0.0) {
            return None;
        }

        // a = 빔 시작, b = 빔 방향, r = 구 반지름
        // (b·b) t^2 + 2 (a·b) t + (a·a - r^2) = 0
        // 구를 원점으로 옮긴 만큼 빔 시작점도 옮겨서 계산함
        let origin = ray.origin - self.position;

        let first = ray.direction.magnitude_squared();
        if first == 0.0 {
            return None;
        }
        let second = 2.0 * origin.dot(&ray.direction);
        let third = origin.magnitude_squared() - self.radius.powi(2);

        // 판별식
        let discriminant = second.powi(2) - 4.0 * first * third;
        if discriminant < 0.0 {
            return None;
        }

        // 가까운 근만 봄. 빔 뒤쪽(0 이하)이면 버림
        let distance = (-second - discriminant.sqrt()) / (2.0 * first);
        (distance > 0.0).then_some(distance)
    }

    fn normal_at(&self, point: &Point3<f32>) -> Unit<Vector3<f32>> {
        Unit::new_normalize(*point - self.position)
    }
}

impl Intersect for Cuboid {
    // 슬랩 방식. 축마다 들어가는/나가는 거리를 구하고 구간을 겹침
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        if !(self.width > 0.0 && self.height > 0.0 && self.depth > 0.0) {
            return None;
        }
        if ray.direction == Vector3::zeros() {
            return None;
        }

        let min = self.min();
        let max = self.max();

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction == 0.0 {
                // 이 축과 평행함. 0 * inf = NaN이 나오지 않게 따로 처리
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }

            let inverse = 1.0 / direction;
            let near = (min[axis] - origin) * inverse;
            let far = (max[axis] - origin) * inverse;

            t_min = t_min.max(near.min(far));
            t_max = t_max.min(near.max(far));
        }

        if t_min > t_max || t_max < 0.0 {
            return None;
        }

        // 상자 안에서 출발했으면 나가는 면까지의 거리
        Some(if t_min >= 0.0 { t_min } else { t_max })
    }

    fn normal_at(&self, point: &Point3<f32>) -> Unit<Vector3<f32>> {
        let min = self.min();
        let max = self.max();

        let faces = [
            ((point.x - min.x).abs(), -Vector3::x()),
            ((point.x - max.x).abs(), Vector3::x()),
            ((point.y - min.y).abs(), -Vector3::y()),
            ((point.y - max.y).abs(), Vector3::y()),
            ((point.z - min.z).abs(), -Vector3::z()),
            ((point.z - max.z).abs(), Vector3::z()),
        ];

        // 점에 가장 가까운 면의 법선
        let mut nearest = (f32::INFINITY, Vector3::y());
        for (distance, normal) in faces {
            if distance < nearest.0 {
                nearest = (distance, normal);
            }
        }

        Unit::new_unchecked(nearest.1)
    }
}

// Cherno씨와 같은 디자인 선택, HitPayload는 빛의 경로에 대한 정보만 담고
// 이를 이용해 색상을 알아내는건 나중에 함
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPayload {
    pub distance: f32,
    pub position: Point3<f32>,
    pub normal: Unit<Vector3<f32>>,
    pub object_index: usize,
    pub kind: PrimitiveKind,
}

/// 장면 전체에서 가장 가까운 교차를 찾음.
///
/// 구를 먼저, 상자를 나중에 검사하고 더 작은 거리만 갱신하므로
/// 거리가 정확히 같으면 구가 이김.
pub fn trace_ray(scene: &Scene, ray: &Ray) -> Option<HitPayload> {
    let mut closest = None;

    nearest(&scene.spheres, PrimitiveKind::Sphere, ray, &mut closest);
    nearest(&scene.boxes, PrimitiveKind::Cuboid, ray, &mut closest);

    closest.map(|(kind, index, distance)| closest_hit(scene, ray, distance, kind, index))
}

fn nearest<P: Intersect>(
    primitives: &[P],
    kind: PrimitiveKind,
    ray: &Ray,
    closest: &mut Option<(PrimitiveKind, usize, f32)>,
) {
    for (index, primitive) in primitives.iter().enumerate() {
        let Some(distance) = primitive.intersect(ray) else {
            continue;
        };

        let is_closer = match *closest {
            Some((_, _, previous_distance)) => distance < previous_distance,
            None => true,
        };
        if is_closer {
            *closest = Some((kind, index, distance));
        }
    }
}

fn closest_hit(scene: &Scene, ray: &Ray, distance: f32, kind: PrimitiveKind, index: usize) -> HitPayload {
    let position = ray.at(distance);
    let normal = match kind {
        PrimitiveKind::Sphere => scene.spheres[index].normal_at(&position),
        PrimitiveKind::Cuboid => scene.boxes[index].normal_at(&position),
    };

    HitPayload {
        distance,
        position,
        normal,
        object_index: index,
        kind,
    }
}
