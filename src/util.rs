use nalgebra::Vector3;
use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::{thread_rng, Rng};
use std::ops::RangeBounds;

pub fn random_vec<T: SampleUniform, R: RangeBounds<T> + SampleRange<T> + Clone>(
    range: R,
) -> Vector3<T> {
    let mut rng = thread_rng();
    Vector3::new(
        rng.gen_range(range.clone()),
        rng.gen_range(range.clone()),
        rng.gen_range(range),
    )
}

// 각 성분이 [-extent, extent) 범위인 무작위 벡터. extent가 0이면 영벡터
pub fn jitter(extent: f32) -> Vector3<f32> {
    if extent <= 0.0 {
        return Vector3::zeros();
    }
    random_vec(-extent..extent)
}
