use std::path::Path;

use bytemuck::cast_slice;
use image::{imageops, ImageError, RgbaImage};
use nalgebra::Vector4;

use crate::{vec4_to_rgba, Size};

/// 최종 이미지와 누적 버퍼. 둘은 항상 같은 크기로 함께 만들어지고 함께 버려짐.
///
/// 행 순서는 카메라 광선 순서를 따르므로 0번째 행이 화면 아래쪽임.
pub struct FrameBuffer {
    size: Size,
    image_data: Vec<u32>,
    accumulation: Vec<Vector4<f32>>,
}

impl FrameBuffer {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            image_data: vec![0; size.pixel_count()],
            accumulation: vec![Vector4::zeros(); size.pixel_count()],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// 크기가 바뀌었을 때만 두 버퍼를 새로 할당함. 바뀌었으면 true
    pub fn resize(&mut self, new_size: Size) -> bool {
        if self.size == new_size {
            return false;
        }

        *self = Self::new(new_size);
        true
    }

    /// 누적 버퍼 전체를 0으로. 재할당은 하지 않음
    pub fn clear_accumulation(&mut self) {
        self.accumulation.fill(Vector4::zeros());
    }

    pub fn pixels(&self) -> &[u32] {
        &self.image_data
    }

    pub fn accumulation(&self) -> &[Vector4<f32>] {
        &self.accumulation
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.image_data[(x + y * self.size.width) as usize]
    }

    /// (최종 이미지, 누적 버퍼)를 동시에 빌려 줌. 렌더러가 행 단위로 쪼개서 씀
    pub(crate) fn buffers_mut(&mut self) -> (&mut [u32], &mut [Vector4<f32>]) {
        (&mut self.image_data, &mut self.accumulation)
    }

    /// 픽셀마다 R, G, B, A 순서의 바이트 (리틀 엔디안 기준)
    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.image_data)
    }

    /// 위아래를 뒤집어 (0번째 행이 화면 위쪽) RGBA8 이미지로 만듦
    pub fn to_image(&self) -> RgbaImage {
        let image = RgbaImage::from_raw(self.size.width, self.size.height, self.as_bytes().to_vec())
            .unwrap_or_else(|| RgbaImage::new(self.size.width, self.size.height));
        imageops::flip_vertical(&image)
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ImageError> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)
    }
}

/// 누적 버퍼 한 칸에 이번 프레임 색을 더하고 평균을 압축해서 돌려줌.
pub(crate) fn accumulate(slot: &mut Vector4<f32>, color: &Vector4<f32>, frame_index: u32) -> u32 {
    *slot += color;
    // frame_index는 언제나 1 이상
    let accumulated = *slot / frame_index.max(1) as f32;
    vec4_to_rgba(&accumulated)
}
