use nalgebra::Vector4;

pub mod app;
pub mod camera;
pub mod renderer;
pub mod util;

/// 뷰포트 크기. 픽셀 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// 선형 RGBA 색상을 8비트 채널 4개로 압축함.
///
/// 각 채널은 [0, 1]로 잘린 뒤 255를 곱하고, R이 가장 낮은 바이트, A가 가장 높은 바이트에 들어감.
pub fn vec4_to_rgba(color: &Vector4<f32>) -> u32 {
    let clamped = color.map(|channel| channel.clamp(0.0, 1.0));

    let r = (clamped.x * 255.0) as u8 as u32;
    let g = (clamped.y * 255.0) as u8 as u32;
    let b = (clamped.z * 255.0) as u8 as u32;
    let a = (clamped.w * 255.0) as u8 as u32;

    (a << 24) | (b << 16) | (g << 8) | r
}

// 로거 초기화. RUST_LOG가 없으면 info 레벨
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_red_into_lowest_byte() {
        let packed = vec4_to_rgba(&Vector4::new(1.0, 0.0, 0.0, 1.0));

        assert_eq!(packed & 0xFF, 0xFF);
        assert_eq!((packed >> 8) & 0xFF, 0x00);
        assert_eq!(packed, 0xFF0000FF);
    }

    #[test]
    fn clamps_out_of_range_channels() {
        let packed = vec4_to_rgba(&Vector4::new(4.0, -2.0, 0.5, 1.0));
        let [r, g, b, a] = packed.to_le_bytes();

        assert_eq!(r, 0xFF);
        assert_eq!(g, 0x00);
        assert_eq!(b, 127);
        assert_eq!(a, 0xFF);
    }

    #[test]
    fn size_helpers() {
        let size = Size::new(4, 3);
        assert_eq!(size.pixel_count(), 12);
        assert!(!size.is_empty());
        assert!(Size::new(0, 3).is_empty());
    }
}
