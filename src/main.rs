use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use lumen::app::{self, Config};
use lumen::Size;

#[derive(Parser)]
#[command(name = "lumen", about = "구와 상자를 그리는 CPU 누적 레이 트레이서")]
struct Args {
    /// 이미지 가로 픽셀 수
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// 이미지 세로 픽셀 수
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// 누적할 최대 프레임 수
    #[arg(long, default_value_t = 100)]
    frames: u32,

    /// 픽셀 하나당 최대 광선 구간 수
    #[arg(long, default_value_t = 4)]
    bounces: u32,

    /// 누적 없이 한 프레임만 그림
    #[arg(long)]
    no_accumulate: bool,

    /// 행을 병렬로 나누지 않고 하나씩 그림
    #[arg(long)]
    single_thread: bool,

    /// 세로 시야각 (도)
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// 결과 PNG 경로
    #[arg(long, short, default_value = "lumen.png")]
    output: PathBuf,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            viewport_size: Size::new(args.width, args.height),
            frames: args.frames,
            bounces: args.bounces,
            accumulate: !args.no_accumulate,
            multithreaded: !args.single_thread,
            vertical_fov: args.fov,
            output: args.output,
        }
    }
}

fn main() -> Result<()> {
    lumen::init_logger();

    let args = Args::parse();
    app::run(args.into())
}
