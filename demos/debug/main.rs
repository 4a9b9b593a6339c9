//! Clipper2d debug runner: clips and offsets a few fixed shapes and prints
//! the resulting rings.
//!
//! Usage:
//! ```text
//! cargo run --example debug                          # default (clip)
//! cargo run --example debug -- offset                # offset scenarios
//! RUST_LOG=clipper2d=trace cargo run --example debug # engine events
//! ```

use clipper2d::math::path_from_coords;
use clipper2d::math::polygon_2d::area;
use clipper2d::{
    ClipType, Clipper, ClipperOffset, EndType, JoinType, Paths, PolyFillType, PolyType, Result,
};

fn print_paths(label: &str, paths: &Paths) {
    println!("{label}: {} path(s)", paths.len());
    for path in paths {
        let coords: Vec<String> = path.iter().map(|p| format!("({}, {})", p.x, p.y)).collect();
        println!("  area {:>10.1}  {}", area(path), coords.join(" "));
    }
}

fn clip_demo() -> Result<()> {
    let subject = path_from_coords(&[(0, 0), (100, 0), (100, 100), (0, 100)]);
    let clip = path_from_coords(&[(50, -20), (120, 50), (50, 120), (-20, 50)]);
    for clip_type in [
        ClipType::Intersection,
        ClipType::Union,
        ClipType::Difference,
        ClipType::Xor,
    ] {
        let mut clipper = Clipper::new();
        clipper.add_path(&subject, PolyType::Subject, true)?;
        clipper.add_path(&clip, PolyType::Clip, true)?;
        let result = clipper.execute_with(clip_type, PolyFillType::NonZero)?;
        print_paths(&format!("{clip_type:?}"), &result);
    }
    Ok(())
}

fn offset_demo() -> Result<()> {
    let square = path_from_coords(&[(0, 0), (100, 0), (100, 100), (0, 100)]);
    let line = path_from_coords(&[(0, 0), (60, 40), (120, 0)]);
    for join_type in [JoinType::Round, JoinType::Square, JoinType::Miter] {
        let mut offset = ClipperOffset::new();
        offset.add_path(&square, join_type, EndType::ClosedPolygon);
        offset.add_path(&line, join_type, EndType::OpenRound);
        for delta in [10.0, -10.0] {
            let result = offset.execute(delta)?;
            print_paths(&format!("{join_type:?} {delta:+}"), &result);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for clipper2d.
    // Override with RUST_LOG env var (e.g. RUST_LOG=clipper2d=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("clipper2d=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match std::env::args().nth(1).as_deref() {
        Some("offset") => offset_demo(),
        _ => clip_demo(),
    }
}
