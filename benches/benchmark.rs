use criterion::{Criterion, black_box, criterion_group, criterion_main};
use geoid::features::{BruteForceMatcher, FastBriefExtractor, FeatureExtractor, FeatureMatcher};
use geoid::resolution::{CameraResolution, MAX_CAPTURE_HEIGHT, calc_optimal_camera_resolution};
use geoid::{FeatureConfig, Frame};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

fn checker_frame(shift: i32) -> Frame {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([20, 20, 20]));
    for row in 0..8 {
        for col in 0..10 {
            if (row + col) % 2 == 0 {
                draw_filled_rect_mut(
                    &mut img,
                    Rect::at(40 + col * 56 + shift, 30 + row * 52).of_size(30, 30),
                    Rgb([230, 230, 230]),
                );
            }
        }
    }
    Frame::new(img, 0)
}

fn bench_resolution_negotiation(c: &mut Criterion) {
    let supported = "160x120,176x144,320x240,352x288,640x360,640x480,800x600,1024x768,\
                     1280x720,1280x960,1600x1200,1920x1080,2592x1944";
    let target = CameraResolution::new(1280, 800);
    c.bench_function("calc_optimal_camera_resolution", |b| {
        b.iter(|| {
            calc_optimal_camera_resolution(black_box(supported), target, MAX_CAPTURE_HEIGHT)
        })
    });
}

fn bench_extract_and_match(c: &mut Criterion) {
    let extractor = FastBriefExtractor::new(&FeatureConfig::default());
    let reference_frame = checker_frame(0);
    let query_frame = checker_frame(3);

    c.bench_function("fast_brief_extract", |b| {
        b.iter(|| extractor.extract(black_box(&query_frame), None))
    });

    let reference = extractor.extract(&reference_frame, None);
    let query = extractor.extract(&query_frame, None);
    c.bench_function("brute_force_match", |b| {
        b.iter(|| BruteForceMatcher.match_sets(black_box(&query), black_box(&reference)))
    });
}

criterion_group!(benches, bench_resolution_negotiation, bench_extract_and_match);
criterion_main!(benches);
