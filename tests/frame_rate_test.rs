use geoid::frame_rate::{DEFAULT_WINDOW, FrameRateEstimator};

#[test]
fn test_needs_two_samples() {
    let mut fps = FrameRateEstimator::default();
    assert_eq!(fps.current_fps(1000.0), 0.0);
    fps.record(10);
    assert_eq!(fps.current_fps(1000.0), 0.0);
    fps.record(20);
    assert!(fps.current_fps(1000.0) > 0.0);
}

#[test]
fn test_full_window_one_tick_apart() {
    let freq = 30.0;
    let mut fps = FrameRateEstimator::default();
    for t in 0..DEFAULT_WINDOW as i64 {
        fps.record(t);
    }
    assert_eq!(fps.len(), 25);
    let expected = 25.0 * freq / 24.0;
    assert!((fps.current_fps(freq) - expected).abs() < 1e-9);
}

#[test]
fn test_oldest_sample_is_evicted() {
    let mut fps = FrameRateEstimator::default();
    for t in 0..26 {
        fps.record(t * 2);
    }
    assert_eq!(fps.len(), 25);
    // window now spans 2..=50
    let expected = 25.0 * 1e9 / 48.0;
    assert!((fps.current_fps(1e9) - expected).abs() < 1e-3);
}

#[test]
fn test_non_positive_span() {
    let mut fps = FrameRateEstimator::default();
    for _ in 0..5 {
        fps.record(100);
    }
    assert_eq!(fps.current_fps(1e9), 0.0);

    let mut fps = FrameRateEstimator::default();
    fps.record(100);
    fps.record(50);
    assert_eq!(fps.current_fps(1e9), 0.0);
}

#[test]
fn test_clear_and_small_window() {
    let mut fps = FrameRateEstimator::new(0);
    fps.record(0);
    fps.record(10);
    fps.record(20);
    assert_eq!(fps.len(), 2);
    assert!((fps.current_fps(100.0) - 20.0).abs() < 1e-9);

    fps.clear();
    assert!(fps.is_empty());
    assert_eq!(fps.current_fps(100.0), 0.0);
}
