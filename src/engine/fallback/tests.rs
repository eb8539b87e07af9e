use super::*;
use std::path::Path;

const WIDTH: usize = 4;
const HEIGHT: usize = 2;
const FRAME_SIZE: usize = WIDTH * HEIGHT * 3 / 2;

/// Build a 4x2 4:2:0 stream whose frame `i` is filled with byte `i`
fn build_y4m(rate: &str, frames: usize) -> Vec<u8> {
    let mut data = format!("YUV4MPEG2 W{} H{} F{} Ip A1:1 C420jpeg\n", WIDTH, HEIGHT, rate)
        .into_bytes();
    for i in 0..frames {
        data.extend_from_slice(b"FRAME\n");
        data.extend(std::iter::repeat((i % 256) as u8).take(FRAME_SIZE));
    }
    data
}

/// Frame fill bytes of a written `.y4m` file, in order
fn captured_frames(path: &Path) -> Vec<u8> {
    let mut source = Y4mSource::open(path);
    let metadata = source.load_metadata().unwrap();
    assert_eq!(metadata.frame_rate, CAPTURE_RATE);
    let mut fills = Vec::new();
    for i in 0..source.frame_count() {
        source.seek(i as f64 / 30.0).unwrap();
        fills.push(source.current_frame().unwrap()[0]);
    }
    fills
}

#[test]
fn test_y4m_trim_captures_requested_range() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.y4m");

    let trimmer = FallbackTrimmer::new(
        Y4mSource::from_bytes(build_y4m("30:1", 60)),
        Y4mSink::create(&output),
        0.5,
        1.0,
    )
    .unwrap();
    assert_eq!(trimmer.max_frames(), 15);

    let path = trimmer.trim().unwrap();
    assert_eq!(path, output);

    let header = std::fs::read_to_string(&output).unwrap();
    assert!(header.starts_with("YUV4MPEG2 W4 H2 F30:1 Ip A1:1 C420jpeg\n"));
    assert_eq!(captured_frames(&output), (15u8..30).collect::<Vec<_>>());
}

#[test]
fn test_low_rate_source_is_resampled_to_capture_rate() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.y4m");

    FallbackTrimmer::new(
        Y4mSource::from_bytes(build_y4m("15:1", 30)),
        Y4mSink::create(&output),
        0.0,
        1.0,
    )
    .unwrap()
    .trim()
    .unwrap();

    let expected: Vec<u8> = (0..30u8).map(|k| k / 2).collect();
    assert_eq!(captured_frames(&output), expected);
}

#[test]
fn test_state_transitions() {
    let dir = tempfile::tempdir().unwrap();
    let mut trimmer = FallbackTrimmer::new(
        Y4mSource::from_bytes(build_y4m("30:1", 30)),
        Y4mSink::create(dir.path().join("out.y4m")),
        0.0,
        0.5,
    )
    .unwrap();

    assert_eq!(trimmer.state(), FallbackState::Idle);
    assert!(matches!(trimmer.step(), Err(DomainError::Capture(_))));
    assert_eq!(trimmer.state(), FallbackState::Idle);

    trimmer.load_metadata().unwrap();
    assert_eq!(trimmer.state(), FallbackState::MetadataLoaded);
    assert!((trimmer.metadata().unwrap().duration - 1.0).abs() < 1e-9);

    trimmer.begin_seek().unwrap();
    assert_eq!(trimmer.state(), FallbackState::Seeking);

    trimmer.start_capture().unwrap();
    assert_eq!(trimmer.state(), FallbackState::Capturing);

    while !trimmer.step().unwrap() {
        assert!(trimmer.position() < 0.5);
    }
    assert_eq!(trimmer.frames_captured(), 15);
    assert!(trimmer.position() <= 0.5);

    trimmer.finalize().unwrap();
    assert_eq!(trimmer.state(), FallbackState::Finalized);
}

#[test]
fn test_metadata_failure_is_terminal_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.y4m");
    let mut trimmer = FallbackTrimmer::new(
        Y4mSource::from_bytes(b"RIFF not a y4m stream\n".to_vec()),
        Y4mSink::create(&output),
        0.0,
        1.0,
    )
    .unwrap();

    assert!(matches!(trimmer.load_metadata(), Err(DomainError::Decode(_))));
    assert_eq!(trimmer.state(), FallbackState::Failed);
    assert!(trimmer.load_metadata().is_err());
    assert!(!output.exists());
}

#[test]
fn test_missing_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = FallbackTrimmer::new(
        Y4mSource::open(dir.path().join("missing.y4m")),
        Y4mSink::create(dir.path().join("out.y4m")),
        0.0,
        1.0,
    )
    .unwrap()
    .trim();
    assert!(matches!(result, Err(DomainError::Decode(_))));
}

#[test]
fn test_oversized_header_is_decode_error() {
    let mut data = b"YUV4MPEG2 W4294967295 H4294967295 F30:1 C420jpeg\nFRAME\n".to_vec();
    data.extend_from_slice(&[0u8; FRAME_SIZE]);
    let mut source = Y4mSource::from_bytes(data);

    match source.load_metadata() {
        Err(DomainError::Decode(message)) => assert!(message.contains("overflows")),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_range_checked_against_source_duration() {
    let dir = tempfile::tempdir().unwrap();
    let result = FallbackTrimmer::new(
        Y4mSource::from_bytes(build_y4m("30:1", 30)),
        Y4mSink::create(dir.path().join("out.y4m")),
        0.5,
        2.0,
    )
    .unwrap()
    .trim();
    assert!(matches!(result, Err(DomainError::Range(_))));

    assert!(matches!(
        FallbackTrimmer::new(
            Y4mSource::from_bytes(Vec::new()),
            Y4mSink::create(dir.path().join("x.y4m")),
            5.0,
            5.0,
        ),
        Err(DomainError::Range(_))
    ));
}

#[test]
fn test_dropping_mid_capture_releases_sink() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.y4m");
    {
        let mut trimmer = FallbackTrimmer::new(
            Y4mSource::from_bytes(build_y4m("30:1", 60)),
            Y4mSink::create(&output),
            0.0,
            1.5,
        )
        .unwrap();
        trimmer.load_metadata().unwrap();
        trimmer.begin_seek().unwrap();
        trimmer.start_capture().unwrap();
        trimmer.step().unwrap();
        assert!(output.exists());
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_async_run_completes() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.y4m");
    let (_tx, rx) = watch::channel(false);

    let path = FallbackTrimmer::new(
        Y4mSource::from_bytes(build_y4m("30:1", 30)),
        Y4mSink::create(&output),
        0.0,
        0.5,
    )
    .unwrap()
    .run(rx)
    .await
    .unwrap();

    assert_eq!(captured_frames(&path).len(), 15);
}

#[tokio::test]
async fn test_cancelled_run_releases_capture() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.y4m");
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let result = FallbackTrimmer::new(
        Y4mSource::from_bytes(build_y4m("30:1", 30)),
        Y4mSink::create(&output),
        0.0,
        0.5,
    )
    .unwrap()
    .with_pacing()
    .run(rx)
    .await;

    assert!(matches!(result, Err(DomainError::Capture(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_async_read_loads_stream() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.y4m");
    std::fs::write(&input, build_y4m("30:1", 6)).unwrap();

    let mut source = Y4mSource::read(&input).await.unwrap();
    let metadata = source.load_metadata().unwrap();
    assert_eq!(metadata.frame_rate, CAPTURE_RATE);
    assert_eq!(source.frame_count(), 6);

    let missing = Y4mSource::read(dir.path().join("missing.y4m")).await;
    assert!(matches!(missing, Err(DomainError::Decode(_))));
}
