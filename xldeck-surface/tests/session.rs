//! Integration tests for the surface session.
//!
//! These drive a `DeckSurface` over the recording mock transport and check
//! the exact bytes that would reach the device, plus the events produced
//! from injected input reports.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::TryRecvError;

use xldeck_surface::icon::{HIGH_RES_LEN, LOW_RES_LEN};
use xldeck_surface::{
    CanonicalIcon, DeckSurface, EncoderConfig, IconEncoder, JpegIconEncoder, Rgb, SurfaceError,
    SurfaceEvent,
};
use xldeck_transport::mock::MockTransport;
use xldeck_transport::protocol::ImageFrameHeader;
use xldeck_transport::TransportError;

fn session() -> (Arc<MockTransport>, DeckSurface) {
    let mock = Arc::new(MockTransport::new());
    let surface = DeckSurface::with_transport(mock.clone()).unwrap();
    (mock, surface)
}

/// Encoder that records the canonical pixels it receives and emits a fixed
/// payload of `len` bytes
#[derive(Clone)]
struct RecordingEncoder {
    len: usize,
    seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingEncoder {
    fn new(len: usize) -> Self {
        Self {
            len,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl IconEncoder for RecordingEncoder {
    fn encode(&self, pixels: &[u8], _config: &EncoderConfig) -> Result<Vec<u8>, SurfaceError> {
        self.seen.lock().push(pixels.to_vec());
        Ok((0..self.len).map(|i| (i % 256) as u8).collect())
    }
}

fn input_report(pressed: &[usize]) -> Vec<u8> {
    let mut r = vec![0u8; 37];
    for &k in pressed {
        r[4 + k] = 1;
    }
    r
}

fn reassemble(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for frame in frames {
        let h = ImageFrameHeader::parse(frame).unwrap();
        out.extend_from_slice(&frame[8..8 + h.payload_len.get() as usize]);
    }
    out
}

// ── Rendering ──

#[test]
fn fill_color_streams_encoded_solid_icon() {
    let (mock, surface) = session();
    surface.fill_color(3, 10, 20, 30).unwrap();

    let expected = JpegIconEncoder
        .encode(
            CanonicalIcon::solid(Rgb::new(10, 20, 30)).as_bytes(),
            &EncoderConfig::default(),
        )
        .unwrap();

    let frames = mock.writes();
    assert_eq!(frames.len(), expected.len().div_ceil(1016));
    assert!(frames.iter().all(|f| f.len() == 1024));
    for (i, frame) in frames.iter().enumerate() {
        let h = ImageFrameHeader::parse(frame).unwrap();
        assert_eq!(h.key, 3);
        assert_eq!(h.sequence.get() as usize, i);
        assert_eq!(h.is_last(), i == frames.len() - 1);
    }
    assert_eq!(reassemble(&frames), expected);
}

#[test]
fn fill_color_hands_uniform_icon_to_encoder() {
    let (_mock, surface) = session();
    let encoder = RecordingEncoder::new(10);
    let surface = surface.with_encoder(encoder.clone());

    surface.fill_color(0, 1, 2, 3).unwrap();

    let seen = encoder.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), HIGH_RES_LEN);
    assert!(seen[0].chunks_exact(3).all(|p| p == [1, 2, 3]));
}

#[test]
fn multi_frame_payload_is_chunked_in_order() {
    let (mock, surface) = session();
    let surface = surface.with_encoder(RecordingEncoder::new(3000));

    surface.fill_color(31, 0, 0, 0).unwrap();

    let frames = mock.writes();
    assert_eq!(frames.len(), 3);
    assert_eq!(&frames[0][..8], &[0x02, 0x07, 31, 0, 0xF8, 0x03, 0, 0]);
    assert_eq!(&frames[1][..8], &[0x02, 0x07, 31, 0, 0xF8, 0x03, 1, 0]);
    // 3000 - 2 * 1016 = 968 = 0x03C8
    assert_eq!(&frames[2][..8], &[0x02, 0x07, 31, 1, 0xC8, 0x03, 2, 0]);
    assert!(frames[2][8 + 968..].iter().all(|&b| b == 0));
    assert_eq!(reassemble(&frames).len(), 3000);
}

#[test]
fn clear_key_matches_black_fill() {
    let (mock, surface) = session();
    for key in 0..32 {
        surface.fill_color(key, 0, 0, 0).unwrap();
        let black = mock.writes();
        mock.clear();

        surface.clear_key(key).unwrap();
        assert_eq!(mock.writes(), black, "key {key}");
        mock.clear();
    }
}

#[test]
fn clear_all_visits_keys_ascending() {
    let (mock, surface) = session();
    let surface = surface.with_encoder(RecordingEncoder::new(100));

    surface.clear_all().unwrap();

    let keys: Vec<u8> = mock
        .writes()
        .iter()
        .map(|f| ImageFrameHeader::parse(f).unwrap().key)
        .collect();
    assert_eq!(keys, (0..32).collect::<Vec<u8>>());
}

#[test]
fn fill_image_high_res_rotates_source() {
    let (_mock, surface) = session();
    let encoder = RecordingEncoder::new(10);
    let surface = surface.with_encoder(encoder.clone());

    let mut source = vec![0u8; HIGH_RES_LEN];
    source[..3].copy_from_slice(&[9, 8, 7]);
    surface.fill_image(0, &source).unwrap();

    let seen = encoder.seen.lock();
    let canonical = &seen[0];
    assert_eq!(&canonical[HIGH_RES_LEN - 3..], &[9, 8, 7]);
    assert!(canonical[..HIGH_RES_LEN - 3].iter().all(|&b| b == 0));
}

#[test]
fn fill_image_low_res_upscales_without_channel_swap() {
    let (_mock, surface) = session();
    let encoder = RecordingEncoder::new(10);
    let surface = surface.with_encoder(encoder.clone());

    // Source pixel (row 36, column 0)
    let mut source = vec![0u8; LOW_RES_LEN];
    let offset = 36 * 72 * 3;
    source[offset..offset + 3].copy_from_slice(&[1, 2, 3]);
    surface.fill_image(0, &source).unwrap();

    let seen = encoder.seen.lock();
    let icon = &seen[0];
    // Only destination row 48 rounds to source row 36 and only column 0
    // to source column 0; that pixel is written at index 47 * 96 + 95
    let pixel = |x: usize, y: usize| {
        let i = (y * 96 + x) * 3;
        [icon[i], icon[i + 1], icon[i + 2]]
    };
    assert_eq!(pixel(95, 95 - 48), [1, 2, 3]);
    assert_eq!(icon.iter().filter(|&&b| b != 0).count(), 3);
}

// ── Validation ──

#[test]
fn invalid_arguments_send_nothing() {
    let (mock, surface) = session();

    for key in [-1, 32] {
        assert!(matches!(
            surface.fill_color(key, 0, 0, 0),
            Err(SurfaceError::InvalidArgument(_))
        ));
        assert!(matches!(
            surface.clear_key(key),
            Err(SurfaceError::InvalidArgument(_))
        ));
        assert!(matches!(
            surface.fill_image(key, &[0u8; HIGH_RES_LEN]),
            Err(SurfaceError::InvalidArgument(_))
        ));
    }
    for channel in [-1, 256] {
        assert!(matches!(
            surface.fill_color(0, channel, 0, 0),
            Err(SurfaceError::InvalidArgument(_))
        ));
        assert!(matches!(
            surface.fill_color(0, 0, 0, channel),
            Err(SurfaceError::InvalidArgument(_))
        ));
    }
    assert!(matches!(
        surface.fill_image(0, &[0u8; 27360]),
        Err(SurfaceError::InvalidArgument(_))
    ));
    for percent in [150, -1, 101] {
        assert!(matches!(
            surface.set_brightness(percent),
            Err(SurfaceError::InvalidArgument(_))
        ));
    }

    assert!(mock.writes().is_empty());
    assert!(mock.feature_reports().is_empty());
}

// ── Panel control ──

#[test]
fn brightness_feature_report() {
    let (mock, surface) = session();
    surface.set_brightness(50).unwrap();
    surface.set_brightness(0).unwrap();
    surface.set_brightness(100).unwrap();

    let reports = mock.feature_reports();
    let mut expected = vec![0u8; 32];
    expected[..3].copy_from_slice(&[3, 8, 50]);
    assert_eq!(reports[0], expected);
    assert_eq!(&reports[1][..3], &[3, 8, 0]);
    assert_eq!(&reports[2][..3], &[3, 8, 100]);
    assert!(reports.iter().all(|r| r.len() == 32));
}

#[test]
fn reset_feature_report() {
    let (mock, surface) = session();
    surface.reset().unwrap();

    let mut expected = vec![0u8; 32];
    expected[..2].copy_from_slice(&[3, 2]);
    assert_eq!(mock.feature_reports(), vec![expected]);
}

#[test]
fn info_strings_are_read_at_fixed_offsets() {
    let (mock, surface) = session();
    let mut serial = vec![0x06, 0x0C];
    serial.extend_from_slice(b"AL12K2C01234");
    mock.set_feature_response(0x06, serial);
    let mut firmware = vec![0x05, 0x0C, 0xFE, 0x00, 0x00, 0x00];
    firmware.extend_from_slice(b"1.01.006");
    mock.set_feature_response(0x05, firmware);

    assert_eq!(surface.serial_number().unwrap(), "AL12K2C01234");
    assert_eq!(surface.firmware_version().unwrap(), "1.01.006");
}

// ── Transport failures ──

#[test]
fn write_error_aborts_remaining_frames() {
    let (mock, surface) = session();
    let surface = surface.with_encoder(RecordingEncoder::new(3000));
    mock.fail_write_at(1, TransportError::HidError("device gone".into()));

    let err = surface.fill_color(2, 0, 0, 0).unwrap_err();
    assert_eq!(
        err,
        SurfaceError::Transport(TransportError::HidError("device gone".into()))
    );
    assert_eq!(mock.writes().len(), 1);
}

#[test]
fn clear_all_stops_at_first_failure() {
    let (mock, surface) = session();
    let surface = surface.with_encoder(RecordingEncoder::new(100));
    mock.fail_write_at(5, TransportError::HidError("pipe".into()));

    assert!(surface.clear_all().is_err());
    let keys: Vec<u8> = mock
        .writes()
        .iter()
        .map(|f| ImageFrameHeader::parse(f).unwrap().key)
        .collect();
    assert_eq!(keys, vec![0, 1, 2, 3, 4]);
}

#[test]
fn feature_error_passes_through() {
    let (mock, surface) = session();
    mock.fail_features(TransportError::HidPermissionDenied("hidraw".into()));
    assert_eq!(
        surface.set_brightness(10).unwrap_err(),
        SurfaceError::Transport(TransportError::HidPermissionDenied("hidraw".into()))
    );
    assert!(surface.serial_number().is_err());
}

// ── Input events ──

#[test]
fn press_and_release_emit_events() {
    let (mock, surface) = session();
    let mut rx = surface.subscribe();

    mock.push_report(&input_report(&[]));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    mock.push_report(&input_report(&[4]));
    assert_eq!(rx.try_recv(), Ok(SurfaceEvent::KeyDown(4)));
    assert!(surface.key_states().is_pressed(4));

    mock.push_report(&input_report(&[4]));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

    mock.push_report(&input_report(&[]));
    assert_eq!(rx.try_recv(), Ok(SurfaceEvent::KeyUp(4)));
    assert!(!surface.key_states().is_pressed(4));
}

#[test]
fn one_report_emits_all_transitions_ascending() {
    let (mock, surface) = session();
    let mut rx = surface.subscribe();

    mock.push_report(&input_report(&[30, 2, 17]));
    assert_eq!(rx.try_recv(), Ok(SurfaceEvent::KeyDown(2)));
    assert_eq!(rx.try_recv(), Ok(SurfaceEvent::KeyDown(17)));
    assert_eq!(rx.try_recv(), Ok(SurfaceEvent::KeyDown(30)));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn malformed_report_is_dropped() {
    let (mock, surface) = session();
    let mut rx = surface.subscribe();

    mock.push_report(&input_report(&[1]));
    assert_eq!(rx.try_recv(), Ok(SurfaceEvent::KeyDown(1)));

    mock.push_report(&[0u8; 20]);
    assert_eq!(rx.try_recv(), Ok(SurfaceEvent::MalformedReport { len: 20 }));
    assert_eq!(surface.key_states().pressed(), vec![1]);
}

#[test]
fn reader_error_forwarded_unmodified() {
    let (mock, surface) = session();
    let mut rx = surface.subscribe();

    mock.push_error(TransportError::HidError("read failed".into()));
    assert_eq!(
        rx.try_recv(),
        Ok(SurfaceEvent::TransportError(TransportError::HidError(
            "read failed".into()
        )))
    );
}

#[test]
fn reader_start_failure_fails_session() {
    let mock = Arc::new(MockTransport::new());
    mock.fail_reader(TransportError::HidError("busy".into()));

    let err = DeckSurface::with_transport(mock.clone()).err();
    assert_eq!(
        err,
        Some(SurfaceError::Transport(TransportError::HidError(
            "busy".into()
        )))
    );
    assert!(!mock.has_sink());
}

#[test]
fn sessions_are_independent() {
    let (mock_a, surface_a) = session();
    let (mock_b, surface_b) = session();

    mock_a.push_report(&input_report(&[0]));
    assert!(surface_a.key_states().is_pressed(0));
    assert!(!surface_b.key_states().is_pressed(0));

    surface_b.set_brightness(20).unwrap();
    assert!(mock_a.feature_reports().is_empty());
    assert_eq!(mock_b.feature_reports().len(), 1);
}
