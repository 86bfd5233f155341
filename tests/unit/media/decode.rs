use super::*;

#[test]
fn read_full_reports_partial_reads() {
    let data = [1u8, 2, 3];
    let mut buf = [0u8; 5];
    let n = read_full(&mut &data[..], &mut buf).unwrap();
    assert_eq!(n, 3);
    assert_eq!(&buf[..3], &data);

    let mut empty: &[u8] = &[];
    assert_eq!(read_full(&mut empty, &mut buf).unwrap(), 0);
}

#[test]
fn in_memory_source_yields_in_order_then_none() {
    let size = FrameSize::new(2, 2);
    let frames: Vec<FrameRGBA> = (0..3u8)
        .map(|i| FrameRGBA::solid(size, [i, i, i, 255]))
        .collect();
    let mut src = InMemoryFrameSource::new(size, frames).unwrap();
    assert_eq!(src.frame_size(), size);

    let head = take_frames(&mut src, 2).unwrap();
    assert_eq!(head.len(), 2);
    assert_eq!(head[1].data[0], 1);
    assert_eq!(src.next_frame().unwrap().unwrap().data[0], 2);
    assert!(src.next_frame().unwrap().is_none());

    src.close().unwrap();
    assert!(src.is_closed());
    assert!(src.next_frame().is_err());
}

#[test]
fn in_memory_source_rejects_mismatched_frames() {
    let size = FrameSize::new(2, 2);
    let wrong = FrameRGBA::solid(FrameSize::new(3, 2), [0, 0, 0, 255]);
    assert!(InMemoryFrameSource::new(size, vec![wrong]).is_err());
}

#[test]
fn take_frames_stops_at_end_of_stream() {
    let size = FrameSize::new(1, 1);
    let mut src =
        InMemoryFrameSource::new(size, vec![FrameRGBA::solid(size, [0, 0, 0, 255])]).unwrap();
    assert_eq!(take_frames(&mut src, 3).unwrap().len(), 1);
}
