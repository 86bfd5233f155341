use super::*;
use crate::foundation::core::FrameSize;
use crate::media::decode::InMemoryFrameSource;
use crate::pose::landmark::{LANDMARK_COUNT, Landmark};

fn records(n: u64) -> Vec<PoseFrame> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                PoseFrame::detected(
                    FrameIndex(i),
                    vec![Landmark::new(0.5, 0.5, 0.0, 0.9); LANDMARK_COUNT],
                )
            } else {
                PoseFrame::undetected(FrameIndex(i))
            }
        })
        .collect()
}

#[test]
fn targets_are_evenly_spaced_and_unique() {
    let frames = records(10);
    let picked: Vec<u64> = preview_targets(&frames, 5)
        .iter()
        .map(|f| f.frame_index.0)
        .collect();
    assert_eq!(picked, vec![0, 2, 4, 6, 8]);

    let few = records(2);
    assert_eq!(preview_targets(&few, 5).len(), 2);
    assert!(preview_targets(&few, 0).is_empty());
    assert!(preview_targets(&[], 3).is_empty());
}

#[test]
fn only_detected_targets_are_annotated() {
    let size = FrameSize::new(16, 8);
    let frames: Vec<FrameRGBA> = (0..10).map(|_| FrameRGBA::solid(size, [0, 0, 0, 255])).collect();
    let mut source = InMemoryFrameSource::new(size, frames).unwrap();
    let poses = records(10);
    let targets = vec![&poses[1], &poses[4], &poses[6]];
    let out = annotate_targets(
        &mut source,
        &targets,
        &OverlayOpts::default(),
        Fps::new(30, 1).unwrap(),
        Rotation::Deg90,
    )
    .unwrap();
    let indices: Vec<u64> = out.iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, vec![4, 6]);
    assert_eq!(out[0].1.size(), FrameSize::new(8, 16));
}

#[test]
fn short_video_yields_what_it_has() {
    let size = FrameSize::new(8, 8);
    let frames = vec![FrameRGBA::solid(size, [0, 0, 0, 255]); 3];
    let mut source = InMemoryFrameSource::new(size, frames).unwrap();
    let poses = records(10);
    let targets = vec![&poses[2], &poses[8]];
    let out = annotate_targets(
        &mut source,
        &targets,
        &OverlayOpts::default(),
        Fps::new(30, 1).unwrap(),
        Rotation::Deg0,
    )
    .unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn png_is_written_with_parent_dirs() {
    let dir = std::env::temp_dir().join("crux_overlay_preview_png/nested");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("f.png");
    save_png(&path, &FrameRGBA::solid(FrameSize::new(4, 2), [1, 2, 3, 255])).unwrap();
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);
}
