//! Content heuristics that guess the upright orientation of a clip whose metadata says nothing.
//!
//! Each heuristic scores all four candidate rotations of a few sampled frames and only
//! proposes a non-zero rotation when the best score beats the 0° score by its margin.

use crate::foundation::core::{FrameSize, Rotation};
use crate::media::frame::rotate_image;

/// Sobel magnitude (`|gx| + |gy|`) above which a pixel counts as an edge.
pub const EDGE_THRESHOLD: u32 = 96;

/// A ranked orientation heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    /// Strong portrait bonus plus a bright-center bonus. Tuned for phone footage stored
    /// landscape.
    PortraitPrior,
    /// Mild portrait bonus plus a bonus when vertical edges dominate.
    EdgeBalance,
}

impl HeuristicKind {
    /// Relative margin the best score must exceed the 0° score by.
    pub fn margin(self) -> f64 {
        match self {
            Self::PortraitPrior => 1.5,
            Self::EdgeBalance => 1.3,
        }
    }

    fn portrait_bonus(self) -> f64 {
        match self {
            Self::PortraitPrior => 2.0,
            Self::EdgeBalance => 1.2,
        }
    }

    /// Score one (already rotated) sample.
    pub fn score(self, stats: &EdgeStats) -> f64 {
        let mut score = stats.center_edge_density * 1000.0;
        if stats.portrait {
            score *= self.portrait_bonus();
        }
        match self {
            Self::PortraitPrior => {
                if stats.center_brightness > 80.0 {
                    score *= 1.2;
                }
            }
            Self::EdgeBalance => {
                if stats.vertical_edge_energy > stats.horizontal_edge_energy * 1.1 {
                    score *= 1.1;
                }
            }
        }
        score
    }
}

impl std::fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PortraitPrior => f.write_str("portrait_prior"),
            Self::EdgeBalance => f.write_str("edge_balance"),
        }
    }
}

/// Edge and brightness measurements of one luma image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeStats {
    /// Fraction of edge pixels inside the central `[1/4, 3/4)` region.
    pub center_edge_density: f64,
    /// Mean luma inside the central region.
    pub center_brightness: f64,
    /// Sum of `|gx|`: energy of vertical edges.
    pub vertical_edge_energy: f64,
    /// Sum of `|gy|`: energy of horizontal edges.
    pub horizontal_edge_energy: f64,
    /// `width < height`.
    pub portrait: bool,
}

/// Measure `luma` with a 3x3 Sobel operator; border pixels are skipped.
pub fn edge_stats(luma: &image::GrayImage) -> EdgeStats {
    let (w, h) = luma.dimensions();
    let portrait = FrameSize::new(w, h).is_portrait();
    if w < 3 || h < 3 {
        return EdgeStats {
            portrait,
            ..EdgeStats::default()
        };
    }

    let (cx0, cx1) = (w / 4, 3 * w / 4);
    let (cy0, cy1) = (h / 4, 3 * h / 4);
    let px = |x: u32, y: u32| i32::from(luma.get_pixel(x, y).0[0]);

    let mut center_edges = 0u64;
    let mut center_pixels = 0u64;
    let mut center_luma = 0u64;
    let mut gx_sum = 0u64;
    let mut gy_sum = 0u64;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            let gy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
            gx_sum += u64::from(gx.unsigned_abs());
            gy_sum += u64::from(gy.unsigned_abs());

            if (cx0..cx1).contains(&x) && (cy0..cy1).contains(&y) {
                center_pixels += 1;
                center_luma += px(x, y) as u64;
                if gx.unsigned_abs() + gy.unsigned_abs() > EDGE_THRESHOLD {
                    center_edges += 1;
                }
            }
        }
    }

    let (center_edge_density, center_brightness) = if center_pixels == 0 {
        (0.0, 0.0)
    } else {
        (
            center_edges as f64 / center_pixels as f64,
            center_luma as f64 / center_pixels as f64,
        )
    };

    EdgeStats {
        center_edge_density,
        center_brightness,
        vertical_edge_energy: gx_sum as f64,
        horizontal_edge_energy: gy_sum as f64,
        portrait,
    }
}

/// Accumulated score per candidate rotation, indexed in [`Rotation::ALL`] order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationScores(pub [f64; 4]);

impl RotationScores {
    /// Score of one rotation.
    pub fn get(&self, rotation: Rotation) -> f64 {
        self.0[slot(rotation)]
    }

    /// Add to the score of one rotation.
    pub fn add(&mut self, rotation: Rotation, score: f64) {
        self.0[slot(rotation)] += score;
    }
}

fn slot(rotation: Rotation) -> usize {
    match rotation {
        Rotation::Deg0 => 0,
        Rotation::Deg90 => 1,
        Rotation::Deg180 => 2,
        Rotation::Deg270 => 3,
    }
}

/// Pick the best rotation; ties go to the smaller angle. Non-zero only when the best score
/// is strictly greater than `margin` times the 0° score.
pub fn decide(scores: &RotationScores, margin: f64) -> Rotation {
    let mut best = Rotation::Deg0;
    for r in Rotation::ALL {
        if scores.get(r) > scores.get(best) {
            best = r;
        }
    }
    if best != Rotation::Deg0 && scores.get(best) > scores.get(Rotation::Deg0) * margin {
        best
    } else {
        Rotation::Deg0
    }
}

/// Outcome of running one heuristic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Heuristic that produced the scores.
    pub kind: HeuristicKind,
    /// Summed scores across samples.
    pub scores: RotationScores,
    /// Decision under the heuristic's margin.
    pub rotation: Rotation,
}

/// Score every rotation of each raw sample and decide.
pub fn detect(kind: HeuristicKind, samples: &[image::GrayImage]) -> Detection {
    let mut scores = RotationScores::default();
    for sample in samples {
        for r in Rotation::ALL {
            let stats = edge_stats(&rotate_image(sample, r));
            scores.add(r, kind.score(&stats));
        }
    }
    let rotation = decide(&scores, kind.margin());
    tracing::debug!(
        heuristic = %kind,
        rotation = rotation.degrees(),
        scores = ?scores.0,
        "orientation heuristic scored"
    );
    Detection {
        kind,
        scores,
        rotation,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/orient/heuristic.rs"]
mod tests;
