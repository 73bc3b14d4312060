//! Single-frame pose classification by counting extended fingers.
//!
//! Stateless. Temporal smoothing belongs to the stability filter.

use thiserror::Error;

use crate::gesture::GestureLabel;
use crate::landmarks::{
    LandmarkSample, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP,
    PINKY_TIP, RING_PIP, RING_TIP, THUMB_IP, THUMB_TIP,
};

/// (tip, pip) pairs for the four long fingers.
const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed sample: expected {expected} landmarks, got {actual}")]
pub struct MalformedSampleError {
    pub expected: usize,
    pub actual: usize,
}

/// Classify one hand sample.
///
/// Assumes the hand is presented palm-forward and the image is not mirrored:
/// the thumb counts as extended when its tip lies left of its IP joint, and a
/// long finger when its tip is above (smaller y than) its PIP joint.
pub fn classify(sample: &LandmarkSample) -> Result<GestureLabel, MalformedSampleError> {
    Ok(GestureLabel::from_finger_count(extended_count(sample)?))
}

/// Number of extended fingers, 0..=5.
pub fn extended_count(sample: &LandmarkSample) -> Result<usize, MalformedSampleError> {
    let point = |index: usize| {
        sample.get(index).ok_or(MalformedSampleError {
            expected: LANDMARK_COUNT,
            actual: sample.len(),
        })
    };

    if sample.len() < LANDMARK_COUNT {
        return Err(MalformedSampleError {
            expected: LANDMARK_COUNT,
            actual: sample.len(),
        });
    }

    let thumb_extended = point(THUMB_TIP)?.x < point(THUMB_IP)?.x;

    let mut count = usize::from(thumb_extended);
    for (tip, pip) in FINGERS {
        if point(tip)?.y < point(pip)?.y {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::landmarks::{Landmark, LandmarkSample, LANDMARK_COUNT, THUMB_IP, THUMB_TIP};

    use super::FINGERS;

    /// Build a sample with the thumb and the first `long_fingers` long
    /// fingers extended. Everything else is curled.
    pub fn hand(thumb: bool, long_fingers: usize) -> LandmarkSample {
        let mut points = vec![Landmark { x: 0.5, y: 0.5, z: 0.0 }; LANDMARK_COUNT];

        points[THUMB_IP] = Landmark { x: 0.40, y: 0.55, z: 0.0 };
        points[THUMB_TIP].y = 0.55;
        points[THUMB_TIP].x = if thumb { 0.33 } else { 0.45 };

        for (i, (tip, pip)) in FINGERS.into_iter().enumerate() {
            points[pip].y = 0.40;
            points[tip].y = if i < long_fingers { 0.25 } else { 0.48 };
        }
        LandmarkSample::new(points)
    }

    /// A sample with exactly `n` extended fingers, thumb first.
    pub fn fingers_up(n: usize) -> LandmarkSample {
        if n == 0 {
            hand(false, 0)
        } else {
            hand(true, n - 1)
        }
    }
}
