use serde::Deserialize;

/// Number of landmarks a complete hand sample carries.
pub const LANDMARK_COUNT: usize = 21;

// MediaPipe hand layout: 0 is the wrist, then four points per finger from
// the base outwards (thumb: CMC, MCP, IP, tip; others: MCP, PIP, DIP, tip).
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// A single tracked point, normalized to the frame (x right, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// The landmarks of one hand for one processed frame.
///
/// The point count is not checked here; a short sample is still a sample
/// and it is up to the classifier to reject it.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSample {
    points: Vec<Landmark>,
}

impl LandmarkSample {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }
}

/// Provider output accepts `[x, y]`, `[x, y, z]` or `{"x":..,"y":..,"z":..}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair([f32; 2]),
    Triple([f32; 3]),
    Object {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
}

impl From<RawPoint> for Landmark {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Pair([x, y]) => Landmark { x, y, z: 0.0 },
            RawPoint::Triple([x, y, z]) => Landmark { x, y, z },
            RawPoint::Object { x, y, z } => Landmark { x, y, z },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFrame {
    Points(Vec<RawPoint>),
    Wrapped { landmarks: Option<Vec<RawPoint>> },
}

/// Decode one line of provider output.
///
/// Returns `Ok(None)` when the frame carries no hand (`null`, `[]`, blank
/// line, or `{"landmarks": null}`).
pub fn parse_line(line: &str) -> Result<Option<LandmarkSample>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let frame: Option<RawFrame> = serde_json::from_str(line)?;
    let points = match frame {
        Some(RawFrame::Points(points)) => points,
        Some(RawFrame::Wrapped {
            landmarks: Some(points),
        }) => points,
        _ => return Ok(None),
    };

    if points.is_empty() {
        return Ok(None);
    }

    Ok(Some(LandmarkSample::new(
        points.into_iter().map(Landmark::from).collect(),
    )))
}
