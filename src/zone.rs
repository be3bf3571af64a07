// src/zone.rs
//
// Quadrilateral region of interest. Containment uses an even-odd ray cast
// with an inclusive boundary: a point exactly on an edge or vertex counts
// as inside.

/// Number of vertices a zone must have before containment queries answer
/// anything but `false`.
pub const ZONE_VERTEX_COUNT: usize = 4;

/// Horizontal ray endpoint, far beyond any pixel coordinate.
const RAY_EXTREME_X: f32 = 1.0e6;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Default)]
pub struct ZonePolygon {
    vertices: Vec<(f32, f32)>,
}

impl ZonePolygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vertices(vertices: Vec<(f32, f32)>) -> Self {
        Self { vertices }
    }

    /// Append a vertex (interactive drawing adds points one by one).
    /// Points beyond the fourth are ignored.
    pub fn add_vertex(&mut self, x: f32, y: f32) {
        if self.vertices.len() < ZONE_VERTEX_COUNT {
            self.vertices.push((x, y));
        }
    }

    /// Remove the most recently added vertex.
    pub fn pop_vertex(&mut self) -> Option<(f32, f32)> {
        self.vertices.pop()
    }

    pub fn reset(&mut self) {
        self.vertices.clear();
    }

    pub fn set_vertices(&mut self, vertices: Vec<(f32, f32)>) {
        self.vertices = vertices;
    }

    pub fn vertices(&self) -> &[(f32, f32)] {
        &self.vertices
    }

    /// A zone is usable only with exactly four vertices.
    pub fn is_complete(&self) -> bool {
        self.vertices.len() == ZONE_VERTEX_COUNT
    }

    /// Even-odd containment test. An incomplete zone contains nothing.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        if !self.is_complete() {
            return false;
        }

        let n = self.vertices.len();
        let mut intersections = 0;
        let mut previous = 0;

        loop {
            let current = (previous + 1) % n;
            let (px, py) = self.vertices[previous];
            let (cx, cy) = self.vertices[current];

            if segments_intersect(px, py, cx, cy, x, y, RAY_EXTREME_X, y) {
                // A point collinear with an edge is inside exactly when it
                // lies on that edge segment.
                if orientation(px, py, x, y, cx, cy) == Orientation::Collinear {
                    return on_segment(px, py, x, y, cx, cy);
                }
                intersections += 1;
            }

            previous = current;
            if previous == 0 {
                break;
            }
        }

        intersections % 2 == 1
    }

    /// Midpoint of a bounding box's bottom edge: the object's approximate
    /// ground-contact point, which is what should be tested against a
    /// ground-plane region (not the box centroid).
    pub fn bbox_bottom_center(bbox: &[f32; 4]) -> (f32, f32) {
        ((bbox[0] + bbox[2]) / 2.0, bbox[3])
    }

    /// Whether a bounding box's bottom center lies inside the zone.
    pub fn contains_bbox(&self, bbox: &[f32; 4]) -> bool {
        let (cx, cy) = Self::bbox_bottom_center(bbox);
        self.contains_point(cx, cy)
    }
}

fn orientation(px: f32, py: f32, qx: f32, qy: f32, rx: f32, ry: f32) -> Orientation {
    let val = (qy - py) * (rx - qx) - (qx - px) * (ry - qy);
    if val == 0.0 {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether q lies on the segment p..r, assuming the three are collinear.
fn on_segment(px: f32, py: f32, qx: f32, qy: f32, rx: f32, ry: f32) -> bool {
    qx <= px.max(rx) && qx >= px.min(rx) && qy <= py.max(ry) && qy >= py.min(ry)
}

fn segments_intersect(
    p1x: f32,
    p1y: f32,
    q1x: f32,
    q1y: f32,
    p2x: f32,
    p2y: f32,
    q2x: f32,
    q2y: f32,
) -> bool {
    let o1 = orientation(p1x, p1y, q1x, q1y, p2x, p2y);
    let o2 = orientation(p1x, p1y, q1x, q1y, q2x, q2y);
    let o3 = orientation(p2x, p2y, q2x, q2y, p1x, p1y);
    let o4 = orientation(p2x, p2y, q2x, q2y, q1x, q1y);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Collinear special cases: an endpoint of one segment lies on the other.
    (o1 == Orientation::Collinear && on_segment(p1x, p1y, p2x, p2y, q1x, q1y))
        || (o2 == Orientation::Collinear && on_segment(p1x, p1y, q2x, q2y, q1x, q1y))
        || (o3 == Orientation::Collinear && on_segment(p2x, p2y, p1x, p1y, q2x, q2y))
        || (o4 == Orientation::Collinear && on_segment(p2x, p2y, q1x, q1y, q2x, q2y))
}
