//! Dominant-axis line walk
//!
//! A segment is parametrised along whichever axis it spans most, `y = kx + b`
//! or `x = ky + b`, and walked one unit at a time along that axis.

use super::object::BBox;

/// Parametrisation along the axis with the larger extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DominantAxis {
    /// `y = k*x + b`
    X { k: f32, b: f32 },
    /// `x = k*y + b`
    Y { k: f32, b: f32 },
}

impl DominantAxis {
    /// Point on the line at parameter `t` along the dominant axis
    pub fn point_at(&self, t: f32) -> (f32, f32) {
        match *self {
            DominantAxis::X { k, b } => (t, k * t + b),
            DominantAxis::Y { k, b } => (k * t + b, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Segment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_point(&self) -> bool {
        self.x1 == self.x2 && self.y1 == self.y2
    }

    /// `None` for a degenerate segment
    pub fn axis(&self) -> Option<DominantAxis> {
        let dx = self.x2 - self.x1;
        let dy = self.y2 - self.y1;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            let k = dy / dx;
            Some(DominantAxis::X { k, b: self.y1 - k * self.x1 })
        } else {
            let k = dx / dy;
            Some(DominantAxis::Y { k, b: self.x1 - k * self.y1 })
        }
    }

    /// Range covered along the dominant axis, low end first
    fn span(&self, axis: &DominantAxis) -> (f32, f32) {
        let (a, b) = match axis {
            DominantAxis::X { .. } => (self.x1, self.x2),
            DominantAxis::Y { .. } => (self.y1, self.y2),
        };
        (a.min(b), a.max(b))
    }

    /// Walk the whole segment, both end points included
    pub fn walk(&self) -> LineWalk {
        match self.axis() {
            Some(axis) => {
                let (from, to) = self.span(&axis);
                LineWalk { axis, t: from, end: to, done: false }
            }
            None => LineWalk::single(self.x1, self.y1),
        }
    }

    /// Walk only the part of the segment whose dominant coordinate lies
    /// inside the box's range on that axis
    pub fn walk_clipped(&self, bbox: &BBox) -> LineWalk {
        let Some(axis) = self.axis() else {
            return LineWalk::single(self.x1, self.y1);
        };
        let (lo, hi) = self.span(&axis);
        let (min, max) = match axis {
            DominantAxis::X { .. } => (bbox.left as f32, bbox.right as f32),
            DominantAxis::Y { .. } => (bbox.top as f32, bbox.bottom as f32),
        };
        // Keep the walk on the same unit lattice as the unclipped one
        let from = if lo < min { lo + (min - lo).ceil() } else { lo };
        let to = hi.min(max + 1.0);
        LineWalk { axis, t: from, end: to, done: from > to }
    }

    /// Cheap rejection: the segment's own box misses `bbox`
    pub fn separated_from(&self, bbox: &BBox) -> bool {
        let (l, r) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (t, b) = (self.y1.min(self.y2), self.y1.max(self.y2));
        r < bbox.left as f32 || l > bbox.right as f32 + 1.0 || b < bbox.top as f32 || t > bbox.bottom as f32 + 1.0
    }

    /// True when the segment crosses an edge of `bbox` or lies inside it
    pub fn touches(&self, bbox: &BBox) -> bool {
        let (left, right) = (bbox.left as f32, bbox.right as f32 + 1.0);
        let (top, bottom) = (bbox.top as f32, bbox.bottom as f32 + 1.0);

        let inside = |x: f32, y: f32| x >= left && x <= right && y >= top && y <= bottom;
        if inside(self.x1, self.y1) || inside(self.x2, self.y2) {
            return true;
        }

        let Some(axis) = self.axis() else {
            return false;
        };

        let (x_lo, x_hi) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (y_lo, y_hi) = (self.y1.min(self.y2), self.y1.max(self.y2));

        match axis {
            DominantAxis::X { k, b } => {
                // Vertical edges, then horizontal edges (skipped for a flat line)
                for ex in [left, right] {
                    if ex >= x_lo && ex <= x_hi {
                        let y = k * ex + b;
                        if y >= top && y <= bottom {
                            return true;
                        }
                    }
                }
                if k != 0.0 {
                    for ey in [top, bottom] {
                        if ey >= y_lo && ey <= y_hi {
                            let x = (ey - b) / k;
                            if x >= left && x <= right {
                                return true;
                            }
                        }
                    }
                }
            }
            DominantAxis::Y { k, b } => {
                for ey in [top, bottom] {
                    if ey >= y_lo && ey <= y_hi {
                        let x = k * ey + b;
                        if x >= left && x <= right {
                            return true;
                        }
                    }
                }
                if k != 0.0 {
                    for ex in [left, right] {
                        if ex >= x_lo && ex <= x_hi {
                            let y = (ex - b) / k;
                            if y >= top && y <= bottom {
                                return true;
                            }
                        }
                    }
                }
            }
        }
        false
    }
}

/// Iterator over points one dominant-axis unit apart
#[derive(Debug, Clone)]
pub struct LineWalk {
    axis: DominantAxis,
    t: f32,
    end: f32,
    done: bool,
}

impl LineWalk {
    fn single(x: f32, y: f32) -> Self {
        // X axis with k = 0 and b = y yields (x, y) at t = x
        LineWalk {
            axis: DominantAxis::X { k: 0.0, b: y },
            t: x,
            end: x,
            done: false,
        }
    }
}

impl Iterator for LineWalk {
    type Item = (f32, f32);

    fn next(&mut self) -> Option<(f32, f32)> {
        if self.done || self.t > self.end {
            return None;
        }
        let p = self.axis.point_at(self.t);
        self.t += 1.0;
        Some(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_horizontal() {
        let pts: Vec<_> = Segment::new(0.0, 5.0, 3.0, 5.0).walk().collect();
        assert_eq!(pts, vec![(0.0, 5.0), (1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]);
    }

    #[test]
    fn test_walk_reversed_covers_same_points() {
        let mut a: Vec<_> = Segment::new(0.0, 0.0, 4.0, 8.0).walk().collect();
        let mut b: Vec<_> = Segment::new(4.0, 8.0, 0.0, 0.0).walk().collect();
        a.sort_by(|p, q| p.1.partial_cmp(&q.1).unwrap());
        b.sort_by(|p, q| p.1.partial_cmp(&q.1).unwrap());
        assert_eq!(a, b);
        assert_eq!(a.len(), 9);
        assert_eq!(a[2], (1.0, 2.0));
    }

    #[test]
    fn test_degenerate_walk_yields_point() {
        let pts: Vec<_> = Segment::new(7.0, 9.0, 7.0, 9.0).walk().collect();
        assert_eq!(pts, vec![(7.0, 9.0)]);
    }

    #[test]
    fn test_touches_box() {
        let bbox = BBox::new(10, 19, 10, 19);
        // Passes straight through
        assert!(Segment::new(0.0, 15.0, 30.0, 15.0).touches(&bbox));
        // Diagonal clipping a corner
        assert!(Segment::new(5.0, 16.0, 16.0, 5.0).touches(&bbox));
        // Fully inside
        assert!(Segment::new(12.0, 12.0, 14.0, 13.0).touches(&bbox));
        // Above the box
        assert!(!Segment::new(0.0, 5.0, 30.0, 8.0).touches(&bbox));
        assert!(Segment::new(0.0, 5.0, 30.0, 8.0).separated_from(&bbox));
    }

    #[test]
    fn test_clipped_walk_stays_on_lattice() {
        let seg = Segment::new(0.5, 0.0, 40.5, 0.0);
        let bbox = BBox::new(10, 12, -5, 5);
        let xs: Vec<f32> = seg.walk_clipped(&bbox).map(|(x, _)| x).collect();
        assert_eq!(xs, vec![10.5, 11.5, 12.5]);
    }
}
