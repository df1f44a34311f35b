use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Strict overlap test. Rectangles that only share an edge do not overlap,
    /// so a body resting exactly on a platform top is not "inside" it.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Copy of this rectangle moved by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Grow by `(dw, dh)` in place, keeping the centre fixed.
    pub fn inflate(&mut self, dw: f32, dh: f32) {
        self.x -= dw / 2.0;
        self.y -= dh / 2.0;
        self.w += dw;
        self.h += dh;
    }

    /// Whether `other` lies entirely within this rectangle's horizontal span.
    pub fn spans_horizontally(&self, other: &Rect) -> bool {
        other.left() >= self.left() && other.right() <= self.right()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let floor = Rect::new(0.0, 100.0, 200.0, 20.0);
        let body = Rect::new(10.0, 40.0, 40.0, 60.0);
        assert_eq!(body.bottom(), floor.top());
        assert!(!body.overlaps(&floor));
        assert!(body.offset(0.0, 0.5).overlaps(&floor));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        let c = Rect::new(20.0, 0.0, 5.0, 5.0);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn inflate_keeps_center() {
        let mut r = Rect::new(100.0, 500.0, 60.0, 80.0);
        let (cx, cy) = (r.center_x(), r.center_y());
        r.inflate(20.0, 20.0);
        assert_eq!(r.w, 80.0);
        assert_eq!(r.h, 100.0);
        assert_eq!(r.center_x(), cx);
        assert_eq!(r.center_y(), cy);
    }

    #[test]
    fn horizontal_span_check() {
        let platform = Rect::new(100.0, 300.0, 150.0, 20.0);
        assert!(platform.spans_horizontally(&Rect::new(100.0, 270.0, 30.0, 30.0)));
        assert!(platform.spans_horizontally(&Rect::new(220.0, 270.0, 30.0, 30.0)));
        assert!(!platform.spans_horizontally(&Rect::new(221.0, 270.0, 30.0, 30.0)));
        assert!(!platform.spans_horizontally(&Rect::new(99.0, 270.0, 30.0, 30.0)));
    }
}
