use facet_geometry::{Mesh, Point3};

/// Points clicked on a canvas, kept in clip space.
///
/// Canvas coordinates are pixels from the top-left corner; clip space spans
/// `[-1, 1]` on both axes with `+y` up.
#[derive(Debug, Clone)]
pub struct ClickTrail {
    width: f32,
    height: f32,
    points: Vec<Point3>,
}

impl ClickTrail {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, points: Vec::new() }
    }

    /// Canvas pixel position to clip space.
    pub fn to_clip(&self, x: f32, y: f32) -> Point3 {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        Point3::xy((x - half_w) / half_w, (half_h - y) / half_h)
    }

    /// Records a click and returns its clip-space position.
    pub fn click(&mut self, x: f32, y: f32) -> Point3 {
        let p = self.to_clip(x, y);
        log::debug!("click at ({x}, {y}) -> ({:.3}, {:.3})", p.x, p.y);
        self.points.push(p);
        p
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The trail followed by the cursor position, for a rubber-band segment.
    ///
    /// `None` until the first click.
    pub fn with_cursor(&self, x: f32, y: f32) -> Option<Vec<Point3>> {
        if self.is_empty() {
            return None;
        }
        let mut points = self.points.clone();
        points.push(self.to_clip(x, y));
        Some(points)
    }

    /// Trail as a mesh without indices, for point/line-strip array draws.
    pub fn to_mesh(&self) -> Mesh {
        Mesh::from_parts(self.points.clone(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_corners_map_to_clip_corners() {
        let trail = ClickTrail::new(400.0, 200.0);
        assert_eq!(trail.to_clip(0.0, 0.0), Point3::xy(-1.0, 1.0));
        assert_eq!(trail.to_clip(400.0, 200.0), Point3::xy(1.0, -1.0));
        assert_eq!(trail.to_clip(200.0, 100.0), Point3::zero());
    }

    #[test]
    fn clicks_accumulate_in_order() {
        let mut trail = ClickTrail::new(100.0, 100.0);
        trail.click(0.0, 50.0);
        trail.click(100.0, 50.0);
        assert_eq!(trail.points(), &[Point3::xy(-1.0, 0.0), Point3::xy(1.0, 0.0)]);
        assert_eq!(trail.to_mesh().vertex_count(), 2);
    }

    #[test]
    fn rubber_band_needs_a_click() {
        let mut trail = ClickTrail::new(100.0, 100.0);
        assert!(trail.is_empty());
        assert!(trail.with_cursor(10.0, 10.0).is_none());

        trail.click(50.0, 50.0);
        let band = trail.with_cursor(100.0, 0.0).unwrap();
        assert_eq!(band.len(), 2);
        assert_eq!(band[1], Point3::xy(1.0, 1.0));
        assert_eq!(trail.len(), 1);
    }
}
