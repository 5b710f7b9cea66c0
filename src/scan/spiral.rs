//! Outward spiral over the scan window's grid cells.

/// Inclusive pixel window the spiral is allowed to visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Window {
    /// Window spanning `x_margin`/`y_margin` pixels in from each canvas edge.
    pub fn from_margins(width: i32, height: i32, x_margin: i32, y_margin: i32) -> Self {
        Self {
            x_min: x_margin,
            x_max: width - x_margin,
            y_min: y_margin,
            y_max: height - y_margin,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }

    /// Number of grid cells a `step`-pixel lattice fits into the window.
    /// Upper bound for the spiral's yield count.
    pub fn cell_count(&self, step: i32) -> u64 {
        let step = step.max(1) as i64;
        let cols = (i64::from(self.x_max - self.x_min) / step + 1).max(0) as u64;
        let rows = (i64::from(self.y_max - self.y_min) / step + 1).max(0) as u64;
        cols * rows
    }
}

/// Square-spiral directions: right, down, left, up.
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Iterator visiting grid cells outward from the canvas center in expanding
/// concentric rings.
///
/// The walk ends the first time a step reaches or crosses a window edge, so
/// every cell inside the window is yielded at most once and nothing outside
/// the window is ever yielded.
pub struct Spiral {
    window: Window,
    step: i32,
    x: i32,
    y: i32,
    dir: usize,
    segment_length: u32,
    steps_in_segment: u32,
    legs_at_length: u8,
    started: bool,
    done: bool,
}

impl Spiral {
    /// Spiral over a `width` x `height` canvas, starting at its center and
    /// advancing `step` pixels per cell.
    pub fn new(width: i32, height: i32, window: Window, step: i32) -> Self {
        Self {
            window,
            step: step.max(1),
            x: width / 2,
            y: height / 2,
            dir: 0,
            segment_length: 1,
            steps_in_segment: 0,
            legs_at_length: 0,
            started: false,
            done: false,
        }
    }
}

impl Iterator for Spiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some((self.x, self.y));
        }

        let (dx, dy) = DIRECTIONS[self.dir];
        self.x += dx * self.step;
        self.y += dy * self.step;

        if !self.window.contains(self.x, self.y) {
            self.done = true;
            return None;
        }

        let item = (self.x, self.y);

        // Touching a window edge in the direction of travel exhausts the
        // outermost ring; this cell is the last one.
        if (dx > 0 && self.x >= self.window.x_max)
            || (dx < 0 && self.x <= self.window.x_min)
            || (dy > 0 && self.y >= self.window.y_max)
            || (dy < 0 && self.y <= self.window.y_min)
        {
            self.done = true;
            return Some(item);
        }

        self.steps_in_segment += 1;
        if self.steps_in_segment == self.segment_length {
            self.steps_in_segment = 0;
            self.dir = (self.dir + 1) % 4;
            self.legs_at_length += 1;
            if self.legs_at_length == 2 {
                self.legs_at_length = 0;
                self.segment_length += 1;
            }
        }

        Some(item)
    }
}
