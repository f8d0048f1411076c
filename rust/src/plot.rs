//! Raster plot of sampled points.
//!
//! Points are drawn over the unit square with the origin in the bottom-left
//! corner, so the quarter circle arc runs from the bottom-right corner to the
//! top-left one. Inside points are round dots, outside points small squares.

use std::path::Path;
use std::sync::mpsc::Receiver;

use image::{ImageResult, Rgb, RgbImage};

use crate::sink::SinkEvent;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([35, 75, 25]);
const ARC: Rgb<u8> = Rgb([0, 0, 0]);
const INSIDE: Rgb<u8> = Rgb([235, 180, 99]);
const OUTSIDE: Rgb<u8> = Rgb([121, 112, 98]);

const FRAME_WIDTH: i64 = 3;
const POINT_SIZE: i64 = 4;

pub const DEFAULT_PLOT_SIZE: u32 = 550;

pub struct PointPlot {
    image: RgbImage,
    inside: u64,
    outside: u64,
}

impl PointPlot {
    pub fn new(size: u32) -> Self {
        let mut plot = Self {
            image: RgbImage::from_pixel(size, size, BACKGROUND),
            inside: 0,
            outside: 0,
        };
        plot.draw_frame();
        plot
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn counts(&self) -> (u64, u64) {
        (self.inside, self.outside)
    }

    /// Clear every point and redraw the empty frame.
    pub fn reset(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = BACKGROUND;
        }
        self.inside = 0;
        self.outside = 0;
        self.draw_frame();
    }

    pub fn plot(&mut self, x: f64, y: f64, inside: bool) {
        let (cx, cy) = self.to_pixel(x, y);
        let half = POINT_SIZE / 2;
        if inside {
            self.inside += 1;
            for dy in -half..=half {
                for dx in -half..=half {
                    if dx * dx + dy * dy <= half * half {
                        self.put(cx + dx, cy + dy, INSIDE);
                    }
                }
            }
        } else {
            self.outside += 1;
            for dy in -half..half {
                for dx in -half..half {
                    self.put(cx + dx, cy + dy, OUTSIDE);
                }
            }
        }
    }

    /// Draw point events until every sender is gone. Returns how many points
    /// were drawn.
    pub fn consume(&mut self, events: Receiver<SinkEvent>) -> u64 {
        let mut drawn = 0;
        for event in events {
            if let SinkEvent::Point { x, y, inside } = event {
                self.plot(x, y, inside);
                drawn += 1;
            }
        }
        drawn
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image.save(path)
    }

    fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let extent = (self.size().saturating_sub(1)) as f64;
        let px = (x.clamp(0.0, 1.0) * extent).round() as i64;
        let py = ((1.0 - y.clamp(0.0, 1.0)) * extent).round() as i64;
        (px, py)
    }

    fn draw_frame(&mut self) {
        let size = self.size() as i64;
        for offset in 0..FRAME_WIDTH {
            for i in 0..size {
                self.put(i, offset, FRAME);
                self.put(i, size - 1 - offset, FRAME);
                self.put(offset, i, FRAME);
                self.put(size - 1 - offset, i, FRAME);
            }
        }

        let steps = (size * 4).max(1);
        for step in 0..=steps {
            let theta = std::f64::consts::FRAC_PI_2 * step as f64 / steps as f64;
            let (cx, cy) = self.to_pixel(theta.cos(), theta.sin());
            self.put(cx, cy, ARC);
            self.put(cx - 1, cy, ARC);
            self.put(cx, cy + 1, ARC);
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        let (width, height) = self.image.dimensions();
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ChannelSink, ProgressSink};

    #[test]
    fn new_plot_has_frame_and_arc() {
        let plot = PointPlot::new(100);
        assert_eq!(plot.size(), 100);
        assert_eq!(*plot.image().get_pixel(0, 50), FRAME);
        assert_eq!(*plot.image().get_pixel(50, 50), BACKGROUND);
        assert_eq!(*plot.image().get_pixel(0, 99), FRAME);
        assert_eq!(*plot.image().get_pixel(70, 29), ARC);
        assert_eq!(plot.counts(), (0, 0));
    }

    #[test]
    fn points_use_classification_colors() {
        let mut plot = PointPlot::new(200);
        plot.plot(0.25, 0.25, true);
        plot.plot(0.9, 0.9, false);

        let (ix, iy) = plot.to_pixel(0.25, 0.25);
        let (ox, oy) = plot.to_pixel(0.9, 0.9);
        assert_eq!(*plot.image().get_pixel(ix as u32, iy as u32), INSIDE);
        assert_eq!(*plot.image().get_pixel(ox as u32, oy as u32), OUTSIDE);
        assert_eq!(plot.counts(), (1, 1));
    }

    #[test]
    fn reset_removes_points() {
        let mut plot = PointPlot::new(120);
        let pristine = plot.image().clone();
        plot.plot(0.5, 0.5, true);
        assert_ne!(plot.image(), &pristine);

        plot.reset();
        assert_eq!(plot.image(), &pristine);
        assert_eq!(plot.counts(), (0, 0));
    }

    #[test]
    fn consume_draws_only_point_events() {
        let (sink, rx) = ChannelSink::new();
        sink.on_point_classified(0.1, 0.1, true);
        sink.on_point_classified(0.95, 0.95, false);
        sink.on_progress(&Default::default());
        drop(sink);

        let mut plot = PointPlot::new(64);
        assert_eq!(plot.consume(rx), 2);
        assert_eq!(plot.counts(), (1, 1));
    }
}
