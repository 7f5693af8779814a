//! Viewport camera: pan offset, zoom scale and screen/world conversion.
//!
//! The camera position is the world point shown at the canvas center:
//!
//! ```text
//! world  = (screen - canvas / 2) / scale + camera
//! screen = (world - camera) * scale + canvas / 2
//! ```

use serde::{Deserialize, Serialize};

use crate::math::Point;

/// Settings for camera behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Multiplier applied per zoom step.
    pub zoom_step: f64,
    /// Minimum scale (most zoomed out).
    pub min_zoom: f64,
    /// Maximum scale (most zoomed in).
    pub max_zoom: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            zoom_step: 1.1,
            min_zoom: 0.05,
            max_zoom: 20.0,
        }
    }
}

/// Direction of one zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    /// Scale up.
    In,
    /// Scale down.
    Out,
}

/// Camera state for one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// World point at the canvas center.
    pub camera: Point,
    /// Screen pixels per world pixel.
    pub scale: f64,
    /// Canvas width in screen pixels.
    pub canvas_width: f64,
    /// Canvas height in screen pixels.
    pub canvas_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Viewport {
    /// Viewport at the world origin with scale 1.
    #[must_use]
    pub const fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            camera: Point::ZERO,
            scale: 1.0,
            canvas_width,
            canvas_height,
        }
    }

    /// Canvas center in screen space.
    #[must_use]
    pub fn canvas_center(&self) -> Point {
        Point::new(self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    /// Resize the canvas. The camera keeps its world position.
    pub fn resize(&mut self, canvas_width: f64, canvas_height: f64) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
    }

    /// Convert a screen point to world space.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let center = self.canvas_center();
        Point::new(
            (screen.x - center.x) / self.scale + self.camera.x,
            (screen.y - center.y) / self.scale + self.camera.y,
        )
    }

    /// Convert a world point to screen space.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        let center = self.canvas_center();
        Point::new(
            (world.x - self.camera.x) * self.scale + center.x,
            (world.y - self.camera.y) * self.scale + center.y,
        )
    }

    /// Whether a screen point lies on the canvas, allowing `margin` pixels outside.
    #[must_use]
    pub fn is_on_screen(&self, screen: Point, margin: f64) -> bool {
        -margin < screen.x
            && screen.x < self.canvas_width + margin
            && -margin < screen.y
            && screen.y < self.canvas_height + margin
    }

    /// Apply one zoom step, clamped to the settings range. Returns the new scale.
    pub fn zoom(&mut self, direction: ZoomDirection, settings: &CameraSettings) -> f64 {
        let scale = match direction {
            ZoomDirection::In => self.scale * settings.zoom_step,
            ZoomDirection::Out => self.scale / settings.zoom_step,
        };
        self.scale = scale.clamp(settings.min_zoom, settings.max_zoom);
        self.scale
    }

    /// Center on `world`.
    pub fn center_on(&mut self, world: Point) {
        self.camera = world;
    }

    /// Fit an image with its top-left at the world origin so it covers the canvas.
    ///
    /// Zero-sized images leave the viewport unchanged.
    pub fn fit_to_image(&mut self, image_width: f64, image_height: f64) {
        if image_width <= 0.0 || image_height <= 0.0 {
            return;
        }
        self.scale = (self.canvas_width / image_width).max(self.canvas_height / image_height);
        self.camera = Point::new(image_width / 2.0, image_height / 2.0);
    }

    /// Begin a pan gesture at a screen point.
    #[must_use]
    pub const fn begin_pan(&self, screen: Point) -> PanGesture {
        PanGesture {
            start_screen: screen,
            start_camera: self.camera,
        }
    }

    /// Move the camera for a pan gesture now at `screen`.
    pub fn pan_to(&mut self, gesture: &PanGesture, screen: Point) {
        let dx = screen.x - gesture.start_screen.x;
        let dy = screen.y - gesture.start_screen.y;
        self.camera = Point::new(
            gesture.start_camera.x - dx / self.scale,
            gesture.start_camera.y - dy / self.scale,
        );
    }
}

/// An in-progress pan, anchored where the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    start_screen: Point,
    start_camera: Point,
}
