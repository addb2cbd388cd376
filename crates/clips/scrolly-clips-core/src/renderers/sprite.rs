//! Canvas sprite compositor.
//!
//! All sprites painting one surface share a single set. Clips only pick a
//! frame; after every processed frame the surface is cleared and each sprite
//! that has shown a frame this run is repainted in registration order, so a
//! finished sprite stays on its last frame.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clip::ClipSpec;
use crate::config::SchedulerConfig;
use crate::error::ClipError;
use crate::host::{Clock, FramePump};
use crate::renderers::{validate_inputs, MountedSet};
use crate::set::AnimationSet;

/// Grid of equally sized frames packed row by row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub frame_count: u32,
    pub columns: u32,
    pub frame_width: f64,
    pub frame_height: f64,
}

/// Source rectangle of one frame inside the sheet image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SpriteSheet {
    pub fn validate(&self) -> Result<(), ClipError> {
        if self.frame_count == 0 {
            return Err(ClipError::InvalidSpriteSheet {
                reason: "frame_count must be at least 1".to_string(),
            });
        }
        if self.columns == 0 {
            return Err(ClipError::InvalidSpriteSheet {
                reason: "columns must be at least 1".to_string(),
            });
        }
        if !(self.frame_width > 0.0 && self.frame_height > 0.0) {
            return Err(ClipError::InvalidSpriteSheet {
                reason: format!(
                    "frame size must be positive, got {}x{}",
                    self.frame_width, self.frame_height
                ),
            });
        }
        Ok(())
    }

    /// Frame shown at `progress`; progress 1 holds the last frame.
    pub fn frame_for_progress(&self, progress: f64) -> u32 {
        let last = self.frame_count.saturating_sub(1);
        let idx = (progress.clamp(0.0, 1.0) * self.frame_count as f64).floor() as u32;
        idx.min(last)
    }

    pub fn source_rect(&self, frame: u32) -> SourceRect {
        let col = frame % self.columns;
        let row = frame / self.columns;
        SourceRect {
            x: col as f64 * self.frame_width,
            y: row as f64 * self.frame_height,
            width: self.frame_width,
            height: self.frame_height,
        }
    }
}

/// 2D drawing surface (a canvas context in the browser).
pub trait SpriteSurface {
    fn clear(&mut self);
    fn draw_frame(&mut self, sheet: &SpriteSheet, source: SourceRect, x: f64, y: f64);
}

/// One sprite: a clip, its sheet and where it lands on the surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteClip {
    pub clip: ClipSpec,
    pub sheet: SpriteSheet,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Sprite animations sharing one surface.
#[derive(Debug)]
pub struct SpriteAnimation {
    mounted: MountedSet,
}

impl SpriteAnimation {
    pub fn new<S>(
        surface: Option<Rc<RefCell<S>>>,
        config: SchedulerConfig,
        sprites: Vec<SpriteClip>,
        clock: impl Clock + 'static,
        pump: impl FramePump + 'static,
    ) -> Result<Self, ClipError>
    where
        S: SpriteSurface + 'static,
    {
        for sprite in &sprites {
            sprite.sheet.validate()?;
        }
        validate_inputs(&config, sprites.iter().map(|s| &s.clip))?;

        let Some(surface) = surface else {
            return Ok(Self {
                mounted: MountedSet::detached("sprite animation"),
            });
        };

        // Frame each sprite currently shows; `None` until its clip first
        // updates. Finished clips keep their last frame here.
        let held = Rc::new(RefCell::new(vec![None::<u32>; sprites.len()]));
        let mut placements = Vec::with_capacity(sprites.len());
        let mut clips = Vec::with_capacity(sprites.len());
        for (idx, SpriteClip { clip, sheet, x, y }) in sprites.into_iter().enumerate() {
            placements.push((sheet.clone(), x, y));
            let frames = held.clone();
            clips.push((clip, move |progress: f64| {
                frames.borrow_mut()[idx] = Some(sheet.frame_for_progress(progress));
            }));
        }

        let (paint_surface, paint_held) = (surface.clone(), held.clone());
        let mut builder = AnimationSet::builder(config).after_frame(move || {
            let mut surface = paint_surface.borrow_mut();
            surface.clear();
            for ((sheet, x, y), frame) in placements.iter().zip(paint_held.borrow().iter()) {
                if let Some(frame) = frame {
                    surface.draw_frame(sheet, sheet.source_rect(*frame), *x, *y);
                }
            }
        });
        for (clip, update) in clips {
            builder = builder.clip(clip, update);
        }
        let builder = builder.on_rest(move || {
            held.borrow_mut().iter_mut().for_each(|f| *f = None);
            surface.borrow_mut().clear();
        });

        Ok(Self {
            mounted: MountedSet::mounted("sprite animation", builder.build(clock, pump)?),
        })
    }

    pub fn start(&mut self, now: f64) {
        self.mounted.start(now);
    }

    pub fn stop(&mut self) {
        self.mounted.stop();
    }

    pub fn tick(&mut self, now: f64) -> Option<crate::outputs::TickReport> {
        self.mounted.tick(now)
    }

    pub fn is_running(&self) -> bool {
        self.mounted.is_running()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_mounted()
    }

    pub fn into_mounted(self) -> MountedSet {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SpriteSheet {
        SpriteSheet {
            frame_count: 10,
            columns: 4,
            frame_width: 32.0,
            frame_height: 16.0,
        }
    }

    #[test]
    fn frame_index_covers_sheet() {
        let s = sheet();
        assert_eq!(s.frame_for_progress(0.0), 0);
        assert_eq!(s.frame_for_progress(0.09), 0);
        assert_eq!(s.frame_for_progress(0.1), 1);
        assert_eq!(s.frame_for_progress(0.99), 9);
        assert_eq!(s.frame_for_progress(1.0), 9);
    }

    #[test]
    fn source_rect_wraps_rows() {
        let s = sheet();
        assert_eq!(
            s.source_rect(5),
            SourceRect {
                x: 32.0,
                y: 16.0,
                width: 32.0,
                height: 16.0
            }
        );
    }

    #[test]
    fn rejects_empty_sheet() {
        let mut s = sheet();
        s.frame_count = 0;
        assert!(matches!(
            s.validate(),
            Err(ClipError::InvalidSpriteSheet { .. })
        ));
        let mut s = sheet();
        s.frame_width = 0.0;
        assert!(s.validate().is_err());
    }
}
