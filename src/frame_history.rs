//! Camera matrices carried from one frame to the next for motion blur.

use glam::{Mat4, Vec3};

/// Camera state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl CameraMatrices {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// One-slot ring holding the previous frame's camera.
///
/// Each frame must call [`consume_previous`](Self::consume_previous) before
/// [`commit_current`](Self::commit_current). Consuming empties the slot, so a frame that
/// consumes twice sees `None` the second time and a frame that never commits leaves the next
/// frame without history.
#[derive(Debug, Default)]
pub struct FrameHistory {
    previous: Option<CameraMatrices>,
}

impl FrameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes last frame's camera, if one was committed.
    pub fn consume_previous(&mut self) -> Option<CameraMatrices> {
        self.previous.take()
    }

    /// Stores this frame's camera for the next frame.
    pub fn commit_current(&mut self, current: CameraMatrices) {
        self.previous = Some(current);
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(x: f32) -> CameraMatrices {
        CameraMatrices {
            view: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            projection: Mat4::IDENTITY,
            position: Vec3::new(-x, 0.0, 0.0),
        }
    }

    #[test]
    fn first_frame_has_no_history() {
        let mut history = FrameHistory::new();
        assert_eq!(history.consume_previous(), None);
    }

    #[test]
    fn each_frame_sees_the_one_before() {
        let mut history = FrameHistory::new();
        let mut seen = Vec::new();

        for frame in 0..4 {
            seen.push(history.consume_previous());
            history.commit_current(camera(frame as f32));
        }

        assert_eq!(
            seen,
            vec![None, Some(camera(0.0)), Some(camera(1.0)), Some(camera(2.0))]
        );
    }

    #[test]
    fn consuming_empties_the_slot() {
        let mut history = FrameHistory::new();
        history.commit_current(camera(1.0));

        assert!(history.consume_previous().is_some());
        assert!(history.is_empty());
        assert_eq!(history.consume_previous(), None);
    }
}
