//! Modelview matrix stack
//!
//! Both per-frame tree walks (light pass and draw pass) descend the scene
//! tree with one shared [`TransformStack`]. Every transform node opens a new
//! frame on the way down and must close it on the way back up, on every exit
//! path — otherwise later siblings silently inherit a corrupted frame. The
//! stack therefore never hands out a raw push: [`TransformStack::pushed`]
//! returns a [`FrameScope`] guard that pops when dropped, so the balance
//! holds even when a child's draw call errors out.

use std::ops::{Deref, DerefMut};

use glam::Mat4;

/// Stack of accumulated object-to-eye transforms, one entry per open
/// traversal depth. Always non-empty: construction and [`reset`] seed the
/// identity frame.
///
/// [`reset`]: TransformStack::reset
#[derive(Debug, Clone)]
pub struct TransformStack {
    frames: Vec<Mat4>,
}

impl TransformStack {
    /// Creates a stack holding a single identity frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Mat4::IDENTITY],
        }
    }

    /// Drops every open frame and re-seeds the identity frame.
    ///
    /// Called at the start of each pass; the light pass and the draw pass
    /// are independent walks and must not inherit each other's frames.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(Mat4::IDENTITY);
    }

    /// The accumulated transform of the innermost open frame.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Mat4 {
        *self.frames.last().expect("transform stack is never empty")
    }

    /// Number of open frames.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Opens a new frame equal to `top * local` and returns a guard that
    /// closes it on drop.
    pub fn pushed(&mut self, local: Mat4) -> FrameScope<'_> {
        let top = self.top();
        self.frames.push(top * local);
        FrameScope { stack: self }
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII frame guard handed out by [`TransformStack::pushed`].
///
/// Dereferences to the stack so a traversal can keep descending through it;
/// the frame it opened is popped when the guard goes out of scope.
#[derive(Debug)]
pub struct FrameScope<'a> {
    stack: &'a mut TransformStack,
}

impl Deref for FrameScope<'_> {
    type Target = TransformStack;

    fn deref(&self) -> &TransformStack {
        self.stack
    }
}

impl DerefMut for FrameScope<'_> {
    fn deref_mut(&mut self) -> &mut TransformStack {
        self.stack
    }
}

impl Drop for FrameScope<'_> {
    fn drop(&mut self) {
        self.stack.frames.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn stack_starts_at_identity() {
        let stack = TransformStack::new();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), Mat4::IDENTITY);
    }

    #[test]
    fn pushed_composes_with_top() {
        let mut stack = TransformStack::new();
        let a = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));

        let mut outer = stack.pushed(a);
        assert_eq!(outer.top(), a);

        let inner = outer.pushed(b);
        assert_eq!(inner.top(), a * b);
        assert_eq!(inner.depth(), 3);
    }

    #[test]
    fn scope_drop_restores_depth() {
        let mut stack = TransformStack::new();
        {
            let _scope = stack.pushed(Mat4::from_scale(Vec3::splat(2.0)));
        }
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), Mat4::IDENTITY);
    }

    #[test]
    fn scope_drop_restores_depth_on_unwind() {
        let mut stack = TransformStack::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = stack.pushed(Mat4::IDENTITY);
            panic!("child failed");
        }));
        assert!(result.is_err());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn reset_discards_open_frames() {
        let mut stack = TransformStack::new();
        stack.frames.push(Mat4::from_scale(Vec3::splat(3.0)));
        stack.frames.push(Mat4::ZERO);
        stack.reset();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), Mat4::IDENTITY);
    }
}
