use crate::foundation::core::Color;

/// Per-channel multiply/add color adjustment, channels in `[r, g, b, a]` order.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorTransform {
    /// Channel multipliers.
    #[serde(default = "unit_mult")]
    pub mult: [f32; 4],
    /// Channel offsets, added after multiplying.
    #[serde(default)]
    pub add: [f32; 4],
}

fn unit_mult() -> [f32; 4] {
    [1.0; 4]
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self {
            mult: unit_mult(),
            add: [0.0; 4],
        }
    }
}

impl ColorTransform {
    /// `true` when applying the transform never changes a color.
    pub fn is_identity(&self) -> bool {
        self.mult == [1.0; 4] && self.add == [0.0; 4]
    }

    fn apply_channels(&self, c: [u8; 4]) -> [u8; 4] {
        let mut out = [0u8; 4];
        for i in 0..4 {
            let v = (f32::from(c[i]) * self.mult[i] + self.add[i]).round();
            out[i] = v.clamp(0.0, 255.0) as u8;
        }
        out
    }
}

/// Stack of color transforms applied while descending the scene tree.
///
/// Transforms apply in push order: the outermost ancestor first, the most recently pushed last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositeColorTransform {
    stack: Vec<ColorTransform>,
}

impl CompositeColorTransform {
    /// Empty stack (identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a placement carrying `t`.
    pub fn push(&mut self, t: ColorTransform) {
        self.stack.push(t);
    }

    /// Leave the placement that pushed the top transform.
    pub fn pop(&mut self) -> Option<ColorTransform> {
        self.stack.pop()
    }

    /// Number of stacked transforms.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `true` when the stack leaves colors unchanged.
    pub fn is_identity(&self) -> bool {
        self.stack.iter().all(ColorTransform::is_identity)
    }

    /// Effective color of `c` at this point of the tree.
    pub fn apply(&self, c: Color) -> Color {
        let mut channels = c.to_array();
        for t in &self.stack {
            channels = t.apply_channels(channels);
        }
        Color::from_array(channels)
    }

    /// Apply the stack to straight RGBA8 pixels in place.
    pub fn apply_rgba8(&self, pixels: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        for px in pixels.chunks_exact_mut(4) {
            let mut channels = [px[0], px[1], px[2], px[3]];
            for t in &self.stack {
                channels = t.apply_channels(channels);
            }
            px.copy_from_slice(&channels);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/color.rs"]
mod tests;
