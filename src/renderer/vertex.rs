//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Playfield-space corner of a flat-colored triangle
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Same color, position moved through `f`
    pub fn map_position(self, f: impl Fn(f32, f32) -> (f32, f32)) -> Self {
        let (x, y) = f(self.position[0], self.position[1]);
        Self::new(x, y, self.color)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const SKY: [f32; 4] = [0.05, 0.08, 0.2, 1.0];
    pub const GROUND: [f32; 4] = [0.92, 0.95, 1.0, 1.0];
    pub const SANTA: [f32; 4] = [0.85, 0.1, 0.1, 1.0];
    pub const SANTA_DEAD: [f32; 4] = [0.45, 0.1, 0.1, 1.0];
    pub const PIPE: [f32; 4] = [0.75, 0.8, 0.85, 1.0];
    pub const TREE_FANTASY: [f32; 4] = [0.55, 0.3, 0.75, 1.0];
    pub const TREE_GREEN: [f32; 4] = [0.1, 0.55, 0.2, 1.0];
    pub const TREE_GREEN_TEAL: [f32; 4] = [0.1, 0.5, 0.45, 1.0];
    pub const GIFT: [f32; 4] = [0.95, 0.75, 0.15, 1.0];
    pub const GIFT_BREAKING: [f32; 4] = [0.6, 0.45, 0.1, 0.6];
    pub const FLOATING_GIFT: [f32; 4] = [0.3, 0.85, 0.95, 1.0];
    pub const SMOKE: [f32; 4] = [0.85, 0.85, 0.9, 0.6];
    pub const DECOR: [f32; 4] = [0.6, 0.4, 0.25, 1.0];
    pub const HITBOX: [f32; 4] = [1.0, 0.0, 1.0, 0.9];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_struct() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 8);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }

    #[test]
    fn test_map_position_keeps_color() {
        let v = Vertex::new(2.0, 3.0, colors::GIFT).map_position(|x, y| (x * 2.0, -y));
        assert_eq!(v.position, [4.0, -3.0]);
        assert_eq!(v.color, colors::GIFT);
    }
}
