//! Tessellation of a snapshot into colored triangles
//!
//! Output positions are in playfield pixels (y down); the pipeline maps them
//! to clip space.

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::consts::SMOKE_FRAMES;
use crate::sim::snapshot::Snapshot;
use crate::sim::{Rect, TowerStyle};

/// Outline thickness of debug hitboxes in pixels
const HITBOX_LINE: f32 = 2.0;

/// Map playfield pixels to normalized device coordinates
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    (x / width * 2.0 - 1.0, 1.0 - y / height * 2.0)
}

/// Axis-aligned filled rectangle as two triangles
pub fn quad(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> [Vertex; 6] {
    let (x1, y1) = (x + w, y + h);
    [
        Vertex::new(x, y, color),
        Vertex::new(x1, y, color),
        Vertex::new(x, y1, color),
        Vertex::new(x1, y, color),
        Vertex::new(x1, y1, color),
        Vertex::new(x, y1, color),
    ]
}

/// Filled square of side `size` rotated by `degrees` around its center
pub fn rotated_quad(x: f32, y: f32, size: f32, degrees: f32, color: [f32; 4]) -> [Vertex; 6] {
    let half = size / 2.0;
    let center = Vec2::new(x + half, y + half);
    let rot = Vec2::from_angle(degrees.to_radians());
    let corner = |dx: f32, dy: f32| {
        let p = center + rot.rotate(Vec2::new(dx, dy));
        Vertex::new(p.x, p.y, color)
    };
    let (a, b, c, d) = (
        corner(-half, -half),
        corner(half, -half),
        corner(half, half),
        corner(-half, half),
    );
    [a, b, d, b, c, d]
}

/// Rectangle outline made of four thin quads
pub fn outline(rect: &Rect, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let (w, h) = (rect.width(), rect.height());
    let (x, y) = (rect.min.x, rect.min.y);
    let mut out = Vec::with_capacity(24);
    out.extend(quad(x, y, w, thickness, color));
    out.extend(quad(x, y + h - thickness, w, thickness, color));
    out.extend(quad(x, y, thickness, h, color));
    out.extend(quad(x + w - thickness, y, thickness, h, color));
    out
}

fn tree_color(style: TowerStyle) -> [f32; 4] {
    match style {
        TowerStyle::Fantasy => colors::TREE_FANTASY,
        TowerStyle::Green => colors::TREE_GREEN,
        TowerStyle::GreenTeal => colors::TREE_GREEN_TEAL,
    }
}

/// Every triangle of a frame, back to front
pub fn scene(snap: &Snapshot) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(
        6 * (4 + 2 * snap.obstacles.len()
            + snap.gifts.len()
            + snap.floating.len()
            + snap.smoke.len()
            + snap.decor.len()),
    );

    for decor in &snap.decor {
        // Props sink slightly into the snow
        let bottom = snap.ground_top + 10.0 * snap.scale;
        out.extend(quad(
            decor.x,
            bottom - decor.height,
            decor.width,
            decor.height,
            colors::DECOR,
        ));
    }

    for o in &snap.obstacles {
        out.extend(quad(o.x, 0.0, o.width, o.gap_top, colors::PIPE));
        let tower_top = snap.ground_top - o.tower_height;
        out.extend(quad(o.x, tower_top, o.width, o.tower_height, tree_color(o.style)));
    }

    out.extend(quad(
        0.0,
        snap.ground_top,
        snap.width,
        snap.height - snap.ground_top,
        colors::GROUND,
    ));

    for gift in &snap.gifts {
        let color = if gift.breaking {
            colors::GIFT_BREAKING
        } else {
            colors::GIFT
        };
        out.extend(quad(gift.x, gift.y, gift.size, gift.size, color));
    }

    for gift in &snap.floating {
        out.extend(quad(gift.x, gift.y, gift.size, gift.size, colors::FLOATING_GIFT));
    }

    for smoke in &snap.smoke {
        let mut color = colors::SMOKE;
        color[3] *= 1.0 - smoke.frame as f32 / SMOKE_FRAMES as f32;
        out.extend(quad(smoke.x, smoke.y, smoke.size, smoke.size, color));
    }

    let player = &snap.player;
    let color = if player.dead {
        colors::SANTA_DEAD
    } else {
        colors::SANTA
    };
    out.extend(rotated_quad(player.x, player.y, player.size, player.rotation, color));

    if snap.show_hitbox {
        out.extend(outline(&player.hitbox, HITBOX_LINE, colors::HITBOX));
    }

    out
}
