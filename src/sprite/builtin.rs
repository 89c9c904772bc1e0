//! Procedural masks used when no sprite manifest is configured

use super::{MaskFrame, SpriteMask};

const CELL: usize = 32;
const MINI: usize = 16;

/// Triangle with its apex pointing in `dir` inside a `size x size` frame
#[derive(Clone, Copy)]
enum Apex {
    Up,
    Down,
    Left,
    Right,
}

fn spike(size: usize, apex: Apex) -> MaskFrame {
    let center = (size as f32 - 1.0) / 2.0;
    MaskFrame::from_fn(size, size, |x, y| {
        // Distance from the apex edge along the spike's axis, and offset across it
        let (along, across) = match apex {
            Apex::Up => (y, x),
            Apex::Down => (size - 1 - y, x),
            Apex::Left => (x, y),
            Apex::Right => (size - 1 - x, y),
        };
        (across as f32 - center).abs() <= (along as f32 + 1.0) / 2.0
    })
}

fn disc(w: usize, h: usize, cx: f32, cy: f32, r: f32) -> MaskFrame {
    MaskFrame::from_fn(w, h, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        dx * dx + dy * dy <= r * r
    })
}

fn columns(w: usize, h: usize, from: usize, to: usize) -> MaskFrame {
    MaskFrame::from_fn(w, h, |x, _| x >= from && x < to)
}

fn rows(w: usize, h: usize, from: usize, to: usize) -> MaskFrame {
    MaskFrame::from_fn(w, h, |_, y| y >= from && y < to)
}

/// Player hitbox: 11x21 inside a 32x32 frame
fn player(flipped: bool) -> MaskFrame {
    MaskFrame::from_fn(CELL, CELL, |x, y| {
        let in_x = (12..=22).contains(&x);
        let in_y = if flipped { y <= 20 } else { y >= 11 };
        in_x && in_y
    })
}

pub fn all_masks() -> Vec<SpriteMask> {
    let solid = || MaskFrame::solid(CELL, CELL);

    vec![
        SpriteMask::single("block", 0, 0, solid()),
        SpriteMask::single("mini_block", 0, 0, MaskFrame::solid(MINI, MINI)),
        SpriteMask::single("killer_block", 0, 0, solid()),
        SpriteMask::single("spike_up", 0, 0, spike(CELL, Apex::Up)),
        SpriteMask::single("spike_down", 0, 0, spike(CELL, Apex::Down)),
        SpriteMask::single("spike_left", 0, 0, spike(CELL, Apex::Left)),
        SpriteMask::single("spike_right", 0, 0, spike(CELL, Apex::Right)),
        SpriteMask::single("mini_spike_up", 0, 0, spike(MINI, Apex::Up)),
        SpriteMask::single("mini_spike_down", 0, 0, spike(MINI, Apex::Down)),
        SpriteMask::single("mini_spike_left", 0, 0, spike(MINI, Apex::Left)),
        SpriteMask::single("mini_spike_right", 0, 0, spike(MINI, Apex::Right)),
        SpriteMask::new(
            "apple",
            10,
            12,
            vec![disc(21, 24, 10.0, 14.0, 9.0), disc(21, 24, 10.0, 13.0, 9.0)],
        ),
        SpriteMask::new("save", 0, 0, vec![solid(), solid()]),
        SpriteMask::single("platform", 0, 0, rows(CELL, MINI, 0, 16)),
        SpriteMask::single("water", 0, 0, solid()),
        SpriteMask::single("water2", 0, 0, solid()),
        SpriteMask::single("water3", 0, 0, solid()),
        SpriteMask::single("walljump_l", 0, 0, columns(CELL, CELL, 0, 14)),
        SpriteMask::single("walljump_r", 0, 0, columns(CELL, CELL, 18, CELL)),
        SpriteMask::single("player_start", 0, 0, solid()),
        SpriteMask::single("warp", 0, 0, solid()),
        SpriteMask::single("jump_refresher", 0, 0, disc(15, 15, 7.0, 7.0, 7.0)),
        SpriteMask::single("gravity_up", 0, 0, spike(CELL, Apex::Up)),
        SpriteMask::single("gravity_down", 0, 0, spike(CELL, Apex::Down)),
        SpriteMask::single("bullet_blocker", 0, 0, solid()),
        SpriteMask::new("bullet", 2, 2, vec![MaskFrame::solid(4, 4), disc(4, 4, 1.5, 1.5, 1.6)]),
        SpriteMask::new(
            "blood",
            1,
            1,
            vec![
                MaskFrame::solid(2, 2),
                MaskFrame::from_fn(3, 3, |x, y| x == 1 || y == 1),
                MaskFrame::solid(1, 1),
            ],
        ),
        SpriteMask::single("player_mask", 17, 23, player(false)),
        SpriteMask::single("player_mask_flip", 17, 8, player(true)),
        SpriteMask::single("dotkid", 1, 1, MaskFrame::solid(3, 3)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_apex_is_narrow() {
        let up = spike(CELL, Apex::Up);
        // Top row holds the apex, bottom row spans the full width
        let top_count = (0..CELL as i32).filter(|&x| up.is_opaque(x, 0)).count();
        let bottom_count = (0..CELL as i32).filter(|&x| up.is_opaque(x, CELL as i32 - 1)).count();
        assert!(top_count <= 2);
        assert_eq!(bottom_count, CELL);
    }

    #[test]
    fn test_player_masks_mirror_around_origin() {
        let normal = player(false).bounds().unwrap();
        let flipped = player(true).bounds().unwrap();
        // 8 pixels below the origin normally, 8 above when flipped
        assert_eq!(normal.bottom - 23, 8);
        assert_eq!(8 - flipped.top, 8);
        assert_eq!(normal.bottom - normal.top, flipped.bottom - flipped.top);
    }
}
