//! jtool editor front end
//!
//! Polls macroquad once per frame, feeds the snapshot to the edit engine and
//! the world, then draws the room at an integer scale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use macroquad::prelude::*;

use jtool_engine::config::EditorConfig;
use jtool_engine::editor::EditEngine;
use jtool_engine::input::{InputTracker, Key};
use jtool_engine::map::{load_any, save_any};
use jtool_engine::sprite::{SpriteBank, SpriteMask, SpriteSource};
use jtool_engine::world::{GameObject, ObjectKind, World, ROOM_HEIGHT, ROOM_WIDTH};
use jtool_engine::VERSION;

const CONFIG_PATH: &str = "jtool.ron";
const STATUS_HEIGHT: f32 = 24.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("jtool v{}", VERSION),
        window_width: ROOM_WIDTH as i32,
        window_height: ROOM_HEIGHT as i32 + STATUS_HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Screen placement of the room
#[derive(Clone, Copy)]
struct View {
    scale: f32,
    ox: f32,
    oy: f32,
}

impl View {
    fn fit() -> Self {
        let avail_h = (screen_height() - STATUS_HEIGHT).max(1.0);
        let scale = (screen_width() / ROOM_WIDTH).min(avail_h / ROOM_HEIGHT).floor().max(1.0);
        Self {
            scale,
            ox: ((screen_width() - ROOM_WIDTH * scale) / 2.0).floor(),
            oy: ((avail_h - ROOM_HEIGHT * scale) / 2.0).floor().max(0.0),
        }
    }

    fn to_room(&self, (x, y): (f32, f32)) -> (f32, f32) {
        ((x - self.ox) / self.scale, (y - self.oy) / self.scale)
    }

    fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (self.ox + x * self.scale, self.oy + y * self.scale)
    }
}

/// One texture per mask frame, white where opaque
#[derive(Default)]
struct TextureCache {
    textures: HashMap<(String, usize), Texture2D>,
}

impl TextureCache {
    fn get(&mut self, mask: &SpriteMask, image_index: f32) -> Texture2D {
        let n = mask.frame_count() as i64;
        let index = (image_index.round() as i64).rem_euclid(n.max(1)) as usize;
        self.textures
            .entry((mask.name.clone(), index))
            .or_insert_with(|| {
                let frame = &mask.frames()[index];
                let mut bytes = Vec::with_capacity(frame.width * frame.height * 4);
                for y in 0..frame.height as i32 {
                    for x in 0..frame.width as i32 {
                        let a = if frame.is_opaque(x, y) { 255 } else { 0 };
                        bytes.extend_from_slice(&[255, 255, 255, a]);
                    }
                }
                let tex = Texture2D::from_rgba8(frame.width as u16, frame.height as u16, &bytes);
                tex.set_filter(FilterMode::Nearest);
                tex
            })
            .clone()
    }
}

fn kind_color(kind: ObjectKind) -> Color {
    use ObjectKind::*;
    match kind {
        k if k.is_a(Block) || k == MiniBlock => Color::from_rgba(150, 150, 160, 255),
        k if k.is_a(Killer) => Color::from_rgba(220, 60, 60, 255),
        Player | PlayerStart => Color::from_rgba(90, 160, 255, 255),
        Save => Color::from_rgba(90, 220, 120, 255),
        Platform => Color::from_rgba(170, 120, 70, 255),
        Water | Water2 | Water3 => Color::from_rgba(70, 120, 230, 140),
        WalljumpL | WalljumpR => Color::from_rgba(60, 200, 90, 255),
        JumpRefresher => Color::from_rgba(240, 240, 90, 255),
        GravityArrowUp | GravityArrowDown => Color::from_rgba(200, 90, 230, 255),
        Blood => Color::from_rgba(170, 0, 0, 255),
        _ => WHITE,
    }
}

fn tinted(base: Color, tint: [u8; 4]) -> Color {
    Color::new(
        base.r * tint[0] as f32 / 255.0,
        base.g * tint[1] as f32 / 255.0,
        base.b * tint[2] as f32 / 255.0,
        base.a * tint[3] as f32 / 255.0,
    )
}

fn draw_mask(
    view: View,
    cache: &mut TextureCache,
    mask: &SpriteMask,
    obj: &GameObject,
    color: Color,
) {
    let tex = cache.get(mask, obj.image_index);
    let (w, h) = (tex.width(), tex.height());
    let (xs, ys) = (obj.x_scale, obj.y_scale);

    // Screen rectangle of the unrotated mask; negative scale mirrors it
    let left = if xs >= 0.0 { obj.x - mask.x_origin as f32 * xs } else { obj.x + (w - mask.x_origin as f32) * xs };
    let top = if ys >= 0.0 { obj.y - mask.y_origin as f32 * ys } else { obj.y + (h - mask.y_origin as f32) * ys };
    let (sx, sy) = view.to_screen(left, top);
    let (px, py) = view.to_screen(obj.x, obj.y);

    draw_texture_ex(
        &tex,
        sx,
        sy,
        color,
        DrawTextureParams {
            dest_size: Some(vec2(w * xs.abs() * view.scale, h * ys.abs() * view.scale)),
            flip_x: xs < 0.0,
            flip_y: ys < 0.0,
            rotation: -obj.rotation.to_radians(),
            pivot: Some(vec2(px, py)),
            ..Default::default()
        },
    );
}

fn draw_room(world: &World, editor: &EditEngine, config: &EditorConfig, view: View, cache: &mut TextureCache) {
    let (rx, ry) = view.to_screen(0.0, 0.0);
    draw_rectangle(rx, ry, ROOM_WIDTH * view.scale, ROOM_HEIGHT * view.scale, Color::from_rgba(20, 20, 28, 255));

    let mut objects: Vec<&GameObject> = world
        .store
        .iter()
        .map(|(_, o)| o)
        .filter(|o| o.visible && !o.is_destroyed())
        .collect();
    // Deeper objects draw first
    objects.sort_by(|a, b| b.depth.cmp(&a.depth));

    for obj in objects {
        if let Some(mask) = obj.mask() {
            draw_mask(view, cache, mask, obj, tinted(kind_color(obj.kind()), obj.tint));
        }
    }

    if config.show_grid && config.grid_size >= 2.0 {
        let grid = Color::from_rgba(255, 255, 255, 40);
        let mut gx = 0.0;
        while gx < ROOM_WIDTH {
            let (x, _) = view.to_screen(gx, 0.0);
            draw_line(x, ry, x, ry + ROOM_HEIGHT * view.scale, 1.0, grid);
            gx += config.grid_size;
        }
        let mut gy = 0.0;
        while gy < ROOM_HEIGHT {
            let (_, y) = view.to_screen(0.0, gy);
            draw_line(rx, y, rx + ROOM_WIDTH * view.scale, y, 1.0, grid);
            gy += config.grid_size;
        }
    }

    if let Some(preview) = editor.preview() {
        if let Some(info) = world.store.sprites().sprite_for(preview.kind) {
            let ghost = GameObject::new(preview.kind, preview.x, preview.y, Some(info.clone()));
            let mut color = kind_color(preview.kind);
            color.a *= 0.5;
            draw_mask(view, cache, &info.mask, &ghost, color);
        }
    }
}

fn load_sprites(config: &EditorConfig) -> SpriteBank {
    let builtin = SpriteBank::builtin();
    let Some(path) = &config.sprite_manifest else {
        return builtin;
    };
    match SpriteBank::load_manifest(path) {
        Ok(mut bank) => {
            bank.fill_missing_from(&builtin);
            log::info!("Loaded {} sprites from {}", bank.len(), path.display());
            bank
        }
        Err(e) => {
            log::warn!("Using built-in sprites, {}: {}", path.display(), e);
            builtin
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn pick_open_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Maps", &["ron", "jmap"])
        .pick_file()
}

#[cfg(not(target_arch = "wasm32"))]
fn pick_save_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("RON map", &["ron"])
        .add_filter("jtool map", &["jmap"])
        .set_file_name("map.ron")
        .save_file()
}

#[cfg(target_arch = "wasm32")]
fn pick_open_path() -> Option<PathBuf> {
    log::warn!("File dialogs are not available in the browser");
    None
}

#[cfg(target_arch = "wasm32")]
fn pick_save_path() -> Option<PathBuf> {
    log::warn!("File dialogs are not available in the browser");
    None
}

fn file_label(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}

fn cycle_palette(editor: &mut EditEngine, step: i32) {
    let palette = ObjectKind::PALETTE;
    let n = palette.len() as i32;
    let current = palette.iter().position(|&k| k == editor.selected()).unwrap_or(0) as i32;
    editor.set_selected(palette[(current + step).rem_euclid(n) as usize]);
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EditorConfig::load_or_default(CONFIG_PATH);
    let sprites: Rc<dyn SpriteSource> = Rc::new(load_sprites(&config));

    let mut world = World::new(sprites);
    let mut editor = EditEngine::new();
    editor.set_snap(config.snap);
    editor.set_undo_limit(config.undo_limit);
    editor.new_map(&mut world);
    world.player.death_enable = config.death_enable;

    let mut tracker = InputTracker::new();
    let mut cache = TextureCache::default();
    let mut current_path: Option<PathBuf> = None;
    let mut status = String::new();

    log::info!("jtool v{}", VERSION);

    loop {
        let view = View::fit();
        let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);

        // Shortcuts
        if ctrl && is_key_pressed(KeyCode::Z) {
            editor.undo(&mut world);
        }
        if ctrl && is_key_pressed(KeyCode::Y) {
            editor.redo(&mut world);
        }
        if ctrl && is_key_pressed(KeyCode::N) {
            editor.new_map(&mut world);
            world.player.death_enable = config.death_enable;
            current_path = None;
            status = "New map".to_string();
        }
        if ctrl && is_key_pressed(KeyCode::O) {
            if let Some(path) = pick_open_path() {
                match load_any(&path) {
                    Ok(map) => {
                        editor.load_map(&mut world, &map);
                        status = format!("Opened {}", file_label(Some(&path)));
                        current_path = Some(path);
                    }
                    Err(e) => {
                        log::error!("Failed to open {}: {}", path.display(), e);
                        status = format!("Open failed: {}", e);
                    }
                }
            }
        }
        if ctrl && is_key_pressed(KeyCode::S) {
            let target = current_path.clone().or_else(pick_save_path);
            if let Some(path) = target {
                match save_any(&editor.capture_map(&world), &path) {
                    Ok(()) => {
                        editor.mark_saved();
                        log::info!("Saved {}", path.display());
                        status = format!("Saved {}", file_label(Some(&path)));
                        current_path = Some(path);
                    }
                    Err(e) => {
                        log::error!("Failed to save {}: {}", path.display(), e);
                        status = format!("Save failed: {}", e);
                    }
                }
            }
        }

        let wheel = mouse_wheel().1;
        if wheel > 0.0 {
            cycle_palette(&mut editor, -1);
        } else if wheel < 0.0 {
            cycle_palette(&mut editor, 1);
        }

        let (mx, my) = view.to_room(mouse_position());
        let inside = (0.0..ROOM_WIDTH).contains(&mx) && (0.0..ROOM_HEIGHT).contains(&my);
        let input = tracker.snapshot(
            |key| match key {
                // Ctrl chords must not also drive the player
                Key::Left => !ctrl && is_key_down(KeyCode::Left),
                Key::Right => !ctrl && is_key_down(KeyCode::Right),
                Key::Jump => is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift),
                Key::Shoot => !ctrl && is_key_down(KeyCode::Z),
                Key::Restart => !ctrl && is_key_down(KeyCode::R),
                Key::NudgeLeft => !ctrl && is_key_down(KeyCode::A),
                Key::NudgeRight => !ctrl && is_key_down(KeyCode::D),
                Key::DragTool => is_key_down(KeyCode::Space),
                Key::Picker => ctrl,
            },
            (mx, my),
            inside,
            is_mouse_button_down(MouseButton::Left),
            is_mouse_button_down(MouseButton::Right),
            wheel,
        );

        editor.update(&mut world, &input);
        world.input = input;
        world.tick();

        clear_background(Color::from_rgba(30, 30, 35, 255));
        draw_room(&world, &editor, &config, view, &mut cache);

        let mut line = format!(
            "{} | snap {} | {}{}",
            editor.selected().label(),
            editor.snap(),
            file_label(current_path.as_deref()),
            if editor.is_modified() { " *" } else { "" },
        );
        if config.show_mouse_coord && inside {
            line.push_str(&format!(" | ({}, {})", mx.floor(), my.floor()));
        }
        if !status.is_empty() {
            line.push_str(" | ");
            line.push_str(&status);
        }
        draw_text(&line, 6.0, screen_height() - 7.0, 18.0, Color::from_rgba(220, 220, 220, 255));

        world.sweep();
        next_frame().await
    }
}
