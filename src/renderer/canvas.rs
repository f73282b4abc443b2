//! Canvas 2D renderer
//!
//! Draws a `FrameSnapshot` onto a `<canvas>`. World units are percent of the
//! canvas size with `y` growing upward, so every rectangle is flipped.

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::sim::frame::{FrameSnapshot, GameOverView, Pose};
use crate::sim::{GameOverPhase, Lifecycle, ObstacleType, Rect};

/// Sprite sheet slots, in preload order
pub const SPRITE_PATHS: [&str; 4] = [
    "assets/playchannel/runner.png",
    "assets/playchannel/tree.png",
    "assets/playchannel/stick.png",
    "assets/playchannel/zonda.png",
];

const RUNNER: usize = 0;
const TREE: usize = 1;
const STICK: usize = 2;
const CHARGE: usize = 3;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    sprites: Vec<HtmlImageElement>,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self {
            ctx,
            width,
            height,
            sprites: Vec::new(),
        }
    }

    pub fn set_sprites(&mut self, sprites: Vec<HtmlImageElement>) {
        self.sprites = sprites;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// World rect to canvas (x, y, w, h)
    fn to_canvas(&self, rect: &Rect) -> (f64, f64, f64, f64) {
        let sx = self.width / 100.0;
        let sy = self.height / 100.0;
        (
            rect.min.x as f64 * sx,
            self.height - rect.max.y as f64 * sy,
            rect.width() as f64 * sx,
            rect.height() as f64 * sy,
        )
    }

    fn fill(&self, rect: &Rect, color: &str) {
        let (x, y, w, h) = self.to_canvas(rect);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn outline(&self, rect: &Rect, color: &str) {
        let (x, y, w, h) = self.to_canvas(rect);
        self.ctx.set_stroke_style_str(color);
        self.ctx.stroke_rect(x, y, w, h);
    }

    /// Draw a sprite if it finished loading, otherwise a flat rectangle
    fn sprite_or_fill(&self, slot: usize, rect: &Rect, color: &str) {
        let (x, y, w, h) = self.to_canvas(rect);
        if let Some(img) = self.sprites.get(slot).filter(|i| i.complete() && i.natural_width() > 0) {
            if self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h)
                .is_ok()
            {
                return;
            }
        }
        self.fill(rect, color);
    }

    fn text(&self, text: &str, x: f64, y: f64, size: u32) -> Result<(), JsValue> {
        self.ctx.set_font(&format!("{size}px monospace"));
        self.ctx.set_fill_style_str("#9fffb0");
        self.ctx.fill_text(text, x, y)
    }

    pub fn render(&self, frame: &FrameSnapshot) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str("#050a05");
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);

        // Scanline parallax
        let offset = frame.bg_offset as f64 / 100.0 * self.width;
        self.ctx.set_fill_style_str("#0c1a0c");
        let mut x = -offset;
        while x < self.width {
            self.ctx.fill_rect(x, 0.0, 2.0, self.height);
            x += self.width / 10.0;
        }

        for obstacle in &frame.obstacles {
            match obstacle.ty {
                ObstacleType::Floor => self.fill(&obstacle.rect, "#3fae4f"),
                ObstacleType::Ceiling => self.fill(&obstacle.rect, "#ae3f4f"),
                ObstacleType::Middle => self.sprite_or_fill(TREE, &obstacle.rect, "#2f7f3f"),
                ObstacleType::Empty => {}
            }
            if let Some(item) = obstacle.collectible.as_ref().filter(|c| !c.collected) {
                let (slot, color) = match obstacle.ty {
                    ObstacleType::Middle => (STICK, "#c8a060"),
                    _ => (CHARGE, "#60c8ff"),
                };
                self.sprite_or_fill(slot, &item.rect, color);
            }
        }

        let actor_color = match frame.actor.pose {
            Pose::Crashed => "#ff4040",
            Pose::Gliding => "#60c8ff",
            _ => "#e0ffe0",
        };
        self.sprite_or_fill(RUNNER, &frame.actor.rect, actor_color);

        if let Some(hitboxes) = &frame.hitboxes {
            self.outline(&hitboxes.actor, "#ffff00");
            for rect in &hitboxes.obstacles {
                self.outline(rect, "#ff00ff");
            }
            for rect in &hitboxes.collectibles {
                self.outline(rect, "#00ffff");
            }
        }

        self.text(&format!("DIST {:06}", frame.score), 12.0, 24.0, 16)?;
        self.text(&format!("STICKS {}", frame.sticks), 12.0, 44.0, 16)?;
        self.text(&format!("GLIDE x{}", frame.glide_charges), 12.0, 64.0, 16)?;
        if frame.glide_remaining > 0.0 {
            self.text(&format!("{:.1}s", frame.glide_remaining), 120.0, 64.0, 16)?;
        }
        self.text(&format!("HI {:06}", frame.high_score), self.width - 140.0, 24.0, 16)?;
        if !frame.collisions_enabled {
            self.text("NOCLIP", self.width - 140.0, 44.0, 16)?;
        }

        match (frame.lifecycle, &frame.game_over) {
            (Lifecycle::Menu, _) => {
                self.text("PRESS START", self.width / 2.0 - 70.0, self.height / 2.0, 20)?;
            }
            (Lifecycle::GameOver, Some(view)) => self.render_game_over(view)?,
            _ => {}
        }
        Ok(())
    }

    fn render_game_over(&self, view: &GameOverView) -> Result<(), JsValue> {
        let cx = self.width / 2.0 - 110.0;
        let cy = self.height / 3.0;
        if view.phase == GameOverPhase::Panel {
            return self.text("SIGNAL LOST", cx, cy, 24);
        }
        let lines = [
            format!("DISTANCE  {}", view.distance),
            format!("STICKS    {}", view.sticks),
            format!("ZONDA     {}", view.charges),
            format!("SCORE     {}", view.displayed_score),
        ];
        for (i, line) in lines.iter().take(view.recap_step as usize).enumerate() {
            self.text(line, cx, cy + i as f64 * 26.0, 18)?;
        }
        if view.show_record_message {
            let msg = match view.is_new_record {
                Some(true) => "NEW RECORD!",
                _ => "NO NEW RECORD",
            };
            self.text(msg, cx, cy + 4.0 * 26.0 + 10.0, 18)?;
        }
        if view.allow_restart {
            self.text("PRESS R TO RETRY", cx, cy + 5.0 * 26.0 + 20.0, 16)?;
        }
        Ok(())
    }
}
