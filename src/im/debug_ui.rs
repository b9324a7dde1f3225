use super::core::{Im, LabelIm, RGBAIm};
use eframe::egui;

/// Tightly-packed snapshot of a label grid, detached from the caller's buffer.
#[derive(Clone, Debug)]
struct SourceLabels {
    w: usize,
    h: usize,
    labels: Vec<i32>,
    max_label: i32,
}

#[derive(Clone, Copy, Debug)]
struct VizParams {
    /// Hue-shuffle seed so visually-adjacent labels can be told apart.
    seed: u32,
}

fn label_color(label: i32, seed: u32) -> [u8; 4] {
    match label {
        0 => [0, 0, 0, 255],           // background
        -1 => [32, 32, 32, 255],       // unmarked
        -3 => [64, 48, 16, 255],       // globbed foothill
        -4 => [16, 48, 64, 255],       // too-small (reserved)
        v if v < 0 => [96, 0, 96, 255],
        v => {
            // Golden-ratio hue walk gives well-spread, stable colors per label.
            let hue = ((v as u32).wrapping_mul(2654435769).wrapping_add(seed)) as f32
                / u32::MAX as f32;
            let (r, g, b) = hue_to_rgb(hue);
            [r, g, b, 255]
        }
    }
}

fn hue_to_rgb(hue: f32) -> (u8, u8, u8) {
    let h6 = (hue.fract() * 6.0).clamp(0.0, 5.999);
    let sector = h6 as u32;
    let f = h6 - sector as f32;
    let q = ((1.0 - f) * 255.0) as u8;
    let t = (f * 255.0) as u8;
    match sector {
        0 => (255, t, 64),
        1 => (q, 255, 64),
        2 => (64, 255, t),
        3 => (64, q, 255),
        4 => (t, 64, 255),
        _ => (255, 64, q),
    }
}

impl SourceLabels {
    fn source_text_at(&self, x: usize, y: usize) -> String {
        let v = self.labels[y * self.w + x];
        match v {
            0 => "label=0 (background)".to_owned(),
            -1 => "label=-1 (unmarked)".to_owned(),
            -3 => "label=-3 (globbed)".to_owned(),
            -4 => "label=-4 (too-small)".to_owned(),
            v => format!("label={v} of {}", self.max_label),
        }
    }

    fn render_to_rgba8(&self, params: VizParams, out_rgba: &mut RGBAIm) {
        debug_assert_eq!(out_rgba.w, self.w);
        debug_assert_eq!(out_rgba.h, self.h);
        debug_assert_eq!(out_rgba.arr.len(), self.w * self.h * 4);

        for y in 0..self.h {
            for x in 0..self.w {
                let rgba = label_color(self.labels[y * self.w + x], params.seed);
                let base = (y * self.w + x) * 4;
                out_rgba.arr[base..base + 4].copy_from_slice(&rgba);
            }
        }
    }
}

struct DebugLabelApp {
    title: String,
    src: SourceLabels,
    rgba: RGBAIm,
    params: VizParams,
    texture: Option<egui::TextureHandle>,
    hover_text: String,
    cmd: String,
    status: String,
    dirty: bool,
}

impl DebugLabelApp {
    fn new(title: &str, src: SourceLabels) -> Self {
        let w = src.w;
        let h = src.h;
        let rgba = RGBAIm::new(w, h);
        Self {
            title: title.to_owned(),
            src,
            rgba,
            params: VizParams { seed: 0 },
            texture: None,
            hover_text: String::new(),
            cmd: String::new(),
            status: "cmd: seed <u32> | reset | help".to_owned(),
            dirty: true,
        }
    }

    fn render_if_needed(&mut self, ctx: &egui::Context) {
        if !self.dirty && self.texture.is_some() {
            return;
        }

        self.src.render_to_rgba8(self.params, &mut self.rgba);

        let w = self.rgba.w;
        let h = self.rgba.h;
        let img = egui::ColorImage::from_rgba_unmultiplied([w, h], &self.rgba.arr);

        match &mut self.texture {
            Some(tex) => tex.set(img, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(
                    "label_debug",
                    img,
                    egui::TextureOptions::NEAREST,
                ))
            }
        }

        self.dirty = false;
    }

    fn apply_cmd(&mut self, line: &str) {
        let mut it = line.split_whitespace();
        let Some(cmd) = it.next() else {
            return;
        };

        match cmd {
            "seed" => {
                if let Some(v) = it.next() {
                    match v.parse::<u32>() {
                        Ok(s) => {
                            self.params.seed = s;
                            self.dirty = true;
                            self.status = format!("seed set to {}", self.params.seed);
                        }
                        _ => self.status = "seed expects a u32, e.g. `seed 7`".to_owned(),
                    }
                } else {
                    self.status = "usage: seed <u32>".to_owned();
                }
            }
            "reset" => {
                self.params.seed = 0;
                self.dirty = true;
                self.status = "reset params".to_owned();
            }
            "help" => {
                self.status = "cmd: seed <u32> | reset | help".to_owned();
            }
            _ => {
                self.status = format!("unknown cmd: {cmd} (try `help`)");
            }
        }
    }
}

impl eframe::App for DebugLabelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_if_needed(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.title);
                ui.separator();
                ui.monospace(format!(
                    "labels=1..={} seed={}",
                    self.src.max_label, self.params.seed
                ));
                if !self.hover_text.is_empty() {
                    ui.separator();
                    ui.monospace(&self.hover_text);
                }
            });
        });

        egui::TopBottomPanel::bottom("bottom").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.monospace("cmd>");
                let resp = ui.add(
                    egui::TextEdit::singleline(&mut self.cmd)
                        .desired_width(f32::INFINITY)
                        .hint_text("seed 7 | reset"),
                );

                if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    let line = self.cmd.trim().to_owned();
                    self.cmd.clear();
                    self.apply_cmd(&line);
                }
            });
            if !self.status.is_empty() {
                ui.monospace(&self.status);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let w = self.src.w;
            let h = self.src.h;
            let Some(tex) = &self.texture else { return };

            // Render at 1:1 logical size; use nearest sampling.
            let image_size = egui::vec2(w as f32, h as f32);
            let response = ui.add(egui::Image::new((tex.id(), image_size)));

            if response.hovered() {
                if let Some(pos) = response.hover_pos() {
                    let rect = response.rect;
                    let fx = ((pos.x - rect.left()) / rect.width()).clamp(0.0, 0.999_999);
                    let fy = ((pos.y - rect.top()) / rect.height()).clamp(0.0, 0.999_999);
                    let x = (fx * (w as f32)) as usize;
                    let y = (fy * (h as f32)) as usize;

                    let src = self.src.source_text_at(x, y);
                    self.hover_text = format!("x={x} y={y} {src}");
                }
            }
        });

        // Keep repainting so hover text updates smoothly.
        ctx.request_repaint();
    }
}

/// Open a blocking debug window showing a label grid with per-label colors.
/// Sentinel codes (-1/-3/-4) get fixed dark shades so diagnostic-mode output
/// from `EnhancedWatershed::label` reads at a glance.
pub fn show_labels(im: &LabelIm, title: &str) -> Result<(), String> {
    let expected = im.w;
    if im.s < expected {
        return Err(format!(
            "invalid stride: s={} < w={} for a 1-channel image",
            im.s, im.w
        ));
    }

    // Pack to tightly-strided rows so debug indexing is always y*w + x.
    let mut packed = Vec::with_capacity(im.w * im.h);
    for y in 0..im.h {
        let row0 = y * im.s;
        packed.extend_from_slice(&im.arr[row0..row0 + im.w]);
    }

    let max_label = packed.iter().copied().max().unwrap_or(0).max(0);
    let src = SourceLabels {
        w: im.w,
        h: im.h,
        labels: packed,
        max_label,
    };
    run_app(title, src)
}

/// Debug view of a real-valued input field, rendered through the same window
/// by quantizing to integer gray levels.
pub fn show_grid(im: &Im<f32, 1>, title: &str) -> Result<(), String> {
    let max = im.arr.iter().copied().fold(0.0f32, f32::max).max(1.0);
    let mut labels = Vec::with_capacity(im.w * im.h);
    for y in 0..im.h {
        for x in 0..im.w {
            labels.push((im.at(x, y).max(0.0) / max * 255.0) as i32);
        }
    }
    let src = SourceLabels {
        w: im.w,
        h: im.h,
        max_label: 255,
        labels,
    };
    run_app(title, src)
}

fn run_app(title: &str, src: SourceLabels) -> Result<(), String> {
    let options = eframe::NativeOptions {
        // Let the OS choose sensible defaults; image is rendered at 1:1.
        ..Default::default()
    };

    let title_owned = title.to_owned();

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(DebugLabelApp::new(&title_owned, src)))),
    )
    .map_err(|e| e.to_string())
}
