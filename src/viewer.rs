// Animation window.
//
// eframe stands in for the display surface and frame scheduler: presenting a
// frame uploads it to a texture, and scheduling a tick asks egui for another
// repaint. The next `update()` delivers the tick back to the session.
//
// When the `viewer` feature is disabled (or `cli_only` is enabled), `run`
// returns an error instead of opening a window.

#[cfg(all(feature = "viewer", not(feature = "cli_only")))]
mod imp {
    use crate::config::Config;
    use crate::error::{Error, Result};
    use crate::im::RGBAIm;
    use crate::session::{AnimationSession, DriverState, FrameHost, TickHandle};
    use eframe::egui;
    use std::path::PathBuf;

    const HELP: &str =
        "cmd: load <path> | pause | resume | step | stop | preview | size <pix> | speed <deg> | help";

    struct EguiHost {
        ctx: egui::Context,
        texture: Option<egui::TextureHandle>,
        frame_size: (usize, usize),
        next_id: u64,
        scheduled: Option<TickHandle>,
    }

    impl FrameHost for EguiHost {
        fn present(&mut self, frame: &RGBAIm) {
            let img = egui::ColorImage::from_rgba_unmultiplied([frame.w, frame.h], &frame.arr);
            self.frame_size = (frame.w, frame.h);

            match &mut self.texture {
                Some(tex) => tex.set(img, egui::TextureOptions::NEAREST),
                None => {
                    self.texture = Some(self.ctx.load_texture(
                        "spin_frame",
                        img,
                        egui::TextureOptions::NEAREST,
                    ))
                }
            }
        }

        fn schedule_frame(&mut self) -> TickHandle {
            self.next_id += 1;
            let handle = TickHandle(self.next_id);
            self.scheduled = Some(handle);
            self.ctx.request_repaint();
            handle
        }

        fn cancel_frame(&mut self, handle: TickHandle) {
            if self.scheduled == Some(handle) {
                self.scheduled = None;
            }
        }
    }

    struct SpinViewer {
        session: AnimationSession,
        host: EguiHost,

        // UI state
        previewing: bool,
        hover_text: String,
        cmd: String,
        status: String,
    }

    impl SpinViewer {
        fn new(ctx: &egui::Context, config: Config) -> Self {
            Self {
                session: AnimationSession::new(config),
                host: EguiHost {
                    ctx: ctx.clone(),
                    texture: None,
                    frame_size: (0, 0),
                    next_id: 0,
                    scheduled: None,
                },
                previewing: false,
                hover_text: String::new(),
                cmd: String::new(),
                status: HELP.to_owned(),
            }
        }

        fn load(&mut self, path: PathBuf) {
            self.previewing = false;
            match self.session.load_path(&path, &mut self.host) {
                Ok(()) => self.status = format!("loaded {}", path.display()),
                Err(e) => self.status = format!("load failed: {e}"),
            }
        }

        fn deliver_tick(&mut self) {
            let Some(handle) = self.host.scheduled.take() else {
                return;
            };
            if let Err(e) = self.session.on_tick(handle, &mut self.host) {
                log::error!("frame failed: {e}");
                self.status = format!("frame failed: {e}");
                self.session.stop(&mut self.host);
            }
        }

        fn rgba_text_at(&self, x: usize, y: usize) -> String {
            if self.previewing {
                return String::new();
            }
            match self.session.frame().and_then(|f| f.pixel(x, y)) {
                Some([r, g, b, a]) => format!("viz=rgba8({r},{g},{b},{a})"),
                None => String::new(),
            }
        }

        fn step(&mut self) -> Result<()> {
            self.previewing = false;
            self.session.step(&mut self.host)
        }

        fn apply_cmd(&mut self, line: &str) {
            let mut it = line.split_whitespace();
            let Some(cmd) = it.next() else {
                return;
            };

            match cmd {
                "load" => {
                    let rest: Vec<&str> = it.collect();
                    if rest.is_empty() {
                        self.status = "usage: load <path>".to_owned();
                    } else {
                        self.load(PathBuf::from(rest.join(" ")));
                    }
                }
                "pause" => {
                    self.session.set_paused(true);
                    self.status = "paused".to_owned();
                }
                "resume" => {
                    self.previewing = false;
                    self.session.set_paused(false);
                    self.status = "resumed".to_owned();
                }
                "step" => match self.step() {
                    Ok(()) => self.status = format!("frame {}", self.session.elapsed_frames()),
                    Err(e) => self.status = format!("step failed: {e}"),
                },
                "stop" => {
                    self.session.stop(&mut self.host);
                    self.status = "stopped".to_owned();
                }
                "preview" => match self.session.show_preview(&mut self.host) {
                    Ok(true) => {
                        self.previewing = true;
                        self.status = "preview (paused; `resume` to continue)".to_owned();
                    }
                    Ok(false) => self.status = "nothing loaded".to_owned(),
                    Err(e) => self.status = format!("preview failed: {e}"),
                },
                "size" => match it.next().map(str::parse::<usize>) {
                    Some(Ok(pix)) if pix >= 1 => {
                        let config = Config {
                            target_size: pix,
                            ..self.session.config().clone()
                        };
                        self.session.set_config(config);
                        self.status = format!("target_size set to {pix}");
                    }
                    _ => self.status = "size expects a usize >= 1, e.g. `size 256`".to_owned(),
                },
                "speed" => match it.next().map(str::parse::<f64>) {
                    Some(Ok(deg)) if deg.is_finite() => {
                        let config = Config {
                            angular_step_deg: deg,
                            ..self.session.config().clone()
                        };
                        self.session.set_config(config);
                        self.status = format!("angular_step_deg set to {deg}");
                    }
                    _ => self.status = "speed expects a finite f64, e.g. `speed 2.5`".to_owned(),
                },
                "help" => {
                    self.status = HELP.to_owned();
                }
                _ => {
                    self.status = format!("unknown cmd: {cmd} (try `help`)");
                }
            }
        }

        fn handle_input(&mut self, ctx: &egui::Context) {
            let dropped: Vec<PathBuf> =
                ctx.input(|i| i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect());
            if let Some(path) = dropped.into_iter().last() {
                self.load(path);
            }

            if ctx.wants_keyboard_input() {
                return;
            }
            if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
                let paused = !self.session.is_paused();
                self.previewing = false;
                self.session.set_paused(paused);
                self.status = if paused { "paused" } else { "resumed" }.to_owned();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::N)) {
                if let Err(e) = self.step() {
                    self.status = format!("step failed: {e}");
                }
            }
        }
    }

    impl eframe::App for SpinViewer {
        fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
            self.handle_input(ctx);
            self.deliver_tick();

            egui::TopBottomPanel::top("top").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let state = match self.session.state() {
                        DriverState::Idle => "idle",
                        DriverState::Animating { .. } if self.previewing => "preview",
                        DriverState::Animating { .. } if self.session.is_paused() => "paused",
                        DriverState::Animating { .. } => "animating",
                    };
                    ui.monospace(format!("{state} frame={}", self.session.elapsed_frames()));
                    if let Some(im) = self.session.image() {
                        ui.separator();
                        ui.monospace(format!("src={}x{}", im.w, im.h));
                    }
                    let stats = self.session.last_stats();
                    ui.separator();
                    ui.monospace(format!("sampled={} blanked={}", stats.sampled, stats.blanked));
                    if !self.hover_text.is_empty() {
                        ui.separator();
                        ui.monospace(&self.hover_text);
                    }
                });
            });

            egui::SidePanel::right("matrix").show(ctx, |ui| {
                ui.heading("Composite");
                ui.separator();
                for line in self.session.matrix_text().lines() {
                    ui.monospace(line);
                }
            });

            egui::TopBottomPanel::bottom("bottom").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.monospace("cmd>");
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut self.cmd)
                            .desired_width(f32::INFINITY)
                            .hint_text("load image.ppm | pause | step | preview | size 256"),
                    );

                    if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        let line = self.cmd.trim().to_owned();
                        self.cmd.clear();
                        self.apply_cmd(&line);
                    }
                });
                ui.monospace("hotkeys: Space pause/resume, n step, drop a file to load it");
                if !self.status.is_empty() {
                    ui.monospace(&self.status);
                }
            });

            egui::CentralPanel::default().show(ctx, |ui| {
                let Some(tex) = &self.host.texture else {
                    ui.label("No image loaded.");
                    return;
                };
                let (w, h) = self.host.frame_size;

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
                        let viz = self.rgba_text_at(x, y);
                        self.hover_text = format!("x={x} y={y} {viz}");
                    }
                }
            });
        }
    }

    /// Opens the window and blocks until it is closed.
    pub fn run(config: Config, initial: Option<PathBuf>) -> Result<()> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size(egui::vec2(1200.0, 800.0)),
            ..Default::default()
        };

        eframe::run_native(
            "spinwarp",
            options,
            Box::new(move |cc| {
                let mut app = SpinViewer::new(&cc.egui_ctx, config);
                if let Some(path) = initial {
                    app.load(path);
                }
                Ok(Box::new(app))
            }),
        )
        .map_err(|e| Error::Viewer(e.to_string()))
    }
}

/// Stand-in when the viewer feature is disabled or cli_only is enabled.
#[cfg(not(all(feature = "viewer", not(feature = "cli_only"))))]
mod imp {
    use crate::config::Config;
    use crate::error::{Error, Result};
    use std::path::PathBuf;

    pub fn run(_config: Config, _initial: Option<PathBuf>) -> Result<()> {
        Err(Error::Viewer(
            "built without the `viewer` feature; use --dump-frames".to_owned(),
        ))
    }
}

pub use imp::*;
