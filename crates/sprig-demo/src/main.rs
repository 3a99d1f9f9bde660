use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use sprig_engine::assets::{AtlasLoader, PendingAtlas};
use sprig_engine::core::{App, AppControl, FrameCtx};
use sprig_engine::device::GpuInit;
use sprig_engine::logging::{init_logging, LoggingConfig};
use sprig_engine::window::{Runtime, RuntimeConfig};
use sprig_engine::{PixelRect, RendererConfig, Sprite, SpriteRenderer, Tint};

/// Bouncing-sprite stress test for the sprig renderer.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Sprites drawn per frame.
    #[arg(long, default_value_t = 20_000)]
    sprites: usize,

    /// Atlas image decoded in the background; cells are 16x16 starting at x = 16.
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Present without vsync.
    #[arg(long)]
    no_vsync: bool,

    /// RNG seed for the initial sprite layout.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

const CELL: i32 = 16;
const CELLS: i32 = 4;

struct Bouncer {
    pos: [f32; 2],
    vel: [f32; 2],
    size: i32,
    cell: i32,
    spin: f32,
    tint: Tint,
}

struct Demo {
    renderer: Option<SpriteRenderer>,
    pending_atlas: Option<PendingAtlas>,
    bouncers: Vec<Bouncer>,
    capacity: usize,
    last_report: f32,
}

impl Demo {
    fn new(args: &Args) -> Self {
        let mut rng = StdRng::seed_from_u64(args.seed);
        let bouncers = (0..args.sprites)
            .map(|i| Bouncer {
                pos: [rng.gen_range(0.0..1280.0), rng.gen_range(0.0..720.0)],
                vel: [rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0)],
                size: rng.gen_range(8..32),
                cell: (i as i32) % CELLS,
                spin: if i % 3 == 0 { 0.0 } else { rng.gen_range(-3.0..3.0) },
                tint: match i % 5 {
                    0 => Tint::WHITE.brightened(rng.gen_range(0.0..2.0)),
                    1 => Tint::rgb(255, 160, 64).with_opacity(0.6),
                    _ => Tint::rgb(rng.r#gen(), rng.r#gen(), rng.r#gen()),
                },
            })
            .collect();

        Self {
            renderer: None,
            pending_atlas: args.atlas.clone().map(AtlasLoader::spawn),
            bouncers,
            // One extra slot for the background panel.
            capacity: args.sprites + 1,
            last_report: 0.0,
        }
    }

    fn step(&mut self, dt: f32, bounds: [f32; 2]) {
        for b in &mut self.bouncers {
            for axis in 0..2 {
                b.pos[axis] += b.vel[axis] * dt;
                let max = (bounds[axis] - b.size as f32).max(0.0);
                if b.pos[axis] < 0.0 || b.pos[axis] > max {
                    b.vel[axis] = -b.vel[axis];
                    b.pos[axis] = b.pos[axis].clamp(0.0, max);
                }
            }
        }
    }

    fn queue(&self, renderer: &mut SpriteRenderer, elapsed: f32) {
        let panel = PixelRect::new(20, 20, 220, 40);
        if let Err(e) = renderer.draw_rect(panel, Tint::rgb(40, 40, 90).with_opacity(0.8), 0.0) {
            log::warn!("{e}");
            return;
        }

        for b in &self.bouncers {
            let src = PixelRect::new((b.cell + 1) * CELL, 0, CELL, CELL);
            let sprite = Sprite::new(src, [b.pos[0] as i32, b.pos[1] as i32], [b.size, b.size])
                .tint(b.tint)
                .rotation(b.spin * elapsed);
            if renderer.draw(sprite).is_err() {
                break;
            }
        }
    }
}

/// Procedural atlas: texel (0,0) white, then four 16x16 shapes.
fn builtin_atlas() -> RgbaImage {
    let width = (CELL * (CELLS + 1)) as u32;
    let mut img = RgbaImage::new(width, CELL as u32);
    img.put_pixel(0, 0, Rgba([255; 4]));

    for cell in 0..CELLS {
        for y in 0..CELL {
            for x in 0..CELL {
                let (dx, dy) = (x - CELL / 2, y - CELL / 2);
                let inside = match cell {
                    0 => dx * dx + dy * dy < 49,
                    1 => dx.abs() + dy.abs() < 8,
                    2 => dx.abs() < 7 && dy.abs() < 7,
                    _ => dx.abs() < 2 || dy.abs() < 2,
                };
                if inside {
                    img.put_pixel(((cell + 1) * CELL + x) as u32, y as u32, Rgba([255; 4]));
                }
            }
        }
    }
    img
}

impl App for Demo {
    fn on_window_event(&mut self, _id: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed
                && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
            {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let t = ctx.time;
        let vp = ctx.gpu.viewport();
        self.step(t.dt, [vp.width, vp.height]);

        let mut renderer = match self.renderer.take() {
            Some(r) => r,
            None => {
                let config = RendererConfig::default()
                    .with_capacity(self.capacity)
                    .with_clear_color(wgpu::Color { r: 0.02, g: 0.02, b: 0.05, a: 1.0 });
                match SpriteRenderer::setup(&ctx.gpu.render_ctx(), config, Some(&builtin_atlas())) {
                    Ok(r) => r,
                    Err(e) => {
                        log::error!("renderer setup failed: {e}");
                        return AppControl::Exit;
                    }
                }
            }
        };

        if ctx.resized {
            renderer.resize(&ctx.gpu.render_ctx());
        }

        if let Some(result) = self.pending_atlas.as_mut().and_then(PendingAtlas::poll) {
            match result.and_then(|img| renderer.load_atlas(&ctx.gpu.render_ctx(), &img)) {
                Ok(()) => log::info!("atlas swapped in"),
                Err(e) => log::warn!("keeping built-in atlas: {e}"),
            }
            self.pending_atlas = None;
        }

        self.queue(&mut renderer, t.elapsed);
        let mut flushed = false;
        let control = ctx.render(|rctx, target| {
            renderer.flush(rctx, target);
            flushed = true;
        });
        if !flushed {
            // Surface skipped this frame; start the next one empty.
            renderer.discard_frame();
        }
        self.renderer = Some(renderer);

        if t.elapsed - self.last_report >= 2.0 {
            self.last_report = t.elapsed;
            log::info!("{:.1} fps, {} sprites", t.fps, self.bouncers.len());
            ctx.window.set_title(&format!(
                "sprig demo - {} sprites @ {:.0} fps",
                self.bouncers.len(),
                t.fps
            ));
        }

        control
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    let args = Args::parse();
    log::info!("starting with {} sprites", args.sprites);

    let gpu_init = GpuInit {
        present_mode: if args.no_vsync {
            wgpu::PresentMode::AutoNoVsync
        } else {
            wgpu::PresentMode::Fifo
        },
        ..GpuInit::default()
    };

    let demo = Demo::new(&args);
    Runtime::run(
        RuntimeConfig {
            title: "sprig demo".to_string(),
            ..RuntimeConfig::default()
        },
        gpu_init,
        demo,
    )
}
