use argh::FromArgs;
use spinwarp::config::Config;
use spinwarp::im::RGBAIm;
use spinwarp::session::{AnimationSession, DriverState, FrameHost, TickHandle};
use spinwarp::viewer;
use std::path::{Path, PathBuf};

#[derive(FromArgs)]
/// Spin an image in place, resampled through a 3x3 affine matrix per frame.
struct Args {
    /// image to animate (.ppm, or anything `image` can read)
    #[argh(positional)]
    image: Option<PathBuf>,

    /// JSON config file
    #[argh(option)]
    config: Option<PathBuf>,

    /// render this many frames without a window and write them to --out-dir
    #[argh(option)]
    dump_frames: Option<u64>,

    /// directory for dumped frames
    #[argh(option, default = "PathBuf::from(\"frames\")")]
    out_dir: PathBuf,

    /// also write the static (vertically mirrored) preview when dumping
    #[argh(switch)]
    preview: bool,
}

/// Writes every presented frame to disk and ticks on demand.
struct DumpHost {
    out_dir: PathBuf,
    n_written: usize,
    next_id: u64,
    scheduled: Option<TickHandle>,
    err: Option<spinwarp::error::Error>,
}

impl DumpHost {
    fn new(out_dir: PathBuf) -> Self {
        Self {
            out_dir,
            n_written: 0,
            next_id: 0,
            scheduled: None,
            err: None,
        }
    }

    fn write_frame(&self, frame: &RGBAIm) -> spinwarp::error::Result<PathBuf> {
        write_image(&self.out_dir, &format!("frame_{:04}", self.n_written), frame)
    }
}

impl FrameHost for DumpHost {
    fn present(&mut self, frame: &RGBAIm) {
        if self.err.is_some() {
            return;
        }
        match self.write_frame(frame) {
            Ok(path) => {
                log::debug!("wrote {}", path.display());
                self.n_written += 1;
            }
            Err(e) => self.err = Some(e),
        }
    }

    fn schedule_frame(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.scheduled = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: TickHandle) {
        if self.scheduled == Some(handle) {
            self.scheduled = None;
        }
    }
}

/// Writes `<stem>.png`, or `<stem>.ppm` without `im-io`.
fn write_image(dir: &Path, stem: &str, im: &RGBAIm) -> spinwarp::error::Result<PathBuf> {
    #[cfg(feature = "im-io")]
    {
        let path = dir.join(format!("{stem}.png"));
        im.save_png(&path)?;
        Ok(path)
    }

    #[cfg(not(feature = "im-io"))]
    {
        let path = dir.join(format!("{stem}.ppm"));
        std::fs::write(&path, spinwarp::im::encode_ppm(im))?;
        Ok(path)
    }
}

fn dump_frames(
    config: Config,
    image: PathBuf,
    n_frames: u64,
    out_dir: PathBuf,
    preview: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&out_dir)?;
    let mut host = DumpHost::new(out_dir);
    let mut session = AnimationSession::new(config);

    if n_frames == 0 {
        return Ok(());
    }

    // Loading renders frame 0.
    session.load_path(&image, &mut host)?;
    while session.elapsed_frames() < n_frames {
        if let Some(e) = host.err.take() {
            return Err(e.into());
        }
        let DriverState::Animating { pending } = session.state() else {
            break;
        };
        session.on_tick(pending, &mut host)?;
    }
    if let Some(e) = host.err.take() {
        return Err(e.into());
    }

    if preview {
        if let Some(im) = session.render_preview()? {
            let path = write_image(&host.out_dir, "preview", &im)?;
            println!("wrote preview to {}", path.display());
        }
    }

    println!(
        "wrote {} frames to {}",
        host.n_written,
        host.out_dir.display()
    );
    println!("last composite:\n{}", session.matrix_text());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match args.dump_frames {
        Some(n_frames) => {
            let Some(image) = args.image else {
                return Err("--dump-frames needs an image path".into());
            };
            dump_frames(config, image, n_frames, args.out_dir, args.preview)
        }
        None => {
            viewer::run(config, args.image)?;
            Ok(())
        }
    }
}
