use clap::{Parser, Subcommand};
use qr_track::matching::{MatchParams, Template, match_template};
use qr_track::models::{FrameView, Rect};
use qr_track::tools::{ReplaySession, load_gray};
use qr_track::{DisplaySnapshot, ReferenceSet, Scanner, ScannerConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "qrtrack", version, about = "QR multi-code tracking tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded decode session through the tracker
    Replay {
        /// Session JSON file (per-frame decode results)
        #[arg(long)]
        session: PathBuf,
        /// Reference dataset JSON (qr-data.json shape)
        #[arg(long)]
        references: Option<PathBuf>,
        /// RNG seed for the re-detection schedule
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Apply every recorded decode instead of sampling 30% of frames
        #[arg(long)]
        all_frames: bool,
    },
    /// Match a template image inside a frame image near a last-known position
    MatchTemplate {
        /// Frame image
        #[arg(long)]
        frame: PathBuf,
        /// Template image
        #[arg(long)]
        template: PathBuf,
        /// Last-known left edge of the template in the frame
        #[arg(long)]
        x: u32,
        /// Last-known top edge of the template in the frame
        #[arg(long)]
        y: u32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            session,
            references,
            seed,
            all_frames,
        } => replay_cmd(&session, references.as_deref(), seed, all_frames),
        Command::MatchTemplate {
            frame,
            template,
            x,
            y,
        } => match_template_cmd(&frame, &template, x, y),
    }
}

fn replay_cmd(session_path: &Path, references_path: Option<&Path>, seed: u64, all_frames: bool) {
    let session = match ReplaySession::load(session_path) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Failed to load session {}: {}", session_path.display(), err);
            return;
        }
    };

    let references = match references_path {
        Some(path) => match ReferenceSet::load(path) {
            Ok(set) => set,
            Err(err) => {
                // Degraded mode: decoding still replays, nothing matches.
                eprintln!("Failed to load references {}: {}", path.display(), err);
                ReferenceSet::default()
            }
        },
        None => ReferenceSet::default(),
    };

    let mut config = ScannerConfig::default();
    if all_frames {
        config.redetect_probability = 1.0;
    }
    let mut scanner = Scanner::with_seed(references, config, seed);
    scanner.start();

    println!(
        "Replaying {} frames at {}x{}",
        session.frames.len(),
        session.width,
        session.height
    );

    // Sessions carry no pixel data; template matching runs against a
    // blank frame and the replay exercises the time-based policies.
    let blank = vec![0u8; session.width * session.height];
    let frame = match FrameView::new(&blank, session.width, session.height) {
        Some(frame) => frame,
        None => {
            eprintln!("Invalid session dimensions");
            return;
        }
    };

    let mut last_ms = 0;
    for record in &session.frames {
        last_ms = record.at_ms;
        let mut current = record.decode.clone();
        let mut decoder = |_: &[u8], _: usize, _: usize| current.take();
        let evicted = scanner.tick(frame, record.at_ms, &mut decoder);

        for payload in evicted {
            println!("[{:>6} ms] evicted \"{payload}\"", record.at_ms);
        }
    }

    let snapshot = DisplaySnapshot::from_table(
        scanner.table(),
        (session.width as u32, session.height as u32),
        (session.width as u32, session.height as u32),
        last_ms,
    );

    println!(
        "Session end: {} tracked, {} visible",
        scanner.table().len(),
        snapshot.overlays.len()
    );
    for row in &snapshot.recent {
        let clock = if row.seconds_ago == 0 {
            "0".to_string()
        } else {
            format!("{}s ago", row.seconds_ago)
        };
        println!("  {} - {} ({})", row.label, row.payload_short, clock);
    }
}

fn match_template_cmd(frame_path: &Path, template_path: &Path, x: u32, y: u32) {
    let (frame_pixels, frame_w, frame_h) = match load_gray(frame_path) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("Failed to load frame {}: {}", frame_path.display(), err);
            return;
        }
    };
    let (template_pixels, template_w, template_h) = match load_gray(template_path) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("Failed to load template {}: {}", template_path.display(), err);
            return;
        }
    };

    let Some(frame) = FrameView::new(&frame_pixels, frame_w, frame_h) else {
        eprintln!("Invalid frame image");
        return;
    };
    let Some(template) = Template::new(template_pixels, template_w, template_h) else {
        eprintln!("Invalid template image");
        return;
    };

    let last = Rect::new(x, y, template_w as u32, template_h as u32);
    println!(
        "Frame {}x{}, template {}x{}, last position ({}, {})",
        frame_w, frame_h, template_w, template_h, x, y
    );

    match match_template(&frame, &template, &last, &MatchParams::default()) {
        Some(hit) => println!(
            "Match at ({}, {}) with score {:.3}",
            hit.rect.x, hit.rect.y, hit.score
        ),
        None => println!("No confident match near ({x}, {y})"),
    }
}
