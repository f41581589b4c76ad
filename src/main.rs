//! A terminal frontend for the chip8 interpreter.
//!
//! The keypad is mapped onto the left hand side of a qwerty keyboard:
//!
//! ```text
//! Keypad      Keyboard
//! 1 2 3 C     1 2 3 4
//! 4 5 6 D     Q W E R
//! 7 8 9 E     A S D F
//! A 0 B F     Z X C V
//! ```
//!
//! `F5` resets the machine, `Esc` or `Ctrl-C` quits.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use chip::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    resources::{Rom, RomArchives},
    DriverContext, Settings,
};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

mod keymap;
mod terminal;

use keymap::KeyHold;
use terminal::{TerminalDisplay, TerminalTone};

#[doc(hidden)]
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, conflicts_with = "archive", help = "Path to the ROM file to run")]
    rom: Option<PathBuf>,

    #[arg(short, long, help = "Path to a zip archive of ROMs")]
    archive: Option<PathBuf>,

    #[arg(short, long, requires = "archive", help = "The ROM inside of the archive")]
    name: Option<String>,

    #[arg(short, long, default_value_t = cpu::SPEED, help = "Instructions per frame")]
    speed: usize,

    #[arg(short, long, default_value_t = timer::HERTZ, help = "Frames per second")]
    frame_rate: u32,

    #[arg(short, long, help = "Write the log into this file")]
    log_file: Option<PathBuf>,

    #[arg(long, requires = "archive", help = "List the ROMs inside of the archive")]
    list: bool,
}

/// The terminal belongs to the screen, so the log only goes into a file.
fn setup_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    let configured = std::env::var_os("RUST_LOG").is_some();
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("unable to create the log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            if !configured {
                builder.filter_level(log::LevelFilter::Debug);
            }
        }
        None if !configured => {
            builder.filter_level(log::LevelFilter::Off);
        }
        None => {}
    }
    builder.try_init()?;
    Ok(())
}

fn load_rom(args: &Args) -> anyhow::Result<Rom> {
    match (&args.rom, &args.archive, &args.name) {
        (Some(path), _, _) => Rom::from_file(path)
            .with_context(|| format!("unable to read the rom {}", path.display())),
        (None, Some(archive), Some(name)) => {
            let mut archives = RomArchives::open(archive)
                .with_context(|| format!("unable to open the archive {}", archive.display()))?;
            archives
                .get_file_data(name)
                .with_context(|| format!("unable to extract {}", name))
        }
        _ => anyhow::bail!("either --rom or --archive together with --name is required"),
    }
}

fn list_roms(archive: &Path) -> anyhow::Result<()> {
    let archives = RomArchives::open(archive)
        .with_context(|| format!("unable to open the archive {}", archive.display()))?;
    for name in archives.file_names() {
        println!("{}", name);
    }
    Ok(())
}

fn run(mut chip: ChipSet, settings: Settings) -> anyhow::Result<()> {
    let mut screen = TerminalDisplay::new().context("unable to setup the terminal")?;
    screen.status_mut().name = chip.get_name().to_string();
    let mut tone = TerminalTone::new(io::stdout());
    let mut hold = KeyHold::new();
    let mut driver = DriverContext::new(settings);

    loop {
        if event::poll(driver.until_next(Instant::now()))? {
            match event::read()? {
                Event::Key(KeyEvent {
                    code: KeyCode::Esc, ..
                }) => break,
                Event::Key(KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers,
                }) if modifiers.contains(KeyModifiers::CONTROL) => break,
                Event::Key(KeyEvent {
                    code: KeyCode::F(5),
                    ..
                }) => {
                    log::info!("resetting {}", chip.get_name());
                    hold.release_all(&mut chip);
                    chip.reset();
                }
                Event::Key(KeyEvent {
                    code: KeyCode::Char(c),
                    ..
                }) => {
                    if let Some(key) = keymap::map_key(c) {
                        hold.press(&mut chip, key, Instant::now());
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        hold.release_expired(&mut chip, now);
        {
            let status = screen.status_mut();
            status.tone = chip.is_tone_active();
            status.waiting = chip.is_paused();
        }

        if let Err(err) = driver.tick(now, &mut chip, &mut screen, &mut tone) {
            log::error!("{}\n{}", err, chip);
            return Err(err).context("the interpreter stopped");
        }
        if let Some(err) = screen.take_error() {
            return Err(err).context("unable to draw the screen");
        }
    }

    log::info!("quit after {} frames", driver.frames());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.log_file.as_deref())?;

    if args.list {
        if let Some(archive) = &args.archive {
            return list_roms(archive);
        }
    }

    let rom = load_rom(&args)?;
    let chip = ChipSet::with_rom(&rom)
        .with_context(|| format!("unable to load {}", rom.get_name()))?;
    log::info!("running {} ({} bytes)", rom.get_name(), rom.len());

    let settings = Settings {
        speed: args.speed,
        frame_rate: args.frame_rate,
    };
    run(chip, settings)
}
