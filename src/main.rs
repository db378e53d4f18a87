use std::num::{NonZeroUsize, ParseIntError};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{info, warn, Level};

use nes_sprite_reader::bmp;
use nes_sprite_reader::palette::Palette;
use nes_sprite_reader::profile::{CartridgeProfile, PaletteSource};
use nes_sprite_reader::render::{self, frame::Frame, TileSheet, Transparency};
use nes_sprite_reader::rom::Rom;

/// Pull sprite tiles out of NES ROMs and save them as bitmaps.
#[derive(Parser)]
#[command(name = "nes-sprite-reader", version)]
struct Cli {
    /// More logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the iNES header and section layout.
    Info {
        /// Path to the ROM.
        rom: PathBuf,
    },

    /// List the palettes, sprites and blocks a profile defines.
    List {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Write every tile to one image, numbering each row.
    Dump {
        #[command(flatten)]
        source: Source,

        /// Output file.
        #[arg(short, long, default_value = "all_sprites.bmp")]
        output: PathBuf,

        /// Tiles per row.
        #[arg(long, default_value = "10")]
        per_row: NonZeroUsize,

        /// Named palette from the profile; greyscale if omitted.
        #[arg(long)]
        palette: Option<String>,

        /// Don't stamp the index of each row's first tile.
        #[arg(long)]
        no_labels: bool,
    },

    /// Write a single multi-tile sprite.
    Sprite {
        #[command(flatten)]
        source: Source,

        /// Named sprite from the profile.
        #[arg(long, required_unless_present = "tiles", conflicts_with = "tiles")]
        name: Option<String>,

        /// Tile indices, rows separated by ';' and columns by ',' (e.g. "0,2;1,3").
        #[arg(long, value_parser = parse_tiles)]
        tiles: Option<TileRows>,

        /// Named palette from the profile; greyscale if omitted.
        #[arg(long)]
        palette: Option<String>,

        /// Output file.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a block of sprites, each in its own palette.
    Block {
        #[command(flatten)]
        source: Source,

        /// Named block from the profile.
        #[arg(long)]
        name: String,

        /// Output file.
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ProfileArgs {
    /// Cartridge profile file (JSON).
    #[arg(long, conflicts_with = "cartridge")]
    profile: Option<PathBuf>,

    /// Built-in cartridge profile (e.g. smb3).
    #[arg(long)]
    cartridge: Option<String>,
}

impl ProfileArgs {
    fn load(&self) -> Result<CartridgeProfile> {
        if let Some(path) = &self.profile {
            return CartridgeProfile::load(path)
                .with_context(|| format!("loading profile {}", path.display()));
        }

        match &self.cartridge {
            Some(name) => CartridgeProfile::builtin(name).cloned().with_context(|| {
                format!(
                    "no built-in profile '{}' (available: {})",
                    name,
                    CartridgeProfile::builtin_names().join(", ")
                )
            }),
            None => Ok(CartridgeProfile::default()),
        }
    }
}

#[derive(Args)]
struct Source {
    /// Path to the ROM.
    rom: PathBuf,

    #[command(flatten)]
    profile: ProfileArgs,

    /// File offset of tile 0 (decimal or 0x hex). Overrides the profile and
    /// the iNES header.
    #[arg(long, value_parser = parse_offset)]
    base_offset: Option<usize>,

    /// How to draw pixel value 0. Falls back to the profile's setting, then
    /// to opaque.
    #[arg(long, value_enum)]
    background: Option<Transparency>,
}

/// A ROM with the profile describing it.
struct Cartridge {
    rom: Rom,
    profile: CartridgeProfile,
    base_offset: Option<usize>,
    transparency: Transparency,
}

impl Cartridge {
    fn load(source: &Source) -> Result<Self> {
        let profile = source.profile.load()?;
        let rom = Rom::open(&source.rom)
            .with_context(|| format!("reading rom {}", source.rom.display()))?;

        Ok(Cartridge {
            base_offset: source.base_offset.or(profile.base_offset),
            transparency: source
                .background
                .or(profile.transparency)
                .unwrap_or(Transparency::Opaque),
            rom,
            profile,
        })
    }

    fn sheet(&self) -> Result<TileSheet<'_>> {
        let region = self.rom.sprite_region(self.base_offset)?;
        Ok(TileSheet::new(self.rom.bytes(), region))
    }

    fn palette(&self, name: Option<&str>) -> Result<Palette> {
        match name {
            Some(name) => Ok(self.profile.palette(self.rom.bytes(), name)?),
            None => Ok(Palette::grey()),
        }
    }
}

fn parse_offset(s: &str) -> Result<usize, ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

/// Rows of tile indices given on the command line.
#[derive(Debug, Clone, PartialEq)]
struct TileRows(Vec<Vec<usize>>);

fn parse_tiles(s: &str) -> Result<TileRows, String> {
    let rows = s
        .split(';')
        .map(|row| {
            row.split(',')
                .map(|n| {
                    parse_offset(n.trim()).map_err(|e| format!("bad tile index '{}': {}", n, e))
                })
                .collect::<Result<Vec<usize>, String>>()
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(TileRows(rows))
}

fn save(frame: &Frame, path: &Path) -> Result<()> {
    bmp::write_bmp(frame, path).with_context(|| format!("writing {}", path.display()))?;
    println!("{} ({}x{})", path.display(), frame.width, frame.height);
    Ok(())
}

fn print_info(path: &Path) -> Result<()> {
    let rom = Rom::open(path).with_context(|| format!("reading rom {}", path.display()))?;

    match &rom.header {
        Some(header) => {
            if header.is_nes2() {
                warn!("NES 2.0 header, only the iNES fields are shown");
            }
            println!("{}", header)
        }
        None => println!("{}: no iNES header, {} bytes", path.display(), rom.bytes().len()),
    }

    Ok(())
}

fn list(profile: &CartridgeProfile) {
    println!("profile: {}", profile.name);
    if let Some(offset) = profile.base_offset {
        println!("base offset: 0x{:x}", offset);
    }

    println!("palettes:");
    for (name, source) in &profile.palettes {
        match source {
            PaletteSource::Address(address) => println!("  {} @ 0x{:x}", name, address),
            PaletteSource::Colours(colours) => println!("  {} {:?}", name, colours),
        }
    }

    println!("sprites:");
    for (name, tiles) in &profile.sprites {
        let (width, height) = render::sprite_size(tiles);
        println!("  {} ({}x{})", name, width, height);
    }

    println!("blocks:");
    for (name, rows) in &profile.blocks {
        println!("  {} ({} rows)", name, rows.len());
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Info { rom } => print_info(&rom),

        Command::List { profile } => {
            list(&profile.load()?);
            Ok(())
        }

        Command::Dump {
            source,
            output,
            per_row,
            palette,
            no_labels,
        } => {
            let cart = Cartridge::load(&source)?;
            let sheet = cart.sheet()?;
            info!("dumping {} tiles", sheet.tile_count());

            let palette = cart.palette(palette.as_deref())?;
            let frame = render::dump_all(&sheet, &palette, per_row, !no_labels, cart.transparency)?;
            save(&frame, &output)
        }

        Command::Sprite {
            source,
            name,
            tiles,
            palette,
            output,
        } => {
            let cart = Cartridge::load(&source)?;
            let sheet = cart.sheet()?;
            let palette = cart.palette(palette.as_deref())?;

            let frame = match (&tiles, &name) {
                (Some(tiles), _) => {
                    render::draw_sprite(&sheet, &tiles.0, &palette, cart.transparency)?
                }
                (None, Some(name)) => {
                    let sprite = cart.profile.sprite(name)?;
                    render::draw_sprite(&sheet, sprite, &palette, cart.transparency)?
                }
                (None, None) => anyhow::bail!("either --name or --tiles is required"),
            };
            save(&frame, &output)
        }

        Command::Block {
            source,
            name,
            output,
        } => {
            let cart = Cartridge::load(&source)?;
            let sheet = cart.sheet()?;
            let block = cart.profile.block(cart.rom.bytes(), &name)?;

            let frame = render::draw_sprite_block(&sheet, &block, cart.transparency)?;
            save(&frame, &output)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    simple_logger::init_with_level(level)?;

    run(cli.command)
}
