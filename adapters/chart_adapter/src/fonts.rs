use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{register_font, FontStyle};
use tracing::{info, warn};

/// Family name every chart asks for.
pub(crate) const FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Registers a TrueType font for [`FAMILY`] the first time it is called.
///
/// The registry is process-wide and settled by the first caller; later
/// `preferred` paths are ignored. Returns whether text can be drawn.
pub(crate) fn ensure_font(preferred: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // plotters keeps a reference for the life of the process
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match register_font(FAMILY, FontStyle::Normal, bytes) {
                Ok(()) => {
                    info!(font = %path.display(), "chart font registered");
                    return true;
                }
                Err(_) => warn!(font = %path.display(), "not a usable TrueType font"),
            }
        }

        warn!("no TrueType font found; charts are written without text");
        false
    })
}
