//! Frequency-weighted word cloud.
//!
//! Layout is deterministic: words are taken in table order, sized by the square
//! root of their relative frequency and dropped onto the first free spot along
//! a spiral that starts at the canvas centre. The largest font is lowered until
//! the estimated ink of all words fits the canvas. A word that finds no spot is
//! shrunk and retried down to the minimum size, then left out.

use std::f64::consts::PI;
use std::path::Path;

use enroll_core::domain::{FrequencyTable, Palette, WordCloud};
use enroll_core::ports::Result;
use plotters::prelude::*;

use crate::fonts::FAMILY;
use crate::{colour, render_err};

const MIN_FONT_PX: u32 = 10;
const SHRINK: f64 = 0.8;
/// Radial growth per full turn of the spiral, in pixels.
const SPIRAL_PITCH: f64 = 5.0;
/// Distance walked along the spiral between candidate positions, in pixels.
const ARC_STEP: f64 = 5.0;
const PADDING: i32 = 2;
/// Share of the canvas the estimated word boxes may cover.
const FILL_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w + PADDING
            && other.x < self.x + self.w + PADDING
            && self.y < other.y + other.h + PADDING
            && other.y < self.y + self.h + PADDING
    }

    fn fits(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x + self.w <= width && self.y + self.h <= height
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    pub word: String,
    pub font_px: u32,
    pub rect: Rect,
}

/// Approximate box of `word` rendered at `font_px`.
fn text_extent(word: &str, font_px: u32) -> (i32, i32) {
    let chars = word.chars().count().max(1) as f64;
    let w = (chars * font_px as f64 * 0.62).ceil() as i32;
    let h = (font_px as f64 * 1.2).ceil() as i32;
    (w.max(1), h.max(1))
}

fn find_spot(
    word: &str,
    font_px: u32,
    (width, height): (i32, i32),
    placed: &[Placement],
) -> Option<Rect> {
    let (w, h) = text_extent(word, font_px);
    if w > width || h > height {
        return None;
    }

    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let aspect = width as f64 / height as f64;
    // Past this radius every spiral point lies outside the canvas
    let limit = ((cx / aspect).powi(2) + cy * cy).sqrt();
    let b = SPIRAL_PITCH / (2.0 * PI);

    let mut theta = 0.0_f64;
    loop {
        let r = b * theta;
        if r > limit {
            return None;
        }
        let candidate = Rect {
            x: (cx + r * theta.cos() * aspect - w as f64 / 2.0).round() as i32,
            y: (cy + r * theta.sin() - h as f64 / 2.0).round() as i32,
            w,
            h,
        };
        if candidate.fits(width, height) && !placed.iter().any(|p| p.rect.overlaps(&candidate)) {
            return Some(candidate);
        }
        theta += (ARC_STEP / r.max(ARC_STEP)).min(0.5);
    }
}

fn font_size(count: u64, max_count: f64, max_font: u32) -> u32 {
    let relative = (count as f64 / max_count).sqrt();
    MIN_FONT_PX + ((max_font - MIN_FONT_PX) as f64 * relative).round() as u32
}

/// Largest font, from a quarter of the canvas height down, whose word boxes fit the budget.
fn fitted_max_font(table: &FrequencyTable, (width, height): (u32, u32), max_count: f64) -> u32 {
    let budget = FILL_RATIO * width as f64 * height as f64;
    let ink = |max_font: u32| -> f64 {
        table
            .entries()
            .iter()
            .map(|(word, count)| {
                let (w, h) = text_extent(word, font_size(*count, max_count, max_font));
                ((w + PADDING) as f64) * ((h + PADDING) as f64)
            })
            .sum()
    };

    let mut max_font = (height / 4).max(MIN_FONT_PX);
    while max_font > MIN_FONT_PX && ink(max_font) > budget {
        max_font = ((max_font as f64 * 0.9) as u32).max(MIN_FONT_PX);
    }
    max_font
}

pub(crate) fn layout(table: &FrequencyTable, size: (u32, u32)) -> Vec<Placement> {
    let bounds = (size.0 as i32, size.1 as i32);
    let max_count = table.max_count().max(1) as f64;
    let max_font = fitted_max_font(table, size, max_count);

    let mut placed: Vec<Placement> = Vec::with_capacity(table.len());
    for (word, count) in table.entries() {
        let mut font_px = font_size(*count, max_count, max_font);
        loop {
            if let Some(rect) = find_spot(word, font_px, bounds, &placed) {
                placed.push(Placement {
                    word: word.clone(),
                    font_px,
                    rect,
                });
                break;
            }
            if font_px <= MIN_FONT_PX {
                break;
            }
            font_px = ((font_px as f64 * SHRINK) as u32).max(MIN_FONT_PX);
        }
    }
    placed
}

pub(crate) fn draw(cloud: &WordCloud, target: &Path, with_text: bool) -> Result<()> {
    let root = BitMapBackend::new(target, cloud.size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let placements = layout(&cloud.table, cloud.size);
    let last = placements.len().saturating_sub(1).max(1) as f64;

    for (rank, placement) in placements.iter().enumerate() {
        // Stop short of the pale end of the ramp so words stay readable on white
        let fill = colour(Palette::Viridis.sample(0.85 * rank as f64 / last));
        let Rect { x, y, w, h } = placement.rect;
        if with_text {
            let style = (FAMILY, placement.font_px as f64).into_font().color(&fill);
            root.draw(&Text::new(placement.word.as_str(), (x, y), style))
                .map_err(render_err)?;
        } else {
            let block = [(x, y + h / 4), (x + w, y + h * 3 / 4)];
            root.draw(&Rectangle::new(block, fill.mix(0.8).filled()))
                .map_err(render_err)?;
        }
    }

    root.present().map_err(render_err)?;
    Ok(())
}
