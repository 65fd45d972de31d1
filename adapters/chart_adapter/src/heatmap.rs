use std::path::Path;

use enroll_core::domain::Heatmap;
use enroll_core::ports::Result;
use plotters::prelude::*;

use crate::fonts::FAMILY;
use crate::{colour, render_err};

const LEGEND_WIDTH: u32 = 90;
const LEGEND_STEPS: i32 = 60;

fn axis_label(value: &SegmentValue<i32>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(idx) => usize::try_from(*idx)
            .ok()
            .and_then(|idx| labels.get(idx))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

pub(crate) fn draw(heatmap: &Heatmap, target: &Path, with_text: bool) -> Result<()> {
    let root = BitMapBackend::new(target, heatmap.size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (width, _) = heatmap.size;
    let (plot_area, legend_area) =
        root.split_horizontally(width.saturating_sub(LEGEND_WIDTH).max(1) as i32);

    let matrix = &heatmap.matrix;
    let cols = matrix.columns.len().max(1) as i32;
    let rows = matrix.rows.len().max(1) as i32;
    let max = matrix.max_value().max(1) as f64;

    // Users listed top to bottom in row order
    let mut row_labels = matrix.rows.clone();
    row_labels.reverse();

    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(15);
    if with_text {
        builder
            .caption(&heatmap.title, (FAMILY, 22.0))
            .x_label_area_size(70)
            .y_label_area_size(110);
    }
    let mut ctx = builder
        .build_cartesian_2d((0..cols).into_segmented(), (0..rows).into_segmented())
        .map_err(render_err)?;

    if with_text {
        ctx.configure_mesh()
            .disable_mesh()
            .x_labels(matrix.columns.len().max(1))
            .y_labels(matrix.rows.len().max(1))
            .x_label_formatter(&|v: &SegmentValue<i32>| axis_label(v, &matrix.columns))
            .y_label_formatter(&|v: &SegmentValue<i32>| axis_label(v, &row_labels))
            .x_desc("category")
            .y_desc("user_id")
            .draw()
            .map_err(render_err)?;
    }

    let row_count = matrix.values.len() as i32;
    let palette = heatmap.palette;
    let cells = matrix.values.iter().enumerate().flat_map(|(r, values)| {
        let row = row_count - 1 - r as i32;
        values.iter().enumerate().map(move |(c, value)| {
            let col = c as i32;
            Rectangle::new(
                [
                    (SegmentValue::Exact(col), SegmentValue::Exact(row)),
                    (SegmentValue::Exact(col + 1), SegmentValue::Exact(row + 1)),
                ],
                colour(palette.sample(*value as f64 / max)).filled(),
            )
        })
    });
    if !matrix.is_empty() {
        ctx.draw_series(cells).map_err(render_err)?;
    }

    draw_legend(&legend_area, heatmap, max, with_text)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Vertical colour bar from zero (bottom) to the matrix maximum (top).
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    heatmap: &Heatmap,
    max: f64,
    with_text: bool,
) -> Result<()> {
    let (_, height) = area.dim_in_pixel();
    let top = 50;
    let bottom = (height as i32 - 80).max(top + LEGEND_STEPS);
    let step = ((bottom - top) / LEGEND_STEPS).max(1);

    for s in 0..LEGEND_STEPS {
        let t = 1.0 - s as f64 / (LEGEND_STEPS - 1) as f64;
        let y = top + s * step;
        area.draw(&Rectangle::new(
            [(15, y), (40, y + step)],
            colour(heatmap.palette.sample(t)).filled(),
        ))
        .map_err(render_err)?;
    }

    if with_text {
        let style = (FAMILY, 14.0).into_font().color(&BLACK);
        area.draw(&Text::new(format!("{}", max as u64), (45, top), style.clone()))
            .map_err(render_err)?;
        area.draw(&Text::new("0".to_string(), (45, top + LEGEND_STEPS * step - 14), style))
            .map_err(render_err)?;
    }
    Ok(())
}
