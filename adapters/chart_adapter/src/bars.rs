use std::path::Path;

use enroll_core::domain::{BarChart, Orientation};
use enroll_core::ports::Result;
use plotters::prelude::*;

use crate::fonts::FAMILY;
use crate::{colour, render_err};

fn segment_label(value: &SegmentValue<i32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(idx) => usize::try_from(*idx)
            .ok()
            .and_then(|idx| labels.get(idx))
            .map(|label| label.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

pub(crate) fn draw(chart: &BarChart, target: &Path, with_text: bool) -> Result<()> {
    let root = BitMapBackend::new(target, chart.size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let entries = chart.table.entries();
    let slots = entries.len().max(1) as i32;
    let max = chart.table.max_count().max(1);
    let value_top = max + max / 10 + 1;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(15);
    if with_text {
        builder.caption(&chart.title, (FAMILY, 22.0));
    }

    match chart.orientation {
        Orientation::Vertical => {
            let labels: Vec<&str> = chart.table.labels().collect();
            if with_text {
                builder.x_label_area_size(60).y_label_area_size(50);
            }
            let mut ctx = builder
                .build_cartesian_2d((0..slots).into_segmented(), 0u64..value_top)
                .map_err(render_err)?;
            if with_text {
                ctx.configure_mesh()
                    .disable_x_mesh()
                    .x_labels(entries.len().max(1))
                    .x_label_formatter(&|v: &SegmentValue<i32>| segment_label(v, &labels))
                    .x_desc(chart.x_desc.as_str())
                    .y_desc(chart.y_desc.as_str())
                    .draw()
                    .map_err(render_err)?;
            }
            ctx.draw_series(entries.iter().enumerate().map(|(idx, (_, count))| {
                let slot = idx as i32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(slot), 0u64), (SegmentValue::Exact(slot + 1), *count)],
                    colour(chart.palette.for_index(idx, entries.len())).filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))
            .map_err(render_err)?;
        }
        Orientation::Horizontal => {
            // Row 0 is the bottom of the chart; the most frequent entry goes on top
            let mut labels: Vec<&str> = chart.table.labels().collect();
            labels.reverse();
            if with_text {
                builder.x_label_area_size(45).y_label_area_size(130);
            }
            let mut ctx = builder
                .build_cartesian_2d(0u64..value_top, (0..slots).into_segmented())
                .map_err(render_err)?;
            if with_text {
                ctx.configure_mesh()
                    .disable_y_mesh()
                    .y_labels(entries.len().max(1))
                    .y_label_formatter(&|v: &SegmentValue<i32>| segment_label(v, &labels))
                    .x_desc(chart.x_desc.as_str())
                    .y_desc(chart.y_desc.as_str())
                    .draw()
                    .map_err(render_err)?;
            }
            let rows = entries.len() as i32;
            ctx.draw_series(entries.iter().enumerate().map(|(idx, (_, count))| {
                let row = rows - 1 - idx as i32;
                let mut bar = Rectangle::new(
                    [(0u64, SegmentValue::Exact(row)), (*count, SegmentValue::Exact(row + 1))],
                    colour(chart.palette.for_index(idx, entries.len())).filled(),
                );
                bar.set_margin(3, 3, 0, 0);
                bar
            }))
            .map_err(render_err)?;
        }
    }

    root.present().map_err(render_err)?;
    Ok(())
}
