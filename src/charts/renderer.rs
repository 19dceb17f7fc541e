//! Static Chart Renderer
//! Renders a chart view model to a PNG image with plotters.
//!
//! Layout:
//! 1. Caption centered at the top
//! 2. Grouped bars, one color per series, region labels under each group
//! 3. Legend in the upper right corner

use crate::data::{ChartViewModel, ColorStyle};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

const FONT: &str = "sans-serif";
const LABEL_CHAR_WIDTH: i32 = 7;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to render: the chart has no bars")]
    EmptyChart,
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Pixel buffer does not match {0}x{1}")]
    Buffer(u32, u32),
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the chart and return PNG bytes.
    pub fn render_png(
        chart: &ChartViewModel,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if chart.is_empty() {
            return Err(RenderError::EmptyChart);
        }

        let mut buffer = vec![255u8; width as usize * height as usize * 3];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(&root, chart, title).map_err(|e| RenderError::Drawing(e.to_string()))?;
            root.present()
                .map_err(|e| RenderError::Drawing(e.to_string()))?;
        }

        Self::encode_png(buffer, width, height)
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        chart: &ChartViewModel,
        title: &str,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let n = chart.labels.len();
        let max = chart.max_value();
        let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };

        let mut ctx = ChartBuilder::on(root)
            .caption(title, (FONT, 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..n as f64, 0f64..y_max)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_desc("Population")
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()?;

        let series_count = chart.series.len();
        for (s, series) in chart.series.iter().enumerate() {
            let (offset, width) = crate::charts::ChartPlotter::bar_slot(s, series_count);

            let bars = series
                .values
                .iter()
                .zip(series.styles.iter())
                .enumerate()
                .flat_map(|(i, (&value, &style))| {
                    let x0 = i as f64 + 0.5 + offset - width / 2.0;
                    let coords = [(x0, 0.0), (x0 + width, value)];
                    [
                        Rectangle::new(coords, Self::fill(style).filled()),
                        Rectangle::new(coords, Self::border(style).stroke_width(1)),
                    ]
                });

            let legend_color = series
                .legend_style()
                .map(Self::border)
                .unwrap_or(BLACK);
            ctx.draw_series(bars)?
                .label(series.name.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], legend_color.filled())
                });
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        // Category labels under each bar group
        let style = TextStyle::from((FONT, 13).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        let slot_px = {
            let (x0, _) = ctx.backend_coord(&(0.0, 0.0));
            let (x1, _) = ctx.backend_coord(&(1.0, 0.0));
            (x1 - x0).max(LABEL_CHAR_WIDTH)
        };
        let max_chars = (slot_px / LABEL_CHAR_WIDTH).max(1) as usize;
        for (i, label) in chart.labels.iter().enumerate() {
            let (px, py) = ctx.backend_coord(&(i as f64 + 0.5, 0.0));
            root.draw(&Text::new(
                Self::fit_label(label, max_chars),
                (px, py + 8),
                style.clone(),
            ))?;
        }

        Ok(())
    }

    fn fill(style: ColorStyle) -> RGBAColor {
        let [r, g, b, a] = style.fill;
        RGBAColor(r, g, b, f64::from(a) / 255.0)
    }

    fn border(style: ColorStyle) -> RGBColor {
        let [r, g, b] = style.border;
        RGBColor(r, g, b)
    }

    /// Shorten a label to `max_chars` characters, marking the cut with an ellipsis.
    pub fn fit_label(label: &str, max_chars: usize) -> String {
        if label.chars().count() <= max_chars {
            return label.to_string();
        }
        let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }

    fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let img = image::RgbImage::from_raw(width, height, buffer)
            .ok_or(RenderError::Buffer(width, height))?;
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}
