//! Report generation tools
//!
//! Render the weekly energy balance as a PNG trend chart and as a PDF
//! report with a daily table, the chart and the week's entries.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::NaiveDate;
use ::image::{DynamicImage, ImageFormat, RgbImage};
use printpdf::*;
use serde::Serialize;
use tracing::warn;

use crate::ledger::aggregate;
use crate::models::Entry;
use crate::view::{self, TrendPoint};

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (0, 112, 192);
const COLOR_INTAKE: (u8, u8, u8) = (0, 176, 80);
const COLOR_BURNED: (u8, u8, u8) = (255, 140, 0);
const COLOR_SURPLUS: (u8, u8, u8) = (192, 0, 0);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 400;

// Letter, portrait
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_BOTTOM: f32 = 20.0;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ExportChartResponse {
    pub success: bool,
    pub file_path: String,
    pub days: usize,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub entries_included: usize,
    pub days_analyzed: usize,
    pub date_range: String,
    pub message: String,
}

// ============================================================================
// Chart
// ============================================================================

/// Render intake, burned and net per day as PNG bytes
pub fn generate_trend_chart(points: &[TrendPoint], width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if points.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = plotters_bitmap::BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let y_min = points
            .iter()
            .flat_map(|p| [p.net, -p.burned])
            .fold(0.0f64, f64::min);
        let y_max = points
            .iter()
            .flat_map(|p| [p.intake, p.net])
            .fold(0.0f64, f64::max);
        let pad = ((y_max - y_min) * 0.1).max(50.0);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..(points.len() as i32), (y_min - pad)..(y_max + pad))
            .map_err(|e| e.to_string())?;

        // Text needs a system font; without one the chart is drawn unlabeled
        let labeled = chart
            .configure_mesh()
            .x_labels(points.len())
            .x_label_formatter(&|x| {
                if *x >= 0 && (*x as usize) < points.len() {
                    points[*x as usize].date.format("%m/%d").to_string()
                } else {
                    String::new()
                }
            })
            .y_desc("kcal")
            .draw();
        if let Err(e) = &labeled {
            warn!(error = %e, "drawing trend chart without labels");
            chart
                .configure_mesh()
                .disable_x_axis()
                .disable_y_axis()
                .draw()
                .map_err(|e| e.to_string())?;
        }

        // Break-even line
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0, 0.0), (points.len() as i32, 0.0)],
                ShapeStyle::from(&BLACK.mix(0.4)).stroke_width(1),
            )))
            .map_err(|e| e.to_string())?;

        let series: [(&str, RGBColor, Vec<(i32, f64)>); 3] = [
            (
                "Intake",
                RGBColor(COLOR_INTAKE.0, COLOR_INTAKE.1, COLOR_INTAKE.2),
                points.iter().enumerate().map(|(i, p)| (i as i32, p.intake)).collect(),
            ),
            (
                "Burned",
                RGBColor(COLOR_BURNED.0, COLOR_BURNED.1, COLOR_BURNED.2),
                points.iter().enumerate().map(|(i, p)| (i as i32, p.burned)).collect(),
            ),
            (
                "Net",
                RGBColor(COLOR_TITLE.0, COLOR_TITLE.1, COLOR_TITLE.2),
                points.iter().enumerate().map(|(i, p)| (i as i32, p.net)).collect(),
            ),
        ];

        for (label, color, data) in series {
            chart
                .draw_series(LineSeries::new(data.clone(), color.stroke_width(2)))
                .map_err(|e| e.to_string())?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            chart
                .draw_series(data.iter().map(|(x, y)| Circle::new((*x, *y), 3, color.filled())))
                .map_err(|e| e.to_string())?;
        }

        if labeled.is_ok() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
    }

    let img = RgbImage::from_raw(width, height, buffer).ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Write the trend chart to a PNG file
pub fn export_trend_chart(points: &[TrendPoint], output_path: &str) -> Result<ExportChartResponse, String> {
    let png_bytes = generate_trend_chart(points, CHART_WIDTH, CHART_HEIGHT)?;

    let path = Path::new(output_path);
    ensure_parent(path)?;
    std::fs::write(path, png_bytes).map_err(|e| e.to_string())?;

    Ok(ExportChartResponse {
        success: true,
        file_path: output_path.to_string(),
        days: points.len(),
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
    })
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

fn add_text(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, x: f32, y: f32, size: f32, color: (u8, u8, u8)) {
    layer.set_fill_color(rgb_to_printpdf(color));
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn add_rule(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_color(rgb_to_printpdf(COLOR_GRAY));
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN_LEFT), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn net_color(net: f64) -> (u8, u8, u8) {
    if net > 0.0 {
        COLOR_SURPLUS
    } else if net < 0.0 {
        COLOR_INTAKE
    } else {
        COLOR_BLACK
    }
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

/// Table line for one entry in the listing
fn entry_line(entry: &Entry) -> (String, String, String) {
    match entry {
        Entry::Food(food) => (
            food.name.clone(),
            format!("{} {}", food.serving_qty, food.serving_unit),
            format!("+{:.0}", food.intake()),
        ),
        Entry::Exercise(exercise) => (
            exercise.name.clone(),
            format!("{:.0} min, MET {:.1}", exercise.duration_min, exercise.met),
            format!("-{:.0}", exercise.calories_burned),
        ),
    }
}

// ============================================================================
// Weekly Report Generation
// ============================================================================

/// Generate the weekly energy balance PDF ending on `today`
pub fn generate_weekly_report(
    entries: &[Entry],
    today: NaiveDate,
    days: usize,
    output_path: &str,
) -> Result<GenerateReportResponse, String> {
    let window = aggregate::trailing_days(today, days);
    let (start, end) = match (window.first(), window.last()) {
        (Some(start), Some(end)) => (*start, *end),
        _ => return Err("Report window must cover at least one day".to_string()),
    };

    let mut in_window: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.date() >= start && e.date() <= end)
        .collect();
    in_window.sort_by_key(|e| e.date());

    let points = view::trend(entries, today, days);
    let week: Vec<Entry> = in_window.iter().map(|e| (*e).clone()).collect();
    let totals = aggregate::totals(&week);

    let (doc, page1, layer1) = PdfDocument::new("Weekly Energy Balance", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| e.to_string())?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| e.to_string())?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = PAGE_HEIGHT - 20.0;

    add_text(&layer, &font_bold, "Weekly Energy Balance", MARGIN_LEFT, y, 18.0, COLOR_TITLE);
    y -= 10.0;

    add_text(&layer, &font, &format!("Period: {} to {}", start, end), MARGIN_LEFT, y, 11.0, COLOR_BLACK);
    let now = chrono::Local::now().format("%Y-%m-%d").to_string();
    add_text(&layer, &font, &format!("Generated: {}", now), 120.0, y, 11.0, COLOR_BLACK);
    y -= 8.0;

    add_rule(&layer, y);
    y -= 8.0;

    // Summary
    add_text(&layer, &font_bold, "Summary", MARGIN_LEFT, y, 12.0, COLOR_BLACK);
    y -= 7.0;
    add_text(&layer, &font, &format!("Consumed: {:.0} kcal", totals.total_intake), MARGIN_LEFT, y, 10.0, COLOR_INTAKE);
    add_text(&layer, &font, &format!("Burned: {:.0} kcal", totals.total_burned), 80.0, y, 10.0, COLOR_BURNED);
    add_text(
        &layer,
        &font,
        &format!("Net: {:+.0} kcal", totals.net_calories),
        145.0,
        y,
        10.0,
        net_color(totals.net_calories),
    );
    y -= 6.0;
    add_text(
        &layer,
        &font,
        &format!("Food entries: {}   Exercise entries: {}", totals.food_entries, totals.exercise_entries),
        MARGIN_LEFT,
        y,
        10.0,
        COLOR_BLACK,
    );
    y -= 12.0;

    // Daily table
    add_text(&layer, &font_bold, "Daily Balance", MARGIN_LEFT, y, 12.0, COLOR_BLACK);
    y -= 7.0;

    let col_widths = [40.0, 25.0, 25.0, 25.0, 60.0];
    let headers = ["Day", "Intake", "Burned", "Net", ""];
    let mut col_x = MARGIN_LEFT;
    for (i, header) in headers.iter().enumerate() {
        add_text(&layer, &font_bold, header, col_x, y, 9.0, COLOR_BLACK);
        col_x += col_widths[i];
    }
    y -= 5.0;

    for point in &points {
        let values = [
            point.label.clone(),
            format!("{:.0}", point.intake),
            format!("{:.0}", point.burned),
            format!("{:+.0}", point.net),
            point.caption.clone(),
        ];
        col_x = MARGIN_LEFT;
        for (i, value) in values.iter().enumerate() {
            let color = if i >= 3 { net_color(point.net) } else { COLOR_BLACK };
            add_text(&layer, &font, value, col_x, y, 8.0, color);
            col_x += col_widths[i];
        }
        y -= 4.5;
    }
    y -= 6.0;

    // Chart; 1000x400 px at 120 DPI is about 212mm x 85mm, so scale to fit the page
    match generate_trend_chart(&points, CHART_WIDTH, CHART_HEIGHT) {
        Ok(png_bytes) => {
            let dynamic_image = printpdf::image_crate::load_from_memory(&png_bytes).map_err(|e| e.to_string())?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            pdf_image.add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(MARGIN_LEFT)),
                    translate_y: Some(Mm(y - 78.0)),
                    dpi: Some(130.0),
                    ..Default::default()
                },
            );
            y -= 84.0;
        }
        Err(e) => {
            add_text(&layer, &font, &format!("Chart generation error: {}", e), MARGIN_LEFT, y - 5.0, 9.0, COLOR_SURPLUS);
            y -= 12.0;
        }
    }

    // Entry listing, continued on new pages as needed
    add_text(&layer, &font_bold, "Entries", MARGIN_LEFT, y, 12.0, COLOR_BLACK);
    y -= 7.0;

    if in_window.is_empty() {
        add_text(&layer, &font, "No entries this week.", MARGIN_LEFT, y, 9.0, COLOR_GRAY);
    }

    for entry in &in_window {
        if y < MARGIN_BOTTOM {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Entries");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT - 20.0;
        }

        let (name, detail, kcal) = entry_line(entry);
        let color = match entry {
            Entry::Food(_) => COLOR_INTAKE,
            Entry::Exercise(_) => COLOR_BURNED,
        };
        add_text(&layer, &font, &view::day_label(entry.date()), MARGIN_LEFT, y, 8.0, COLOR_BLACK);
        add_text(&layer, &font, &name, 55.0, y, 8.0, COLOR_BLACK);
        add_text(&layer, &font, &detail, 115.0, y, 8.0, COLOR_GRAY);
        add_text(&layer, &font, &kcal, 175.0, y, 8.0, color);
        y -= 4.5;
    }

    let path = Path::new(output_path);
    ensure_parent(path)?;

    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    Ok(GenerateReportResponse {
        success: true,
        file_path: output_path.to_string(),
        entries_included: in_window.len(),
        days_analyzed: points.len(),
        date_range: format!("{} to {}", start, end),
        message: format!(
            "Weekly report generated with {} entries over {} days",
            in_window.len(),
            points.len()
        ),
    })
}
