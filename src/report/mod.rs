// 考勤PDF报表渲染，文件落在上传目录，文件名随机生成

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use uuid::Uuid;

use crate::routes::attendance::{AttendanceWithSubject, attendance_percentage, count_statuses};
use crate::routes::auth::User;
use crate::routes::subjects::Subject;

// Letter纸张
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const TOP_MARGIN_MM: f32 = 260.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const LINE_STEP_MM: f32 = 6.0;

// 表格各列的横向位置
const COL_DATE: f32 = 20.0;
const COL_TIME: f32 = 50.0;
const COL_SUBJECT: f32 = 75.0;
const COL_STATUS: f32 = 120.0;
const COL_METHOD: f32 = 150.0;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn describe_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        (Some(start), None) => format!("From {}", start),
        (None, Some(end)) => format!("Until {}", end),
        (None, None) => "All dates".to_string(),
    }
}

struct PdfWriter<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    font: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
    y: f32,
}

impl PdfWriter<'_> {
    fn next_line(&mut self) {
        self.y -= LINE_STEP_MM;
        if self.y < BOTTOM_MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_MARGIN_MM;
        }
    }

    fn text_line(&mut self, text: &str, size: f32, bold: bool) {
        let font = if bold { self.bold } else { self.font };
        self.layer.use_text(text, size, Mm(20.0), Mm(self.y), font);
        self.next_line();
    }

    fn table_row(&mut self, cells: [&str; 5], bold: bool) {
        let font = if bold { self.bold } else { self.font };
        for (x, cell) in [COL_DATE, COL_TIME, COL_SUBJECT, COL_STATUS, COL_METHOD]
            .into_iter()
            .zip(cells)
        {
            self.layer.use_text(cell, 10.0, Mm(x), Mm(self.y), font);
        }
        self.next_line();
    }
}

/// 生成考勤PDF报表，返回生成的文件路径
pub fn generate_attendance_report(
    upload_dir: &Path,
    attendances: &[AttendanceWithSubject],
    user: &User,
    subject: Option<&Subject>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> io::Result<PathBuf> {
    std::fs::create_dir_all(upload_dir)?;
    let report_path = upload_dir.join(format!("report_{}.pdf", Uuid::new_v4()));

    let (doc, page, layer) = PdfDocument::new(
        "Attendance Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(io::Error::other)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(io::Error::other)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut writer = PdfWriter {
        doc: &doc,
        layer,
        font: &font,
        bold: &bold,
        y: TOP_MARGIN_MM,
    };

    writer.text_line("Attendance Report", 18.0, true);
    writer.next_line();

    writer.text_line(&format!("User: {}", user.full_name()), 12.0, true);
    if let Some(student_id) = &user.student_id {
        writer.text_line(&format!("Student ID: {}", student_id), 10.0, false);
    }
    if let Some(subject) = subject {
        writer.text_line(
            &format!("Subject: {} ({})", subject.name, subject.code),
            12.0,
            true,
        );
    }
    writer.text_line(
        &format!("Period: {}", describe_period(start_date, end_date)),
        10.0,
        false,
    );
    writer.text_line(
        &format!(
            "Generated on: {} UTC",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ),
        10.0,
        false,
    );
    writer.next_line();

    if attendances.is_empty() {
        writer.text_line(
            "No attendance records found for the specified criteria.",
            10.0,
            false,
        );
    } else {
        writer.table_row(["Date", "Time", "Subject", "Status", "Method"], true);
        for attendance in attendances {
            writer.table_row(
                [
                    &attendance.date.format("%Y-%m-%d").to_string(),
                    &attendance.time.format("%H:%M:%S").to_string(),
                    &attendance.subject_code,
                    &capitalize(&attendance.status),
                    &capitalize(&attendance.verification_method),
                ],
                false,
            );
        }

        let counts = count_statuses(attendances.iter().map(|a| a.status.as_str()));
        writer.next_line();
        writer.text_line("Summary:", 12.0, true);
        writer.text_line(&format!("Total Classes: {}", counts.total), 10.0, false);
        writer.text_line(&format!("Present: {}", counts.present), 10.0, false);
        writer.text_line(&format!("Absent: {}", counts.absent), 10.0, false);
        writer.text_line(&format!("Late: {}", counts.late), 10.0, false);
        writer.text_line(
            &format!("Attendance Percentage: {:.2}%", attendance_percentage(counts)),
            10.0,
            false,
        );
    }

    let file = File::create(&report_path)?;
    doc.save(&mut BufWriter::new(file)).map_err(io::Error::other)?;

    Ok(report_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_description_covers_all_bounds() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1);
        let end = NaiveDate::from_ymd_opt(2026, 6, 30);
        assert_eq!(describe_period(start, end), "2026-01-01 to 2026-06-30");
        assert_eq!(describe_period(start, None), "From 2026-01-01");
        assert_eq!(describe_period(None, end), "Until 2026-06-30");
        assert_eq!(describe_period(None, None), "All dates");
    }

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("present"), "Present");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("f"), "F");
    }
}
