mod handler;
mod model;
mod stats;

pub use handler::{attendance_report, attendance_report_pdf, attendance_stats, mark_attendance};
pub use model::{Attendance, AttendanceWithSubject};
pub use stats::{StatusCounts, attendance_percentage, count_statuses};
