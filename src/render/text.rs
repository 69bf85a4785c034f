//! Plain text rendering of reports.

use crate::model::{BatchReport, DocumentReport, Notice, NoticeLevel};

fn notice_line(notice: &Notice) -> String {
    let prefix = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!("[{}] {}", prefix, notice.message)
}

/// Render one document: header, notices, then one block per page.
pub fn render_document(report: &DocumentReport) -> String {
    let mut output = format!("### Processing: {}\n", report.name);

    for notice in &report.notices {
        output.push_str(&notice_line(notice));
        output.push('\n');
    }

    for page in &report.pages {
        output.push_str(&format!("\n#### Page {}\n\n", page.number));
        output.push_str(&page.text);
        output.push('\n');
    }

    output
}

/// Render a batch, documents separated by blank lines.
pub fn render_batch(batch: &BatchReport) -> String {
    let mut parts: Vec<String> = batch
        .notices
        .iter()
        .map(|notice| format!("{}\n", notice_line(notice)))
        .collect();
    parts.extend(batch.documents.iter().map(render_document));
    parts.join("\n")
}

/// Render a single page for interactive display.
pub fn render_page(number: u32, text: Option<&str>) -> String {
    match text {
        Some(text) => format!("#### Page {}\n\n{}\n", number, text),
        None => format!("No text found on page {}.\n", number),
    }
}
