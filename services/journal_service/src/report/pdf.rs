use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::GroupReport;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const WRAP_COLUMNS: usize = 90;

/// Renders the report as an A4 PDF using the built-in Helvetica faces.
pub fn render(report: &GroupReport) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Report - {}", report.group_name),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let first_layer = doc.get_page(page).get_layer(layer);
    let mut writer = PageWriter {
        doc,
        layer: first_layer,
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    writer.heading(&bold, 18.0, &format!("Group Report: {}", report.group_name));
    writer.line(&regular, 10.0, &format!("Teacher: {}", report.teacher_name));
    writer.line(
        &regular,
        10.0,
        &format!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M UTC")),
    );
    writer.paragraph(&regular, 10.0, &report.description);
    if let Some(prompt) = &report.project_prompt {
        writer.heading(&bold, 12.0, "Project Prompt");
        writer.paragraph(&regular, 10.0, prompt);
    }

    writer.heading(&bold, 12.0, &format!("Members ({})", report.members.len()));
    for member in &report.members {
        writer.line(
            &regular,
            10.0,
            &format!("{} (joined {})", member.full_name, member.joined_at.format("%Y-%m-%d")),
        );
    }

    writer.heading(&bold, 12.0, "Recent Log Entries");
    if report.recent_logs.is_empty() {
        writer.line(&regular, 10.0, "No log entries yet.");
    }
    for log in &report.recent_logs {
        writer.line(
            &bold,
            10.0,
            &format!("{} - {} ({})", log.title, log.author_name, log.created_at.format("%Y-%m-%d %H:%M")),
        );
        writer.paragraph(&regular, 10.0, &log.body);
    }

    writer.heading(&bold, 12.0, "Assignments");
    if report.assignments.is_empty() {
        writer.line(&regular, 10.0, "No assignments yet.");
    }
    for assignment in &report.assignments {
        writer.line(
            &regular,
            10.0,
            &format!(
                "{} - due {} - submitted {}",
                assignment.title,
                assignment.due_at.format("%Y-%m-%d %H:%M"),
                assignment.ratio()
            ),
        );
    }

    writer.doc.save_to_bytes()
}

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter {
    fn heading(&mut self, font: &IndirectFontRef, size: f32, text: &str) {
        self.y -= LINE_HEIGHT_MM / 2.0;
        self.line(font, size, text);
    }

    fn line(&mut self, font: &IndirectFontRef, size: f32, text: &str) {
        if self.y < MARGIN_MM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.layer.use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        self.y -= LINE_HEIGHT_MM;
    }

    fn paragraph(&mut self, font: &IndirectFontRef, size: f32, text: &str) {
        for line in wrap(text, WRAP_COLUMNS) {
            self.line(font, size, &line);
        }
    }
}

/// Greedy word wrap; a single overlong word gets its own line.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > columns {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
