//! Turns a resume submission into positioned lines of text.
//!
//! Two steps, both pure:
//! - `build_layout` flattens the submission into styled lines in the order the
//!   template prints its sections, wrapping text to the content width.
//! - `paginate` assigns each line a baseline on a page, breaking pages when
//!   the bottom margin is reached and never leaving a heading alone at the
//!   foot of a page.
//!
//! Coordinates are in millimetres from the bottom-left corner, as PDF expects.

use serde::Serialize;

use crate::layout::font_metrics::{
    get_metrics, FontFamily, FontMetricTable, PageConfig, MM_PER_PT,
};
use crate::models::resume::ResumeSubmission;
use crate::resume::templates::{Section, SkillsStyle, TemplateStyle};

/// Separator between inline items such as contact details.
const INLINE_SEPARATOR: &str = "  |  ";
const BULLET_PREFIX: &str = "- ";
/// Indent for entry descriptions and bullets.
const INDENT_MM: f32 = 4.0;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    /// Candidate name.
    Title,
    /// Job title under the name.
    Subtitle,
    Contact,
    Heading,
    /// First line of an education/experience entry.
    EntryTitle,
    Body,
    Bullet,
}

impl LineKind {
    pub fn font_size_pt(self, config: &PageConfig) -> f32 {
        match self {
            Self::Title => config.title_size_pt,
            Self::Subtitle | Self::Heading => config.heading_size_pt,
            Self::Contact | Self::EntryTitle | Self::Body | Self::Bullet => config.body_size_pt,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, Self::Title | Self::Heading | Self::EntryTitle)
    }
}

/// One wrapped line of text, before placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutLine {
    pub text: String,
    pub kind: LineKind,
    pub indent_mm: f32,
    /// Extra space above this line, in millimetres.
    pub space_before_mm: f32,
    pub centered: bool,
}

/// A resume flattened into lines, with the font it is set in.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeLayout {
    pub font: FontFamily,
    pub lines: Vec<LayoutLine>,
}

/// A line with its final position on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub text: String,
    pub kind: LineKind,
    pub x_mm: f32,
    pub baseline_mm: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

// ────────────────────────────────────────────────────────────────────────────
// Building
// ────────────────────────────────────────────────────────────────────────────

struct LayoutBuilder<'a> {
    metrics: &'static FontMetricTable,
    config: &'a PageConfig,
    lines: Vec<LayoutLine>,
}

impl<'a> LayoutBuilder<'a> {
    fn push_wrapped(&mut self, text: &str, kind: LineKind, indent_mm: f32, space_before_mm: f32) {
        self.push_styled(text, kind, indent_mm, space_before_mm, false);
    }

    fn push_styled(
        &mut self,
        text: &str,
        kind: LineKind,
        indent_mm: f32,
        space_before_mm: f32,
        centered: bool,
    ) {
        let size_pt = kind.font_size_pt(self.config);
        let width_pt = (self.config.content_width_mm() - indent_mm) / MM_PER_PT;
        let max_width_em = width_pt / size_pt;

        for (i, line) in self
            .metrics
            .wrap(text, max_width_em, kind.is_bold())
            .into_iter()
            .enumerate()
        {
            self.lines.push(LayoutLine {
                text: line,
                kind,
                indent_mm,
                space_before_mm: if i == 0 { space_before_mm } else { 0.0 },
                centered,
            });
        }
    }

    /// Bullet text wraps under itself, not under the dash.
    fn push_bullet(&mut self, text: &str) {
        let before = self.lines.len();
        self.push_wrapped(text, LineKind::Bullet, INDENT_MM * 2.0, 0.0);
        if let Some(first) = self.lines.get_mut(before) {
            first.text = format!("{BULLET_PREFIX}{}", first.text);
            first.indent_mm = INDENT_MM;
        }
    }

    fn push_heading(&mut self, section: Section, style: &TemplateStyle) {
        let title = if style.uppercase_headings {
            section.title().to_uppercase()
        } else {
            section.title().to_string()
        };
        self.push_wrapped(&title, LineKind::Heading, 0.0, self.config.section_gap_mm);
    }

    fn push_entry(&mut self, name: &str, year: &str, description: &str) {
        let title = join_non_empty(&[name, year], INLINE_SEPARATOR);
        if !title.is_empty() {
            self.push_wrapped(&title, LineKind::EntryTitle, 0.0, 1.5);
        }
        self.push_wrapped(description, LineKind::Body, INDENT_MM, 0.0);
    }
}

/// Lays out a submission in the given template style.
///
/// Sections with nothing to print are left out entirely, heading included.
pub fn build_layout(
    submission: &ResumeSubmission,
    style: &TemplateStyle,
    config: &PageConfig,
) -> ResumeLayout {
    let mut builder = LayoutBuilder {
        metrics: get_metrics(style.font),
        config,
        lines: Vec::new(),
    };

    let centered = style.centered_header;
    let full_name = submission.full_name();
    if !full_name.is_empty() {
        builder.push_styled(&full_name, LineKind::Title, 0.0, 0.0, centered);
    }
    if !submission.job_title.trim().is_empty() {
        builder.push_styled(&submission.job_title, LineKind::Subtitle, 0.0, 0.0, centered);
    }
    let contact = join_non_empty(
        &[
            submission.email_address.as_str(),
            submission.phone_number.as_str(),
            submission.linked_in.as_str(),
        ],
        INLINE_SEPARATOR,
    );
    if !contact.is_empty() {
        builder.push_styled(&contact, LineKind::Contact, 0.0, 1.0, centered);
    }

    for &section in style.sections {
        if !section_has_content(submission, section) {
            continue;
        }
        builder.push_heading(section, style);

        match section {
            Section::Summary => {
                builder.push_wrapped(&submission.summary, LineKind::Body, 0.0, 1.0);
            }
            Section::Experience => {
                for entry in submission.experience.iter().filter(|e| !e.is_empty()) {
                    builder.push_entry(&entry.company_name, &entry.year, &entry.description);
                }
            }
            Section::Education => {
                for entry in submission.education.iter().filter(|e| !e.is_empty()) {
                    builder.push_entry(&entry.school_name, &entry.year, &entry.description);
                }
            }
            Section::Skills => {
                let skills: Vec<&str> = non_empty(&submission.skills).collect();
                match style.skills {
                    SkillsStyle::Inline => {
                        builder.push_wrapped(&skills.join(", "), LineKind::Body, 0.0, 1.0);
                    }
                    SkillsStyle::Bulleted => skills.iter().for_each(|s| builder.push_bullet(s)),
                }
            }
            Section::Achievements => {
                for achievement in submission.achievements.iter().filter(|a| !a.is_empty()) {
                    let text = match (achievement.kind.trim(), achievement.description.trim()) {
                        ("", description) => description.to_string(),
                        (kind, "") => kind.to_string(),
                        (kind, description) => format!("{kind}: {description}"),
                    };
                    builder.push_bullet(&text);
                }
            }
        }
    }

    ResumeLayout {
        font: style.font,
        lines: builder.lines,
    }
}

fn section_has_content(submission: &ResumeSubmission, section: Section) -> bool {
    match section {
        Section::Summary => !submission.summary.trim().is_empty(),
        Section::Experience => submission.experience.iter().any(|e| !e.is_empty()),
        Section::Education => submission.education.iter().any(|e| !e.is_empty()),
        Section::Skills => non_empty(&submission.skills).next().is_some(),
        Section::Achievements => submission.achievements.iter().any(|a| !a.is_empty()),
    }
}

fn non_empty(items: &[String]) -> impl Iterator<Item = &str> {
    items.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

/// Places every line of `layout` onto pages.
///
/// Always returns at least one page, so an empty layout still renders as a
/// blank document.
pub fn paginate(layout: &ResumeLayout, config: &PageConfig) -> Vec<Page> {
    let metrics = get_metrics(layout.font);
    let mut pages = vec![Page::default()];
    let mut cursor = config.top_mm();

    for (i, line) in layout.lines.iter().enumerate() {
        let size_pt = line.kind.font_size_pt(config);
        let height = config.line_height_mm(size_pt);
        let at_page_top = pages.last().map_or(true, |p| p.lines.is_empty());
        let gap = if at_page_top { 0.0 } else { line.space_before_mm };

        let mut needed = gap + height;
        // Keep a heading with the first line of its section.
        if line.kind == LineKind::Heading {
            if let Some(next) = layout.lines.get(i + 1) {
                let next_height = config.line_height_mm(next.kind.font_size_pt(config));
                needed += next.space_before_mm + next_height;
            }
        }

        let gap = if cursor - needed < config.bottom_mm() && !at_page_top {
            pages.push(Page::default());
            cursor = config.top_mm();
            0.0
        } else {
            gap
        };

        cursor -= gap + height;

        let x_mm = if line.centered {
            let width_em = metrics.measure(&line.text, line.kind.is_bold());
            let width_mm = width_em * size_pt * MM_PER_PT;
            config.margin_mm + ((config.content_width_mm() - width_mm) / 2.0).max(0.0)
        } else {
            config.margin_mm + line.indent_mm
        };

        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                text: line.text.clone(),
                kind: line.kind,
                x_mm,
                baseline_mm: cursor,
            });
        }
    }

    pages
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
