//! In-process merge backend: lays the submission out with the variant's
//! style and draws it with the builtin PDF fonts.
//!
//! The builtin fonts only cover Latin-1. Common typographic punctuation is
//! drawn with a plain stand-in; any other character outside Latin-1 fails the
//! render rather than silently disappearing from the document.
//!
//! PDF assembly is CPU-bound and `printpdf` documents are not `Send`, so the
//! whole document is built and serialized inside `spawn_blocking` from owned data.

use std::collections::BTreeSet;

use async_trait::async_trait;
use bytes::Bytes;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::debug;

use crate::layout::{build_layout, paginate, FontFamily, PageConfig};
use crate::merge::{DocumentMerger, MergeError, MergeJob};
use crate::models::resume::ResumeSubmission;
use crate::resume::templates::TemplateStyle;

#[derive(Debug, Clone)]
pub struct LocalMerger {
    page_config: PageConfig,
}

impl LocalMerger {
    pub fn new(page_config: PageConfig) -> Self {
        Self { page_config }
    }
}

#[async_trait]
impl DocumentMerger for LocalMerger {
    async fn merge(&self, job: &MergeJob) -> Result<Bytes, MergeError> {
        let submission = ResumeSubmission::from_value(job.data.clone())
            .map_err(|e| MergeError::InvalidData(e.to_string()))?;
        let style = job.variant.style();
        let config = self.page_config.clone();

        let pdf = tokio::task::spawn_blocking(move || render_pdf(&submission, &style, &config))
            .await
            .map_err(|e| MergeError::Render(format!("render task failed: {e}")))??;

        debug!(
            request_id = %job.request_id,
            variant = %job.variant,
            bytes = pdf.len(),
            "Rendered resume locally"
        );

        Ok(Bytes::from(pdf))
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

fn builtin_fonts(font: FontFamily) -> (BuiltinFont, BuiltinFont) {
    match font {
        FontFamily::Helvetica => (BuiltinFont::Helvetica, BuiltinFont::HelveticaBold),
        FontFamily::Times => (BuiltinFont::TimesRoman, BuiltinFont::TimesBold),
        FontFamily::Courier => (BuiltinFont::Courier, BuiltinFont::CourierBold),
    }
}

/// Stand-ins for punctuation outside Latin-1 that resumes use all the time.
const PUNCTUATION_FALLBACKS: &[(char, &str)] = &[
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2012}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "-"),
    ('\u{2026}', "..."),
    ('\u{20AC}', "EUR"),
    ('\u{2122}', "(TM)"),
];

/// Rewrites `text` into what the builtin fonts can draw. Characters with no
/// Latin-1 form and no stand-in are collected into `unsupported`.
fn builtin_text(text: &str, unsupported: &mut BTreeSet<char>) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_control() => out.push(' '),
            ' '..='~' | '\u{A0}'..='\u{FF}' => out.push(c),
            c => match PUNCTUATION_FALLBACKS.iter().find(|(from, _)| *from == c) {
                Some((_, to)) => out.push_str(to),
                None => {
                    unsupported.insert(c);
                }
            },
        }
    }
    out
}

/// Draws a submission into a complete PDF file.
fn render_pdf(
    submission: &ResumeSubmission,
    style: &TemplateStyle,
    config: &PageConfig,
) -> Result<Vec<u8>, MergeError> {
    let layout = build_layout(submission, style, config);
    let pages = paginate(&layout, config);

    let mut unsupported = BTreeSet::new();
    let drawn: Vec<Vec<String>> = pages
        .iter()
        .map(|page| {
            page.lines
                .iter()
                .map(|line| builtin_text(&line.text, &mut unsupported))
                .collect()
        })
        .collect();
    if !unsupported.is_empty() {
        let chars: String = unsupported.into_iter().collect();
        return Err(MergeError::Render(format!("builtin fonts cannot draw {chars:?}")));
    }

    let title = match submission.full_name() {
        name if name.is_empty() => "Resume".to_string(),
        name => format!("{name} - Resume"),
    };
    let (width, height) = (Mm(config.width_mm), Mm(config.height_mm));
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, width, height, "Page 1".to_string());

    let (regular, bold) = builtin_fonts(style.font);
    let regular = doc.add_builtin_font(regular).map_err(render_error)?;
    let bold = doc.add_builtin_font(bold).map_err(render_error)?;

    for (i, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, format!("Page {}", i + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for (line, text) in page.lines.iter().zip(&drawn[i]) {
            let font = if line.kind.is_bold() { &bold } else { &regular };
            layer.use_text(
                text.as_str(),
                line.kind.font_size_pt(config),
                Mm(line.x_mm),
                Mm(line.baseline_mm),
                font,
            );
        }
    }

    doc.save_to_bytes().map_err(render_error)
}

fn render_error(e: impl std::fmt::Display) -> MergeError {
    MergeError::Render(e.to_string())
}
