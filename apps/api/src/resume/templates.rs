//! Template variants and how `resume_type` picks one.

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use crate::layout::FontFamily;

/// The fixed set of resume templates the form can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TemplateVariant {
    Basic1,
    Basic2,
    Basic3,
}

/// Resume sections in the order a template prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Summary,
    Experience,
    Education,
    Skills,
    Achievements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillsStyle {
    /// One comma-separated paragraph.
    Inline,
    /// One bullet per skill.
    Bulleted,
}

/// How the in-process renderer draws a variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateStyle {
    pub font: FontFamily,
    pub sections: &'static [Section],
    pub skills: SkillsStyle,
    pub uppercase_headings: bool,
    pub centered_header: bool,
}

impl TemplateVariant {
    pub const ALL: [TemplateVariant; 3] = [Self::Basic1, Self::Basic2, Self::Basic3];

    /// Maps the form's `resume_type` to a variant. Anything other than
    /// "1", "2" or "3" falls back to `Basic1`.
    pub fn from_resume_type(resume_type: Option<&str>) -> Self {
        match resume_type.map(str::trim) {
            Some("2") => Self::Basic2,
            Some("3") => Self::Basic3,
            _ => Self::Basic1,
        }
    }

    /// File name of the docx template sent to a remote merge service.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Basic1 => "BasicTemplate1.docx",
            Self::Basic2 => "BasicTemplate2.docx",
            Self::Basic3 => "BasicTemplate3.docx",
        }
    }

    pub fn style(self) -> TemplateStyle {
        match self {
            Self::Basic1 => TemplateStyle {
                font: FontFamily::Helvetica,
                sections: &[
                    Section::Summary,
                    Section::Experience,
                    Section::Education,
                    Section::Skills,
                    Section::Achievements,
                ],
                skills: SkillsStyle::Inline,
                uppercase_headings: true,
                centered_header: false,
            },
            Self::Basic2 => TemplateStyle {
                font: FontFamily::Times,
                sections: &[
                    Section::Summary,
                    Section::Education,
                    Section::Experience,
                    Section::Achievements,
                    Section::Skills,
                ],
                skills: SkillsStyle::Bulleted,
                uppercase_headings: false,
                centered_header: true,
            },
            Self::Basic3 => TemplateStyle {
                font: FontFamily::Courier,
                sections: &[
                    Section::Skills,
                    Section::Experience,
                    Section::Achievements,
                    Section::Education,
                    Section::Summary,
                ],
                skills: SkillsStyle::Bulleted,
                uppercase_headings: true,
                centered_header: false,
            },
        }
    }
}

impl std::fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = match self {
            Self::Basic1 => 1,
            Self::Basic2 => 2,
            Self::Basic3 => 3,
        };
        write!(f, "basic-{n}")
    }
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Experience => "Experience",
            Self::Education => "Education",
            Self::Skills => "Skills",
            Self::Achievements => "Achievements",
        }
    }
}

/// Resolves template variants to docx files on disk.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    dir: PathBuf,
}

impl TemplateCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, variant: TemplateVariant) -> PathBuf {
        self.dir.join(variant.file_name())
    }

    /// Fails if any variant's template file is missing.
    pub fn verify(&self) -> Result<()> {
        let missing: Vec<String> = TemplateVariant::ALL
            .iter()
            .map(|v| self.path_for(*v))
            .filter(|p| !p.is_file())
            .map(|p| p.display().to_string())
            .collect();

        if !missing.is_empty() {
            bail!("Missing resume templates: {}", missing.join(", "));
        }

        info!(
            "All {} resume templates found in {}",
            TemplateVariant::ALL.len(),
            self.dir.display()
        );
        Ok(())
    }
}
