//! Embedded stylesheet for the generated document.
//!
//! Built once per conversion from the configured class names and breakpoints,
//! then rendered into the `<style>` element. Only colour fills are used for
//! backgrounds; the sheet never references background images.

use crate::config::{Breakpoints, CssClasses};
use std::fmt;

/// One `selector { declarations }` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub body: String,
}

impl Rule {
    fn new(selector: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            body: body.into(),
        }
    }
}

/// An `@media` block.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlock {
    pub query: String,
    pub rules: Vec<Rule>,
}

/// The document stylesheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleSheet {
    /// `@font-face` declarations, emitted first.
    pub font_faces: String,
    pub rules: Vec<Rule>,
    pub media: Vec<MediaBlock>,
}

impl StyleSheet {
    /// Base rules for `classes`, plus breakpoint and print rules when
    /// `responsive` is set.
    pub fn new(classes: &CssClasses, breakpoints: &Breakpoints, responsive: bool) -> Self {
        let container = format!(".{}", classes.container);
        let page = format!(".{}", classes.page);
        let content = format!(".{}", classes.content);
        let paragraph = format!(".{}", classes.paragraph);
        let heading = format!(".{}", classes.heading);
        let image = format!(".{}", classes.image);

        let rules = vec![
            Rule::new(
                "body",
                "margin: 0; padding: 20px; background-color: #f0f0f0; \
                 font-family: Helvetica, Arial, sans-serif; color: #000000;",
            ),
            Rule::new(&container, "max-width: 1200px; margin: 0 auto;"),
            Rule::new(
                &page,
                "margin-bottom: 20px; padding: 20px; background-color: #ffffff; \
                 box-shadow: 0 0 10px rgba(0,0,0,0.1); overflow: hidden; box-sizing: border-box;",
            ),
            Rule::new(&content, "position: relative;"),
            Rule::new(
                &heading,
                "font-size: 1.5em; font-weight: bold; margin: 0.8em 0 0.4em; line-height: 1.2;",
            ),
            Rule::new(&paragraph, "margin: 0 0 0.8em; line-height: 1.5;"),
            Rule::new(&image, "display: block; max-width: 100%; height: auto;"),
            Rule::new("img", "max-width: 100%; height: auto;"),
        ];

        let media = if responsive {
            vec![
                MediaBlock {
                    query: format!("(max-width: {}px)", breakpoints.tablet),
                    rules: vec![
                        Rule::new("body", "padding: 10px;"),
                        Rule::new(&page, "padding: 12px;"),
                    ],
                },
                MediaBlock {
                    query: format!("(max-width: {}px)", breakpoints.mobile),
                    rules: vec![
                        Rule::new("body", "padding: 0;"),
                        Rule::new(&page, "padding: 8px; margin-bottom: 8px; box-shadow: none;"),
                        Rule::new(&heading, "font-size: 1.25em;"),
                    ],
                },
                MediaBlock {
                    query: format!("(min-width: {}px)", breakpoints.desktop),
                    rules: vec![Rule::new(&container, "padding: 0 20px;")],
                },
                MediaBlock {
                    query: "print".to_string(),
                    rules: vec![
                        Rule::new("body", "padding: 0; background-color: #ffffff;"),
                        Rule::new(
                            &page,
                            "margin: 0; padding: 0; box-shadow: none; page-break-after: always;",
                        ),
                    ],
                },
            ]
        } else {
            Vec::new()
        };

        Self {
            font_faces: String::new(),
            rules,
            media,
        }
    }

    /// Attach `@font-face` declarations.
    pub fn with_font_faces(mut self, font_faces: String) -> Self {
        self.font_faces = font_faces;
        self
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.font_faces)?;
        for rule in &self.rules {
            writeln!(f, "{} {{ {} }}", rule.selector, rule.body)?;
        }
        for block in &self.media {
            writeln!(f, "@media {} {{", block.query)?;
            for rule in &block.rules {
                writeln!(f, "  {} {{ {} }}", rule.selector, rule.body)?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}
