//! HTML generation: page fragments and the document shell.
//!
//! Markup is generated structurally from [`Page`] values. Text is escaped with
//! `html-escape` at this point and nowhere else; image `src` values are used
//! as produced by the image extractor.

use crate::config::ConversionOptions;
use crate::model::{Block, ImageRef, Page};
use crate::pipeline::css::StyleSheet;
use crate::pipeline::style;
use std::fmt::Write as _;

/// Renders pages and wraps them in a complete document.
pub struct HtmlAssembler<'a> {
    options: &'a ConversionOptions,
}

impl<'a> HtmlAssembler<'a> {
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self { options }
    }

    /// Fragment for one converted page.
    pub fn page_fragment(&self, page: &Page) -> String {
        let classes = &self.options.css_classes;
        let mut html = String::new();

        let _ = write!(
            html,
            "<div class=\"{}\" data-page=\"{}\"",
            classes.page, page.number
        );
        if page.is_positioned() {
            let _ = write!(
                html,
                " style=\"position: relative; width: {}px; height: {}px; padding: 0;\"",
                px(page.width_px),
                px(page.height_px)
            );
        }
        html.push_str(">\n");
        let _ = writeln!(html, "<div class=\"{}\">", classes.content);

        for block in &page.blocks {
            html.push_str(&self.block(block));
            html.push('\n');
        }
        for image in &page.images {
            html.push_str(&self.image(image));
            html.push('\n');
        }

        html.push_str("</div>\n</div>");
        html
    }

    /// Placeholder fragment for a page that could not be converted.
    pub fn failed_page_fragment(&self, number: usize) -> String {
        let classes = &self.options.css_classes;
        format!(
            "<div class=\"{page}\" data-page=\"{n}\">\n<div class=\"{content}\">\n\
             <p class=\"{para}\">Failed to convert page {n}</p>\n</div>\n</div>",
            page = classes.page,
            content = classes.content,
            para = classes.paragraph,
            n = number
        )
    }

    /// The full document around the page fragments, in order.
    pub fn document(&self, title: &str, stylesheet: &StyleSheet, fragments: &[String]) -> String {
        let mut html = String::with_capacity(fragments.iter().map(String::len).sum::<usize>() + 4096);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        let _ = writeln!(html, "<title>{}</title>", html_escape::encode_text(title));
        let _ = write!(html, "<style>\n{}</style>\n", stylesheet);
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(
            html,
            "<div class=\"{}\">",
            self.options.css_classes.container
        );
        for fragment in fragments {
            html.push_str(fragment);
            html.push('\n');
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    fn block(&self, block: &Block) -> String {
        let classes = &self.options.css_classes;
        let (tag, class) = if block.is_heading() {
            ("h2", &classes.heading)
        } else {
            ("p", &classes.paragraph)
        };

        let mut css = String::new();
        if let Some(ref s) = block.style {
            css.push_str(&style::inline_css(s, self.options.color_format));
        }
        if let Some(pos) = block.position {
            if !css.is_empty() {
                css.push(' ');
            }
            let _ = write!(
                css,
                "position: absolute; left: {}px; top: {}px; margin: 0;",
                px(pos.x),
                px(pos.y)
            );
        }

        let body = block
            .text
            .split('\n')
            .map(|line| html_escape::encode_text(line).into_owned())
            .collect::<Vec<_>>()
            .join("<br>");

        if css.is_empty() {
            format!("<{tag} class=\"{class}\">{body}</{tag}>")
        } else {
            format!(
                "<{tag} class=\"{class}\" style=\"{}\">{body}</{tag}>",
                html_escape::encode_double_quoted_attribute(&css)
            )
        }
    }

    fn image(&self, image: &ImageRef) -> String {
        let mut css = String::new();
        if let Some(pos) = image.position {
            let _ = write!(
                css,
                "position: absolute; left: {}px; top: {}px;",
                px(pos.x),
                px(pos.y)
            );
        }
        if let Some(size) = image.size {
            if !css.is_empty() {
                css.push(' ');
            }
            let _ = write!(css, "width: {}px;", px(size.width));
            if image.position.is_some() {
                let _ = write!(css, " height: {}px;", px(size.height));
            }
        }

        let mut html = format!(
            "<img class=\"{}\" src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\" loading=\"lazy\"",
            self.options.css_classes.image,
            html_escape::encode_double_quoted_attribute(&image.src),
            html_escape::encode_double_quoted_attribute(&image.alt),
            image.pixel_width,
            image.pixel_height
        );
        if !css.is_empty() {
            let _ = write!(html, " style=\"{}\"", css);
        }
        html.push('>');
        html
    }
}

/// Pixel value with at most two decimals.
fn px(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
