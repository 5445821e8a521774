//! Compiled fragments and the reserved names they include.
//!
//! Handlebars resolves partials at render time and recurses without bound, so a fragment bound as
//! `@content` that includes `{{> @content}}` (or content that includes its own layout) would
//! overflow the stack. Each fragment records which reserved names it includes when it is compiled;
//! the manager checks them against the names bound for a call before anything renders.
//!
//! Only literal partial names are seen. A dynamic partial such as `{{> (lookup . "name")}}` is not.

use handlebars::Template;

use crate::error::{Result, TmplviewError};
use crate::manager::{CONTENT, LAYOUT};

const RESERVED: [&str; 2] = [CONTENT, LAYOUT];

#[derive(Debug)]
pub struct Fragment {
    template: Template,
    includes: Vec<&'static str>,
}

impl Fragment {
    /// Compile `bytes` as the source of the fragment at logical `path`.
    pub fn compile(path: &str, bytes: Vec<u8>) -> Result<Self> {
        let source = String::from_utf8(bytes).map_err(|e| TmplviewError::Parse {
            path: path.to_string(),
            line: None,
            column: None,
            reason: format!("source is not valid UTF-8: {e}"),
        })?;

        let template = Template::compile(&source).map_err(|e| {
            let (line, column) = e.pos().map_or((None, None), |(l, c)| (Some(l), Some(c)));
            TmplviewError::Parse {
                path: path.to_string(),
                line,
                column,
                reason: e.reason().to_string(),
            }
        })?;

        Ok(Self {
            template,
            includes: scan_includes(&source),
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Whether the fragment includes the reserved `name` as a partial.
    pub fn includes(&self, name: &str) -> bool {
        self.includes.contains(&name)
    }
}

/// Reserved names referenced by `{{> name}}` or `{{#> name}}` tags, in first-seen order.
fn scan_includes(source: &str) -> Vec<&'static str> {
    let mut found = Vec::new();
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        let escaped = rest[..start].ends_with('\\');
        let tag = &rest[start + 2..];
        rest = tag;
        if escaped {
            continue;
        }

        let tag = tag.strip_prefix('~').unwrap_or(tag);
        if let Some(comment) = tag.strip_prefix('!') {
            let end = if comment.starts_with("--") { "--}}" } else { "}}" };
            match comment.find(end) {
                Some(i) => rest = &comment[i + end.len()..],
                None => break,
            }
            continue;
        }

        let tag = tag.strip_prefix('#').unwrap_or(tag);
        let Some(name) = tag.strip_prefix('>') else {
            continue;
        };
        let name = name.trim_start();

        for reserved in RESERVED {
            let Some(after) = name.strip_prefix(reserved) else {
                continue;
            };
            let ends = !matches!(
                after.chars().next(),
                Some(c) if c.is_alphanumeric() || c == '_' || c == '-'
            );
            if ends && !found.contains(&reserved) {
                found.push(reserved);
            }
        }
    }

    found
}
