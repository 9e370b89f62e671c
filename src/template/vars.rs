//! Variable sets applied to templates.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

use super::TemplateError;
use crate::manifest::Manifest;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> Result<String, TemplateError>;
}

/// `<!-- @each NAME -->BODY<!-- @end -->`, non-greedy so blocks don't merge.
/// No `\s`: regex is built without unicode-perl.
static EACH_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<!--[ \t\r\n]*@each[ \t\r\n]+([A-Za-z0-9_]+)[ \t\r\n]*-->(.*?)<!--[ \t\r\n]*@end[ \t\r\n]*-->",
    )
    .expect("valid regex")
});

static EACH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--[ \t\r\n]*@each").expect("valid regex"));

/// Any `__NAME__` placeholder. Resolved in one pass, so inserted text is
/// never scanned again.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"__([A-Za-z0-9]+(?:_[A-Za-z0-9]+)*)__").expect("valid regex")
});

/// Characters escaped in a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Variables for the index page.
pub struct IndexVars<'a> {
    /// Parameter name the manifest is exposed under.
    pub param: &'a str,
    pub manifest: &'a Manifest,
    /// URL prefix of the copied data directory (e.g. `czml`).
    pub data_prefix: &'a str,
    /// Bundle file names to inject as `<script>` tags.
    pub scripts: &'a [String],
    pub inject: bool,
}

impl IndexVars<'_> {
    fn item_url(&self, name: &str) -> String {
        let file = utf8_percent_encode(name, SEGMENT).to_string();
        if self.data_prefix.is_empty() {
            file
        } else {
            format!("{}/{}", self.data_prefix, file)
        }
    }

    /// Substitute placeholders in template text. `item` is set inside an
    /// `@each` body.
    fn fill(&self, text: &str, json: &str, item: Option<(usize, &str)>) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures| {
                let key = &caps[1];
                if key == self.param.to_ascii_uppercase() {
                    return json.to_string();
                }
                match (key, item) {
                    ("ITEM_URL", Some((_, file))) => escape_html(&self.item_url(file)),
                    ("ITEM", Some((_, file))) => escape_html(file),
                    ("INDEX", Some((i, _))) => i.to_string(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Template text outside `@each` blocks.
    fn fill_outer(&self, text: &str, json: &str) -> Result<String, TemplateError> {
        if EACH_OPEN.is_match(text) {
            return Err(TemplateError::Unclosed);
        }
        Ok(self.fill(text, json, None))
    }

    fn expand(&self, content: &str, json: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;

        for caps in EACH_BLOCK.captures_iter(content) {
            let (Some(whole), Some(name), Some(body)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if name.as_str() != self.param {
                return Err(TemplateError::UnknownParam {
                    name: name.as_str().to_string(),
                    expected: self.param.to_string(),
                });
            }

            out.push_str(&self.fill_outer(&content[last..whole.start()], json)?);
            for (i, file) in self.manifest.iter().enumerate() {
                out.push_str(&self.fill(body.as_str(), json, Some((i, file.as_str()))));
            }
            last = whole.end();
        }

        out.push_str(&self.fill_outer(&content[last..], json)?);
        Ok(out)
    }

    fn inject_scripts(&self, html: String) -> String {
        if !self.inject || self.scripts.is_empty() {
            return html;
        }

        let tags: String = self
            .scripts
            .iter()
            .map(|src| format!("<script src=\"{}\"></script>", escape_html(src)))
            .collect();

        match html.rfind("</body>") {
            Some(pos) => {
                let mut out = String::with_capacity(html.len() + tags.len());
                out.push_str(&html[..pos]);
                out.push_str(&tags);
                out.push_str(&html[pos..]);
                out
            }
            None => html + &tags,
        }
    }
}

impl TemplateVars for IndexVars<'_> {
    fn apply(&self, content: &str) -> Result<String, TemplateError> {
        // Manifest names are plain strings, serialization cannot fail
        let json = serde_json::to_string(self.manifest).unwrap_or_else(|_| "[]".into());
        let html = self.expand(content, &json)?;
        Ok(self.inject_scripts(html))
    }
}

/// Escape HTML special characters in text and attribute content.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ManifestBuilder, MemoryListing};
    use crate::template::Template;
    use std::path::Path;

    fn manifest(names: &[&str]) -> Manifest {
        let listing = MemoryListing::new().with_dir("/d", names.iter().copied());
        ManifestBuilder::new(listing, "czml")
            .build(Path::new("/d"))
            .unwrap()
    }

    fn render(content: &str, manifest: &Manifest, scripts: &[String]) -> Result<String, TemplateError> {
        let vars = IndexVars {
            param: "czml",
            manifest,
            data_prefix: "czml",
            scripts,
            inject: true,
        };
        Template::new(content).render(&vars)
    }

    #[test]
    fn test_json_placeholder() {
        let m = manifest(&["b.czml", "a.czml"]);
        let html = render("<script>var files = __CZML__;</script>", &m, &[]).unwrap();
        assert_eq!(html, r#"<script>var files = ["b.czml","a.czml"];</script>"#);
    }

    #[test]
    fn test_each_block_in_manifest_order() {
        let m = manifest(&["z.czml", "a.czml"]);
        let tpl = "<ul><!-- @each czml --><li id=\"__INDEX__\"><a href=\"__ITEM_URL__\">__ITEM__</a></li><!-- @end --></ul>";
        let html = render(tpl, &m, &[]).unwrap();
        assert_eq!(
            html,
            "<ul><li id=\"0\"><a href=\"czml/z.czml\">z.czml</a></li><li id=\"1\"><a href=\"czml/a.czml\">a.czml</a></li></ul>"
        );
    }

    #[test]
    fn test_each_block_empty_manifest() {
        let m = manifest(&[]);
        let html = render("<ul><!-- @each czml --><li>__ITEM__</li><!-- @end --></ul>", &m, &[]).unwrap();
        assert_eq!(html, "<ul></ul>");
    }

    #[test]
    fn test_item_escaping() {
        let m = manifest(&["a&b c.czml"]);
        let html = render("<!-- @each czml -->__ITEM__|__ITEM_URL__<!-- @end -->", &m, &[]).unwrap();
        assert_eq!(html, "a&amp;b c.czml|czml/a&amp;b%20c.czml");
    }

    #[test]
    fn test_placeholders_in_file_names_are_literal() {
        let m = manifest(&["a__ITEM__.czml", "x__INDEX__.czml", "__CZML__.czml"]);
        let tpl = "<!-- @each czml -->[__ITEM__|__ITEM_URL__]<!-- @end -->";
        let html = render(tpl, &m, &[]).unwrap();
        assert_eq!(
            html,
            "[a__ITEM__.czml|czml/a__ITEM__.czml][x__INDEX__.czml|czml/x__INDEX__.czml][__CZML__.czml|czml/__CZML__.czml]"
        );

        let json = render("var files = __CZML__;", &m, &[]).unwrap();
        assert_eq!(
            json,
            r#"var files = ["a__ITEM__.czml","x__INDEX__.czml","__CZML__.czml"];"#
        );
    }

    #[test]
    fn test_multiline_block_and_json_inside_body() {
        let m = manifest(&["a.czml"]);
        let tpl = "<!--\n  @each czml\n-->__INDEX__/__CZML__<!--\t@end -->";
        let html = render(tpl, &m, &[]).unwrap();
        assert_eq!(html, r#"0/["a.czml"]"#);
    }

    #[test]
    fn test_unknown_param() {
        let m = manifest(&["a.czml"]);
        let err = render("<!-- @each scenes -->__ITEM__<!-- @end -->", &m, &[]).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownParam { ref name, .. } if name == "scenes"));
    }

    #[test]
    fn test_unclosed_block() {
        let m = manifest(&["a.czml"]);
        let err = render("<!-- @each czml --><li>__ITEM__</li>", &m, &[]).unwrap_err();
        assert!(matches!(err, TemplateError::Unclosed));
    }

    #[test]
    fn test_inject_before_body_close() {
        let m = manifest(&[]);
        let scripts = vec!["app.js".to_string()];
        let html = render("<body><div id=\"map\"></div></body>", &m, &scripts).unwrap();
        assert_eq!(
            html,
            "<body><div id=\"map\"></div><script src=\"app.js\"></script></body>"
        );
    }

    #[test]
    fn test_inject_appends_without_body() {
        let m = manifest(&[]);
        let scripts = vec!["app.js".to_string(), "extra.js".to_string()];
        let html = render("<div></div>", &m, &scripts).unwrap();
        assert_eq!(
            html,
            "<div></div><script src=\"app.js\"></script><script src=\"extra.js\"></script>"
        );
    }

    #[test]
    fn test_inject_disabled() {
        let m = manifest(&[]);
        let scripts = vec!["app.js".to_string()];
        let vars = IndexVars {
            param: "czml",
            manifest: &m,
            data_prefix: "czml",
            scripts: &scripts,
            inject: false,
        };
        let html = Template::new("<body></body>").render(&vars).unwrap();
        assert_eq!(html, "<body></body>");
    }

    #[test]
    fn test_load_missing_template() {
        let result = Template::<IndexVars<'static>>::load(Path::new("/nonexistent/index.html"));
        assert!(matches!(result, Err(TemplateError::Read { .. })));
    }
}
