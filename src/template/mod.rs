//! HTML template rendering with the data manifest.
//!
//! Templates are plain HTML with a few placeholders, keyed by the
//! configured parameter name (`czml` below):
//!
//! ```html
//! <script>const files = __CZML__;</script>      <!-- JSON array -->
//! <ul>
//!   <!-- @each czml -->
//!   <li data-index="__INDEX__"><a href="__ITEM_URL__">__ITEM__</a></li>
//!   <!-- @end -->
//! </ul>
//! ```
//!
//! Bundle `<script>` tags are inserted before the closing `</body>` when
//! injection is enabled.

mod vars;

pub use vars::{IndexVars, TemplateVars};

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot read template `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown template parameter `{name}` in @each block (expected `{expected}`)")]
    UnknownParam { name: String, expected: String },

    #[error("unclosed @each block, missing `<!-- @end -->`")]
    Unclosed,
}

/// Template source with typed variable injection.
#[derive(Debug, Clone)]
pub struct Template<V> {
    content: String,
    _marker: std::marker::PhantomData<V>,
}

impl<V> Template<V> {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Read a template from disk.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        std::fs::read_to_string(path)
            .map(Self::new)
            .map_err(|source| TemplateError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> Result<String, TemplateError> {
        vars.apply(&self.content)
    }
}
