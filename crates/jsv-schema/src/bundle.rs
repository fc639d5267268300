//! The three registries a factory is built from.

use std::sync::Arc;

use serde_json::Value;

use jsv_core::NodeType;

use crate::format::FormatRegistry;
use crate::keyword::{KeywordError, KeywordRegistry};
use crate::syntax::SyntaxRegistry;
use crate::validator::KeywordValidator;

/// Keyword syntax rules, keyword builders and formats, bundled.
#[derive(Debug, Clone, Default)]
pub struct ValidatorBundle {
    syntax: SyntaxRegistry,
    keywords: KeywordRegistry,
    formats: FormatRegistry,
}

impl ValidatorBundle {
    /// The draft-04 vocabulary.
    pub fn draft4() -> Self {
        Self {
            syntax: SyntaxRegistry::draft4(),
            keywords: KeywordRegistry::draft4(),
            formats: FormatRegistry::draft4(),
        }
    }

    /// No keywords, no syntax rules, no formats.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a keyword together with its syntax check.
    #[must_use]
    pub fn with_keyword<F>(
        mut self,
        keyword: &str,
        kinds: &[NodeType],
        syntax: Arc<dyn KeywordValidator>,
        builder: F,
    ) -> Self
    where
        F: Fn(&Value) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError>
            + Send
            + Sync
            + 'static,
    {
        self.syntax.register(keyword, syntax);
        self.keywords.register(keyword, kinds, builder);
        self
    }

    /// Add a format.
    #[must_use]
    pub fn with_format<F>(mut self, name: &str, kinds: &[NodeType], check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.formats.register(name, kinds, check);
        self
    }

    /// Syntax registry, for direct registration.
    pub fn syntax_mut(&mut self) -> &mut SyntaxRegistry {
        &mut self.syntax
    }

    /// Keyword registry, for direct registration.
    pub fn keywords_mut(&mut self) -> &mut KeywordRegistry {
        &mut self.keywords
    }

    /// Format registry, for direct registration.
    pub fn formats_mut(&mut self) -> &mut FormatRegistry {
        &mut self.formats
    }

    pub(crate) fn into_parts(self) -> (SyntaxRegistry, KeywordRegistry, FormatRegistry) {
        (self.syntax, self.keywords, self.formats)
    }
}
