//! The document: owns the current tree, the input reader, and the
//! installed grammar.
//!
//! Lifecycle: created empty, language set, input set (first parse), then
//! any number of edits with re-parse. Dropping the document releases the
//! tree; nodes a caller retained stay alive through their own handles.

use std::sync::Arc;

use crate::edit::{self, InputEdit};
use crate::error::Error;
use crate::input::Input;
use crate::language::Language;
use crate::parser::{self, NoopTracer, ParseTracer};
use crate::tree::{Node, SyntaxTree};

#[derive(Default)]
pub struct Document {
    language: Option<Arc<Language>>,
    input: Option<Box<dyn Input>>,
    tree: Option<SyntaxTree>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    /// Installs a grammar. Any existing tree is cleared; the next
    /// `set_input` parses from scratch.
    pub fn set_language(&mut self, language: Arc<Language>) {
        self.language = Some(language);
        self.tree = None;
    }

    /// Installs the reader and runs the initial parse.
    pub fn set_input(&mut self, input: Box<dyn Input>) -> Result<(), Error> {
        self.input = Some(input);
        self.tree = None;
        let language = self.language.clone().ok_or(Error::MissingLanguage)?;
        let input = self.input.as_mut().expect("just installed");
        let mut tracer = NoopTracer;
        let root = parser::parse(&language, input.as_mut(), None, &mut tracer)?;
        self.tree = Some(root);
        Ok(())
    }

    /// Re-parses after an edit, reusing unchanged subtrees. The reader
    /// must already reflect the post-edit content. On a reader error the
    /// previous tree is kept.
    pub fn edit(&mut self, position: usize, deleted: usize, inserted: usize) -> Result<(), Error> {
        self.edit_traced(position, deleted, inserted, &mut NoopTracer)
    }

    /// `edit` with an observation hook for the parse.
    pub fn edit_traced(
        &mut self,
        position: usize,
        deleted: usize,
        inserted: usize,
        tracer: &mut dyn ParseTracer,
    ) -> Result<(), Error> {
        let language = self.language.clone().ok_or(Error::MissingLanguage)?;
        let tree = self.tree.as_ref().ok_or(Error::MissingInput)?;
        let size = usize::from(tree.size());
        if position + deleted > size {
            return Err(Error::EditOutOfRange {
                position,
                deleted,
                size,
            });
        }
        let edited = edit::apply(
            tree,
            &InputEdit {
                position,
                deleted,
                inserted,
            },
        );
        let input = self.input.as_mut().ok_or(Error::MissingInput)?;
        let root = parser::parse(&language, input.as_mut(), Some(edited), tracer)?;
        self.tree = Some(root);
        Ok(())
    }

    /// A retained handle to the DOCUMENT node, or `None` before the first
    /// parse.
    pub fn root(&self) -> Option<Node> {
        let tree = self.tree.clone()?;
        let language = self.language.clone()?;
        Some(Node {
            data: tree,
            position: 0.into(),
            language,
        })
    }

    pub fn language(&self) -> Option<&Arc<Language>> {
        self.language.as_ref()
    }
}
