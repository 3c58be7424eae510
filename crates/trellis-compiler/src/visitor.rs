//! Flattens a template AST into a linear action stream.
//!
//! Nested blocks are emitted before the statement that owns them, so a
//! consumer reading the stream front to back always has a block's body
//! finished by the time it sees the invocation:
//!
//! ```text
//! {{#if a}}x{{else}}y{{/if}}
//!
//! StartBlock(program) Text(x) EndBlock
//! StartBlock(inverse) Text(y) EndBlock
//! Block(if)
//! ```

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::ast::*;

/// Block parameter names in scope at a point in the template.
pub type Locals = Rc<FxHashSet<String>>;

/// One step of the flattened template.
#[derive(Debug, Clone)]
pub enum Action<'a> {
    /// Start of the template
    StartProgram(&'a Template),
    /// End of the template
    EndProgram,
    /// Start of a block statement's program or inverse
    StartBlock(&'a Block),
    /// End of a block statement's program or inverse
    EndBlock,
    /// Static text
    Text(&'a TextNode),
    /// HTML comment
    Comment(&'a CommentStatement),
    /// Element start, with the locals visible at the tag
    OpenElement(&'a ElementNode, Locals),
    /// Element end
    CloseElement(&'a ElementNode),
    /// A mustache
    Mustache(&'a MustacheStatement),
    /// A block statement, after its blocks
    Block(&'a BlockStatement),
}

/// Walks a template and records [`Action`]s.
#[derive(Debug, Default)]
pub struct TemplateVisitor<'a> {
    actions: Vec<Action<'a>>,
    scopes: Vec<Locals>,
}

impl<'a> TemplateVisitor<'a> {
    /// Creates a visitor with an empty scope.
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            scopes: vec![Rc::new(FxHashSet::default())],
        }
    }

    /// Flattens `template`.
    pub fn visit(mut self, template: &'a Template) -> Vec<Action<'a>> {
        self.actions.push(Action::StartProgram(template));
        self.visit_statements(&template.body);
        self.actions.push(Action::EndProgram);
        self.actions
    }

    fn current_scope(&self) -> Locals {
        self.scopes
            .last()
            .cloned()
            .unwrap_or_else(|| Rc::new(FxHashSet::default()))
    }

    fn push_scope(&mut self, params: &[String]) {
        if params.is_empty() {
            let scope = self.current_scope();
            self.scopes.push(scope);
        } else {
            let mut scope = (*self.current_scope()).clone();
            scope.extend(params.iter().cloned());
            self.scopes.push(Rc::new(scope));
        }
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn visit_statements(&mut self, statements: &'a [Statement]) {
        for statement in statements {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &'a Statement) {
        match statement {
            Statement::Text(text) => self.actions.push(Action::Text(text)),
            Statement::Comment(comment) => self.actions.push(Action::Comment(comment)),
            Statement::MustacheComment(_) => {}
            Statement::Mustache(mustache) => self.actions.push(Action::Mustache(mustache)),
            Statement::Block(block) => self.visit_block_statement(block),
            Statement::Element(element) => self.visit_element(element),
        }
    }

    fn visit_block(&mut self, block: &'a Block) {
        self.actions.push(Action::StartBlock(block));
        self.push_scope(&block.block_params);
        self.visit_statements(&block.body);
        self.pop_scope();
        self.actions.push(Action::EndBlock);
    }

    fn visit_block_statement(&mut self, node: &'a BlockStatement) {
        self.visit_block(&node.program);
        if let Some(inverse) = &node.inverse {
            self.visit_block(inverse);
        }
        self.actions.push(Action::Block(node));
    }

    fn visit_element(&mut self, element: &'a ElementNode) {
        self.actions
            .push(Action::OpenElement(element, self.current_scope()));
        self.push_scope(&element.block_params);
        self.visit_statements(&element.children);
        self.pop_scope();
        self.actions.push(Action::CloseElement(element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build as b;

    fn names(actions: &[Action<'_>]) -> Vec<&'static str> {
        actions
            .iter()
            .map(|a| match a {
                Action::StartProgram(_) => "start-program",
                Action::EndProgram => "end-program",
                Action::StartBlock(_) => "start-block",
                Action::EndBlock => "end-block",
                Action::Text(_) => "text",
                Action::Comment(_) => "comment",
                Action::OpenElement(..) => "open-element",
                Action::CloseElement(_) => "close-element",
                Action::Mustache(_) => "mustache",
                Action::Block(_) => "block",
            })
            .collect()
    }

    #[test]
    fn test_blocks_precede_their_statement() {
        let template = b::template(vec![b::block(
            b::path("if"),
            vec![b::path("cond")],
            b::hash(vec![]),
            b::program(vec![b::text("yes")]),
            Some(b::program(vec![b::text("no")])),
        )]);
        let actions = TemplateVisitor::new().visit(&template);
        assert_eq!(
            names(&actions),
            vec![
                "start-program",
                "start-block",
                "text",
                "end-block",
                "start-block",
                "text",
                "end-block",
                "block",
                "end-program"
            ]
        );
    }

    #[test]
    fn test_mustache_comments_are_dropped() {
        let template = b::template(vec![b::mustache_comment("note"), b::comment("html")]);
        let actions = TemplateVisitor::new().visit(&template);
        assert_eq!(names(&actions), vec!["start-program", "comment", "end-program"]);
    }

    #[test]
    fn test_elements_see_enclosing_block_params() {
        let template = b::template(vec![b::block(
            b::path("each"),
            vec![b::path("items")],
            b::hash(vec![]),
            b::program_with_params(
                &["item"],
                vec![
                    b::element("item.view")
                        .block_params(&["inner"])
                        .children(vec![b::element("inner").into()])
                        .into(),
                ],
            ),
            None,
        )]);
        let actions = TemplateVisitor::new().visit(&template);
        let scopes: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::OpenElement(el, locals) => Some((el.tag.as_str(), locals.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(scopes.len(), 2);
        assert!(scopes[0].1.contains("item"));
        assert!(!scopes[0].1.contains("inner"));
        assert!(scopes[1].1.contains("item"));
        assert!(scopes[1].1.contains("inner"));
    }
}
