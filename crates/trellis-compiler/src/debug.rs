//! Human-readable rendering of compiled blocks.
//!
//! Symbols and upvars are printed by name, so two blocks that differ only in
//! slot numbering format identically.
//!
//! ```text
//! [7, "div", true]                  ["open-element", "div", true]
//! [1, [27, [24, 1], ["x"]], false]  ["append", ["get-path", ["get-symbol", "@a"], ["x"]], false]
//! ```

use serde_json::{Value, json};
use trellis_wire::{
    Blocks, Expression, Hash, Primitive, SerializedInlineBlock, SerializedTemplateBlock, Statement,
};

/// Formats a [`SerializedTemplateBlock`] as a JSON tree.
pub struct WireFormatDebugger<'a> {
    block: &'a SerializedTemplateBlock,
}

impl<'a> WireFormatDebugger<'a> {
    /// Prepares to format `block`.
    pub fn new(block: &'a SerializedTemplateBlock) -> Self {
        Self { block }
    }

    /// The block's statements in debug form.
    pub fn format(&self) -> Value {
        self.statements(&self.block.statements)
    }

    fn statements(&self, statements: &[Statement]) -> Value {
        Value::Array(statements.iter().map(|s| self.statement(s)).collect())
    }

    fn statement(&self, statement: &Statement) -> Value {
        match statement {
            Statement::Text(chars) => json!(["text", chars]),
            Statement::Append { value, trusting } => {
                json!(["append", self.expression(value), trusting])
            }
            Statement::Comment(value) => json!(["comment", value]),
            Statement::Modifier { head, params, hash } => json!([
                "modifier",
                self.expression(head),
                self.params(params),
                self.hash(hash.as_ref())
            ]),
            Statement::Block {
                head,
                params,
                hash,
                blocks,
            } => json!([
                "block",
                self.expression(head),
                self.params(params),
                self.hash(hash.as_ref()),
                self.blocks(blocks.as_ref())
            ]),
            Statement::Component {
                tag,
                attrs,
                args,
                blocks,
            } => json!([
                "component",
                tag,
                self.statements(attrs),
                self.hash(args.as_ref()),
                self.blocks(blocks.as_ref())
            ]),
            Statement::DynamicComponent {
                head,
                attrs,
                args,
                blocks,
            } => json!([
                "dynamic-component",
                self.expression(head),
                self.statements(attrs),
                self.hash(args.as_ref()),
                self.blocks(blocks.as_ref())
            ]),
            Statement::OpenElement { tag, simple } => json!(["open-element", tag, simple]),
            Statement::FlushElement => json!(["flush-element"]),
            Statement::CloseElement => json!(["close-element"]),
            Statement::StaticAttr {
                name,
                value,
                namespace,
            } => json!(["static-attr", name, value, namespace]),
            Statement::DynamicAttr {
                name,
                value,
                namespace,
            } => json!(["dynamic-attr", name, self.expression(value), namespace]),
            Statement::ComponentAttr {
                name,
                value,
                namespace,
            } => json!(["component-attr", name, self.expression(value), namespace]),
            Statement::TrustingDynamicAttr {
                name,
                value,
                namespace,
            } => json!(["trusting-dynamic-attr", name, self.expression(value), namespace]),
            Statement::TrustingComponentAttr {
                name,
                value,
                namespace,
            } => json!(["trusting-component-attr", name, self.expression(value), namespace]),
            Statement::AttrSplat(slot) => json!(["attr-splat", self.symbol(*slot)]),
            Statement::Yield { to, params } => {
                json!(["yield", self.symbol(*to), self.params(params)])
            }
            Statement::Partial { target, eval_info } => json!([
                "partial",
                self.expression(target),
                self.eval_info(eval_info)
            ]),
            Statement::DynamicArg { name, value } => {
                json!(["dynamic-arg", name, self.expression(value)])
            }
            Statement::StaticArg { name, value } => {
                json!(["static-arg", name, self.expression(value)])
            }
            Statement::Debugger { eval_info } => json!(["debugger", self.eval_info(eval_info)]),
        }
    }

    fn expression(&self, expr: &Expression) -> Value {
        match expr {
            Expression::Value(primitive) => primitive_value(primitive),
            Expression::Undefined => json!(["undefined"]),
            Expression::GetSymbol(slot) => json!(["get-symbol", self.symbol(*slot)]),
            Expression::GetFree(upvar) => json!(["get-free", self.upvar(*upvar)]),
            Expression::GetContextualFree { upvar, context } => {
                json!(["get-contextual-free", self.upvar(*upvar), context.name()])
            }
            Expression::GetPath { head, tail } => {
                json!(["get-path", self.expression(head), tail])
            }
            Expression::Concat(parts) => json!(["concat", self.params(parts)]),
            Expression::Call {
                callee,
                params,
                hash,
            } => json!([
                "call",
                self.expression(callee),
                self.params(params),
                self.hash(hash.as_ref())
            ]),
            Expression::HasBlock(block) => json!(["has-block", self.expression(block)]),
            Expression::HasBlockParams(block) => {
                json!(["has-block-params", self.expression(block)])
            }
        }
    }

    fn params(&self, params: &[Expression]) -> Value {
        Value::Array(params.iter().map(|p| self.expression(p)).collect())
    }

    fn hash(&self, hash: Option<&Hash>) -> Value {
        match hash {
            Some(hash) => Value::Array(
                hash.iter()
                    .map(|(key, value)| json!([key, self.expression(value)]))
                    .collect(),
            ),
            None => Value::Null,
        }
    }

    fn blocks(&self, blocks: Option<&Blocks>) -> Value {
        match blocks {
            Some(blocks) => Value::Array(
                blocks
                    .iter()
                    .map(|(name, block)| json!([name, self.inline_block(block)]))
                    .collect(),
            ),
            None => Value::Null,
        }
    }

    fn inline_block(&self, block: &SerializedInlineBlock) -> Value {
        json!({
            "parameters": self.eval_info(&block.parameters),
            "statements": self.statements(&block.statements),
        })
    }

    fn eval_info(&self, slots: &[u32]) -> Value {
        Value::Array(slots.iter().map(|slot| self.symbol(*slot)).collect())
    }

    fn symbol(&self, slot: u32) -> Value {
        match self.block.symbol_name(slot) {
            Some(name) => json!(name),
            None => json!(format!("<symbol {slot}>")),
        }
    }

    fn upvar(&self, upvar: u32) -> Value {
        match self.block.upvar_name(upvar) {
            Some(name) => json!(name),
            None => json!(format!("<upvar {upvar}>")),
        }
    }
}

fn primitive_value(primitive: &Primitive) -> Value {
    match primitive {
        Primitive::String(s) => json!(s),
        Primitive::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
            json!(*n as i64)
        }
        Primitive::Number(n) => json!(n),
        Primitive::Boolean(b) => json!(b),
        Primitive::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_wire::FreeVarContext;

    fn block(statements: Vec<Statement>) -> SerializedTemplateBlock {
        SerializedTemplateBlock {
            statements,
            symbols: vec!["@title".into(), "item".into()],
            has_eval: false,
            upvars: vec!["each".into()],
        }
    }

    #[test]
    fn test_symbols_print_by_name() {
        let template = block(vec![Statement::Append {
            value: Expression::GetSymbol(1).path(vec!["length".into()]),
            trusting: false,
        }]);
        assert_eq!(
            WireFormatDebugger::new(&template).format(),
            json!([["append", ["get-path", ["get-symbol", "@title"], ["length"]], false]])
        );
    }

    #[test]
    fn test_blocks_list_parameters_by_name() {
        let mut blocks = Blocks::new();
        blocks.push(
            "default",
            SerializedInlineBlock {
                statements: vec![Statement::Text("x".into())],
                parameters: vec![2],
            },
        );
        let template = block(vec![Statement::Block {
            head: Expression::GetContextualFree {
                upvar: 0,
                context: FreeVarContext::Block,
            }
            .path(vec![]),
            params: vec![Expression::Value(Primitive::Number(3.0))],
            hash: None,
            blocks: Some(blocks),
        }]);
        assert_eq!(
            WireFormatDebugger::new(&template).format(),
            json!([[
                "block",
                ["get-path", ["get-contextual-free", "each", "block"], []],
                [3],
                null,
                [["default", {"parameters": ["item"], "statements": [["text", "x"]]}]]
            ]])
        );
    }

    #[test]
    fn test_out_of_range_slots_do_not_panic() {
        let template = block(vec![Statement::AttrSplat(9)]);
        assert_eq!(
            WireFormatDebugger::new(&template).format(),
            json!([["attr-splat", "<symbol 9>"]])
        );
    }
}
