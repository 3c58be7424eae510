//! Tuple (de)serialization for statements and expressions.
//!
//! Hand-written because the layout is positional: an opcode number followed
//! by operands whose types depend on the opcode.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::expression::{Expression, FreeVarContext, Hash, Primitive};
use crate::opcodes::SexpOpcode;
use crate::statement::{Blocks, Statement};
use crate::template::SerializedInlineBlock;
use crate::WireError;

// ============================================================================
// Serialization
// ============================================================================

fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Primitive::String(s) => serializer.serialize_str(s),
            Primitive::Number(n) => serialize_number(*n, serializer),
            Primitive::Boolean(b) => serializer.serialize_bool(*b),
            Primitive::Null => serializer.serialize_unit(),
        }
    }
}

impl Serialize for FreeVarContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.keys, &self.values).serialize(serializer)
    }
}

impl Serialize for Blocks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.names, &self.blocks).serialize(serializer)
    }
}

/// Writes `[opcode, operands...]`.
macro_rules! tuple {
    ($serializer:expr, $op:expr $(, $operand:expr)* $(,)?) => {{
        let len = 1 $(+ { let _ = &$operand; 1 })*;
        let mut seq = $serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&($op as u8))?;
        $(seq.serialize_element($operand)?;)*
        seq.end()
    }};
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use SexpOpcode as Op;
        match self {
            Expression::Value(p) => p.serialize(serializer),
            Expression::Undefined => tuple!(serializer, Op::Undefined),
            Expression::GetSymbol(slot) => tuple!(serializer, Op::GetSymbol, slot),
            Expression::GetFree(upvar) => tuple!(serializer, Op::GetFree, upvar),
            Expression::GetContextualFree { upvar, context } => {
                tuple!(serializer, Op::GetContextualFree, upvar, context)
            }
            Expression::GetPath { head, tail } => tuple!(serializer, Op::GetPath, head, tail),
            Expression::Concat(parts) => tuple!(serializer, Op::Concat, parts),
            Expression::Call {
                callee,
                params,
                hash,
            } => tuple!(serializer, Op::Call, callee, params, hash),
            Expression::HasBlock(block) => tuple!(serializer, Op::HasBlock, block),
            Expression::HasBlockParams(block) => tuple!(serializer, Op::HasBlockParams, block),
        }
    }
}

impl Serialize for Statement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let op = self.opcode();
        match self {
            Statement::Text(chars) => tuple!(serializer, op, chars),
            Statement::Append { value, trusting } => tuple!(serializer, op, value, trusting),
            Statement::Comment(value) => tuple!(serializer, op, value),
            Statement::Modifier { head, params, hash } => {
                tuple!(serializer, op, head, params, hash)
            }
            Statement::Block {
                head,
                params,
                hash,
                blocks,
            } => tuple!(serializer, op, head, params, hash, blocks),
            Statement::Component {
                tag,
                attrs,
                args,
                blocks,
            } => tuple!(serializer, op, tag, attrs, args, blocks),
            Statement::DynamicComponent {
                head,
                attrs,
                args,
                blocks,
            } => tuple!(serializer, op, head, attrs, args, blocks),
            Statement::OpenElement { tag, simple } => tuple!(serializer, op, tag, simple),
            Statement::FlushElement | Statement::CloseElement => tuple!(serializer, op),
            Statement::StaticAttr {
                name,
                value,
                namespace,
            } => tuple!(serializer, op, name, value, namespace),
            Statement::DynamicAttr {
                name,
                value,
                namespace,
            }
            | Statement::ComponentAttr {
                name,
                value,
                namespace,
            }
            | Statement::TrustingDynamicAttr {
                name,
                value,
                namespace,
            }
            | Statement::TrustingComponentAttr {
                name,
                value,
                namespace,
            } => tuple!(serializer, op, name, value, namespace),
            Statement::AttrSplat(slot) => tuple!(serializer, op, slot),
            Statement::Yield { to, params } => tuple!(serializer, op, to, params),
            Statement::Partial { target, eval_info } => tuple!(serializer, op, target, eval_info),
            Statement::DynamicArg { name, value } | Statement::StaticArg { name, value } => {
                tuple!(serializer, op, name, value)
            }
            Statement::Debugger { eval_info } => tuple!(serializer, op, eval_info),
        }
    }
}

// ============================================================================
// Deserialization
// ============================================================================

fn next<'de, T, A>(seq: &mut A, index: usize, expecting: &'static str) -> Result<T, A::Error>
where
    T: Deserialize<'de>,
    A: SeqAccess<'de>,
{
    seq.next_element()?
        .ok_or_else(|| de::Error::invalid_length(index, &expecting))
}

fn opcode<'de, A: SeqAccess<'de>>(seq: &mut A) -> Result<SexpOpcode, A::Error> {
    let raw: u8 = next(seq, 0, "an opcode")?;
    SexpOpcode::try_from(raw).map_err(de::Error::custom)
}

impl<'de> Deserialize<'de> for FreeVarContext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        FreeVarContext::try_from(raw).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (keys, values): (Vec<String>, Vec<Expression>) = Deserialize::deserialize(deserializer)?;
        if keys.len() != values.len() {
            return Err(de::Error::custom(format!(
                "hash has {} keys but {} values",
                keys.len(),
                values.len()
            )));
        }
        Ok(Hash { keys, values })
    }
}

impl<'de> Deserialize<'de> for Blocks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (names, blocks): (Vec<String>, Vec<SerializedInlineBlock>) =
            Deserialize::deserialize(deserializer)?;
        if names.len() != blocks.len() {
            return Err(de::Error::custom(format!(
                "block list has {} names but {} blocks",
                names.len(),
                blocks.len()
            )));
        }
        Ok(Blocks { names, blocks })
    }
}

struct ExpressionVisitor;

impl<'de> Visitor<'de> for ExpressionVisitor {
    type Value = Expression;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a primitive or an expression tuple")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Expression, E> {
        Ok(Expression::string(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Expression, E> {
        Ok(Expression::string(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Expression, E> {
        Ok(Expression::Value(Primitive::Boolean(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Expression, E> {
        Ok(Expression::Value(Primitive::Number(v as f64)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Expression, E> {
        Ok(Expression::Value(Primitive::Number(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Expression, E> {
        Ok(Expression::Value(Primitive::Number(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Expression, E> {
        Ok(Expression::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<Expression, E> {
        Ok(Expression::null())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Expression, A::Error> {
        use SexpOpcode as Op;
        let op = opcode(&mut seq)?;
        let expr = match op {
            Op::Undefined => Expression::Undefined,
            Op::GetSymbol => Expression::GetSymbol(next(&mut seq, 1, "a symbol")?),
            Op::GetFree => Expression::GetFree(next(&mut seq, 1, "an upvar")?),
            Op::GetContextualFree => Expression::GetContextualFree {
                upvar: next(&mut seq, 1, "an upvar")?,
                context: next(&mut seq, 2, "a context")?,
            },
            Op::GetPath => Expression::GetPath {
                head: Box::new(next(&mut seq, 1, "a path head")?),
                tail: next(&mut seq, 2, "a path tail")?,
            },
            Op::Concat => Expression::Concat(next(&mut seq, 1, "concat parts")?),
            Op::Call => Expression::Call {
                callee: Box::new(next(&mut seq, 1, "a callee")?),
                params: next(&mut seq, 2, "params")?,
                hash: next(&mut seq, 3, "a hash")?,
            },
            Op::HasBlock => Expression::HasBlock(Box::new(next(&mut seq, 1, "a block")?)),
            Op::HasBlockParams => {
                Expression::HasBlockParams(Box::new(next(&mut seq, 1, "a block")?))
            }
            opcode => {
                return Err(de::Error::custom(WireError::Misplaced {
                    opcode,
                    position: "an expression",
                }));
            }
        };
        Ok(expr)
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ExpressionVisitor)
    }
}

struct StatementVisitor;

impl<'de> Visitor<'de> for StatementVisitor {
    type Value = Statement;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a statement tuple")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Statement, A::Error> {
        use SexpOpcode as Op;
        let op = opcode(&mut seq)?;
        let statement = match op {
            Op::Text => Statement::Text(next(&mut seq, 1, "text")?),
            Op::Append => Statement::Append {
                value: next(&mut seq, 1, "a value")?,
                trusting: next(&mut seq, 2, "a trusting flag")?,
            },
            Op::Comment => Statement::Comment(next(&mut seq, 1, "a comment")?),
            Op::Modifier => Statement::Modifier {
                head: next(&mut seq, 1, "a modifier")?,
                params: next(&mut seq, 2, "params")?,
                hash: next(&mut seq, 3, "a hash")?,
            },
            Op::Block => Statement::Block {
                head: next(&mut seq, 1, "a block head")?,
                params: next(&mut seq, 2, "params")?,
                hash: next(&mut seq, 3, "a hash")?,
                blocks: next(&mut seq, 4, "blocks")?,
            },
            Op::Component => Statement::Component {
                tag: next(&mut seq, 1, "a tag")?,
                attrs: next(&mut seq, 2, "attributes")?,
                args: next(&mut seq, 3, "arguments")?,
                blocks: next(&mut seq, 4, "blocks")?,
            },
            Op::DynamicComponent => Statement::DynamicComponent {
                head: next(&mut seq, 1, "a component")?,
                attrs: next(&mut seq, 2, "attributes")?,
                args: next(&mut seq, 3, "arguments")?,
                blocks: next(&mut seq, 4, "blocks")?,
            },
            Op::OpenElement => Statement::OpenElement {
                tag: next(&mut seq, 1, "a tag")?,
                simple: next(&mut seq, 2, "a simple flag")?,
            },
            Op::FlushElement => Statement::FlushElement,
            Op::CloseElement => Statement::CloseElement,
            Op::StaticAttr => Statement::StaticAttr {
                name: next(&mut seq, 1, "a name")?,
                value: next(&mut seq, 2, "a value")?,
                namespace: next(&mut seq, 3, "a namespace")?,
            },
            Op::DynamicAttr => Statement::DynamicAttr {
                name: next(&mut seq, 1, "a name")?,
                value: next(&mut seq, 2, "a value")?,
                namespace: next(&mut seq, 3, "a namespace")?,
            },
            Op::ComponentAttr => Statement::ComponentAttr {
                name: next(&mut seq, 1, "a name")?,
                value: next(&mut seq, 2, "a value")?,
                namespace: next(&mut seq, 3, "a namespace")?,
            },
            Op::TrustingDynamicAttr => Statement::TrustingDynamicAttr {
                name: next(&mut seq, 1, "a name")?,
                value: next(&mut seq, 2, "a value")?,
                namespace: next(&mut seq, 3, "a namespace")?,
            },
            Op::TrustingComponentAttr => Statement::TrustingComponentAttr {
                name: next(&mut seq, 1, "a name")?,
                value: next(&mut seq, 2, "a value")?,
                namespace: next(&mut seq, 3, "a namespace")?,
            },
            Op::AttrSplat => Statement::AttrSplat(next(&mut seq, 1, "a symbol")?),
            Op::Yield => Statement::Yield {
                to: next(&mut seq, 1, "a symbol")?,
                params: next(&mut seq, 2, "params")?,
            },
            Op::Partial => Statement::Partial {
                target: next(&mut seq, 1, "a partial name")?,
                eval_info: next(&mut seq, 2, "eval info")?,
            },
            Op::DynamicArg => Statement::DynamicArg {
                name: next(&mut seq, 1, "a name")?,
                value: next(&mut seq, 2, "a value")?,
            },
            Op::StaticArg => Statement::StaticArg {
                name: next(&mut seq, 1, "a name")?,
                value: next(&mut seq, 2, "a value")?,
            },
            Op::Debugger => Statement::Debugger {
                eval_info: next(&mut seq, 1, "eval info")?,
            },
            opcode => {
                return Err(de::Error::custom(WireError::Misplaced {
                    opcode,
                    position: "a statement",
                }));
            }
        };
        Ok(statement)
    }
}

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(StatementVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn free(upvar: u32, context: FreeVarContext) -> Expression {
        Expression::GetContextualFree { upvar, context }.path(vec![])
    }

    #[test]
    fn test_append_layout() {
        let statement = Statement::Append {
            value: free(0, FreeVarContext::Ambiguous),
            trusting: false,
        };
        assert_eq!(
            serde_json::to_value(&statement).unwrap(),
            json!([1, [27, [26, 0, 1], []], false])
        );
    }

    #[test]
    fn test_empty_hash_and_blocks_are_null() {
        let statement = Statement::Block {
            head: free(0, FreeVarContext::Block),
            params: vec![Expression::string("x")],
            hash: None,
            blocks: None,
        };
        assert_eq!(
            serde_json::to_value(&statement).unwrap(),
            json!([4, [27, [26, 0, 4], []], ["x"], null, null])
        );
    }

    #[test]
    fn test_call_with_hash() {
        let call = Expression::Call {
            callee: Box::new(free(1, FreeVarContext::Helper)),
            params: vec![Expression::Value(Primitive::Number(123.0))],
            hash: Some([("key", Expression::Value(Primitive::Boolean(true)))]
                .into_iter()
                .collect()),
        };
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value, json!([22, [27, [26, 1, 2], []], [123], [["key"], [true]]]));
        assert_eq!(serde_json::from_value::<Expression>(value).unwrap(), call);
    }

    #[test]
    fn test_component_with_default_block() {
        let mut blocks = Blocks::new();
        blocks.push(
            "default",
            SerializedInlineBlock {
                statements: vec![Statement::Text("hi".into())],
                parameters: vec![1],
            },
        );
        let component = Statement::Component {
            tag: "Foo".into(),
            attrs: vec![Statement::AttrSplat(2)],
            args: Some([("@title", Expression::string("x"))].into_iter().collect()),
            blocks: Some(blocks),
        };
        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(
            value,
            json!([
                5,
                "Foo",
                [[13, 2]],
                [["@title"], ["x"]],
                [["default"], [{ "statements": [[0, "hi"]], "parameters": [1] }]]
            ])
        );
        assert_eq!(serde_json::from_value::<Statement>(value).unwrap(), component);
    }

    #[test]
    fn test_decode_rejects_misplaced_opcode() {
        let err = serde_json::from_value::<Statement>(json!([24, 1])).unwrap_err();
        assert!(err.to_string().contains("not valid as a statement"));

        let err = serde_json::from_value::<Expression>(json!([8])).unwrap_err();
        assert!(err.to_string().contains("not valid as an expression"));
    }

    #[test]
    fn test_decode_rejects_unbalanced_hash() {
        let err = serde_json::from_value::<Hash>(json!([["a", "b"], [1]])).unwrap_err();
        assert!(err.to_string().contains("2 keys but 1 values"));
    }

    #[test]
    fn test_template_block_uses_camel_case() {
        let block = crate::SerializedTemplateBlock {
            statements: vec![Statement::Debugger { eval_info: vec![1] }],
            symbols: vec!["@a".into()],
            has_eval: true,
            upvars: vec![],
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({ "statements": [[20, [1]]], "symbols": ["@a"], "hasEval": true, "upvars": [] })
        );
    }
}
