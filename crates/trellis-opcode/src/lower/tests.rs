//! Tests for wire-format lowering.

use super::*;
use crate::resolver::StaticResolver;
use trellis_wire::{Blocks, FreeVarContext, Primitive, Statement};

fn template(statements: Vec<Statement>, symbols: &[&str], upvars: &[&str]) -> SerializedTemplateBlock {
    SerializedTemplateBlock {
        statements,
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        has_eval: false,
        upvars: upvars.iter().map(|s| s.to_string()).collect(),
    }
}

fn resolver() -> StaticResolver {
    StaticResolver::new()
        .helpers(["concat", "format"])
        .modifiers(["on"])
        .components(["if", "each", "Foo"])
}

fn lower_source(block: &SerializedTemplateBlock) -> Result<Program> {
    lower(block, &resolver())
}

fn lower_ok(block: &SerializedTemplateBlock) -> Program {
    lower_source(block).expect("Lowering should succeed")
}

fn opcodes(instructions: &[Instruction]) -> Vec<OpCode> {
    instructions.iter().map(|i| i.opcode).collect()
}

fn free(upvar: u32, context: FreeVarContext) -> Expression {
    Expression::GetContextualFree { upvar, context }.path(vec![])
}

fn append(value: Expression) -> Statement {
    Statement::Append {
        value,
        trusting: false,
    }
}

fn names(program: &Program, operand: &Operand) -> Vec<String> {
    match operand {
        Operand::Constant(i) => match program.constant(*i) {
            Some(Constant::Names(names)) => names.clone(),
            other => panic!("expected names, got {other:?}"),
        },
        other => panic!("expected constant, got {other:?}"),
    }
}

#[test]
fn test_text_and_comment() {
    let program = lower_ok(&template(
        vec![Statement::Text("hi".into()), Statement::Comment("note".into())],
        &[],
        &[],
    ));
    assert_eq!(
        program.instructions,
        vec![
            Instruction::with_operand(OpCode::Text, Operand::Constant(0)),
            Instruction::with_operand(OpCode::Comment, Operand::Constant(1)),
        ]
    );
    assert_eq!(program.constants, vec![Constant::from("hi"), Constant::from("note")]);
}

#[test]
fn test_append_text_and_html() {
    let program = lower_ok(&template(
        vec![
            append(Expression::string("x")),
            Statement::Append {
                value: Expression::Value(Primitive::Boolean(true)),
                trusting: true,
            },
        ],
        &[],
        &[],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::PushConstant,
            OpCode::AppendText,
            OpCode::PushTrue,
            OpCode::AppendHtml
        ]
    );
}

#[test]
fn test_get_path_reads_each_key() {
    let program = lower_ok(&template(
        vec![append(
            Expression::GetSymbol(1).path(vec!["a".into(), "b".into()]),
        )],
        &["@model"],
        &[],
    ));
    assert_eq!(
        program.instructions[..3],
        [
            Instruction::with_operand(OpCode::GetVariable, Operand::Symbol(1)),
            Instruction::with_operand(OpCode::GetProperty, Operand::Constant(0)),
            Instruction::with_operand(OpCode::GetProperty, Operand::Constant(1)),
        ]
    );
}

#[test]
fn test_contextual_free_outside_calls() {
    let program = lower_ok(&template(
        vec![append(free(0, FreeVarContext::Ambiguous))],
        &[],
        &["title"],
    ));
    assert_eq!(
        program.instructions[0],
        Instruction::with_operands(
            OpCode::ResolveContextualFree,
            vec![Operand::Upvar(0), Operand::Context(FreeVarContext::Ambiguous)],
        )
    );
}

#[test]
fn test_get_free_is_unimplemented() {
    let error = lower_source(&template(
        vec![append(Expression::GetFree(0).path(vec![]))],
        &[],
        &["x"],
    ))
    .unwrap_err();
    assert!(matches!(error, LowerError::Unimplemented(_)));
}

#[test]
fn test_concat_counts_parts() {
    let program = lower_ok(&template(
        vec![append(Expression::Concat(vec![
            Expression::string("a"),
            Expression::Undefined,
            Expression::Value(Primitive::Null),
        ]))],
        &[],
        &[],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::PushConstant,
            OpCode::PushUndefined,
            OpCode::PushNull,
            OpCode::Concat,
            OpCode::AppendText
        ]
    );
    assert_eq!(program.instructions[3].operands, vec![Operand::Count(3)]);
}

#[test]
fn test_helper_call_resolves_handle() {
    let mut hash = trellis_wire::Hash::new();
    hash.push("sep", Expression::string(","));
    let program = lower_ok(&template(
        vec![append(Expression::Call {
            callee: Box::new(free(1, FreeVarContext::Helper)),
            params: vec![free(0, FreeVarContext::Expression)],
            hash: Some(hash),
        })],
        &[],
        &["items", "format"],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::ResolveContextualFree,
            OpCode::PushConstant,
            OpCode::PushArgs,
            OpCode::Helper,
            OpCode::AppendText
        ]
    );
    let push_args = &program.instructions[2];
    assert_eq!(push_args.operands[0], Operand::Count(1));
    assert_eq!(names(&program, &push_args.operands[1]), vec!["sep"]);
    assert_eq!(program.instructions[3].operands, vec![Operand::Handle(1)]);
}

#[test]
fn test_unresolved_helper() {
    let error = lower_source(&template(
        vec![append(Expression::Call {
            callee: Box::new(free(0, FreeVarContext::Helper)),
            params: vec![],
            hash: None,
        })],
        &[],
        &["missing"],
    ))
    .unwrap_err();
    assert_eq!(error, LowerError::UnresolvedHelper("missing".into()));
    assert_eq!(error.to_string(), "Unresolved helper `missing`");
}

#[test]
fn test_call_head_must_be_free() {
    let error = lower_source(&template(
        vec![append(Expression::Call {
            callee: Box::new(Expression::GetSymbol(1).path(vec![])),
            params: vec![],
            hash: None,
        })],
        &["@fn"],
        &[],
    ))
    .unwrap_err();
    assert!(matches!(error, LowerError::Syntax(_)));
}

#[test]
fn test_component_helper_curries() {
    let program = lower_ok(&template(
        vec![append(Expression::Call {
            callee: Box::new(free(0, FreeVarContext::Helper)),
            params: vec![Expression::string("x-foo"), Expression::string("extra")],
            hash: None,
        })],
        &[],
        &["component"],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::PushArgs,
            OpCode::CurryComponent,
            OpCode::AppendText
        ]
    );
    assert_eq!(program.instructions[2].operands[0], Operand::Count(1));
}

#[test]
fn test_component_helper_requires_definition() {
    let error = lower_source(&template(
        vec![append(Expression::Call {
            callee: Box::new(free(0, FreeVarContext::Helper)),
            params: vec![],
            hash: None,
        })],
        &[],
        &["component"],
    ))
    .unwrap_err();
    assert_eq!(
        error.to_string(),
        "SYNTAX ERROR: component helper requires at least one argument"
    );
}

#[test]
fn test_has_block_params_spreads_and_compiles() {
    let program = lower_ok(&template(
        vec![
            append(Expression::HasBlock(Box::new(Expression::GetSymbol(1)))),
            append(Expression::HasBlockParams(Box::new(Expression::GetSymbol(1)))),
        ],
        &["&default"],
        &[],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::GetVariable,
            OpCode::HasBlock,
            OpCode::AppendText,
            OpCode::GetVariable,
            OpCode::SpreadBlock,
            OpCode::CompileBlock,
            OpCode::HasBlockParams,
            OpCode::AppendText
        ]
    );
}

#[test]
fn test_elements_and_attributes() {
    let program = lower_ok(&template(
        vec![
            Statement::OpenElement {
                tag: "a".into(),
                simple: true,
            },
            Statement::StaticAttr {
                name: "xlink:href".into(),
                value: "#x".into(),
                namespace: Some("http://www.w3.org/1999/xlink".into()),
            },
            Statement::TrustingDynamicAttr {
                name: "title".into(),
                value: Expression::GetSymbol(0).path(vec!["t".into()]),
                namespace: None,
            },
            Statement::FlushElement,
            Statement::CloseElement,
        ],
        &[],
        &[],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::OpenElement,
            OpCode::StaticAttr,
            OpCode::GetVariable,
            OpCode::GetProperty,
            OpCode::DynamicAttr,
            OpCode::FlushElement,
            OpCode::CloseElement
        ]
    );
    assert_eq!(program.instructions[0].operands[1], Operand::Flag(true));
    assert_eq!(program.instructions[1].operands.len(), 3);
    assert_eq!(program.instructions[4].operands[1], Operand::Flag(true));
}

#[test]
fn test_modifier_resolution() {
    let modifier = |upvar| Statement::Modifier {
        head: free(upvar, FreeVarContext::Modifier),
        params: vec![Expression::string("click")],
        hash: None,
    };
    let program = lower_ok(&template(vec![modifier(0)], &[], &["on"]));
    assert_eq!(
        program.instructions.last(),
        Some(&Instruction::with_operand(OpCode::Modifier, Operand::Handle(0)))
    );

    let error = lower_source(&template(vec![modifier(0)], &[], &["off"])).unwrap_err();
    assert_eq!(error, LowerError::UnresolvedModifier("off".into()));
}

#[test]
fn test_block_compiles_inline_blocks_into_table() {
    let mut blocks = Blocks::new();
    blocks.push(
        "default",
        trellis_wire::SerializedInlineBlock {
            statements: vec![append(Expression::GetSymbol(1).path(vec!["name".into()]))],
            parameters: vec![1],
        },
    );
    blocks.push(
        "else",
        trellis_wire::SerializedInlineBlock {
            statements: vec![Statement::Text("none".into())],
            parameters: vec![],
        },
    );
    let program = lower_ok(&template(
        vec![Statement::Block {
            head: free(1, FreeVarContext::Block),
            params: vec![free(0, FreeVarContext::Expression)],
            hash: None,
            blocks: Some(blocks),
        }],
        &["item"],
        &["items", "each"],
    ));

    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::ResolveContextualFree,
            OpCode::PushArgs,
            OpCode::PushBlock,
            OpCode::PushBlock,
            OpCode::InvokeComponent
        ]
    );
    assert_eq!(program.blocks.len(), 2);
    assert_eq!(program.blocks[0].parameters, vec![1]);
    assert_eq!(
        opcodes(&program.blocks[0].instructions),
        vec![
            OpCode::GetVariable,
            OpCode::GetProperty,
            OpCode::AppendText
        ]
    );
    assert_eq!(program.instructions[3].operands[1], Operand::Block(1));
    assert_eq!(
        program.instructions[4].operands,
        vec![Operand::Handle(1), Operand::Count(2)]
    );
}

#[test]
fn test_unresolved_block() {
    let error = lower_source(&template(
        vec![Statement::Block {
            head: free(0, FreeVarContext::Block),
            params: vec![],
            hash: None,
            blocks: None,
        }],
        &[],
        &["unless"],
    ))
    .unwrap_err();
    assert_eq!(error, LowerError::UnresolvedComponent("unless".into()));
}

#[test]
fn test_component_folds_args_from_attrs() {
    let mut args = trellis_wire::Hash::new();
    args.push("@title", Expression::string("t"));
    let program = lower_ok(&template(
        vec![Statement::Component {
            tag: "Foo".into(),
            attrs: vec![
                Statement::ComponentAttr {
                    name: "class".into(),
                    value: Expression::string("c"),
                    namespace: None,
                },
                Statement::StaticArg {
                    name: "@size".into(),
                    value: Expression::string("lg"),
                },
                Statement::AttrSplat(1),
            ],
            args: Some(args),
            blocks: None,
        }],
        &["&attrs"],
        &[],
    ));

    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::PushConstant,
            OpCode::PushConstant,
            OpCode::PushArgs,
            OpCode::PushAttrs,
            OpCode::InvokeComponent
        ]
    );
    assert_eq!(
        names(&program, &program.instructions[2].operands[1]),
        vec!["@title", "@size"]
    );
    assert_eq!(
        opcodes(&program.blocks[0].instructions),
        vec![OpCode::PushConstant, OpCode::ComponentAttr, OpCode::AttrSplat]
    );
    assert_eq!(
        program.instructions[4].operands,
        vec![Operand::Handle(2), Operand::Count(0)]
    );
}

#[test]
fn test_dynamic_component_pushes_definition() {
    let program = lower_ok(&template(
        vec![Statement::DynamicComponent {
            head: Expression::GetSymbol(1).path(vec![]),
            attrs: vec![],
            args: None,
            blocks: None,
        }],
        &["@component"],
        &[],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::GetVariable,
            OpCode::PushArgs,
            OpCode::InvokeDynamicComponent
        ]
    );
    assert!(program.blocks.is_empty());
}

#[test]
fn test_args_outside_components_are_errors() {
    let error = lower_source(&template(
        vec![Statement::DynamicArg {
            name: "@x".into(),
            value: Expression::string("y"),
        }],
        &[],
        &[],
    ))
    .unwrap_err();
    assert!(matches!(error, LowerError::Syntax(_)));
}

#[test]
fn test_yield_partial_and_debugger() {
    let program = lower_ok(&template(
        vec![
            Statement::Yield {
                to: 2,
                params: vec![Expression::GetSymbol(1).path(vec![])],
            },
            Statement::Partial {
                target: Expression::string("p"),
                eval_info: vec![1, 2],
            },
            Statement::Debugger {
                eval_info: vec![1, 2],
            },
        ],
        &["@a", "&default"],
        &[],
    ));
    assert_eq!(
        opcodes(&program.instructions),
        vec![
            OpCode::GetVariable,
            OpCode::PushArgs,
            OpCode::Yield,
            OpCode::PushConstant,
            OpCode::InvokePartial,
            OpCode::Debugger
        ]
    );
    assert_eq!(program.instructions[2].operands, vec![Operand::Symbol(2)]);
    assert_eq!(
        program.instructions[5].operands,
        vec![Operand::Symbols(vec![1, 2])]
    );
}

#[test]
fn test_out_of_range_indices() {
    let error = lower_source(&template(vec![Statement::AttrSplat(3)], &["&attrs"], &[])).unwrap_err();
    assert_eq!(
        error,
        LowerError::InvalidSymbol {
            kind: "symbol",
            index: 3
        }
    );

    let error = lower_source(&template(vec![append(free(4, FreeVarContext::Ambiguous))], &[], &[]))
        .unwrap_err();
    assert_eq!(error.to_string(), "upvar 4 is out of range");
}

#[test]
fn test_program_serializes() {
    let program = lower_ok(&template(vec![Statement::Text("hi".into())], &[], &[]));
    let json = serde_json::to_value(&program).unwrap();
    assert_eq!(json["instructions"][0]["opcode"], "Text");
    assert_eq!(json["constants"][0], "hi");
}
