//! Wire format compatibility tests
//!
//! Each test compiles a template AST and compares it against the same
//! template written with the literal builder. Most comparisons go through
//! the debugger; the upvar numbering tests compare raw blocks.

use serde_json::{Value, json};
use trellis_compiler::ast::build as b;
use trellis_compiler::ast::{AttrValue, MustacheStatement, Statement};
use trellis_compiler::builder::literal::*;
use trellis_compiler::builder::{BlockDefinition, TemplateBuilder, ToExpression};
use trellis_compiler::{
    CompileError, CompileOptions, ProgramSymbols, WireFormatDebugger, c, compile, s,
};
use trellis_wire::SerializedTemplateBlock;

// ============================================================================
// Helpers
// ============================================================================

fn compiled(body: Vec<Statement>) -> Value {
    let block = compile(&b::template(body), &CompileOptions::default())
        .expect("Compilation should succeed");
    WireFormatDebugger::new(&block).format()
}

fn built(statements: Vec<BuilderStatement>) -> Value {
    let mut symbols = ProgramSymbols::new();
    let statements =
        build_statements(&statements, &mut symbols).expect("Literal should build");
    let block = SerializedTemplateBlock {
        statements,
        symbols: symbols.to_symbols(),
        has_eval: false,
        upvars: symbols.to_upvars(),
    };
    WireFormatDebugger::new(&block).format()
}

fn assert_equivalent(body: Vec<Statement>, expected: Vec<BuilderStatement>) {
    assert_eq!(compiled(body), built(expected));
}

// ============================================================================
// Content
// ============================================================================

#[test]
fn test_html_text_content() {
    assert_equivalent(vec![b::text("content")], vec![s!("content")]);
}

#[test]
fn test_html_comments() {
    assert_equivalent(
        vec![b::element("div").children(vec![b::comment(" Hi ")]).into()],
        vec![element("<div>", vec![], vec![c!(" Hi ")])],
    );
}

#[test]
fn test_mustache_comments_are_dropped() {
    assert_equivalent(vec![b::mustache_comment("gone"), b::text("x")], vec![s!("x")]);
}

#[test]
fn test_text_curlies() {
    assert_equivalent(
        vec![
            b::element("div")
                .children(vec![
                    b::mustache("title"),
                    b::element("span").children(vec![b::mustache("title")]).into(),
                ])
                .into(),
        ],
        vec![element(
            "<div>",
            vec![],
            vec!["^title".into(), element("<span>", vec![], vec!["^title".into()])],
        )],
    );
}

#[test]
fn test_paths_on_this_and_args() {
    assert_equivalent(
        vec![b::mustache("this.name"), b::mustache("@arg.x"), b::mustache("model.foo")],
        vec!["this.name".into(), "@arg.x".into(), "^model.foo".into()],
    );
}

#[test]
fn test_triple_curlies() {
    assert_equivalent(
        vec![b::triple(b::path("html"), vec![], b::hash(vec![]))],
        vec![trusted("^html")],
    );
}

#[test]
fn test_helpers_with_params() {
    assert_equivalent(
        vec![b::mustache_with(
            b::path("testing"),
            vec![b::path("title"), b::string("b"), b::number(123.0), b::boolean(true)],
            b::hash(vec![]),
        )],
        vec![append(call(
            "^testing",
            vec!["^title".into(), lit("b"), 123.0.into(), true.into()],
            vec![],
        ))],
    );
}

#[test]
fn test_sub_expressions_in_hash() {
    assert_equivalent(
        vec![b::mustache_with(
            b::path("foo"),
            vec![],
            b::hash(vec![(
                "key",
                b::sexpr(b::path("bar"), vec![b::path("baz")], b::hash(vec![])),
            )]),
        )],
        vec![append(call(
            "^foo",
            vec![],
            vec![("key", call("^bar", vec!["^baz".into()], vec![]))],
        ))],
    );
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_static_and_dynamic_attributes() {
    assert_equivalent(
        vec![
            b::element("div")
                .attr("class", b::text_value("foo"))
                .attr("id", b::mustache_value("bar"))
                .attr("disabled", b::text_value(""))
                .into(),
        ],
        vec![element(
            "<div>",
            vec![
                ("class", text_attr("foo")),
                ("id", attr("^bar")),
                ("disabled", BuilderAttr::Boolean(true)),
            ],
            vec![],
        )],
    );
}

#[test]
fn test_type_attribute_is_emitted_last() {
    assert_equivalent(
        vec![
            b::element("input")
                .attr("type", b::text_value("text"))
                .attr("value", b::mustache_value("v"))
                .into(),
        ],
        vec![element(
            "<input>",
            vec![("type", text_attr("text")), ("value", attr("^v"))],
            vec![],
        )],
    );
    let value = compiled(vec![
        b::element("input")
            .attr("type", b::text_value("text"))
            .attr("value", b::mustache_value("v"))
            .into(),
    ]);
    assert_eq!(value[2][1], json!("type"));
}

#[test]
fn test_concat_attributes() {
    assert_equivalent(
        vec![
            b::element("a")
                .attr(
                    "href",
                    b::concat(vec![
                        b::concat_text("http://"),
                        b::concat_mustache(b::mustache_node(
                            b::path("testing"),
                            vec![b::number(123.0)],
                            b::hash(vec![]),
                        )),
                        b::concat_text("/"),
                        b::concat_mustache(b::mustache_node(
                            b::path("url"),
                            vec![],
                            b::hash(vec![]),
                        )),
                    ]),
                )
                .into(),
        ],
        vec![element(
            "<a>",
            vec![(
                "href",
                BuilderAttr::Value(concat(vec![
                    lit("http://"),
                    call("^testing", vec![123.0.into()], vec![]),
                    lit("/"),
                    "^url".into(),
                ])),
            )],
            vec![],
        )],
    );
}

#[test]
fn test_namespaced_attributes() {
    assert_equivalent(
        vec![
            b::element("svg")
                .attr("xlink:title", b::text_value("svg-title"))
                .attr("xmlns", b::text_value("http://www.w3.org/2000/svg"))
                .into(),
        ],
        vec![element(
            "<svg>",
            vec![
                ("xlink:title", text_attr("svg-title")),
                ("xmlns", text_attr("http://www.w3.org/2000/svg")),
            ],
            vec![],
        )],
    );
    let value = compiled(vec![
        b::element("svg")
            .attr("xlink:title", b::text_value("svg-title"))
            .into(),
    ]);
    assert_eq!(
        value[1],
        json!(["static-attr", "xlink:title", "svg-title", "http://www.w3.org/1999/xlink"])
    );
}

#[test]
fn test_trusting_attribute() {
    let unescaped = MustacheStatement {
        escaped: false,
        ..b::mustache_node(b::path("html"), vec![], b::hash(vec![]))
    };
    assert_equivalent(
        vec![
            b::element("div")
                .attr("title", AttrValue::Mustache(unescaped))
                .into(),
        ],
        vec![element(
            "<div>",
            vec![("title", BuilderAttr::Trusted("^html".into()))],
            vec![],
        )],
    );
}

#[test]
fn test_splat_and_modifier_use_component_encoding() {
    assert_equivalent(
        vec![
            b::element("button")
                .attr("class", b::text_value("btn"))
                .splat()
                .modifier(
                    b::path("on"),
                    vec![b::string("click"), b::path("go")],
                    b::hash(vec![]),
                )
                .into(),
        ],
        vec![element(
            "<button>",
            vec![
                ("class", text_attr("btn")),
                ("...attributes", BuilderAttr::Splat),
                (
                    "^on",
                    BuilderAttr::Modifier {
                        params: vec![lit("click"), "^go".into()],
                        hash: vec![],
                    },
                ),
            ],
            vec![],
        )],
    );
}

#[test]
fn test_select_with_dynamic_value() {
    assert_equivalent(
        vec![
            b::element("select")
                .children(vec![
                    b::element("option")
                        .attr("selected", b::mustache_value("isSelected"))
                        .children(vec![b::text("One")])
                        .into(),
                ])
                .into(),
        ],
        vec![element(
            "<select>",
            vec![],
            vec![element(
                "<option>",
                vec![("selected", attr("^isSelected"))],
                vec![s!("One")],
            )],
        )],
    );
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_each_with_else() {
    assert_equivalent(
        vec![b::block(
            b::path("each"),
            vec![b::path("people")],
            b::hash(vec![("key", b::string("id"))]),
            b::program_with_params(&["p"], vec![b::mustache("p.name")]),
            Some(b::program(vec![b::text("none")])),
        )],
        vec![block(
            "#^each",
            vec!["^people".into()],
            vec![("key", lit("id"))],
            vec![
                ("default", body_as(&["p"], vec!["p.name".into()])),
                ("else", body(vec![s!("none")])),
            ],
        )],
    );
}

#[test]
fn test_nested_block_params_shadow_outer() {
    assert_equivalent(
        vec![b::block(
            b::path("each"),
            vec![b::path("rows")],
            b::hash(vec![]),
            b::program_with_params(
                &["row"],
                vec![b::block(
                    b::path("each"),
                    vec![b::path("row.cells")],
                    b::hash(vec![]),
                    b::program_with_params(&["cell"], vec![b::mustache("cell"), b::mustache("row.id")]),
                    None,
                )],
            ),
            None,
        )],
        vec![block(
            "#^each",
            vec!["^rows".into()],
            vec![],
            vec![(
                "default",
                body_as(
                    &["row"],
                    vec![block(
                        "#^each",
                        vec!["row.cells".into()],
                        vec![],
                        vec![("default", body_as(&["cell"], vec!["cell".into(), "row.id".into()]))],
                    )],
                ),
            )],
        )],
    );
}

#[test]
fn test_yield_and_has_block() {
    assert_equivalent(
        vec![
            b::mustache_with(
                b::path("yield"),
                vec![b::path("title")],
                b::hash(vec![("to", b::string("inverse"))]),
            ),
            b::mustache_with(
                b::path("if"),
                vec![
                    b::sexpr(b::path("has-block"), vec![b::string("inverse")], b::hash(vec![])),
                    b::string("y"),
                ],
                b::hash(vec![]),
            ),
        ],
        vec![
            BuilderStatement::Yield {
                to: "inverse".into(),
                params: vec!["^title".into()],
            },
            append(call(
                "^if",
                vec![BuilderExpression::HasBlock("inverse".into()), lit("y")],
                vec![],
            )),
        ],
    );
}

// ============================================================================
// Components
// ============================================================================

#[test]
fn test_component_with_args_attrs_and_modifiers() {
    assert_equivalent(
        vec![
            b::element("Foo")
                .attr("@title", b::mustache_value("t"))
                .attr("class", b::text_value("x"))
                .splat()
                .modifier(b::path("on"), vec![b::string("click"), b::path("f")], b::hash(vec![]))
                .children(vec![b::text("Hi")])
                .into(),
        ],
        vec![element(
            "<Foo>",
            vec![
                ("@title", attr("^t")),
                ("class", text_attr("x")),
                ("...attributes", BuilderAttr::Splat),
                (
                    "^on",
                    BuilderAttr::Modifier {
                        params: vec![lit("click"), "^f".into()],
                        hash: vec![],
                    },
                ),
            ],
            vec![s!("Hi")],
        )],
    );
}

#[test]
fn test_component_named_blocks() {
    assert_equivalent(
        vec![
            b::element("Foo")
                .children(vec![
                    b::text("\n"),
                    b::element(":header")
                        .block_params(&["h"])
                        .children(vec![b::mustache("h")])
                        .into(),
                    b::element(":body").children(vec![b::text("b")]).into(),
                ])
                .into(),
        ],
        vec![element(
            "<Foo>",
            vec![],
            vec![
                s!("{NEWLINE}"),
                element_as("<:header>", vec![], &["h"], vec!["h".into()]),
                element("<:body>", vec![], vec![s!("b")]),
            ],
        )],
    );
}

#[test]
fn test_component_block_params() {
    assert_equivalent(
        vec![
            b::element("Foo")
                .block_params(&["item"])
                .children(vec![b::mustache("item.label")])
                .into(),
        ],
        vec![element_as("<Foo>", vec![], &["item"], vec!["item.label".into()])],
    );
}

#[test]
fn test_dynamic_components() {
    assert_equivalent(
        vec![
            b::element("@content").into(),
            b::block(
                b::path("let"),
                vec![b::path("x")],
                b::hash(vec![]),
                b::program_with_params(
                    &["item"],
                    vec![
                        b::element("item.view")
                            .attr("@a", b::mustache_value("item"))
                            .into(),
                    ],
                ),
                None,
            ),
        ],
        vec![
            element("<@content>", vec![], vec![]),
            block(
                "#^let",
                vec!["^x".into()],
                vec![],
                vec![(
                    "default",
                    body_as(&["item"], vec![element("<item.view>", vec![("@a", attr("item"))], vec![])]),
                )],
            ),
        ],
    );
}

// ============================================================================
// Programmatic builder
// ============================================================================

#[test]
fn test_template_builder_matches_compiler() {
    let mut tb = TemplateBuilder::new();
    tb.element("div", |b| {
        b.block(
            "each",
            BlockDefinition::new(|b| {
                let name = b.get_local("p", "name");
                b.append(name, false);
            })
            .params(vec![b.get_free("people", "")])
            .locals(&["p"]),
        );
    });
    let block = tb.to_block().unwrap();

    let expected = compiled(vec![
        b::element("div")
            .children(vec![b::block(
                b::path("each"),
                vec![b::path("people")],
                b::hash(vec![]),
                b::program_with_params(&["p"], vec![b::mustache("p.name")]),
                None,
            )])
            .into(),
    ]);
    assert_eq!(WireFormatDebugger::new(&block).format(), expected);
}

fn each_people() -> SerializedTemplateBlock {
    compile(
        &b::template(vec![
            b::element("div")
                .children(vec![b::block(
                    b::path("each"),
                    vec![b::path("people")],
                    b::hash(vec![]),
                    b::program_with_params(
                        &["p"],
                        vec![
                            b::element("span")
                                .children(vec![b::mustache("p.handle")])
                                .into(),
                        ],
                    ),
                    None,
                )])
                .into(),
        ]),
        &CompileOptions::default(),
    )
    .expect("Compilation should succeed")
}

#[test]
fn test_template_builder_numbers_block_upvars_like_compiler() {
    let mut tb = TemplateBuilder::new();
    tb.element("div", |b| {
        b.block(
            "each",
            BlockDefinition::new(|b| {
                b.element("span", |b| {
                    let handle = b.get_local("p", "handle");
                    b.append(handle, false);
                });
            })
            .params(vec![b.get_free("people", "")])
            .locals(&["p"]),
        );
    });
    let block = tb.to_block().unwrap();

    let expected = each_people();
    assert_eq!(expected.upvars, vec!["people", "each"]);
    assert_eq!(block.upvars, expected.upvars);
    assert_eq!(block, expected);
}

#[test]
fn test_literal_numbers_block_upvars_like_compiler() {
    let mut symbols = ProgramSymbols::new();
    build_statements(
        &[block(
            "#^each",
            vec!["^people".into()],
            vec![],
            vec![("default", body_as(&["p"], vec!["p.handle".into()]))],
        )],
        &mut symbols,
    )
    .expect("Literal should build");

    assert_eq!(symbols.to_upvars(), each_people().upvars);
}

#[test]
fn test_template_builder_element_attributes() {
    let mut tb = TemplateBuilder::new();
    tb.element_with(
        "div",
        |t| {
            t.attr("class", "box").attr(
                "title",
                ToExpression::Free {
                    head: "t".into(),
                    tail: vec![],
                },
            );
        },
        |b| {
            let name = b.get_arg("name", "");
            b.append(name, false);
        },
    );
    let block = tb.to_block().unwrap();

    let expected = compiled(vec![
        b::element("div")
            .attr("class", b::text_value("box"))
            .attr("title", b::mustache_value("t"))
            .children(vec![b::mustache("@name")])
            .into(),
    ]);
    assert_eq!(WireFormatDebugger::new(&block).format(), expected);
}

#[test]
fn test_template_builder_keeps_first_error() {
    let mut tb = TemplateBuilder::new();
    let missing = tb.get_local("missing", "");
    tb.append(missing, false).text("after");
    let error = tb.to_block().unwrap_err();
    assert!(matches!(error, CompileError::UnresolvedLocal(name) if name == "missing"));
}

#[test]
fn test_template_builder_duplicate_blocks() {
    let mut tb = TemplateBuilder::new();
    tb.block(
        "if",
        BlockDefinition::new(|b| {
            b.text("a");
        })
        .block("default", |b| {
            b.text("b");
        }),
    );
    let error = tb.to_block().unwrap_err();
    assert!(matches!(error, CompileError::DuplicateBlock(name) if name == "default"));
}

// ============================================================================
// Debugger output
// ============================================================================

#[test]
fn test_debugger_output_for_each() {
    let value = compiled(vec![b::block(
        b::path("each"),
        vec![b::path("items")],
        b::hash(vec![]),
        b::program_with_params(&["item"], vec![b::mustache("item.name")]),
        None,
    )]);
    assert_eq!(
        value,
        json!([[
            "block",
            ["get-path", ["get-contextual-free", "each", "block"], []],
            [["get-path", ["get-contextual-free", "items", "expression"], []]],
            null,
            [[
                "default",
                {
                    "parameters": ["item"],
                    "statements": [[
                        "append",
                        ["get-path", ["get-symbol", "item"], ["name"]],
                        false
                    ]]
                }
            ]]
        ]])
    );
}
