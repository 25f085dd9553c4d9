//! Snapshot tests of the tree dump used by `treelint dump-ast`.

use treelint_core::parse_source;

#[test]
fn dump_field_declaration() {
    let ast = parse_source("class A { int x; }", 8).expect("source should parse");
    insta::assert_snapshot!(ast.dump(), @r"
    COMPILATION_UNIT -> COMPILATION_UNIT [1:1]
    `--CLASS_DEF -> class [1:1]
        |--MODIFIERS -> MODIFIERS [1:1]
        |--IDENT -> A [1:7]
        `--OBJBLOCK -> { [1:9]
            `--VARIABLE_DEF -> VARIABLE_DEF [1:11]
                |--MODIFIERS -> MODIFIERS [1:11]
                |--TYPE -> TYPE [1:11]
                |   `--LITERAL_INT -> int [1:11]
                `--IDENT -> x [1:15]
    ");
}

#[test]
fn dump_redundant_parentheses() {
    let ast = parse_source("class A { void m() { if (a || (b ^ a) || b) {} } }", 8)
        .expect("source should parse");
    insta::assert_snapshot!(ast.dump(), @r"
    COMPILATION_UNIT -> COMPILATION_UNIT [1:1]
    `--CLASS_DEF -> class [1:1]
        |--MODIFIERS -> MODIFIERS [1:1]
        |--IDENT -> A [1:7]
        `--OBJBLOCK -> { [1:9]
            `--METHOD_DEF -> METHOD_DEF [1:11]
                |--MODIFIERS -> MODIFIERS [1:11]
                |--TYPE -> TYPE [1:11]
                |   `--LITERAL_VOID -> void [1:11]
                |--IDENT -> m [1:16]
                |--PARAMETERS -> PARAMETERS [1:18]
                `--SLIST -> { [1:20]
                    `--LITERAL_IF -> if [1:22]
                        |--EXPR -> EXPR [1:26]
                        |   `--LOR -> || [1:26]
                        |       |--LOR -> || [1:26]
                        |       |   |--IDENT -> a [1:26]
                        |       |   `--PAREN_EXPR -> ( [1:31]
                        |       |       `--BXOR -> ^ [1:32]
                        |       |           |--IDENT -> b [1:32]
                        |       |           `--IDENT -> a [1:36]
                        |       `--IDENT -> b [1:42]
                        `--SLIST -> { [1:45]
    ");
}
