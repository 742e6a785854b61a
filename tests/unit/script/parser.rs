use super::*;
use crate::script::ast::Expr;

#[test]
fn parses_arithmetic_precedence() {
    let page = parse_page("let x = 1 + 2 * 3;").unwrap();
    match &page.top_level[0] {
        Stmt::Let {
            value: Expr::Binary {
                op: BinaryOp::Add,
                right,
                ..
            },
            ..
        } => assert!(matches!(
            **right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        )),
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn parses_functions_and_control_flow() {
    let src = r#"
        fn draw(a, b) {
            if (a < b) { fill_rect(0, 0, 10, 10, 0xFF0000); }
            else if (a == b) { return; }
            else { let i = 0; while (i < 3) { i = i + 1; } }
            return a;
        }
    "#;
    let page = parse_page(src).unwrap();
    assert_eq!(page.functions.len(), 1);
    let f = &page.functions[0];
    assert_eq!(f.name, "draw");
    assert_eq!(f.params, vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(f.body.len(), 2);
    assert!(matches!(f.body[1], Stmt::Return(Some(Expr::Var(_)))));
}

#[test]
fn parses_index_assignment_and_lists() {
    let page = parse_page("let xs = [1, [2, 3]]; xs[1] = \"a\";").unwrap();
    assert!(matches!(page.top_level[1], Stmt::AssignIndex { .. }));
    assert!(parse_page("f() = 1;").is_err());
}

#[test]
fn rejects_nested_function_declarations() {
    let err = parse_page("fn a() { fn b() {} }").unwrap_err();
    assert!(err.message.contains("page level"));
}

#[test]
fn rejects_pathological_nesting() {
    let src = format!("let x = {}1{};", "(".repeat(400), ")".repeat(400));
    let err = parse_page(&src).unwrap_err();
    assert!(err.message.contains("nesting"));

    let src = format!("let x = {}1;", "-".repeat(400));
    assert!(parse_page(&src).is_err());
}

#[test]
fn reports_position_of_missing_semicolon() {
    let src = "let a = 1;\nlet b = 2\n";
    let err = parse_page(src).unwrap_err();
    assert_eq!(err.line_col(src), (3, 1));
}

#[test]
fn link_rejects_duplicate_functions_across_pages() {
    let a = parse_page("fn draw() {}").unwrap();
    let b = parse_page("fn draw() {}").unwrap();
    let err = link_pages(vec![("a".into(), a), ("b".into(), b)]).unwrap_err();
    assert!(err.contains("draw"));

    let a = parse_page("let g = 1; fn init() {}").unwrap();
    let b = parse_page("let h = 2; fn draw() {}").unwrap();
    let program = link_pages(vec![("a".into(), a), ("b".into(), b)]).unwrap();
    assert_eq!(program.functions.len(), 2);
    assert_eq!(program.top_level.len(), 2);
}
