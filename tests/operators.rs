mod common;

use common::run;

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(run("print 1 + 2 * 3;"), "7\n");
    assert_eq!(run("print (1 + 2) * 3;"), "9\n");
    assert_eq!(run("print 10 - 4 / 2;"), "8\n");
    assert_eq!(run("print -2 * 3;"), "-6\n");
    assert_eq!(run("print --1;"), "1\n");
}

#[test]
fn integral_numbers_print_without_a_decimal_point() {
    assert_eq!(run("print 15;"), "15\n");
    assert_eq!(run("print 2.5;"), "2.5\n");
    assert_eq!(run("print 1 / 3;"), "0.3333333333333333\n");
    assert_eq!(run("print 0 - 0.0;"), "0\n");
}

#[test]
fn comparisons_work_on_numbers() {
    assert_eq!(run("print 1 < 2;"), "true\n");
    assert_eq!(run("print 2 <= 2;"), "true\n");
    assert_eq!(run("print 1 > 2;"), "false\n");
    assert_eq!(run("print 2 >= 3;"), "false\n");
}

#[test]
fn equality_is_by_value_for_primitives() {
    assert_eq!(run("print 1 == 1;"), "true\n");
    assert_eq!(run("print 1 == 2;"), "false\n");
    assert_eq!(run("print 1 != 2;"), "true\n");
    assert_eq!(run("print nil == nil;"), "true\n");
    assert_eq!(run("print true == false;"), "false\n");
    assert_eq!(run("print 1 == \"1\";"), "false\n");
    assert_eq!(run("print nil == false;"), "false\n");
}

#[test]
fn interned_strings_compare_by_content() {
    assert_eq!(run("print \"str\" == \"str\";"), "true\n");
    assert_eq!(run("print \"str\" == \"stru\";"), "false\n");
    assert_eq!(run("print \"ab\" == \"a\" + \"b\";"), "true\n");
}

#[test]
fn strings_concatenate() {
    assert_eq!(run("print \"foo\" + \"bar\";"), "foobar\n");
    assert_eq!(run("var s = \"a\"; s = s + s; s = s + s; print s;"), "aaaa\n");
}

#[test]
fn not_uses_falsiness() {
    assert_eq!(run("print !nil;"), "true\n");
    assert_eq!(run("print !false;"), "true\n");
    assert_eq!(run("print !0;"), "false\n");
    assert_eq!(run("print !\"\";"), "false\n");
    assert_eq!(run("print !!nil;"), "false\n");
}

#[test]
fn print_renders_every_kind_of_value() {
    assert_eq!(run("print nil;"), "nil\n");
    assert_eq!(run("print true;"), "true\n");
    assert_eq!(run("print \"raw\nbytes\";"), "raw\nbytes\n");
    assert_eq!(run("fun f() {} print f;"), "<fn f>\n");
    assert_eq!(run("print clock;"), "<native fn>\n");
    assert_eq!(run("class C {} print C;"), "C\n");
    assert_eq!(run("class C {} print C();"), "C instance\n");
    assert_eq!(run("class C { m() {} } print C().m;"), "<fn m>\n");
}
