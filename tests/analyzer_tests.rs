//! End-to-end scenarios: Go source in, finding lines out.

use std::path::Path;

use sqlsift::analyzer::{Analyzer, CallRegistry};
use sqlsift::ast::go_loader::parse_source;

const INJECTION: &str = "f exist sql injection";
const ASTERISK: &str = "f exist select * or select (x).*";

fn findings(source: &str) -> Vec<String> {
    let root = parse_source(source, Path::new("scenario.go")).expect("scenario should parse");
    let registry = CallRegistry::default();
    Analyzer::new(&registry)
        .analyze(&root)
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn sprintf_interpolation_flags_injection_and_select_star() {
    let found = findings(
        r#"package demo

import "fmt"

func f(db *sqlx.DB, u string) {
	var r row
	q := fmt.Sprintf("SELECT * FROM t WHERE n=%s", u)
	db.Get(&r, q)
}
"#,
    );

    assert_eq!(found.len(), 2, "got {found:?}");
    assert!(found.contains(&INJECTION.to_string()), "got {found:?}");
    assert!(found.contains(&ASTERISK.to_string()), "got {found:?}");
}

#[test]
fn parameter_bound_to_question_mark_is_clean() {
    let found = findings(
        r#"package demo

func f(db *sqlx.DB, u string) {
	var r row
	db.Get(&r, "SELECT id FROM t WHERE n=?", u)
}
"#,
    );

    assert!(found.is_empty(), "got {found:?}");
}

#[test]
fn string_concatenation_of_a_parameter_flags_injection() {
    let found = findings(
        r#"package demo

func f(db *sqlx.DB, u string) {
	var r row
	q := "SELECT id FROM t WHERE n=" + u
	db.Get(&r, q)
}
"#,
    );

    assert_eq!(found, vec![INJECTION.to_string()]);
}

#[test]
fn joined_slice_parameter_flags_injection() {
    let found = findings(
        r#"package demo

import "strings"

func f(db *sqlx.DB, cols []string) {
	var r row
	q := "SELECT " + strings.Join(cols, ",") + " FROM t"
	db.Get(&r, q)
}
"#,
    );

    assert_eq!(found, vec![INJECTION.to_string()]);
}

#[test]
fn incremental_concatenation_flags_injection() {
    let found = findings(
        r#"package demo

func f(db *sqlx.DB, u string) {
	var r row
	q := ""
	q += "SELECT 1"
	q += " WHERE n=" + u
	db.Get(&r, q)
}
"#,
    );

    assert_eq!(found, vec![INJECTION.to_string()]);
}

#[test]
fn literal_select_star_flags_only_the_asterisk() {
    let found = findings(
        r#"package demo

func f(db *sqlx.DB) {
	var r row
	db.Get(&r, "SELECT a.* FROM t a")
}
"#,
    );

    assert_eq!(found, vec![ASTERISK.to_string()]);
}

#[test]
fn queryx_inside_an_assignment_is_still_dispatched() {
    let found = findings(
        r#"package demo

func f(db *sqlx.DB, u string) {
	q := "SELECT * FROM t WHERE n=" + u
	rows, err := db.Queryx(q)
	_ = rows
	_ = err
}
"#,
    );

    assert_eq!(found.len(), 2, "got {found:?}");
    assert!(found.contains(&INJECTION.to_string()), "got {found:?}");
    assert!(found.contains(&ASTERISK.to_string()), "got {found:?}");
}

#[test]
fn in_house_db_interface_handles_are_whitelisted() {
    let found = findings(
        r#"package demo

import "fmt"

func f(db kitSql.DbInterface, name string) {
	var r row
	q := fmt.Sprintf("SELECT id FROM users WHERE name=%s", name)
	db.Get(&r, q)
}
"#,
    );

    assert_eq!(found, vec![INJECTION.to_string()]);
}

#[test]
fn field_access_on_a_parameter_is_tainted() {
    let found = findings(
        r#"package demo

func f(db *sqlx.DB, req Filter) {
	var r row
	q := "SELECT id FROM t WHERE n=" + req.Name
	db.Get(&r, q)
}
"#,
    );

    assert_eq!(found, vec![INJECTION.to_string()]);
}

#[test]
fn local_only_query_text_is_clean() {
    let found = findings(
        r#"package demo

import "fmt"

func f(db *sqlx.DB, u string) {
	var r row
	table := "t"
	q := fmt.Sprintf("SELECT id FROM %s WHERE n=?", table)
	db.Get(&r, q, u)
}
"#,
    );

    assert!(found.is_empty(), "got {found:?}");
}

#[test]
fn unmodelled_handle_methods_are_ignored() {
    let found = findings(
        r#"package demo

func f(db *sqlx.DB, u string) {
	db.NamedExec("SELECT * FROM t WHERE n=:n", u)
}
"#,
    );

    assert!(found.is_empty(), "got {found:?}");
}

#[test]
fn a_poisoned_function_stays_silent_and_the_next_recovers() {
    let found = findings(
        r#"package demo

import "fmt"

func broken(db *sqlx.DB, u string) {
	var r row
	q := fmt.Sprintf("%s", u, u)
	db.Get(&r, "SELECT * FROM t WHERE n="+u)
	_ = q
}

func g(db *sqlx.DB) {
	var r row
	db.Get(&r, "SELECT * FROM t")
}
"#,
    );

    assert_eq!(found, vec!["g exist select * or select (x).*".to_string()]);
}

#[test]
fn findings_follow_traversal_order_across_functions() {
    let found = findings(
        r#"package demo

func first(db *sqlx.DB, u string) {
	var r row
	db.Get(&r, "SELECT id FROM t WHERE n="+u)
}

func second(db *sqlx.DB) {
	var r row
	db.Get(&r, "SELECT * FROM t")
}
"#,
    );

    assert_eq!(
        found,
        vec![
            "first exist sql injection".to_string(),
            "second exist select * or select (x).*".to_string(),
        ]
    );
}

#[test]
fn conditional_branches_are_analyzed_path_insensitively() {
    // The analysis does not model control flow: an assignment inside a
    // branch overwrites the environment entry unconditionally.
    let found = findings(
        r#"package demo

func f(db *sqlx.DB, u string, filtered bool) {
	var r row
	q := "SELECT id FROM t"
	if filtered {
		q = "SELECT id FROM t WHERE n=" + u
	}
	db.Get(&r, q)
}
"#,
    );

    assert_eq!(found, vec![INJECTION.to_string()]);
}
