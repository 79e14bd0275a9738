//! End-to-end tests: parse a whole program, run it against an in-memory host,
//! and check its output or the error it raises.

use brewin_parser::parse_program;

use crate::host::RecordingHost;
use crate::Interpreter;

fn run(src: &str) -> Result<Vec<String>, String> {
    let program = parse_program(src)?;
    let mut interp = Interpreter::new(&program, RecordingHost::default()).map_err(|e| e.to_string())?;
    interp.run().map_err(|e| e.to_string())?;
    Ok(interp.host().output.clone())
}

#[test]
fn recursive_factorial() {
    let out = run(
        r#"
        func fact(n: int): int {
          if (n <= 1) { return 1; }
          return n * fact(n - 1);
        }
        func main(): void {
          print(fact(5));
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["120"]);
}

#[test]
fn struct_identity_vs_field_equality() {
    let out = run(
        r#"
        struct point { x: int }
        func main(): void {
          var a: point;
          var b: point;
          a = new point;
          b = new point;
          a.x = 5;
          b.x = 5;
          print(a == b);
          print(a == a);
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["false", "true"]);
}

#[test]
fn lazy_argument_skips_crashing_second_arg() {
    let out = run(
        r#"
        func pick_first(a: int, b: int): int {
          return a;
        }
        func main(): void {
          print(pick_first(42, 10 / 0));
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["42"]);
}

#[test]
fn argument_is_forced_at_most_once() {
    let out = run(
        r#"
        func side_effect(): int {
          print("computed");
          return 5;
        }
        func use_twice(x: int): int {
          return x + x;
        }
        func main(): void {
          print(use_twice(side_effect()));
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["computed", "10"]);
}

#[test]
fn try_catch_catches_raised_tag() {
    let out = run(
        r#"
        func main(): void {
          try {
            raise "oops";
            print("unreachable");
          } catch "oops" {
            print("caught");
          }
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["caught"]);
}

#[test]
fn division_by_zero_is_catchable() {
    let out = run(
        r#"
        func main(): void {
          try {
            print(1 / 0);
          } catch "div0" {
            print("saved");
          }
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["saved"]);
}

#[test]
fn nil_field_dereference_is_a_fault_error() {
    let err = run(
        r#"
        struct point { x: int }
        func main(): void {
          var p: point;
          print(p.x);
        }
        "#,
    )
    .unwrap_err();
    assert!(err.contains("FAULT_ERROR"));
}

#[test]
fn uncaught_raise_escaping_main_is_fatal() {
    let err = run(
        r#"
        func main(): void {
          raise "boom";
        }
        "#,
    )
    .unwrap_err();
    assert!(err.contains("FAULT_ERROR"));
    assert!(err.contains("boom"));
}

#[test]
fn for_loop_scopes_a_fresh_variable_per_iteration() {
    let out = run(
        r#"
        func main(): void {
          var i: int;
          for (i = 0; i < 3; i = i + 1) {
            var doubled: int;
            doubled = i * 2;
            print(doubled);
          }
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["0", "2", "4"]);
}

#[test]
fn int_bool_coercion_in_condition_and_equality() {
    let out = run(
        r#"
        func main(): void {
          if (1) {
            print("truthy");
          }
          print(1 == true);
        }
        "#,
    )
    .unwrap();
    assert_eq!(out, vec!["truthy", "true"]);
}
