//! Black-box tests against the crate's public API: parse a program, build an
//! interpreter over it, and check the output it produces against an in-memory
//! host.

use brewin_interpreter::{Interpreter, RecordingHost};
use brewin_parser::parse_program;

fn run(src: &str, input: Vec<&str>) -> Result<Vec<String>, String> {
    let program = parse_program(src)?;
    let host = RecordingHost::with_input(input.into_iter().map(String::from));
    let mut interp = Interpreter::new(&program, host).map_err(|e| e.to_string())?;
    interp.run().map_err(|e| e.to_string())?;
    Ok(interp.host().output.clone())
}

#[test]
fn structs_passed_by_reference_are_mutated_through_aliases() {
    let out = run(
        r#"
        struct counter { n: int }
        func increment(c: counter): void {
          c.n = c.n + 1;
        }
        func main(): void {
          var c: counter;
          c = new counter;
          increment(c);
          increment(c);
          print(c.n);
        }
        "#,
        vec![],
    )
    .unwrap();
    assert_eq!(out, vec!["2"]);
}

#[test]
fn inputi_reads_and_parses_an_integer() {
    let out = run(
        r#"
        func main(): void {
          var x: int;
          x = inputi();
          print(x + 1);
        }
        "#,
        vec!["41"],
    )
    .unwrap();
    assert_eq!(out, vec!["42"]);
}

#[test]
fn inputi_rejects_more_than_one_argument() {
    let err = run(
        r#"
        func main(): void {
          print(inputi("a", "b"));
        }
        "#,
        vec!["1"],
    )
    .unwrap_err();
    assert!(err.contains("NAME_ERROR"));
}

#[test]
fn function_overloaded_by_arity() {
    let out = run(
        r#"
        func greet(): void {
          print("hello");
        }
        func greet(name: string): void {
          print("hello, " + name);
        }
        func main(): void {
          greet();
          greet("brewin");
        }
        "#,
        vec![],
    )
    .unwrap();
    assert_eq!(out, vec!["hello", "hello, brewin"]);
}

#[test]
fn undeclared_variable_is_a_name_error() {
    let err = run(
        r#"
        func main(): void {
          print(missing);
        }
        "#,
        vec![],
    )
    .unwrap_err();
    assert!(err.contains("NAME_ERROR"));
}
