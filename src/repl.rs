use crate::Interpreter;
use crate::value::Value;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Check if the input has unbalanced brackets, suggesting more input is
/// needed.
fn has_open_brackets(input: &str) -> bool {
    let mut depth_paren = 0i32;
    let mut depth_bracket = 0i32;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut prev = '\0';

    for ch in input.chars() {
        if in_single_quote {
            if ch == '\'' && prev != '\\' {
                in_single_quote = false;
            }
            prev = ch;
            continue;
        }
        if in_double_quote {
            if ch == '"' && prev != '\\' {
                in_double_quote = false;
            }
            prev = ch;
            continue;
        }
        match ch {
            '\'' => in_single_quote = true,
            '"' => in_double_quote = true,
            '(' => depth_paren += 1,
            ')' => depth_paren -= 1,
            '[' => depth_bracket += 1,
            ']' => depth_bracket -= 1,
            '#' => break,
            _ => {}
        }
        prev = ch;
    }

    depth_paren > 0 || depth_bracket > 0
}

/// More input is needed when brackets are open, when the line opens a block
/// with a trailing ':', or while inside a block that has not yet been closed
/// by a blank line.
fn is_incomplete(accumulated: &str, last_line: &str) -> bool {
    if has_open_brackets(accumulated) {
        return true;
    }
    let trimmed = accumulated.trim_end();
    if trimmed.ends_with(':') {
        return true;
    }
    // An input that opened a block stays open until a blank line closes it.
    let first_line = accumulated.lines().next().unwrap_or("");
    first_line.trim_end().ends_with(':') && !last_line.trim().is_empty()
}

/// Result of processing a single REPL line.
enum LineResult {
    /// Need more input (incomplete block or expression).
    Continue,
    /// Line was processed (output may have been produced).
    Done,
}

/// Process a single line of REPL input. Returns the display string (if any)
/// and whether more input is needed.
///
/// This function is the testable core of the REPL loop; it has no I/O
/// dependencies beyond the `Interpreter`.
fn process_line(
    interpreter: &mut Interpreter,
    accumulated: &mut String,
    line: &str,
) -> (LineResult, Option<String>) {
    if accumulated.is_empty() {
        *accumulated = line.to_string();
    } else {
        accumulated.push('\n');
        accumulated.push_str(line);
    }

    if accumulated.trim().is_empty() {
        accumulated.clear();
        return (LineResult::Done, None);
    }

    if is_incomplete(accumulated, line) {
        return (LineResult::Continue, None);
    }

    interpreter.clear_output();
    interpreter.last_value = None;
    let display = match interpreter.run(accumulated) {
        Ok(_) => {
            let output = interpreter.output().to_string();
            if !output.is_empty() {
                Some(output)
            } else {
                match interpreter.last_value.take() {
                    Some(Value::None) | None => None,
                    Some(value) => Some(format!("{}\n", value.repr_value())),
                }
            }
        }
        Err(err) => Some(format!("{}\n", err)),
    };
    accumulated.clear();
    (LineResult::Done, display)
}

pub fn run_repl() {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("failed to initialize line editor: {}", err);
            return;
        }
    };
    let mut interpreter = Interpreter::new();
    let mut accumulated = String::new();

    loop {
        let prompt = if accumulated.is_empty() {
            ">>> "
        } else {
            "... "
        };
        match editor.readline(prompt) {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                let (result, display) = process_line(&mut interpreter, &mut accumulated, &line);
                if let Some(text) = display {
                    print!("{}", text);
                }
                if matches!(result, LineResult::Continue) {
                    continue;
                }
            }
            Err(ReadlineError::Interrupted) => {
                accumulated.clear();
                println!("KeyboardInterrupt");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {}", err);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LineResult, process_line};
    use crate::Interpreter;

    #[test]
    fn single_expression_echoes_repr() {
        let mut interp = Interpreter::new();
        let mut acc = String::new();
        let (_, display) = process_line(&mut interp, &mut acc, "1 + 2");
        assert_eq!(display.as_deref(), Some("3\n"));
    }

    #[test]
    fn block_waits_for_blank_line() {
        let mut interp = Interpreter::new();
        let mut acc = String::new();
        let (result, _) = process_line(&mut interp, &mut acc, "if True:");
        assert!(matches!(result, LineResult::Continue));
        let (result, _) = process_line(&mut interp, &mut acc, "    print('hi')");
        assert!(matches!(result, LineResult::Continue));
        let (_, display) = process_line(&mut interp, &mut acc, "");
        assert_eq!(display.as_deref(), Some("hi\n"));
    }

    #[test]
    fn open_bracket_continues() {
        let mut interp = Interpreter::new();
        let mut acc = String::new();
        let (result, _) = process_line(&mut interp, &mut acc, "t = (1,");
        assert!(matches!(result, LineResult::Continue));
        let (result, display) = process_line(&mut interp, &mut acc, "2)");
        assert!(matches!(result, LineResult::Done));
        assert!(display.is_none());
    }

    #[test]
    fn error_is_displayed_with_exception_type() {
        let mut interp = Interpreter::new();
        let mut acc = String::new();
        let (_, display) = process_line(&mut interp, &mut acc, "nope");
        assert_eq!(
            display.as_deref(),
            Some("NameError: name 'nope' is not defined\n")
        );
    }
}
