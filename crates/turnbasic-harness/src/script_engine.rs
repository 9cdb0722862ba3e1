#![forbid(unsafe_code)]

//! Deterministic line-numbered engine.
//!
//! [`ScriptEngine`] understands just enough BASIC to drive a session through
//! every state the driver handles. Each call to `continue_evaluating` runs
//! exactly one statement, so tests can count turns.
//!
//! | Form                         | Behaviour                                       |
//! |------------------------------|-------------------------------------------------|
//! | `PRINT a; b; ...`            | prints integers, strings and `+` sums; a trailing `;` keeps the line open |
//! | `INPUT ["prompt";] V` / `V$` | awaits a value; REENTER on a bad number, EXTRA IGNORED after a comma |
//! | `LET V = e` / `V = e`        | assignment                                      |
//! | `GOTO n`, `END`, `REM ...`   | control flow                                    |
//! | `TRACE`, `NOTRACE`           | toggle `#n` line tracing                        |
//! | `RUN`, `LIST`, `NEW`         | immediate commands                              |
//!
//! Statements start executing inside `start_evaluating`, so an immediate
//! `PRINT` finishes before the driver's first turn. Errors are reported as
//! `?SYNTAX ERROR IN 10` followed by the offending statement on a second
//! line.

use core::fmt;
use std::collections::{BTreeMap, HashMap};

use turnbasic_core::{Engine, EngineOptions, ExecutionState, OutputEvent, OutputQueue};

/// A variable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer value of a plain variable.
    Number(i64),
    /// Value of a `$` variable.
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Immediate,
    Line(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Jump(u64),
    Await,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScriptError {
    message: &'static str,
    context: Option<String>,
}

impl ScriptError {
    fn syntax(statement: &str) -> Self {
        Self {
            message: "?SYNTAX ERROR",
            context: Some(statement.to_string()),
        }
    }

    const fn bare(message: &'static str) -> Self {
        Self {
            message,
            context: None,
        }
    }
}

/// Deterministic engine for tests and benchmarks.
#[derive(Debug, Default)]
pub struct ScriptEngine {
    program: BTreeMap<u64, String>,
    vars: HashMap<String, Value>,
    state: ExecutionState,
    output: OutputQueue,
    error: Option<String>,
    immediate: String,
    position: Option<Position>,
    input: Option<String>,
    options: EngineOptions,
    tracing: bool,
    seed: Option<u64>,
    statements: u64,
}

impl ScriptEngine {
    /// Create an engine with an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored program lines by number.
    #[must_use]
    pub fn program(&self) -> &BTreeMap<u64, String> {
        &self.program
    }

    /// Current value of a variable. Names are case-insensitive.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.vars.get(&name.to_ascii_uppercase())
    }

    /// Seed passed by the driver, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Options passed by the driver.
    #[must_use]
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Total statements executed.
    #[must_use]
    pub fn statements_executed(&self) -> u64 {
        self.statements
    }

    // --- Execution ---

    fn run_next_statement(&mut self) {
        self.state = ExecutionState::Running;
        let Some(position) = self.position else {
            self.return_to_idle();
            return;
        };
        let (line, text) = match position {
            Position::Immediate => (None, self.immediate.clone()),
            Position::Line(number) => match self.program.get(&number) {
                Some(text) => (Some(number), text.clone()),
                None => {
                    self.return_to_idle();
                    return;
                }
            },
        };

        if self.tracing
            && self.input.is_none()
            && let Some(number) = line
        {
            self.output.push(OutputEvent::trace(number));
        }
        self.statements += 1;

        match self.execute(&text, line) {
            Ok(Flow::Next) => {
                self.position = match position {
                    Position::Immediate => None,
                    Position::Line(number) => self.line_after(number).map(Position::Line),
                };
                if self.position.is_none() {
                    self.return_to_idle();
                }
            }
            Ok(Flow::Jump(target)) => {
                if self.program.contains_key(&target) {
                    self.position = Some(Position::Line(target));
                } else {
                    self.fail(ScriptError::bare("?UNDEF'D STATEMENT ERROR"), line);
                }
            }
            Ok(Flow::Await) => self.state = ExecutionState::AwaitingInput,
            Ok(Flow::End) => self.return_to_idle(),
            Err(err) => self.fail(err, line),
        }
    }

    fn execute(&mut self, text: &str, line: Option<u64>) -> Result<Flow, ScriptError> {
        let (keyword, rest) = split_keyword(text);
        match keyword.as_str() {
            "PRINT" => self.exec_print(rest, line),
            "INPUT" => self.exec_input(rest, text, line),
            "GOTO" => rest
                .parse::<u64>()
                .map(Flow::Jump)
                .map_err(|_| ScriptError::syntax(text)),
            "END" => Ok(Flow::End),
            "REM" => Ok(Flow::Next),
            "TRACE" if rest.is_empty() => {
                self.tracing = true;
                Ok(Flow::Next)
            }
            "NOTRACE" if rest.is_empty() => {
                self.tracing = false;
                Ok(Flow::Next)
            }
            "LET" => self.exec_assign(rest, text, line),
            _ if text.contains('=') => self.exec_assign(text, text, line),
            _ => Err(ScriptError::syntax(text)),
        }
    }

    fn exec_print(&mut self, args: &str, line: Option<u64>) -> Result<Flow, ScriptError> {
        let items = split_top_level(args, ';');
        let keep_open = items.len() > 1 && items.last().is_some_and(|s| s.trim().is_empty());
        let mut out = String::new();
        for item in items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            out.push_str(&self.eval(item, line)?.to_string());
        }
        if !keep_open {
            out.push('\n');
        }
        if !out.is_empty() {
            self.output.push(OutputEvent::print(out));
        }
        Ok(Flow::Next)
    }

    fn exec_input(
        &mut self,
        args: &str,
        text: &str,
        line: Option<u64>,
    ) -> Result<Flow, ScriptError> {
        let items = split_top_level(args, ';');
        let (prompt, var) = match items.as_slice() {
            [var] => (None, var.trim()),
            [prompt, var] => (Some(self.eval(prompt.trim(), line)?), var.trim()),
            _ => return Err(ScriptError::syntax(text)),
        };
        if !is_variable_name(var) {
            return Err(ScriptError::syntax(text));
        }
        let var = var.to_ascii_uppercase();

        let Some(input) = self.input.take() else {
            if let Some(prompt) = prompt {
                self.output.push(OutputEvent::print(prompt.to_string()));
            }
            return Ok(Flow::Await);
        };

        let (first, excess) = match input.split_once(',') {
            Some((first, _)) => (first.trim(), true),
            None => (input.trim(), false),
        };
        let value = if var.ends_with('$') {
            Value::Text(first.to_string())
        } else if let Ok(n) = first.parse::<i64>() {
            Value::Number(n)
        } else {
            self.output.push(OutputEvent::reenter());
            if let Some(prompt) = prompt {
                self.output.push(OutputEvent::print(prompt.to_string()));
            }
            return Ok(Flow::Await);
        };

        self.vars.insert(var, value);
        if excess {
            self.output.push(OutputEvent::extra_ignored());
        }
        Ok(Flow::Next)
    }

    fn exec_assign(
        &mut self,
        assignment: &str,
        text: &str,
        line: Option<u64>,
    ) -> Result<Flow, ScriptError> {
        let Some((name, expr)) = assignment.split_once('=') else {
            return Err(ScriptError::syntax(text));
        };
        let name = name.trim();
        if !is_variable_name(name) {
            return Err(ScriptError::syntax(text));
        }
        let name = name.to_ascii_uppercase();
        let value = self.eval(expr.trim(), line)?;
        if name.ends_with('$') != matches!(value, Value::Text(_)) {
            return Err(ScriptError::bare("?TYPE MISMATCH ERROR"));
        }
        self.vars.insert(name, value);
        Ok(Flow::Next)
    }

    fn eval(&mut self, expr: &str, line: Option<u64>) -> Result<Value, ScriptError> {
        let mut terms = split_top_level(expr, '+').into_iter();
        let first = terms.next().unwrap_or_default();
        let mut acc = self.eval_term(first.trim(), expr, line)?;
        for term in terms {
            let rhs = self.eval_term(term.trim(), expr, line)?;
            acc = match (acc, rhs) {
                (Value::Number(a), Value::Number(b)) => Value::Number(
                    a.checked_add(b)
                        .ok_or(ScriptError::bare("?OVERFLOW ERROR"))?,
                ),
                (Value::Text(a), Value::Text(b)) => Value::Text(a + &b),
                _ => return Err(ScriptError::bare("?TYPE MISMATCH ERROR")),
            };
        }
        Ok(acc)
    }

    fn eval_term(
        &mut self,
        term: &str,
        expr: &str,
        line: Option<u64>,
    ) -> Result<Value, ScriptError> {
        if let Some(inner) = term.strip_prefix('"') {
            return inner
                .strip_suffix('"')
                .map(|s| Value::Text(s.to_string()))
                .ok_or_else(|| ScriptError::syntax(expr));
        }
        if let Ok(n) = term.parse::<i64>() {
            return Ok(Value::Number(n));
        }
        if !is_variable_name(term) {
            return Err(ScriptError::syntax(expr));
        }
        let name = term.to_ascii_uppercase();
        if let Some(value) = self.vars.get(&name) {
            return Ok(value.clone());
        }
        if self.options.warnings {
            self.output.push(OutputEvent::warning(
                format!("USE OF UNDEFINED VARIABLE {name}"),
                line,
            ));
        }
        Ok(if name.ends_with('$') {
            Value::Text(String::new())
        } else {
            Value::Number(0)
        })
    }

    // --- State helpers ---

    fn line_after(&self, number: u64) -> Option<u64> {
        self.program
            .range(number.saturating_add(1)..)
            .next()
            .map(|(n, _)| *n)
    }

    fn current_line(&self) -> Option<u64> {
        match self.position {
            Some(Position::Line(number)) => Some(number),
            Some(Position::Immediate) | None => None,
        }
    }

    fn fail(&mut self, err: ScriptError, line: Option<u64>) {
        let mut message = err.message.to_string();
        if let Some(number) = line {
            message.push_str(&format!(" IN {number}"));
        }
        if let Some(context) = err.context {
            message.push('\n');
            message.push_str(&context);
        }
        self.error = Some(message);
        self.position = None;
        self.input = None;
        self.state = ExecutionState::Errored;
    }

    fn return_to_idle(&mut self) {
        self.position = None;
        self.input = None;
        self.state = ExecutionState::Idle;
    }
}

impl Engine for ScriptEngine {
    fn state(&self) -> ExecutionState {
        self.state
    }

    fn start_evaluating(&mut self, line: &str) {
        let line = line.trim();
        if let Some((number, rest)) = split_line_number(line) {
            let rest = rest.trim();
            if rest.is_empty() {
                self.program.remove(&number);
            } else {
                self.program.insert(number, rest.to_string());
            }
            self.state = ExecutionState::Idle;
            return;
        }

        let (keyword, rest) = split_keyword(line);
        match (keyword.as_str(), rest.is_empty()) {
            ("RUN", true) => {
                self.vars.clear();
                self.position = self.program.keys().next().map(|n| Position::Line(*n));
                self.run_next_statement();
            }
            ("LIST", true) => {
                for (number, text) in &self.program {
                    self.output.push(OutputEvent::print(format!("{number} {text}\n")));
                }
                self.state = ExecutionState::Idle;
            }
            ("NEW", true) => {
                self.program.clear();
                self.vars.clear();
                self.return_to_idle();
            }
            ("", true) => self.return_to_idle(),
            _ => {
                self.immediate = line.to_string();
                self.position = Some(Position::Immediate);
                self.run_next_statement();
            }
        }
    }

    fn continue_evaluating(&mut self) {
        if self.state == ExecutionState::Running {
            self.run_next_statement();
        }
    }

    fn provide_input(&mut self, value: &str) {
        if self.state == ExecutionState::AwaitingInput {
            self.input = Some(value.to_string());
            self.state = ExecutionState::Running;
            self.run_next_statement();
        }
    }

    fn break_at_current_location(&mut self) {
        let line = self.current_line();
        self.return_to_idle();
        self.output.push(OutputEvent::break_at(line));
    }

    fn take_latest_output(&mut self) -> Vec<OutputEvent> {
        self.output.drain()
    }

    fn take_latest_error(&mut self) -> Option<String> {
        if self.state == ExecutionState::Errored {
            self.state = ExecutionState::Idle;
        }
        self.error.take()
    }

    fn seed_randomness(&mut self, seed: u64) {
        self.seed = Some(seed);
    }

    fn apply_options(&mut self, options: &EngineOptions) {
        self.options = *options;
        self.tracing = options.tracing;
    }
}

// ============================================================================
// Lexing helpers
// ============================================================================

fn split_line_number(line: &str) -> Option<(u64, &str)> {
    let end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    if end == 0 {
        return None;
    }
    line[..end].parse().ok().map(|n| (n, &line[end..]))
}

fn split_keyword(text: &str) -> (String, &str) {
    let text = text.trim();
    let end = text
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    (text[..end].to_ascii_uppercase(), text[end..].trim())
}

/// Split on `sep` outside string literals.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_string = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_string = !in_string;
        } else if c == sep && !in_string {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_variable_name(name: &str) -> bool {
    let body = name.strip_suffix('$').unwrap_or(name);
    let mut chars = body.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}
