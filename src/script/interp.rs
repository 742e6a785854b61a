use std::collections::HashMap;
use std::sync::Arc;

use crate::script::ast::{BinaryOp, Expr, FnDef, Lit, Program, Stmt, UnaryOp};
use crate::script::error::ExecError;
use crate::script::value::Value;

/// Host side of the sandbox boundary: the only way app logic reaches outside itself.
pub(crate) trait HostApi {
    /// Invoke host function `name`; `None` means no such function exists.
    fn call(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, ExecError>>;
}

/// Elements a single list may hold.
pub(crate) const MAX_LIST_LEN: usize = 1 << 16;
/// Bytes a single string may hold.
pub(crate) const MAX_STR_LEN: usize = 1 << 20;
/// Size of one value counted as one unit per list or scalar plus one per string byte.
pub(crate) const MAX_VALUE_UNITS: usize = 1 << 20;
/// Value units walked per extra step charged on in-place updates.
const UNITS_PER_STEP: usize = 1024;

/// Execution limits applied to every entry into app logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Statements, loop iterations and calls allowed per entry call.
    pub step_budget: u64,
    /// Maximum nesting of script function calls.
    pub max_call_depth: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        let step_budget = std::env::var("ZEPP_PLAYER_STEP_BUDGET")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(2_000_000);
        let max_call_depth = std::env::var("ZEPP_PLAYER_MAX_CALL_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(64);
        Self {
            step_budget,
            max_call_depth,
        }
    }
}

impl SandboxLimits {
    /// Return limits with a different step budget.
    pub fn with_step_budget(mut self, step_budget: u64) -> Self {
        self.step_budget = step_budget.max(1);
        self
    }

    /// Return limits with a different call depth.
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth.max(1);
        self
    }
}

/// One instantiated copy of a program: its globals plus the limits it runs under.
pub(crate) struct Sandbox {
    program: Arc<Program>,
    globals: HashMap<String, Value>,
    limits: SandboxLimits,
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("globals", &self.globals.len())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Sandbox {
    /// Create globals by running the program's top-level statements.
    pub(crate) fn instantiate(
        program: Arc<Program>,
        limits: SandboxLimits,
        host: &mut dyn HostApi,
    ) -> Result<Self, ExecError> {
        let mut sandbox = Self {
            program,
            globals: HashMap::new(),
            limits,
        };
        let program = Arc::clone(&sandbox.program);
        let mut exec = Exec::new(&program, &mut sandbox.globals, host, limits);
        let mut scopes = Vec::new();
        for stmt in &program.top_level {
            if let Flow::Return(_) = exec.exec_stmt(stmt, &mut scopes)? {
                return Err(ExecError::new("return outside of a function"));
            }
        }
        Ok(sandbox)
    }

    pub(crate) fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Call a script function by name with a fresh step budget.
    pub(crate) fn call(
        &mut self,
        name: &str,
        args: Vec<Value>,
        host: &mut dyn HostApi,
    ) -> Result<Value, ExecError> {
        let program = Arc::clone(&self.program);
        let f = program
            .functions
            .get(name)
            .ok_or_else(|| ExecError::new(format!("unknown function '{name}'")))?;
        let mut exec = Exec::new(&program, &mut self.globals, host, self.limits);
        exec.call_fn(f, args)
            .map_err(|e| ExecError::new(format!("in {name}(): {}", e.message)))
    }
}

enum Flow {
    Normal,
    Return(Value),
}

type Scopes = Vec<HashMap<String, Value>>;

struct Exec<'a> {
    program: &'a Program,
    globals: &'a mut HashMap<String, Value>,
    host: &'a mut dyn HostApi,
    steps_left: u64,
    depth: usize,
    max_depth: usize,
}

impl<'a> Exec<'a> {
    fn new(
        program: &'a Program,
        globals: &'a mut HashMap<String, Value>,
        host: &'a mut dyn HostApi,
        limits: SandboxLimits,
    ) -> Self {
        Self {
            program,
            globals,
            host,
            steps_left: limits.step_budget,
            depth: 0,
            max_depth: limits.max_call_depth,
        }
    }

    fn step(&mut self) -> Result<(), ExecError> {
        self.charge(1)
    }

    fn charge(&mut self, steps: u64) -> Result<(), ExecError> {
        if self.steps_left < steps {
            self.steps_left = 0;
            return Err(ExecError::new("step budget exhausted"));
        }
        self.steps_left -= steps;
        Ok(())
    }

    fn call_fn(&mut self, f: &FnDef, args: Vec<Value>) -> Result<Value, ExecError> {
        self.step()?;
        if self.depth >= self.max_depth {
            return Err(ExecError::new(format!(
                "call depth exceeded ({} frames)",
                self.max_depth
            )));
        }
        if args.len() > f.params.len() {
            return Err(ExecError::new(format!(
                "{} expects at most {} args, got {}",
                f.name,
                f.params.len(),
                args.len()
            )));
        }
        let mut frame = HashMap::with_capacity(f.params.len());
        let mut args = args.into_iter();
        for p in &f.params {
            frame.insert(p.clone(), args.next().unwrap_or_default());
        }

        self.depth += 1;
        let mut scopes = vec![frame];
        let out = self.exec_stmts(&f.body, &mut scopes);
        self.depth -= 1;

        match out? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Ok(Value::Null),
        }
    }

    fn exec_stmts(&mut self, stmts: &[Stmt], scopes: &mut Scopes) -> Result<Flow, ExecError> {
        for stmt in stmts {
            if let Flow::Return(v) = self.exec_stmt(stmt, scopes)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_block(&mut self, stmts: &[Stmt], scopes: &mut Scopes) -> Result<Flow, ExecError> {
        scopes.push(HashMap::new());
        let out = self.exec_stmts(stmts, scopes);
        scopes.pop();
        out
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scopes: &mut Scopes) -> Result<Flow, ExecError> {
        self.step()?;
        match stmt {
            Stmt::Let { name, value } => {
                let v = self.eval(value, scopes)?;
                match scopes.last_mut() {
                    Some(scope) => {
                        scope.insert(name.clone(), v);
                    }
                    None => {
                        self.globals.insert(name.clone(), v);
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, value } => {
                let v = self.eval(value, scopes)?;
                *self.lookup_mut(name, scopes)? = v;
                Ok(Flow::Normal)
            }
            Stmt::AssignIndex { name, index, value } => {
                let idx = self.eval(index, scopes)?.as_f64()?;
                let v = self.eval(value, scopes)?;
                let added = value_units(&v);
                let items = match self.lookup_mut(name, scopes)? {
                    Value::List(items) => items,
                    other => {
                        return Err(ExecError::new(format!(
                            "cannot index-assign into {}",
                            other.type_name()
                        )));
                    }
                };
                let i = list_index(idx, items.len() + 1)?;
                if i == items.len() && items.len() >= MAX_LIST_LEN {
                    return Err(list_too_long());
                }
                let units = list_units(items).saturating_add(added);
                if units > MAX_VALUE_UNITS {
                    return Err(value_too_large());
                }
                if i == items.len() {
                    items.push(v);
                } else {
                    items[i] = v;
                }
                self.charge((units / UNITS_PER_STEP) as u64)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond, scopes)?.as_bool()? {
                    self.exec_block(then, scopes)
                } else if let Some(otherwise) = otherwise {
                    self.exec_block(otherwise, scopes)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body } => {
                while self.eval(cond, scopes)?.as_bool()? {
                    self.step()?;
                    if let Flow::Return(v) = self.exec_block(body, scopes)? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return(e) => {
                let v = match e {
                    Some(e) => self.eval(e, scopes)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(v))
            }
            Stmt::Expr(e) => {
                self.eval(e, scopes)?;
                Ok(Flow::Normal)
            }
            Stmt::Block(stmts) => self.exec_block(stmts, scopes),
        }
    }

    fn lookup<'s>(&'s self, name: &str, scopes: &'s Scopes) -> Result<&'s Value, ExecError> {
        scopes
            .iter()
            .rev()
            .find_map(|s| s.get(name))
            .or_else(|| self.globals.get(name))
            .ok_or_else(|| ExecError::new(format!("undefined variable '{name}'")))
    }

    fn lookup_mut<'s>(
        &'s mut self,
        name: &str,
        scopes: &'s mut Scopes,
    ) -> Result<&'s mut Value, ExecError> {
        if let Some(scope) = scopes.iter_mut().rev().find(|s| s.contains_key(name)) {
            return scope
                .get_mut(name)
                .ok_or_else(|| ExecError::new(format!("undefined variable '{name}'")));
        }
        self.globals
            .get_mut(name)
            .ok_or_else(|| ExecError::new(format!("assignment to undeclared variable '{name}'")))
    }

    fn eval(&mut self, e: &Expr, scopes: &mut Scopes) -> Result<Value, ExecError> {
        match e {
            Expr::Lit(lit) => Ok(match lit {
                Lit::Num(v) => Value::Num(*v),
                Lit::Bool(v) => Value::Bool(*v),
                Lit::Str(s) => Value::Str(s.clone()),
                Lit::Null => Value::Null,
            }),
            Expr::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval(item, scopes)?);
                }
                check_size(Value::List(out))
            }
            Expr::Var(name) => self.lookup(name, scopes).cloned(),
            Expr::Unary { op, expr } => {
                let v = self.eval(expr, scopes)?;
                match op {
                    UnaryOp::Neg => Ok(Value::Num(-v.as_f64()?)),
                    UnaryOp::Not => Ok(Value::Bool(!v.as_bool()?)),
                }
            }
            Expr::Binary { op, left, right } => match op {
                BinaryOp::And => {
                    if !self.eval(left, scopes)?.as_bool()? {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(self.eval(right, scopes)?.as_bool()?))
                }
                BinaryOp::Or => {
                    if self.eval(left, scopes)?.as_bool()? {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(self.eval(right, scopes)?.as_bool()?))
                }
                _ => {
                    let a = self.eval(left, scopes)?;
                    let b = self.eval(right, scopes)?;
                    binary_op(*op, a, b)
                }
            },
            Expr::Index { base, index } => {
                let base = self.eval(base, scopes)?;
                let idx = self.eval(index, scopes)?.as_f64()?;
                match base {
                    Value::List(items) => Ok(list_index(idx, items.len())
                        .ok()
                        .and_then(|i| items.into_iter().nth(i))
                        .unwrap_or(Value::Null)),
                    Value::Str(s) => Ok(list_index(idx, usize::MAX)
                        .ok()
                        .and_then(|i| s.chars().nth(i))
                        .map_or(Value::Null, |c| Value::Str(c.to_string()))),
                    other => Err(ExecError::new(format!("cannot index {}", other.type_name()))),
                }
            }
            Expr::Call { func, args } => {
                let mut vals = Vec::with_capacity(args.len());
                for a in args {
                    vals.push(self.eval(a, scopes)?);
                }
                self.call_named(func, vals)
            }
        }
    }

    fn call_named(&mut self, func: &str, args: Vec<Value>) -> Result<Value, ExecError> {
        if let Some(f) = self.program.functions.get(func) {
            let f = Arc::clone(f);
            return self.call_fn(&f, args);
        }
        self.step()?;
        if let Some(out) = call_builtin(func, &args) {
            return out;
        }
        match self.host.call(func, &args) {
            Some(out) => out.map_err(|e| ExecError::new(format!("{func}: {}", e.message))),
            None => Err(ExecError::new(format!("unknown function '{func}'"))),
        }
    }
}

fn list_index(idx: f64, len: usize) -> Result<usize, ExecError> {
    if !idx.is_finite() || idx < 0.0 || idx.fract() != 0.0 {
        return Err(ExecError::new(format!("invalid index {idx}")));
    }
    let i = idx as usize;
    if i >= len {
        return Err(ExecError::new(format!("index {i} out of range")));
    }
    Ok(i)
}

fn binary_op(op: BinaryOp, a: Value, b: Value) -> Result<Value, ExecError> {
    match op {
        BinaryOp::Add => match (a, b) {
            (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
            (Value::List(mut a), Value::List(b)) => {
                if a.len() + b.len() > MAX_LIST_LEN {
                    return Err(list_too_long());
                }
                a.extend(b);
                check_size(Value::List(a))
            }
            (a @ Value::Str(_), b) | (a, b @ Value::Str(_)) => {
                check_size(Value::Str(format!("{a}{b}")))
            }
            (a, b) => Err(ExecError::new(format!(
                "cannot add {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        },
        BinaryOp::Sub => Ok(Value::Num(a.as_f64()? - b.as_f64()?)),
        BinaryOp::Mul => Ok(Value::Num(a.as_f64()? * b.as_f64()?)),
        BinaryOp::Div => Ok(Value::Num(a.as_f64()? / b.as_f64()?)),
        BinaryOp::Mod => Ok(Value::Num(a.as_f64()? % b.as_f64()?)),
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::Ne => Ok(Value::Bool(a != b)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ord = match (&a, &b) {
                (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            };
            let Some(ord) = ord else {
                return Ok(Value::Bool(false));
            };
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ord.is_lt(),
                BinaryOp::Le => ord.is_le(),
                BinaryOp::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            }))
        }
        BinaryOp::And | BinaryOp::Or => Ok(Value::Bool(a.as_bool()? && b.as_bool()?)),
    }
}

fn list_too_long() -> ExecError {
    ExecError::new(format!("list longer than {MAX_LIST_LEN} elements"))
}

fn value_too_large() -> ExecError {
    ExecError::new(format!("value larger than {MAX_VALUE_UNITS} units"))
}

/// Size of `items` as a list value, stopping early once past [`MAX_VALUE_UNITS`].
fn list_units(items: &[Value]) -> usize {
    let mut total = 1usize;
    let mut stack: Vec<&[Value]> = vec![items];
    while let Some(level) = stack.pop() {
        for v in level {
            total += match v {
                Value::Str(s) => 1 + s.len(),
                Value::List(inner) => {
                    stack.push(inner);
                    1
                }
                _ => 1,
            };
            if total > MAX_VALUE_UNITS {
                return total;
            }
        }
    }
    total
}

fn value_units(v: &Value) -> usize {
    match v {
        Value::Str(s) => 1 + s.len(),
        Value::List(items) => list_units(items),
        _ => 1,
    }
}

/// Reject strings and lists that grew past the sandbox size limits.
fn check_size(v: Value) -> Result<Value, ExecError> {
    match &v {
        Value::Str(s) if s.len() > MAX_STR_LEN => Err(ExecError::new(format!(
            "string longer than {MAX_STR_LEN} bytes"
        ))),
        Value::List(items) if items.len() > MAX_LIST_LEN => Err(list_too_long()),
        Value::List(items) if list_units(items) > MAX_VALUE_UNITS => Err(value_too_large()),
        _ => Ok(v),
    }
}

fn expect_argc(name: &str, args: &[Value], n: usize) -> Result<(), ExecError> {
    if args.len() != n {
        return Err(ExecError::new(format!(
            "{name} expects {n} arg(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn unary_num(name: &str, args: &[Value], f: impl FnOnce(f64) -> f64) -> Result<Value, ExecError> {
    expect_argc(name, args, 1)?;
    Ok(Value::Num(f(args[0].as_f64()?)))
}

/// Pure helpers available to every program; `None` when `name` is not a builtin.
fn call_builtin(name: &str, args: &[Value]) -> Option<Result<Value, ExecError>> {
    let out = match name {
        "abs" => unary_num(name, args, f64::abs),
        "floor" => unary_num(name, args, f64::floor),
        "ceil" => unary_num(name, args, f64::ceil),
        "round" => unary_num(name, args, f64::round),
        "sqrt" => unary_num(name, args, f64::sqrt),
        "sin" => unary_num(name, args, f64::sin),
        "cos" => unary_num(name, args, f64::cos),
        "min" | "max" => expect_argc(name, args, 2).and_then(|()| {
            let (a, b) = (args[0].as_f64()?, args[1].as_f64()?);
            Ok(Value::Num(if name == "min" { a.min(b) } else { a.max(b) }))
        }),
        "clamp" => expect_argc(name, args, 3).and_then(|()| {
            let (x, lo, hi) = (args[0].as_f64()?, args[1].as_f64()?, args[2].as_f64()?);
            if lo > hi {
                return Err(ExecError::new("clamp: lo must be <= hi"));
            }
            Ok(Value::Num(x.clamp(lo, hi)))
        }),
        "len" => expect_argc(name, args, 1).and_then(|()| match &args[0] {
            Value::List(items) => Ok(Value::Num(items.len() as f64)),
            Value::Str(s) => Ok(Value::Num(s.chars().count() as f64)),
            other => Err(ExecError::new(format!("len of {}", other.type_name()))),
        }),
        "str" => expect_argc(name, args, 1)
            .and_then(|()| check_size(Value::Str(args[0].to_string()))),
        "num" => expect_argc(name, args, 1).map(|()| match &args[0] {
            Value::Num(n) => Value::Num(*n),
            Value::Str(s) => s.trim().parse::<f64>().map_or(Value::Null, Value::Num),
            Value::Bool(b) => Value::Num(if *b { 1.0 } else { 0.0 }),
            _ => Value::Null,
        }),
        "push" => expect_argc(name, args, 2).and_then(|()| match &args[0] {
            Value::List(items) => {
                if items.len() >= MAX_LIST_LEN {
                    return Err(list_too_long());
                }
                let mut items = items.clone();
                items.push(args[1].clone());
                check_size(Value::List(items))
            }
            other => Err(ExecError::new(format!("push onto {}", other.type_name()))),
        }),
        "pad" => expect_argc(name, args, 2).and_then(|()| {
            let width = args[1].as_f64()?.clamp(0.0, 32.0) as usize;
            let n = args[0].as_f64()?;
            let digits = format!("{}", n.abs().trunc());
            let sign = if n < 0.0 { "-" } else { "" };
            Ok(Value::Str(format!("{sign}{digits:0>width$}")))
        }),
        _ => return None,
    };
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/script/interp.rs"]
mod tests;
