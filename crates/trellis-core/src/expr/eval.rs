use std::rc::Rc;

use super::parser::{BinaryOp, Expr, Literal, LogicalOp, UnaryOp};
use crate::error::{Error, Result};
use crate::observer::Scope;
use crate::value::{Object, Value};

/// Evaluates `expr` with `scope` as the only environment for bare names.
///
/// Every scope property read here goes through its reactive getter, so
/// evaluating inside a watcher is what subscribes the watcher.
pub fn evaluate(expr: &Expr, scope: &Scope) -> Result<Value> {
    match expr {
        Expr::Literal(lit) => Ok(literal(lit)),
        Expr::Ident(name) => scope.lookup(name),
        Expr::Member { object, property } => {
            let object = evaluate(object, scope)?;
            member(&object, property, scope)
        }
        Expr::Index { object, index } => {
            let object = evaluate(object, scope)?;
            let key = evaluate(index, scope)?.to_string();
            member(&object, &key, scope)
        }
        Expr::Call { callee, args } => call(callee, args, scope),
        Expr::Unary { op, operand } => {
            let v = evaluate(operand, scope)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!v.truthy()),
                UnaryOp::Neg => Value::Number(-v.to_number()),
                UnaryOp::Plus => Value::Number(v.to_number()),
            })
        }
        Expr::Logical { op, lhs, rhs } => {
            let l = evaluate(lhs, scope)?;
            match (op, l.truthy()) {
                (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(l),
                _ => evaluate(rhs, scope),
            }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if evaluate(test, scope)?.truthy() {
                evaluate(consequent, scope)
            } else {
                evaluate(alternate, scope)
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = evaluate(lhs, scope)?;
            let r = evaluate(rhs, scope)?;
            Ok(binary(*op, &l, &r))
        }
    }
}

fn literal(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

fn member(object: &Value, property: &str, scope: &Scope) -> Result<Value> {
    match object {
        Value::Object(o) => Ok(o.get_in(property, scope.tracker()).unwrap_or(Value::Undefined)),
        Value::Null | Value::Undefined => Err(Error::NullMember {
            property: property.to_string(),
        }),
        Value::Str(s) if property == "length" => Ok(Value::from(s.chars().count())),
        _ => Ok(Value::Undefined),
    }
}

fn call(callee: &Expr, args: &[Expr], scope: &Scope) -> Result<Value> {
    let (this, func, name): (Object, Value, Rc<str>) = match callee {
        Expr::Member { object, property } => {
            let receiver = evaluate(object, scope)?;
            let func = member(&receiver, property, scope)?;
            let this = match receiver {
                Value::Object(o) => o,
                _ => scope.object().clone(),
            };
            (this, func, property.clone())
        }
        Expr::Ident(name) => (scope.object().clone(), scope.lookup(name)?, name.clone()),
        other => (
            scope.object().clone(),
            evaluate(other, scope)?,
            Rc::from("expression"),
        ),
    };
    let Value::Method(method) = func else {
        return Err(Error::NotCallable {
            callee: name.to_string(),
        });
    };
    let args = args
        .iter()
        .map(|a| evaluate(a, scope))
        .collect::<Result<Vec<_>>>()?;
    method.call(&this, &args)
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    match op {
        BinaryOp::Add => match (l, r) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::from(format!("{l}{r}")),
            _ => Value::Number(l.to_number() + r.to_number()),
        },
        BinaryOp::Sub => Value::Number(l.to_number() - r.to_number()),
        BinaryOp::Mul => Value::Number(l.to_number() * r.to_number()),
        BinaryOp::Div => Value::Number(l.to_number() / r.to_number()),
        BinaryOp::Rem => Value::Number(l.to_number() % r.to_number()),
        BinaryOp::StrictEq => Value::Bool(l.strict_eq(r)),
        BinaryOp::StrictNotEq => Value::Bool(!l.strict_eq(r)),
        BinaryOp::Eq => Value::Bool(l.loose_eq(r)),
        BinaryOp::NotEq => Value::Bool(!l.loose_eq(r)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            Value::Bool(compare(op, l, r))
        }
    }
}

fn compare(op: BinaryOp, l: &Value, r: &Value) -> bool {
    let ordering = match (l, r) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => l.to_number().partial_cmp(&r.to_number()),
    };
    // NaN on either side compares false
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    }
}
