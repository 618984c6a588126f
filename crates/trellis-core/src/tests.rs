#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::expr::{evaluate, parse};
    use crate::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&Value) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, move |v: &Value| sink.borrow_mut().push(v.to_string()))
    }

    fn eval(src: &str, scope: &Scope) -> Result<Value> {
        evaluate(&parse(src)?, scope)
    }

    #[test]
    fn test_install_makes_every_property_reactive() {
        let scope = Scope::new(
            Object::new()
                .with("name", "x")
                .with("a", Object::new().with("b", 1)),
        );
        assert!(scope.object().is_reactive("name"));
        assert!(scope.object().is_reactive("a"));
        let a = scope.get("a").unwrap();
        assert!(a.as_object().unwrap().is_reactive("b"));
        assert!(scope.object().dep("name").unwrap().is_empty());
    }

    #[test]
    fn test_observe_ignores_non_objects() {
        let tracker = Tracker::new();
        observe(&Value::from(3), &tracker);
        observe(&Value::Null, &tracker);
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn test_observe_is_idempotent_and_survives_cycles() {
        let a = Object::new().with("n", 1);
        let b = Object::new().with("a", a.clone());
        a.set("b", b.clone()).unwrap();
        let scope = Scope::new(Object::new().with("a", a.clone()));

        let dep = a.dep("n").unwrap();
        observe(&Value::Object(a.clone()), scope.tracker());
        assert!(Rc::ptr_eq(&dep, &a.dep("n").unwrap()));
        assert!(b.is_reactive("a"));
    }

    #[test]
    fn test_watcher_runs_once_on_construction() {
        let scope = Scope::new(Object::new().with("x", 1));
        let (log, cb) = recorder();
        let w = Watcher::new("x", &scope, cb).unwrap();
        assert_eq!(*log.borrow(), ["1"]);
        assert_eq!(w.runs(), 1);
        assert_eq!(w.dependency_count(), 1);
    }

    #[test]
    fn test_mutation_notifies_each_reader_once_in_order() {
        let scope = Scope::new(Object::new().with("x", 1).with("y", 10));
        let order = Rc::new(RefCell::new(Vec::new()));

        let mk = |exp: &str, tag: &'static str| {
            let order = order.clone();
            Watcher::new(exp, &scope, move |_| order.borrow_mut().push(tag)).unwrap()
        };
        let _a = mk("x + x", "a");
        let _b = mk("y", "b");
        let _c = mk("x * 2", "c");
        order.borrow_mut().clear();

        scope.set("x", 2).unwrap();
        assert_eq!(*order.borrow(), ["a", "c"]);

        order.borrow_mut().clear();
        scope.set("x", 3).unwrap();
        assert_eq!(*order.borrow(), ["a", "c"]);
    }

    #[test]
    fn test_equal_set_is_silent() {
        let scope = Scope::new(Object::new().with("name", "x"));
        let (log, cb) = recorder();
        let _w = Watcher::new("name", &scope, cb).unwrap();

        scope.set("name", "x").unwrap();
        assert_eq!(log.borrow().len(), 1);

        scope.set("name", "y").unwrap();
        scope.set("name", "y").unwrap();
        assert_eq!(*log.borrow(), ["x", "y"]);
    }

    #[test]
    fn test_nan_is_never_equal_to_itself() {
        let scope = Scope::new(Object::new().with("n", f64::NAN));
        let (log, cb) = recorder();
        let _w = Watcher::new("n", &scope, cb).unwrap();
        scope.set("n", f64::NAN).unwrap();
        assert_eq!(*log.borrow(), ["NaN", "NaN"]);
    }

    #[test]
    fn test_constant_expression_never_rerenders() {
        let scope = Scope::new(Object::new().with("x", 1));
        let (log, cb) = recorder();
        let w = Watcher::new("\"no bindings here\"", &scope, cb).unwrap();
        scope.set("x", 2).unwrap();
        assert_eq!(*log.borrow(), ["no bindings here"]);
        assert_eq!(w.dependency_count(), 0);
    }

    #[test]
    fn test_nested_object_tracking() {
        let scope = Scope::new(Object::new().with("a", Object::new().with("b", 1)));
        let (inner, cb) = recorder();
        let _ab = Watcher::new("a.b", &scope, cb).unwrap();
        let (outer, cb) = recorder();
        let _a = Watcher::new("a", &scope, cb).unwrap();

        let a = scope.get("a").unwrap();
        a.as_object().unwrap().set("b", 2).unwrap();
        assert_eq!(*inner.borrow(), ["1", "2"]);
        assert_eq!(outer.borrow().len(), 1);

        // Replacing the object notifies readers of `a`, but the new
        // object's properties are plain.
        scope.set("a", Object::new().with("b", 3)).unwrap();
        assert_eq!(*inner.borrow(), ["1", "2", "3"]);
        assert_eq!(outer.borrow().len(), 2);

        let fresh = scope.get("a").unwrap();
        let fresh = fresh.as_object().unwrap();
        assert!(!fresh.is_reactive("b"));
        fresh.set("b", 4).unwrap();
        assert_eq!(*inner.borrow(), ["1", "2", "3"]);
    }

    #[test]
    fn test_observe_on_set_makes_new_objects_reactive() {
        let scope = Scope::with_options(
            Object::new().with("a", Object::new().with("b", 1)),
            ObserveOptions {
                observe_on_set: true,
            },
        );
        let (log, cb) = recorder();
        let _w = Watcher::new("a.b", &scope, cb).unwrap();

        scope.set("a", Object::new().with("b", 3)).unwrap();
        let fresh = scope.get("a").unwrap();
        assert!(fresh.as_object().unwrap().is_reactive("b"));
        fresh.as_object().unwrap().set("b", 4).unwrap();
        assert_eq!(*log.borrow(), ["1", "3", "4"]);
    }

    #[test]
    fn test_dependencies_follow_latest_evaluation() {
        let scope = Scope::new(Object::new().with("flag", true).with("a", 1).with("b", 2));
        let (log, cb) = recorder();
        let w = Watcher::new("flag ? a : b", &scope, cb).unwrap();
        assert_eq!(w.dependency_count(), 2);

        scope.set("flag", false).unwrap();
        assert_eq!(*log.borrow(), ["1", "2"]);

        // `a` was not read by the latest evaluation.
        scope.set("a", 100).unwrap();
        assert_eq!(log.borrow().len(), 2);
        assert!(scope.object().dep("a").unwrap().is_empty());

        scope.set("b", 3).unwrap();
        assert_eq!(*log.borrow(), ["1", "2", "3"]);
    }

    #[test]
    fn test_unresolved_identifier_is_an_error() {
        let scope = Scope::new(Object::new().with("x", 1));
        let err = Watcher::new("x + missing", &scope, |_| {}).unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvedIdentifier {
                name: "missing".into()
            }
        );
        assert_eq!(scope.tracker().active(), None);
    }

    #[test]
    fn test_failing_watcher_propagates_from_set() {
        let scope = Scope::new(Object::new().with("obj", Object::new().with("v", 1)));
        let (log, cb) = recorder();
        let _w = Watcher::new("obj.v", &scope, cb).unwrap();
        let err = scope.set("obj", Value::Null).unwrap_err();
        assert_eq!(
            err,
            Error::NullMember {
                property: "v".into()
            }
        );
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_reentrant_evaluation_is_rejected() {
        let scope = Scope::new(Object::new().with("x", 1));
        scope
            .set(
                "bump",
                Method::new(|this, _| {
                    this.set("x", 2)?;
                    Ok(Value::Null)
                }),
            )
            .unwrap();
        let (_log, cb) = recorder();
        let reader = Watcher::new("x", &scope, cb).unwrap();

        let err = Watcher::new("bump()", &scope, |_| {}).unwrap_err();
        match err {
            Error::Reentrant { requested, .. } => assert_eq!(requested, reader.id()),
            other => panic!("expected reentrancy error, got {other:?}"),
        }
        assert_eq!(scope.tracker().active(), None);
    }

    #[test]
    fn test_scopes_track_independently() {
        let left = Scope::new(Object::new().with("x", 1));
        let right = Scope::new(Object::new().with("x", 1));
        assert!(!left.tracker().ptr_eq(right.tracker()));

        let (log, cb) = recorder();
        let _w = Watcher::new("x", &left, cb).unwrap();
        right.set("x", 5).unwrap();
        assert_eq!(log.borrow().len(), 1);
        left.set("x", 5).unwrap();
        assert_eq!(*log.borrow(), ["1", "5"]);
    }

    #[test]
    fn test_dropped_watcher_is_unsubscribed() {
        let scope = Scope::new(Object::new().with("x", 1));
        let (log, cb) = recorder();
        let w = Watcher::new("x", &scope, cb).unwrap();
        assert_eq!(scope.object().dep("x").unwrap().len(), 1);
        drop(w);
        assert!(scope.object().dep("x").unwrap().is_empty());
        scope.set("x", 2).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_watcher_ids_increase() {
        let scope = Scope::new(Object::new().with("x", 1));
        let a = Watcher::detached("x", &scope).unwrap();
        let b = Watcher::detached("x", &scope).unwrap();
        assert!(b.id() > a.id());
        assert_eq!(a.get().unwrap().to_string(), "1");
    }

    #[test]
    fn test_set_path_writes_nested_properties() {
        let scope = Scope::new(Object::new().with("user", Object::new().with("name", "a")));
        let (log, cb) = recorder();
        let _w = Watcher::new("user.name", &scope, cb).unwrap();
        scope.set_path("user.name", "b").unwrap();
        assert_eq!(*log.borrow(), ["a", "b"]);

        let err = scope.set_path("user.name.first", "c").unwrap_err();
        assert!(matches!(err, Error::NotAnObject { .. }));
    }

    #[test]
    fn test_scope_from_json() {
        let scope = Scope::from(serde_json::json!({
            "title": "Hi",
            "count": 3,
            "tags": ["a", "b"],
        }));
        assert_eq!(eval("title + ' ' + count", &scope).unwrap().to_string(), "Hi 3");
        assert_eq!(eval("tags[1]", &scope).unwrap().to_string(), "b");
        assert_eq!(eval("tags[0]", &scope).unwrap().to_string(), "a");
    }

    #[test]
    fn test_expression_semantics() {
        let scope = Scope::new(
            Object::new()
                .with("n", 4)
                .with("s", "ab")
                .with("empty", "")
                .with("user", Object::new().with("name", "Ada")),
        );
        let cases = [
            ("1 + 2 * 3", "7"),
            ("(1 + 2) * 3", "9"),
            ("n / 8", "0.5"),
            ("n % 3", "1"),
            ("-n + 1", "-3"),
            ("'x' + n", "x4"),
            ("n + 1 + 'x'", "5x"),
            ("s + user.name", "abAda"),
            ("user['name']", "Ada"),
            ("user.missing", "undefined"),
            ("user.missing == null", "true"),
            ("user.missing === null", "false"),
            ("n.missing", "undefined"),
            ("s.length", "2"),
            ("n > 3 && n < 5", "true"),
            ("empty || 'fallback'", "fallback"),
            ("empty && missing", ""),
            ("!empty", "true"),
            ("n == '4'", "true"),
            ("n === '4'", "false"),
            ("n !== 4", "false"),
            ("'b' > 'a'", "true"),
            ("n > 2 ? 'big' : 'small'", "big"),
            ("null", "null"),
            ("1 / 0", "Infinity"),
            ("-0", "0"),
        ];
        for (src, expected) in cases {
            assert_eq!(eval(src, &scope).unwrap().to_string(), expected, "{src}");
        }
    }

    #[test]
    fn test_method_calls_bind_this() {
        let scope = Scope::new(
            Object::new()
                .with("greeting", "Hello")
                .with(
                    "greet",
                    Method::new(|this, args| {
                        let greeting = this.get("greeting").unwrap_or_default();
                        let who = args.first().cloned().unwrap_or_default();
                        Ok(Value::from(format!("{greeting}, {who}!")))
                    }),
                )
                .with(
                    "inner",
                    Object::new().with("greeting", "Hi").with(
                        "greet",
                        Method::new(|this, _| Ok(this.get("greeting").unwrap_or_default())),
                    ),
                ),
        );
        assert_eq!(
            eval("greet('Ada')", &scope).unwrap().to_string(),
            "Hello, Ada!"
        );
        assert_eq!(eval("inner.greet()", &scope).unwrap().to_string(), "Hi");
        assert_eq!(
            eval("greeting()", &scope).unwrap_err(),
            Error::NotCallable {
                callee: "greeting".into()
            }
        );
    }

    #[test]
    fn test_numbers_display_like_script() {
        let cases = [
            (1e21, "1e+21"),
            (1.5e22, "1.5e+22"),
            (-1e21, "-1e+21"),
            (1e20, "100000000000000000000"),
            (1e-7, "1e-7"),
            (1.23e-18, "1.23e-18"),
            (0.000001, "0.000001"),
            (42.0, "42"),
            (-0.5, "-0.5"),
        ];
        for (n, expected) in cases {
            assert_eq!(Value::from(n).to_string(), expected);
        }
    }

    #[test]
    fn test_scope_over_shared_object_tracks_reads() {
        let outer = Scope::new(Object::new().with("user", Object::new().with("name", "ann")));
        let user = outer.get("user").unwrap().as_object().unwrap().clone();
        let inner = Scope::new(user);

        let (seen, cb) = recorder();
        let w = Watcher::new("name", &inner, cb).unwrap();
        assert_eq!(w.dependency_count(), 1);
        let (outer_seen, cb) = recorder();
        let _o = Watcher::new("user.name", &outer, cb).unwrap();

        inner.set("name", "bo").unwrap();
        assert_eq!(*seen.borrow(), ["ann", "bo"]);
        assert_eq!(*outer_seen.borrow(), ["ann", "bo"]);

        outer.set_path("user.name", "cy").unwrap();
        assert_eq!(*seen.borrow(), ["ann", "bo", "cy"]);
    }

    #[test]
    fn test_null_member_access_fails() {
        let scope = Scope::new(Object::new().with("nothing", Value::Null));
        assert_eq!(
            eval("nothing.field", &scope).unwrap_err(),
            Error::NullMember {
                property: "field".into()
            }
        );
        assert_eq!(
            eval("nothing.field.deeper", &scope).unwrap_err(),
            Error::NullMember {
                property: "field".into()
            }
        );
        let empty = Scope::new(Object::new().with("o", Object::new()));
        assert_eq!(
            eval("o.absent.deeper", &empty).unwrap_err(),
            Error::NullMember {
                property: "deeper".into()
            }
        );
    }

    #[test]
    fn test_writing_unknown_key_is_not_reactive() {
        let scope = Scope::new(Object::new());
        scope.set("later", 1).unwrap();
        assert!(!scope.object().is_reactive("later"));
        assert_eq!(eval("later", &scope).unwrap().to_string(), "1");
    }
}
