use serde_json::json;
use trellis_core::{Method, Object, Scope, Value};
use trellis_devtools::{Inspector, describe_watchers, render_html};
use trellis_dom::Node;

fn scope() -> Scope {
    Scope::new(
        Object::new()
            .with("name", "world")
            .with("visits", 0)
            .with("profile", json!({ "city": "Lisbon", "tags": ["new"] }))
            .with(
                "visit",
                Method::new(|this, _| {
                    let n = this.get("visits").unwrap_or_default().to_number();
                    this.set("visits", n + 1.0)?;
                    Ok(Value::Null)
                }),
            ),
    )
}

fn app() -> (Node, Node, Node) {
    let name = Node::element("input").attr("s-model", "name");
    let button = Node::element("button")
        .attr("@click", "visit")
        .with_children(vec![Node::text("visit")]);
    let root = Node::element("main").with_children(vec![
        Node::text("\n  "),
        Node::comment(" greeter "),
        Node::element("h1").with_children(vec![Node::text("Hello, {{ name }}!")]),
        name.clone(),
        Node::element("p").with_children(vec![Node::text(
            "{{ name }} from {{ profile.city }} visited {{ visits }} time{{ visits === 1 ? '' : 's' }}",
        )]),
        Node::element("small").attr("s-text", "name.length + ' chars'"),
        button.clone(),
        Node::text("\n"),
    ]);
    (root, name, button)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let scope = scope();
    let (root, name, button) = app();

    let mut inspector = Inspector::new();
    inspector.hud.toggle_verbose();
    inspector.compile(&root, &scope)?;
    println!("{}", render_html(&root));

    name.input("Ada")?;
    button.fire("click")?;
    println!("{}", render_html(&root));

    scope.set_path("profile.city", "Porto")?;
    button.fire("click")?;
    println!("{}", render_html(&root));

    if let Some(compiler) = inspector.compiler() {
        log::info!("watchers:\n{}", describe_watchers(compiler));
    }
    println!("{}", inspector.overlay());
    if let Some(metrics) = &inspector.hud.metrics {
        println!("{}", metrics.to_json());
    }
    Ok(())
}
