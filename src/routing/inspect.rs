//! JSON views of a dispatcher's route table, for operators and tooling.

use serde_json::{json, Value};

use crate::routing::dispatcher::{Dispatcher, Resolution};
use crate::routing::route::Route;

fn route_json(dispatcher: &Dispatcher, route: &Route) -> Value {
    json!({
        "method": route.method().as_str(),
        "path": route.path().as_str(),
        "domain": route.domain().map(|d| d.as_str()),
        "action": route.action(),
        "middleware": route.middleware(),
        "resolved": dispatcher.handlers().resolve_action(route.action()).is_some(),
    })
}

/// Effective routes in match order, plus the configured defaults.
pub fn list_routes(dispatcher: &Dispatcher) -> Value {
    let table = dispatcher.table();
    let routes: Vec<Value> = table.routes().map(|r| route_json(dispatcher, r)).collect();
    let defaults: Vec<Value> = table
        .domain_defaults()
        .map(|(pattern, action)| json!({ "domain": pattern.as_str(), "action": action }))
        .collect();

    json!({
        "routes": routes,
        "domain_defaults": defaults,
        "global_default": table.global_default(),
    })
}

pub fn describe(dispatcher: &Dispatcher, resolution: Resolution<'_>) -> Value {
    match resolution {
        Resolution::Route { route, params } => json!({
            "kind": "route",
            "route": route_json(dispatcher, route),
            "params": params,
        }),
        Resolution::Default { action, params } => json!({
            "kind": "default",
            "action": action,
            "params": params,
        }),
        Resolution::NotFound => json!({ "kind": "not_found" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Request;
    use crate::http::response;
    use crate::routing::{Handlers, RouteParams, RouteRegistry};
    use axum::http::StatusCode;

    fn dispatcher() -> Dispatcher {
        let mut registry = RouteRegistry::new();
        registry.set_default("home/index");
        registry.get("/about", "pages/about").unwrap();
        registry
            .domain("{tenant}.example.com", |r| {
                r.set_default("tenant/index");
                r.get("/user/{id}", "user/show")?.middleware(["rate_limit"]);
                Ok(())
            })
            .unwrap();

        let mut handlers = Handlers::new();
        handlers.action("user/show", |_: Request, _: RouteParams| async {
            response::text(StatusCode::OK, "ok")
        });
        Dispatcher::new(registry.freeze(), handlers)
    }

    #[test]
    fn test_list_routes_in_match_order() {
        let listing = list_routes(&dispatcher());

        assert_eq!(
            listing["routes"],
            json!([
                {
                    "method": "GET",
                    "path": "/user/{id}",
                    "domain": "{tenant}.example.com",
                    "action": "user/show",
                    "middleware": ["rate_limit"],
                    "resolved": true,
                },
                {
                    "method": "GET",
                    "path": "/about",
                    "domain": null,
                    "action": "pages/about",
                    "middleware": [],
                    "resolved": false,
                },
            ])
        );
        assert_eq!(
            listing["domain_defaults"],
            json!([{ "domain": "{tenant}.example.com", "action": "tenant/index" }])
        );
        assert_eq!(listing["global_default"], "home/index");
    }

    #[test]
    fn test_describe_each_resolution() {
        let dispatcher = dispatcher();

        let route = describe(&dispatcher, dispatcher.resolve("GET", "/user/7", "acme.example.com"));
        assert_eq!(route["kind"], "route");
        assert_eq!(route["route"]["action"], "user/show");

        let default = describe(&dispatcher, dispatcher.resolve("GET", "/", "acme.example.com"));
        assert_eq!(default["kind"], "default");
        assert_eq!(default["action"], "tenant/index");

        let missing = describe(&dispatcher, dispatcher.resolve("GET", "/nowhere", "example.org"));
        assert_eq!(missing, json!({ "kind": "not_found" }));
    }
}
