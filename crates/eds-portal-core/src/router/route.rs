use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

/// Name of the sign-in route
pub const LOGIN_ROUTE: &str = "login";

/// Query parameter carrying the path to return to after signing in
pub const REDIRECT_QUERY: &str = "redirect";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Protected,
}

/// A named destination. Every route is protected unless marked public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RouteDescriptor {
    pub name: String,
    /// Pattern with `:param` segments, e.g. `/customers/:id/edit`
    pub path: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl RouteDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            visibility: Visibility::Protected,
        }
    }

    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    fn param_count(&self) -> usize {
        self.segments().filter(|s| s.starts_with(':')).count()
    }

    /// Match a concrete path, returning the captured params
    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = self.segments().collect();
        let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, segment) in pattern.iter().zip(actual.iter()) {
            if let Some(param) = expected.strip_prefix(':') {
                params.insert(param.to_string(), segment.to_string());
            } else if expected != segment {
                return None;
            }
        }
        Some(params)
    }
}

/// Where a navigation is headed, by route name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NavigationTarget {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

impl NavigationTarget {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// A resolved position in the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Location {
    /// `None` when the path matches no route
    pub name: Option<String>,
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    /// Path plus query string, exactly as requested when resolved from a path
    pub full_path: String,
}

impl Location {
    /// Where the app sits before the first navigation
    pub fn start() -> Self {
        Self {
            name: None,
            path: "/".to_string(),
            params: BTreeMap::new(),
            query: BTreeMap::new(),
            full_path: "/".to_string(),
        }
    }

    fn build(
        name: Option<String>,
        path: String,
        params: BTreeMap<String, String>,
        query: BTreeMap<String, String>,
    ) -> Self {
        let full_path = if query.is_empty() {
            path.clone()
        } else {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter())
                .finish();
            format!("{}?{}", path, encoded)
        };
        Self {
            name,
            path,
            params,
            query,
            full_path,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Route {route} requires parameter {param}")]
    MissingParam { route: String, param: String },

    #[error("No route matches path: {0}")]
    NoMatch(String),

    #[error("Too many redirects while navigating to {0}")]
    RedirectLoop(String),
}

/// Static route configuration, immutable after startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// The enterprise data portal's routes. Only sign-in is public.
    pub fn portal() -> Self {
        Self::new(vec![
            RouteDescriptor::new(LOGIN_ROUTE, "/login").public(),
            RouteDescriptor::new("home", "/"),
            RouteDescriptor::new("customers", "/customers"),
            RouteDescriptor::new("new-customer", "/customers/new"),
            RouteDescriptor::new("edit-customer", "/customers/:id/edit"),
            RouteDescriptor::new("contracts", "/contracts"),
            RouteDescriptor::new("new-contract", "/contracts/new"),
            RouteDescriptor::new("new-quote", "/quotes/new"),
            RouteDescriptor::new("analytics", "/analytics"),
            RouteDescriptor::new("ai-analytics", "/ai-analytics"),
            RouteDescriptor::new("calendar", "/calendar"),
            RouteDescriptor::new("payments", "/payments"),
            RouteDescriptor::new("feedbacks", "/feedbacks"),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Visibility of a location; unnamed or unknown routes are protected.
    pub fn visibility(&self, location: &Location) -> Visibility {
        location
            .name
            .as_deref()
            .and_then(|name| self.get(name))
            .map(|r| r.visibility)
            .unwrap_or_default()
    }

    /// Resolve a concrete `path[?query]`. Static segments win over params.
    /// The requested string is kept as `full_path`; `query` is a lookup view.
    pub fn resolve(&self, full_path: &str) -> Result<Location, NavigationError> {
        let (path, raw_query) = match full_path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (full_path, ""),
        };
        let path = if path.is_empty() { "/" } else { path };

        let (route, params) = self
            .routes
            .iter()
            .filter_map(|route| route.matches(path).map(|params| (route, params)))
            .min_by_key(|(route, _)| route.param_count())
            .ok_or_else(|| NavigationError::NoMatch(full_path.to_string()))?;

        let query = form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .collect();
        let full_path = if full_path.starts_with('/') {
            full_path.to_string()
        } else {
            format!("/{}", full_path)
        };
        Ok(Location {
            name: Some(route.name.clone()),
            path: path.to_string(),
            params,
            query,
            full_path,
        })
    }

    /// Build the location a named target points at.
    pub fn location(&self, target: &NavigationTarget) -> Result<Location, NavigationError> {
        let route = self
            .get(&target.name)
            .ok_or_else(|| NavigationError::UnknownRoute(target.name.clone()))?;

        let mut segments = Vec::new();
        let mut params = BTreeMap::new();
        for segment in route.segments() {
            match segment.strip_prefix(':') {
                Some(param) => {
                    let value = target.params.get(param).ok_or_else(|| {
                        NavigationError::MissingParam {
                            route: route.name.clone(),
                            param: param.to_string(),
                        }
                    })?;
                    params.insert(param.to_string(), value.clone());
                    segments.push(value.clone());
                }
                None => segments.push(segment.to_string()),
            }
        }
        let path = format!("/{}", segments.join("/"));

        Ok(Location::build(
            Some(route.name.clone()),
            path,
            params,
            target.query.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_default_to_protected() {
        let table = RouteTable::portal();
        assert_eq!(table.get(LOGIN_ROUTE).unwrap().visibility, Visibility::Public);
        for route in table.routes().iter().filter(|r| r.name != LOGIN_ROUTE) {
            assert_eq!(route.visibility, Visibility::Protected, "{}", route.name);
        }

        let parsed: RouteDescriptor =
            serde_json::from_str(r#"{"name": "reports", "path": "/reports"}"#).unwrap();
        assert_eq!(parsed.visibility, Visibility::Protected);
    }

    #[test]
    fn test_resolve_static_and_param_routes() {
        let table = RouteTable::portal();

        let location = table.resolve("/customers").unwrap();
        assert!(location.is_named("customers"));
        assert_eq!(location.full_path, "/customers");

        let location = table.resolve("/customers/new").unwrap();
        assert!(location.is_named("new-customer"));

        let location = table.resolve("/customers/42/edit").unwrap();
        assert!(location.is_named("edit-customer"));
        assert_eq!(location.params.get("id").map(String::as_str), Some("42"));

        let location = table.resolve("/").unwrap();
        assert!(location.is_named("home"));
    }

    #[test]
    fn test_resolve_query() {
        let table = RouteTable::portal();
        let location = table.resolve("/login?redirect=%2Fanalytics").unwrap();
        assert!(location.is_named(LOGIN_ROUTE));
        assert_eq!(location.query.get(REDIRECT_QUERY).map(String::as_str), Some("/analytics"));
        assert_eq!(location.full_path, "/login?redirect=%2Fanalytics");
    }

    #[test]
    fn test_resolve_keeps_requested_query_verbatim() {
        let table = RouteTable::portal();
        let location = table.resolve("/customers?tag=b&tag=a&page=2").unwrap();
        assert!(location.is_named("customers"));
        assert_eq!(location.path, "/customers");
        assert_eq!(location.full_path, "/customers?tag=b&tag=a&page=2");
        assert_eq!(location.query.get("page").map(String::as_str), Some("2"));

        let location = table.resolve("?q=x y").unwrap();
        assert!(location.is_named("home"));
        assert_eq!(location.full_path, "/?q=x y");
    }

    #[test]
    fn test_resolve_unknown_path() {
        let table = RouteTable::portal();
        assert_eq!(
            table.resolve("/nowhere"),
            Err(NavigationError::NoMatch("/nowhere".to_string()))
        );
    }

    #[test]
    fn test_location_from_target() {
        let table = RouteTable::portal();
        let target = NavigationTarget::named("edit-customer").with_param("id", "7");
        let location = table.location(&target).unwrap();
        assert_eq!(location.full_path, "/customers/7/edit");

        let target = NavigationTarget::named(LOGIN_ROUTE).with_query(REDIRECT_QUERY, "/customers");
        let location = table.location(&target).unwrap();
        assert_eq!(location.full_path, "/login?redirect=%2Fcustomers");

        assert!(matches!(
            table.location(&NavigationTarget::named("edit-customer")),
            Err(NavigationError::MissingParam { .. })
        ));
        assert!(matches!(
            table.location(&NavigationTarget::named("missing")),
            Err(NavigationError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_unknown_location_is_protected() {
        let table = RouteTable::portal();
        assert_eq!(table.visibility(&Location::start()), Visibility::Protected);
    }
}
