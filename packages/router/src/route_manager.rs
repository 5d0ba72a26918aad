use std::{collections::HashMap, fmt, rc::Rc};

use crate::{
    error::RouteError,
    helpers::{normalize_pathname, parse_query, split_path, Params},
    path_tree::PathTree,
    route_definition::{MatchedRoute, RouteConfig},
};

/// The registry of every route the router knows about.
pub struct RouteManager<C> {
    tree: PathTree<Rc<RouteConfig<C>>>,
    names: HashMap<String, Rc<RouteConfig<C>>>,
    count: usize,
}

impl<C> Default for RouteManager<C> {
    fn default() -> Self {
        Self {
            tree: PathTree::new(),
            names: HashMap::new(),
            count: 0,
        }
    }
}

impl<C> RouteManager<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `routes`.
    pub fn with_routes(routes: impl IntoIterator<Item = RouteConfig<C>>) -> Self {
        let mut manager = Self::new();
        for route in routes {
            manager.register(route);
        }
        manager
    }

    /// Add a route. A later route with the same pattern or the same name takes precedence.
    pub fn register(&mut self, config: RouteConfig<C>) -> Rc<RouteConfig<C>> {
        let config = Rc::new(config);
        let pattern = normalize_pathname(&config.path);
        let segments: Vec<&str> = pattern.split('/').collect();
        self.tree.add_path(&segments, config.clone());
        if let Some(name) = &config.name {
            self.names.insert(name.clone(), config.clone());
        }
        self.count += 1;
        tracing::trace!("registered route \"/{pattern}\"");
        config
    }

    /// Find the route for `path`, which may include a query and a hash.
    ///
    /// ```rust
    /// # use stack_router::prelude::*;
    /// let mut routes = RouteManager::new();
    /// routes.register(RouteConfig::new("/user/:id", "user"));
    ///
    /// let matched = routes.match_path("/user/j%C3%BCrgen?tab=posts#top").unwrap();
    /// assert_eq!(matched.config.component, "user");
    /// assert_eq!(matched.params["id"], "jürgen");
    /// assert_eq!(matched.query["tab"], "posts");
    /// assert_eq!(matched.hash, "top");
    ///
    /// assert!(routes.match_path("/post/1").is_none());
    /// ```
    pub fn match_path(&self, path: &str) -> Option<MatchedRoute<C>> {
        let parts = split_path(path);
        let pathname = normalize_pathname(parts.pathname);
        let segments: Vec<&str> = pathname.split('/').collect();
        let found = self.tree.get_data_and_params_by_paths(&segments)?;

        let params = found
            .params
            .into_iter()
            .map(|(name, value)| {
                let decoded = urlencoding::decode(&value).map(|decoded| decoded.into_owned());
                match decoded {
                    Ok(decoded) => (name, decoded),
                    Err(err) => {
                        tracing::warn!("keeping undecodable parameter {name}={value}: {err}");
                        (name, value)
                    }
                }
            })
            .collect();

        Some(MatchedRoute {
            config: found.data.clone(),
            params,
            query: parse_query(parts.query),
            pathname,
            hash: parts.hash.to_string(),
        })
    }

    /// Build the pathname of the route registered as `name`, filling its parameters from
    /// `params`. Values are percent-encoded.
    ///
    /// ```rust
    /// # use stack_router::prelude::*;
    /// let mut routes = RouteManager::new();
    /// routes.register(RouteConfig::new("/user/:id/posts", ()).name("posts"));
    ///
    /// let mut params = Params::new();
    /// params.insert("id".into(), "a b".into());
    /// assert_eq!(routes.pathname_by_route_name("posts", &params).unwrap(), "/user/a%20b/posts");
    ///
    /// assert!(matches!(
    ///     routes.pathname_by_route_name("posts", &Params::new()),
    ///     Err(RouteError::MissingParam { .. })
    /// ));
    /// ```
    pub fn pathname_by_route_name(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        let config = self.names.get(name).ok_or_else(|| RouteError::UnknownName {
            name: name.to_string(),
        })?;

        let mut segments = Vec::new();
        for segment in normalize_pathname(&config.path).split('/') {
            match segment.strip_prefix(':') {
                Some(param) => {
                    let value = params.get(param).ok_or_else(|| RouteError::MissingParam {
                        name: name.to_string(),
                        param: param.to_string(),
                    })?;
                    segments.push(urlencoding::encode(value).into_owned());
                }
                None => segments.push(segment.to_string()),
            }
        }

        Ok(format!("/{}", segments.join("/")))
    }

    /// The route registered as `name`.
    pub fn route_by_name(&self, name: &str) -> Option<Rc<RouteConfig<C>>> {
        self.names.get(name).cloned()
    }

    /// The number of registrations, including ones that replaced an earlier route.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no route was registered yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<C> fmt::Debug for RouteManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names.keys().collect();
        names.sort();
        f.debug_struct("RouteManager")
            .field("names", &names)
            .field("len", &self.count)
            .finish_non_exhaustive()
    }
}
