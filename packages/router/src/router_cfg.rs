use serde::Deserialize;

/// Global configuration options for the router.
///
/// This implements [`Default`] and follows the builder pattern, so you can use it like this:
/// ```rust
/// # use stack_router::prelude::*;
/// let cfg = RouterConfig::default()
///     .max_redirects(4)
///     .rewrite_redirected_path(false);
/// # assert_eq!(cfg.max_redirects, 4);
/// ```
///
/// It can also be loaded from any serde format. Missing fields keep their defaults.
/// ```rust
/// # use stack_router::prelude::*;
/// let cfg: RouterConfig = serde_json::from_str(r#"{ "max_redirects": 2 }"#).unwrap();
/// assert_eq!(cfg, RouterConfig::default().max_redirects(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// How many redirects one navigation may follow before the router settles on the route it
    /// reached.
    pub max_redirects: usize,
    /// Whether to rewrite the driver's current path after a navigation was redirected.
    pub rewrite_redirected_path: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_redirects: 16,
            rewrite_redirected_path: true,
        }
    }
}

impl RouterConfig {
    /// Limit the number of redirects followed per navigation.
    ///
    /// Defaults to `16`.
    pub fn max_redirects(self, max_redirects: usize) -> Self {
        Self {
            max_redirects,
            ..self
        }
    }

    /// Set whether the router asks the driver to show the final path after a redirect.
    ///
    /// Defaults to `true`.
    pub fn rewrite_redirected_path(self, rewrite: bool) -> Self {
        Self {
            rewrite_redirected_path: rewrite,
            ..self
        }
    }
}
