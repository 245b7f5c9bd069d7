//! Path-pattern routing.
//!
//! Patterns are `/`-separated segments where `{name}` captures one segment:
//!
//! ```
//! use taskflow_http::PathPattern;
//!
//! let pattern = PathPattern::parse("/api/tasks/{id}/assign/{user_id}");
//! let params = pattern.extract("/api/tasks/t1/assign/u2").unwrap();
//! assert_eq!(params["id"], "t1");
//! assert_eq!(params["user_id"], "u2");
//! assert!(pattern.extract("/api/tasks/t1").is_none());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::{Method, StatusCode};
use serde_json::json;
use taskflow_core::exception::{Error, Result, now_rfc3339};

use crate::{Handler, Request, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param(String),
}

/// Compiled route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
	segments: Vec<Segment>,
}

impl PathPattern {
	pub fn parse(pattern: &str) -> Self {
		let segments = split_path(pattern)
			.map(|segment| {
				match segment
					.strip_prefix('{')
					.and_then(|rest| rest.strip_suffix('}'))
				{
					Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
					_ => Segment::Literal(segment.to_string()),
				}
			})
			.collect();
		Self { segments }
	}

	/// Captured parameters when `path` matches this pattern.
	pub fn extract(&self, path: &str) -> Option<HashMap<String, String>> {
		let parts: Vec<&str> = split_path(path).collect();
		if parts.len() != self.segments.len() {
			return None;
		}

		let mut params = HashMap::new();
		for (segment, part) in self.segments.iter().zip(parts) {
			match segment {
				Segment::Literal(literal) if literal == part => {}
				Segment::Literal(_) => return None,
				Segment::Param(name) => {
					params.insert(name.clone(), part.to_string());
				}
			}
		}
		Some(params)
	}

	/// Literal segments count; more specific patterns win ties.
	fn specificity(&self) -> usize {
		self.segments
			.iter()
			.filter(|s| matches!(s, Segment::Literal(_)))
			.count()
	}

	fn prefixed(&self, prefix: &PathPattern) -> PathPattern {
		let mut segments = prefix.segments.clone();
		segments.extend(self.segments.iter().cloned());
		PathPattern { segments }
	}
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
	path.split('/').filter(|segment| !segment.is_empty())
}

struct Route {
	method: Method,
	pattern: PathPattern,
	handler: Arc<dyn Handler>,
}

/// Method + path dispatcher.
///
/// Unknown paths yield [`Error::NotFound`]; a known path with the wrong
/// method yields `405 Method Not Allowed`.
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn route(mut self, method: Method, path: &str, handler: impl Handler + 'static) -> Self {
		self.routes.push(Route {
			method,
			pattern: PathPattern::parse(path),
			handler: Arc::new(handler),
		});
		self
	}

	pub fn get(self, path: &str, handler: impl Handler + 'static) -> Self {
		self.route(Method::GET, path, handler)
	}

	pub fn post(self, path: &str, handler: impl Handler + 'static) -> Self {
		self.route(Method::POST, path, handler)
	}

	pub fn patch(self, path: &str, handler: impl Handler + 'static) -> Self {
		self.route(Method::PATCH, path, handler)
	}

	pub fn delete(self, path: &str, handler: impl Handler + 'static) -> Self {
		self.route(Method::DELETE, path, handler)
	}

	/// Mount every route of `other` under `prefix`.
	pub fn include(mut self, prefix: &str, other: Router) -> Self {
		let prefix = PathPattern::parse(prefix);
		self.routes.extend(other.routes.into_iter().map(|route| Route {
			method: route.method,
			pattern: route.pattern.prefixed(&prefix),
			handler: route.handler,
		}));
		self
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let path = request.path().to_string();

		let mut path_matched = false;
		let mut best: Option<(&Route, HashMap<String, String>)> = None;
		for route in &self.routes {
			let Some(params) = route.pattern.extract(&path) else {
				continue;
			};
			path_matched = true;
			if route.method != request.method {
				continue;
			}
			let better = best
				.as_ref()
				.is_none_or(|(current, _)| route.pattern.specificity() > current.pattern.specificity());
			if better {
				best = Some((route, params));
			}
		}

		match best {
			Some((route, params)) => {
				for (key, value) in params {
					request.set_path_param(key, value);
				}
				route.handler.handle(request).await
			}
			None if path_matched => Response::new(StatusCode::METHOD_NOT_ALLOWED).with_json(&json!({
				"statusCode": 405,
				"message": format!("Cannot {} {}", request.method, path),
				"error": "Method Not Allowed",
				"timestamp": now_rfc3339(),
				"path": path,
			})),
			None => Err(Error::NotFound(format!("Cannot {} {}", request.method, path))),
		}
	}
}
