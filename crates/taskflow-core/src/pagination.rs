//! Page-number pagination.
//!
//! Every list endpoint answers with `{ data: [...], meta: { total, page,
//! limit, totalPages } }`.

use serde::{Deserialize, Serialize};

use crate::exception::{Error, Result};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound for `limit`.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
	page: i64,
	limit: i64,
}

impl Default for PageQuery {
	fn default() -> Self {
		Self {
			page: 1,
			limit: DEFAULT_PAGE_SIZE,
		}
	}
}

impl PageQuery {
	/// Build a page request from optional query values.
	///
	/// Missing values fall back to page 1 and [`DEFAULT_PAGE_SIZE`]; a limit
	/// above [`MAX_PAGE_SIZE`] is clamped.
	///
	/// # Examples
	///
	/// ```
	/// use taskflow_core::pagination::PageQuery;
	///
	/// let query = PageQuery::new(Some(3), Some(10)).unwrap();
	/// assert_eq!(query.offset(), 20);
	///
	/// let defaults = PageQuery::new(None, None).unwrap();
	/// assert_eq!((defaults.page(), defaults.limit()), (1, 20));
	///
	/// assert!(PageQuery::new(Some(0), None).is_err());
	/// ```
	pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self> {
		let page = page.unwrap_or(1);
		let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

		let mut problems = Vec::new();
		if page < 1 {
			problems.push("page must not be less than 1".to_string());
		}
		if limit < 1 {
			problems.push("limit must not be less than 1".to_string());
		}
		if !problems.is_empty() {
			return Err(Error::Validation(problems));
		}

		Ok(Self {
			page,
			limit: limit.min(MAX_PAGE_SIZE),
		})
	}

	pub fn page(&self) -> i64 {
		self.page
	}

	pub fn limit(&self) -> i64 {
		self.limit
	}

	/// Number of rows to skip. Saturates for pages far past any table size.
	pub fn offset(&self) -> i64 {
		(self.page - 1).saturating_mul(self.limit)
	}
}

/// Raw `?page=&limit=` query values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
	pub page: Option<i64>,
	pub limit: Option<i64>,
}

impl PageParams {
	pub fn into_query(self) -> Result<PageQuery> {
		PageQuery::new(self.page, self.limit)
	}
}

/// Number of pages needed for `total` items.
///
/// # Examples
///
/// ```
/// use taskflow_core::pagination::total_pages;
///
/// assert_eq!(total_pages(0, 20), 0);
/// assert_eq!(total_pages(41, 20), 3);
/// ```
pub fn total_pages(total: i64, limit: i64) -> i64 {
	if limit <= 0 || total <= 0 {
		return 0;
	}
	(total + limit - 1) / limit
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
	pub total: i64,
	pub page: i64,
	pub limit: i64,
	pub total_pages: i64,
}

/// A page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
	pub data: Vec<T>,
	pub meta: PageMeta,
}

impl<T> Paginated<T> {
	pub fn new(data: Vec<T>, total: i64, query: PageQuery) -> Self {
		Self {
			data,
			meta: PageMeta {
				total,
				page: query.page,
				limit: query.limit,
				total_pages: total_pages(total, query.limit),
			},
		}
	}

	/// Page with no rows, used when the caller can see nothing at all.
	pub fn empty(query: PageQuery) -> Self {
		Self::new(Vec::new(), 0, query)
	}

	pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
		Paginated {
			data: self.data.into_iter().map(f).collect(),
			meta: self.meta,
		}
	}
}
