//! This modules defines the common functionality for paging data.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, Uri, header::HOST};
use serde::Serialize;

use crate::{Error, validation::RawFields};

/// The query parameter that selects a page, starting from 1.
pub const PAGE_QUERY_PARAM: &str = "page";
/// The query parameter that overrides the number of items per page.
pub const PAGE_SIZE_QUERY_PARAM: &str = "page_size";
/// The page number that always refers to the final page.
const LAST_PAGE: &str = "last";

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 5,
            max_page_size: 1000,
        }
    }
}

impl PaginationConfig {
    /// The page size requested in `fields`.
    ///
    /// Missing, non-integer or non-positive sizes fall back to the default
    /// page size, and sizes above the maximum are clamped to it.
    pub fn page_size(&self, fields: &RawFields) -> u64 {
        fields
            .get(PAGE_SIZE_QUERY_PARAM)
            .and_then(|size| size.trim().parse::<u64>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(self.max_page_size))
            .unwrap_or(self.default_page_size)
    }
}

/// One page of items cut from a larger list.
#[derive(Debug, PartialEq)]
pub struct PageSlice<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// The total number of items across all pages.
    pub count: u64,
    /// The number of this page, starting from 1.
    pub number: u64,
    /// The number of pages. Always at least 1, even with no items.
    pub page_count: u64,
}

/// Cut the page `requested_page` of `page_size` items out of `items`.
///
/// No page number selects the first page, and "last" selects the final page.
///
/// # Errors
///
/// Returns [Error::InvalidPage] if `requested_page` is not a positive integer
/// or is past the final page. The first page is valid even when there are no items.
pub fn paginate<T>(
    items: Vec<T>,
    requested_page: Option<&str>,
    page_size: u64,
) -> Result<PageSlice<T>, Error> {
    let count = items.len() as u64;
    let page_count = count.div_ceil(page_size.max(1)).max(1);

    let number = match requested_page.map(str::trim) {
        None => 1,
        Some(LAST_PAGE) => page_count,
        Some(page) => page.parse::<u64>().map_err(|_| Error::InvalidPage)?,
    };

    if number == 0 || number > page_count {
        return Err(Error::InvalidPage);
    }

    let offset = (number - 1) * page_size;
    let items = items
        .into_iter()
        .skip(offset as usize)
        .take(page_size as usize)
        .collect();

    Ok(PageSlice {
        items,
        count,
        number,
        page_count,
    })
}

/// A page of results with links to its neighbours, ready to send to a client.
#[derive(Debug, PartialEq, Serialize)]
pub struct Page<T> {
    /// The total number of items across all pages.
    pub count: u64,
    /// The URL of the next page, if there is one.
    pub next: Option<String>,
    /// The URL of the previous page, if there is one.
    pub previous: Option<String>,
    /// The items on this page.
    pub results: Vec<T>,
}

impl<T> PageSlice<T> {
    /// Attach next and previous page links built from the request's URL.
    ///
    /// `query` is the request's query string as pairs. Links keep every
    /// parameter except `page`, sorted by name. The link to the first page
    /// leaves out `page` entirely.
    pub fn into_page(self, request_url: &str, query: &[(String, String)]) -> Page<T> {
        let next = (self.number < self.page_count)
            .then(|| page_url(request_url, query, Some(self.number + 1)));
        let previous = (self.number > 1).then(|| {
            let previous_page = self.number - 1;
            page_url(request_url, query, (previous_page > 1).then_some(previous_page))
        });

        Page {
            count: self.count,
            next,
            previous,
            results: self.items,
        }
    }
}

/// The URL of the request without its query string.
///
/// The URL is absolute when the authority is known from the request line or
/// the `Host` header, otherwise it is just the path.
pub fn request_url(uri: &Uri, headers: &HeaderMap) -> String {
    let scheme = uri.scheme_str().unwrap_or("http");
    let host = uri
        .authority()
        .map(|authority| authority.as_str())
        .or_else(|| headers.get(HOST).and_then(|host| host.to_str().ok()));

    match host {
        Some(host) => format!("{scheme}://{host}{}", uri.path()),
        None => uri.path().to_owned(),
    }
}

fn page_url(request_url: &str, query: &[(String, String)], page: Option<u64>) -> String {
    let mut params: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for (key, value) in query {
        if key != PAGE_QUERY_PARAM {
            params.entry(key.as_str()).or_default().push(value.clone());
        }
    }

    if let Some(page) = page {
        params.insert(PAGE_QUERY_PARAM, vec![page.to_string()]);
    }

    let pairs: Vec<(&str, &str)> = params
        .iter()
        .flat_map(|(key, values)| values.iter().map(move |value| (*key, value.as_str())))
        .collect();

    match serde_urlencoded::to_string(&pairs) {
        Ok(query) if !query.is_empty() => format!("{request_url}?{query}"),
        Ok(_) => request_url.to_owned(),
        Err(error) => {
            tracing::error!("could not encode pagination query {pairs:?}: {error}");
            request_url.to_owned()
        }
    }
}

#[cfg(test)]
mod paginate_tests {
    use crate::{
        Error,
        pagination::{PageSlice, paginate},
    };

    #[test]
    fn first_page_by_default() {
        let got = paginate((1..=12).collect(), None, 5);

        assert_eq!(
            got,
            Ok(PageSlice {
                items: vec![1, 2, 3, 4, 5],
                count: 12,
                number: 1,
                page_count: 3,
            })
        );
    }

    #[test]
    fn last_page_may_be_partial() {
        let got = paginate((1..=12).collect::<Vec<i32>>(), Some("3"), 5).unwrap();

        assert_eq!(got.items, [11, 12]);
        assert_eq!(got.number, 3);
    }

    #[test]
    fn last_keyword_selects_final_page() {
        let got = paginate((1..=12).collect::<Vec<i32>>(), Some("last"), 5).unwrap();

        assert_eq!(got.number, 3);
        assert_eq!(got.items, [11, 12]);
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let got = paginate(Vec::<i32>::new(), Some("1"), 5);

        assert_eq!(
            got,
            Ok(PageSlice {
                items: vec![],
                count: 0,
                number: 1,
                page_count: 1,
            })
        );
    }

    #[test]
    fn rejects_invalid_page_numbers() {
        for page in ["0", "-1", "4", "two", ""] {
            let got = paginate((1..=12).collect::<Vec<i32>>(), Some(page), 5);

            assert_eq!(got, Err(Error::InvalidPage), "page {page:?}");
        }
    }
}
