//! Page wire format.
//!
//! List endpoints answer with
//! `{ "pageResponse": { "pageNo": 0, "totalPages": 2, ... }, "<listField>": [...] }`
//! where the list field name depends on the resource.

use anyhow::{Result, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of a remote list, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_no: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_no: u32, total_pages: u32) -> Self {
        Self {
            items,
            page_no,
            total_pages,
        }
    }

    /// Whether the server has pages after this one.
    pub fn has_more(&self) -> bool {
        self.page_no + 1 < self.total_pages
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_no: self.page_no,
            total_pages: self.total_pages,
        }
    }
}

/// The `pageResponse` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub page_no: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total_elements: Option<u64>,
    pub total_pages: u32,
    #[serde(default)]
    pub last: Option<bool>,
}

/// Parses a list response body, reading items from `list_field`.
///
/// A missing or `null` list field is an empty page; the server omits it when
/// there is nothing to return.
pub fn parse_page<T: DeserializeOwned>(body: &[u8], list_field: &str) -> Result<Page<T>> {
    let mut value: Value = serde_json::from_slice(body)?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| anyhow!("expected a JSON object for a page response"))?;

    let envelope = object
        .remove("pageResponse")
        .ok_or_else(|| anyhow!("missing pageResponse"))?;
    let envelope: PageResponse = serde_json::from_value(envelope)?;

    let items: Vec<T> = match object.remove(list_field) {
        None | Some(Value::Null) => Vec::new(),
        Some(list) => serde_json::from_value(list)
            .map_err(|e| anyhow!("invalid items in {list_field}: {e}"))?,
    };

    Ok(Page::new(items, envelope.page_no, envelope.total_pages))
}
