//! Element handle collaborator.
//!
//! DOM matchers never resolve elements themselves. They receive something
//! implementing [`ElementHandle`] (a browser binding, or [`StaticElement`]
//! in tests) and read attributes, text, geometry and markup through it.
//! Every call may fail when the underlying element is gone.

use crate::result::{ExpectlyError, ExpectlyResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Element geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box of the given size at the origin
    #[must_use]
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Read access to a live element
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Attribute value, `None` when absent
    async fn get_attribute(&self, name: &str) -> ExpectlyResult<Option<String>>;

    /// Rendered text
    async fn inner_text(&self) -> ExpectlyResult<String>;

    /// Geometry, `None` when not rendered
    async fn bounding_box(&self) -> ExpectlyResult<Option<BoundingBox>>;

    /// Serialized child markup
    async fn inner_html(&self) -> ExpectlyResult<String>;
}

#[derive(Debug, Default)]
struct ElementState {
    attributes: BTreeMap<String, String>,
    text: String,
    html: String,
    bounding_box: Option<BoundingBox>,
    detached: bool,
    calls: Vec<String>,
}

/// In-memory element whose state can be changed while a matcher polls it
#[derive(Debug, Default)]
pub struct StaticElement {
    state: Mutex<ElementState>,
}

impl StaticElement {
    /// Empty element
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set an attribute
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: set the rendered text
    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Builder: set the inner markup
    #[must_use]
    pub fn with_html(self, html: &str) -> Self {
        self.lock().html = html.to_string();
        self
    }

    /// Builder: set the geometry
    #[must_use]
    pub fn with_bounding_box(self, bounding_box: BoundingBox) -> Self {
        self.lock().bounding_box = Some(bounding_box);
        self
    }

    /// Set or replace an attribute
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.lock().attributes.insert(name.to_string(), value.to_string());
    }

    /// Remove an attribute
    pub fn remove_attribute(&self, name: &str) {
        self.lock().attributes.remove(name);
    }

    /// Replace the rendered text
    pub fn set_text(&self, text: &str) {
        self.lock().text = text.to_string();
    }

    /// Make every later call fail as if the element left the document
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    /// Undo [`detach`](Self::detach)
    pub fn attach(&self) {
        self.lock().detached = false;
    }

    /// Calls made so far, e.g. `get_attribute:class`
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls made so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) -> ExpectlyResult<MutexGuard<'_, ElementState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.detached {
            return Err(ExpectlyError::collaborator("element is not attached to the document"));
        }
        Ok(state)
    }
}

#[async_trait]
impl ElementHandle for StaticElement {
    async fn get_attribute(&self, name: &str) -> ExpectlyResult<Option<String>> {
        let state = self.record(format!("get_attribute:{name}"))?;
        Ok(state.attributes.get(name).cloned())
    }

    async fn inner_text(&self) -> ExpectlyResult<String> {
        let state = self.record("inner_text".to_string())?;
        Ok(state.text.clone())
    }

    async fn bounding_box(&self) -> ExpectlyResult<Option<BoundingBox>> {
        let state = self.record("bounding_box".to_string())?;
        Ok(state.bounding_box)
    }

    async fn inner_html(&self) -> ExpectlyResult<String> {
        let state = self.record("inner_html".to_string())?;
        Ok(state.html.clone())
    }
}
