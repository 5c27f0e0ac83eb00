//=========================================================================
// Change Requests
//=========================================================================

use std::any::Any;

use crate::core::scene::SceneParam;

//=== ChangeRequest =======================================================

/// A scene change built fluently and consumed by [`super::Director::change`].
///
/// ```
/// use aetheric_director::prelude::*;
///
/// let request = ChangeRequest::new("Shop")
///     .with_overlay("Loading")
///     .with_min_loading_time(1.5)
///     .with_param(42_u32);
///
/// assert_eq!(request.target(), "Shop");
/// assert_eq!(request.overlay(), Some("Loading"));
/// assert_eq!(request.min_loading_time(), Some(1.5));
/// ```
#[derive(Debug)]
pub struct ChangeRequest {
    target: String,
    overlay: Option<String>,
    min_loading_time: Option<f32>,
    param: Option<SceneParam>,
}

impl ChangeRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            overlay: None,
            min_loading_time: None,
            param: None,
        }
    }

    /// Shows the named loading overlay while the target loads.
    pub fn with_overlay(mut self, name: impl Into<String>) -> Self {
        self.overlay = Some(name.into());
        self
    }

    /// Floor on how long loading progress takes to reach 1.0, in seconds.
    ///
    /// Overrides the director's configured default. Negative values are
    /// treated as zero; infinite or NaN values are ignored in favour of the
    /// default.
    pub fn with_min_loading_time(mut self, seconds: f32) -> Self {
        self.min_loading_time = Some(seconds);
        self
    }

    /// Attaches a typed parameter for the incoming scene's handler.
    pub fn with_param<T: Any + Send>(mut self, value: T) -> Self {
        self.param = Some(SceneParam::new(value));
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    pub fn min_loading_time(&self) -> Option<f32> {
        self.min_loading_time
    }

    pub fn param(&self) -> Option<&SceneParam> {
        self.param.as_ref()
    }

    pub(super) fn into_parts(self) -> (String, Option<String>, Option<f32>, Option<SceneParam>) {
        (self.target, self.overlay, self.min_loading_time, self.param)
    }
}
