//! Reporting of recoverable problems found while loading and rendering tiles.
//!
//! Problems with a single feature or style never abort a tile render. They are reported to a
//! [`Diagnostics`] sink that the caller injects into the loader and the renderer.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::loader::FeatureId;

/// Recoverable problem found while processing a tile.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Feature does not have a geometry or its coordinates cannot be read. The feature is skipped.
    MalformedFeature {
        /// Id of the feature, if it has one.
        id: Option<FeatureId>,
        /// Description of the problem.
        reason: String,
    },
    /// Geometry type is not supported. The feature is skipped.
    UnsupportedGeometry {
        /// Id of the feature, if it has one.
        id: Option<FeatureId>,
        /// Value of the geometry `type` member.
        geometry_type: String,
    },
    /// Classifier has no style configured for the feature. The feature is drawn with the error
    /// indicator style.
    MissingStyle {
        /// Class name the classifier produced for the feature.
        class: Arc<str>,
    },
    /// Resolved width or size is so small that the component is likely invisible.
    ImplausibleStyleValue {
        /// Style class the value belongs to.
        class: Arc<str>,
        /// Name of the style property.
        property: &'static str,
        /// Zoom level the value was resolved for.
        zoom: u32,
        /// Resolved value.
        value: f64,
    },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MalformedFeature { id, reason } => {
                write!(f, "malformed feature {}: {reason}", DisplayId(id))
            }
            Warning::UnsupportedGeometry { id, geometry_type } => write!(
                f,
                "unsupported geometry type {geometry_type:?} of feature {}",
                DisplayId(id)
            ),
            Warning::MissingStyle { class } => {
                write!(f, "no style configured for class {class}")
            }
            Warning::ImplausibleStyleValue {
                class,
                property,
                zoom,
                value,
            } => write!(
                f,
                "implausible value {value} of {property} for class {class} at zoom {zoom}"
            ),
        }
    }
}

struct DisplayId<'a>(&'a Option<FeatureId>);

impl Display for DisplayId<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "<no id>"),
        }
    }
}

/// Sink for warnings produced by the loader and the renderer.
pub trait Diagnostics {
    /// Reports a warning.
    fn warn(&mut self, warning: Warning);
}

/// Diagnostics sink writing every warning to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
    }
}

/// Collects warnings in memory, e.g. to show them to the user after a render.
impl Diagnostics for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        log::debug!("{warning}");
        self.push(warning);
    }
}
