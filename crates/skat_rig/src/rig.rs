//! Keypoint classes, rig connections and the rig bounding box.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::RigError;

/// A named keypoint role shared by every skeleton instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointClass {
    /// Unique label, also the key used in annotations
    pub label: String,
    /// Fixed color; palette lookup by index when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Authored x position in the rig's natural layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Authored y position in the rig's natural layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl KeypointClass {
    /// Create a class with just a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
            x: None,
            y: None,
        }
    }

    /// Builder: set the fixed color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder: set the authored position.
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Authored position, or the origin when none was authored.
    pub fn layout_position(&self) -> (f64, f64) {
        (self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }
}

/// Check that class labels are unique.
pub(crate) fn check_unique_labels<'a>(
    labels: impl IntoIterator<Item = &'a str>,
) -> Result<(), RigError> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(RigError::DuplicateLabel {
                label: label.to_string(),
            });
        }
    }
    Ok(())
}

/// One line of the rig: two keypoint class labels and an optional color.
///
/// Encoded in JSON as `["a", "b"]` or `["a", "b", "#color" | null]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<String>>", into = "Vec<Option<String>>")]
pub struct RigConnection {
    /// First endpoint label
    pub from: String,
    /// Second endpoint label
    pub to: String,
    /// Line color overriding the skeleton color
    pub color: Option<String>,
}

impl RigConnection {
    /// Create a connection without a color override.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            color: None,
        }
    }

    /// Builder: set the override color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Whether either endpoint is the given class.
    pub fn touches(&self, label: &str) -> bool {
        self.from == label || self.to == label
    }
}

impl TryFrom<Vec<Option<String>>> for RigConnection {
    type Error = RigError;

    fn try_from(parts: Vec<Option<String>>) -> Result<Self, Self::Error> {
        if !(2..=3).contains(&parts.len()) {
            return Err(RigError::invalid_connection(format!(
                "expected 2 or 3 elements, found {}",
                parts.len()
            )));
        }
        let mut parts = parts.into_iter();
        let from = parts
            .next()
            .flatten()
            .ok_or_else(|| RigError::invalid_connection("first label is null"))?;
        let to = parts
            .next()
            .flatten()
            .ok_or_else(|| RigError::invalid_connection("second label is null"))?;
        let color = parts.next().flatten();
        Ok(Self { from, to, color })
    }
}

impl From<RigConnection> for Vec<Option<String>> {
    fn from(connection: RigConnection) -> Self {
        vec![Some(connection.from), Some(connection.to), connection.color]
    }
}

/// The fixed topology connecting keypoint classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkeletonRig {
    connections: Vec<RigConnection>,
}

impl SkeletonRig {
    /// Create a rig from a list of connections.
    pub fn new(connections: Vec<RigConnection>) -> Self {
        Self { connections }
    }

    /// All connections, in authored order.
    pub fn connections(&self) -> &[RigConnection] {
        &self.connections
    }

    /// Connections with the given class as an endpoint.
    pub fn touching<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a RigConnection> + 'a {
        self.connections.iter().filter(move |c| c.touches(label))
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the rig has no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Validate the rig against the keypoint classes: labels unique, every
    /// endpoint a known class.
    pub fn validate(&self, classes: &[KeypointClass]) -> Result<(), RigError> {
        check_unique_labels(classes.iter().map(|c| c.label.as_str()))?;
        let known: HashSet<&str> = classes.iter().map(|c| c.label.as_str()).collect();
        for connection in &self.connections {
            for label in [&connection.from, &connection.to] {
                if !known.contains(label.as_str()) {
                    return Err(RigError::unknown_label(label.as_str()));
                }
            }
        }
        log::debug!(
            "Validated rig: {} connections over {} classes",
            self.connections.len(),
            classes.len()
        );
        Ok(())
    }
}

/// Extent of the rig's natural layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    /// Create a bounding box from its edges.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Smallest box containing all points, or `None` for no points.
    pub fn enclosing(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Self::new(x, y, x, y),
                Some(b) => Self::new(b.left.min(x), b.top.min(y), b.right.max(x), b.bottom.max(y)),
            })
        })
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}
