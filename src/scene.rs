//! Retained scene: the display list a host renders and hit-tests.
//!
//! The scene is a derived projection of the skeleton model. Objects are kept
//! back-to-front; the host draws them in order, applying any composite
//! transform that owns an object on top of the object's own geometry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::affine::Affine;
use crate::model::{DrawStyle, SkeletonId};
use crate::transform::Point;
use crate::viewport::Viewport;

/// Identifier of a scene object. Never reused within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

/// Visual marker for a placed keypoint, anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub skeleton: SkeletonId,
    pub label: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub style: DrawStyle,
    /// Only markers of editable skeletons can be selected and dragged
    pub selectable: bool,
}

impl Marker {
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Line between two marker centers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RigLine {
    pub skeleton: SkeletonId,
    pub from: String,
    pub to: String,
    pub start: Point,
    pub end: Point,
    pub color: String,
    pub width: f64,
}

impl RigLine {
    pub fn touches(&self, label: &str) -> bool {
        self.from == label || self.to == label
    }
}

/// The image being annotated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseImage {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SceneObjectKind {
    BaseImage(BaseImage),
    Marker(Marker),
    RigLine(RigLine),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub kind: SceneObjectKind,
}

impl SceneObject {
    /// Skeleton owning this object; `None` for the base image.
    pub fn skeleton(&self) -> Option<SkeletonId> {
        match &self.kind {
            SceneObjectKind::Marker(m) => Some(m.skeleton),
            SceneObjectKind::RigLine(l) => Some(l.skeleton),
            SceneObjectKind::BaseImage(_) => None,
        }
    }

    pub fn as_marker(&self) -> Option<&Marker> {
        match &self.kind {
            SceneObjectKind::Marker(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&RigLine> {
        match &self.kind {
            SceneObjectKind::RigLine(l) => Some(l),
            _ => None,
        }
    }
}

/// A set of scene objects moved and scaled together.
///
/// The members keep their own geometry; the host renders them through
/// `affine`. Dissolving the composite bakes the affine into the members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeTransform {
    pub skeleton: SkeletonId,
    pub members: Vec<ObjectId>,
    pub affine: Affine,
}

/// Pointer cursor requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Cursor {
    #[default]
    Default,
    Grabbing,
}

/// Display list plus canvas-level interaction state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    objects: Vec<SceneObject>,
    #[serde(skip)]
    next_id: u64,
    composites: Vec<CompositeTransform>,
    selection: Option<ObjectId>,
    marquee_selection: bool,
    cursor: Cursor,
    /// (skeleton, class) pairs whose checkmark indicator is shown
    checkmarks: BTreeSet<(SkeletonId, String)>,
    viewport: Viewport,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    /// Add an object on top of the stack.
    pub fn add(&mut self, kind: SceneObjectKind) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.push(SceneObject { id, kind });
        id
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn marker(&self, id: ObjectId) -> Option<&Marker> {
        self.get(id).and_then(SceneObject::as_marker)
    }

    pub fn marker_mut(&mut self, id: ObjectId) -> Option<&mut Marker> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .and_then(|o| match &mut o.kind {
                SceneObjectKind::Marker(m) => Some(m),
                _ => None,
            })
    }

    /// Remove every object matching `predicate`, dropping them from
    /// composites and the selection too. Returns how many were removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&SceneObject) -> bool) -> usize {
        let mut removed = Vec::new();
        self.objects.retain(|o| {
            if predicate(o) {
                removed.push(o.id);
                false
            } else {
                true
            }
        });
        if removed.is_empty() {
            return 0;
        }
        for composite in &mut self.composites {
            composite.members.retain(|id| !removed.contains(id));
        }
        self.composites.retain(|c| !c.members.is_empty());
        if self.selection.is_some_and(|s| removed.contains(&s)) {
            self.selection = None;
        }
        removed.len()
    }

    pub fn remove(&mut self, id: ObjectId) -> bool {
        self.remove_where(|o| o.id == id) > 0
    }

    pub fn markers(&self) -> impl Iterator<Item = (ObjectId, &Marker)> + '_ {
        self.objects
            .iter()
            .filter_map(|o| o.as_marker().map(|m| (o.id, m)))
    }

    pub fn lines(&self) -> impl Iterator<Item = (ObjectId, &RigLine)> + '_ {
        self.objects
            .iter()
            .filter_map(|o| o.as_line().map(|l| (o.id, l)))
    }

    /// The marker for a (skeleton, class) pair, if drawn.
    pub fn find_marker(&self, skeleton: SkeletonId, label: &str) -> Option<(ObjectId, &Marker)> {
        self.markers()
            .find(|(_, m)| m.skeleton == skeleton && m.label == label)
    }

    /// Ids of every object belonging to a skeleton, in stacking order.
    pub fn objects_for_skeleton(&self, skeleton: SkeletonId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.skeleton() == Some(skeleton))
            .map(|o| o.id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Z-order
    // ------------------------------------------------------------------

    /// Markers above everything else, base image at the very back. Relative
    /// order within each layer is preserved.
    pub fn adjust_z_order(&mut self) {
        self.objects.sort_by_key(|o| match o.kind {
            SceneObjectKind::BaseImage(_) => 0u8,
            SceneObjectKind::RigLine(_) => 1,
            SceneObjectKind::Marker(_) => 2,
        });
    }

    // ------------------------------------------------------------------
    // Composites
    // ------------------------------------------------------------------

    pub fn add_composite(&mut self, composite: CompositeTransform) {
        self.composites.push(composite);
    }

    pub fn composites(&self) -> &[CompositeTransform] {
        &self.composites
    }

    pub fn composite_for_skeleton_mut(
        &mut self,
        skeleton: SkeletonId,
    ) -> Option<&mut CompositeTransform> {
        self.composites.iter_mut().find(|c| c.skeleton == skeleton)
    }

    /// Composite containing an object.
    pub fn composite_of(&self, id: ObjectId) -> Option<&CompositeTransform> {
        self.composites.iter().find(|c| c.members.contains(&id))
    }

    /// Remove all composites, handing them to the caller to commit.
    pub fn take_composites(&mut self) -> Vec<CompositeTransform> {
        std::mem::take(&mut self.composites)
    }

    // ------------------------------------------------------------------
    // Selection, cursor, checkmarks, viewport
    // ------------------------------------------------------------------

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// Select an object; an unknown id clears the selection.
    pub fn select(&mut self, id: Option<ObjectId>) {
        self.selection = id.filter(|id| self.get(*id).is_some());
    }

    pub fn discard_selection(&mut self) {
        self.selection = None;
    }

    pub fn marquee_selection(&self) -> bool {
        self.marquee_selection
    }

    pub fn set_marquee_selection(&mut self, enabled: bool) {
        self.marquee_selection = enabled;
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    pub fn set_checkmark(&mut self, skeleton: SkeletonId, label: &str, shown: bool) {
        if shown {
            self.checkmarks.insert((skeleton, label.to_string()));
        } else {
            self.checkmarks.remove(&(skeleton, label.to_string()));
        }
    }

    pub fn has_checkmark(&self, skeleton: SkeletonId, label: &str) -> bool {
        self.checkmarks.contains(&(skeleton, label.to_string()))
    }

    /// Hide every checkmark of a skeleton, or of all skeletons.
    pub fn clear_checkmarks(&mut self, skeleton: Option<SkeletonId>) {
        match skeleton {
            Some(id) => self.checkmarks.retain(|(s, _)| *s != id),
            None => self.checkmarks.clear(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Serialize the scene for a host renderer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
