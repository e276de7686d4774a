//! Pointer-driven geometric edits: move, resize, rotate, z-order,
//! duplicate, link/group, background reposition and ruler guides.
//!
//! Continuous gestures (move/resize/rotate while dragging) mutate the
//! live document without committing; the surface calls
//! [`EditorSession::commit`] once on mouse-up so a whole drag is one
//! undo step. One-shot actions (delete, duplicate, z-order, group,
//! reset rotation) commit themselves.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, ElementKind, LinkId, MIN_ELEMENT_SIZE};
use crate::error::{DesignError, DesignResult};
use crate::guide::{Guide, GuideAxis, GuideId, RULER_BAND};
use crate::session::EditorSession;

/// Pointer distance from a corner handle within which a drag resizes;
/// beyond it (but still on the handle) the drag rotates instead.
pub const HANDLE_GRAB_RADIUS: f32 = 10.0;

/// Distance of the rotation handle above the element's top-center.
pub const ROTATION_HANDLE_OFFSET: f32 = 30.0;

/// Positional offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: f32 = 10.0;

/// Maximum distance at which a moved element snaps to a guide.
pub const GUIDE_SNAP_DISTANCE: f32 = 5.0;

const BACKGROUND_SCALE_MIN: f32 = 0.1;
const BACKGROUND_SCALE_MAX: f32 = 10.0;

/// The eight resize handles around an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    /// Top-left corner.
    TopLeft,
    /// Top edge midpoint.
    Top,
    /// Top-right corner.
    TopRight,
    /// Right edge midpoint.
    Right,
    /// Bottom-right corner.
    BottomRight,
    /// Bottom edge midpoint.
    Bottom,
    /// Bottom-left corner.
    BottomLeft,
    /// Left edge midpoint.
    Left,
}

impl ResizeHandle {
    /// Whether this is a corner handle (corner handles double as
    /// rotation affordances).
    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomRight | Self::BottomLeft
        )
    }
}

/// What a drag that started on a corner handle means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleGesture {
    /// Drag adjusts width/height/x/y.
    Resize,
    /// Drag rotates around the element center.
    Rotate,
}

impl HandleGesture {
    /// Classify a corner-handle drag by the pointer's distance from the
    /// handle center, in surface pixels at 1:1 zoom.
    ///
    /// Within [`HANDLE_GRAB_RADIUS`] the single visual handle resizes;
    /// outside that radius it rotates, so one handle serves both
    /// gestures. Edge handles always resize.
    #[must_use]
    pub fn classify(handle: ResizeHandle, distance_from_handle: f32) -> Self {
        if handle.is_corner() && distance_from_handle > HANDLE_GRAB_RADIUS {
            Self::Rotate
        } else {
            Self::Resize
        }
    }
}

/// A position/size rectangle being edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Apply a per-handle resize delta with the minimum-size floor.
///
/// Handles on the left/top edges move `x`/`y` as they resize; when a
/// dimension clamps to [`MIN_ELEMENT_SIZE`] the opposite edge stays
/// pinned rather than drifting.
#[must_use]
pub fn resize_rect(rect: Rect, handle: ResizeHandle, dx: f32, dy: f32) -> Rect {
    let mut out = rect;

    let adjust_left = |out: &mut Rect| {
        let right = rect.x + rect.width;
        out.width = (rect.width - dx).max(MIN_ELEMENT_SIZE);
        out.x = right - out.width;
    };
    let adjust_right = |out: &mut Rect| {
        out.width = (rect.width + dx).max(MIN_ELEMENT_SIZE);
    };
    let adjust_top = |out: &mut Rect| {
        let bottom = rect.y + rect.height;
        out.height = (rect.height - dy).max(MIN_ELEMENT_SIZE);
        out.y = bottom - out.height;
    };
    let adjust_bottom = |out: &mut Rect| {
        out.height = (rect.height + dy).max(MIN_ELEMENT_SIZE);
    };

    match handle {
        ResizeHandle::TopLeft => {
            adjust_left(&mut out);
            adjust_top(&mut out);
        }
        ResizeHandle::Top => adjust_top(&mut out),
        ResizeHandle::TopRight => {
            adjust_right(&mut out);
            adjust_top(&mut out);
        }
        ResizeHandle::Right => adjust_right(&mut out),
        ResizeHandle::BottomRight => {
            adjust_right(&mut out);
            adjust_bottom(&mut out);
        }
        ResizeHandle::Bottom => adjust_bottom(&mut out),
        ResizeHandle::BottomLeft => {
            adjust_left(&mut out);
            adjust_bottom(&mut out);
        }
        ResizeHandle::Left => adjust_left(&mut out),
    }
    out
}

/// Rotation (degrees) for a pointer dragged around an element center.
///
/// Zero when the pointer sits directly above the center, which is where
/// the rotation handle rests at [`ROTATION_HANDLE_OFFSET`].
#[must_use]
pub fn rotation_from_pointer(center: (f32, f32), pointer_x: f32, pointer_y: f32) -> f32 {
    let dx = pointer_x - center.0;
    let dy = pointer_y - center.1;
    dy.atan2(dx).to_degrees() + 90.0
}

impl EditorSession {
    /// Error unless the element exists on the current page and is
    /// editable under the current template-edit-mode policy.
    fn ensure_editable(&self, id: ElementId) -> DesignResult<()> {
        let element = self
            .document
            .current_page()
            .element(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        if self.template_edit_mode && !element.is_template_field() {
            return Err(DesignError::ElementLocked(id.to_string()));
        }
        Ok(())
    }

    /// Add an element to the current page, stacked on top, selected,
    /// and committed as one undo step.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let page = self.document.current_page_mut();
        element.z_index = page.max_z_index().map_or(0, |z| z + 1);
        let id = element.id;
        page.elements.push(element);
        self.select(id);
        self.commit();
        tracing::debug!("Added element {id}");
        id
    }

    /// Delete an element and commit.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing, or
    /// [`DesignError::ElementLocked`] in template edit mode.
    pub fn delete_element(&mut self, id: ElementId) -> DesignResult<Element> {
        self.ensure_editable(id)?;
        let page = self.document.current_page_mut();
        let index = page
            .element_index(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        let removed = page.elements.remove(index);
        self.selection.ids.retain(|&e| e != id);
        if self.selection.primary == Some(id) {
            self.selection.primary = self.selection.ids.first().copied();
        }
        self.commit();
        Ok(removed)
    }

    /// Move an element by a drag delta (continuous; commit on mouse-up).
    ///
    /// Elements sharing the moved element's link follow it. The dragged
    /// element's edges snap to nearby session guides.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing, or
    /// [`DesignError::ElementLocked`] in template edit mode.
    pub fn move_element(&mut self, id: ElementId, dx: f32, dy: f32) -> DesignResult<()> {
        self.ensure_editable(id)?;

        let (mut new_x, mut new_y, link_id) = {
            let element = self
                .document
                .current_page()
                .element(id)
                .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
            (element.x + dx, element.y + dy, element.link_id)
        };

        let (snapped_x, snapped_y) = self.snap_to_guides(new_x, new_y);
        let (snap_dx, snap_dy) = (snapped_x - new_x, snapped_y - new_y);
        new_x = snapped_x;
        new_y = snapped_y;

        let page = self.document.current_page_mut();
        for element in &mut page.elements {
            if element.id == id {
                element.x = new_x;
                element.y = new_y;
            } else if link_id.is_some() && element.link_id == link_id {
                element.x += dx + snap_dx;
                element.y += dy + snap_dy;
            }
        }
        Ok(())
    }

    /// Move every selected element by a drag delta (continuous).
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementLocked`] if any selected element is
    /// locked in template edit mode.
    pub fn move_selected(&mut self, dx: f32, dy: f32) -> DesignResult<()> {
        for id in self.selection.ids.clone() {
            self.ensure_editable(id)?;
        }
        let ids = self.selection.ids.clone();
        let page = self.document.current_page_mut();
        for element in &mut page.elements {
            if ids.contains(&element.id) {
                element.x += dx;
                element.y += dy;
            }
        }
        Ok(())
    }

    /// Resize an element via one of the eight handles (continuous).
    ///
    /// Width and height clamp to [`MIN_ELEMENT_SIZE`]; a resize below
    /// the floor clamps instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing, or
    /// [`DesignError::ElementLocked`] in template edit mode.
    pub fn resize_element(
        &mut self,
        id: ElementId,
        handle: ResizeHandle,
        dx: f32,
        dy: f32,
    ) -> DesignResult<()> {
        self.ensure_editable(id)?;
        let element = self
            .document
            .current_page_mut()
            .element_mut(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        let rect = Rect {
            x: element.x,
            y: element.y,
            width: element.width,
            height: element.height,
        };
        let resized = resize_rect(rect, handle, dx, dy);
        element.x = resized.x;
        element.y = resized.y;
        element.width = resized.width;
        element.height = resized.height;
        Ok(())
    }

    /// Set an element's rotation (continuous; unbounded degrees).
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing, or
    /// [`DesignError::ElementLocked`] in template edit mode.
    pub fn rotate_element(&mut self, id: ElementId, degrees: f32) -> DesignResult<()> {
        self.ensure_editable(id)?;
        let element = self
            .document
            .current_page_mut()
            .element_mut(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        element.rotation = degrees;
        Ok(())
    }

    /// Rotate an element toward a pointer position (continuous), as
    /// driven by the rotation handle above the element's top-center.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing, or
    /// [`DesignError::ElementLocked`] in template edit mode.
    pub fn rotate_element_to_pointer(
        &mut self,
        id: ElementId,
        pointer_x: f32,
        pointer_y: f32,
    ) -> DesignResult<()> {
        let center = {
            let element = self
                .document
                .current_page()
                .element(id)
                .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
            element.center()
        };
        self.rotate_element(id, rotation_from_pointer(center, pointer_x, pointer_y))
    }

    /// Set rotation to exactly 0 and commit.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing, or
    /// [`DesignError::ElementLocked`] in template edit mode.
    pub fn reset_rotation(&mut self, id: ElementId) -> DesignResult<()> {
        self.rotate_element(id, 0.0)?;
        self.commit();
        Ok(())
    }

    /// Clone an element with a new id, a z-index above the original and
    /// a small positional offset; selects the copy and commits.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing.
    pub fn duplicate_element(&mut self, id: ElementId) -> DesignResult<ElementId> {
        let page = self.document.current_page_mut();
        let original = page
            .element(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;

        let mut copy = original.clone();
        copy.id = ElementId::new();
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.z_index = page.max_z_index().map_or(0, |z| z + 1);
        let copy_id = copy.id;
        page.elements.push(copy);
        self.select(copy_id);
        self.commit();
        Ok(copy_id)
    }

    /// Assign a z-index strictly greater than the page maximum; commits.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing.
    pub fn bring_to_front(&mut self, id: ElementId) -> DesignResult<()> {
        let page = self.document.current_page_mut();
        let top = page.max_z_index().unwrap_or(0);
        let element = page
            .element_mut(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        element.z_index = top + 1;
        self.commit();
        Ok(())
    }

    /// Assign a z-index strictly less than the page minimum; commits.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing.
    pub fn send_to_back(&mut self, id: ElementId) -> DesignResult<()> {
        let page = self.document.current_page_mut();
        let bottom = page.min_z_index().unwrap_or(0);
        let element = page
            .element_mut(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        element.z_index = bottom - 1;
        self.commit();
        Ok(())
    }

    /// Swap z-index with the next element in paint order; commits if
    /// anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing.
    pub fn bring_forward(&mut self, id: ElementId) -> DesignResult<()> {
        self.swap_paint_order(id, true)
    }

    /// Swap z-index with the previous element in paint order; commits if
    /// anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing.
    pub fn send_backward(&mut self, id: ElementId) -> DesignResult<()> {
        self.swap_paint_order(id, false)
    }

    fn swap_paint_order(&mut self, id: ElementId, forward: bool) -> DesignResult<()> {
        let page = self.document.current_page_mut();
        let order: Vec<(ElementId, i32)> = page
            .elements_by_paint_order()
            .iter()
            .map(|e| (e.id, e.z_index))
            .collect();
        let pos = order
            .iter()
            .position(|(e, _)| *e == id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;

        let neighbor = if forward {
            if pos + 1 >= order.len() {
                return Ok(());
            }
            pos + 1
        } else {
            if pos == 0 {
                return Ok(());
            }
            pos - 1
        };

        let (self_z, neighbor_z) = (order[pos].1, order[neighbor].1);
        let neighbor_id = order[neighbor].0;
        // Equal z-indexes would make the swap a no-op; nudge apart.
        let (new_self, new_neighbor) = if self_z == neighbor_z {
            if forward {
                (neighbor_z + 1, self_z)
            } else {
                (neighbor_z - 1, self_z)
            }
        } else {
            (neighbor_z, self_z)
        };

        for element in &mut page.elements {
            if element.id == id {
                element.z_index = new_self;
            } else if element.id == neighbor_id {
                element.z_index = new_neighbor;
            }
        }
        self.commit();
        Ok(())
    }

    /// Link the selected elements so they move together while keeping
    /// independent identity and properties; commits.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] with fewer than two
    /// elements selected.
    pub fn link_selected(&mut self) -> DesignResult<LinkId> {
        if self.selection.len() < 2 {
            return Err(DesignError::InvalidOperation(
                "Linking requires at least two selected elements".to_string(),
            ));
        }
        let link = LinkId::new();
        let ids = self.selection.ids.clone();
        let page = self.document.current_page_mut();
        for element in &mut page.elements {
            if ids.contains(&element.id) {
                element.link_id = Some(link);
            }
        }
        self.commit();
        Ok(link)
    }

    /// Remove link membership from the selected elements; commits.
    pub fn unlink_selected(&mut self) {
        let ids = self.selection.ids.clone();
        let page = self.document.current_page_mut();
        for element in &mut page.elements {
            if ids.contains(&element.id) {
                element.link_id = None;
            }
        }
        self.commit();
    }

    /// Merge the selected elements into a single group element that owns
    /// them; selects the group and commits.
    ///
    /// Children are rebased to coordinates relative to the group origin
    /// and keep their ids, so ungrouping restores them exactly.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] with fewer than two
    /// elements selected.
    pub fn group_selected(&mut self) -> DesignResult<ElementId> {
        if self.selection.len() < 2 {
            return Err(DesignError::InvalidOperation(
                "Grouping requires at least two selected elements".to_string(),
            ));
        }
        let ids = self.selection.ids.clone();
        let page = self.document.current_page_mut();

        let mut members: Vec<Element> = Vec::with_capacity(ids.len());
        let mut remaining: Vec<Element> = Vec::with_capacity(page.elements.len());
        for element in page.elements.drain(..) {
            if ids.contains(&element.id) {
                members.push(element);
            } else {
                remaining.push(element);
            }
        }
        page.elements = remaining;

        let min_x = members.iter().map(|e| e.x).fold(f32::INFINITY, f32::min);
        let min_y = members.iter().map(|e| e.y).fold(f32::INFINITY, f32::min);
        let max_x = members
            .iter()
            .map(|e| e.x + e.width)
            .fold(f32::NEG_INFINITY, f32::max);
        let max_y = members
            .iter()
            .map(|e| e.y + e.height)
            .fold(f32::NEG_INFINITY, f32::max);
        let top_z = members.iter().map(|e| e.z_index).max().unwrap_or(0);

        members.sort_by_key(|e| e.z_index);
        for member in &mut members {
            member.x -= min_x;
            member.y -= min_y;
        }

        let group = Element::new(ElementKind::Group { children: members })
            .with_geometry(min_x, min_y, max_x - min_x, max_y - min_y)
            .with_z_index(top_z);
        let group_id = group.id;
        page.elements.push(group);
        self.select(group_id);
        self.commit();
        tracing::debug!("Grouped {} elements into {group_id}", ids.len());
        Ok(group_id)
    }

    /// Dissolve a group, restoring its children to the page with their
    /// original ids and absolute positions; selects them and commits.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the id is missing, or
    /// [`DesignError::InvalidOperation`] if the element is not a group.
    pub fn ungroup(&mut self, id: ElementId) -> DesignResult<Vec<ElementId>> {
        let page = self.document.current_page_mut();
        let index = page
            .element_index(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        let ElementKind::Group { .. } = page.elements[index].kind else {
            return Err(DesignError::InvalidOperation(format!(
                "Element {id} is not a group"
            )));
        };

        let group = page.elements.remove(index);
        let (origin_x, origin_y) = (group.x, group.y);
        let ElementKind::Group { children } = group.kind else {
            unreachable!("kind checked above");
        };

        let mut restored = Vec::with_capacity(children.len());
        for mut child in children {
            child.x += origin_x;
            child.y += origin_y;
            restored.push(child.id);
            page.elements.push(child);
        }

        self.selection.primary = restored.first().copied();
        self.selection.ids.clone_from(&restored);
        self.commit();
        Ok(restored)
    }

    /// Enter background reposition mode (double-click on the page
    /// background). Drags then move the background image and the wheel
    /// scales it, until [`EditorSession::exit_background_reposition`].
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] if the current page has
    /// no background image.
    pub fn enter_background_reposition(&mut self) -> DesignResult<()> {
        if self.document.current_page().details.background.image.is_none() {
            return Err(DesignError::InvalidOperation(
                "Page has no background image to reposition".to_string(),
            ));
        }
        self.background_reposition = true;
        Ok(())
    }

    /// Offset the background image by a drag delta (continuous).
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] outside reposition mode.
    pub fn drag_background(&mut self, dx: f32, dy: f32) -> DesignResult<()> {
        if !self.background_reposition {
            return Err(DesignError::InvalidOperation(
                "Not in background reposition mode".to_string(),
            ));
        }
        if let Some(image) = self
            .document
            .current_page_mut()
            .details
            .background
            .image
            .as_mut()
        {
            image.offset_x += dx;
            image.offset_y += dy;
        }
        Ok(())
    }

    /// Scale the background image by a wheel delta (continuous).
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] outside reposition mode.
    pub fn scale_background(&mut self, delta: f32) -> DesignResult<()> {
        if !self.background_reposition {
            return Err(DesignError::InvalidOperation(
                "Not in background reposition mode".to_string(),
            ));
        }
        if let Some(image) = self
            .document
            .current_page_mut()
            .details
            .background
            .image
            .as_mut()
        {
            image.scale = (image.scale + delta).clamp(BACKGROUND_SCALE_MIN, BACKGROUND_SCALE_MAX);
        }
        Ok(())
    }

    /// Leave background reposition mode and commit the adjustment.
    pub fn exit_background_reposition(&mut self) {
        if self.background_reposition {
            self.background_reposition = false;
            self.commit();
        }
    }

    /// Create a ruler guide. Guides are view state and not committed.
    pub fn add_guide(&mut self, axis: GuideAxis, position: f32) -> GuideId {
        let guide = Guide::new(axis, position);
        let id = guide.id;
        self.guides.push(guide);
        id
    }

    /// Drag a guide to a new coordinate.
    ///
    /// Dragging into the ruler band deletes the guide; returns whether
    /// the guide still exists.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::GuideNotFound`] if the id is missing.
    pub fn move_guide(&mut self, id: GuideId, position: f32) -> DesignResult<bool> {
        let index = self
            .guides
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| DesignError::GuideNotFound(id.to_string()))?;
        if position < RULER_BAND {
            self.guides.remove(index);
            tracing::debug!("Guide {id} dragged into ruler band, deleted");
            return Ok(false);
        }
        self.guides[index].position = position;
        Ok(true)
    }

    /// Delete a guide explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::GuideNotFound`] if the id is missing.
    pub fn remove_guide(&mut self, id: GuideId) -> DesignResult<()> {
        let index = self
            .guides
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| DesignError::GuideNotFound(id.to_string()))?;
        self.guides.remove(index);
        Ok(())
    }

    /// Snap a candidate top-left position to nearby guides.
    fn snap_to_guides(&self, x: f32, y: f32) -> (f32, f32) {
        let mut out = (x, y);
        for guide in &self.guides {
            match guide.axis {
                GuideAxis::Vertical => {
                    if (guide.position - x).abs() <= GUIDE_SNAP_DISTANCE {
                        out.0 = guide.position;
                    }
                }
                GuideAxis::Horizontal => {
                    if (guide.position - y).abs() <= GUIDE_SNAP_DISTANCE {
                        out.1 = guide.position;
                    }
                }
            }
        }
        out
    }
}
