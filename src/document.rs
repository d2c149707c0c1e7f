use crate::element::{Shape, ShapeId};

/// Insertion-ordered list of committed shapes.
///
/// The list is the undo state: undo pops the tail, clear empties it. There is
/// no redo.
#[derive(Debug, Clone, Default)]
pub struct Document {
    shapes: Vec<Shape>,
}

impl Document {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn last(&self) -> Option<&Shape> {
        self.shapes.last()
    }

    /// Remove the most recent shape, if any.
    pub fn pop(&mut self) -> Option<Shape> {
        self.shapes.pop()
    }

    /// Remove everything. Returns how many shapes were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.shapes.len();
        self.shapes.clear();
        count
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id() == id)
    }

    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.id() == id)
    }

    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|shape| shape.id() == id)?;
        Some(self.shapes.remove(index))
    }

    /// Swap a shape for a transformed copy carrying the same id.
    pub fn replace(&mut self, shape: Shape) -> bool {
        match self.get_mut(shape.id()) {
            Some(slot) => {
                *slot = shape;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use egui::{Color32, Pos2};

    fn dot(x: f32) -> Shape {
        factory::stroke(crate::element::ToolKind::Pen, Pos2::new(x, 0.0), Color32::RED, 2.0)
    }

    #[test]
    fn pop_takes_from_tail() {
        let mut doc = Document::new();
        doc.push(dot(1.0));
        let last = dot(2.0);
        doc.push(last.clone());
        assert_eq!(doc.pop().as_ref().map(Shape::id), Some(last.id()));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn remove_by_id_keeps_order() {
        let mut doc = Document::new();
        let shapes: Vec<_> = (0..3).map(|i| dot(i as f32)).collect();
        for shape in &shapes {
            doc.push(shape.clone());
        }
        doc.remove(shapes[1].id()).unwrap();
        let ids: Vec<_> = doc.shapes().iter().map(Shape::id).collect();
        assert_eq!(ids, vec![shapes[0].id(), shapes[2].id()]);
        assert!(doc.remove(shapes[1].id()).is_none());
    }

    #[test]
    fn replace_unknown_id_is_rejected() {
        let mut doc = Document::new();
        assert!(!doc.replace(dot(0.0)));
    }
}
