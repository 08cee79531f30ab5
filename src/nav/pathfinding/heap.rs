use super::types::PathNode;

/// Binary min-heap of arena indices ordered by `f`, then `h`.
///
/// Each node remembers its slot in `heap_pos` so a cheaper path can sift it
/// up in place instead of pushing a duplicate.
#[derive(Default, Debug, Clone)]
pub(crate) struct OpenHeap {
    items: Vec<u32>,
}

#[inline]
fn less(nodes: &[PathNode], a: u32, b: u32) -> bool {
    let (na, nb) = (&nodes[a as usize], &nodes[b as usize]);
    (na.f, na.h) < (nb.f, nb.h)
}

impl OpenHeap {
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, nodes: &mut [PathNode], idx: u32) {
        let pos = self.items.len();
        self.items.push(idx);
        nodes[idx as usize].heap_pos = pos as u32;
        self.sift_up(nodes, pos);
    }

    pub fn pop(&mut self, nodes: &mut [PathNode]) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        nodes[top as usize].heap_pos = u32::MAX;
        if !self.items.is_empty() {
            nodes[self.items[0] as usize].heap_pos = 0;
            self.sift_down(nodes, 0);
        }
        Some(top)
    }

    /// Restores heap order after `idx` had its `f` lowered.
    pub fn decrease_key(&mut self, nodes: &mut [PathNode], idx: u32) {
        let pos = nodes[idx as usize].heap_pos;
        if (pos as usize) < self.items.len() && self.items[pos as usize] == idx {
            self.sift_up(nodes, pos as usize);
        }
    }

    fn swap(&mut self, nodes: &mut [PathNode], a: usize, b: usize) {
        self.items.swap(a, b);
        nodes[self.items[a] as usize].heap_pos = a as u32;
        nodes[self.items[b] as usize].heap_pos = b as u32;
    }

    fn sift_up(&mut self, nodes: &mut [PathNode], mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !less(nodes, self.items[pos], self.items[parent]) {
                break;
            }
            self.swap(nodes, pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, nodes: &mut [PathNode], mut pos: usize) {
        let len = self.items.len();
        loop {
            let left = pos * 2 + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && less(nodes, self.items[left], self.items[smallest]) {
                smallest = left;
            }
            if right < len && less(nodes, self.items[right], self.items[smallest]) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(nodes, pos, smallest);
            pos = smallest;
        }
    }
}
