use kurbo::{Point, Rect};

use crate::error::{EditorError, EditorResult};
use crate::geometry::ViewBox;
use crate::layers::{Layer, LayerId};
use crate::objects::{Node, NodeId};

/// Root of the scene graph: the view rectangle and the ordered layers,
/// bottom-most first. At least one layer always exists.
#[derive(Clone, Debug)]
pub struct Document {
    pub view: ViewBox,
    pub(crate) layers: Vec<Layer>,
    pub(crate) active: LayerId,
    next_layer: u32,
    next_node: u32,
}

impl Document {
    pub fn new(view: ViewBox) -> Self {
        let mut doc = Document {
            view,
            layers: Vec::new(),
            active: LayerId(0),
            next_layer: 1,
            next_node: 1,
        };
        doc.add_layer(None);
        doc
    }

    /// Document without any layer, used while parsing a loaded file.
    pub(crate) fn bare(view: ViewBox) -> Self {
        Document { view, layers: Vec::new(), active: LayerId(0), next_layer: 1, next_node: 1 }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn active_layer_id(&self) -> LayerId {
        self.active
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub(crate) fn alloc_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Appends a layer above all others and makes it active. The default
    /// name counter is never rewound, even after deletions.
    pub fn add_layer(&mut self, name: Option<&str>) -> LayerId {
        let n = self.next_layer;
        self.next_layer += 1;
        let id = LayerId(n);
        let name = name.map(str::to_string).unwrap_or_else(|| format!("Layer {}", n));
        self.layers.push(Layer::new(id, name));
        self.active = id;
        id
    }

    pub(crate) fn set_active(&mut self, id: LayerId) -> bool {
        if self.layer(id).is_some() {
            self.active = id;
            true
        } else {
            false
        }
    }

    /// Removes a layer with its elements and activates the neighbour that
    /// now occupies its index (or the new top-most one).
    pub fn remove_layer(&mut self, id: LayerId) -> EditorResult<Layer> {
        let index = self.layer_index(id).ok_or(EditorError::UnknownLayer(id))?;
        if self.layers.len() <= 1 {
            return Err(EditorError::LastLayer);
        }
        let removed = self.layers.remove(index);
        let next = index.min(self.layers.len() - 1);
        self.active = self.layers[next].id;
        Ok(removed)
    }

    /// Swaps a layer with its neighbour. `Up` moves it towards the top.
    pub fn move_layer(&mut self, id: LayerId, up: bool) -> bool {
        let Some(index) = self.layer_index(id) else { return false };
        let target = if up {
            if index + 1 >= self.layers.len() { return false; }
            index + 1
        } else {
            if index == 0 { return false; }
            index - 1
        };
        self.layers.swap(index, target);
        true
    }

    /// Appends a node to the active layer. Should the active layer have
    /// vanished, the top-most layer takes over, or a fresh one is created.
    pub fn add_node_to_active_layer(&mut self, node: Node) -> NodeId {
        let id = node.id();
        if self.layer(self.active).is_none() {
            match self.layers.last() {
                Some(top) => self.active = top.id,
                None => {
                    log::warn!("document had no layer; recreating one");
                    self.add_layer(None);
                }
            }
        }
        let active = self.active;
        if let Some(layer) = self.layer_mut(active) {
            layer.nodes.push(node);
        }
        id
    }

    /// Layer and index of the top-level node that is or wraps `id`.
    pub fn locate(&self, id: NodeId) -> Option<(LayerId, usize)> {
        self.layers.iter().find_map(|layer| {
            layer.nodes.iter().position(|n| n.owns(id)).map(|i| (layer.id, i))
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        let (layer, index) = self.locate(id)?;
        self.layer(layer).map(|l| &l.nodes[index])
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let (layer, index) = self.locate(id)?;
        self.layer_mut(layer).map(|l| &mut l.nodes[index])
    }

    pub fn layer_of(&self, id: NodeId) -> Option<LayerId> {
        self.locate(id).map(|(layer, _)| layer)
    }

    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let (layer, index) = self.locate(id)?;
        self.layer_mut(layer).map(|l| l.nodes.remove(index))
    }

    /// Returns the wrapper around `id`, wrapping it first if needed.
    pub fn ensure_wrapper(&mut self, id: NodeId) -> Option<NodeId> {
        let (layer, index) = self.locate(id)?;
        if let Some(node) = self.layer(layer).map(|l| &l.nodes[index]) {
            if node.is_wrapper() {
                return Some(node.id());
            }
        }
        let wrapper_id = self.alloc_node_id();
        let layer = self.layer_mut(layer)?;
        let node = layer.nodes.remove(index);
        layer.nodes.insert(index, node.wrap(wrapper_id));
        Some(wrapper_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&Layer, &Node)> {
        self.layers.iter().flat_map(|layer| layer.nodes.iter().map(move |n| (layer, n)))
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.layers.iter_mut().flat_map(|layer| layer.nodes.iter_mut())
    }

    pub fn node_count(&self) -> usize {
        self.layers.iter().map(|l| l.nodes.len()).sum()
    }

    /// Topmost node under `p`, skipping hidden layers. `slop` widens every
    /// box so thin lines stay grabbable.
    pub fn hit_test(&self, p: Point, slop: f64) -> Option<NodeId> {
        self.layers
            .iter()
            .rev()
            .filter(|layer| layer.visible)
            .flat_map(|layer| layer.nodes.iter().rev())
            .find(|node| {
                node.bounds()
                    .map(|b| b.inflate(slop, slop).contains(p))
                    .unwrap_or(false)
            })
            .map(Node::id)
    }

    /// Moves each node to the top (`front`) or bottom of its own layer,
    /// keeping their relative order.
    pub fn restack(&mut self, ids: &[NodeId], front: bool) {
        for layer in &mut self.layers {
            let (picked, rest): (Vec<Node>, Vec<Node>) =
                layer.nodes.drain(..).partition(|n| ids.iter().any(|id| n.owns(*id)));
            layer.nodes = if front {
                rest.into_iter().chain(picked).collect()
            } else {
                picked.into_iter().chain(rest).collect()
            };
        }
    }

    pub fn bounds_of(&self, ids: &[NodeId]) -> Vec<Rect> {
        ids.iter().filter_map(|id| self.node(*id)).filter_map(Node::bounds).collect()
    }

    /// Serialized layers used as a history entry. Id counters stay out of
    /// it, so restored states never reuse an id.
    pub fn snapshot(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(&self.layers)?)
    }

    /// Like `snapshot`, with the nodes owning any of `skip` left out.
    pub fn snapshot_without(&self, skip: &[NodeId]) -> EditorResult<String> {
        if skip.is_empty() {
            return self.snapshot();
        }
        let layers: Vec<Layer> = self
            .layers
            .iter()
            .map(|layer| Layer {
                id: layer.id,
                name: layer.name.clone(),
                visible: layer.visible,
                locked: layer.locked,
                nodes: layer.nodes.iter().filter(|n| !skip.iter().any(|id| n.owns(*id))).cloned().collect(),
            })
            .collect();
        Ok(serde_json::to_string(&layers)?)
    }

    pub fn restore(&mut self, snapshot: &str) -> EditorResult<()> {
        let layers: Vec<Layer> = serde_json::from_str(snapshot)?;
        if layers.is_empty() {
            return Err(EditorError::LastLayer);
        }
        self.layers = layers;
        if self.layer(self.active).is_none() {
            self.active = self.layers[self.layers.len() - 1].id;
        }
        Ok(())
    }

    /// Keeps counters ahead of every id present, e.g. after loading.
    pub(crate) fn sync_counters(&mut self) {
        let max_layer = self.layers.iter().map(|l| l.id.0).max().unwrap_or(0);
        self.next_layer = self.next_layer.max(max_layer + 1);
        let max_node = self
            .layers
            .iter()
            .flat_map(|l| l.nodes.iter())
            .map(|n| match n {
                Node::Element(e) => e.id.0,
                Node::Wrapper(w) => w.id.0.max(w.child.id.0),
            })
            .max()
            .unwrap_or(0);
        self.next_node = self.next_node.max(max_node + 1);
    }
}
