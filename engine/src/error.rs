use thiserror::Error;

use crate::layers::LayerId;
use crate::objects::NodeId;

/// Failures while reading a vector document handed over by the host.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("malformed document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),

    #[error("invalid viewBox: {0:?}")]
    InvalidViewBox(String),

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("unsupported transform: {0:?}")]
    UnsupportedTransform(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("failed to load document: {0}")]
    Load(#[from] LoadError),

    #[error("unknown layer: {0}")]
    UnknownLayer(LayerId),

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("cannot delete the last remaining layer")]
    LastLayer,

    #[error("a layer deletion is already awaiting confirmation")]
    DeletionPending,

    #[error("no layer deletion is awaiting confirmation")]
    NoPendingDeletion,

    #[error("{node} is on {layer}, but the selection is scoped to {selection_layer}")]
    CrossLayerSelection {
        node: NodeId,
        layer: LayerId,
        selection_layer: LayerId,
    },

    #[error("layer {0} is being renamed")]
    RenameInProgress(LayerId),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid history snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("invalid editor config: {0}")]
    Config(#[source] serde_json::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;
