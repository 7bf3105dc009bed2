pub mod array_format;
pub mod attributes;
pub mod dprint;
pub mod dtype;
pub mod graph;
pub mod meta;
pub mod node;
pub mod numeric_tensor;
pub mod printer;
pub mod shape;
pub mod unbound;

pub use dprint::{debug_print, debug_print_all, debug_print_to, visit};
pub use graph::{EagerTensor, Graph, GraphError, GraphMutator, OutputSpec};
pub use meta::{MetaOp, MetaTensor};
pub use node::{GraphObject, NodeIdentity, OperationLike, TensorLike};
pub use printer::{Indent, IndentGuard, PrintOptions, Printer};
pub use unbound::{LogicVar, Unbound, VarResolver};

#[derive(Debug, thiserror::Error)]
pub enum DprintError {
    #[error(
        "Producing operation of \"{0}\" is not available; the object must come from a fully materialized graph \
         (recreate it outside of deferred/eager execution)"
    )]
    GraphNotInspectable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
}
