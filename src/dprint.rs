//! Indented textual traces of dataflow graphs.
//!
//! Each value node prints one header line,
//!
//! ```text
//! Value(<op type>):<slot>,	dtype=<dtype>,	shape=<shape>,	"<name>"
//! ```
//!
//! followed, one indentation level deeper, by the trace of every input of its
//! producing operation. A value node whose producers were already expanded
//! earlier in the same printer prints `...` instead.
use std::borrow::Cow;
use std::io::{Stdout, Write};
use crate::DprintError;
use crate::node::{CONST_OP_TYPE, CONSTANT_VALUE_ATTRIBUTE, GraphObject, OperationLike, TensorLike};
use crate::printer::Printer;
use crate::unbound::Unbound;

const REPEATED_SUBGRAPH: &str = "...";
const UNKNOWN_SHAPE: &str = "Unknown";

/// Prints the trace of `root` to standard output.
///
/// Traversal is recursive, so extremely deep graphs can exhaust the stack.
pub fn debug_print<'a>(root: impl Into<GraphObject<'a>>) -> Result<(), DprintError> {
    let mut printer: Printer<Stdout> = Printer::stdout();
    debug_print_to(root, &mut printer)
}

/// Prints the trace of `root` through `printer`.
///
/// Subgraphs recorded by earlier calls on the same printer are not expanded again.
pub fn debug_print_to<'a, W: Write>(root: impl Into<GraphObject<'a>>, printer: &mut Printer<W>) -> Result<(), DprintError> {
    let root = root.into();
    check_inspectable(&root)?;
    visit(root, printer)
}

/// Prints several roots in order through one printer.
///
/// Every root is checked before anything is written.
pub fn debug_print_all<'a, W: Write>(
    roots: impl IntoIterator<Item = GraphObject<'a>>,
    printer: &mut Printer<W>,
) -> Result<(), DprintError> {
    let roots: Vec<GraphObject<'a>> = roots.into_iter().collect();
    for root in &roots {
        check_inspectable(root)?;
    }
    for root in roots {
        visit(root, printer)?;
    }
    Ok(())
}

fn not_inspectable(tensor: &dyn TensorLike) -> DprintError {
    DprintError::GraphNotInspectable(tensor.name().to_string())
}

fn check_inspectable(obj: &GraphObject<'_>) -> Result<(), DprintError> {
    if let GraphObject::Tensor(tensor) = obj {
        if tensor.op().is_none() {
            return Err(not_inspectable(*tensor));
        }
    }
    Ok(())
}

/// Prints `obj` and, recursively, everything it depends on.
pub fn visit<W: Write>(obj: GraphObject<'_>, printer: &mut Printer<W>) -> Result<(), DprintError> {
    log::trace!("visiting {} node at depth {}", obj.kind(), printer.depth());
    match obj {
        GraphObject::Opaque(text) => {
            printer.println(&text)?;
            Ok(())
        }
        GraphObject::Tensor(tensor) => visit_tensor(tensor, printer),
        GraphObject::Operation(op) => visit_operation(op, printer),
    }
}

fn opaque(text: impl Into<Cow<'static, str>>) -> GraphObject<'static> {
    GraphObject::Opaque(text.into())
}

fn header(tensor: &dyn TensorLike, op: &Unbound<Box<dyn OperationLike + '_>>) -> String {
    let shape = match tensor.shape() {
        Ok(shape) => shape.to_string(),
        Err(err) => {
            log::trace!("shape unavailable: {}", err);
            UNKNOWN_SHAPE.to_string()
        }
    };
    let op_label = match op {
        Unbound::Resolved(op) => op.op_type().to_string(),
        Unbound::Unresolved(var) => var.to_string(),
    };
    let dtype = match tensor.dtype() {
        Some(Unbound::Resolved(dtype)) => dtype.name().to_string(),
        Some(Unbound::Unresolved(var)) => var.to_string(),
        None => "None".to_string(),
    };
    format!(
        "Value({}):{},\tdtype={},\tshape={},\t\"{}\"",
        op_label,
        tensor.value_index(),
        dtype,
        shape,
        tensor.name()
    )
}

fn visit_tensor<W: Write>(tensor: &dyn TensorLike, printer: &mut Printer<W>) -> Result<(), DprintError> {
    let op = tensor.op().ok_or_else(|| not_inspectable(tensor))?;
    visit(opaque(header(tensor, &op)), printer)?;

    let op = match op {
        Unbound::Resolved(op) => op,
        Unbound::Unresolved(var) => {
            log::debug!("producer of {} is unresolved ({})", tensor.name(), var);
            return Ok(());
        }
    };

    let indent = printer.options().indent.clone();
    match op.inputs() {
        Unbound::Unresolved(var) => {
            log::debug!("inputs of {} are unresolved ({})", tensor.name(), var);
            let mut p = printer.indented(indent);
            visit(opaque(var.to_string()), &mut *p)
        }
        Unbound::Resolved(inputs) if !inputs.is_empty() => {
            let mut p = printer.indented(indent);
            if p.mark_printed(tensor.identity()) {
                visit(GraphObject::Operation(&*op), &mut *p)
            } else {
                log::debug!("{} already expanded", tensor.name());
                visit(opaque(REPEATED_SUBGRAPH), &mut *p)
            }
        }
        Unbound::Resolved(_) if is_const(&*op) => {
            let mut p = printer.indented(indent);
            visit_constant(tensor, &*op, &mut *p)
        }
        Unbound::Resolved(_) => Ok(()),
    }
}

fn is_const(op: &dyn OperationLike) -> bool {
    matches!(op.op_type(), Unbound::Resolved(op_type) if op_type == CONST_OP_TYPE)
}

fn visit_constant<W: Write>(tensor: &dyn TensorLike, op: &dyn OperationLike, printer: &mut Printer<W>) -> Result<(), DprintError> {
    let value = match tensor.evaluate() {
        Some(value) => Cow::Owned(value?),
        None => match op.attributes() {
            Unbound::Unresolved(var) => {
                log::debug!("attributes of {} are unresolved ({})", op.name(), var);
                return visit(opaque(var.to_string()), printer);
            }
            Unbound::Resolved(attributes) => {
                Cow::Borrowed(attributes.require_tensor(&op.name().to_string(), CONSTANT_VALUE_ATTRIBUTE)?)
            }
        },
    };
    let options = printer.options().array_format_options(printer.indentation());
    visit(opaque(value.format_with(&options)), printer)
}

fn visit_operation<W: Write>(op: &dyn OperationLike, printer: &mut Printer<W>) -> Result<(), DprintError> {
    match op.inputs() {
        Unbound::Resolved(inputs) => {
            for input in &inputs {
                visit(GraphObject::Tensor(&**input), printer)?;
            }
            Ok(())
        }
        Unbound::Unresolved(var) => visit(opaque(var.to_string()), printer),
    }
}
