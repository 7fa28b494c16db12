use crate::compile::resolve::{CompileCtx, resolve_destination, resolve_variable};
use crate::expression::ast::{
    Atom, BinaryOp, Condition, Expr, Program, Segment, Sentence, UnaryOp,
};
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::graph::builder::{Extrapolation, GraphBuilder, Keyframe, Value};
use crate::graph::plug::{NodeHandle, Plug};
use crate::graph::primitives::{
    NodeKind, clamp, euler_to_quat, mult_double_linear, multiply_divide, plus_minus_average,
    ramp_curve,
};

/// What an expression lowers to: a literal to write, or a plug to connect from.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(f64),
    Plug(Plug),
}

/// Tree-walking code generator for one compilation unit.
///
/// Every primitive node it creates is remembered so the driver can roll the
/// unit back when a later step fails.
pub(crate) struct CodeGen<'g, 'c, G: GraphBuilder + ?Sized> {
    graph: &'g mut G,
    ctx: CompileCtx<'c>,
    created: Vec<NodeHandle>,
}

impl<'g, 'c, G: GraphBuilder + ?Sized> CodeGen<'g, 'c, G> {
    pub(crate) fn new(graph: &'g mut G, ctx: CompileCtx<'c>) -> Self {
        Self {
            graph,
            ctx,
            created: Vec::new(),
        }
    }

    /// Nodes created so far, in creation order.
    pub(crate) fn into_created(self) -> Vec<NodeHandle> {
        self.created
    }

    pub(crate) fn compile_program(&mut self, program: &Program) -> ConvertResult<()> {
        // Conditions have no lowering; refuse them before touching the graph.
        if let Some(cond) = program.segments.iter().find_map(|s| match s {
            Segment::Condition(c) => Some(c),
            Segment::Sentence(_) => None,
        }) {
            return self.compile_condition(cond);
        }
        for segment in &program.segments {
            match segment {
                Segment::Sentence(s) => self.compile_sentence(s)?,
                Segment::Condition(c) => self.compile_condition(c)?,
            }
        }
        Ok(())
    }

    fn compile_condition(&mut self, _cond: &Condition) -> ConvertResult<()> {
        Err(ConvertError::unsupported(
            "if/else conditions cannot be expressed as primitive nodes",
        ))
    }

    pub(crate) fn compile_sentence(&mut self, sentence: &Sentence) -> ConvertResult<()> {
        let dest = resolve_destination(&sentence.target, &self.ctx, &*self.graph)?;
        let source = self.lower_expr(&sentence.value)?;

        if self.graph.is_locked(&dest)? {
            tracing::debug!(plug = %dest, "unlocking destination");
            self.graph.set_locked(&dest, false)?;
        }
        match source {
            Operand::Constant(v) => {
                self.graph.disconnect(&dest)?;
                self.graph.set_attribute(&dest, Value::Double(v))?;
            }
            Operand::Plug(src) => self.graph.connect(&src, &dest, true)?,
        }
        Ok(())
    }

    pub(crate) fn lower_expr(&mut self, expr: &Expr) -> ConvertResult<Operand> {
        match expr {
            Expr::Atom(Atom::Number(v)) => Ok(Operand::Constant(*v)),
            Expr::Atom(Atom::Variable(path)) => {
                Ok(Operand::Plug(resolve_variable(path, &self.ctx)?))
            }
            Expr::Brackets(inner) => self.lower_expr(inner),
            Expr::Unary { op, expr } => {
                let operand = self.lower_expr(expr)?;
                match (op, operand) {
                    (UnaryOp::Pos, operand) => Ok(operand),
                    (UnaryOp::Neg, Operand::Constant(v)) => Ok(Operand::Constant(-v)),
                    (UnaryOp::Neg, operand) => {
                        self.multiply_divide(operand, Operand::Constant(-1.0), false)
                    }
                }
            }
            Expr::Binary { op, left, right } => self.lower_binary(*op, left, right),
            Expr::Call { func, args } => self.lower_call(func, args),
        }
    }

    fn lower_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> ConvertResult<Operand> {
        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            return Err(comparison_outside_condition(op));
        }
        let a = self.lower_expr(left)?;
        let b = self.lower_expr(right)?;
        match op {
            BinaryOp::Mul => self.multiply_divide(a, b, false),
            BinaryOp::Div => self.multiply_divide(a, b, true),
            BinaryOp::Add => self.plus_minus(a, b, false),
            BinaryOp::Sub => self.plus_minus(a, b, true),
            BinaryOp::Mod => self.modulo(a, b),
            BinaryOp::Eq | BinaryOp::Ne => Err(comparison_outside_condition(op)),
        }
    }

    fn lower_call(&mut self, func: &str, args: &[Expr]) -> ConvertResult<Operand> {
        let arity = match func {
            "min" | "max" => 2,
            "sin" => 1,
            other => return Err(ConvertError::UnknownFunction(other.to_owned())),
        };
        if args.len() != arity {
            return Err(ConvertError::structural(format!(
                "{func}() takes {arity} argument(s), got {}",
                args.len()
            )));
        }

        let mut operands = Vec::with_capacity(args.len());
        for a in args {
            operands.push(self.lower_expr(a)?);
        }
        match (func, operands.as_slice()) {
            ("min", [value, bound]) => self.bounded(value.clone(), bound.clone(), true),
            ("max", [value, bound]) => self.bounded(value.clone(), bound.clone(), false),
            ("sin", [angle]) => self.sine(angle.clone()),
            _ => Err(ConvertError::structural(format!(
                "{func}() argument shape mismatch"
            ))),
        }
    }

    fn multiply_divide(&mut self, a: Operand, b: Operand, divide: bool) -> ConvertResult<Operand> {
        let node = self.create(NodeKind::MultiplyDivide)?;
        if divide {
            self.graph.set_attribute(
                &node.plug(multiply_divide::OPERATION),
                Value::Int(multiply_divide::DIVIDE),
            )?;
        }
        self.set_or_connect(&a, &node.plug(multiply_divide::INPUT1))?;
        self.set_or_connect(&b, &node.plug(multiply_divide::INPUT2))?;
        Ok(Operand::Plug(node.plug(multiply_divide::OUTPUT)))
    }

    fn plus_minus(&mut self, a: Operand, b: Operand, subtract: bool) -> ConvertResult<Operand> {
        let node = self.create(NodeKind::PlusMinusAverage)?;
        self.graph.set_attribute(
            &node.plug(plus_minus_average::OPERATION),
            Value::Int(if subtract {
                plus_minus_average::SUBTRACT
            } else {
                plus_minus_average::SUM
            }),
        )?;
        self.set_or_connect(&a, &node.plug(plus_minus_average::INPUT1))?;
        self.set_or_connect(&b, &node.plug(plus_minus_average::INPUT2))?;
        Ok(Operand::Plug(node.plug(plus_minus_average::OUTPUT)))
    }

    /// `a % b` as a cyclic ramp: 0 at position 0, 1 just before `b`.
    fn modulo(&mut self, a: Operand, b: Operand) -> ConvertResult<Operand> {
        let Operand::Constant(divisor) = b else {
            return Err(ConvertError::NonConstantOperand {
                op: BinaryOp::Mod.symbol(),
            });
        };
        let eps = self.ctx.opts.modulo_epsilon;
        if divisor.is_nan() || divisor <= eps {
            return Err(ConvertError::unsupported(format!(
                "modulo by {divisor}: the divisor must be positive"
            )));
        }

        let curve = self.create(NodeKind::RampCurve)?;
        self.graph.create_keyframe(&curve, Keyframe::linear(0.0, 0.0))?;
        self.graph
            .create_keyframe(&curve, Keyframe::linear(divisor - eps, 1.0))?;
        self.graph
            .set_extrapolation(&curve, Extrapolation::Cyclic, Extrapolation::Cyclic)?;
        self.set_or_connect(&a, &curve.plug(ramp_curve::INPUT))?;
        Ok(Operand::Plug(curve.plug(ramp_curve::OUTPUT)))
    }

    /// `min` drives the clamp's upper bound from `bound`, `max` the lower one.
    /// The unused bound gets the widest finite sentinel.
    fn bounded(&mut self, value: Operand, bound: Operand, is_min: bool) -> ConvertResult<Operand> {
        let node = self.create(NodeKind::Clamp)?;
        self.set_or_connect(&value, &node.plug(clamp::INPUT))?;
        let (bound_port, sentinel_port, sentinel) = if is_min {
            (clamp::MAX, clamp::MIN, f64::MIN)
        } else {
            (clamp::MIN, clamp::MAX, f64::MAX)
        };
        self.graph
            .set_attribute(&node.plug(sentinel_port), Value::Double(sentinel))?;
        self.set_or_connect(&bound, &node.plug(bound_port))?;
        Ok(Operand::Plug(node.plug(clamp::OUTPUT)))
    }

    /// The quaternion x component of an X rotation by `2a` is `sin(a)`.
    fn sine(&mut self, angle: Operand) -> ConvertResult<Operand> {
        let doubler = self.create(NodeKind::MultDoubleLinear)?;
        self.set_or_connect(&angle, &doubler.plug(mult_double_linear::INPUT1))?;
        self.graph.set_attribute(
            &doubler.plug(mult_double_linear::INPUT2),
            Value::DoubleLinear(2.0),
        )?;

        let quat = self.create(NodeKind::EulerToQuat)?;
        self.graph.connect(
            &doubler.plug(mult_double_linear::OUTPUT),
            &quat.plug(euler_to_quat::ROTATE_X),
            false,
        )?;
        Ok(Operand::Plug(quat.plug(euler_to_quat::QUAT_X)))
    }

    fn set_or_connect(&mut self, operand: &Operand, dest: &Plug) -> ConvertResult<()> {
        match operand {
            Operand::Constant(v) => self.graph.set_attribute(dest, Value::Double(*v))?,
            Operand::Plug(src) => self.graph.connect(src, dest, false)?,
        }
        Ok(())
    }

    fn create(&mut self, kind: NodeKind) -> ConvertResult<NodeHandle> {
        let node = self.graph.create_node(kind)?;
        tracing::debug!(
            node = %node,
            construct = self.ctx.identity,
            "created primitive node"
        );
        self.created.push(node.clone());
        Ok(node)
    }
}

fn comparison_outside_condition(op: BinaryOp) -> ConvertError {
    ConvertError::unsupported(format!("comparison '{}' outside a condition", op.symbol()))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/lower.rs"]
mod tests;
