use crate::expression::LinearExpr;
use crate::model::{Model, ObjectiveSense, Sense, VariableInfo, VariableType};

use std::io::{self, Write};

// Characters the CPLEX LP format accepts in names besides alphanumerics.
const NAME_SYMBOLS: &str = "!\"#$%&()/,.;?@_`'{}|~";

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || NAME_SYMBOLS.contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn write_expr<W: Write>(writer: &mut W, model: &Model, expr: &LinearExpr) -> io::Result<()> {
    if expr.is_empty() {
        return write!(writer, " 0 {}", sanitize(&model.variables()[0].name));
    }
    for &(var, coeff) in expr.terms() {
        let sign = if coeff < 0.0 { '-' } else { '+' };
        write!(
            writer,
            " {} {} {}",
            sign,
            coeff.abs(),
            sanitize(&model.variable(var).name)
        )?;
    }
    Ok(())
}

fn write_bound<W: Write>(writer: &mut W, info: &VariableInfo) -> io::Result<()> {
    let name = sanitize(&info.name);
    if info.lower == std::f64::NEG_INFINITY && info.upper == std::f64::INFINITY {
        writeln!(writer, " {} free", name)
    } else if info.lower == info.upper {
        writeln!(writer, " {} = {}", name, info.lower)
    } else {
        let lower = if info.lower == std::f64::NEG_INFINITY {
            "-inf".to_string()
        } else {
            info.lower.to_string()
        };
        let upper = if info.upper == std::f64::INFINITY {
            "+inf".to_string()
        } else {
            info.upper.to_string()
        };
        writeln!(writer, " {} <= {} <= {}", lower, name, upper)
    }
}

pub(crate) fn write<W: Write>(model: &Model, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "\\ Model {}", model.name())?;
    match model.objective_sense() {
        ObjectiveSense::Minimize => writeln!(writer, "Minimize")?,
        ObjectiveSense::Maximize => writeln!(writer, "Maximize")?,
    }
    if model.num_vars() == 0 {
        return writeln!(writer, "End");
    }

    write!(writer, " obj:")?;
    write_expr(writer, model, model.objective())?;
    writeln!(writer)?;

    writeln!(writer, "Subject To")?;
    for (index, constraint) in model.constraints().iter().enumerate() {
        let name = if constraint.name.is_empty() {
            format!("c{}", index)
        } else {
            sanitize(&constraint.name)
        };
        write!(writer, " {}:", name)?;
        write_expr(writer, model, &constraint.lhs)?;
        let sense = match constraint.sense {
            Sense::LessEqual => "<=",
            Sense::GreaterEqual => ">=",
            Sense::Equal => "=",
        };
        writeln!(writer, " {} {}", sense, constraint.rhs)?;
    }

    writeln!(writer, "Bounds")?;
    for info in model.variables().iter() {
        write_bound(writer, info)?;
    }

    let binaries = model
        .variables()
        .iter()
        .filter(|info| info.var_type == VariableType::Binary)
        .map(|info| sanitize(&info.name))
        .collect::<Vec<_>>();
    if !binaries.is_empty() {
        writeln!(writer, "Binaries")?;
        for name in binaries {
            writeln!(writer, " {}", name)?;
        }
    }
    writeln!(writer, "End")
}

#[cfg(test)]
mod tests {
    use crate::{LinearExpr, Model, ObjectiveSense, Sense};

    #[test]
    fn writes_cplex_lp() {
        let mut model = Model::new("small");
        let x = model.add_binary_var("B(1;2;0)");
        let v = model
            .add_continuous_var("v root", std::f64::NEG_INFINITY, std::f64::INFINITY)
            .unwrap();
        let mut lhs = LinearExpr::term(1.0, v);
        lhs.add_term(-2.5, x);
        model.add_constr(lhs, Sense::LessEqual, 0.0, "dual<0>").unwrap();
        model
            .set_objective(LinearExpr::term(1.0, v), ObjectiveSense::Maximize)
            .unwrap();

        let mut buffer = Vec::<u8>::new();
        model.write_lp(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "\\ Model small\n\
             Maximize\n \
             obj: + 1 v_root\n\
             Subject To\n \
             dual_0_: - 2.5 B(1;2;0) + 1 v_root <= 0\n\
             Bounds\n \
             0 <= B(1;2;0) <= 1\n \
             v_root free\n\
             Binaries\n \
             B(1;2;0)\n\
             End\n"
        );
    }
}
