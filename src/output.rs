// src/output.rs
use std::fs::File;
use std::io::{self, Write};

/// One lattice depth in a convergence study.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceRow {
    pub engine: String,
    pub steps: usize,
    pub price: f64,
    pub reference: f64,
    pub time_ms: f64,
}

impl ConvergenceRow {
    pub fn abs_error(&self) -> f64 {
        (self.price - self.reference).abs()
    }
}

pub fn write_convergence_to_csv(filename: &str, rows: &[ConvergenceRow]) -> io::Result<()> {
    let file = File::create(filename)?;
    write_convergence(file, rows)
}

pub fn write_convergence<W: Write>(mut out: W, rows: &[ConvergenceRow]) -> io::Result<()> {
    writeln!(out, "engine,steps,price,reference,abs_error,time_ms")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{:.8},{:.8},{:.8},{:.3}",
            row.engine,
            row.steps,
            row.price,
            row.reference,
            row.abs_error(),
            row.time_ms
        )?;
    }
    Ok(())
}

pub fn write_summary_to_csv(filename: &str, summary_data: &[(&str, String)]) -> io::Result<()> {
    let mut file = File::create(filename)?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_layout() {
        let rows = vec![ConvergenceRow {
            engine: "Binomial CRR".to_string(),
            steps: 50,
            price: 10.5,
            reference: 10.45,
            time_ms: 0.25,
        }];
        let mut buf = Vec::new();
        write_convergence(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("engine,steps,price,reference,abs_error,time_ms"));
        let fields: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(fields[0], "Binomial CRR");
        assert_eq!(fields[1], "50");
        assert!((fields[4].parse::<f64>().unwrap() - 0.05).abs() < 1e-9);
        assert!(lines.next().is_none());
    }
}
