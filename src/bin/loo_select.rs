use std::path::Path;

use loocv::{
    basis::{Basis, ChebyshevBasis, MonomialBasis},
    CorrectedLeaveOneOut, DesignEvaluator, FittingStrategy, LeaveOneOut,
};

fn main() {
    //
    // First argument is the path to a CSV or JSON file with (x, y) data points.
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Please provide a path to a CSV or JSON file with (x, y) data points.");
        std::process::exit(1);
    };
    let path = Path::new(&path);

    let mut max_terms = 10;
    let mut basis = "chebyshev".to_string();
    let mut method = "corrected".to_string();
    for arg in std::env::args().skip(2) {
        if let Some(option) = arg.strip_prefix("max_terms=") {
            match str::parse::<usize>(option) {
                Ok(value) if value > 0 => max_terms = value,
                _ => {
                    eprintln!("Invalid max_terms value: {option}");
                    std::process::exit(1);
                }
            }
        }

        if let Some(option) = arg.strip_prefix("basis=") {
            basis = option.to_string();
        }

        if let Some(option) = arg.strip_prefix("method=") {
            method = option.to_string();
        }

        if arg == "help" || arg == "--help" || arg == "-h" {
            eprintln!(
                "Usage: loo_select <path> [max_terms=<number>] [basis=monomial|chebyshev] [method=corrected|raw]"
            );
            std::process::exit(0);
        }
    }

    let Ok(contents) = std::fs::read_to_string(path) else {
        eprintln!("Failed to read file: {}", path.display());
        std::process::exit(1);
    };

    let data: Vec<(f64, f64)> = match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => {
            // Simple CSV parser: expects two columns, x and y, with an optional header row.
            let mut lines = contents.lines();
            let mut data = Vec::new();

            fn parse_line(line: &str) -> Option<(f64, f64)> {
                let mut parts = line.split(',').map(str::trim);
                let x = parts.next()?.parse().ok()?;
                let y = parts.next()?.parse().ok()?;
                Some((x, y))
            }

            //
            // First line, if we get a parsing error, we assume it's a header and skip it.
            if let Some(first_line) = lines.next() {
                if let Some(point) = parse_line(first_line) {
                    data.push(point);
                }
            }

            //
            // The rest we are strict.
            for (i, line) in lines.enumerate() {
                match parse_line(line) {
                    Some(point) => data.push(point),
                    None => {
                        eprintln!("Failed to parse line {}: {}", i + 2, line);
                        std::process::exit(1);
                    }
                }
            }

            data
        }
        Some("json") => serde_json::from_str(&contents).unwrap_or_else(|err| {
            eprintln!("Failed to parse JSON: {err}");
            std::process::exit(1);
        }),

        _ => {
            eprintln!("Unsupported file format: {}", path.display());
            std::process::exit(1);
        }
    };

    let (x, y): (Vec<f64>, Vec<f64>) = data.into_iter().unzip();

    match (basis.as_str(), method.as_str()) {
        ("monomial", "corrected") => {
            select(&CorrectedLeaveOneOut, MonomialBasis::new(max_terms), &x, &y);
        }
        ("monomial", "raw") => {
            select(&LeaveOneOut, MonomialBasis::new(max_terms), &x, &y);
        }
        ("chebyshev", "corrected") => {
            select(&CorrectedLeaveOneOut, chebyshev(max_terms, &x), &x, &y);
        }
        ("chebyshev", "raw") => {
            select(&LeaveOneOut, chebyshev(max_terms, &x), &x, &y);
        }
        _ => {
            eprintln!("Unsupported basis `{basis}` or method `{method}`");
            std::process::exit(1);
        }
    }
}

fn chebyshev(max_terms: usize, x: &[f64]) -> ChebyshevBasis {
    ChebyshevBasis::from_points(max_terms, x).unwrap_or_else(|err| {
        eprintln!("Failed to build basis: {err}");
        std::process::exit(1);
    })
}

/// Scores the nested candidates {φ₀}, {φ₀, φ₁}, … and reports the cheapest.
///
/// This is the caller's half of the contract: the library prices each
/// candidate, the selection policy (here, plain argmin over nested subsets)
/// lives with the consumer.
fn select<S: FittingStrategy, B: Basis<f64>>(strategy: &S, basis: B, x: &[f64], y: &[f64]) {
    let evaluator = match DesignEvaluator::new(basis, x) {
        Ok(evaluator) => evaluator,
        Err(err) => {
            eprintln!("Failed to start: {err}");
            std::process::exit(1);
        }
    };

    println!("Scoring with {} over {} points:", strategy.name(), x.len());

    let mut best: Option<(usize, f64)> = None;
    for k in 1..=evaluator.dimension() {
        let indices: Vec<usize> = (0..k).collect();
        match strategy.run_with_design(y, None, &indices, &evaluator) {
            Ok(risk) => {
                println!("  k = {k:>3}: risk = {risk:.6e}");
                if best.map_or(true, |(_, b)| risk < b) {
                    best = Some((k, risk));
                }
            }
            Err(err) => println!("  k = {k:>3}: rejected ({err})"),
        }
    }

    match best {
        Some((k, risk)) => println!("Best candidate: first {k} functions (risk = {risk:.6e})"),
        None => {
            eprintln!("No candidate produced a valid fit");
            std::process::exit(1);
        }
    }
}
