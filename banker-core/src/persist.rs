//! Persistência em formato de linhas rotuladas
//!
//! ```text
//! Available: 1 5 2 0
//! Maximum:
//! P0: 0 0 1 2
//! P1: 1 7 5 0
//! Allocation:
//! P0: 0 0 1 2
//! P1: 1 0 0 0
//! ```
//!
//! `Need` nunca é persistido; é recalculado na carga. A matriz de claims
//! máximos inicial usa outro formato: uma linha CSV por consumidor.

use std::fs;
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};
use crate::matrix::{Matrix, Units};
use crate::state::LedgerState;

const AVAILABLE_LABEL: &str = "Available:";
const MAXIMUM_LABEL: &str = "Maximum:";
const ALLOCATION_LABEL: &str = "Allocation:";

/// Serializa `Available`, `Maximum` e `Allocation`
pub fn encode_state(state: &LedgerState) -> String {
    let mut out = String::new();

    out.push_str(AVAILABLE_LABEL);
    push_values(&mut out, state.available());
    out.push('\n');

    push_matrix(&mut out, MAXIMUM_LABEL, state.maximum());
    push_matrix(&mut out, ALLOCATION_LABEL, state.allocation());
    out
}

fn push_values(out: &mut String, values: &[Units]) {
    for value in values {
        out.push(' ');
        out.push_str(&value.to_string());
    }
}

fn push_matrix(out: &mut String, label: &str, matrix: &Matrix) {
    out.push_str(label);
    out.push('\n');
    for (i, row) in matrix.iter_rows().enumerate() {
        out.push_str(&format!("P{i}:"));
        push_values(out, row);
        out.push('\n');
    }
}

/// Inverso de [`encode_state`]. As dimensões vêm do próprio texto.
pub fn decode_state(text: &str) -> LedgerResult<LedgerState> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (line_no, first) = lines
        .next()
        .ok_or_else(|| LedgerError::parse(1, "empty state file"))?;
    let values = first
        .strip_prefix(AVAILABLE_LABEL)
        .ok_or_else(|| LedgerError::parse(line_no, format!("expected '{AVAILABLE_LABEL}'")))?;
    let available = parse_values(line_no, values.split_whitespace())?;
    let resources = available.len();

    let (line_no, header) = lines
        .next()
        .ok_or_else(|| LedgerError::parse(line_no + 1, format!("expected '{MAXIMUM_LABEL}'")))?;
    if header != MAXIMUM_LABEL {
        return Err(LedgerError::parse(line_no, format!("expected '{MAXIMUM_LABEL}'")));
    }

    let mut maximum_rows = Vec::new();
    let mut allocation_rows = Vec::new();
    let mut in_allocation = false;

    for (line_no, line) in lines {
        if line == ALLOCATION_LABEL {
            if in_allocation {
                return Err(LedgerError::parse(line_no, "duplicate allocation section"));
            }
            in_allocation = true;
            continue;
        }

        let target = if in_allocation { &mut allocation_rows } else { &mut maximum_rows };
        let expected = target.len();
        target.push(parse_labeled_row(line_no, line, expected, resources)?);
    }

    if !in_allocation {
        return Err(LedgerError::parse(0, format!("missing '{ALLOCATION_LABEL}' section")));
    }
    if allocation_rows.len() != maximum_rows.len() {
        return Err(LedgerError::DimensionMismatch {
            expected: maximum_rows.len(),
            found: allocation_rows.len(),
        });
    }

    let maximum = Matrix::from_rows(&maximum_rows, resources)?;
    let allocation = Matrix::from_rows(&allocation_rows, resources)?;
    LedgerState::from_parts(available, maximum, allocation)
}

fn parse_labeled_row(
    line_no: usize,
    line: &str,
    expected_index: usize,
    resources: usize,
) -> LedgerResult<Vec<Units>> {
    let (label, values) = line
        .split_once(':')
        .ok_or_else(|| LedgerError::parse(line_no, "expected 'P<i>:' row label"))?;
    let expected_label = format!("P{expected_index}");
    if label.trim() != expected_label {
        return Err(LedgerError::parse(
            line_no,
            format!("expected row '{expected_label}', found '{}'", label.trim()),
        ));
    }

    let row = parse_values(line_no, values.split_whitespace())?;
    if row.len() != resources {
        return Err(LedgerError::parse(
            line_no,
            format!("expected {resources} values, found {}", row.len()),
        ));
    }
    Ok(row)
}

fn parse_values<'a>(
    line_no: usize,
    tokens: impl Iterator<Item = &'a str>,
) -> LedgerResult<Vec<Units>> {
    tokens
        .map(|token| {
            let value: Units = token
                .trim()
                .parse()
                .map_err(|_| LedgerError::parse(line_no, format!("invalid integer '{token}'")))?;
            if value < 0 {
                return Err(LedgerError::parse(line_no, format!("negative value {value}")));
            }
            Ok(value)
        })
        .collect()
}

/// Grava o estado em arquivo
pub fn save_state(state: &LedgerState, path: impl AsRef<Path>) -> LedgerResult<()> {
    fs::write(path, encode_state(state))?;
    Ok(())
}

/// Carrega o estado de arquivo
pub fn load_state(path: impl AsRef<Path>) -> LedgerResult<LedgerState> {
    let text = fs::read_to_string(path)?;
    decode_state(&text)
}

/// Lê a matriz de claims máximos: uma linha por consumidor, valores
/// separados por vírgula. Linhas em branco são ignoradas.
pub fn parse_maximum_claims(text: &str, consumers: usize, resources: usize) -> LedgerResult<Matrix> {
    let mut rows = Vec::with_capacity(consumers);

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = n + 1;
        if rows.len() == consumers {
            return Err(LedgerError::parse(
                line_no,
                format!("more than {consumers} consumer rows"),
            ));
        }

        let row = parse_values(line_no, line.split(','))?;
        if row.len() != resources {
            return Err(LedgerError::parse(
                line_no,
                format!("expected {resources} values, found {}", row.len()),
            ));
        }
        rows.push(row);
    }

    if rows.len() != consumers {
        return Err(LedgerError::DimensionMismatch {
            expected: consumers,
            found: rows.len(),
        });
    }
    Matrix::from_rows(&rows, resources)
}

/// Lê a matriz de claims máximos de arquivo
pub fn load_maximum_claims(
    path: impl AsRef<Path>,
    consumers: usize,
    resources: usize,
) -> LedgerResult<Matrix> {
    let text = fs::read_to_string(path)?;
    parse_maximum_claims(&text, consumers, resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Available: 1 5 2 0
Maximum:
P0: 0 0 1 2
P1: 1 7 5 0
Allocation:
P0: 0 0 1 2
P1: 1 0 0 0
";

    #[test]
    fn test_decode_recomputes_need() {
        let state = decode_state(SAMPLE).unwrap();
        assert_eq!(state.consumers(), 2);
        assert_eq!(state.resources(), 4);
        assert_eq!(state.available(), &[1, 5, 2, 0]);
        assert_eq!(state.need().row(1), &[0, 7, 5, 0]);
    }

    #[test]
    fn test_encode_matches_format() {
        let state = decode_state(SAMPLE).unwrap();
        assert_eq!(encode_state(&state), SAMPLE);
    }

    #[test]
    fn test_decode_rejects_wrong_row_label() {
        let text = SAMPLE.replace("P1: 1 7", "P3: 1 7");
        let err = decode_state(&text).unwrap_err();
        assert!(matches!(err, LedgerError::Parse { line: 4, .. }));
    }

    #[test]
    fn test_decode_rejects_allocation_over_maximum() {
        let text = SAMPLE.replace("P1: 1 0 0 0", "P1: 2 0 0 0");
        assert!(matches!(
            decode_state(&text),
            Err(LedgerError::InvalidInitialState(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_allocation() {
        let text: String = SAMPLE.lines().take(4).map(|l| format!("{l}\n")).collect();
        assert!(decode_state(&text).is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.txt");

        let state = decode_state(SAMPLE).unwrap();
        save_state(&state, &path).unwrap();
        let loaded = load_state(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_parse_maximum_claims() {
        let text = "6,4,7,3\n4,2,3,2\n\n2,5,3,3\n6,3,3,2\n5,6,7,5\n";
        let maximum = parse_maximum_claims(text, 5, 4).unwrap();
        assert_eq!(maximum.row(4), &[5, 6, 7, 5]);
        assert_eq!(maximum.row(2), &[2, 5, 3, 3]);
    }

    #[test]
    fn test_parse_maximum_claims_malformed() {
        assert!(matches!(
            parse_maximum_claims("1,2,3\n", 1, 4),
            Err(LedgerError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_maximum_claims("1,x,3,4\n", 1, 4),
            Err(LedgerError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_maximum_claims("1,-2,3,4\n", 1, 4),
            Err(LedgerError::Parse { .. })
        ));
        assert_eq!(
            parse_maximum_claims("1,2,3,4\n", 2, 4).unwrap_err(),
            LedgerError::DimensionMismatch { expected: 2, found: 1 }
        );
    }

    #[test]
    fn test_load_maximum_claims_missing_file() {
        let err = load_maximum_claims("/definitely/not/here.txt", 5, 4).unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
