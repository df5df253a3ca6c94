//! Matriz densa C×R em armazenamento contíguo
//!
//! Cada célula é acessada por `row * cols + col`. As dimensões são fixadas
//! na construção e nunca mudam durante uma sessão.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::error::{LedgerError, LedgerResult};

/// Quantidade de unidades de um tipo de recurso
pub type Units = i64;

/// Matriz consumidor × tipo de recurso
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    cells: Vec<Units>,
}

impl Matrix {
    /// Matriz preenchida com zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Constrói a partir de linhas; toda linha precisa ter `cols` valores
    pub fn from_rows(rows: &[Vec<Units>], cols: usize) -> LedgerResult<Self> {
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(LedgerError::DimensionMismatch {
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    /// Número de linhas (consumidores)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Número de colunas (tipos de recurso)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Mesmas dimensões?
    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Units> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Linha de um consumidor
    pub fn row(&self, row: usize) -> &[Units] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// Linha mutável de um consumidor
    pub fn row_mut(&mut self, row: usize) -> &mut [Units] {
        let start = row * self.cols;
        &mut self.cells[start..start + self.cols]
    }

    /// Itera sobre as linhas em ordem de índice
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Units]> {
        (0..self.rows).map(move |row| self.row(row))
    }

    /// Soma de uma coluna sobre todos os consumidores
    pub fn column_sum(&self, col: usize) -> Units {
        (0..self.rows).map(|row| self[(row, col)]).sum()
    }

    /// Todas as células em ordem linha-maior
    pub fn cells(&self) -> &[Units] {
        &self.cells
    }

    /// Cópia como vetor de linhas
    pub fn to_rows(&self) -> Vec<Vec<Units>> {
        self.iter_rows().map(<[Units]>::to_vec).collect()
    }

    /// Soma de uma coluna partindo de `start`; `None` se estourar `Units`
    pub fn checked_column_sum(&self, col: usize, start: Units) -> Option<Units> {
        (0..self.rows).try_fold(start, |acc, row| acc.checked_add(self[(row, col)]))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Units;

    fn index(&self, (row, col): (usize, usize)) -> &Units {
        &self.cells[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Units {
        &mut self.cells[row * self.cols + col]
    }
}
