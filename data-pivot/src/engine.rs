//! FILENAME: data-pivot/src/engine.rs
//! PURPOSE: The DataPivot engine: field registration, population, and
//! access to the materialized result table.
//! CONTEXT: A DataPivot is bound to a source Table, configured with row,
//! column and data fields, then populated. Population groups source rows
//! by the row-field tuple, synthesizes one output column per distinct
//! (column-tuple, data-field) pair, and aggregates data contributions
//! into the cells.

use crate::accumulator::CellAccumulator;
use crate::definition::{Aggregate, FieldRole, FieldSpec};
use crate::error::{CellError, PivotError, PivotResult};
use parser::{parse_field_list, Expression};
use relation::{ColumnInfo, Evaluator, GroupKey, Table, Value, ValueType};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Grouping key over a field tuple. Inline capacity covers the common
/// case of a handful of fields.
type KeyTuple = SmallVec<[GroupKey; 4]>;

/// A registered field with its parsed expression and display label.
#[derive(Debug, Clone)]
struct BoundField {
    spec: FieldSpec,
    expr: Expression,
    label: String,
}

/// One synthesized output column.
struct SynthColumn {
    name: String,
    aggregate: Aggregate,
}

/// Cross-tabulation engine over an in-memory source table.
pub struct DataPivot {
    source: Option<Table>,
    row_fields: Vec<BoundField>,
    column_fields: Vec<BoundField>,
    data_fields: Vec<BoundField>,
    strict: bool,
    results: Option<Table>,
}

impl Default for DataPivot {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPivot {
    pub fn new() -> Self {
        DataPivot {
            source: None,
            row_fields: Vec::new(),
            column_fields: Vec::new(),
            data_fields: Vec::new(),
            strict: false,
            results: None,
        }
    }

    /// Binds the source table. Replaces any previous source and discards
    /// previously populated results; registered fields are kept and will
    /// be revalidated on next use.
    pub fn bind(&mut self, source: Table) -> PivotResult<()> {
        for (i, a) in source.columns().iter().enumerate() {
            for b in &source.columns()[i + 1..] {
                if a.name.eq_ignore_ascii_case(&b.name) {
                    return Err(PivotError::SourceModel(format!(
                        "duplicate column name: {}",
                        a.name
                    )));
                }
            }
        }
        self.source = Some(source);
        self.results = None;
        Ok(())
    }

    /// In strict mode a cell error aborts populate instead of nulling the
    /// affected cell.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Registers one or more row fields from a comma-separated field
    /// specification. The alias applies when the specification holds
    /// exactly one field.
    pub fn add_row_field(&mut self, spec: &str, alias: Option<&str>) -> PivotResult<()> {
        let fields = self.build_fields(FieldRole::Row, spec, alias, None)?;
        self.row_fields.extend(fields);
        self.results = None;
        Ok(())
    }

    /// Registers one or more column fields. Distinct values of these
    /// fields become output columns during populate.
    pub fn add_column_field(&mut self, spec: &str, alias: Option<&str>) -> PivotResult<()> {
        let fields = self.build_fields(FieldRole::Column, spec, alias, None)?;
        self.column_fields.extend(fields);
        self.results = None;
        Ok(())
    }

    /// Registers one or more data fields, all aggregated with the given
    /// function.
    pub fn add_data_field(
        &mut self,
        aggregate: Aggregate,
        spec: &str,
        alias: Option<&str>,
    ) -> PivotResult<()> {
        let fields = self.build_fields(FieldRole::Data, spec, alias, Some(aggregate))?;
        self.data_fields.extend(fields);
        self.results = None;
        Ok(())
    }

    /// Parses and validates a field specification into bound fields.
    fn build_fields(
        &self,
        role: FieldRole,
        spec: &str,
        alias: Option<&str>,
        aggregate: Option<Aggregate>,
    ) -> PivotResult<Vec<BoundField>> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| PivotError::SourceModel("no source defined".to_string()))?;

        let parsed =
            parse_field_list(spec).map_err(|e| PivotError::FieldFormat(e.message))?;

        let evaluator = Evaluator::new(source);
        let single = parsed.len() == 1;
        let mut fields = Vec::with_capacity(parsed.len());

        for field in parsed {
            evaluator
                .check(&field.expr)
                .map_err(|e| PivotError::FieldFormat(e.to_string()))?;

            // Trial evaluation against the first row catches type errors
            // that a schema check alone cannot see.
            if let Some(row) = source.row(0) {
                evaluator
                    .evaluate(&field.expr, row)
                    .map_err(|e| PivotError::FieldFormat(e.to_string()))?;
            }

            let chosen_alias = field
                .alias
                .as_deref()
                .or(if single { alias } else { None })
                .map(sanitize_alias);
            let label = match &chosen_alias {
                Some(a) => a.clone(),
                None => field.expr.to_string(),
            };

            fields.push(BoundField {
                spec: FieldSpec {
                    role,
                    text: field.expr.to_string(),
                    alias: chosen_alias,
                    aggregate,
                },
                expr: field.expr,
                label,
            });
        }

        Ok(fields)
    }

    /// The registered field specifications, in registration order.
    pub fn field_specs(&self) -> Vec<&FieldSpec> {
        self.row_fields
            .iter()
            .chain(&self.column_fields)
            .chain(&self.data_fields)
            .map(|f| &f.spec)
            .collect()
    }

    /// Runs the cross tabulation and materializes the result table.
    /// Populate is idempotent: running it twice over the same source and
    /// configuration produces an identical table.
    pub fn populate(&mut self) -> PivotResult<()> {
        if self.row_fields.is_empty() {
            return Err(PivotError::Usage("no row field defined".to_string()));
        }
        self.results = None;
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| PivotError::SourceModel("no source defined".to_string()))?;
        let evaluator = Evaluator::new(source);

        // Row grouping: arena of first-seen row-field value tuples plus an
        // index from canonical key to arena slot.
        let mut row_arena: Vec<Vec<Value>> = Vec::new();
        let mut row_index: FxHashMap<KeyTuple, usize> = FxHashMap::default();

        // Column synthesis: columns appear in first-seen order and are
        // never removed.
        let mut columns: Vec<SynthColumn> = Vec::new();
        let mut column_index: FxHashMap<(KeyTuple, usize), usize> = FxHashMap::default();

        let mut cells: FxHashMap<(usize, usize), CellAccumulator> = FxHashMap::default();

        for row_id in 0..source.row_count() {
            let row = match source.row(row_id) {
                Some(r) => r,
                None => break,
            };

            let mut row_values = Vec::with_capacity(self.row_fields.len());
            let mut row_key = KeyTuple::new();
            for field in &self.row_fields {
                let value = evaluator
                    .evaluate(&field.expr, row)
                    .map_err(|e| PivotError::Internal(e.to_string()))?;
                row_key.push(value.group_key());
                row_values.push(value);
            }
            let row_slot = match row_index.get(&row_key) {
                Some(&slot) => slot,
                None => {
                    let slot = row_arena.len();
                    row_arena.push(row_values);
                    row_index.insert(row_key, slot);
                    slot
                }
            };

            let mut column_values = Vec::with_capacity(self.column_fields.len());
            let mut column_key = KeyTuple::new();
            for field in &self.column_fields {
                let value = evaluator
                    .evaluate(&field.expr, row)
                    .map_err(|e| PivotError::Internal(e.to_string()))?;
                column_key.push(value.group_key());
                column_values.push(value);
            }

            if self.data_fields.is_empty() {
                // Pivot-count mode: every source row contributes 1 to a
                // summed counter.
                let col_slot = self.resolve_column(
                    &mut columns,
                    &mut column_index,
                    column_key,
                    &column_values,
                    0,
                    None,
                );
                cells
                    .entry((row_slot, col_slot))
                    .or_insert_with(|| CellAccumulator::new(Aggregate::Sum))
                    .push(&Value::Int32(1));
            } else {
                for (data_idx, field) in self.data_fields.iter().enumerate() {
                    let value = evaluator
                        .evaluate(&field.expr, row)
                        .map_err(|e| PivotError::Internal(e.to_string()))?;
                    let aggregate = field.spec.aggregate.unwrap_or(Aggregate::Sum);
                    let col_slot = self.resolve_column(
                        &mut columns,
                        &mut column_index,
                        column_key.clone(),
                        &column_values,
                        data_idx,
                        Some(field),
                    );
                    cells
                        .entry((row_slot, col_slot))
                        .or_insert_with(|| CellAccumulator::new(aggregate))
                        .push(&value);
                }
            }
        }

        log::debug!(
            "pivot populate: {} source rows into {} groups and {} columns",
            source.row_count(),
            row_arena.len(),
            columns.len()
        );

        self.results = Some(self.materialize(row_arena, columns, cells)?);
        Ok(())
    }

    /// Finds or creates the output column for a column-key tuple and data
    /// field. New columns are appended, never reordered.
    fn resolve_column(
        &self,
        columns: &mut Vec<SynthColumn>,
        column_index: &mut FxHashMap<(KeyTuple, usize), usize>,
        column_key: KeyTuple,
        column_values: &[Value],
        data_idx: usize,
        data_field: Option<&BoundField>,
    ) -> usize {
        let key = (column_key, data_idx);
        if let Some(&slot) = column_index.get(&key) {
            return slot;
        }

        let aggregate = data_field
            .and_then(|f| f.spec.aggregate)
            .unwrap_or(Aggregate::Sum);
        let slot = columns.len();
        columns.push(SynthColumn {
            name: self.column_name(column_values, data_field),
            aggregate,
        });
        column_index.insert(key, slot);
        slot
    }

    /// Builds an output column name. With several column fields each
    /// segment is prefixed with its field label in brackets; the data
    /// field label is bracket-wrapped after the segments, or stands bare
    /// when no column fields exist.
    fn column_name(&self, column_values: &[Value], data_field: Option<&BoundField>) -> String {
        let mut name = String::new();
        for (field, value) in self.column_fields.iter().zip(column_values) {
            if self.column_fields.len() > 1 {
                name.push('[');
                name.push_str(&field.label);
                name.push(']');
            }
            name.push_str(&value.to_string());
        }

        match data_field {
            Some(field) => {
                if self.column_fields.is_empty() {
                    field.label.clone()
                } else {
                    name.push('[');
                    name.push_str(&field.label);
                    name.push(']');
                    name
                }
            }
            // Pivot-count mode
            None => {
                if self.column_fields.is_empty() {
                    "count".to_string()
                } else {
                    name
                }
            }
        }
    }

    /// Builds the output table from the grouped state.
    fn materialize(
        &self,
        row_arena: Vec<Vec<Value>>,
        columns: Vec<SynthColumn>,
        cells: FxHashMap<(usize, usize), CellAccumulator>,
    ) -> PivotResult<Table> {
        if self.strict {
            for accumulator in cells.values() {
                if let Some(e) = accumulator.error() {
                    return Err(match e {
                        CellError::Overflow => PivotError::Overflow,
                        other => PivotError::Internal(other.to_string()),
                    });
                }
            }
        }

        let mut infos = Vec::with_capacity(self.row_fields.len() + columns.len());
        for (idx, field) in self.row_fields.iter().enumerate() {
            let value_type = row_arena
                .iter()
                .map(|values| values[idx].value_type())
                .find(|t| *t != ValueType::Null)
                .unwrap_or(ValueType::Null);
            infos.push(ColumnInfo::new(field.label.clone(), value_type));
        }

        // Finalize every cell up front so column types can be locked from
        // the first non-null result.
        let mut finalized: FxHashMap<(usize, usize), Value> = FxHashMap::default();
        for (key, accumulator) in &cells {
            finalized.insert(*key, accumulator.finalize());
        }

        for (col_slot, column) in columns.iter().enumerate() {
            let value_type = (0..row_arena.len())
                .filter_map(|row_slot| finalized.get(&(row_slot, col_slot)))
                .map(|v| v.value_type())
                .find(|t| *t != ValueType::Null)
                .unwrap_or(ValueType::Null);
            let mut info = ColumnInfo::new(column.name.clone(), value_type);
            info.description = format!("{} ({})", column.name, column.aggregate);
            infos.push(info);
        }

        let mut table = Table::new(infos);
        for (row_slot, key_values) in row_arena.iter().enumerate() {
            let mut out = Vec::with_capacity(self.row_fields.len() + columns.len());
            out.extend(key_values.iter().cloned());
            for (col_slot, column) in columns.iter().enumerate() {
                let value = match finalized.get(&(row_slot, col_slot)) {
                    Some(v) => v.clone(),
                    None => CellAccumulator::empty_value(column.aggregate),
                };
                out.push(value);
            }
            table.push_row(out);
        }

        Ok(table)
    }

    /// The populated result table.
    pub fn output(&self) -> PivotResult<&Table> {
        self.results
            .as_ref()
            .ok_or_else(|| PivotError::Usage("pivot model not populated".to_string()))
    }

    pub fn row_count(&self) -> PivotResult<usize> {
        Ok(self.output()?.row_count())
    }

    pub fn column_count(&self) -> PivotResult<usize> {
        Ok(self.output()?.column_count())
    }

    pub fn describe_column(&self, index: usize) -> PivotResult<&ColumnInfo> {
        self.output()?
            .describe_column(index)
            .ok_or_else(|| PivotError::Usage(format!("no column at index {}", index)))
    }

    pub fn value_at(&self, row: usize, column: usize) -> PivotResult<&Value> {
        self.output()?
            .value_at(row, column)
            .ok_or_else(|| PivotError::Usage(format!("no value at ({}, {})", row, column)))
    }
}

/// Sanitizes a user-supplied alias: a leading digit and every character
/// that is not alphanumeric become '_'.
fn sanitize_alias(alias: &str) -> String {
    alias
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_alphanumeric() && !(i == 0 && c.is_ascii_digit()) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sanitize_alias;

    #[test]
    fn sanitize_replaces_leading_digit_and_symbols() {
        assert_eq!(sanitize_alias("2nd col!"), "_nd_col_");
        assert_eq!(sanitize_alias("total"), "total");
        assert_eq!(sanitize_alias("a-b"), "a_b");
    }
}
