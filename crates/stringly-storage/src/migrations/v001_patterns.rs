//! v001: one table per pattern kind, keyed by source position.
//!
//! Value sets are stored as JSON arrays so literals keep their commas.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS validation_patterns (
    file_path TEXT NOT NULL,
    line INTEGER NOT NULL,
    col INTEGER NOT NULL,
    variable_name TEXT,
    value_set TEXT NOT NULL,
    value_set_hash INTEGER NOT NULL,
    value_count INTEGER NOT NULL,
    pattern_type TEXT NOT NULL,
    PRIMARY KEY (file_path, line, col)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_validation_hash ON validation_patterns(value_set_hash);

CREATE TABLE IF NOT EXISTS comparisons (
    file_path TEXT NOT NULL,
    line INTEGER NOT NULL,
    col INTEGER NOT NULL,
    variable_name TEXT NOT NULL,
    compared_value TEXT NOT NULL,
    operator TEXT NOT NULL,
    PRIMARY KEY (file_path, line, col)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_comparisons_variable ON comparisons(variable_name);

CREATE TABLE IF NOT EXISTS function_calls (
    file_path TEXT NOT NULL,
    line INTEGER NOT NULL,
    col INTEGER NOT NULL,
    callee_name TEXT NOT NULL,
    param_index INTEGER NOT NULL,
    string_value TEXT NOT NULL,
    PRIMARY KEY (file_path, line, col)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_function_calls_callee ON function_calls(callee_name, param_index);
";
