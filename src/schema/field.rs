//! The shared field table
//!
//! Every lookup from a display name or a stored record key to a field goes
//! through `FIELD_TABLE`. The parser, evaluator, sorter, projector and record
//! serialization all consult it; nothing else spells out record keys.

use std::fmt;

/// Value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// IEEE-754 double
    Numeric,
    /// UTF-8 text
    Textual,
}

impl FieldKind {
    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Numeric => "number",
            FieldKind::Textual => "text",
        }
    }
}

/// A known course field.
///
/// Declaration order is the canonical field order used by projection and
/// serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Department,
    Id,
    Average,
    Instructor,
    Title,
    Pass,
    Fail,
    Audit,
    Uuid,
}

/// One row of the field table
#[derive(Debug)]
pub struct FieldDef {
    pub field: Field,
    /// Name as written in queries
    pub name: &'static str,
    /// Key in stored records
    pub key: &'static str,
    pub kind: FieldKind,
}

/// Indexed by `Field as usize`.
pub const FIELD_TABLE: [FieldDef; 9] = [
    FieldDef {
        field: Field::Department,
        name: "Department",
        key: "courses_dept",
        kind: FieldKind::Textual,
    },
    FieldDef {
        field: Field::Id,
        name: "ID",
        key: "courses_id",
        kind: FieldKind::Textual,
    },
    FieldDef {
        field: Field::Average,
        name: "Average",
        key: "courses_avg",
        kind: FieldKind::Numeric,
    },
    FieldDef {
        field: Field::Instructor,
        name: "Instructor",
        key: "courses_instructor",
        kind: FieldKind::Textual,
    },
    FieldDef {
        field: Field::Title,
        name: "Title",
        key: "courses_title",
        kind: FieldKind::Textual,
    },
    FieldDef {
        field: Field::Pass,
        name: "Pass",
        key: "courses_pass",
        kind: FieldKind::Numeric,
    },
    FieldDef {
        field: Field::Fail,
        name: "Fail",
        key: "courses_fail",
        kind: FieldKind::Numeric,
    },
    FieldDef {
        field: Field::Audit,
        name: "Audit",
        key: "courses_audit",
        kind: FieldKind::Numeric,
    },
    FieldDef {
        field: Field::Uuid,
        name: "UUID",
        key: "courses_uuid",
        kind: FieldKind::Textual,
    },
];

impl Field {
    /// All fields in canonical order
    pub const ALL: [Field; 9] = [
        Field::Department,
        Field::Id,
        Field::Average,
        Field::Instructor,
        Field::Title,
        Field::Pass,
        Field::Fail,
        Field::Audit,
        Field::Uuid,
    ];

    fn def(self) -> &'static FieldDef {
        &FIELD_TABLE[self as usize]
    }

    /// Query-facing name (e.g. "Average")
    pub fn name(self) -> &'static str {
        self.def().name
    }

    /// Stored record key (e.g. "courses_avg")
    pub fn key(self) -> &'static str {
        self.def().key
    }

    pub fn kind(self) -> FieldKind {
        self.def().kind
    }

    pub fn is_numeric(self) -> bool {
        self.kind() == FieldKind::Numeric
    }

    /// Looks up a field by its query-facing name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Field> {
        FIELD_TABLE.iter().find(|d| d.name == name).map(|d| d.field)
    }

    /// Looks up a field by its stored record key.
    pub fn from_key(key: &str) -> Option<Field> {
        FIELD_TABLE.iter().find(|d| d.key == key).map(|d| d.field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
