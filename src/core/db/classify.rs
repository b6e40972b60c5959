/// Fault Classification Module
///
/// Every engine binding turns its native error type into a [`DriverFault`]
/// with exactly one mapping function. [`classify`] then reduces any fault to
/// the `(code, message)` pair carried by a [`QueryResult`], so callers branch
/// on `code` without ever seeing an engine-specific error type.

use super::query::QueryResult;
use std::fmt;

/// Code for failures outside the known fault taxonomy
pub const UNCLASSIFIED_CODE: i32 = 9999;

/// Closed taxonomy of driver failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Misuse of the database interface rather than the database itself
    Interface,
    /// Problems with processed data: range, conversion, division by zero
    Data,
    /// Relational integrity violated: duplicate key, foreign key
    Integrity,
    /// The engine hit an internal inconsistency
    Internal,
    /// Bad statement: syntax error, unknown table, wrong arity
    Programming,
    /// Failures outside the caller's control: lost connection, locks, I/O
    Operational,
    /// Operation not supported by the engine or binding
    NotSupported,
    /// Any other error reported by the driver
    Driver,
    /// Not a driver error at all
    Unclassified,
}

impl FaultKind {
    pub const ALL: [FaultKind; 9] = [
        FaultKind::Interface,
        FaultKind::Data,
        FaultKind::Integrity,
        FaultKind::Internal,
        FaultKind::Programming,
        FaultKind::Operational,
        FaultKind::NotSupported,
        FaultKind::Driver,
        FaultKind::Unclassified,
    ];

    /// Code used when the driver does not supply one
    pub const fn default_code(self) -> i32 {
        match self {
            FaultKind::Interface => 9001,
            FaultKind::Data => 9002,
            FaultKind::Integrity => 9003,
            FaultKind::Internal => 9004,
            FaultKind::Programming => 9005,
            FaultKind::Operational => 9006,
            FaultKind::NotSupported => 9007,
            FaultKind::Driver => 9008,
            FaultKind::Unclassified => UNCLASSIFIED_CODE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaultKind::Interface => "interface",
            FaultKind::Data => "data",
            FaultKind::Integrity => "integrity",
            FaultKind::Internal => "internal",
            FaultKind::Programming => "programming",
            FaultKind::Operational => "operational",
            FaultKind::NotSupported => "not_supported",
            FaultKind::Driver => "driver",
            FaultKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A driver failure in engine-neutral form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverFault {
    pub kind: FaultKind,
    /// The driver's own error code, when it has one
    pub code: Option<i32>,
    pub message: String,
    /// Five-character SQLSTATE, when the engine reports one
    pub sqlstate: Option<String>,
}

impl DriverFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        DriverFault {
            kind,
            code: None,
            message: message.into(),
            sqlstate: None,
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_sqlstate(mut self, sqlstate: impl Into<String>) -> Self {
        self.sqlstate = Some(sqlstate.into());
        self
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Unclassified, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotSupported, message)
    }

    pub fn interface(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Interface, message)
    }
}

impl fmt::Display for DriverFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} error ({}): {}", self.kind, code, self.message),
            None => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for DriverFault {}

/// Reduces a fault to its `(code, message)` pair.
///
/// Classified faults keep the driver's non-zero code and otherwise fall back
/// to the per-kind default, so distinct kinds never collapse onto one code.
/// Unclassified faults always get [`UNCLASSIFIED_CODE`]. The message is
/// preserved verbatim in every case.
pub fn classify(fault: &DriverFault) -> (i32, String) {
    let code = match fault.kind {
        FaultKind::Unclassified => UNCLASSIFIED_CODE,
        kind => fault
            .code
            .filter(|code| *code != 0)
            .unwrap_or_else(|| kind.default_code()),
    };
    (code, fault.message.clone())
}

/// Message carried by a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "driver panicked".to_string()
    }
}

impl From<DriverFault> for QueryResult {
    fn from(fault: DriverFault) -> Self {
        let (code, message) = classify(&fault);
        let result = QueryResult::failure(code, message).with_extra("fault", fault.kind.name());
        match fault.sqlstate {
            Some(sqlstate) => result.with_extra("sqlstate", sqlstate),
            None => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kinds_map_to_distinct_nonzero_codes() {
        let codes: HashSet<i32> = FaultKind::ALL
            .iter()
            .map(|kind| classify(&DriverFault::new(*kind, "boom")).0)
            .collect();
        assert_eq!(codes.len(), FaultKind::ALL.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_driver_code_preferred() {
        let fault = DriverFault::new(FaultKind::Programming, "You have an error in your SQL syntax")
            .with_code(1064)
            .with_sqlstate("42000");
        assert_eq!(classify(&fault), (1064, fault.message.clone()));

        let fault = DriverFault::new(FaultKind::Data, "zero").with_code(0);
        assert_eq!(classify(&fault).0, FaultKind::Data.default_code());
    }

    #[test]
    fn test_unclassified_uses_sentinel_and_keeps_message() {
        let fault = DriverFault::unclassified("'NoneType' object has no attribute 'execute'").with_code(5);
        let (code, message) = classify(&fault);
        assert_eq!(code, UNCLASSIFIED_CODE);
        assert_eq!(message, "'NoneType' object has no attribute 'execute'");
    }

    #[test]
    fn test_into_query_result() {
        let result: QueryResult = DriverFault::new(FaultKind::Integrity, "Duplicate entry '1' for key 'PRIMARY'")
            .with_code(1062)
            .with_sqlstate("23000")
            .into();
        assert_eq!(result.code, 1062);
        assert!(result.rows.is_none());
        assert_eq!(result.extra_value("fault").unwrap(), "integrity");
        assert_eq!(result.extra_value("sqlstate").unwrap(), "23000");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");
        let payload: Box<dyn std::any::Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "driver panicked");
    }
}
