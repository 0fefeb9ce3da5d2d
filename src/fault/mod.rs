//! Fault injection for resilience testing
//!
//! The emulator never fails on its own. Rules registered here make a
//! matching operation resolve with an `Injected` error instead, leaving
//! the table store untouched.
//!
//! Rules can also come from the `MOCKBASE_FAULT` environment variable:
//!
//! ```bash
//! MOCKBASE_FAULT=usuarios:upsert,*:select cargo test
//! ```

use std::sync::Mutex;

use crate::core::{EngineError, OperationKind};

/// Environment variable read by `FaultInjector::from_env`
pub const FAULT_ENV: &str = "MOCKBASE_FAULT";

/// A single injected failure
#[derive(Debug, Clone)]
pub struct FaultRule {
    /// Table to match (`None` = any table)
    pub table: Option<String>,
    /// Operation to match (`None` = any operation)
    pub operation: Option<OperationKind>,
    /// Message carried by the error
    pub message: String,
    /// Remaining firings (`None` = unlimited)
    pub remaining: Option<usize>,
}

impl FaultRule {
    /// Fail every operation on every table
    pub fn always(message: impl Into<String>) -> Self {
        Self {
            table: None,
            operation: None,
            message: message.into(),
            remaining: None,
        }
    }

    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn on_operation(mut self, operation: OperationKind) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Fire `n` times, then retire
    pub fn times(mut self, n: usize) -> Self {
        self.remaining = Some(n);
        self
    }

    fn matches(&self, table: &str, operation: OperationKind) -> bool {
        self.table.as_deref().map_or(true, |t| t == table)
            && self.operation.map_or(true, |op| op == operation)
            && self.remaining != Some(0)
    }
}

/// Registry of fault rules
#[derive(Debug, Default)]
pub struct FaultInjector {
    rules: Mutex<Vec<FaultRule>>,
}

impl FaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an injector from `MOCKBASE_FAULT`.
    ///
    /// Entries are `table:operation` pairs separated by commas; `*`
    /// matches anything. Malformed entries are ignored.
    pub fn from_env() -> Self {
        let injector = Self::new();
        if let Ok(spec) = std::env::var(FAULT_ENV) {
            for rule in parse_spec(&spec) {
                injector.inject(rule);
            }
        }
        injector
    }

    /// Registers a rule
    pub fn inject(&self, rule: FaultRule) {
        self.lock().push(rule);
    }

    /// Removes every rule
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of registered rules, spent ones included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the error of the first live rule matching the call
    pub fn check(&self, table: &str, operation: OperationKind) -> Option<EngineError> {
        let mut rules = self.lock();
        let rule = rules.iter_mut().find(|r| r.matches(table, operation))?;

        if let Some(n) = rule.remaining.as_mut() {
            *n -= 1;
        }

        Some(EngineError::Injected {
            table: table.to_string(),
            operation,
            message: rule.message.clone(),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FaultRule>> {
        self.rules.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parses `table:operation[,table:operation]`
fn parse_spec(spec: &str) -> Vec<FaultRule> {
    spec.split(',')
        .filter_map(|entry| {
            let (table, op) = entry.trim().split_once(':')?;
            let mut rule = FaultRule::always(format!("{} from {}", entry.trim(), FAULT_ENV));
            if table != "*" {
                rule = rule.on_table(table);
            }
            if op != "*" {
                rule = rule.on_operation(op.parse().ok()?);
            }
            Some(rule)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rules_no_fault() {
        let injector = FaultInjector::new();
        assert!(injector.check("provas", OperationKind::Select).is_none());
    }

    #[test]
    fn test_rule_scoped_to_table_and_operation() {
        let injector = FaultInjector::new();
        injector.inject(
            FaultRule::always("backend down")
                .on_table("usuarios")
                .on_operation(OperationKind::Upsert),
        );

        assert!(injector.check("usuarios", OperationKind::Select).is_none());
        assert!(injector.check("provas", OperationKind::Upsert).is_none());

        let err = injector.check("usuarios", OperationKind::Upsert).unwrap();
        assert_eq!(err.code(), "MOCK_INJECTED_FAULT");
    }

    #[test]
    fn test_limited_rule_retires() {
        let injector = FaultInjector::new();
        injector.inject(FaultRule::always("flaky").times(2));

        assert!(injector.check("t", OperationKind::Insert).is_some());
        assert!(injector.check("t", OperationKind::Insert).is_some());
        assert!(injector.check("t", OperationKind::Insert).is_none());
    }

    #[test]
    fn test_clear() {
        let injector = FaultInjector::new();
        injector.inject(FaultRule::always("x"));
        injector.clear();
        assert!(injector.is_empty());
    }

    #[test]
    fn test_parse_spec() {
        let rules = parse_spec("usuarios:upsert, *:select, broken, t:merge");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].table.as_deref(), Some("usuarios"));
        assert_eq!(rules[0].operation, Some(OperationKind::Upsert));
        assert!(rules[1].table.is_none());
        assert_eq!(rules[1].operation, Some(OperationKind::Select));
    }
}
