//! Edge case tests for ninec-par
