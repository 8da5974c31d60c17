//! Integration test support. The interesting code lives in `tests/`.
