//! Unit tests for the client view.
//!
//! The cache is exercised against a mocked gateway and against the
//! in-process service; drag and view helpers are tested directly.
