//! Conformance suite runs for the bundled backends.
//!
//! Each memory-backend check gets its own test for fine-grained failure
//! reporting; the filesystem backend runs the whole suite in one shot
//! against a temporary directory.

#![allow(clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use polystore_storage::{conformance, FsBackend, FsOptions, MemoryBackend, Store};

fn memory_store() -> Store {
    Store::new(Arc::new(MemoryBackend::new()))
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn crud_info_missing_is_absent() {
    conformance::crud_info_missing_is_absent(&memory_store()).await;
}

#[tokio::test]
async fn crud_read_missing_is_absent() {
    conformance::crud_read_missing_is_absent(&memory_store()).await;
}

#[tokio::test]
async fn crud_write_then_read_roundtrips() {
    conformance::crud_write_then_read_roundtrips(&memory_store()).await;
}

#[tokio::test]
async fn crud_write_overwrites() {
    conformance::crud_write_overwrites(&memory_store()).await;
}

#[tokio::test]
async fn crud_delete_missing_is_noop() {
    conformance::crud_delete_missing_is_noop(&memory_store()).await;
}

#[tokio::test]
async fn crud_delete_removes_key() {
    conformance::crud_delete_removes_key(&memory_store()).await;
}

#[tokio::test]
async fn crud_info_reports_length() {
    conformance::crud_info_reports_length(&memory_store()).await;
}

// ============================================================================
// Enumeration
// ============================================================================

#[tokio::test]
async fn enum_results_are_key_ordered() {
    conformance::enum_results_are_key_ordered(&memory_store()).await;
}

#[tokio::test]
async fn enum_prefix_filters() {
    conformance::enum_prefix_filters(&memory_store()).await;
}

#[tokio::test]
async fn enum_blank_prefix_matches_all() {
    conformance::enum_blank_prefix_matches_all(&memory_store()).await;
}

#[tokio::test]
async fn enum_max_results_caps_output() {
    conformance::enum_max_results_caps_output(&memory_store()).await;
}

#[tokio::test]
async fn enum_small_pages_have_no_duplicates() {
    conformance::enum_small_pages_have_no_duplicates(&memory_store()).await;
}

#[tokio::test]
async fn enum_cursor_resumes_without_skip_or_repeat() {
    conformance::enum_cursor_resumes_without_skip_or_repeat(&memory_store()).await;
}

#[tokio::test]
async fn enum_entries_carry_cursors() {
    conformance::enum_entries_carry_cursors(&memory_store()).await;
}

#[tokio::test]
async fn enum_foreign_cursor_rejected() {
    conformance::enum_foreign_cursor_rejected(&memory_store()).await;
}

// ============================================================================
// Batch and typed
// ============================================================================

#[tokio::test]
async fn batch_write_then_read_many() {
    conformance::batch_write_then_read_many(&memory_store()).await;
}

#[tokio::test]
async fn batch_read_many_marks_absent_slots() {
    conformance::batch_read_many_marks_absent_slots(&memory_store()).await;
}

#[tokio::test]
async fn typed_roundtrip() {
    conformance::typed_roundtrip(&memory_store()).await;
}

#[tokio::test]
async fn typed_missing_is_absent() {
    conformance::typed_missing_is_absent(&memory_store()).await;
}

// ============================================================================
// Whole-suite runs
// ============================================================================

#[tokio::test]
async fn memory_store_full_suite() {
    conformance::run_all(&memory_store()).await;
}

#[tokio::test]
async fn fs_store_full_suite_flat() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = FsBackend::open(dir.path(), FsOptions { path_mapped: false, create: true })
        .await
        .expect("open");
    conformance::run_all(&Store::new(Arc::new(backend))).await;
}

#[tokio::test]
async fn fs_store_full_suite_path_mapped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = FsBackend::open(dir.path(), FsOptions { path_mapped: true, create: true })
        .await
        .expect("open");
    conformance::run_all(&Store::new(Arc::new(backend))).await;
}
