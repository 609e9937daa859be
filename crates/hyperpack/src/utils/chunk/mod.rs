pub mod finalize_chunks;
