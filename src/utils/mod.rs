//! Shared utility functions for humaneval-forge.
//!
//! This module provides code extraction from LLM responses.

pub mod code_extraction;

pub use code_extraction::{
    extract_code, extract_code_with_fences, extract_direct_completion, strip_carriage_returns,
    PLAIN_FENCE, PYTHON_FENCE,
};
